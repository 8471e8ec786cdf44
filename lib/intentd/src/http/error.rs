// SPDX-License-Identifier: Apache-2.0

//! HTTP error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::state::PredictError;

/// Error rendered to the client as `{"error": <message>}` with `code`.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    pub code: u16,
    pub message: String,
}

impl HttpError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<PredictError> for HttpError {
    fn from(err: PredictError) -> Self {
        let code = match err {
            PredictError::InvalidInput => 400,
            PredictError::Inference(_) => 500,
        };
        Self::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_400() {
        let err = HttpError::from(PredictError::InvalidInput);
        assert_eq!(err.code, 400);
        assert_eq!(err.message, "No message provided");
    }

    #[test]
    fn test_inference_maps_to_500_with_prefix() {
        let err = HttpError::from(PredictError::Inference(anyhow::anyhow!("tensor shape")));
        assert_eq!(err.code, 500);
        assert_eq!(err.message, "Prediction error: tensor shape");
    }
}
