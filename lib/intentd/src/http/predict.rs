// SPDX-License-Identifier: Apache-2.0

//! Root and prediction endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::{service, HttpError, RouteDoc};
use crate::state::PredictionResult;

/// Request body for `POST /predict`.
///
/// The original API accepted the utterance under either key; `message` wins
/// unless it is blank, in which case `text` is consulted.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl PredictRequest {
    pub fn input(&self) -> &str {
        match &self.message {
            Some(message) if !message.trim().is_empty() => message,
            _ => self.text.as_deref().unwrap_or(""),
        }
    }
}

pub fn predict_router(state: Arc<service::State>) -> (Vec<RouteDoc>, Router) {
    let docs = vec![
        RouteDoc::new(Method::GET, "/"),
        RouteDoc::new(Method::POST, "/predict"),
    ];

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/predict", post(predict_handler))
        .with_state(state);

    (docs, router)
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "message": "ATIS intent classification service is running",
        "status": "ok",
    }))
}

async fn predict_handler(
    State(state): State<Arc<service::State>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResult>, HttpError> {
    let timer = state.metrics().inference_timer();
    let result = state.classifier().predict(request.input()).await;
    timer.observe_duration();

    match result {
        Ok(prediction) => {
            state.metrics().observe_request("predict", 200);
            Ok(Json(prediction))
        }
        Err(err) => {
            let err = HttpError::from(err);
            state.metrics().observe_request("predict", err.code);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wins_over_text() {
        let request = PredictRequest {
            message: Some("flights to boston".to_string()),
            text: Some("ignored".to_string()),
        };
        assert_eq!(request.input(), "flights to boston");
    }

    #[test]
    fn test_blank_message_falls_back_to_text() {
        let request = PredictRequest {
            message: Some("   ".to_string()),
            text: Some("ground transport".to_string()),
        };
        assert_eq!(request.input(), "ground transport");
    }

    #[test]
    fn test_missing_fields_yield_empty_input() {
        assert_eq!(PredictRequest::default().input(), "");
    }
}
