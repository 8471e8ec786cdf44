// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use axum::extract::State;
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use super::{service, RouteDoc};

pub fn health_check_router(
    state: Arc<service::State>,
    path_override: Option<String>,
) -> (Vec<RouteDoc>, Router) {
    let path = path_override.unwrap_or_else(|| "/health".to_string());

    let docs = vec![RouteDoc::new(Method::GET, &path)];

    let router = Router::new()
        .route(&path, get(health_handler))
        .with_state(state);

    (docs, router)
}

// model_loaded is true only for a real model: false before the first
// prediction and false forever once the state degraded.
async fn health_handler(State(state): State<Arc<service::State>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "model_loaded": state.classifier().is_ready(),
    }))
}
