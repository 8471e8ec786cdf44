// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics for the service.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

use super::{service, RouteDoc};

/// Request counters and inference latency, exposed on `/metrics`.
pub struct ServiceMetrics {
    registry: Registry,
    requests: IntCounterVec,
    inference_seconds: Histogram,
}

impl ServiceMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("intentd_requests_total", "HTTP requests by endpoint and status"),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let inference_seconds = Histogram::with_opts(HistogramOpts::new(
            "intentd_inference_seconds",
            "Wall-clock duration of classification calls",
        ))?;
        registry.register(Box::new(inference_seconds.clone()))?;

        Ok(Self {
            registry,
            requests,
            inference_seconds,
        })
    }

    pub fn observe_request(&self, endpoint: &str, status: u16) {
        self.requests
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }

    pub fn inference_timer(&self) -> prometheus::HistogramTimer {
        self.inference_seconds.start_timer()
    }
}

pub fn metrics_router(state: Arc<service::State>) -> (Vec<RouteDoc>, Router) {
    let docs = vec![RouteDoc::new(Method::GET, "/metrics")];

    let router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    (docs, router)
}

async fn metrics_handler(State(state): State<Arc<service::State>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&state.metrics().registry.gather(), &mut buffer) {
        Ok(()) => match String::from_utf8(buffer) {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => {
                tracing::error!("Failed to encode metrics as UTF-8: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to encode metrics as UTF-8".to_string(),
                )
            }
        },
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
        }
    }
}
