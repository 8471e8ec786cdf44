// SPDX-License-Identifier: Apache-2.0

//! HTTP surface of the intent service.

use axum::http::Method;

pub mod error;
pub mod health;
pub mod metrics;
pub mod predict;
pub mod service;

pub use error::HttpError;
pub use service::{HttpService, HttpServiceConfig};

/// Documentation entry for a registered route, logged at startup.
#[derive(Debug, Clone)]
pub struct RouteDoc {
    method: Method,
    path: String,
}

impl RouteDoc {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl std::fmt::Display for RouteDoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
