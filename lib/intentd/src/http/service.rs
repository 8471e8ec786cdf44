// SPDX-License-Identifier: Apache-2.0

//! HTTP service assembly: router composition, CORS, bind and serve.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use derive_builder::Builder;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use validator::Validate;

use super::metrics::ServiceMetrics;
use super::{health, metrics, predict, RouteDoc};
use crate::state::ClassifierState;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

/// Configuration for the HTTP service
#[derive(Debug, Clone, Builder, Validate)]
#[builder(pattern = "owned")]
pub struct HttpServiceConfig {
    /// Bind host
    #[builder(default = "default_host()")]
    #[validate(length(min = 1))]
    host: String,

    /// Bind port
    #[builder(default = "5000")]
    port: u16,

    /// Cross-origin allow-list of front-end URLs
    #[builder(default = "default_origins()")]
    #[validate(length(min = 1))]
    allowed_origins: Vec<String>,
}

impl HttpServiceConfig {
    pub fn builder() -> HttpServiceConfigBuilder {
        HttpServiceConfigBuilder::default()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}

impl Default for HttpServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 5000,
            allowed_origins: default_origins(),
        }
    }
}

/// Shared handler state: the classifier latch plus service metrics.
pub struct State {
    classifier: Arc<ClassifierState>,
    metrics: ServiceMetrics,
}

impl State {
    pub fn new(classifier: Arc<ClassifierState>) -> Result<Self> {
        Ok(Self {
            classifier,
            metrics: ServiceMetrics::new()?,
        })
    }

    pub fn classifier(&self) -> &ClassifierState {
        &self.classifier
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }
}

/// The assembled service: all routes merged, CORS applied.
pub struct HttpService {
    state: Arc<State>,
    config: HttpServiceConfig,
    router: Router,
    route_docs: Vec<RouteDoc>,
}

impl HttpService {
    pub fn new(classifier: Arc<ClassifierState>, config: HttpServiceConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid http service config: {}", e))?;

        let state = Arc::new(State::new(classifier)?);

        let (mut route_docs, mut router) = predict::predict_router(state.clone());

        let (docs, routes) = health::health_check_router(state.clone(), None);
        route_docs.extend(docs);
        router = router.merge(routes);

        let (docs, routes) = metrics::metrics_router(state.clone());
        route_docs.extend(docs);
        router = router.merge(routes);

        let router = router.layer(cors_layer(config.allowed_origins())?);

        Ok(Self {
            state,
            config,
            router,
            route_docs,
        })
    }

    pub fn state(&self) -> Arc<State> {
        self.state.clone()
    }

    pub fn route_docs(&self) -> &[RouteDoc] {
        &self.route_docs
    }

    /// Bind and serve until the token is cancelled.
    pub async fn run(self, cancel_token: CancellationToken) -> Result<()> {
        let (address, server) = self.bind(cancel_token).await?;
        tracing::info!("HTTP service listening on {}", address);
        server.await
    }

    /// Bind and serve on a background task; returns the bound address.
    ///
    /// The ephemeral-port form (`port 0`) is how tests attach a client.
    pub async fn spawn(
        self,
        cancel_token: CancellationToken,
    ) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
        let (address, server) = self.bind(cancel_token).await?;
        Ok((address, tokio::spawn(server)))
    }

    async fn bind(
        self,
        cancel_token: CancellationToken,
    ) -> Result<(SocketAddr, impl std::future::Future<Output = Result<()>>)> {
        let address = format!("{}:{}", self.config.host(), self.config.port());

        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!("Failed to bind to address {}: {}", address, e);
                return Err(anyhow::anyhow!("Failed to bind to address: {}", e));
            }
        };
        let local_address = listener.local_addr()?;

        for doc in &self.route_docs {
            tracing::info!("serving {}", doc);
        }

        let router = self.router;
        let server = async move {
            let observer = cancel_token.child_token();
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(observer.cancelled_owned())
                .await
            {
                tracing::error!("HTTP server error: {}", e);
            }
            Ok(())
        };

        Ok((local_address, server))
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let parsed = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}
