// SPDX-License-Identifier: Apache-2.0

//! Logging setup.
//!
//! Filters come from the `INTENTD_LOG` environment variable; the default
//! level is `info` with noisy dependency crates clamped to `error`.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// ENV used to set the log filter
const FILTER_ENV: &str = "INTENTD_LOG";

/// Default filter: service at info, dependencies quiet
const DEFAULT_FILTER: &str =
    "info,h2=error,tower=error,hyper_util=error,tokenizers=error,hf_hub=error,axum=error";

/// Once instance to ensure the logger is only initialized once
static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    });
}
