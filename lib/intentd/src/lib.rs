// SPDX-License-Identifier: Apache-2.0

//! ATIS intent classification service.
//!
//! Exposes a pretrained sequence-classification model behind a small HTTP
//! API: `POST /predict` tokenizes the utterance, runs one forward pass, and
//! returns the argmax intent with its softmax confidence. The classifier is
//! materialized lazily on first use; a load failure switches the service
//! into a degraded mode that answers from a static fallback label set.

pub mod classifier;
pub mod config;
pub mod http;
pub mod logging;
pub mod state;

pub use classifier::{Classifier, ClassifierConfig, LabelMap, MockClassifier, ModelSource};
pub use config::ServiceConfig;
pub use http::{HttpService, HttpServiceConfig};
pub use state::{ClassifierState, PredictError, PredictionResult};
