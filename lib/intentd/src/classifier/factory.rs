// SPDX-License-Identifier: Apache-2.0

//! Classifier factory for creating instances from configuration.
//!
//! Provides a unified way to instantiate classifiers without backend-specific
//! code in the HTTP layer. The factory reads configuration and returns a
//! trait object that can be used anywhere.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use super::{Classifier, MockClassifier};

/// Default HuggingFace model id for the ATIS intent checkpoint.
pub const DEFAULT_MODEL_ID: &str = "Sreecharan1289/intent-model";

fn default_max_length() -> usize {
    128
}

/// Classifier backend type
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Mock classifier for testing
    Mock,
    /// Candle BERT sequence-classification backend
    Bert,
}

/// Where model files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Directory with `config.json`, `model.safetensors`, `tokenizer.json`
    LocalPath(PathBuf),
    /// HuggingFace hub model id
    RegistryName(String),
}

/// Classifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Backend type
    pub backend: ClassifierBackend,

    /// HuggingFace model id (registry source)
    #[serde(default)]
    pub model_id: Option<String>,

    /// Local model directory (takes precedence over `model_id`)
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Max sequence length for tokenization
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::Bert,
            model_id: Some(DEFAULT_MODEL_ID.to_string()),
            model_path: None,
            max_length: default_max_length(),
        }
    }
}

impl ClassifierConfig {
    /// Resolve the configured model source.
    pub fn source(&self) -> Result<ModelSource> {
        if let Some(path) = &self.model_path {
            return Ok(ModelSource::LocalPath(path.clone()));
        }
        if let Some(id) = &self.model_id {
            return Ok(ModelSource::RegistryName(id.clone()));
        }
        Err(anyhow!(
            "Bert classifier requires 'model_path' or 'model_id' config"
        ))
    }
}

/// Create a classifier from configuration
///
/// # Errors
/// * Feature not enabled for the requested backend
/// * Invalid configuration
/// * Model loading failure
pub fn create_classifier(config: &ClassifierConfig) -> Result<Arc<dyn Classifier>> {
    match config.backend {
        ClassifierBackend::Mock => {
            tracing::info!("Creating MockClassifier");
            Ok(Arc::new(MockClassifier::new()))
        }

        #[cfg(feature = "candle-classifier")]
        ClassifierBackend::Bert => {
            use super::BertIntentClassifier;
            use candle_core::Device;

            let classifier = match config.source()? {
                ModelSource::LocalPath(dir) => {
                    tracing::info!("Creating BertIntentClassifier from: {}", dir.display());
                    BertIntentClassifier::from_local(&dir, config.max_length, Device::Cpu)?
                }
                ModelSource::RegistryName(model_id) => {
                    tracing::info!("Creating BertIntentClassifier: model={}", model_id);
                    BertIntentClassifier::from_pretrained(
                        &model_id,
                        config.max_length,
                        Device::Cpu,
                    )?
                }
            };
            Ok(Arc::new(classifier))
        }

        #[cfg(not(feature = "candle-classifier"))]
        ClassifierBackend::Bert => Err(anyhow!(
            "Bert classifier requires the 'candle-classifier' feature"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_classifier() {
        let config = ClassifierConfig {
            backend: ClassifierBackend::Mock,
            model_id: None,
            model_path: None,
            max_length: 128,
        };

        let classifier = create_classifier(&config).unwrap();
        assert_eq!(classifier.name(), "mock");
    }

    #[test]
    fn test_source_prefers_local_path() {
        let config = ClassifierConfig {
            backend: ClassifierBackend::Bert,
            model_id: Some("some/model".to_string()),
            model_path: Some(PathBuf::from("/models/intent")),
            max_length: 128,
        };

        assert_eq!(
            config.source().unwrap(),
            ModelSource::LocalPath(PathBuf::from("/models/intent"))
        );
    }

    #[test]
    fn test_source_requires_some_origin() {
        let config = ClassifierConfig {
            backend: ClassifierBackend::Bert,
            model_id: None,
            model_path: None,
            max_length: 128,
        };

        assert!(config.source().is_err());
    }

    #[test]
    fn test_default_config_points_at_registry() {
        let config = ClassifierConfig::default();
        assert_eq!(
            config.source().unwrap(),
            ModelSource::RegistryName(DEFAULT_MODEL_ID.to_string())
        );
        assert_eq!(config.max_length, 128);
    }
}
