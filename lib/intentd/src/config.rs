// SPDX-License-Identifier: Apache-2.0

//! Service configuration.
//!
//! An optional YAML file sets defaults; CLI flags and environment variables
//! override individual fields at the entrypoint.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::classifier::ClassifierConfig;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Cross-origin allow-list of front-end URLs
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_origins(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg = serde_yaml::from_str::<ServiceConfig>(&data)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierBackend;

    #[test]
    fn test_empty_document_gets_defaults() {
        let cfg: ServiceConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.allowed_origins, ["http://localhost:3000"]);
        assert_eq!(cfg.classifier.backend, ClassifierBackend::Bert);
    }

    #[test]
    fn test_partial_document_overrides() {
        let cfg: ServiceConfig = serde_yaml::from_str(
            r#"
port: 8080
allowed_origins:
  - "http://localhost:3000"
  - "https://intent-frontend.example.com"
classifier:
  backend: bert
  model_path: /models/atis
  max_length: 64
"#,
        )
        .unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.allowed_origins.len(), 2);
        assert_eq!(
            cfg.classifier.model_path.as_deref(),
            Some(Path::new("/models/atis"))
        );
        assert_eq!(cfg.classifier.max_length, 64);
    }

    #[test]
    fn test_mock_backend_parses() {
        let cfg: ServiceConfig =
            serde_yaml::from_str("classifier:\n  backend: mock\n").unwrap();
        assert_eq!(cfg.classifier.backend, ClassifierBackend::Mock);
    }
}
