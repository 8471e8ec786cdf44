// SPDX-License-Identifier: Apache-2.0

//! Intent classifier backends.
//!
//! A [`Classifier`] takes an utterance and produces the argmax class with its
//! softmax probability. Label resolution goes through a [`LabelMap`] so the
//! HTTP layer never deals with raw class indices.

use std::collections::BTreeMap;

use anyhow::Result;

pub mod bert;
pub mod factory;
pub mod mock;

pub use bert::BertIntentClassifier;
pub use factory::{create_classifier, ClassifierBackend, ClassifierConfig, ModelSource};
pub use mock::MockClassifier;

/// Label returned when a class index has no entry in the label map.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Argmax result of a single forward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class_id: usize,
    /// Softmax probability of `class_id`, in `[0, 1]`.
    pub confidence: f32,
}

pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Prediction>;
    fn labels(&self) -> &LabelMap;
    fn name(&self) -> &'static str;
}

/// Mapping from class index to intent name.
///
/// Sourced from the model's `id2label` configuration, or from the static
/// fallback set when the service runs degraded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap(BTreeMap<usize, String>);

impl LabelMap {
    pub fn new(entries: BTreeMap<usize, String>) -> Self {
        Self(entries)
    }

    /// The static label set used when no real model is available.
    pub fn fallback() -> Self {
        Self(BTreeMap::from([
            (0, "flight".to_string()),
            (1, "airfare".to_string()),
            (2, "ground_service".to_string()),
        ]))
    }

    /// Parse a HuggingFace-style `id2label` object (`{"0": "flight", ...}`).
    ///
    /// Entries whose keys do not parse as indices are skipped.
    pub fn from_id2label(value: &serde_json::Value) -> Self {
        let mut entries = BTreeMap::new();
        if let Some(obj) = value.as_object() {
            for (key, label) in obj {
                if let (Ok(idx), Some(name)) = (key.parse::<usize>(), label.as_str()) {
                    entries.insert(idx, name.to_string());
                }
            }
        }
        Self(entries)
    }

    /// Resolve a class index to its intent name, or [`UNKNOWN_LABEL`] when
    /// the index is absent.
    pub fn resolve(&self, class_id: usize) -> &str {
        self.0
            .get(&class_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.values().any(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_labels() {
        let labels = LabelMap::fallback();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.resolve(0), "flight");
        assert_eq!(labels.resolve(1), "airfare");
        assert_eq!(labels.resolve(2), "ground_service");
    }

    #[test]
    fn test_resolve_absent_index() {
        let labels = LabelMap::fallback();
        assert_eq!(labels.resolve(99), UNKNOWN_LABEL);
        assert_eq!(LabelMap::default().resolve(0), UNKNOWN_LABEL);
    }

    #[test]
    fn test_from_id2label() {
        let labels = LabelMap::from_id2label(&json!({
            "0": "flight",
            "1": "airfare",
            "7": "city",
        }));
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.resolve(7), "city");
        assert_eq!(labels.resolve(3), UNKNOWN_LABEL);
    }

    #[test]
    fn test_from_id2label_skips_bad_keys() {
        let labels = LabelMap::from_id2label(&json!({
            "0": "flight",
            "not-an-index": "bogus",
        }));
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_contains() {
        let labels = LabelMap::fallback();
        assert!(labels.contains("airfare"));
        assert!(!labels.contains("weather"));
    }
}
