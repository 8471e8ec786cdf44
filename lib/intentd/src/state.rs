// SPDX-License-Identifier: Apache-2.0

//! Process-wide classifier state.
//!
//! The classifier is materialized lazily on the first prediction and exactly
//! once per process, even under concurrent first requests. Initialization has
//! two terminal outcomes: `Ready` with a real model, or `Degraded` with the
//! static fallback label set. Neither is ever retried.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::classifier::{create_classifier, Classifier, ClassifierConfig, LabelMap};

/// Stub intent returned while degraded.
pub const FALLBACK_INTENT: &str = "flight";
/// Stub confidence returned while degraded.
pub const FALLBACK_CONFIDENCE: f64 = 0.85;
/// Note attached to degraded responses.
pub const FALLBACK_MESSAGE: &str = "Using fallback classification";

type Loader = dyn Fn() -> anyhow::Result<Arc<dyn Classifier>> + Send + Sync;

/// Terminal state of the lazy-init latch.
#[derive(Clone)]
pub enum LoadOutcome {
    Ready(Arc<dyn Classifier>),
    Degraded(LabelMap),
}

/// Errors surfaced by [`ClassifierState::predict`].
///
/// Load failures are intentionally absent: they degrade the state instead of
/// reaching the caller.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("No message provided")]
    InvalidInput,
    #[error("Prediction error: {0}")]
    Inference(anyhow::Error),
}

/// Classification outcome for a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub intent: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PredictionResult {
    fn fallback() -> Self {
        Self {
            intent: FALLBACK_INTENT.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            text: None,
            message: Some(FALLBACK_MESSAGE.to_string()),
        }
    }
}

/// Lazily-initialized classifier handle shared across request handlers.
pub struct ClassifierState {
    loader: Arc<Loader>,
    latch: OnceCell<LoadOutcome>,
}

impl ClassifierState {
    /// State backed by the configured factory loader.
    pub fn new(config: ClassifierConfig) -> Self {
        Self::with_loader(move || create_classifier(&config))
    }

    /// State backed by a custom loader. The loader runs at most once.
    pub fn with_loader(
        loader: impl Fn() -> anyhow::Result<Arc<dyn Classifier>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            loader: Arc::new(loader),
            latch: OnceCell::new(),
        }
    }

    /// State with an already-constructed classifier; the latch starts `Ready`.
    pub fn preloaded(classifier: Arc<dyn Classifier>) -> Self {
        let state = Self::with_loader(|| {
            unreachable!("preloaded state never invokes its loader")
        });
        state
            .latch
            .set(LoadOutcome::Ready(classifier))
            .unwrap_or_else(|_| unreachable!("latch is empty at construction"));
        state
    }

    /// Resolve the latch, initializing it on first use.
    ///
    /// Model loading does disk and network I/O, so it runs on the blocking
    /// pool. Any failure latches `Degraded` with the fallback label set.
    pub async fn ensure_loaded(&self) -> &LoadOutcome {
        self.latch
            .get_or_init(|| async {
                let loader = self.loader.clone();
                let loaded = tokio::task::spawn_blocking(move || loader()).await;

                match loaded {
                    Ok(Ok(classifier)) => {
                        tracing::info!(
                            backend = classifier.name(),
                            labels = classifier.labels().len(),
                            "classifier ready"
                        );
                        LoadOutcome::Ready(classifier)
                    }
                    Ok(Err(err)) => {
                        tracing::warn!("classifier load failed, running degraded: {err:#}");
                        LoadOutcome::Degraded(LabelMap::fallback())
                    }
                    Err(err) => {
                        tracing::warn!("classifier load panicked, running degraded: {err}");
                        LoadOutcome::Degraded(LabelMap::fallback())
                    }
                }
            })
            .await
    }

    /// Classify one utterance.
    ///
    /// Degraded state short-circuits to the stub result without touching a
    /// model. Inference runs on the blocking pool; it is synchronous CPU
    /// work.
    pub async fn predict(&self, text: &str) -> Result<PredictionResult, PredictError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PredictError::InvalidInput);
        }

        let classifier = match self.ensure_loaded().await {
            LoadOutcome::Degraded(_) => return Ok(PredictionResult::fallback()),
            LoadOutcome::Ready(classifier) => classifier.clone(),
        };

        let owned = text.to_string();
        let (intent, confidence) = tokio::task::spawn_blocking(move || {
            let prediction = classifier.classify(&owned)?;
            let intent = classifier.labels().resolve(prediction.class_id).to_string();
            Ok::<_, anyhow::Error>((intent, prediction.confidence))
        })
        .await
        .map_err(|err| PredictError::Inference(anyhow::anyhow!(err)))?
        .map_err(PredictError::Inference)?;

        Ok(PredictionResult {
            intent,
            confidence: round4(f64::from(confidence)),
            text: Some(text.to_string()),
            message: None,
        })
    }

    /// Whether a real model is loaded (false before first use or degraded).
    pub fn is_ready(&self) -> bool {
        matches!(self.latch.get(), Some(LoadOutcome::Ready(_)))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.latch.get(), Some(LoadOutcome::Degraded(_)))
    }

    /// Current label map, if the latch has resolved.
    pub fn label_map(&self) -> Option<LabelMap> {
        match self.latch.get()? {
            LoadOutcome::Ready(classifier) => Some(classifier.labels().clone()),
            LoadOutcome::Degraded(labels) => Some(labels.clone()),
        }
    }
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{MockClassifier, Prediction};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedClassifier {
        class_id: usize,
        confidence: f32,
        labels: LabelMap,
    }

    impl Classifier for FixedClassifier {
        fn classify(&self, _text: &str) -> anyhow::Result<Prediction> {
            Ok(Prediction {
                class_id: self.class_id,
                confidence: self.confidence,
            })
        }

        fn labels(&self) -> &LabelMap {
            &self.labels
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn counting_state(loads: Arc<AtomicUsize>) -> ClassifierState {
        ClassifierState::with_loader(move || {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockClassifier::new()) as Arc<dyn Classifier>)
        })
    }

    #[tokio::test]
    async fn test_lazy_until_first_predict() {
        let loads = Arc::new(AtomicUsize::new(0));
        let state = counting_state(loads.clone());

        assert!(!state.is_ready());
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        state.predict("flights to denver").await.unwrap();
        assert!(state.is_ready());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_happens_at_most_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let state = Arc::new(counting_state(loads.clone()));

        let (a, b, c) = tokio::join!(
            state.predict("list flights to boston"),
            state.predict("ground transportation in dallas"),
            state.predict("cheapest airfare to atlanta"),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_degraded_returns_stub_and_never_retries() {
        let loads = Arc::new(AtomicUsize::new(0));
        let loads_in_loader = loads.clone();
        let state = ClassifierState::with_loader(move || {
            loads_in_loader.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("weights missing")
        });

        let first = state.predict("flights to denver").await.unwrap();
        assert_eq!(first.intent, FALLBACK_INTENT);
        assert_eq!(first.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(first.message.as_deref(), Some(FALLBACK_MESSAGE));
        assert!(first.text.is_none());

        let second = state.predict("anything else").await.unwrap();
        assert_eq!(second.intent, FALLBACK_INTENT);

        assert!(state.is_degraded());
        assert!(!state.is_ready());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(state.label_map(), Some(LabelMap::fallback()));
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let state = counting_state(loads.clone());

        for text in ["", "   ", "\n\t"] {
            let err = state.predict(text).await.unwrap_err();
            assert!(matches!(err, PredictError::InvalidInput));
            assert_eq!(err.to_string(), "No message provided");
        }
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_confidence_rounded_to_four_places() {
        let state = ClassifierState::preloaded(Arc::new(FixedClassifier {
            class_id: 0,
            confidence: 0.857_394_2,
            labels: LabelMap::fallback(),
        }));

        let result = state.predict("book a flight").await.unwrap();
        assert_eq!(result.confidence, 0.8574);
        assert_eq!(result.text.as_deref(), Some("book a flight"));
        assert!(result.message.is_none());
    }

    #[tokio::test]
    async fn test_unknown_label_for_absent_index() {
        let state = ClassifierState::preloaded(Arc::new(FixedClassifier {
            class_id: 42,
            confidence: 0.9,
            labels: LabelMap::fallback(),
        }));

        let result = state.predict("book a flight").await.unwrap();
        assert_eq!(result.intent, "unknown");
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
        assert_eq!(round4(0.0), 0.0);
    }
}
