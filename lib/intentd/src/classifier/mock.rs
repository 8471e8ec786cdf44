// SPDX-License-Identifier: Apache-2.0

//! Mock classifier for exercising the service without model weights.
//!
//! Uses keyword heuristics over the fallback ATIS label set. Useful for:
//! - Testing the HTTP layer without candle dependencies
//! - Development and debugging
//! - Quick demos

use anyhow::Result;

use super::{Classifier, LabelMap, Prediction};

/// Keyword-based stand-in for the real intent model.
///
/// Scores the three fallback labels from keyword hits and returns the argmax:
/// - "airfare": fare, price, cost, how much
/// - "ground_service": taxi, bus, ground, rental car
/// - "flight": everything else (the dominant ATIS class)
pub struct MockClassifier {
    labels: LabelMap,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    pub fn new() -> Self {
        tracing::info!("Initialized MockClassifier");
        Self {
            labels: LabelMap::fallback(),
        }
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let text_lower = text.to_lowercase();

        // flight, airfare, ground_service
        let mut scores = [0.6f32, 0.1, 0.1];

        if text_lower.contains("fare")
            || text_lower.contains("price")
            || text_lower.contains("cost")
            || text_lower.contains("how much")
        {
            scores[1] = 0.8;
            scores[0] = 0.1;
        }

        if text_lower.contains("taxi")
            || text_lower.contains("bus")
            || text_lower.contains("ground")
            || text_lower.contains("rental car")
        {
            scores[2] = 0.8;
            scores[0] = 0.1;
        }

        let sum: f32 = scores.iter().sum();
        let (class_id, score) = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .expect("scores is non-empty");

        Ok(Prediction {
            class_id,
            confidence: score / sum,
        })
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_default() {
        let classifier = MockClassifier::new();
        let pred = classifier
            .classify("book a flight from boston to denver")
            .unwrap();

        assert_eq!(classifier.labels().resolve(pred.class_id), "flight");
        assert!(pred.confidence > 0.5);
    }

    #[test]
    fn test_airfare_keywords() {
        let classifier = MockClassifier::new();
        let pred = classifier
            .classify("how much is the cheapest fare to atlanta")
            .unwrap();

        assert_eq!(classifier.labels().resolve(pred.class_id), "airfare");
    }

    #[test]
    fn test_ground_service_keywords() {
        let classifier = MockClassifier::new();
        let pred = classifier
            .classify("is there a taxi from the airport downtown")
            .unwrap();

        assert_eq!(classifier.labels().resolve(pred.class_id), "ground_service");
    }

    #[test]
    fn test_confidence_in_range() {
        let classifier = MockClassifier::new();
        for text in ["flights to dallas", "ticket price", "airport bus schedule"] {
            let pred = classifier.classify(text).unwrap();
            assert!((0.0..=1.0).contains(&pred.confidence));
        }
    }
}
