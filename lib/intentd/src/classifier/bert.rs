// SPDX-License-Identifier: Apache-2.0

//! Candle-based intent classifier.
//!
//! Loads BERT sequence-classification checkpoints in safetensors format,
//! either from the HuggingFace hub or from a local directory. Pure Rust
//! implementation with no Python dependencies.

use anyhow::{anyhow, Result};

use super::{Classifier, LabelMap, Prediction};

#[cfg(feature = "candle-classifier")]
use candle_core::{DType, Device, IndexOp, Module, Tensor};
#[cfg(feature = "candle-classifier")]
use candle_nn::VarBuilder;
#[cfg(feature = "candle-classifier")]
use candle_transformers::models::bert::{
    BertModel, Config as BertConfig, HiddenAct, PositionEmbeddingType,
};
#[cfg(feature = "candle-classifier")]
use hf_hub::{api::sync::Api, Repo, RepoType};
#[cfg(feature = "candle-classifier")]
use std::path::Path;
#[cfg(feature = "candle-classifier")]
use tokenizers::Tokenizer;

/// BERT encoder + pooler + linear head over the CLS token.
///
/// Matches the `BertForSequenceClassification` checkpoint layout: weights
/// under `bert.*`, the tanh pooler under `bert.pooler.dense`, and the
/// classification head under `classifier.*`.
#[cfg(feature = "candle-classifier")]
pub struct BertIntentClassifier {
    model: BertModel,
    pooler: candle_nn::Linear,
    classifier_head: candle_nn::Linear,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
    labels: LabelMap,
}

#[cfg(feature = "candle-classifier")]
impl BertIntentClassifier {
    /// Load a checkpoint from the HuggingFace hub by model id.
    ///
    /// The first call downloads `config.json`, `model.safetensors` and
    /// `tokenizer.json` into the hub cache; later calls hit the cache.
    pub fn from_pretrained(model_id: &str, max_len: usize, device: Device) -> Result<Self> {
        tracing::info!("Loading intent classifier from HuggingFace: {}", model_id);

        let api = Api::new()?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json")?;
        let weights_path = repo.get("model.safetensors")?;
        let tokenizer_path = repo.get("tokenizer.json")?;

        tracing::debug!("Config: {:?}", config_path);
        tracing::debug!("Weights: {:?}", weights_path);
        tracing::debug!("Tokenizer: {:?}", tokenizer_path);

        Self::from_files(&config_path, &weights_path, &tokenizer_path, max_len, device)
    }

    /// Load a checkpoint from a local directory holding `config.json`,
    /// `model.safetensors` and `tokenizer.json`.
    pub fn from_local(dir: &Path, max_len: usize, device: Device) -> Result<Self> {
        tracing::info!("Loading intent classifier from local path: {}", dir.display());

        Self::from_files(
            &dir.join("config.json"),
            &dir.join("model.safetensors"),
            &dir.join("tokenizer.json"),
            max_len,
            device,
        )
    }

    fn from_files(
        config_path: &Path,
        weights_path: &Path,
        tokenizer_path: &Path,
        max_len: usize,
        device: Device,
    ) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)?;
        let config: serde_json::Value = serde_json::from_str(&config_str)?;

        let bert_config = BertConfig {
            vocab_size: config["vocab_size"].as_u64().unwrap_or(30522) as usize,
            hidden_size: config["hidden_size"].as_u64().unwrap_or(768) as usize,
            num_hidden_layers: config["num_hidden_layers"].as_u64().unwrap_or(12) as usize,
            num_attention_heads: config["num_attention_heads"].as_u64().unwrap_or(12) as usize,
            intermediate_size: config["intermediate_size"].as_u64().unwrap_or(3072) as usize,
            hidden_act: HiddenAct::Gelu,
            hidden_dropout_prob: config["hidden_dropout_prob"].as_f64().unwrap_or(0.1),
            max_position_embeddings: config["max_position_embeddings"].as_u64().unwrap_or(512)
                as usize,
            type_vocab_size: config["type_vocab_size"].as_u64().unwrap_or(2) as usize,
            initializer_range: config["initializer_range"].as_f64().unwrap_or(0.02),
            layer_norm_eps: config["layer_norm_eps"].as_f64().unwrap_or(1e-12),
            pad_token_id: config["pad_token_id"].as_u64().unwrap_or(0) as usize,
            position_embedding_type: PositionEmbeddingType::Absolute,
            use_cache: false,
            classifier_dropout: None,
            model_type: None,
        };

        let labels = LabelMap::from_id2label(
            config.get("id2label").unwrap_or(&serde_json::Value::Null),
        );
        let num_labels = if labels.is_empty() {
            config["num_labels"]
                .as_u64()
                .ok_or_else(|| anyhow!("model config has neither id2label nor num_labels"))?
                as usize
        } else {
            labels.len()
        };

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)?
        };

        let model = BertModel::load(vb.pp("bert"), &bert_config)?;
        let pooler = candle_nn::linear(
            bert_config.hidden_size,
            bert_config.hidden_size,
            vb.pp("bert").pp("pooler").pp("dense"),
        )?;
        let classifier_head =
            candle_nn::linear(bert_config.hidden_size, num_labels, vb.pp("classifier"))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;

        tracing::info!(
            "Initialized intent classifier: {} labels, max_len={}, device={:?}",
            num_labels,
            max_len,
            device
        );

        Ok(Self {
            model,
            pooler,
            classifier_head,
            tokenizer,
            device,
            max_len,
            labels,
        })
    }
}

#[cfg(feature = "candle-classifier")]
impl Classifier for BertIntentClassifier {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let mut ids: Vec<u32> = encoding.get_ids().to_vec();
        let mut mask: Vec<u32> = encoding.get_attention_mask().to_vec();

        // Truncate or pad to max_len
        if ids.len() > self.max_len {
            ids.truncate(self.max_len);
            mask.truncate(self.max_len);
        }
        if ids.len() < self.max_len {
            let pad = self.max_len - ids.len();
            ids.extend(std::iter::repeat(0).take(pad));
            mask.extend(std::iter::repeat(0).take(pad));
        }

        // Convert to tensors [1, seq_len]
        let ids_i64: Vec<i64> = ids.iter().map(|&x| x as i64).collect();
        let mask_i64: Vec<i64> = mask.iter().map(|&x| x as i64).collect();

        let input_ids = Tensor::from_slice(&ids_i64[..], (1, self.max_len), &self.device)?;
        let attention_mask = Tensor::from_slice(&mask_i64[..], (1, self.max_len), &self.device)?;

        // Token type IDs (zeros for single sentence)
        let token_type_ids = Tensor::zeros((1, self.max_len), DType::I64, &self.device)?;

        // Forward pass through BERT -> [1, seq_len, hidden_size]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // CLS token -> pooler (dense + tanh) -> classification head
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier_head.forward(&pooled)?;

        // Squeeze batch dimension: [1, num_labels] -> [num_labels]
        let logits = logits.squeeze(0)?;

        let probs = candle_nn::ops::softmax(&logits, 0)?;
        let probs_vec = probs.to_vec1::<f32>()?;

        let (class_id, confidence) = probs_vec
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or_else(|| anyhow!("model produced no logits"))?;

        tracing::debug!(
            "classified: class_id={}, confidence={:.4}, probs={:?}",
            class_id,
            confidence,
            probs_vec
        );

        Ok(Prediction {
            class_id,
            confidence,
        })
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn name(&self) -> &'static str {
        "bert"
    }
}

// Placeholder implementation when the feature is not enabled
#[cfg(not(feature = "candle-classifier"))]
pub struct BertIntentClassifier;

#[cfg(not(feature = "candle-classifier"))]
impl BertIntentClassifier {
    pub fn from_pretrained(_model_id: &str, _max_len: usize, _device: ()) -> Result<Self> {
        Err(anyhow!(
            "BertIntentClassifier requires the 'candle-classifier' feature"
        ))
    }

    pub fn from_local(_dir: &std::path::Path, _max_len: usize, _device: ()) -> Result<Self> {
        Err(anyhow!(
            "BertIntentClassifier requires the 'candle-classifier' feature"
        ))
    }
}
