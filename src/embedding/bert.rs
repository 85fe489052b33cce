//! BERT-family model wrappers over `candle-transformers`.
//!
//! [`BertEncoder`] returns last hidden states (the bi-encoder used for pooled and per-token
//! embeddings); [`BertClassifier`] adds a single-logit head on the CLS token (the local
//! cross-encoder).

use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;
use std::sync::Arc;

fn read_config(model_dir: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(model_dir.join("config.json"))?;
    serde_json::from_str(&raw)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))
}

fn var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_dir.join("model.safetensors");
    // SAFETY: the safetensors file is mapped read-only and must not be modified while loaded.
    unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
}

/// Loads the encoder under whichever prefix the checkpoint uses.
fn load_backbone(vb: &VarBuilder, config: &Config) -> Result<BertModel> {
    if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("bert"), config)
    } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("roberta"), config)
    } else {
        BertModel::load(vb.clone(), config)
    }
}

struct EncoderInner {
    bert: BertModel,
    hidden_size: usize,
}

#[derive(Clone)]
pub struct BertEncoder(Arc<EncoderInner>);

impl BertEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_config(model_dir)?;
        let vb = var_builder(model_dir, device)?;
        let bert = load_backbone(&vb, &config)?;

        Ok(Self(Arc::new(EncoderInner {
            bert,
            hidden_size: config.hidden_size,
        })))
    }

    pub fn hidden_size(&self) -> usize {
        self.0.hidden_size
    }

    /// Returns hidden states shaped `[batch, seq_len, hidden_size]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        self.0.bert.forward(input_ids, token_type_ids, attention_mask)
    }
}

struct ClassifierInner {
    bert: BertModel,
    classifier: Linear,
}

#[derive(Clone)]
pub struct BertClassifier(Arc<ClassifierInner>);

impl BertClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_config(model_dir)?;
        let vb = var_builder(model_dir, device)?;
        let bert = load_backbone(&vb, &config)?;
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self(Arc::new(ClassifierInner { bert, classifier })))
    }

    /// Returns raw relevance logits shaped `[batch, 1]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .0
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.0.classifier.forward(&cls_token)
    }
}
