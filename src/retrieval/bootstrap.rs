//! Builds a [`RetrievalService`] from [`Config`], and the offline matrix builder.

use std::sync::Arc;

use tracing::{info, warn};

use super::{RetrievalError, RetrievalService};
use crate::config::Config;
use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::corpus::Corpus;
use crate::embedding::{BertEmbedder, CrossEncoderConfig, Embedder, EncoderConfig};
use crate::index::EmbeddingMatrix;
use crate::rerank::{CrossEncoderReranker, HttpReranker, Reranker};
use crate::translate::{LlmTranslator, NoopTranslator, Translator};
use crate::verify::MaxSimVerifier;

/// Loads the configured encoder, or a stub of `stub_dim` when no model path is set.
pub fn load_embedder(
    config: &Config,
    stub_dim: usize,
) -> Result<Arc<dyn Embedder>, RetrievalError> {
    let encoder_config = match &config.model_path {
        Some(path) => EncoderConfig::new(path.clone()),
        None => {
            warn!("No GATEKEEPER_MODEL_PATH configured, running embedder in stub mode");
            EncoderConfig::stub_with_dim(stub_dim)
        }
    };
    Ok(Arc::new(BertEmbedder::load(encoder_config)?))
}

fn load_reranker(config: &Config) -> Result<Arc<dyn Reranker>, RetrievalError> {
    if let Some(url) = &config.reranker_url {
        info!(url = %url, model = %config.reranker_model, "Using HTTP reranker");
        let reranker =
            HttpReranker::new(url, config.reranker_model.clone(), config.reranker_timeout)?;
        return Ok(Arc::new(reranker));
    }

    let cross_config = CrossEncoderConfig {
        model_path: config.reranker_path.clone(),
        ..CrossEncoderConfig::default()
    };
    Ok(Arc::new(CrossEncoderReranker::load(cross_config)?))
}

fn load_translator(config: &Config) -> Arc<dyn Translator> {
    match &config.translator_model {
        Some(model) => {
            info!(model = %model, "Translation enabled for non-Latin queries");
            Arc::new(LlmTranslator::new(model.clone()))
        }
        None => Arc::new(NoopTranslator),
    }
}

/// Loads corpus, matrix and models and wires them into a service.
pub fn build_service(config: &Config) -> Result<RetrievalService, RetrievalError> {
    config.validate()?;

    let corpus = Corpus::load(&config.corpus_path)?;
    let matrix = EmbeddingMatrix::load(&config.embeddings_path, &config.embeddings_key)?;

    let embedder = load_embedder(config, matrix.dim())?;
    let verifier = MaxSimVerifier::new(Arc::clone(&embedder))
        .with_cache_capacity(config.verifier_cache_capacity);
    let reranker = load_reranker(config)?;

    let service = RetrievalService::new(
        corpus,
        matrix,
        embedder,
        Arc::new(verifier),
        reranker,
        config.gate,
    )?;

    Ok(service.with_translator(load_translator(config)))
}

/// Embeds every entry's `query_text` into a matrix aligned with the corpus.
pub fn build_matrix(
    corpus: &Corpus,
    embedder: &dyn Embedder,
) -> Result<EmbeddingMatrix, RetrievalError> {
    let dim = embedder.embedding_dim();
    let mut data = Vec::with_capacity(corpus.len() * dim);

    for (i, entry) in corpus.iter().enumerate() {
        data.extend(embedder.embed(&entry.query_text)?);
        if (i + 1).is_multiple_of(500) {
            info!(embedded = i + 1, total = corpus.len(), "Embedding corpus");
        }
    }

    Ok(EmbeddingMatrix::from_flat(data, dim)?)
}

/// Stub dimension used by `--build-index` when no model is configured.
pub const STUB_INDEX_DIM: usize = DEFAULT_EMBEDDING_DIM;
