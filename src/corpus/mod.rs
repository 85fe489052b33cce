//! Knowledge corpus (question/answer records).
//!
//! The on-disk format is a JSON array of `{ "instruction", "input"?, "output" }` records.
//! `instruction` is the text the corpus matrix was embedded from and the text the
//! verifier and reranker compare against; `output` is the answer returned to callers.

pub mod error;

pub use error::CorpusError;

use std::path::Path;

use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RawRecord {
    instruction: String,
    #[serde(default)]
    input: Option<String>,
    output: String,
}

/// A single immutable corpus record; `id` is its position in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub id: usize,
    pub query_text: String,
    pub answer_text: String,
    pub context: Option<String>,
}

/// Ordered, read-only collection of [`CorpusEntry`] records.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// Builds a corpus from `(query_text, answer_text)` pairs, assigning ids by position.
    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .enumerate()
            .map(|(id, (q, a))| CorpusEntry {
                id,
                query_text: q.into(),
                answer_text: a.into(),
                context: None,
            })
            .collect();
        Self { entries }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CorpusError> {
        let records: Vec<RawRecord> =
            serde_json::from_str(raw).map_err(|e| CorpusError::Parse {
                reason: e.to_string(),
            })?;

        if records.is_empty() {
            return Err(CorpusError::Empty);
        }

        let entries = records
            .into_iter()
            .enumerate()
            .map(|(id, r)| CorpusEntry {
                id,
                query_text: r.instruction,
                answer_text: r.output,
                context: r.input.filter(|s| !s.trim().is_empty()),
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CorpusError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let raw = std::fs::read_to_string(path)?;
        let corpus = Self::from_json_str(&raw)?;

        info!(path = %path.display(), entries = corpus.len(), "Loaded corpus");
        Ok(corpus)
    }

    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorpusEntry> {
        self.entries.iter()
    }
}
