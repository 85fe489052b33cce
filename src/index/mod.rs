//! Similarity index over the precomputed corpus matrix.
//!
//! [`EmbeddingMatrix`] owns one unit-norm row per corpus entry, so a dot product with a
//! unit-norm query is its cosine similarity. [`SimilarityIndex::top_k`] ranks rows by
//! descending score with ascending row index as the tie-break, which keeps results
//! reproducible across calls and across threads.

pub mod error;
pub mod store;


pub use error::{IndexError, IndexResult};
pub use store::MatrixFormat;

use std::cmp::Ordering;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::constants::UNIT_NORM_TOLERANCE;

/// Dense row-major matrix of unit-norm `f32` vectors.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Builds a matrix from a flat row-major buffer, normalizing rows that are not unit-norm.
    pub fn from_flat(mut data: Vec<f32>, dim: usize) -> IndexResult<Self> {
        if dim == 0 || data.is_empty() {
            return Err(IndexError::EmptyMatrix);
        }
        if !data.len().is_multiple_of(dim) {
            return Err(IndexError::DimensionMismatch {
                expected: dim,
                actual: data.len() % dim,
            });
        }

        let rows = data.len() / dim;
        let mut renormalized = 0usize;

        for (row, chunk) in data.chunks_exact_mut(dim).enumerate() {
            if chunk.iter().any(|v| !v.is_finite()) {
                return Err(IndexError::NonFiniteValue { row });
            }
            let norm = l2_norm(chunk);
            if norm == 0.0 {
                return Err(IndexError::ZeroNormRow { row });
            }
            if (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
                chunk.iter_mut().for_each(|v| *v /= norm);
                renormalized += 1;
            }
        }

        if renormalized > 0 {
            warn!(
                rows = renormalized,
                total = rows,
                "Embedding rows were not unit-norm; renormalized at load"
            );
        }

        Ok(Self { data, rows, dim })
    }

    /// Builds a matrix from individual rows (all rows must share a dimension).
    pub fn from_rows(rows: Vec<Vec<f32>>) -> IndexResult<Self> {
        let dim = rows.first().map(Vec::len).ok_or(IndexError::EmptyMatrix)?;
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Self::from_flat(data, dim)
    }

    /// Loads a `.npy` matrix, or the array `array_name` from an `.npz` archive.
    pub fn load<P: AsRef<Path>>(path: P, array_name: &str) -> IndexResult<Self> {
        let path = path.as_ref();
        let (data, rows, dim) = store::read_matrix(path, array_name)?;
        info!(
            path = %path.display(),
            format = ?MatrixFormat::from_path(path),
            rows,
            dim,
            "Loaded embedding matrix"
        );
        Self::from_flat(data, dim)
    }

    /// Writes the matrix as `f32`; `.npz` paths store it under `array_name`.
    pub fn save<P: AsRef<Path>>(&self, path: P, array_name: &str) -> IndexResult<()> {
        store::write_matrix(path.as_ref(), array_name, &self.data, self.rows, self.dim)
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim)
    }
}

/// A ranked coarse-retrieval hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position of the entry in the corpus (its identity).
    pub corpus_index: usize,
    /// Cosine similarity between the query and the entry's pooled vector.
    pub coarse_score: f32,
}

impl Candidate {
    pub fn new(corpus_index: usize, coarse_score: f32) -> Self {
        Self {
            corpus_index,
            coarse_score,
        }
    }
}

/// Descending score, ascending index. Scores are finite by construction.
fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.coarse_score
        .total_cmp(&a.coarse_score)
        .then_with(|| a.corpus_index.cmp(&b.corpus_index))
}

/// Brute-force inner-product index over an [`EmbeddingMatrix`].
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    matrix: EmbeddingMatrix,
}

impl SimilarityIndex {
    pub fn new(matrix: EmbeddingMatrix) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    /// Scores every row against `query`, in corpus order.
    pub fn scores(&self, query: &[f32]) -> IndexResult<Vec<f32>> {
        if query.len() != self.matrix.dim() {
            return Err(IndexError::DimensionMismatch {
                expected: self.matrix.dim(),
                actual: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(IndexError::NonFiniteQuery);
        }

        Ok(self.matrix.rows().map(|row| dot(query, row)).collect())
    }

    /// Returns the `min(k, len)` best rows by descending score, ties by ascending index.
    pub fn top_k(&self, query: &[f32], k: usize) -> IndexResult<Vec<Candidate>> {
        let mut ranked: Vec<Candidate> = self
            .scores(query)?
            .into_iter()
            .enumerate()
            .map(|(i, s)| Candidate::new(i, s))
            .collect();

        let k = k.min(ranked.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        if k < ranked.len() {
            ranked.select_nth_unstable_by(k - 1, rank_order);
            ranked.truncate(k);
        }
        ranked.sort_unstable_by(rank_order);

        debug!(
            k,
            top_score = ranked.first().map(|c| c.coarse_score),
            top_index = ranked.first().map(|c| c.corpus_index),
            "Coarse retrieval complete"
        );

        Ok(ranked)
    }
}

/// Coarse retriever: the similarity index plus the configured candidate count.
#[derive(Debug, Clone)]
pub struct CoarseRetriever {
    index: SimilarityIndex,
    top_k: usize,
}

impl CoarseRetriever {
    pub fn new(index: SimilarityIndex, top_k: usize) -> Self {
        Self { index, top_k }
    }

    pub fn retrieve(&self, query: &[f32]) -> IndexResult<Vec<Candidate>> {
        self.index.top_k(query, self.top_k)
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scales `v` to unit norm in place; zero vectors are left untouched.
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}
