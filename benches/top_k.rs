//! Criterion benchmarks for coarse retrieval and MaxSim scoring.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use gatekeeper::embedding::{BertEmbedder, Embedder};
use gatekeeper::index::{EmbeddingMatrix, SimilarityIndex};
use gatekeeper::verify::max_sim;

const DIM: usize = 1024;

/// Deterministic row-major matrix; rows are normalized on construction.
fn synthetic_matrix(rows: usize, dim: usize) -> EmbeddingMatrix {
    let mut state = 0x9E37_79B9_7F4A_7C15_u64;
    let data: Vec<f32> = (0..rows * dim)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect();
    EmbeddingMatrix::from_flat(data, dim).unwrap()
}

fn bench_top_k(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_k");

    for rows in [1_000, 10_000, 50_000] {
        let index = SimilarityIndex::new(synthetic_matrix(rows, DIM));
        let query = index.matrix().row(rows / 2).unwrap().to_vec();

        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| index.top_k(black_box(&query), 5).unwrap());
        });
    }

    group.finish();
}

fn bench_max_sim(c: &mut Criterion) {
    let embedder = BertEmbedder::stub(DIM).unwrap();
    let query = embedder
        .embed_tokens("How do I replace the battery in a Nook HD tablet?")
        .unwrap();
    let document = embedder
        .embed_tokens("How to replace the Nook HD battery without damaging the ribbon cable?")
        .unwrap();

    c.bench_function("max_sim", |b| {
        b.iter(|| max_sim(black_box(&query), black_box(&document)));
    });
}

criterion_group!(benches, bench_top_k, bench_max_sim);
criterion_main!(benches);
