//! Benchmarks for symptom matching and candidate selection.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use medu_dx::candidates::select_candidates;
use medu_dx::graph::KnowledgeGraph;
use medu_dx::matcher::{similarity, SymptomMatcher};

fn synthetic_graph() -> KnowledgeGraph {
    let rows: Vec<(String, String)> = (0..200)
        .flat_map(|d| {
            (0..8).map(move |s| (format!("disease {d}"), format!("symptom {}", (d * 7 + s) % 500)))
        })
        .collect();
    KnowledgeGraph::build(rows)
}

fn bench_similarity(c: &mut Criterion) {
    c.bench_function("similarity_short", |bench| {
        bench.iter(|| black_box(similarity(black_box("persistent dry cough"), black_box("dry cough"))))
    });
}

fn bench_find(c: &mut Criterion) {
    let graph = synthetic_graph();
    let matcher = SymptomMatcher::default();

    c.bench_function("find_500_vocab", |bench| {
        bench.iter(|| black_box(matcher.find("symptom 42", graph.symptom_vocabulary())))
    });
}

fn bench_select(c: &mut Criterion) {
    let graph = synthetic_graph();
    let matcher = SymptomMatcher::default();
    let detected = ["symptom 3", "symptom 17", "symptom 250"];

    c.bench_function("select_candidates_3", |bench| {
        bench.iter(|| black_box(select_candidates(&graph, detected, &matcher)))
    });
}

criterion_group!(benches, bench_similarity, bench_find, bench_select);
criterion_main!(benches);
