//! Benchmarks for metric solves and embedding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ricciflow::prelude::*;

fn create_corner_square(n: usize) -> RicciFlowMesh {
    let (topology, sharp) = primitives::marked_square(n);
    let mut mesh = RicciFlowMesh::new(topology);
    mesh.set_sharp_edges(sharp);
    mesh
}

fn bench_newton(c: &mut Criterion) {
    let mut group = c.benchmark_group("newton");
    for n in [8, 16, 32] {
        group.bench_with_input(BenchmarkId::new("corner_square", n), &n, |b, &n| {
            b.iter_with_setup(
                || create_corner_square(n),
                |mut mesh| {
                    let report = RicciFlow::new(&mut mesh, CornerConcentration, RicciFlowOptions::default())
                        .and_then(|mut flow| flow.calculate_metric());
                    black_box(report)
                },
            );
        });
    }
    group.finish();
}

fn bench_linear_solvers(c: &mut Criterion) {
    let solvers = [
        ("cholesky", LinearSolver::SparseCholesky),
        (
            "conjugate_gradient",
            LinearSolver::ConjugateGradient {
                max_iterations: 1000,
                tolerance: 1e-10,
            },
        ),
    ];

    let mut group = c.benchmark_group("linear_solver");
    for (name, solver) in solvers {
        group.bench_function(name, |b| {
            b.iter_with_setup(
                || create_corner_square(16),
                |mut mesh| {
                    let options = RicciFlowOptions::default().with_solver(solver);
                    let report = RicciFlow::new(&mut mesh, CornerConcentration, options)
                        .and_then(|mut flow| flow.calculate_metric());
                    black_box(report)
                },
            );
        });
    }
    group.finish();
}

fn bench_embedding(c: &mut Criterion) {
    let mut solved = create_corner_square(32);
    if let Ok(mut flow) = RicciFlow::new(&mut solved, CornerConcentration, RicciFlowOptions::default()) {
        let _ = flow.calculate_metric();
    }

    c.bench_function("embed_corner_square_32", |b| {
        b.iter_with_setup(
            || solved.clone(),
            |mut mesh| black_box(embed(&mut mesh, &EmbedOptions::default())),
        );
    });

    c.bench_function("circle_domain_annulus_64x8", |b| {
        b.iter_with_setup(
            || RicciFlowMesh::<u32>::from(primitives::annulus(64, 8, 0.5, 1.0)),
            |mut mesh| {
                black_box(tangential_circle_domain(
                    &mut mesh,
                    OuterLoop::Longest,
                    RicciFlowOptions::default(),
                    EmbedOptions::default(),
                ))
            },
        );
    });
}

criterion_group!(benches, bench_newton, bench_linear_solvers, bench_embedding);
criterion_main!(benches);
