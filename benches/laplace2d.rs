//! Benchmark: plain GMRES vs multicolor-reordered ILU-preconditioned GMRES
//! on the 2D five-point Laplacian.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mckrylov::driver::{Method, PcStrategy, ReorderStrategy, SolverDriver};
use mckrylov::{Convergence, CsrMatrix};

fn laplace2d(nx: usize) -> CsrMatrix<f64> {
    let n = nx * nx;
    let mut t = Vec::new();
    for i in 0..nx {
        for j in 0..nx {
            let k = i * nx + j;
            t.push((k, k, 4.0));
            if i > 0 {
                t.push((k, k - nx, -1.0));
            }
            if i + 1 < nx {
                t.push((k, k + nx, -1.0));
            }
            if j > 0 {
                t.push((k, k - 1, -1.0));
            }
            if j + 1 < nx {
                t.push((k, k + 1, -1.0));
            }
        }
    }
    CsrMatrix::from_triplets(n, n, &t).unwrap()
}

fn bench_gmres(c: &mut Criterion) {
    let mut group = c.benchmark_group("laplace2d_gmres");
    let conv = Convergence { tol: 1e-8, max_iters: 10_000 };
    for &nx in &[16usize, 32, 64] {
        let a = laplace2d(nx);
        let b = vec![1.0; nx * nx];
        let plain = SolverDriver::new(
            ReorderStrategy::None,
            PcStrategy::None,
            Method::Gmres { restart: 30 },
            conv,
        );
        let amc_ilu = SolverDriver::new(
            ReorderStrategy::Amc,
            PcStrategy::Ilu0,
            Method::Gmres { restart: 30 },
            conv,
        );
        group.bench_with_input(BenchmarkId::new("plain", nx), &nx, |bench, _| {
            bench.iter(|| plain.solve(&a, &b).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("amc_ilu0", nx), &nx, |bench, _| {
            bench.iter(|| amc_ilu.solve(&a, &b).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_gmres);
criterion_main!(benches);
