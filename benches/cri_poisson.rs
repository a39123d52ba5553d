use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nhl_picks::poisson;

fn criterion_benchmark(c: &mut Criterion) {
    // sanity check
    assert!((poisson::cdf(2, 2.5) - 0.5438131158833).abs() < 1e-9);

    c.bench_function("cri_poisson_cdf_30", |b| {
        b.iter(|| poisson::cdf(black_box(30), black_box(20.0)));
    });

    c.bench_function("cri_poisson_over_2.5", |b| {
        b.iter(|| poisson::prob_at_least(black_box(2.5), black_box(2.7)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
