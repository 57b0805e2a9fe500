use std::hint::black_box;

use agent_history_search::search::find_snippet;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Text of `len` chars with the needle placed near the end
fn generate_text(len: usize, multibyte: bool) -> String {
    let filler = if multibyte { "é" } else { "a" };
    format!("{}DEPLOY{}", filler.repeat(len.saturating_sub(200)), filler.repeat(194))
}

fn bench_find_snippet(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_snippet");

    for size in [1_000, 10_000, 100_000].iter() {
        let ascii = generate_text(*size, false);
        let multibyte = generate_text(*size, true);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("ascii", size), size, |b, _| {
            b.iter(|| find_snippet(black_box(&ascii), black_box("deploy")));
        });
        group.bench_with_input(BenchmarkId::new("multibyte", size), size, |b, _| {
            b.iter(|| find_snippet(black_box(&multibyte), black_box("deploy")));
        });
        group.bench_with_input(BenchmarkId::new("miss", size), size, |b, _| {
            b.iter(|| find_snippet(black_box(&ascii), black_box("rollback")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find_snippet);
criterion_main!(benches);
