//! Benchmarks for the rewrite hot path.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use cdoc_rewriter::{RewriteOptions, Tokenizer, rewrite};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Generate a single-file component with `occurrences` doc tags.
fn generate_component(occurrences: usize) -> String {
    let mut source = String::with_capacity(occurrences * 200 + 200);
    source.push_str("<template>\n  <div class=\"page\">\n");
    for i in 0..occurrences {
        source.push_str(&format!(
            "    <h2>Example {i}</h2>\n    <v-component-doc language=\"vue\">\n      <button @click=\"count += {i}\">Add {i}</button>\n      <span v-if=\"count > {i}\">&gt; {i}</span>\n    </v-component-doc>\n"
        ));
    }
    source.push_str("  </div>\n</template>\n<script>\nexport default { data: () => ({ count: 0 }) }\n</script>\n");
    source
}

fn bench_fast_path(c: &mut Criterion) {
    let options = RewriteOptions::default();
    let source = "<template>\n  <p>No demos here.</p>\n</template>\n".repeat(100);

    c.bench_function("rewrite_without_tag", |b| {
        b.iter(|| rewrite(&source, &options));
    });
}

fn bench_tokenize(c: &mut Criterion) {
    let source = generate_component(50);

    c.bench_function("tokenize_50_occurrences", |b| {
        b.iter(|| Tokenizer::new(&source).count());
    });
}

fn bench_rewrite_varying_sizes(c: &mut Criterion) {
    let options = RewriteOptions::default();
    let mut group = c.benchmark_group("rewrite_by_occurrences");

    for occurrences in [1, 10, 100] {
        let source = generate_component(occurrences);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(occurrences),
            &source,
            |b, source| {
                b.iter(|| rewrite(source, &options));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fast_path,
    bench_tokenize,
    bench_rewrite_varying_sizes
);
criterion_main!(benches);
