//! Conversion Benchmark
//!
//! Measures whole-file conversion throughput (parse, bind, convert, splice).

use asyncify::{ConvertToAsyncCodeFix, convert_source, suggest_source};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const SIMPLE_SOURCE: &str = r#"
function load(url: string): Promise<void> {
    return fetch(url).then(res => console.log(res));
}
"#;

const MIXED_SOURCE: &str = r#"
const handle = (text: string) => console.log(text);

function load(url: string) {
    const res = 1;
    const pending = fetch(url);
    return pending
        .then(res => res.json())
        .then(body => {
            handle(body.name);
            return body.items;
        })
        .catch(err => {
            console.error(err);
            return [];
        });
}
"#;

/// `functions` copies of a convertible function plus a plain one.
fn generate_source(functions: usize) -> String {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!(
            "function load{i}(id: number) {{\n    return fetch(\"/items/\" + id)\n        .then(res => res.json())\n        .then(item => item.value + {i})\n        .catch(() => null);\n}}\n\nfunction plain{i}(x: number): number {{\n    return x * {i};\n}}\n\n"
        ));
    }
    source
}

fn bench_convert_simple(c: &mut Criterion) {
    c.bench_function("convert_simple", |b| {
        b.iter(|| black_box(convert_source("bench.ts", black_box(SIMPLE_SOURCE))))
    });
}

fn bench_convert_mixed(c: &mut Criterion) {
    c.bench_function("convert_mixed", |b| {
        b.iter(|| black_box(convert_source("bench.ts", black_box(MIXED_SOURCE))))
    });
}

fn bench_convert_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_throughput");
    let fix = ConvertToAsyncCodeFix::default();

    for functions in [10, 50, 200] {
        let source = generate_source(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("all_conversions", functions),
            &source,
            |b, source| b.iter(|| black_box(fix.all_conversions("bench.ts", source))),
        );
        group.bench_with_input(
            BenchmarkId::new("suggestions", functions),
            &source,
            |b, source| b.iter(|| black_box(suggest_source("bench.ts", source))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_convert_simple,
    bench_convert_mixed,
    bench_convert_throughput,
);

criterion_main!(benches);
