//! Benchmarks for gowalker-vcs: static resolution and manifest partitioning.

use criterion::{Criterion, criterion_group, criterion_main};
use gowalker_vcs::ServiceRegistry;
use gowalker_vcs::meta::parse_go_imports;
use gowalker_vcs::tree::partition_manifest;
use std::hint::black_box;

fn bench_resolve(c: &mut Criterion) {
    let registry = ServiceRegistry::standard(Default::default(), Default::default());
    c.bench_function("resolve_static", |b| {
        b.iter(|| registry.resolve_static(black_box("github.com/foo/bar/baz/qux")))
    });

    let page = r#"<!DOCTYPE html><html><head>
<meta charset="utf-8">
<meta name="go-import" content="example.org/pkg git https://github.com/example/pkg">
<meta name="go-source" content="example.org/pkg _ https://github.com/example/pkg/tree/master{/dir}">
</head><body>redirecting</body></html>"#;
    c.bench_function("parse_go_imports", |b| {
        b.iter(|| parse_go_imports(black_box(page.as_bytes()), "example.org/pkg/sub", "u"))
    });
}

fn bench_partition(c: &mut Criterion) {
    let paths: Vec<String> = (0..2_000)
        .map(|i| format!("pkg{}/sub{}/file{}.go", i % 20, i % 7, i))
        .collect();
    c.bench_function("partition_manifest", |b| {
        b.iter(|| partition_manifest(black_box(&paths), "pkg3/"))
    });
}

criterion_group!(benches, bench_resolve, bench_partition);
criterion_main!(benches);
