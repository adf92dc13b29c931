//! Benchmarks for gowalker-core: declaration codecs and the recent-projects list.

use criterion::{Criterion, criterion_group, criterion_main};
use gowalker_core::codec::{legacy, record};
use gowalker_core::{Func, Package, RecentProject, RecentProjects, Type, Value};
use std::hint::black_box;

fn sample_package() -> Package {
    let funcs: Vec<Func> = (0..50)
        .map(|i| Func {
            name: format!("Func{}", i),
            doc: format!("Func{} does thing number {}.", i, i),
            decl: format!("func Func{}(a, b int) (int, error)", i),
            url: format!("https://github.com/a/b/blob/master/a.go#L{}", i * 10),
            code: "\n\tif a > b {\n\t\treturn a, nil\n\t}\n\treturn b, nil\n".into(),
            ..Func::default()
        })
        .collect();

    Package {
        import_path: "github.com/a/b".into(),
        doc: "Package b is used for benchmarks.".into(),
        consts: (0..20)
            .map(|i| Value {
                name: format!("C{}", i),
                decl: format!("const C{} = {}", i, i),
                ..Value::default()
            })
            .collect(),
        types: (0..10)
            .map(|i| Type {
                name: format!("T{}", i),
                decl: format!("type T{} struct{{}}", i),
                methods: funcs[..5].to_vec(),
                ..Type::default()
            })
            .collect(),
        funcs,
        imports: vec!["errors".into(), "fmt".into(), "io".into()],
        ..Package::default()
    }
}

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let pkg = sample_package();
    let flat = legacy::encode(&pkg);
    let encoded = record::encode(&pkg).unwrap();

    group.bench_function("legacy_encode", |b| b.iter(|| legacy::encode(black_box(&pkg))));
    group.bench_function("legacy_decode", |b| b.iter(|| legacy::decode(black_box(&flat))));
    group.bench_function("record_encode", |b| b.iter(|| record::encode(black_box(&pkg))));
    group.bench_function("record_decode", |b| b.iter(|| record::decode(black_box(&encoded))));

    group.finish();
}

fn bench_recent_projects(c: &mut Criterion) {
    let recent = RecentProjects::new(20);
    let paths: Vec<String> = (0..40).map(|i| format!("github.com/user/repo{}", i)).collect();

    c.bench_function("recent_projects_upsert", |b| {
        b.iter(|| {
            for path in &paths {
                recent.upsert(RecentProject {
                    path: path.clone(),
                    synopsis: String::new(),
                    views: 1,
                    viewed_time: 0,
                });
            }
        })
    });
}

criterion_group!(benches, bench_codecs, bench_recent_projects);
criterion_main!(benches);
