//! Benchmarks for gowalker-render: highlighting, page rendering, sharding.

use criterion::{Criterion, criterion_group, criterion_main};
use gowalker_core::{Func, Package, Type};
use gowalker_render::{BasicTemplate, Link, PageTemplate, format_code, render_package, split_shards};
use std::hint::black_box;

const SOURCE: &str = r#"func (c *Conn) Write(p []byte) (n int, err error) {
	// Write writes p to the connection.
	for len(p) > 0 {
		m, err := c.w.Write(p)
		if err != nil {
			return n, fmt.Errorf("write: %w", err)
		}
		n += m
		p = p[m:]
	}
	return n, nil
}"#;

fn sample_package() -> Package {
    let methods: Vec<Func> = (0..40)
        .map(|i| Func {
            name: format!("Method{}", i),
            doc: format!("Method{} does work.\n\n\tc.Method{}()\n", i, i),
            decl: format!("func (c *Conn) Method{}(p []byte) (int, error)", i),
            code: SOURCE.into(),
            ..Func::default()
        })
        .collect();
    Package {
        import_path: "github.com/a/net".into(),
        name: "net".into(),
        types: vec![Type {
            name: "Conn".into(),
            decl: "type Conn struct {\n\tw io.Writer\n}".into(),
            methods,
            ..Type::default()
        }],
        imports: vec!["fmt".into(), "io".into()],
        ..Package::default()
    }
}

fn bench_highlight(c: &mut Criterion) {
    let links = vec![Link::new("Conn", "", ""), Link::new("fmt.", "fmt", "")];
    c.bench_function("format_code", |b| {
        b.iter(|| format_code(black_box(SOURCE), black_box(&links)))
    });
}

fn bench_page(c: &mut Criterion) {
    let pkg = sample_package();
    c.bench_function("render_package", |b| b.iter(|| render_package(black_box(&pkg))));

    let html = BasicTemplate
        .render(&render_package(&pkg))
        .unwrap()
        .repeat(4);
    c.bench_function("split_shards", |b| b.iter(|| split_shards(black_box(&html))));
}

criterion_group!(benches, bench_highlight, bench_page);
criterion_main!(benches);
