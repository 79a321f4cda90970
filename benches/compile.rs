use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dvar::TypeSignature;

fn bench_compile(c: &mut Criterion) {
    c.bench_function("parse_single basic", |b| {
        b.iter(|| TypeSignature::parse_single(black_box("u")).unwrap())
    });

    c.bench_function("parse_single nested struct", |b| {
        b.iter(|| TypeSignature::parse_single(black_box("(yua{sv}d)")).unwrap())
    });

    c.bench_function("parse multi-root", |b| {
        b.iter(|| TypeSignature::parse(black_box("sit(yi)a{sv}")).unwrap())
    });
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
