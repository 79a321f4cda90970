use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dvar::{Reader, TypeSignature, WriteValue, Writer};

fn bench_roundtrip(c: &mut Criterion) {
    let ty = TypeSignature::parse_single("(yua{sv}d)").unwrap();
    let q_ty = TypeSignature::parse_single("q").unwrap();
    let t_ty = TypeSignature::parse_single("t").unwrap();

    c.bench_function("write struct with dict-of-variant array", |b| {
        b.iter(|| {
            let mut writer = Writer::begin(false, &ty);
            writer
                .write(
                    "(yu[{s<q>}{s<t>}]d)",
                    &[
                        WriteValue::U8(7),
                        WriteValue::U32(127),
                        WriteValue::Str("count"),
                        WriteValue::Variant(&q_ty),
                        WriteValue::U16(5),
                        WriteValue::Str("total"),
                        WriteValue::Variant(&t_ty),
                        WriteValue::U64(99),
                        WriteValue::F64(3.5),
                    ],
                )
                .unwrap();
            black_box(writer.end().unwrap())
        })
    });

    let mut writer = Writer::begin(false, &ty);
    writer
        .write(
            "(yu[{s<q>}{s<t>}]d)",
            &[
                WriteValue::U8(7),
                WriteValue::U32(127),
                WriteValue::Str("count"),
                WriteValue::Variant(&q_ty),
                WriteValue::U16(5),
                WriteValue::Str("total"),
                WriteValue::Variant(&t_ty),
                WriteValue::U64(99),
                WriteValue::F64(3.5),
            ],
        )
        .unwrap();
    let bytes = writer.end().unwrap();

    c.bench_function("read struct with dict-of-variant array", |b| {
        b.iter(|| {
            let mut reader = Reader::begin(false, &ty, black_box(&bytes)).unwrap();
            let values = reader.read("(yu[{s<q>}{s<t>}]d)").unwrap();
            reader.end().unwrap();
            black_box(values)
        })
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
