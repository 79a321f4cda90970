//! End-to-end marshal/demarshal scenarios against the public API.

use dvar::{ReadValue, Reader, TypeSignature, WriteValue, Writer};

#[test]
fn basic_pair_of_integers_round_trips() {
    let ty = TypeSignature::parse("uu").unwrap();

    let mut writer = Writer::begin(false, &ty);
    writer.write("uu", &[WriteValue::U32(7), WriteValue::U32(127)]).unwrap();
    let bytes = writer.end().unwrap();
    assert_eq!(bytes, vec![7, 0, 0, 0, 127, 0, 0, 0]);

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    let values = reader.read("uu").unwrap();
    reader.end().unwrap();
    assert_eq!(values, vec![ReadValue::U32(7), ReadValue::U32(127)]);
}

#[test]
fn struct_with_array_of_variant_dict_entries_round_trips() {
    let ty = TypeSignature::parse_single("(yua{sv}d)").unwrap();
    let q_ty = TypeSignature::parse_single("q").unwrap();
    let t_ty = TypeSignature::parse_single("t").unwrap();

    let mut writer = Writer::begin(true, &ty);
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

    let mut reader = Reader::begin(true, &ty, &bytes).unwrap();
    let values = reader.read("(yu[{s<q>}{s<t>}]d)").unwrap();
    reader.end().unwrap();

    assert_eq!(
        values,
        vec![
            ReadValue::U8(7),
            ReadValue::U32(127),
            ReadValue::Str("count".into()),
            ReadValue::Signature("q".into()),
            ReadValue::U16(5),
            ReadValue::Str("total".into()),
            ReadValue::Signature("t".into()),
            ReadValue::U64(99),
            ReadValue::F64(3.5),
        ]
    );
}

#[test]
fn array_of_structs_round_trips_via_more() {
    let ty = TypeSignature::parse_single("a(yi)").unwrap();

    let mut writer = Writer::begin(false, &ty);
    writer
        .write(
            "[(yi)(yi)(yi)]",
            &[
                WriteValue::U8(1),
                WriteValue::I32(10),
                WriteValue::U8(2),
                WriteValue::I32(20),
                WriteValue::U8(3),
                WriteValue::I32(30),
            ],
        )
        .unwrap();
    let bytes = writer.end().unwrap();

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    reader.read("[").unwrap();
    let mut elements = Vec::new();
    while reader.more() {
        let mut fields = reader.read("(").unwrap();
        fields.extend(reader.read("yi").unwrap());
        fields.extend(reader.read(")").unwrap());
        elements.push(fields);
    }
    reader.read("]").unwrap();
    reader.end().unwrap();

    assert_eq!(
        elements,
        vec![
            vec![ReadValue::U8(1), ReadValue::I32(10)],
            vec![ReadValue::U8(2), ReadValue::I32(20)],
            vec![ReadValue::U8(3), ReadValue::I32(30)],
        ]
    );
}

#[test]
fn multiple_root_values_round_trip() {
    let ty = TypeSignature::parse("sit").unwrap();

    let mut writer = Writer::begin(false, &ty);
    writer
        .write("sit", &[WriteValue::Str("first"), WriteValue::I32(-9), WriteValue::U64(1 << 40)])
        .unwrap();
    let bytes = writer.end().unwrap();

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    let values = reader.read("sit").unwrap();
    reader.end().unwrap();

    assert_eq!(
        values,
        vec![ReadValue::Str("first".into()), ReadValue::I32(-9), ReadValue::U64(1 << 40)]
    );
}

#[test]
fn object_path_and_signature_terminals_round_trip() {
    let ty = TypeSignature::parse("og").unwrap();

    let mut writer = Writer::begin(false, &ty);
    writer
        .write("og", &[WriteValue::Path("/com/example/Object"), WriteValue::Signature("a{sv}")])
        .unwrap();
    let bytes = writer.end().unwrap();

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    let values = reader.read("og").unwrap();
    reader.end().unwrap();

    assert_eq!(
        values,
        vec![ReadValue::Path("/com/example/Object".into()), ReadValue::Signature("a{sv}".into())]
    );
}

#[test]
fn fast_forward_skips_a_whole_struct() {
    let ty = TypeSignature::parse_single("(yu)").unwrap();

    let mut writer = Writer::begin(false, &ty);
    writer.write("(yu)", &[WriteValue::U8(9), WriteValue::U32(5)]).unwrap();
    let bytes = writer.end().unwrap();

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    reader.skip("*").unwrap();
    reader.end().unwrap();
}

#[test]
fn big_endian_session_round_trips() {
    let ty = TypeSignature::parse_single("u").unwrap();

    let mut writer = Writer::begin(true, &ty);
    writer.write("u", &[WriteValue::U32(0x0102_0304)]).unwrap();
    let bytes = writer.end().unwrap();
    assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04]);

    let mut reader = Reader::begin(true, &ty, &bytes).unwrap();
    assert!(reader.is_big_endian());
    let values = reader.read("u").unwrap();
    reader.end().unwrap();
    assert_eq!(values, vec![ReadValue::U32(0x0102_0304)]);
}
