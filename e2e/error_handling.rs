//! End-to-end error-path and poisoning scenarios against the public API.

use dvar::{Error, Reader, TypeSignature, WriteValue, Writer, TYPE_DEPTH_MAX};

#[test]
fn out_of_range_bool_is_corrupt_data() {
    let ty = TypeSignature::parse_single("b").unwrap();
    let bytes: Vec<u8> = vec![2, 0, 0, 0, 0, 0, 0, 0];

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    assert_eq!(reader.read("b"), Err(Error::CorruptData));
}

#[test]
fn nonzero_alignment_padding_is_corrupt_data() {
    let ty = TypeSignature::parse("yx").unwrap();
    let mut bytes = vec![1u8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
    bytes.extend_from_slice(&[0u8; 8]);

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    reader.read("y").unwrap();
    assert_eq!(reader.read("x"), Err(Error::CorruptData));
}

#[test]
fn invalid_utf8_string_body_is_corrupt_data() {
    let ty = TypeSignature::parse_single("s").unwrap();
    let bytes: Vec<u8> = vec![1, 0, 0, 0, 0xFF, 0, 0, 0];

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    assert_eq!(reader.read("s"), Err(Error::CorruptData));
}

#[test]
fn truncated_buffer_is_out_of_bounds() {
    let ty = TypeSignature::parse_single("u").unwrap();
    let full = vec![0u8; 8];
    let short = &full[..2];

    let mut reader = Reader::begin(false, &ty, short).unwrap();
    assert_eq!(reader.read("u"), Err(Error::OutOfBounds));
}

#[test]
fn mismatched_format_character_is_format_mismatch() {
    let ty = TypeSignature::parse_single("u").unwrap();
    let bytes = vec![0u8; 8];

    let mut reader = Reader::begin(false, &ty, &bytes).unwrap();
    assert_eq!(reader.read("i"), Err(Error::FormatMismatch));
}

#[test]
fn unaligned_buffer_is_rejected_up_front() {
    let ty = TypeSignature::parse_single("u").unwrap();
    let buf = vec![0u8; 16];
    let misaligned = &buf[1..9];

    assert_eq!(Reader::begin(false, &ty, misaligned).unwrap_err(), Error::Misaligned);
}

#[test]
fn reader_error_latches_and_short_circuits() {
    let ty = TypeSignature::parse_single("u").unwrap();
    let full = vec![0u8; 8];
    let short = &full[..2];

    let mut reader = Reader::begin(false, &ty, short).unwrap();
    assert_eq!(reader.read("u"), Err(Error::OutOfBounds));
    assert_eq!(reader.poison(), Some(Error::OutOfBounds));
    // A second call returns the latched error without touching the buffer again.
    assert_eq!(reader.read("u"), Err(Error::OutOfBounds));
    assert_eq!(reader.end(), Err(Error::OutOfBounds));
}

#[test]
fn writer_error_latches_and_short_circuits() {
    let ty = TypeSignature::parse_single("u").unwrap();
    let mut writer = Writer::begin(false, &ty);

    assert_eq!(writer.write("i", &[WriteValue::I32(1)]), Err(Error::FormatMismatch));
    assert_eq!(writer.poison(), Some(Error::FormatMismatch));
    assert_eq!(writer.write("u", &[WriteValue::U32(1)]), Err(Error::FormatMismatch));
    assert_eq!(writer.end(), Err(Error::FormatMismatch));
}

#[test]
fn ending_early_is_format_mismatch() {
    let ty = TypeSignature::parse_single("(yu)").unwrap();
    let mut writer = Writer::begin(false, &ty);
    writer.write("(y", &[WriteValue::U8(1)]).unwrap();
    assert_eq!(writer.end(), Err(Error::FormatMismatch));
}

#[test]
fn overlong_signature_is_rejected() {
    let sig: String = std::iter::repeat('a').take(256).collect();
    assert_eq!(TypeSignature::parse_single(&sig), Err(Error::OverlongType));
}

#[test]
fn excessive_array_nesting_is_depth_overflow() {
    let sig: String = std::iter::repeat('a').take(33).chain(std::iter::once('y')).collect();
    assert_eq!(TypeSignature::parse_single(&sig), Err(Error::DepthOverflow));
}

#[test]
fn malformed_signature_is_invalid_type() {
    assert_eq!(TypeSignature::parse_single("(si"), Err(Error::InvalidType));
    assert_eq!(TypeSignature::parse_single("a{(i)i}"), Err(Error::InvalidType));
}

#[test]
fn dict_entry_outside_array_is_invalid_type() {
    assert_eq!(TypeSignature::parse_single("{yy}"), Err(Error::InvalidType));
    assert_eq!(TypeSignature::parse("a{yb}{yb}"), Err(Error::InvalidType));
}

#[test]
fn nested_variants_are_depth_bounded_at_runtime() {
    let root_ty = TypeSignature::parse_single("v").unwrap();
    let v_ty = TypeSignature::parse_single("v").unwrap();

    let mut writer = Writer::begin(false, &root_ty);
    let mut result = Ok(());
    for _ in 0..TYPE_DEPTH_MAX + 1 {
        result = writer.write("<", &[WriteValue::Variant(&v_ty)]);
        if result.is_err() {
            break;
        }
    }
    assert_eq!(result, Err(Error::DepthOverflow));
}
