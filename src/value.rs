//! Typed payloads threaded through the format-string dispatch.
//!
//! The wire format's variadic-argument convention (`write(var, "u", 7)`
//! in the original C API) has no equivalent in Rust, which lacks C
//! varargs. [`WriteValue`] and [`ReadValue`] replace it: callers build a
//! slice of tagged values up front, and `Writer::write`/`Reader::read`
//! consume one entry per non-container format character, in order.

use crate::type_system::TypeSignature;

/// One decoded terminal value produced by [`crate::reader::Reader::read`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReadValue {
    U8(u8),
    Bool(bool),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    Fd(u32),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Path(String),
    /// A signature value (`g`), or the signature discovered while
    /// entering a variant (`<`).
    Signature(String),
}

/// One terminal value consumed by [`crate::writer::Writer::write`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue<'a> {
    U8(u8),
    Bool(bool),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    Fd(u32),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(&'a str),
    Path(&'a str),
    Signature(&'a str),
    /// The type of the value about to be written inside a `<...>`
    /// variant. Consumed by the `<` character itself.
    Variant(&'a TypeSignature),
}
