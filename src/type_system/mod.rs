//! Type signature parsing, validation, and comparison.

mod compiler;
mod descriptor;

pub use descriptor::Descriptor;

use crate::error::Result;
use std::cmp::Ordering;

/// A compiled signature: the concatenated descriptor arrays of one or
/// more complete types, plus how many root-level complete types it
/// represents.
///
/// `begin_read`/`begin_write` accept a `TypeSignature` as the type to
/// visit at the root of a session; most callers compile exactly one
/// complete type (`root_count() == 1`), but a session over several
/// top-level values (as when marshalling several method arguments at
/// once) compiles the whole run in one call.
#[derive(Debug, Clone)]
pub struct TypeSignature {
    descriptors: Vec<Descriptor>,
    root_count: usize,
}

impl TypeSignature {
    /// Compile exactly one complete type from the start of `signature`,
    /// ignoring any trailing bytes.
    pub fn parse_single(signature: &str) -> Result<Self> {
        let descriptors = compiler::compile_one(signature.as_bytes())?;
        Ok(TypeSignature { descriptors, root_count: 1 })
    }

    /// Compile every complete type in `signature`, back to back. Fails
    /// unless the whole string is consumed by well-formed complete
    /// types.
    pub fn parse(signature: &str) -> Result<Self> {
        let (descriptors, root_count) = compiler::compile_all(signature.as_bytes())?;
        Ok(TypeSignature { descriptors, root_count })
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn root_count(&self) -> usize {
        self.root_count
    }

    /// Whether this signature's flattened element sequence equals `signature`.
    pub fn matches(&self, signature: &str) -> bool {
        compiler::compare(&self.descriptors, signature.as_bytes()) == Ordering::Equal
    }
}

/// Order a compiled type's descriptors against a raw signature string.
pub fn compare(subject: &[Descriptor], object: &str) -> Ordering {
    compiler::compare(subject, object.as_bytes())
}

/// Whether `signature` is a well-formed D-Bus signature: a (possibly
/// empty) sequence of complete types, at most 255 characters long.
///
/// Stricter than the type compiler: an embedded empty tuple `()` compiles
/// to a valid degenerate type (`TUPLE0`), but is not a legal textual
/// signature on its own, so it is rejected here even though
/// `TypeSignature::parse`/`parse_single` accept it. Dict-entries outside
/// an array are rejected by the compiler itself and so are caught by
/// `compile_all` below.
pub fn is_signature(signature: &str) -> bool {
    let bytes = signature.as_bytes();
    if bytes.is_empty() {
        return true;
    }
    if contains_empty_tuple(bytes) {
        return false;
    }
    match compiler::compile_all(bytes) {
        Ok(_) => true,
        Err(_) => false,
    }
}

fn contains_empty_tuple(sig: &[u8]) -> bool {
    sig.windows(2).any(|w| w == b"()")
}

pub(crate) fn compile_one(signature: &[u8]) -> Result<Vec<Descriptor>> {
    compiler::compile_one(signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_signature_is_valid() {
        assert!(is_signature(""));
    }

    #[test]
    fn simple_signature_is_valid() {
        assert!(is_signature("a{sv}"));
    }

    #[test]
    fn unterminated_container_is_invalid() {
        assert!(!is_signature("(si"));
    }

    #[test]
    fn multi_root_signature_counts_each_type() {
        let t = TypeSignature::parse("sit").unwrap();
        assert_eq!(t.root_count(), 3);
    }

    #[test]
    fn matches_checks_full_signature_equality() {
        let t = TypeSignature::parse_single("a{sv}").unwrap();
        assert!(t.matches("a{sv}"));
        assert!(!t.matches("a{ss}"));
    }

    #[test]
    fn dict_entry_outside_array_is_invalid_signature() {
        assert!(!is_signature("{yy}"));
        assert!(!is_signature("a{yb}{yb}"));
    }

    #[test]
    fn trailing_empty_tuple_is_invalid_signature() {
        assert!(!is_signature("u()"));
    }

    #[test]
    fn standalone_empty_tuple_is_invalid_signature() {
        // Unlike the type compiler, signature validation has no TUPLE0 exception.
        assert!(!is_signature("()"));
    }
}
