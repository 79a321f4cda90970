//! Two-pass signature compiler.
//!
//! Pass one walks the signature counting brackets to determine how many
//! descriptor slots a single complete type needs, without allocating.
//! Pass two walks it again, filling in a pre-sized `Vec<Descriptor>`
//! while tracking a stack of currently-open containers.

use super::descriptor::{builtin, Descriptor};
use crate::config::{ARRAY_DEPTH_MAX, TUPLE_DEPTH_MAX, TYPE_DEPTH_MAX, TYPE_LENGTH_MAX};
use crate::endian::align_up;
use crate::error::{Error, Result};

/// Count how many characters of `sig` make up the next complete type,
/// without validating element constellations beyond bracket matching.
fn scan_one(sig: &[u8]) -> Result<usize> {
    let mut n_type = 0usize;
    let mut depth = 0usize;

    loop {
        if n_type >= sig.len() || n_type >= TYPE_LENGTH_MAX {
            return Err(Error::OverlongType);
        }

        let c = sig[n_type];
        n_type += 1;

        match c {
            b'(' | b'{' => depth += 1,
            b')' | b'}' => {
                if depth == 0 {
                    return Err(Error::DepthOverflow);
                }
                depth -= 1;
            }
            _ => {}
        }

        if !(c == b'a' || depth > 0) {
            break;
        }
    }

    Ok(n_type)
}

/// Compile the single complete type found at the start of `sig`. Trailing
/// bytes (if any) are not consumed or examined — the caller learns how
/// many bytes were used via the returned `Vec`'s `descriptors[0].length`.
pub fn compile_one(sig: &[u8]) -> Result<Vec<Descriptor>> {
    let n_type = scan_one(sig)?;
    let zero = Descriptor { size: 0, alignment: 0, element: 0, length: 0, basic: false };
    let mut out = vec![zero; n_type];
    let mut stack: Vec<usize> = Vec::with_capacity(TYPE_DEPTH_MAX);
    let mut depth = 0usize;
    let mut depth_tuple = 0usize;

    let mut i = 0usize;
    while i < n_type {
        let c = sig[i];

        if let Some(&ic) = stack.last() {
            if out[ic].element == b'{' {
                if i < ic + 2 {
                    let is_basic = builtin(c).map(|d| d.basic).unwrap_or(false);
                    if !is_basic {
                        return Err(Error::InvalidType);
                    }
                } else if i == ic + 2 {
                    if c == b'}' {
                        return Err(Error::InvalidType);
                    }
                } else if c != b'}' {
                    return Err(Error::InvalidType);
                }
            }
        }

        let this_idx;

        match c {
            b'(' => {
                depth_tuple += 1;
                depth += 1;
                check_depth(depth, depth_tuple)?;
                out[i] = Descriptor { size: 0, alignment: 3, element: c, length: 2, basic: false };
                stack.push(i);
                i += 1;
                continue;
            }
            b'{' => {
                let parent_is_array = matches!(stack.last(), Some(&p) if out[p].element == b'a');
                if !parent_is_array {
                    return Err(Error::InvalidType);
                }
                depth_tuple += 1;
                depth += 1;
                check_depth(depth, depth_tuple)?;
                out[i] = Descriptor { size: 0, alignment: 3, element: c, length: 2, basic: false };
                stack.push(i);
                i += 1;
                continue;
            }
            b'a' => {
                depth += 1;
                check_depth(depth, depth_tuple)?;
                out[i] = Descriptor { size: 0, alignment: 2, element: c, length: 1, basic: false };
                stack.push(i);
                i += 1;
                continue;
            }
            b')' | b'}' => {
                let expected_open = if c == b'}' { b'{' } else { b'(' };
                let ic = match stack.last() {
                    Some(&ic) if out[ic].element == expected_open => ic,
                    _ => return Err(Error::InvalidType),
                };
                out[i] = Descriptor { size: 0, alignment: 0, element: c, length: 1, basic: false };
                stack.pop();
                depth -= 1;
                depth_tuple -= 1;
                this_idx = ic;
            }
            _ => {
                out[i] = builtin(c).ok_or(Error::InvalidType)?;
                this_idx = i;
            }
        }

        // Terminal-type handling: `this_idx` just completed. An array has
        // exactly one element type, so completing it also completes any
        // enclosing array(s) in a chain.
        let mut this = this_idx;
        while let Some(&top) = stack.last() {
            if out[top].element != b'a' {
                break;
            }
            let child_len = out[this].length;
            out[top].length += child_len;
            this = top;
            stack.pop();
            depth -= 1;
        }

        match stack.last() {
            Some(&top) => {
                let this_size = out[this].size;
                let this_align = out[this].alignment;
                if this_size != 0 && (this == top + 1 || out[top].size != 0) {
                    let aligned = align_up(out[top].size as usize, 1usize << this_align) as u16;
                    out[top].size = aligned + this_size;
                } else {
                    out[top].size = 0;
                }
                out[top].length += out[this].length;
            }
            None => return Ok(out),
        }

        i += 1;
    }

    Err(Error::InvalidType)
}

fn check_depth(depth: usize, depth_tuple: usize) -> Result<()> {
    if depth > TYPE_DEPTH_MAX || depth_tuple > TUPLE_DEPTH_MAX || depth - depth_tuple > ARRAY_DEPTH_MAX {
        Err(Error::DepthOverflow)
    } else {
        Ok(())
    }
}

/// Compile every complete type in `sig`, back to back, returning the
/// concatenated descriptor array and the number of root-level types
/// found. Used both for multi-root read/write sessions and for
/// signature validation.
pub fn compile_all(sig: &[u8]) -> Result<(Vec<Descriptor>, usize)> {
    if sig.len() > TYPE_LENGTH_MAX {
        return Err(Error::OverlongType);
    }

    let mut out = Vec::new();
    let mut root_count = 0usize;
    let mut offset = 0usize;

    while offset < sig.len() {
        let one = compile_one(&sig[offset..])?;
        offset += one[0].length as usize;
        out.extend(one);
        root_count += 1;
    }

    Ok((out, root_count))
}

/// Order `subject` (a compiled type's descriptor slice) against `object`
/// (a raw signature string), by length first, then lexicographically by
/// element character. Neither side is validated for well-formedness.
pub fn compare(subject: &[Descriptor], object: &[u8]) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    if subject.len() != object.len() {
        return if subject.len() > object.len() { Ordering::Greater } else { Ordering::Less };
    }

    for (d, &b) in subject.iter().zip(object.iter()) {
        match d.element.cmp(&b) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_type_compiles_to_one_descriptor() {
        let d = compile_one(b"i").unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].element, b'i');
        assert_eq!(d[0].size, 4);
        assert_eq!(d[0].alignment, 2);
        assert!(d[0].basic);
    }

    #[test]
    fn array_of_basic_compiles() {
        let d = compile_one(b"ai").unwrap();
        assert_eq!(d[0].element, b'a');
        assert_eq!(d[0].length, 2);
        assert_eq!(d[1].element, b'i');
    }

    #[test]
    fn struct_of_two_basics_has_fixed_size() {
        let d = compile_one(b"(yi)").unwrap();
        assert_eq!(d[0].element, b'(');
        // y at offset 0 (size 1), pad to 4, i at offset 4 (size 4) => 8
        assert_eq!(d[0].size, 8);
        assert_eq!(d[0].length, 4);
    }

    #[test]
    fn struct_containing_dynamic_type_has_no_fixed_size() {
        let d = compile_one(b"(si)").unwrap();
        assert_eq!(d[0].size, 0);
    }

    #[test]
    fn dict_entry_requires_basic_key() {
        assert_eq!(compile_one(b"a{(i)i}"), Err(Error::InvalidType));
    }

    #[test]
    fn dict_entry_requires_exactly_two_types() {
        assert_eq!(compile_one(b"a{s}"), Err(Error::InvalidType));
        assert_eq!(compile_one(b"a{sii}"), Err(Error::InvalidType));
    }

    #[test]
    fn unmatched_closing_bracket_is_depth_overflow() {
        assert_eq!(compile_one(b")"), Err(Error::DepthOverflow));
    }

    #[test]
    fn empty_tuple_compiles_as_tuple0() {
        // "()" is a degenerate but valid compiled type (TUPLE0); textual
        // signature validation is stricter and rejects it, see `is_signature`.
        let d = compile_one(b"()").unwrap();
        assert_eq!(d[0].element, b'(');
        assert_eq!(d[0].size, 0);
    }

    #[test]
    fn dict_entry_requires_array_parent() {
        assert_eq!(compile_one(b"{yy}"), Err(Error::InvalidType));
        assert_eq!(compile_one(b"(y{yy})"), Err(Error::InvalidType));
    }

    #[test]
    fn unknown_character_is_invalid() {
        assert_eq!(compile_one(b"z"), Err(Error::InvalidType));
    }

    #[test]
    fn overlong_signature_is_rejected() {
        let sig = vec![b'a'; 256];
        assert_eq!(compile_one(&sig), Err(Error::OverlongType));
    }

    #[test]
    fn excessive_array_nesting_is_depth_overflow() {
        let sig = vec![b'a'; 33].into_iter().chain(std::iter::once(b'y')).collect::<Vec<_>>();
        assert_eq!(compile_one(&sig), Err(Error::DepthOverflow));
    }

    #[test]
    fn compile_all_handles_multiple_root_types() {
        let (descriptors, root_count) = compile_all(b"sit").unwrap();
        assert_eq!(root_count, 3);
        assert_eq!(descriptors.len(), 3);
    }

    #[test]
    fn compile_one_ignores_trailing_bytes() {
        let d = compile_one(b"iii").unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].length, 1);
    }

    #[test]
    fn compare_matches_equal_signature() {
        let d = compile_one(b"(yua{sv}d)").unwrap();
        assert_eq!(compare(&d, b"(yua{sv}d)"), std::cmp::Ordering::Equal);
        assert_ne!(compare(&d, b"(yi)"), std::cmp::Ordering::Equal);
    }
}
