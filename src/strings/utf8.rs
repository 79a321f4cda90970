//! UTF-8 validation per Unicode 9.0.0, Chapter 3, Section D92.
//!
//! This does not reuse `str::from_utf8`: the wire format additionally
//! forbids an embedded NUL anywhere in the string body, which a generic
//! UTF-8 validator does not know about.

/// Verify that `bytes` is well-formed UTF-8 with no embedded NUL.
pub fn is_valid(bytes: &[u8]) -> bool {
    let mut s = bytes;

    while let Some(&lead) = s.first() {
        if lead == 0x00 {
            return false;
        } else if lead < 0x80 {
            s = &s[1..];
        } else if lead < 0xC2 {
            return false;
        } else if lead < 0xE0 {
            if !continuation_run(s, 1, &[(0x80, 0xBF)]) {
                return false;
            }
            s = &s[2..];
        } else if lead < 0xE1 {
            if !continuation_run(s, 1, &[(0xA0, 0xBF), (0x80, 0xBF)]) {
                return false;
            }
            s = &s[3..];
        } else if lead < 0xED {
            if !continuation_run(s, 1, &[(0x80, 0xBF), (0x80, 0xBF)]) {
                return false;
            }
            s = &s[3..];
        } else if lead < 0xEE {
            if !continuation_run(s, 1, &[(0x80, 0x9F), (0x80, 0xBF)]) {
                return false;
            }
            s = &s[3..];
        } else if lead < 0xF0 {
            if !continuation_run(s, 1, &[(0x80, 0xBF), (0x80, 0xBF)]) {
                return false;
            }
            s = &s[3..];
        } else if lead < 0xF1 {
            if !continuation_run(s, 1, &[(0x90, 0xBF), (0x80, 0xBF), (0x80, 0xBF)]) {
                return false;
            }
            s = &s[4..];
        } else if lead < 0xF4 {
            if !continuation_run(s, 1, &[(0x80, 0xBF), (0x80, 0xBF), (0x80, 0xBF)]) {
                return false;
            }
            s = &s[4..];
        } else if lead < 0xF5 {
            if !continuation_run(s, 1, &[(0x80, 0x8F), (0x80, 0xBF), (0x80, 0xBF)]) {
                return false;
            }
            s = &s[4..];
        } else {
            return false;
        }
    }

    true
}

/// Check that `s[offset..offset + ranges.len()]` exists and each byte falls
/// within the corresponding inclusive range.
fn continuation_run(s: &[u8], offset: usize, ranges: &[(u8, u8)]) -> bool {
    if s.len() < offset + ranges.len() {
        return false;
    }
    for (i, &(lo, hi)) in ranges.iter().enumerate() {
        let b = s[offset + i];
        if b < lo || b > hi {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_valid() {
        assert!(is_valid(b"hello world"));
    }

    #[test]
    fn empty_is_valid() {
        assert!(is_valid(b""));
    }

    #[test]
    fn embedded_nul_is_invalid() {
        assert!(!is_valid(b"ab\0cd"));
    }

    #[test]
    fn lone_continuation_byte_is_invalid() {
        assert!(!is_valid(&[0x80]));
    }

    #[test]
    fn overlong_two_byte_lead_is_invalid() {
        // 0xC0 and 0xC1 are always overlong encodings of ASCII.
        assert!(!is_valid(&[0xC0, 0x80]));
        assert!(!is_valid(&[0xC1, 0x80]));
    }

    #[test]
    fn valid_two_byte_sequence() {
        // U+00E9 'é'
        assert!(is_valid(&[0xC3, 0xA9]));
    }

    #[test]
    fn surrogate_range_rejected_at_ed() {
        // U+D800 would encode as ED A0 80, which must be rejected.
        assert!(!is_valid(&[0xED, 0xA0, 0x80]));
    }

    #[test]
    fn valid_three_byte_sequence() {
        // U+20AC '€'
        assert!(is_valid(&[0xE2, 0x82, 0xAC]));
    }

    #[test]
    fn valid_four_byte_sequence() {
        // U+1F600 emoji
        assert!(is_valid(&[0xF0, 0x9F, 0x98, 0x80]));
    }

    #[test]
    fn four_byte_above_u10ffff_rejected() {
        assert!(!is_valid(&[0xF5, 0x80, 0x80, 0x80]));
    }

    #[test]
    fn truncated_multibyte_sequence_rejected() {
        assert!(!is_valid(&[0xE2, 0x82]));
    }
}
