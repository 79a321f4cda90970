//! Object path validation.
//!
//! Grammar: `/` or `("/" 1*("A-Za-z0-9_"))+`. No empty segments, no
//! trailing slash unless the whole path is the root.

pub fn is_valid(bytes: &[u8]) -> bool {
    if bytes.is_empty() || bytes[0] != b'/' {
        return false;
    }
    if bytes == b"/" {
        return true;
    }

    let mut segment_len = 0usize;
    for &b in &bytes[1..] {
        if b == b'/' {
            if segment_len == 0 {
                return false; // empty segment, or trailing slash
            }
            segment_len = 0;
        } else if is_path_char(b) {
            segment_len += 1;
        } else {
            return false;
        }
    }

    segment_len != 0 // reject a trailing slash
}

fn is_path_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_valid() {
        assert!(is_valid(b"/"));
    }

    #[test]
    fn simple_path_is_valid() {
        assert!(is_valid(b"/org/freedesktop/DBus"));
    }

    #[test]
    fn empty_is_invalid() {
        assert!(!is_valid(b""));
    }

    #[test]
    fn missing_leading_slash_is_invalid() {
        assert!(!is_valid(b"org/freedesktop"));
    }

    #[test]
    fn trailing_slash_is_invalid() {
        assert!(!is_valid(b"/org/freedesktop/"));
    }

    #[test]
    fn empty_segment_is_invalid() {
        assert!(!is_valid(b"/org//freedesktop"));
    }

    #[test]
    fn disallowed_character_is_invalid() {
        assert!(!is_valid(b"/org/free-desktop"));
    }

    #[test]
    fn underscore_and_digits_allowed() {
        assert!(is_valid(b"/org/_1/node2"));
    }
}
