//! The container-nesting stack shared by the reader and writer.
//!
//! A `Level` is pushed whenever `read`/`write` opens an array, tuple,
//! dict-entry, or variant, and popped on the matching close character.
//! The byte cursor itself lives on the reader/writer, not here — only
//! the handful of bytes each level needs to remember about *its own*
//! container (an array's declared end, or the offset of its length
//! placeholder) live on the frame.

use crate::type_system::Descriptor;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub(crate) struct Level {
    pub(crate) types: Rc<Vec<Descriptor>>,
    pub(crate) i_type: usize,
    pub(crate) n_type: usize,
    /// 0 at the root, otherwise one of `a`, `(`, `{`, `v`.
    pub(crate) container: u8,
    /// Read mode only: absolute offset where an open array's body ends.
    pub(crate) array_end: usize,
    /// Write mode only: absolute offset of an open array's 4-byte length
    /// placeholder.
    pub(crate) patch_offset: usize,
}

impl Level {
    pub(crate) fn root(types: Rc<Vec<Descriptor>>) -> Self {
        let n_type = types.len();
        Level { types, i_type: 0, n_type, container: 0, array_end: 0, patch_offset: 0 }
    }

    pub(crate) fn current(&self) -> Descriptor {
        self.types[self.i_type]
    }

    /// Enter the interior of the container descriptor at `i_type`,
    /// dropping `trailing` slots from the end of its subtree (1 for an
    /// array, which has no closing descriptor; 2 for a tuple or
    /// dict-entry, which does).
    pub(crate) fn enter_container(&self, trailing: usize) -> Level {
        let desc = self.current();
        Level {
            types: self.types.clone(),
            i_type: self.i_type + 1,
            n_type: desc.length as usize - trailing,
            container: desc.element,
            array_end: 0,
            patch_offset: 0,
        }
    }

    pub(crate) fn enter_variant(types: Rc<Vec<Descriptor>>) -> Level {
        let n_type = types.len();
        Level { types, i_type: 0, n_type, container: b'v', array_end: 0, patch_offset: 0 }
    }

    /// Advance past a just-completed terminal type. Arrays repeat their
    /// single element type instead of advancing.
    pub(crate) fn advance(&mut self) {
        if self.container != b'a' {
            let len = self.current().length as usize;
            self.i_type += len;
            self.n_type -= len;
        }
    }
}

/// Map a format character to the element it must match: closers map to
/// their opener's element, everything else maps to itself.
pub(crate) fn real_element(c: u8) -> u8 {
    match c {
        b']' => b'a',
        b'[' => b'a',
        b'>' => b'v',
        b'<' => b'v',
        b')' => b'(',
        b'}' => b'{',
        other => other,
    }
}
