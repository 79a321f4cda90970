//! Format-driven decoding.

use crate::config::TYPE_DEPTH_MAX;
use crate::endian;
use crate::error::{Error, Result};
use crate::frame::{real_element, Level};
use crate::strings;
use crate::type_system::{self, TypeSignature};
use crate::value::ReadValue;
use std::rc::Rc;

/// A read session over a borrowed, 8-byte-aligned byte slice.
pub struct Reader<'d> {
    data: &'d [u8],
    cursor: usize,
    big_endian: bool,
    levels: Vec<Level>,
    poison: Option<Error>,
}

impl<'d> Reader<'d> {
    /// Begin a read session rooted at `ty` over `data`.
    ///
    /// `data` must be 8-byte aligned; an unaligned buffer cannot hold a
    /// canonical D-Bus message body, since every 8-byte-aligned value
    /// inside it is positioned relative to the start of `data`.
    pub fn begin(big_endian: bool, ty: &TypeSignature, data: &'d [u8]) -> Result<Self> {
        if (data.as_ptr() as usize) % 8 != 0 {
            return Err(Error::Misaligned);
        }
        let types = Rc::new(ty.descriptors().to_vec());
        Ok(Reader {
            data,
            cursor: 0,
            big_endian,
            levels: vec![Level::root(types)],
            poison: None,
        })
    }

    pub fn poison(&self) -> Option<Error> {
        self.poison
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// Whether the innermost open array has more elements to read.
    pub fn more(&self) -> bool {
        match self.levels.last() {
            Some(level) if level.container == b'a' => self.cursor < level.array_end,
            _ => false,
        }
    }

    fn level(&self) -> &Level {
        self.levels.last().expect("reader always has a root level")
    }

    fn level_mut(&mut self) -> &mut Level {
        self.levels.last_mut().expect("reader always has a root level")
    }

    fn gate(&self, c: u8) -> Result<()> {
        let r = real_element(c);
        match c {
            b'a' | b'v' => Err(Error::FormatMismatch),
            b']' | b'>' | b')' | b'}' => {
                let level = self.level();
                if level.container != r {
                    return Err(Error::FormatMismatch);
                }
                if c != b']' && level.n_type != 0 {
                    return Err(Error::FormatMismatch);
                }
                Ok(())
            }
            b'[' | b'<' | b'(' | b'{' => {
                let level = self.level();
                if level.n_type == 0 || level.current().element != r {
                    return Err(Error::FormatMismatch);
                }
                if self.levels.len() > TYPE_DEPTH_MAX {
                    return Err(Error::DepthOverflow);
                }
                Ok(())
            }
            _ => {
                let level = self.level();
                if level.n_type == 0 || level.current().element != r {
                    return Err(Error::FormatMismatch);
                }
                Ok(())
            }
        }
    }

    fn align(&mut self, alignment_exp: u8) -> Result<()> {
        let alignment = 1usize << alignment_exp;
        let target = endian::align_up(self.cursor, alignment);
        let pad = self.data.get(self.cursor..target).ok_or(Error::OutOfBounds)?;
        if pad.iter().any(|&b| b != 0) {
            return Err(Error::CorruptData);
        }
        self.cursor = target;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'d [u8]> {
        let end = self.cursor.checked_add(n).ok_or(Error::OutOfBounds)?;
        let slice = self.data.get(self.cursor..end).ok_or(Error::OutOfBounds)?;
        self.cursor = end;
        Ok(slice)
    }

    fn read_u8_raw(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16_raw(&mut self) -> Result<u16> {
        self.align(1)?;
        let bytes: [u8; 2] = self.take(2)?.try_into().unwrap();
        Ok(endian::read_u16(bytes, self.big_endian))
    }

    fn read_u32_raw(&mut self) -> Result<u32> {
        self.align(2)?;
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(endian::read_u32(bytes, self.big_endian))
    }

    fn read_u64_raw(&mut self) -> Result<u64> {
        self.align(3)?;
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(endian::read_u64(bytes, self.big_endian))
    }

    fn read_string_body(&mut self, len: usize) -> Result<&'d [u8]> {
        let body = self.take(len)?;
        let nul = self.read_u8_raw()?;
        if nul != 0 {
            return Err(Error::CorruptData);
        }
        Ok(body)
    }

    fn after_terminal(&mut self) {
        self.level_mut().advance();
    }

    /// Decode `format` and return one [`ReadValue`] per terminal
    /// character (containers produce no values of their own).
    pub fn read(&mut self, format: &str) -> Result<Vec<ReadValue>> {
        if let Some(e) = self.poison {
            return Err(e);
        }
        match self.try_read(format) {
            Ok(values) => Ok(values),
            Err(e) => {
                self.poison = Some(e);
                Err(e)
            }
        }
    }

    /// Like [`Reader::read`] but discards decoded values; supports the
    /// `*` wildcard to fast-forward one complete type.
    pub fn skip(&mut self, format: &str) -> Result<()> {
        if let Some(e) = self.poison {
            return Err(e);
        }
        match self.try_skip(format) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.poison = Some(e);
                Err(e)
            }
        }
    }

    /// Finish the session: every root type must have been fully
    /// consumed and the cursor must have reached the end of the buffer.
    pub fn end(mut self) -> Result<()> {
        if let Some(e) = self.poison {
            return Err(e);
        }
        if self.levels.len() != 1 || self.level().n_type != 0 || self.cursor != self.data.len() {
            return Err(Error::FormatMismatch);
        }
        self.levels.clear();
        Ok(())
    }

    fn try_read(&mut self, format: &str) -> Result<Vec<ReadValue>> {
        let mut out = Vec::new();

        for c in format.bytes() {
            self.gate(c)?;

            match c {
                b'[' => {
                    let elem_align = self.level().types[self.level().i_type + 1].alignment;
                    let len = self.read_u32_raw()? as usize;
                    self.align(elem_align)?;
                    let start = self.cursor;
                    let end = start.checked_add(len).ok_or(Error::OutOfBounds)?;
                    if end > self.data.len() {
                        return Err(Error::OutOfBounds);
                    }
                    let mut level = self.level().enter_container(1);
                    level.array_end = end;
                    self.levels.push(level);
                    continue;
                }
                b']' => {
                    if self.cursor != self.level().array_end {
                        return Err(Error::CorruptData);
                    }
                    self.levels.pop();
                    self.after_terminal();
                }
                b'(' | b'{' => {
                    self.align(3)?;
                    let level = self.level().enter_container(2);
                    self.levels.push(level);
                    continue;
                }
                b')' | b'}' => {
                    self.levels.pop();
                    self.after_terminal();
                }
                b'<' => {
                    let len = self.read_u8_raw()? as usize;
                    let sig_bytes = self.read_string_body(len)?.to_vec();
                    let descriptors = type_system::compile_one(&sig_bytes)?;
                    if descriptors.first().map(|d| d.length as usize) != Some(sig_bytes.len()) {
                        return Err(Error::CorruptData);
                    }
                    out.push(ReadValue::Signature(String::from_utf8(sig_bytes).map_err(|_| Error::CorruptData)?));
                    self.levels.push(Level::enter_variant(Rc::new(descriptors)));
                    continue;
                }
                b'>' => {
                    self.levels.pop();
                    self.after_terminal();
                }
                b'y' => {
                    out.push(ReadValue::U8(self.read_u8_raw()?));
                    self.after_terminal();
                }
                b'b' => {
                    let v = self.read_u32_raw()?;
                    if v > 1 {
                        return Err(Error::CorruptData);
                    }
                    out.push(ReadValue::Bool(v != 0));
                    self.after_terminal();
                }
                b'n' => {
                    out.push(ReadValue::I16(self.read_u16_raw()? as i16));
                    self.after_terminal();
                }
                b'q' => {
                    out.push(ReadValue::U16(self.read_u16_raw()?));
                    self.after_terminal();
                }
                b'i' => {
                    out.push(ReadValue::I32(self.read_u32_raw()? as i32));
                    self.after_terminal();
                }
                b'u' => {
                    out.push(ReadValue::U32(self.read_u32_raw()?));
                    self.after_terminal();
                }
                b'h' => {
                    out.push(ReadValue::Fd(self.read_u32_raw()?));
                    self.after_terminal();
                }
                b'x' => {
                    out.push(ReadValue::I64(self.read_u64_raw()? as i64));
                    self.after_terminal();
                }
                b't' => {
                    out.push(ReadValue::U64(self.read_u64_raw()?));
                    self.after_terminal();
                }
                b'd' => {
                    let bits = self.read_u64_raw()?;
                    out.push(ReadValue::F64(f64::from_bits(bits)));
                    self.after_terminal();
                }
                b's' => {
                    let len = self.read_u32_raw()? as usize;
                    let body = self.read_string_body(len)?;
                    if !strings::is_string(body) {
                        return Err(Error::CorruptData);
                    }
                    out.push(ReadValue::Str(String::from_utf8(body.to_vec()).map_err(|_| Error::CorruptData)?));
                    self.after_terminal();
                }
                b'o' => {
                    let len = self.read_u32_raw()? as usize;
                    let body = self.read_string_body(len)?;
                    if !strings::is_path(body) {
                        return Err(Error::CorruptData);
                    }
                    out.push(ReadValue::Path(String::from_utf8(body.to_vec()).map_err(|_| Error::CorruptData)?));
                    self.after_terminal();
                }
                b'g' => {
                    let len = self.read_u8_raw()? as usize;
                    let body = self.read_string_body(len)?;
                    if !type_system::is_signature(std::str::from_utf8(body).map_err(|_| Error::CorruptData)?) {
                        return Err(Error::CorruptData);
                    }
                    out.push(ReadValue::Signature(String::from_utf8(body.to_vec()).map_err(|_| Error::CorruptData)?));
                    self.after_terminal();
                }
                _ => return Err(Error::FormatMismatch),
            }
        }

        Ok(out)
    }

    fn try_skip(&mut self, format: &str) -> Result<()> {
        for c in format.bytes() {
            if c == b'*' {
                self.fast_forward()?;
                continue;
            }
            self.try_read(&(c as char).to_string())?;
        }
        Ok(())
    }

    /// Fast-forward one complete type at the current position.
    fn fast_forward(&mut self) -> Result<()> {
        let element = self.level().current().element;
        match element {
            b'a' => {
                let fixed_size = fixed_element_size(self.level().types[self.level().i_type + 1].element);
                self.try_read("[")?;
                match fixed_size {
                    Some(size) if size > 0 => {
                        let remaining = self.level().array_end - self.cursor;
                        let whole = (remaining / size) * size;
                        if self.cursor + whole > self.data.len() {
                            return Err(Error::OutOfBounds);
                        }
                        self.cursor += whole;
                        if self.cursor != self.level().array_end {
                            return Err(Error::CorruptData);
                        }
                    }
                    _ => {
                        while self.more() {
                            self.fast_forward()?;
                        }
                    }
                }
                self.try_read("]")?;
            }
            b'(' => {
                self.try_read("(")?;
                while self.level().n_type != 0 {
                    self.fast_forward()?;
                }
                self.try_read(")")?;
            }
            b'{' => {
                self.try_read("{")?;
                while self.level().n_type != 0 {
                    self.fast_forward()?;
                }
                self.try_read("}")?;
            }
            b'v' => {
                self.try_read("<")?;
                while self.level().n_type != 0 {
                    self.fast_forward()?;
                }
                self.try_read(">")?;
            }
            other => {
                self.try_read(&(other as char).to_string())?;
            }
        }
        Ok(())
    }
}

/// Fixed byte width of a non-validated basic element, for the array
/// fast-forward optimization. `b` is excluded (its values still need
/// range validation, so it cannot be bulk-skipped).
fn fixed_element_size(element: u8) -> Option<usize> {
    match element {
        b'y' => Some(1),
        b'n' | b'q' => Some(2),
        b'i' | b'h' | b'u' => Some(4),
        b'x' | b't' | b'd' => Some(8),
        _ => None,
    }
}
