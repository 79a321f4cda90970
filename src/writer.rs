//! Format-driven encoding.

use crate::config::{TYPE_DEPTH_MAX, WRITE_BUFFER_BASE};
use crate::endian;
use crate::error::{Error, Result};
use crate::frame::{real_element, Level};
use crate::type_system::TypeSignature;
use crate::value::WriteValue;
use std::rc::Rc;

/// A write session building up an owned, growable buffer.
pub struct Writer {
    data: Vec<u8>,
    cursor: usize,
    big_endian: bool,
    levels: Vec<Level>,
    poison: Option<Error>,
}

impl Writer {
    /// Begin a write session rooted at `ty`.
    pub fn begin(big_endian: bool, ty: &TypeSignature) -> Self {
        let types = Rc::new(ty.descriptors().to_vec());
        Writer {
            data: Vec::new(),
            cursor: 0,
            big_endian,
            levels: vec![Level::root(types)],
            poison: None,
        }
    }

    pub fn poison(&self) -> Option<Error> {
        self.poison
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    fn level(&self) -> &Level {
        self.levels.last().expect("writer always has a root level")
    }

    fn level_mut(&mut self) -> &mut Level {
        self.levels.last_mut().expect("writer always has a root level")
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

    /// Reserve room for `align + n` bytes at the cursor, zero-filling
    /// alignment padding (and `data`'s bytes too, if `data` is `None`),
    /// then copy `data` in and advance the cursor.
    fn write_data(&mut self, alignment_exp: u8, data: Option<&[u8]>, n: usize) {
        let alignment = 1usize << alignment_exp;
        let pad = endian::align_up(self.cursor, alignment) - self.cursor;
        let needed = self.cursor + pad + n;

        if needed > self.data.len() {
            let mut grown = if needed <= WRITE_BUFFER_BASE {
                WRITE_BUFFER_BASE
            } else {
                needed.next_power_of_two()
            };
            if grown < needed {
                grown = needed;
            }
            self.data.resize(grown, 0);
        }

        for b in &mut self.data[self.cursor..self.cursor + pad] {
            *b = 0;
        }
        self.cursor += pad;

        match data {
            Some(bytes) => self.data[self.cursor..self.cursor + n].copy_from_slice(bytes),
            None => {
                for b in &mut self.data[self.cursor..self.cursor + n] {
                    *b = 0;
                }
            }
        }
        self.cursor += n;
    }

    fn write_u8_raw(&mut self, v: u8) {
        self.write_data(0, Some(&[v]), 1);
    }

    fn write_u16_raw(&mut self, v: u16) {
        let bytes = endian::write_u16(v, self.big_endian);
        self.write_data(1, Some(&bytes), 2);
    }

    fn write_u32_raw(&mut self, v: u32) {
        let bytes = endian::write_u32(v, self.big_endian);
        self.write_data(2, Some(&bytes), 4);
    }

    fn write_u64_raw(&mut self, v: u64) {
        let bytes = endian::write_u64(v, self.big_endian);
        self.write_data(3, Some(&bytes), 8);
    }

    fn after_terminal(&mut self) {
        self.level_mut().advance();
    }

    /// Encode `format`, consuming one [`WriteValue`] per terminal (and
    /// per `<`) character, in order.
    pub fn write(&mut self, format: &str, values: &[WriteValue<'_>]) -> Result<()> {
        if let Some(e) = self.poison {
            return Err(e);
        }
        match self.try_write(format, values) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.poison = Some(e);
                Err(e)
            }
        }
    }

    /// Finish the session: every root type must have been fully written.
    /// On success, the finished buffer is returned; on failure, it is
    /// dropped along with the session.
    pub fn end(self) -> Result<Vec<u8>> {
        if let Some(e) = self.poison {
            return Err(e);
        }
        if self.levels.len() != 1 || self.level().n_type != 0 {
            return Err(Error::FormatMismatch);
        }
        let Writer { mut data, cursor, .. } = self;
        data.truncate(cursor);
        Ok(data)
    }

    fn try_write(&mut self, format: &str, values: &[WriteValue<'_>]) -> Result<()> {
        let mut values = values.iter();

        for c in format.bytes() {
            self.gate(c)?;

            match c {
                b'[' => {
                    self.write_u32_raw(0);
                    let patch_offset = self.cursor - 4;
                    let elem_align = self.level().types[self.level().i_type + 1].alignment;
                    self.write_data(elem_align, None, 0);
                    let mut level = self.level().enter_container(1);
                    level.patch_offset = patch_offset;
                    self.levels.push(level);
                    continue;
                }
                b']' => {
                    let end = self.cursor;
                    let patch_offset = self.level().patch_offset;
                    let body_start = self.array_body_start(patch_offset);
                    let len = (end - body_start) as u32;
                    let bytes = endian::write_u32(len, self.big_endian);
                    self.data[patch_offset..patch_offset + 4].copy_from_slice(&bytes);
                    self.levels.pop();
                    self.after_terminal();
                }
                b'(' | b'{' => {
                    self.write_data(3, None, 0);
                    let level = self.level().enter_container(2);
                    self.levels.push(level);
                    continue;
                }
                b')' | b'}' => {
                    self.levels.pop();
                    self.after_terminal();
                }
                b'<' => {
                    let ty = match values.next() {
                        Some(WriteValue::Variant(ty)) => *ty,
                        _ => return Err(Error::FormatMismatch),
                    };
                    let descriptors = ty.descriptors();
                    let len = descriptors.len();
                    if len > u8::MAX as usize {
                        return Err(Error::InvalidType);
                    }
                    self.write_u8_raw(len as u8);
                    let sig: Vec<u8> = descriptors.iter().map(|d| d.element).collect();
                    self.write_data(0, Some(&sig), len);
                    self.write_u8_raw(0);
                    self.levels.push(Level::enter_variant(Rc::new(descriptors.to_vec())));
                    continue;
                }
                b'>' => {
                    self.levels.pop();
                    self.after_terminal();
                }
                b'y' => {
                    self.write_u8_raw(take_u8(&mut values)?);
                    self.after_terminal();
                }
                b'b' => {
                    self.write_u32_raw(take_bool(&mut values)? as u32);
                    self.after_terminal();
                }
                b'n' => {
                    self.write_u16_raw(take_i16(&mut values)? as u16);
                    self.after_terminal();
                }
                b'q' => {
                    self.write_u16_raw(take_u16(&mut values)?);
                    self.after_terminal();
                }
                b'i' => {
                    self.write_u32_raw(take_i32(&mut values)? as u32);
                    self.after_terminal();
                }
                b'u' => {
                    self.write_u32_raw(take_u32(&mut values)?);
                    self.after_terminal();
                }
                b'h' => {
                    self.write_u32_raw(take_fd(&mut values)?);
                    self.after_terminal();
                }
                b'x' => {
                    self.write_u64_raw(take_i64(&mut values)? as u64);
                    self.after_terminal();
                }
                b't' => {
                    self.write_u64_raw(take_u64(&mut values)?);
                    self.after_terminal();
                }
                b'd' => {
                    self.write_u64_raw(take_f64(&mut values)?.to_bits());
                    self.after_terminal();
                }
                b's' => {
                    let s = take_str(&mut values)?;
                    self.write_string(s)?;
                    self.after_terminal();
                }
                b'o' => {
                    let s = take_path(&mut values)?;
                    self.write_string(s)?;
                    self.after_terminal();
                }
                b'g' => {
                    let s = take_signature(&mut values)?;
                    if s.len() > u8::MAX as usize {
                        return Err(Error::InvalidType);
                    }
                    self.write_u8_raw(s.len() as u8);
                    self.write_data(0, Some(s.as_bytes()), s.len());
                    self.write_u8_raw(0);
                    self.after_terminal();
                }
                _ => return Err(Error::FormatMismatch),
            }
        }

        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        if s.len() > u32::MAX as usize {
            return Err(Error::InvalidType);
        }
        self.write_u32_raw(s.len() as u32);
        self.write_data(0, Some(s.as_bytes()), s.len());
        self.write_u8_raw(0);
        Ok(())
    }

    /// The offset where an array's body actually begins: right after the
    /// 4-byte placeholder and whatever alignment padding was inserted
    /// before the first element.
    fn array_body_start(&self, patch_offset: usize) -> usize {
        let elem_align = 1usize << self.level().types[self.level().i_type].alignment;
        endian::align_up(patch_offset + 4, elem_align)
    }
}

fn take_u8<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<u8> {
    match values.next() {
        Some(WriteValue::U8(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_bool<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<bool> {
    match values.next() {
        Some(WriteValue::Bool(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_i16<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<i16> {
    match values.next() {
        Some(WriteValue::I16(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_u16<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<u16> {
    match values.next() {
        Some(WriteValue::U16(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_i32<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<i32> {
    match values.next() {
        Some(WriteValue::I32(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_u32<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<u32> {
    match values.next() {
        Some(WriteValue::U32(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_fd<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<u32> {
    match values.next() {
        Some(WriteValue::Fd(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_i64<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<i64> {
    match values.next() {
        Some(WriteValue::I64(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_u64<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<u64> {
    match values.next() {
        Some(WriteValue::U64(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_f64<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<f64> {
    match values.next() {
        Some(WriteValue::F64(v)) => Ok(*v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_str<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<&'v str> {
    match values.next() {
        Some(WriteValue::Str(v)) => Ok(v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_path<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<&'v str> {
    match values.next() {
        Some(WriteValue::Path(v)) => Ok(v),
        _ => Err(Error::FormatMismatch),
    }
}

fn take_signature<'a, 'v>(values: &mut impl Iterator<Item = &'a WriteValue<'v>>) -> Result<&'v str> {
    match values.next() {
        Some(WriteValue::Signature(v)) => Ok(v),
        _ => Err(Error::FormatMismatch),
    }
}
