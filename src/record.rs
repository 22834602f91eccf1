//! Borrowed record views: named field access over a caller-owned buffer.
//!
//! [`Record`] reads through `&[u8]`, [`RecordMut`] also writes through `&mut [u8]`. Both are a
//! layout, a buffer, a byte offset and the host byte order; they never allocate or resize the
//! buffer and only touch bytes in `offset..offset + layout.byte_len()`.
//!
//! Field access goes through two capability traits:
//!
//! | Trait | Primitives | Built on top |
//! |-------|------------|--------------|
//! | [`FieldAccess`] | `has`, `get_bits`, `get` | `get_many`, `has_many`, `keys`, `values`, `entries`, `bits`, `bit_entries` |
//! | [`FieldAccessMut`] | `set_bits`, `set`, `delete` | `set_many`, `delete_many`, `clear` |
//!
//! ## Example
//!
//! ```
//! use bitstruct::{BitPacked, Endianness, FieldAccess, FieldAccessMut, RecordMut, StructureLayout};
//!
//! let layout = StructureLayout::define("Flags", &BitPacked, &[("u1", "ready"), ("i3", "level")])?;
//! let mut buf = [0u8; 1];
//! let mut rec = RecordMut::new(&mut buf, &layout, Endianness::Little)?;
//! rec.set("level", -2)?;
//! assert_eq!(rec.get("level")?, -2);
//! assert_eq!(buf, [0b0110_0000]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::bits::{read_bits, write_bits};
use crate::codec::CodecError;
use crate::descriptor::Endianness;
use crate::dump;
use crate::layout::{FieldLayout, StructureLayout};
use crate::value::{decode, encode, Value};
use std::fmt;

fn check_len(layout: &StructureLayout, data_len: usize, offset: usize) -> Result<(), CodecError> {
    let required = offset.checked_add(layout.byte_len()).unwrap_or(usize::MAX);
    if data_len < required {
        return Err(CodecError::BufferTooShort { required, actual: data_len });
    }
    Ok(())
}

fn lookup<'l>(layout: &'l StructureLayout, name: &str) -> Result<&'l FieldLayout, CodecError> {
    layout
        .field(name)
        .ok_or_else(|| CodecError::UnknownField(name.to_string()))
}

/// Read access to the named fields of one record.
pub trait FieldAccess {
    fn layout(&self) -> &StructureLayout;

    fn host(&self) -> Endianness;

    fn has(&self, name: &str) -> bool {
        self.layout().contains(name)
    }

    /// Raw bits of a field, in storage order.
    fn get_bits(&self, name: &str) -> Result<Vec<bool>, CodecError>;

    fn get(&self, name: &str) -> Result<Value, CodecError>;

    fn len(&self) -> usize {
        self.layout().len()
    }

    fn is_empty(&self) -> bool {
        self.layout().is_empty()
    }

    /// Values for `names`; unknown names map to `None`, any other error is returned.
    fn get_many(&self, names: &[&str]) -> Result<Vec<(String, Option<Value>)>, CodecError> {
        names
            .iter()
            .map(|&name| match self.get(name) {
                Ok(value) => Ok((name.to_string(), Some(value))),
                Err(CodecError::UnknownField(_)) => Ok((name.to_string(), None)),
                Err(e) => Err(e),
            })
            .collect()
    }

    fn has_many(&self, names: &[&str]) -> Vec<(String, bool)> {
        names
            .iter()
            .map(|&name| (name.to_string(), self.has(name)))
            .collect()
    }

    fn keys(&self) -> Vec<String> {
        self.layout().names().map(str::to_string).collect()
    }

    fn values(&self) -> Result<Vec<Value>, CodecError> {
        self.layout().names().map(|name| self.get(name)).collect()
    }

    /// Every field with its value, in declaration order.
    fn entries(&self) -> Result<Vec<(String, Value)>, CodecError> {
        self.layout()
            .names()
            .map(|name| Ok((name.to_string(), self.get(name)?)))
            .collect()
    }

    fn bits(&self) -> Result<Vec<Vec<bool>>, CodecError> {
        self.layout().names().map(|name| self.get_bits(name)).collect()
    }

    fn bit_entries(&self) -> Result<Vec<(String, Vec<bool>)>, CodecError> {
        self.layout()
            .names()
            .map(|name| Ok((name.to_string(), self.get_bits(name)?)))
            .collect()
    }
}

/// Write access to the named fields of one record.
pub trait FieldAccessMut: FieldAccess {
    /// Store raw bits, in the order [`FieldAccess::get_bits`] returns them.
    fn set_bits(&mut self, name: &str, bits: &[bool]) -> Result<(), CodecError>;

    fn set(&mut self, name: &str, value: Value) -> Result<(), CodecError>;

    /// Reset a field to 0. Returns `false` if there is no such field.
    fn delete(&mut self, name: &str) -> bool {
        self.set(name, 0).is_ok()
    }

    /// Set several fields. Every name and value is checked before anything is written.
    fn set_many(&mut self, values: &[(&str, Value)]) -> Result<(), CodecError> {
        let host = self.host();
        let mut encoded = Vec::with_capacity(values.len());
        for &(name, value) in values {
            let field = lookup(self.layout(), name)?;
            encoded.push((name, encode(value, &field.descriptor, host)?));
        }
        for (name, bits) in encoded {
            self.set_bits(name, &bits)?;
        }
        Ok(())
    }

    /// Delete every known name; returns whether all names were known.
    fn delete_many(&mut self, names: &[&str]) -> bool {
        let mut all = true;
        for name in names {
            all &= self.delete(name);
        }
        all
    }

    /// Reset every field to 0.
    fn clear(&mut self) {
        for name in self.keys() {
            self.delete(&name);
        }
    }
}

/// Read-only view of one record inside a byte slice.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    data: &'a [u8],
    offset: usize,
    layout: &'a StructureLayout,
    host: Endianness,
}

impl<'a> Record<'a> {
    pub fn new(data: &'a [u8], layout: &'a StructureLayout, host: Endianness) -> Result<Self, CodecError> {
        Self::at(data, 0, layout, host)
    }

    /// View of the record starting at `data[offset]`.
    pub fn at(
        data: &'a [u8],
        offset: usize,
        layout: &'a StructureLayout,
        host: Endianness,
    ) -> Result<Self, CodecError> {
        check_len(layout, data.len(), offset)?;
        Ok(Record { data, offset, layout, host })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The bytes this record occupies.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.data[self.offset..self.offset + self.layout.byte_len()]
    }
}

impl FieldAccess for Record<'_> {
    fn layout(&self) -> &StructureLayout {
        self.layout
    }

    fn host(&self) -> Endianness {
        self.host
    }

    fn get_bits(&self, name: &str) -> Result<Vec<bool>, CodecError> {
        read_bits(lookup(self.layout, name)?, self.data, self.offset)
    }

    fn get(&self, name: &str) -> Result<Value, CodecError> {
        let field = lookup(self.layout, name)?;
        decode(&read_bits(field, self.data, self.offset)?, &field.descriptor, self.host)
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dump::write_record(f, self)
    }
}

/// Mutable view of one record inside a byte slice.
#[derive(Debug)]
pub struct RecordMut<'a> {
    data: &'a mut [u8],
    offset: usize,
    layout: &'a StructureLayout,
    host: Endianness,
}

impl<'a> RecordMut<'a> {
    pub fn new(
        data: &'a mut [u8],
        layout: &'a StructureLayout,
        host: Endianness,
    ) -> Result<Self, CodecError> {
        Self::at(data, 0, layout, host)
    }

    pub fn at(
        data: &'a mut [u8],
        offset: usize,
        layout: &'a StructureLayout,
        host: Endianness,
    ) -> Result<Self, CodecError> {
        check_len(layout, data.len(), offset)?;
        Ok(RecordMut { data, offset, layout, host })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Read-only view of the same record.
    pub fn as_record(&self) -> Record<'_> {
        Record {
            data: &*self.data,
            offset: self.offset,
            layout: self.layout,
            host: self.host,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.offset..self.offset + self.layout.byte_len()]
    }
}

impl FieldAccess for RecordMut<'_> {
    fn layout(&self) -> &StructureLayout {
        self.layout
    }

    fn host(&self) -> Endianness {
        self.host
    }

    fn get_bits(&self, name: &str) -> Result<Vec<bool>, CodecError> {
        self.as_record().get_bits(name)
    }

    fn get(&self, name: &str) -> Result<Value, CodecError> {
        self.as_record().get(name)
    }
}

impl FieldAccessMut for RecordMut<'_> {
    fn set_bits(&mut self, name: &str, bits: &[bool]) -> Result<(), CodecError> {
        write_bits(lookup(self.layout, name)?, self.data, self.offset, bits)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<(), CodecError> {
        let field = lookup(self.layout, name)?;
        let bits = encode(value, &field.descriptor, self.host)?;
        write_bits(field, self.data, self.offset, &bits)
    }
}

impl fmt::Display for RecordMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dump::write_record(f, self)
    }
}
