//! Layout planning: turn an ordered list of field descriptors into exact bit positions.
//!
//! Two planners produce the same [`StructureLayout`] shape:
//!
//! - [`ByteAligned`]: every field is a whole number of bytes, laid end to end.
//! - [`BitPacked`]: fields start and end at any bit, no padding between them.
//!
//! Bit positions inside a byte count from the most significant bit: bit 0 is `0x80`, bit 7 is
//! `0x01`. Spans are inclusive on both ends.

use crate::descriptor::{parse_descriptor, DescriptorError, FieldDescriptor};
use std::collections::HashMap;
use std::fmt;

/// Widest field the codec accepts. Values are carried as `i128`, so every `u64`/`i64` fits.
pub const MAX_BIT_WIDTH: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("field {field}: {source}")]
    Descriptor {
        field: String,
        #[source]
        source: DescriptorError,
    },
    #[error("field {field}: {bit_width} bits is not a whole number of bytes (use a bit-packed layout)")]
    UnalignedWidth { field: String, bit_width: u32 },
    #[error("field {field}: {bit_width} bits exceeds the {max}-bit maximum")]
    FieldTooWide { field: String, bit_width: u32, max: u32 },
    #[error("duplicate field name: {0}")]
    DuplicateField(String),
}

/// Where one field lives inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub start_byte: usize,
    /// 0..=7, counted from the most significant bit.
    pub start_bit: u8,
    pub end_byte: usize,
    /// 0..=7, inclusive.
    pub end_bit: u8,
    pub descriptor: FieldDescriptor,
}

impl FieldLayout {
    pub fn bit_width(&self) -> u32 {
        self.descriptor.bit_width
    }

    pub fn signed(&self) -> bool {
        self.descriptor.signed
    }

    /// Absolute bit position of the first bit, relative to the record start.
    pub fn bit_offset(&self) -> usize {
        self.start_byte * 8 + self.start_bit as usize
    }

    /// Number of bytes touched by this field (partially or wholly).
    pub fn byte_span(&self) -> usize {
        self.end_byte - self.start_byte + 1
    }
}

/// Which planner built a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Packing {
    ByteAligned,
    BitPacked,
}

impl fmt::Display for Packing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packing::ByteAligned => f.write_str("ByteAligned"),
            Packing::BitPacked => f.write_str("BitPacked"),
        }
    }
}

/// Output of a planner: one span per input field plus the record size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub spans: Vec<FieldLayout>,
    pub byte_len: usize,
    pub bit_len: usize,
}

/// Places fields in declaration order.
pub trait LayoutPlanner {
    fn packing(&self) -> Packing;

    fn plan(&self, fields: &[(String, FieldDescriptor)]) -> Result<Placement, LayoutError>;
}

/// Whole-byte fields only; a width that is not a multiple of 8 is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteAligned;

impl LayoutPlanner for ByteAligned {
    fn packing(&self) -> Packing {
        Packing::ByteAligned
    }

    fn plan(&self, fields: &[(String, FieldDescriptor)]) -> Result<Placement, LayoutError> {
        let mut next_byte = 0usize;
        let mut spans = Vec::with_capacity(fields.len());
        for (name, descriptor) in fields {
            if descriptor.bit_width % 8 != 0 {
                return Err(LayoutError::UnalignedWidth {
                    field: name.clone(),
                    bit_width: descriptor.bit_width,
                });
            }
            let byte_width = (descriptor.bit_width / 8) as usize;
            spans.push(FieldLayout {
                start_byte: next_byte,
                start_bit: 0,
                end_byte: next_byte + byte_width - 1,
                end_bit: 7,
                descriptor: *descriptor,
            });
            next_byte += byte_width;
        }
        Ok(Placement {
            spans,
            byte_len: next_byte,
            bit_len: next_byte * 8,
        })
    }
}

/// Arbitrary widths, packed without padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitPacked;

impl LayoutPlanner for BitPacked {
    fn packing(&self) -> Packing {
        Packing::BitPacked
    }

    fn plan(&self, fields: &[(String, FieldDescriptor)]) -> Result<Placement, LayoutError> {
        let mut next_byte = 0usize;
        let mut next_bit = 0u8;
        let mut spans = Vec::with_capacity(fields.len());

        for (_, descriptor) in fields {
            let mut span = FieldLayout {
                start_byte: next_byte,
                start_bit: next_bit,
                end_byte: next_byte,
                end_bit: next_bit,
                descriptor: *descriptor,
            };
            let mut bits_left = descriptor.bit_width as usize;
            while bits_left > 0 {
                let left_in_byte = 8 - next_bit as usize;
                if bits_left < left_in_byte {
                    // bits_left < 8 here, the cast cannot truncate.
                    next_bit += bits_left as u8;
                    span.end_byte = next_byte;
                    span.end_bit = next_bit - 1;
                    bits_left = 0;
                } else if bits_left == left_in_byte {
                    span.end_byte = next_byte;
                    span.end_bit = 7;
                    bits_left = 0;
                    next_bit = 0;
                    next_byte += 1;
                } else {
                    bits_left -= left_in_byte;
                    next_bit = 0;
                    next_byte += 1;
                }
            }
            spans.push(span);
        }

        let partial = usize::from(next_bit > 0);
        let byte_len = next_byte + partial;
        let bit_len = (byte_len - partial) * 8 + next_bit as usize;
        Ok(Placement { spans, byte_len, bit_len })
    }
}

impl LayoutPlanner for Packing {
    fn packing(&self) -> Packing {
        *self
    }

    fn plan(&self, fields: &[(String, FieldDescriptor)]) -> Result<Placement, LayoutError> {
        match self {
            Packing::ByteAligned => ByteAligned.plan(fields),
            Packing::BitPacked => BitPacked.plan(fields),
        }
    }
}

/// Immutable, planned record layout: fields in declaration order, indexed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureLayout {
    name: String,
    packing: Packing,
    fields: Vec<(String, FieldLayout)>,
    index: HashMap<String, usize>,
    byte_len: usize,
    bit_len: usize,
}

impl StructureLayout {
    /// Define a structure from `(descriptor, field name)` pairs.
    pub fn define<P: LayoutPlanner + ?Sized>(
        name: &str,
        planner: &P,
        members: &[(&str, &str)],
    ) -> Result<Self, LayoutError> {
        let mut fields = Vec::with_capacity(members.len());
        for &(descriptor, field) in members {
            let parsed = parse_descriptor(descriptor).map_err(|source| LayoutError::Descriptor {
                field: field.to_string(),
                source,
            })?;
            fields.push((field.to_string(), parsed));
        }
        Self::from_descriptors(name, planner, fields)
    }

    /// Define a structure from already parsed descriptors.
    pub fn from_descriptors<P: LayoutPlanner + ?Sized>(
        name: &str,
        planner: &P,
        fields: Vec<(String, FieldDescriptor)>,
    ) -> Result<Self, LayoutError> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, (field, descriptor)) in fields.iter().enumerate() {
            if descriptor.bit_width == 0 {
                return Err(LayoutError::Descriptor {
                    field: field.clone(),
                    source: DescriptorError::ZeroWidth(descriptor.to_string()),
                });
            }
            if descriptor.bit_width > MAX_BIT_WIDTH {
                return Err(LayoutError::FieldTooWide {
                    field: field.clone(),
                    bit_width: descriptor.bit_width,
                    max: MAX_BIT_WIDTH,
                });
            }
            if index.insert(field.clone(), i).is_some() {
                return Err(LayoutError::DuplicateField(field.clone()));
            }
        }

        let placement = planner.plan(&fields)?;
        log::debug!(
            "planned {}<{}>: {} fields, {} bytes, {} bits",
            planner.packing(),
            name,
            fields.len(),
            placement.byte_len,
            placement.bit_len
        );
        let fields = fields
            .into_iter()
            .map(|(field, _)| field)
            .zip(placement.spans)
            .collect();
        Ok(StructureLayout {
            name: name.to_string(),
            packing: planner.packing(),
            fields,
            index,
            byte_len: placement.byte_len,
            bit_len: placement.bit_len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn packing(&self) -> Packing {
        self.packing
    }

    /// Bytes a buffer must provide (after its offset) to hold one record.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.index.get(name).map(|&i| &self.fields[i].1)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldLayout)> {
        self.fields.iter().map(|(name, layout)| (name.as_str(), layout))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(layout: &StructureLayout, name: &str) -> (usize, u8, usize, u8) {
        let f = layout.field(name).expect("field");
        (f.start_byte, f.start_bit, f.end_byte, f.end_bit)
    }

    #[test]
    fn byte_aligned_fields_follow_each_other() {
        let layout = StructureLayout::define(
            "Header",
            &ByteAligned,
            &[("u8", "a"), ("i16be", "b"), ("int", "c")],
        )
        .expect("define");
        assert_eq!(layout.packing(), Packing::ByteAligned);
        assert_eq!(span(&layout, "a"), (0, 0, 0, 7));
        assert_eq!(span(&layout, "b"), (1, 0, 2, 7));
        assert_eq!(span(&layout, "c"), (3, 0, 6, 7));
        assert_eq!(layout.byte_len(), 7);
        assert_eq!(layout.bit_len(), 56);
    }

    #[test]
    fn byte_aligned_rejects_odd_widths() {
        let err = StructureLayout::define("Bad", &ByteAligned, &[("u3", "x")]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnalignedWidth { field: "x".to_string(), bit_width: 3 }
        );
    }

    #[test]
    fn bit_packed_spans_cross_bytes() {
        let layout = StructureLayout::define(
            "Mixed",
            &BitPacked,
            &[("u8", "a"), ("i3", "b"), ("u3be", "c"), ("i2be", "d"), ("u13", "e"), ("i32", "f")],
        )
        .expect("define");
        assert_eq!(span(&layout, "a"), (0, 0, 0, 7));
        assert_eq!(span(&layout, "b"), (1, 0, 1, 2));
        assert_eq!(span(&layout, "c"), (1, 3, 1, 5));
        assert_eq!(span(&layout, "d"), (1, 6, 1, 7));
        assert_eq!(span(&layout, "e"), (2, 0, 3, 4));
        assert_eq!(span(&layout, "f"), (3, 5, 7, 4));
        assert_eq!(layout.bit_len(), 61);
        assert_eq!(layout.byte_len(), 8);
    }

    #[test]
    fn bit_packed_sizes() {
        let cases: &[(&[&str], usize, usize)] = &[
            (&["i2", "i1be"], 1, 3),
            (&["u1", "i3", "u13"], 3, 17),
            (&["i5", "unsigned int_2 BE", "uint1"], 1, 8),
        ];
        for (types, byte_len, bit_len) in cases {
            let names: Vec<String> = (0..types.len()).map(|i| format!("member{}", i)).collect();
            let members: Vec<(&str, &str)> =
                types.iter().zip(&names).map(|(t, n)| (*t, n.as_str())).collect();
            let layout = StructureLayout::define("T", &BitPacked, &members).expect("define");
            assert_eq!(layout.byte_len(), *byte_len, "{:?}", types);
            assert_eq!(layout.bit_len(), *bit_len, "{:?}", types);
        }
    }

    #[test]
    fn empty_structure_has_no_size() {
        let layout = StructureLayout::define("Empty", &Packing::BitPacked, &[]).expect("define");
        assert!(layout.is_empty());
        assert_eq!(layout.byte_len(), 0);
        assert_eq!(layout.bit_len(), 0);
    }

    #[test]
    fn definition_errors() {
        let dup = StructureLayout::define("D", &BitPacked, &[("u1", "x"), ("u2", "x")]);
        assert_eq!(dup.unwrap_err(), LayoutError::DuplicateField("x".to_string()));

        let wide = StructureLayout::define("W", &BitPacked, &[("long long uint", "x")]);
        assert!(matches!(wide, Err(LayoutError::FieldTooWide { bit_width: 128, .. })));

        let bad = StructureLayout::define("B", &BitPacked, &[("foo", "x")]);
        assert!(matches!(bad, Err(LayoutError::Descriptor { .. })));
    }

    #[test]
    fn lookup_keeps_declaration_order() {
        let layout =
            StructureLayout::define("O", &BitPacked, &[("u4", "z"), ("u4", "a"), ("u8", "m")])
                .expect("define");
        let names: Vec<&str> = layout.names().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert!(layout.contains("a"));
        assert!(!layout.contains("b"));
        assert_eq!(layout.field("m").map(FieldLayout::bit_offset), Some(8));
    }
}
