//! # bitstruct: bit-level structure layouts over byte buffers
//!
//! Describe a record as an ordered list of `(type descriptor, field name)` pairs, plan where
//! every field lives (byte-aligned or bit-packed), then read and write the fields of records
//! stored in caller-owned byte buffers by name.
//!
//! ## Layers
//!
//! - **Descriptors** ([descriptor]): `u8`, `i3`, `unsigned short int`, `int_23be`, ...
//! - **Layouts** ([layout]): [`ByteAligned`] and [`BitPacked`] planners build a [`StructureLayout`]
//! - **Bits** ([bits]): raw bit extraction/insertion at a field's span
//! - **Values** ([value]): unsigned / two's complement interpretation, host vs field byte order
//! - **Records** ([record]): [`Record`] / [`RecordMut`] views with the [`FieldAccess`] /
//!   [`FieldAccessMut`] accessor surface; [`Codec`] for whole-record encode/decode
//! - **Definition files** ([parser], [ast]): `struct` / `packed struct` blocks resolved to layouts
//!
//! ## Example definition
//!
//! ```text
//! packed struct Mixed {
//!   a: u8;
//!   b: i3;
//!   c: u3be;
//!   d: i2be;
//!   e: u13;
//!   f: i32;
//! }
//! ```
//!
//! ## Usage
//!
//! ```
//! use bitstruct::{parser, Codec, Endianness, FieldAccess, ResolvedSchema};
//!
//! let schema = parser::parse("packed struct Mixed { a: u8; b: i3; c: u3be; d: i2be; e: u13; f: i32; }")?;
//! let resolved = ResolvedSchema::resolve(schema)?;
//! let layout = resolved.get("Mixed").expect("declared above").clone();
//! let codec = Codec::new(layout, Endianness::Little);
//!
//! let bytes = [4, 0b1101_1111, 102, 0b0001_1111, 255, 255, 252, 24];
//! let record = codec.record(&bytes)?;
//! assert_eq!(record.values()?, vec![4, -2, 7, -1, 3267, -125]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! See `tests/integration.rs` for more.

pub mod ast;
pub mod bits;
pub mod codec;
pub mod descriptor;
pub mod dump;
pub mod layout;
pub mod parser;
pub mod record;
pub mod value;

pub use ast::{FieldDef, ResolvedSchema, Schema, SchemaError, StructDef};
pub use codec::{Codec, CodecError};
pub use descriptor::{parse_descriptor, DescriptorError, Endianness, FieldDescriptor};
pub use layout::{
    BitPacked, ByteAligned, FieldLayout, LayoutError, LayoutPlanner, Packing, Placement,
    StructureLayout, MAX_BIT_WIDTH,
};
pub use parser::{load, parse};
pub use record::{FieldAccess, FieldAccessMut, Record, RecordMut};
pub use value::{decode, encode, value_range, Value};
