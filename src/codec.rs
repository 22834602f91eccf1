//! Record-level encode/decode on top of a planned layout.
//!
//! A [`Codec`] pairs a [`StructureLayout`] with the host byte order used to normalise field
//! bits. It hands out borrowed [`Record`] / [`RecordMut`] views over caller buffers and offers
//! whole-record helpers for callers that want owned bytes.

use crate::descriptor::Endianness;
use crate::layout::StructureLayout;
use crate::record::{FieldAccess, FieldAccessMut, Record, RecordMut};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Buffer too short: need {required} bytes, have {actual}")]
    BufferTooShort { required: usize, actual: usize },
    #[error("Bit count mismatch: field has {expected} bits, got {actual}")]
    BitCountMismatch { expected: usize, actual: usize },
    #[error("Value {value} out of range {min}..={max}")]
    ValueOutOfRange { value: Value, min: Value, max: Value },
    #[error("Field width {bit_width} not supported (1..={max} bits)")]
    FieldTooWide { bit_width: u32, max: u32 },
}

#[derive(Debug, Clone)]
pub struct Codec {
    host: Endianness,
    layout: StructureLayout,
}

impl Codec {
    pub fn new(layout: StructureLayout, host: Endianness) -> Self {
        Codec { host, layout }
    }

    /// Codec using the byte order of the running machine.
    pub fn native(layout: StructureLayout) -> Self {
        Self::new(layout, Endianness::native())
    }

    pub fn layout(&self) -> &StructureLayout {
        &self.layout
    }

    pub fn host(&self) -> Endianness {
        self.host
    }

    pub fn record<'a>(&'a self, data: &'a [u8]) -> Result<Record<'a>, CodecError> {
        Record::new(data, &self.layout, self.host)
    }

    pub fn record_at<'a>(&'a self, data: &'a [u8], offset: usize) -> Result<Record<'a>, CodecError> {
        Record::at(data, offset, &self.layout, self.host)
    }

    pub fn record_mut<'a>(&'a self, data: &'a mut [u8]) -> Result<RecordMut<'a>, CodecError> {
        RecordMut::new(data, &self.layout, self.host)
    }

    pub fn record_mut_at<'a>(
        &'a self,
        data: &'a mut [u8],
        offset: usize,
    ) -> Result<RecordMut<'a>, CodecError> {
        RecordMut::at(data, offset, &self.layout, self.host)
    }

    /// Decode every field of the record at the start of `bytes`, in declaration order.
    pub fn decode_record(&self, bytes: &[u8]) -> Result<Vec<(String, Value)>, CodecError> {
        self.record(bytes)?.entries()
    }

    /// Encode a fresh record. Fields not listed in `values` are zero.
    pub fn encode_record(&self, values: &[(&str, Value)]) -> Result<Vec<u8>, CodecError> {
        let mut out = vec![0u8; self.layout.byte_len()];
        self.record_mut(&mut out)?.set_many(values)?;
        Ok(out)
    }
}
