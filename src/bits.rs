//! Raw bit access: read and write the bits a field occupies, in storage order.
//!
//! Bits come out most-significant-first within each byte, bytes in buffer order. Nothing here
//! knows about signedness or field byte order; see [crate::value] for that.

use crate::codec::CodecError;
use crate::layout::FieldLayout;

/// Expands a byte into its 8 bits, MSB first.
pub fn byte_to_bits(byte: u8) -> [bool; 8] {
    let mut bits = [false; 8];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (byte >> (7 - i)) & 1 != 0;
    }
    bits
}

/// Inverse of [`byte_to_bits`].
pub fn bits_to_byte(bits: &[bool; 8]) -> u8 {
    bits.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit))
}

fn byte_range(field: &FieldLayout, data_len: usize, base: usize) -> Result<(usize, usize), CodecError> {
    let too_short = |required: usize| CodecError::BufferTooShort {
        required,
        actual: data_len,
    };
    let (first, last) = match (
        base.checked_add(field.start_byte),
        base.checked_add(field.end_byte),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(too_short(usize::MAX)),
    };
    if last >= data_len {
        return Err(too_short(last.saturating_add(1)));
    }
    Ok((first, last))
}

/// Bit range `[lo, hi]` of byte `idx` owned by a field spanning bytes `first..=last`.
fn owned_bits(field: &FieldLayout, idx: usize, first: usize, last: usize) -> (usize, usize) {
    let lo = if idx == first { field.start_bit as usize } else { 0 };
    let hi = if idx == last { field.end_bit as usize } else { 7 };
    (lo, hi)
}

/// Read the `bit_width` bits of `field` from a record starting at `data[base]`.
pub fn read_bits(field: &FieldLayout, data: &[u8], base: usize) -> Result<Vec<bool>, CodecError> {
    let (first, last) = byte_range(field, data.len(), base)?;
    let mut out = Vec::with_capacity(field.bit_width() as usize);
    for idx in first..=last {
        let (lo, hi) = owned_bits(field, idx, first, last);
        out.extend_from_slice(&byte_to_bits(data[idx])[lo..=hi]);
    }
    Ok(out)
}

/// Write `bits` into the positions owned by `field`, leaving every other bit untouched.
///
/// `bits` must hold exactly `bit_width` entries, in the order [`read_bits`] returns them.
pub fn write_bits(
    field: &FieldLayout,
    data: &mut [u8],
    base: usize,
    bits: &[bool],
) -> Result<(), CodecError> {
    let expected = field.bit_width() as usize;
    if bits.len() != expected {
        return Err(CodecError::BitCountMismatch {
            expected,
            actual: bits.len(),
        });
    }
    let (first, last) = byte_range(field, data.len(), base)?;
    let mut cursor = 0usize;
    for idx in first..=last {
        let (lo, hi) = owned_bits(field, idx, first, last);
        let mut byte = if lo == 0 && hi == 7 {
            [false; 8]
        } else {
            byte_to_bits(data[idx])
        };
        for slot in &mut byte[lo..=hi] {
            *slot = bits[cursor];
            cursor += 1;
        }
        data[idx] = bits_to_byte(&byte);
    }
    Ok(())
}
