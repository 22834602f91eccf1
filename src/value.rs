//! Numeric interpretation of raw field bits.
//!
//! A field's bits, as read by [crate::bits], are normalised to most-significant-first by
//! reversing the whole sequence when the host byte order differs from the field's. The
//! normalised sequence is then read as unsigned binary or as two's complement.
//!
//! The host byte order is always passed in, never queried, so results do not depend on the
//! machine running the code.

use crate::codec::CodecError;
use crate::descriptor::{Endianness, FieldDescriptor};
use crate::layout::MAX_BIT_WIDTH;
use std::ops::RangeInclusive;

/// Values every field is read into and written from.
pub type Value = i128;

/// Smallest and largest value a field can hold.
pub fn value_range(descriptor: &FieldDescriptor) -> RangeInclusive<Value> {
    let width = descriptor.bit_width.min(MAX_BIT_WIDTH);
    if width == 0 {
        return 0..=0;
    }
    if descriptor.signed {
        let half: Value = 1 << (width - 1);
        -half..=half - 1
    } else {
        0..=(1 << width) - 1
    }
}

fn check_width(descriptor: &FieldDescriptor) -> Result<usize, CodecError> {
    if descriptor.bit_width == 0 || descriptor.bit_width > MAX_BIT_WIDTH {
        return Err(CodecError::FieldTooWide {
            bit_width: descriptor.bit_width,
            max: MAX_BIT_WIDTH,
        });
    }
    Ok(descriptor.bit_width as usize)
}

fn unsigned_value(bits: impl Iterator<Item = bool>) -> Value {
    bits.fold(0, |acc, bit| (acc << 1) | Value::from(bit))
}

/// Interpret raw field bits as a number.
pub fn decode(bits: &[bool], descriptor: &FieldDescriptor, host: Endianness) -> Result<Value, CodecError> {
    let width = check_width(descriptor)?;
    if bits.len() != width {
        return Err(CodecError::BitCountMismatch {
            expected: width,
            actual: bits.len(),
        });
    }

    let mut normalized = bits.to_vec();
    if host != descriptor.endianness {
        normalized.reverse();
    }

    if !descriptor.signed {
        return Ok(unsigned_value(normalized.into_iter()));
    }
    let (negative, magnitude) = match normalized.split_first() {
        Some((&sign, rest)) => (sign, rest),
        None => return Ok(0),
    };
    if negative {
        Ok(-(unsigned_value(magnitude.iter().map(|&b| !b)) + 1))
    } else {
        Ok(unsigned_value(magnitude.iter().copied()))
    }
}

/// Produce the raw bits that store `value` in a field.
///
/// Fails with [`CodecError::ValueOutOfRange`] when the value does not fit the field.
pub fn encode(value: Value, descriptor: &FieldDescriptor, host: Endianness) -> Result<Vec<bool>, CodecError> {
    let width = check_width(descriptor)?;
    let range = value_range(descriptor);
    if !range.contains(&value) {
        return Err(CodecError::ValueOutOfRange {
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }

    // Low `width` bits of the two's complement form, MSB first. Above the minimal
    // representation these are copies of the sign bit.
    let mut bits: Vec<bool> = (0..width).rev().map(|i| (value >> i) & 1 != 0).collect();
    if host != descriptor.endianness {
        bits.reverse();
    }
    Ok(bits)
}
