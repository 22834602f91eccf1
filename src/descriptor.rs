//! Field type descriptors: parse strings like `u8`, `i3`, `unsigned short int` or `int_23be`
//! into a bit width, a signedness and a byte order.
//!
//! ## Grammar
//!
//! ```text
//! [signed | unsigned]* [short | long]* (base [digits] | digits) [be]
//! base = int | uint | i | u | byte | char
//! ```
//!
//! Keywords are case-insensitive and any non-alphanumeric character (space, underscore, ...)
//! separates tokens. The first sign keyword wins. `int`/`i`/`uint`/`u` are 32 bits wide and
//! `byte`/`char` 8 bits; an explicit number overrides the base width. Every `long` doubles the
//! width and every `short` halves it (they cancel pairwise). Without `be` a field is
//! little-endian.

use pest::Parser;
use pest_derive::Parser as PestParser;
use std::fmt;
use std::str::FromStr;

#[derive(PestParser)]
#[grammar = "descriptor.pest"]
struct DescriptorParser;

/// Byte order of a field, and of the host the codec runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the machine this code was compiled for.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

impl FromStr for Endianness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "le" | "little" => Ok(Endianness::Little),
            "be" | "big" => Ok(Endianness::Big),
            other => Err(format!("unknown byte order: {}", other)),
        }
    }
}

/// Width, signedness and byte order of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub bit_width: u32,
    pub signed: bool,
    pub endianness: Endianness,
}

impl FieldDescriptor {
    pub fn new(bit_width: u32, signed: bool, endianness: Endianness) -> Self {
        FieldDescriptor { bit_width, signed, endianness }
    }

    pub fn unsigned(bit_width: u32) -> Self {
        Self::new(bit_width, false, Endianness::Little)
    }

    pub fn signed(bit_width: u32) -> Self {
        Self::new(bit_width, true, Endianness::Little)
    }

    /// Same descriptor, big-endian.
    pub fn be(self) -> Self {
        FieldDescriptor { endianness: Endianness::Big, ..self }
    }
}

/// Renders the canonical short form, e.g. `u13`, `i3`, `u8be`.
impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.signed { 'i' } else { 'u' };
        let be = match self.endianness {
            Endianness::Big => "be",
            Endianness::Little => "",
        };
        write!(f, "{}{}{}", sign, self.bit_width, be)
    }
}

impl FromStr for FieldDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_descriptor(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("malformed descriptor {descriptor:?}: {reason}")]
    Malformed { descriptor: String, reason: String },
    #[error("descriptor {0:?} has a zero bit width")]
    ZeroWidth(String),
    #[error("descriptor {0:?} halves an odd bit width")]
    FractionalWidth(String),
    #[error("descriptor {0:?} has a bit width that does not fit in 32 bits")]
    WidthOverflow(String),
}

/// Parse a descriptor string into a [`FieldDescriptor`].
pub fn parse_descriptor(source: &str) -> Result<FieldDescriptor, DescriptorError> {
    let malformed = |reason: String| DescriptorError::Malformed {
        descriptor: source.to_string(),
        reason,
    };
    let pair = DescriptorParser::parse(Rule::descriptor, source)
        .map_err(|e| malformed(e.to_string()))?
        .next()
        .ok_or_else(|| malformed("empty parse".to_string()))?;

    let mut sign: Option<bool> = None;
    let mut shorts = 0u32;
    let mut longs = 0u32;
    let mut base: Option<(u32, bool)> = None;
    let mut explicit_width: Option<u32> = None;
    let mut endianness = Endianness::Little;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::sign => {
                if sign.is_none() {
                    sign = Some(!inner.as_str().eq_ignore_ascii_case("unsigned"));
                }
            }
            Rule::size => {
                if inner.as_str().eq_ignore_ascii_case("short") {
                    shorts += 1;
                } else {
                    longs += 1;
                }
            }
            Rule::base => {
                let keyword = inner.as_str().to_ascii_lowercase();
                base = Some(match keyword.as_str() {
                    "int" | "i" => (32, true),
                    "uint" | "u" => (32, false),
                    _ => (8, true),
                });
            }
            Rule::width => {
                let w = inner
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| DescriptorError::WidthOverflow(source.to_string()))?;
                explicit_width = Some(w);
            }
            Rule::big_endian => endianness = Endianness::Big,
            _ => {}
        }
    }

    let (base_width, base_signed) = base.unwrap_or((0, true));
    let mut bit_width = explicit_width.unwrap_or(base_width);
    let signed = sign.unwrap_or(base_signed);

    if longs > shorts {
        for _ in 0..(longs - shorts) {
            bit_width = bit_width
                .checked_mul(2)
                .ok_or_else(|| DescriptorError::WidthOverflow(source.to_string()))?;
        }
    } else {
        for _ in 0..(shorts - longs) {
            if bit_width % 2 != 0 {
                return Err(DescriptorError::FractionalWidth(source.to_string()));
            }
            bit_width /= 2;
        }
    }

    if bit_width == 0 {
        return Err(DescriptorError::ZeroWidth(source.to_string()));
    }
    Ok(FieldDescriptor { bit_width, signed, endianness })
}
