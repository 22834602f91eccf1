//! Text rendering of records and layouts (Display impls, CLI output).

use crate::layout::StructureLayout;
use crate::record::FieldAccess;
use std::fmt::{self, Write};

/// Render bits as `0`/`1` characters, in the order given.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

pub fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

/// `Packing<Name> {` followed by one `  field: type = value;` line per field.
pub fn write_record<A: FieldAccess + ?Sized>(f: &mut fmt::Formatter<'_>, record: &A) -> fmt::Result {
    let layout = record.layout();
    writeln!(f, "{}<{}> {{", layout.packing(), layout.name())?;
    for (name, field) in layout.fields() {
        let value = record.get(name).map_err(|_| fmt::Error)?;
        writeln!(f, "  {}: {} = {};", name, field.descriptor, value)?;
    }
    write!(f, "}}")
}

/// Like [`write_record`] but shows each field's raw bits instead of its value.
pub fn record_bits<A: FieldAccess + ?Sized>(record: &A) -> Result<String, crate::CodecError> {
    let layout = record.layout();
    let mut out = format!("{}<{}> {{\n", layout.packing(), layout.name());
    for (name, bits) in record.bit_entries()? {
        let _ = writeln!(out, "  {}: {};", name, format_bits(&bits));
    }
    out.push('}');
    Ok(out)
}

/// One row per field: name, type, byte.bit start and end, width.
pub fn format_layout(layout: &StructureLayout) -> String {
    let width = layout.names().map(str::len).max().unwrap_or(0).max(4);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}<{}>: {} bytes, {} bits",
        layout.packing(),
        layout.name(),
        layout.byte_len(),
        layout.bit_len()
    );
    let _ = writeln!(out, "  {:<width$}  {:<8}  {:>7}  {:>7}  {:>5}", "name", "type", "start", "end", "bits");
    for (name, f) in layout.fields() {
        let _ = writeln!(
            out,
            "  {:<width$}  {:<8}  {:>7}  {:>7}  {:>5}",
            name,
            f.descriptor.to_string(),
            format!("{}.{}", f.start_byte, f.start_bit),
            format!("{}.{}", f.end_byte, f.end_bit),
            f.bit_width()
        );
    }
    out
}
