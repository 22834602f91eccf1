//! Parser fuzz target: feed arbitrary text to the definition and descriptor parsers, then read
//! every field of every resolved structure from a zeroed buffer.
//! Nothing may panic; parse and resolve errors are fine.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use bitstruct::FieldAccess;

    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = bitstruct::parse_descriptor(s);
    let schema = match bitstruct::parse(s) {
        Ok(schema) => schema,
        Err(_) => return,
    };
    let resolved = match bitstruct::ResolvedSchema::resolve(schema) {
        Ok(r) => r,
        Err(_) => return,
    };
    for layout in resolved.layouts() {
        // keep allocations bounded
        if layout.byte_len() > 1 << 16 {
            continue;
        }
        let buf = vec![0u8; layout.byte_len()];
        if let Ok(record) = bitstruct::Record::new(&buf, layout, bitstruct::Endianness::Little) {
            let _ = record.entries();
            let _ = record.to_string();
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
