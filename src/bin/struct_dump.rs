//! Decode (and optionally patch) one record described in a definition file.
//!
//! Usage:
//!   struct_dump [OPTIONS] SCHEMA STRUCT [HEX]
//!   echo "04 df 66 1f ff ff fc 18" | struct_dump mixed.def Mixed
//!
//! HEX may contain whitespace and `0x` prefixes. Without HEX the bytes are read from stdin.
//!
//! Options:
//!   --offset N          Record starts N bytes into the buffer (default 0)
//!   --host le|be        Host byte order used to normalise fields (default: this machine)
//!   --layout            Print the layout table before the record
//!   --bits              Print each field's raw bits instead of its value
//!   --set NAME=VALUE    Write a field (repeatable); prints the resulting bytes in hex
//!
//! Set RUST_LOG=debug to see layout planning.

use anyhow::{anyhow, bail, Context};
use bitstruct::dump::{format_layout, hex_string, record_bits};
use bitstruct::{parser, Endianness, FieldAccessMut, Record, RecordMut, Value};
use std::io::{self, Read};

struct Options {
    offset: usize,
    host: Endianness,
    layout: bool,
    bits: bool,
    sets: Vec<(String, Value)>,
    positional: Vec<String>,
}

fn take_value(args: &mut Vec<String>, pos: usize, flag: &str) -> anyhow::Result<String> {
    args.remove(pos);
    if pos >= args.len() {
        bail!("{} needs a value", flag);
    }
    Ok(args.remove(pos))
}

fn parse_args(mut args: Vec<String>) -> anyhow::Result<Options> {
    let mut opts = Options {
        offset: 0,
        host: Endianness::native(),
        layout: false,
        bits: false,
        sets: Vec::new(),
        positional: Vec::new(),
    };
    while let Some(pos) = args.iter().position(|a| a.starts_with("--")) {
        match args[pos].as_str() {
            "--offset" => {
                let v = take_value(&mut args, pos, "--offset")?;
                opts.offset = v.parse().with_context(|| format!("bad offset: {}", v))?;
            }
            "--host" => {
                let v = take_value(&mut args, pos, "--host")?;
                opts.host = v.parse().map_err(|e: String| anyhow!(e))?;
            }
            "--layout" => {
                args.remove(pos);
                opts.layout = true;
            }
            "--bits" => {
                args.remove(pos);
                opts.bits = true;
            }
            "--set" => {
                let v = take_value(&mut args, pos, "--set")?;
                let (name, value) = v
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--set expects NAME=VALUE, got {}", v))?;
                let value = parse_value(value.trim())
                    .with_context(|| format!("bad value for {}", name))?;
                opts.sets.push((name.trim().to_string(), value));
            }
            other => bail!("unknown option: {}", other),
        }
    }
    opts.positional = args;
    Ok(opts)
}

fn parse_value(s: &str) -> anyhow::Result<Value> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => Value::from_str_radix(hex, 16)?,
        None => digits.parse::<Value>()?,
    };
    Ok(if negative { -magnitude } else { magnitude })
}

fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = text
        .split_whitespace()
        .map(|tok| tok.trim_start_matches("0x").trim_start_matches("0X"))
        .collect();
    if !digits.is_ascii() {
        bail!("hex input contains non-ASCII characters");
    }
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("bad hex byte: {}", &digits[i..i + 2]))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = parse_args(std::env::args().skip(1).collect())?;
    let (schema_path, struct_name, hex) = match opts.positional.as_slice() {
        [schema, name] => (schema, name, None),
        [schema, name, hex] => (schema, name, Some(hex.clone())),
        _ => bail!("usage: struct_dump [OPTIONS] SCHEMA STRUCT [HEX]"),
    };

    let resolved = parser::load(schema_path).with_context(|| format!("loading {}", schema_path))?;
    let layout = resolved.get(struct_name).ok_or_else(|| {
        let known: Vec<&str> = resolved.names().collect();
        anyhow!("no struct {} in {} (have: {})", struct_name, schema_path, known.join(", "))
    })?;

    let text = match hex {
        Some(h) => h,
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s)?;
            s
        }
    };
    let mut bytes = parse_hex(&text)?;

    if opts.layout {
        print!("{}", format_layout(layout));
    }

    if !opts.sets.is_empty() {
        let mut record = RecordMut::at(&mut bytes, opts.offset, layout, opts.host)?;
        let sets: Vec<(&str, Value)> = opts.sets.iter().map(|(n, v)| (n.as_str(), *v)).collect();
        record.set_many(&sets)?;
        log::debug!("applied {} write(s)", sets.len());
    }

    let record = Record::at(&bytes, opts.offset, layout, opts.host)?;
    if opts.bits {
        println!("{}", record_bits(&record)?);
    } else {
        println!("{}", record);
    }
    if !opts.sets.is_empty() {
        println!("{}", hex_string(&bytes));
    }
    Ok(())
}
