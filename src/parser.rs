//! Parse structure definition source into a [`Schema`] using PEST.

use crate::ast::*;
use crate::layout::Packing;
use pest::Parser;
use pest_derive::Parser as PestParser;
use std::path::Path;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct SchemaParser;

/// Parse definition source into a syntax tree. Descriptors are not checked here.
pub fn parse(source: &str) -> Result<Schema, SchemaError> {
    let pairs = SchemaParser::parse(Rule::schema, source)
        .map_err(|e| SchemaError::Parse(e.to_string()))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| SchemaError::Parse("empty parse".to_string()))?;
    build_schema(pair)
}

/// Read, parse and resolve a definition file.
pub fn load(path: impl AsRef<Path>) -> Result<ResolvedSchema, SchemaError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let schema = parse(&source)?;
    log::debug!("{}: {} struct(s)", path.display(), schema.structs.len());
    ResolvedSchema::resolve(schema)
}

fn build_schema(pair: pest::iterators::Pair<Rule>) -> Result<Schema, SchemaError> {
    let mut structs = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::struct_def {
            structs.push(build_struct(inner)?);
        }
    }
    Ok(Schema { structs })
}

fn build_struct(pair: pest::iterators::Pair<Rule>) -> Result<StructDef, SchemaError> {
    let mut name = None;
    let mut packing = Packing::ByteAligned;
    let mut fields = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::packing if inner.as_str() == "packed" => packing = Packing::BitPacked,
            Rule::ident => name = Some(inner.as_str().to_string()),
            Rule::field => fields.push(build_field(inner)?),
            _ => {}
        }
    }
    let name = name.ok_or_else(|| SchemaError::Parse("struct: missing name".to_string()))?;
    Ok(StructDef { name, packing, fields })
}

fn build_field(pair: pest::iterators::Pair<Rule>) -> Result<FieldDef, SchemaError> {
    let mut it = pair.into_inner();
    let name = it
        .next()
        .ok_or_else(|| SchemaError::Parse("field: missing name".to_string()))?
        .as_str()
        .to_string();
    let descriptor = it
        .next()
        .ok_or_else(|| SchemaError::Parse(format!("field {}: missing type", name)))?
        .as_str()
        .trim()
        .to_string();
    Ok(FieldDef { name, descriptor })
}
