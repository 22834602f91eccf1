//! Syntax tree for the structure definition language, and its resolved form.

use crate::layout::{LayoutError, Packing, StructureLayout};
use std::collections::HashMap;

/// Root of a parsed definition file: structures in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub structs: Vec<StructDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub packing: Packing,
    pub fields: Vec<FieldDef>,
}

/// One `name: descriptor;` line. The descriptor is kept as written and parsed at resolve time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub descriptor: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Duplicate struct: {0}")]
    DuplicateStruct(String),
    #[error("struct {name}: {source}")]
    Layout {
        name: String,
        #[source]
        source: LayoutError,
    },
}

/// Schema with every structure planned and indexed by name.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    pub schema: Schema,
    layouts: Vec<StructureLayout>,
    by_name: HashMap<String, usize>,
}

impl ResolvedSchema {
    pub fn resolve(schema: Schema) -> Result<Self, SchemaError> {
        let mut layouts = Vec::with_capacity(schema.structs.len());
        let mut by_name = HashMap::new();
        for (i, def) in schema.structs.iter().enumerate() {
            if by_name.insert(def.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateStruct(def.name.clone()));
            }
            let members: Vec<(&str, &str)> = def
                .fields
                .iter()
                .map(|f| (f.descriptor.as_str(), f.name.as_str()))
                .collect();
            let layout = StructureLayout::define(&def.name, &def.packing, &members).map_err(
                |source| SchemaError::Layout {
                    name: def.name.clone(),
                    source,
                },
            )?;
            layouts.push(layout);
        }
        Ok(ResolvedSchema { schema, layouts, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&StructureLayout> {
        self.by_name.get(name).map(|&i| &self.layouts[i])
    }

    /// Layouts in source order.
    pub fn layouts(&self) -> &[StructureLayout] {
        &self.layouts
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.iter().map(StructureLayout::name)
    }
}
