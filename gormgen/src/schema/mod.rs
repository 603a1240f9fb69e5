//! Schema input: column descriptors and the loaders that produce them
//!
//! Two sources are supported, chosen by file extension:
//!
//! - `.sql`: MySQL DDL, parsed with `sqlparser-rs`; SQL types are mapped to Go
//! - `.json`: a serialized [`DbSchema`] whose `data_type`s are already Go types

mod ddl_parser;
mod metadata;
mod type_mapper;

pub use ddl_parser::*;
pub use metadata::*;
pub use type_mapper::*;

use std::path::Path;

use tracing::info;

use crate::error::{CodegenError, Result};

/// Parse a JSON schema dump: an object mapping table names to column lists
pub fn parse_json(json: &str) -> Result<DbSchema> {
    Ok(serde_json::from_str(json)?)
}

/// Load a schema file, dispatching on its extension
pub fn load_schema(path: &Path) -> Result<DbSchema> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let schema = match extension.as_str() {
        "sql" | "ddl" => parse_ddl(&content)?,
        "json" => parse_json(&content)?,
        other => {
            return Err(CodegenError::ValidationError(format!(
                "Unsupported schema file extension {:?} for {} (expected .sql or .json)",
                other,
                path.display()
            )));
        }
    };

    info!("Loaded {} tables from {}", schema.len(), path.display());
    Ok(schema)
}
