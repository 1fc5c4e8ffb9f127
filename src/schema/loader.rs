//! Load entity declarations from JSON files.

use crate::error::SchemaError;
use crate::schema::EntityDecl;
use std::path::Path;

pub fn load_decl(path: &Path) -> Result<EntityDecl, SchemaError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| SchemaError::Load(format!("{}: {}", path.display(), e)))?;
    parse_decl(&raw)
}

pub fn parse_decl(raw: &str) -> Result<EntityDecl, SchemaError> {
    serde_json::from_str(raw).map_err(|e| SchemaError::Load(e.to_string()))
}
