//! Raw entity declarations matching the JSON declaration format.

use serde::{Deserialize, Serialize};

/// Column annotation meaning "declared but never persisted".
pub const EXCLUDED: &str = "-";

/// Storage type of the primary key. Decides the cursor key flavor and the
/// Rust type of the id parameter in generated code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Text,
    Int4,
    Int8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    /// Persistence annotation: the storage column. Absent or `"-"` drops the
    /// field from every generated statement.
    #[serde(default)]
    pub column: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    /// Optional fields are nullable in storage and carried as `Option` in
    /// generated payloads.
    #[serde(default)]
    pub optional: bool,
}

/// One entity family: the persisted record shape plus its create and update
/// payload shapes. The payload shape names are derived by convention
/// (`Create<Entity>`, `Update<Entity>`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityDecl {
    pub entity: String,
    pub schema: String,
    pub table: String,
    pub primary_key: String,
    #[serde(default = "default_key_kind")]
    pub key_kind: KeyKind,
    pub fields: Vec<FieldDecl>,
    pub create_fields: Vec<FieldDecl>,
    pub update_fields: Vec<FieldDecl>,
}

fn default_key_kind() -> KeyKind {
    KeyKind::Text
}
