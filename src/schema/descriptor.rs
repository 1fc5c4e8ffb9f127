//! Resolved entity model: declarations validated and flattened for emission.
//! Descriptors exist only at generation time; they never reach the runtime.

use crate::schema::KeyKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Int4,
    Int8,
    Bool,
    Timestamptz,
    Uuid,
    Jsonb,
}

impl FieldType {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "text" => FieldType::Text,
            "int4" => FieldType::Int4,
            "int8" => FieldType::Int8,
            "bool" => FieldType::Bool,
            "timestamptz" => FieldType::Timestamptz,
            "uuid" => FieldType::Uuid,
            "jsonb" => FieldType::Jsonb,
            _ => return None,
        })
    }

    /// Rust type emitted for a non-nullable field of this type.
    pub fn rust_type(self) -> &'static str {
        match self {
            FieldType::Text => "String",
            FieldType::Int4 => "i32",
            FieldType::Int8 => "i64",
            FieldType::Bool => "bool",
            FieldType::Timestamptz => "DateTime<Utc>",
            FieldType::Uuid => "Uuid",
            FieldType::Jsonb => "serde_json::Value",
        }
    }

    /// PostgreSQL type name, used for casts on cursor parameters.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Int4 => "int4",
            FieldType::Int8 => "int8",
            FieldType::Bool => "bool",
            FieldType::Timestamptz => "timestamptz",
            FieldType::Uuid => "uuid",
            FieldType::Jsonb => "jsonb",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub column: String,
    pub field_type: FieldType,
    pub nullable: bool,
}

#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    pub entity_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub pk_field: String,
    pub pk_column: String,
    pub key_kind: KeyKind,
    pub entity_fields: Vec<FieldDescriptor>,
    pub create_fields: Vec<FieldDescriptor>,
    pub update_fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn create_shape_name(&self) -> String {
        format!("Create{}", self.entity_name)
    }

    pub fn update_shape_name(&self) -> String {
        format!("Update{}", self.entity_name)
    }
}
