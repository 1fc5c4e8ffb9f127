//! Structural introspection of entity declarations: recover column name and
//! nullability per field, drop unannotated or excluded fields, and fail the
//! whole run on a misconfigured shape.

use crate::error::SchemaError;
use crate::schema::{
    EntityDecl, EntityDescriptor, FieldDecl, FieldDescriptor, FieldType, EXCLUDED,
};
use std::collections::HashSet;

/// Build the descriptor for one entity family. Any error here is build-time
/// fatal: generation must abort rather than emit a partial data-access layer.
pub fn introspect(decl: &EntityDecl) -> Result<EntityDescriptor, SchemaError> {
    let entity_fields = resolve_shape(&decl.entity, decl.entity.clone(), &decl.fields)?;
    let create_fields = resolve_shape(
        &decl.entity,
        format!("Create{}", decl.entity),
        &decl.create_fields,
    )?;
    let update_fields = resolve_shape(
        &decl.entity,
        format!("Update{}", decl.entity),
        &decl.update_fields,
    )?;

    let pk_column = entity_fields
        .iter()
        .find(|f| f.name == decl.primary_key)
        .map(|f| f.column.clone())
        .ok_or_else(|| SchemaError::MissingPrimaryKey {
            entity: decl.entity.clone(),
            field: decl.primary_key.clone(),
        })?;

    Ok(EntityDescriptor {
        entity_name: decl.entity.clone(),
        schema_name: decl.schema.clone(),
        table_name: decl.table.clone(),
        pk_field: decl.primary_key.clone(),
        pk_column,
        key_kind: decl.key_kind,
        entity_fields,
        create_fields,
        update_fields,
    })
}

fn resolve_shape(
    entity: &str,
    shape: String,
    fields: &[FieldDecl],
) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let mut out = Vec::new();
    let mut seen_columns = HashSet::new();
    for f in fields {
        let column = match f.column.as_deref() {
            None | Some(EXCLUDED) => continue,
            Some(c) => c.to_string(),
        };
        if !seen_columns.insert(column.clone()) {
            return Err(SchemaError::DuplicateColumn {
                entity: entity.to_string(),
                shape,
                column,
            });
        }
        let ty = f.type_.as_deref().unwrap_or("text");
        let field_type = FieldType::parse(ty).ok_or_else(|| SchemaError::UnknownType {
            entity: entity.to_string(),
            field: f.name.clone(),
            ty: ty.to_string(),
        })?;
        out.push(FieldDescriptor {
            name: f.name.clone(),
            column,
            field_type,
            nullable: f.optional,
        });
    }
    if out.is_empty() {
        return Err(SchemaError::EmptyShape {
            entity: entity.to_string(),
            shape,
        });
    }
    Ok(out)
}
