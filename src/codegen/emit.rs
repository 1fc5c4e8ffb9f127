//! Per-entity code emission. The emitter is a pure function of the
//! descriptor: unchanged descriptor, byte-identical output.

use crate::case::to_snake_case;
use crate::schema::{EntityDescriptor, FieldDescriptor, FieldType, KeyKind};
use std::fmt::Write;

#[derive(Clone, Debug)]
pub struct EmitOptions {
    /// Crate path of the runtime in the emitted `use` lines. Generated
    /// modules living inside the runtime crate itself pass `"crate"`.
    pub runtime_path: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            runtime_path: "repogen".to_string(),
        }
    }
}

macro_rules! w {
    ($dst:expr, $($arg:tt)*) => {
        let _ = writeln!($dst, $($arg)*);
    };
}

fn key_rust_type(kind: KeyKind) -> &'static str {
    match kind {
        KeyKind::Text => "String",
        KeyKind::Int4 => "i32",
        KeyKind::Int8 => "i64",
    }
}

fn key_pg_type(kind: KeyKind) -> &'static str {
    match kind {
        KeyKind::Text => "text",
        KeyKind::Int4 => "int4",
        KeyKind::Int8 => "int8",
    }
}

/// Expression binding the `id: &K` parameter of a store method.
fn id_bind(kind: KeyKind) -> &'static str {
    match kind {
        KeyKind::Text => "PgBindValue::from(id.clone())",
        KeyKind::Int4 | KeyKind::Int8 => "PgBindValue::from(*id)",
    }
}

fn rust_type(f: &FieldDescriptor) -> String {
    let base = f.field_type.rust_type();
    if f.nullable {
        format!("Option<{base}>")
    } else {
        base.to_string()
    }
}

/// Module file name for an entity, e.g. `TaskNote` -> `task_note`.
pub fn module_name(descriptor: &EntityDescriptor) -> String {
    to_snake_case(&descriptor.entity_name)
}

/// Emit the complete data-access module for one entity.
pub fn emit(d: &EntityDescriptor, opts: &EmitOptions) -> String {
    let entity = &d.entity_name;
    let rt = &opts.runtime_path;
    let prefix = to_snake_case(entity).to_uppercase();
    let key_ty = key_rust_type(d.key_kind);
    let create_name = d.create_shape_name();
    let update_name = d.update_shape_name();
    let filter_name = format!("{entity}Filter");
    let store_name = format!("Pg{entity}Store");
    let table_const = format!("{prefix}_TABLE");
    let order_const = format!("{prefix}_ORDER");

    let updated_at_column = d
        .entity_fields
        .iter()
        .find(|f| f.name == "updated_at")
        .map(|f| f.column.clone())
        .unwrap_or_else(|| "updated_at".to_string());
    let archived_at_column = d
        .entity_fields
        .iter()
        .find(|f| f.name == "archived_at")
        .map(|f| f.column.clone())
        .unwrap_or_else(|| "archived_at".to_string());

    let filter_fields: Vec<&FieldDescriptor> = d
        .entity_fields
        .iter()
        .filter(|f| f.column != d.pk_column && f.field_type != FieldType::Jsonb)
        .collect();
    // Nullable columns cannot anchor a keyset resume: a NULL order value
    // makes the strict row-value predicate match nothing.
    let order_fields: Vec<&FieldDescriptor> = d
        .entity_fields
        .iter()
        .filter(|f| f.field_type != FieldType::Jsonb && !f.nullable)
        .collect();

    let uses_chrono = [&d.entity_fields, &d.create_fields, &d.update_fields]
        .iter()
        .any(|fs| fs.iter().any(|f| f.field_type == FieldType::Timestamptz));
    let uses_uuid = [&d.entity_fields, &d.create_fields, &d.update_fields]
        .iter()
        .any(|fs| fs.iter().any(|f| f.field_type == FieldType::Uuid));

    let mut out = String::new();
    w!(out, "// @generated by repogen: data-access module for {entity}. Do not edit.");
    w!(out, "");
    w!(out, "use std::collections::HashMap;");
    w!(out, "use std::sync::Arc;");
    w!(out, "");
    w!(out, "use async_trait::async_trait;");
    if uses_chrono {
        w!(out, "use chrono::{{DateTime, Utc}};");
    }
    w!(out, "use serde::{{Deserialize, Serialize}};");
    w!(out, "use sqlx::PgPool;");
    if uses_uuid {
        w!(out, "use uuid::Uuid;");
    }
    w!(out, "");
    w!(out, "use {rt}::filter;");
    w!(out, "use {rt}::order::{{Direction, OrderField, OrderMap}};");
    w!(out, "use {rt}::page::{{build_page, Cursor, Page, PageRequest}};");
    w!(out, "use {rt}::repo::{{");
    if d.key_kind == KeyKind::Text {
        w!(out, "    Archiver, Deleter, Keyed, OpContext, Reader, Repository, Updater, UuidIdSource, Writer,");
    } else {
        w!(out, "    Archiver, Deleter, Keyed, OpContext, Reader, Repository, Updater, Writer,");
    }
    w!(out, "}};");
    w!(out, "use {rt}::sql::{{exec, PgBindValue, TableMeta}};");
    w!(out, "use {rt}::Error;");
    w!(out, "");

    emit_table_meta(&mut out, d, &table_const, &updated_at_column, &archived_at_column);
    emit_order_map(&mut out, d, &order_const, &order_fields);
    emit_entity_struct(&mut out, d, entity);
    emit_create_struct(&mut out, d, &create_name);
    emit_keyed_impl(&mut out, d, &create_name);
    emit_update_struct(&mut out, d, &update_name, &updated_at_column);
    emit_filter_struct(&mut out, &filter_name, &filter_fields);
    emit_order_value(&mut out, entity, &order_fields);
    emit_store(
        &mut out,
        d,
        entity,
        key_ty,
        &create_name,
        &update_name,
        &filter_name,
        &store_name,
        &table_const,
        &order_const,
        &updated_at_column,
    );
    out
}

fn emit_table_meta(
    out: &mut String,
    d: &EntityDescriptor,
    table_const: &str,
    updated_at_column: &str,
    archived_at_column: &str,
) {
    w!(out, "pub const {table_const}: TableMeta = TableMeta {{");
    w!(out, "    entity: \"{}\",", d.entity_name);
    w!(out, "    schema: \"{}\",", d.schema_name);
    w!(out, "    table: \"{}\",", d.table_name);
    w!(out, "    pk_column: \"{}\",", d.pk_column);
    let cols: Vec<String> = d
        .entity_fields
        .iter()
        .map(|f| format!("\"{}\"", f.column))
        .collect();
    w!(out, "    entity_columns: &[{}],", cols.join(", "));
    w!(out, "    updated_at_column: \"{updated_at_column}\",");
    w!(out, "    archived_at_column: \"{archived_at_column}\",");
    w!(out, "}};");
    w!(out, "");
}

fn emit_order_map(
    out: &mut String,
    d: &EntityDescriptor,
    order_const: &str,
    order_fields: &[&FieldDescriptor],
) {
    w!(out, "pub const {order_const}: OrderMap = OrderMap {{");
    w!(out, "    fields: &[");
    for f in order_fields {
        w!(
            out,
            "        OrderField {{ name: \"{}\", column: \"{}\", pg_type: \"{}\" }},",
            f.name,
            f.column,
            f.field_type.pg_type()
        );
    }
    w!(out, "    ],");
    w!(out, "    default_field: \"{}\",", d.pk_field);
    w!(out, "    default_direction: Direction::Asc,");
    w!(out, "    pk_column: \"{}\",", d.pk_column);
    w!(out, "    pk_pg_type: \"{}\",", key_pg_type(d.key_kind));
    w!(out, "}};");
    w!(out, "");
}

fn emit_entity_struct(out: &mut String, d: &EntityDescriptor, entity: &str) {
    w!(out, "#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]");
    w!(out, "pub struct {entity} {{");
    for f in &d.entity_fields {
        if f.column != f.name {
            w!(out, "    #[sqlx(rename = \"{}\")]", f.column);
        }
        w!(out, "    pub {}: {},", f.name, rust_type(f));
    }
    w!(out, "}}");
    w!(out, "");
}

fn emit_create_struct(out: &mut String, d: &EntityDescriptor, create_name: &str) {
    w!(out, "#[derive(Clone, Debug, Serialize, Deserialize)]");
    w!(out, "pub struct {create_name} {{");
    for f in &d.create_fields {
        if f.column == d.pk_column {
            match d.key_kind {
                KeyKind::Text => {
                    w!(out, "    #[serde(default)]");
                    w!(out, "    pub {}: String,", f.name);
                }
                KeyKind::Int4 => {
                    w!(out, "    #[serde(default)]");
                    w!(out, "    pub {}: Option<i32>,", f.name);
                }
                KeyKind::Int8 => {
                    w!(out, "    #[serde(default)]");
                    w!(out, "    pub {}: Option<i64>,", f.name);
                }
            }
        } else {
            w!(out, "    pub {}: {},", f.name, rust_type(f));
        }
    }
    w!(out, "}}");
    w!(out, "");
}

fn emit_keyed_impl(out: &mut String, d: &EntityDescriptor, create_name: &str) {
    let pk = d.create_fields.iter().find(|f| f.column == d.pk_column);
    w!(out, "impl Keyed for {create_name} {{");
    match (pk, d.key_kind) {
        (Some(f), KeyKind::Text) => {
            w!(out, "    fn key_is_empty(&self) -> bool {{");
            w!(out, "        self.{}.is_empty()", f.name);
            w!(out, "    }}");
            w!(out, "");
            w!(out, "    fn set_key(&mut self, key: String) {{");
            w!(out, "        self.{} = key;", f.name);
            w!(out, "    }}");
        }
        _ => {
            // Integer keys are assigned by the database, never minted.
            w!(out, "    fn key_is_empty(&self) -> bool {{");
            w!(out, "        false");
            w!(out, "    }}");
            w!(out, "");
            w!(out, "    fn set_key(&mut self, _key: String) {{}}");
        }
    }
    w!(out, "}}");
    w!(out, "");
}

fn emit_update_struct(
    out: &mut String,
    d: &EntityDescriptor,
    update_name: &str,
    updated_at_column: &str,
) {
    w!(out, "#[derive(Clone, Debug, Default, Serialize, Deserialize)]");
    w!(out, "pub struct {update_name} {{");
    for f in &d.update_fields {
        let base = f.field_type.rust_type();
        if f.nullable || f.column == updated_at_column {
            w!(out, "    #[serde(default)]");
            w!(out, "    pub {}: Option<{}>,", f.name, base);
        } else {
            w!(out, "    pub {}: {},", f.name, base);
        }
    }
    w!(out, "}}");
    w!(out, "");
}

fn emit_filter_struct(out: &mut String, filter_name: &str, filter_fields: &[&FieldDescriptor]) {
    w!(out, "#[derive(Clone, Debug, Default)]");
    w!(out, "pub struct {filter_name} {{");
    for f in filter_fields {
        let ty = match f.field_type {
            FieldType::Text => "Option<String>",
            FieldType::Int4 | FieldType::Int8 => "Option<i64>",
            FieldType::Bool => "Option<bool>",
            FieldType::Timestamptz => "Option<DateTime<Utc>>",
            FieldType::Uuid => "Option<Uuid>",
            FieldType::Jsonb => continue,
        };
        w!(out, "    pub {}: {},", f.name, ty);
    }
    w!(out, "}}");
    w!(out, "");
    w!(out, "impl {filter_name} {{");
    w!(out, "    /// Parse from raw query parameters. A malformed value fails the");
    w!(out, "    /// whole filter, naming the field.");
    w!(
        out,
        "    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, Error> {{"
    );
    w!(out, "        Ok(Self {{");
    for f in filter_fields {
        let getter = format!("params.get(\"{}\").map(String::as_str)", f.name);
        let line = match f.field_type {
            FieldType::Text => format!("filter::string(\"{}\", {getter})", f.name),
            FieldType::Int4 | FieldType::Int8 => {
                format!("filter::integer(\"{}\", {getter})?", f.name)
            }
            FieldType::Bool => format!("filter::boolean(\"{}\", {getter})?", f.name),
            FieldType::Timestamptz => format!("filter::timestamp(\"{}\", {getter})?", f.name),
            FieldType::Uuid => format!("filter::uuid(\"{}\", {getter})?", f.name),
            FieldType::Jsonb => continue,
        };
        w!(out, "            {}: {line},", f.name);
    }
    w!(out, "        }})");
    w!(out, "    }}");
    w!(out, "");
    w!(out, "    fn clauses(&self) -> Vec<(&'static str, PgBindValue)> {{");
    w!(out, "        let mut out = Vec::new();");
    for f in filter_fields {
        let value = match f.field_type {
            FieldType::Text => "v.clone()",
            FieldType::Jsonb => continue,
            _ => "*v",
        };
        w!(out, "        if let Some(v) = &self.{} {{", f.name);
        w!(
            out,
            "            out.push((\"{}\", PgBindValue::from({value})));",
            f.column
        );
        w!(out, "        }}");
    }
    w!(out, "        out");
    w!(out, "    }}");
    w!(out, "}}");
    w!(out, "");
}

fn emit_order_value(out: &mut String, entity: &str, order_fields: &[&FieldDescriptor]) {
    w!(
        out,
        "fn order_value(row: &{entity}, column: &str) -> serde_json::Value {{"
    );
    w!(out, "    match column {{");
    for f in order_fields {
        w!(
            out,
            "        \"{}\" => serde_json::json!(row.{}),",
            f.column,
            f.name
        );
    }
    w!(out, "        _ => serde_json::Value::Null,");
    w!(out, "    }}");
    w!(out, "}}");
    w!(out, "");
}

#[allow(clippy::too_many_arguments)]
fn emit_store(
    out: &mut String,
    d: &EntityDescriptor,
    entity: &str,
    key_ty: &str,
    create_name: &str,
    update_name: &str,
    filter_name: &str,
    store_name: &str,
    table_const: &str,
    order_const: &str,
    updated_at_column: &str,
) {
    let bind_id = id_bind(d.key_kind);
    let key_expr = match d.key_kind {
        KeyKind::Text => "row.{pk}.clone()".to_string(),
        KeyKind::Int4 | KeyKind::Int8 => "row.{pk}".to_string(),
    }
    .replace("{pk}", &d.pk_field);

    w!(out, "/// PostgreSQL-backed store for {entity} implementing all five capabilities.");
    w!(out, "#[derive(Clone)]");
    w!(out, "pub struct {store_name} {{");
    w!(out, "    pool: PgPool,");
    w!(out, "}}");
    w!(out, "");
    w!(out, "impl {store_name} {{");
    w!(out, "    pub fn new(pool: PgPool) -> Self {{");
    w!(out, "        Self {{ pool }}");
    w!(out, "    }}");
    w!(out, "}}");
    w!(out, "");

    // Reader
    w!(out, "#[async_trait]");
    w!(out, "impl Reader<{key_ty}, {entity}, {filter_name}> for {store_name} {{");
    w!(out, "    async fn get(");
    w!(out, "        &self,");
    w!(out, "        ctx: &OpContext,");
    w!(out, "        id: &{key_ty},");
    w!(out, "        filter: Option<&{filter_name}>,");
    w!(out, "    ) -> Result<{entity}, Error> {{");
    w!(out, "        let clauses = filter.map({filter_name}::clauses).unwrap_or_default();");
    w!(out, "        exec::fetch_by_id(ctx, &self.pool, &{table_const}, {bind_id}, clauses).await");
    w!(out, "    }}");
    w!(out, "");
    w!(out, "    async fn list(");
    w!(out, "        &self,");
    w!(out, "        ctx: &OpContext,");
    w!(out, "        filter: Option<&{filter_name}>,");
    w!(out, "        order: Option<&str>,");
    w!(out, "        page: &PageRequest,");
    w!(out, "    ) -> Result<Page<{entity}>, Error> {{");
    w!(out, "        let order = {order_const}.resolve(order)?;");
    w!(out, "        let cursor = match page.cursor.as_deref() {{");
    w!(out, "            Some(token) => Cursor::<serde_json::Value, {key_ty}>::decode(token)?,");
    w!(out, "            None => None,");
    w!(out, "        }};");
    w!(out, "        let clauses = filter.map({filter_name}::clauses).unwrap_or_default();");
    w!(out, "        let keyset = match cursor {{");
    w!(out, "            Some(c) => Some((");
    w!(out, "                PgBindValue::from_order_value(&c.order_value, order.pg_type)?,");
    w!(out, "                PgBindValue::from(c.key),");
    w!(out, "            )),");
    w!(out, "            None => None,");
    w!(out, "        }};");
    w!(out, "        let rows = exec::fetch_page::<{entity}>(");
    w!(out, "            ctx,");
    w!(out, "            &self.pool,");
    w!(out, "            &{table_const},");
    w!(out, "            &order,");
    w!(out, "            clauses,");
    w!(out, "            keyset,");
    w!(out, "            page.limit,");
    w!(out, "        )");
    w!(out, "        .await?;");
    w!(out, "        build_page(rows, page, |row| {{");
    w!(out, "            Cursor::new(order_value(row, order.column), {key_expr})");
    w!(out, "        }})");
    w!(out, "    }}");
    w!(out, "}}");
    w!(out, "");

    // Writer
    w!(out, "#[async_trait]");
    w!(out, "impl Writer<{create_name}, {entity}> for {store_name} {{");
    w!(out, "    async fn create(&self, ctx: &OpContext, payload: {create_name}) -> Result<{entity}, Error> {{");
    w!(out, "        let mut values: Vec<(&'static str, PgBindValue)> = Vec::new();");
    for f in &d.create_fields {
        if f.column == d.pk_column && d.key_kind != KeyKind::Text {
            w!(out, "        if let Some(v) = payload.{} {{", f.name);
            w!(out, "            values.push((\"{}\", PgBindValue::from(v)));", f.column);
            w!(out, "        }}");
        } else {
            w!(
                out,
                "        values.push((\"{}\", PgBindValue::from(payload.{})));",
                f.column,
                f.name
            );
        }
    }
    w!(out, "        exec::insert_returning(ctx, &self.pool, &{table_const}, values).await");
    w!(out, "    }}");
    w!(out, "}}");
    w!(out, "");

    // Updater
    let updated_at_field = d
        .update_fields
        .iter()
        .find(|f| f.column == updated_at_column);
    w!(out, "#[async_trait]");
    w!(out, "impl Updater<{key_ty}, {update_name}, {entity}> for {store_name} {{");
    w!(out, "    async fn update(");
    w!(out, "        &self,");
    w!(out, "        ctx: &OpContext,");
    w!(out, "        id: &{key_ty},");
    w!(out, "        payload: {update_name},");
    w!(out, "    ) -> Result<{entity}, Error> {{");
    w!(out, "        let mut sets: Vec<(&'static str, PgBindValue)> = Vec::new();");
    for f in &d.update_fields {
        if f.column == updated_at_column {
            continue;
        }
        if f.nullable {
            w!(out, "        if let Some(v) = payload.{} {{", f.name);
            w!(out, "            sets.push((\"{}\", PgBindValue::from(v)));", f.column);
            w!(out, "        }}");
        } else {
            w!(
                out,
                "        sets.push((\"{}\", PgBindValue::from(payload.{})));",
                f.column,
                f.name
            );
        }
    }
    let stamp = match updated_at_field {
        Some(f) => format!("payload.{}", f.name),
        None => "None".to_string(),
    };
    w!(out, "        exec::update_returning(ctx, &self.pool, &{table_const}, {bind_id}, sets, {stamp}).await");
    w!(out, "    }}");
    w!(out, "}}");
    w!(out, "");

    // Deleter / Archiver
    w!(out, "#[async_trait]");
    w!(out, "impl Deleter<{key_ty}> for {store_name} {{");
    w!(out, "    async fn delete(&self, ctx: &OpContext, id: &{key_ty}) -> Result<(), Error> {{");
    w!(out, "        exec::delete_by_id(ctx, &self.pool, &{table_const}, {bind_id}).await");
    w!(out, "    }}");
    w!(out, "}}");
    w!(out, "");
    w!(out, "#[async_trait]");
    w!(out, "impl Archiver<{key_ty}> for {store_name} {{");
    w!(out, "    async fn archive(&self, ctx: &OpContext, id: &{key_ty}) -> Result<(), Error> {{");
    w!(out, "        exec::archive_by_id(ctx, &self.pool, &{table_const}, {bind_id}).await");
    w!(out, "    }}");
    w!(out, "}}");
    w!(out, "");

    // Repository constructor
    w!(out, "/// Repository over {entity} with every capability bound.");
    w!(out, "pub fn repository(");
    w!(out, "    pool: PgPool,");
    w!(out, ") -> Repository<{key_ty}, {entity}, {create_name}, {update_name}, {filter_name}> {{");
    w!(out, "    let store = Arc::new({store_name}::new(pool));");
    w!(out, "    Repository::builder()");
    w!(out, "        .reader(store.clone())");
    w!(out, "        .writer(store.clone())");
    w!(out, "        .updater(store.clone())");
    w!(out, "        .deleter(store.clone())");
    w!(out, "        .archiver(store)");
    if d.key_kind == KeyKind::Text {
        w!(out, "        .id_source(Arc::new(UuidIdSource))");
    }
    w!(out, "        .build()");
    w!(out, "}}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{introspect, parse_decl};

    const DECL: &str = r#"{
        "entity": "Task",
        "schema": "app",
        "table": "tasks",
        "primary_key": "id",
        "key_kind": "text",
        "fields": [
            {"name": "id", "column": "id", "type": "text"},
            {"name": "title", "column": "title", "type": "text"},
            {"name": "priority", "column": "priority", "type": "int8", "optional": true},
            {"name": "updated_at", "column": "updated_at", "type": "timestamptz"},
            {"name": "archived_at", "column": "archived_at", "type": "timestamptz", "optional": true}
        ],
        "create_fields": [
            {"name": "id", "column": "id", "type": "text"},
            {"name": "title", "column": "title", "type": "text"},
            {"name": "priority", "column": "priority", "type": "int8", "optional": true}
        ],
        "update_fields": [
            {"name": "title", "column": "title", "type": "text", "optional": true},
            {"name": "priority", "column": "priority", "type": "int8", "optional": true},
            {"name": "updated_at", "column": "updated_at", "type": "timestamptz", "optional": true}
        ]
    }"#;

    fn emitted() -> String {
        let descriptor = introspect(&parse_decl(DECL).unwrap()).unwrap();
        emit(&descriptor, &EmitOptions::default())
    }

    #[test]
    fn emission_is_deterministic() {
        assert_eq!(emitted(), emitted());
    }

    #[test]
    fn emits_the_three_shapes_and_the_store() {
        let code = emitted();
        assert!(code.contains("pub struct Task {"));
        assert!(code.contains("pub struct CreateTask {"));
        assert!(code.contains("pub struct UpdateTask {"));
        assert!(code.contains("pub struct TaskFilter {"));
        assert!(code.contains("pub struct PgTaskStore {"));
        assert!(code.contains("pub fn repository("));
    }

    #[test]
    fn optional_update_fields_contribute_conditionally() {
        let code = emitted();
        assert!(code.contains("if let Some(v) = payload.priority {"));
        // updated_at is stamped by the runtime, never part of the SET loop
        assert!(code.contains("sets, payload.updated_at"));
    }

    #[test]
    fn nullable_fields_are_not_orderable() {
        let code = emitted();
        assert!(!code.contains("OrderField { name: \"archived_at\""));
        assert!(!code.contains("OrderField { name: \"priority\""));
        assert!(code.contains("OrderField { name: \"updated_at\""));
    }

    #[test]
    fn resume_values_bind_through_the_order_type() {
        let code = emitted();
        assert!(code.contains("PgBindValue::from_order_value(&c.order_value, order.pg_type)?"));
        assert!(!code.contains("from_json"));
    }

    #[test]
    fn text_keys_bind_an_id_source() {
        let code = emitted();
        assert!(code.contains(".id_source(Arc::new(UuidIdSource))"));
        assert!(code.contains("self.id.is_empty()"));
    }

    #[test]
    fn runtime_path_is_configurable() {
        let descriptor = introspect(&parse_decl(DECL).unwrap()).unwrap();
        let code = emit(
            &descriptor,
            &EmitOptions {
                runtime_path: "crate".to_string(),
            },
        );
        assert!(code.contains("use crate::filter;"));
        assert!(!code.contains("use repogen::"));
    }

    #[test]
    fn module_name_is_snake_case() {
        let mut descriptor = introspect(&parse_decl(DECL).unwrap()).unwrap();
        descriptor.entity_name = "TaskNote".to_string();
        assert_eq!(module_name(&descriptor), "task_note");
    }
}
