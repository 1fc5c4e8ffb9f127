//! repogen: a data-access layer generator and runtime for PostgreSQL.
//!
//! The generator half reads entity declarations, resolves them into
//! descriptors, and emits one data-access module per entity. The runtime
//! half is what those modules lean on: statement building and execution,
//! keyset pagination, filter and order translation, and capability-composed
//! repositories.

pub mod case;
pub mod codegen;
pub mod error;
pub mod filter;
pub mod http;
pub mod migrate;
pub mod order;
pub mod page;
pub mod repo;
pub mod schema;
pub mod sql;

pub use error::{Error, SchemaError};
