//! Safe SQL: identifiers from generated metadata only, values as parameters.

pub mod builder;
pub mod exec;
pub mod params;

pub use builder::TableMeta;
pub use params::PgBindValue;
