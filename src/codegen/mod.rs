//! Code emission from resolved descriptors.

pub mod emit;

pub use emit::{emit, module_name, EmitOptions};
