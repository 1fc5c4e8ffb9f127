pub mod descriptor;
pub mod introspect;
pub mod loader;
pub mod types;

pub use descriptor::*;
pub use introspect::*;
pub use loader::*;
pub use types::*;
