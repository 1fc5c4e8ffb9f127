//! Capability composition runtime.

mod capability;
mod context;
mod id;
mod repository;

pub use capability::{Archiver, Deleter, Keyed, Reader, Updater, Writer};
pub use context::OpContext;
pub use id::{IdSource, UuidIdSource};
pub use repository::{Repository, RepositoryBuilder};
