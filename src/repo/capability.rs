//! The five capability ports. Each is an independent contract over one
//! entity family; a store may implement any subset, and a decorator can
//! replace a single capability while the rest delegate to the generated
//! implementation.

use crate::error::Error;
use crate::page::{Page, PageRequest};
use crate::repo::OpContext;
use async_trait::async_trait;

#[async_trait]
pub trait Reader<K, E, F>: Send + Sync {
    async fn get(&self, ctx: &OpContext, id: &K, filter: Option<&F>) -> Result<E, Error>;

    /// `order` is the raw client order input (`{field},{direction}`);
    /// translation and validation happen inside the implementation.
    async fn list(
        &self,
        ctx: &OpContext,
        filter: Option<&F>,
        order: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<E>, Error>;
}

#[async_trait]
pub trait Writer<C, E>: Send + Sync {
    async fn create(&self, ctx: &OpContext, payload: C) -> Result<E, Error>;
}

#[async_trait]
pub trait Updater<K, U, E>: Send + Sync {
    async fn update(&self, ctx: &OpContext, id: &K, payload: U) -> Result<E, Error>;
}

#[async_trait]
pub trait Deleter<K>: Send + Sync {
    async fn delete(&self, ctx: &OpContext, id: &K) -> Result<(), Error>;
}

#[async_trait]
pub trait Archiver<K>: Send + Sync {
    async fn archive(&self, ctx: &OpContext, id: &K) -> Result<(), Error>;
}

/// Create-payload access to the primary-key field, used for id minting.
pub trait Keyed {
    /// True when the payload carries no identifier and one should be minted.
    fn key_is_empty(&self) -> bool;
    fn set_key(&mut self, key: String);
}
