//! Capability-composed repository: one uniform type exposing any subset of
//! {get, list, create, update, delete, archive} over an entity family. An
//! unbound capability reports "operation not supported" without touching the
//! backend.

use crate::error::Error;
use crate::page::{Page, PageRequest};
use crate::repo::{Archiver, Deleter, IdSource, Keyed, OpContext, Reader, Updater, Writer};
use std::sync::Arc;

pub struct Repository<K, E, C, U, F> {
    reader: Option<Arc<dyn Reader<K, E, F>>>,
    writer: Option<Arc<dyn Writer<C, E>>>,
    updater: Option<Arc<dyn Updater<K, U, E>>>,
    deleter: Option<Arc<dyn Deleter<K>>>,
    archiver: Option<Arc<dyn Archiver<K>>>,
    id_source: Option<Arc<dyn IdSource>>,
}

pub struct RepositoryBuilder<K, E, C, U, F> {
    reader: Option<Arc<dyn Reader<K, E, F>>>,
    writer: Option<Arc<dyn Writer<C, E>>>,
    updater: Option<Arc<dyn Updater<K, U, E>>>,
    deleter: Option<Arc<dyn Deleter<K>>>,
    archiver: Option<Arc<dyn Archiver<K>>>,
    id_source: Option<Arc<dyn IdSource>>,
}

impl<K, E, C, U, F> RepositoryBuilder<K, E, C, U, F> {
    pub fn new() -> Self {
        RepositoryBuilder {
            reader: None,
            writer: None,
            updater: None,
            deleter: None,
            archiver: None,
            id_source: None,
        }
    }

    pub fn reader(mut self, reader: Arc<dyn Reader<K, E, F>>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn writer(mut self, writer: Arc<dyn Writer<C, E>>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn updater(mut self, updater: Arc<dyn Updater<K, U, E>>) -> Self {
        self.updater = Some(updater);
        self
    }

    pub fn deleter(mut self, deleter: Arc<dyn Deleter<K>>) -> Self {
        self.deleter = Some(deleter);
        self
    }

    pub fn archiver(mut self, archiver: Arc<dyn Archiver<K>>) -> Self {
        self.archiver = Some(archiver);
        self
    }

    pub fn id_source(mut self, id_source: Arc<dyn IdSource>) -> Self {
        self.id_source = Some(id_source);
        self
    }

    pub fn build(self) -> Repository<K, E, C, U, F> {
        Repository {
            reader: self.reader,
            writer: self.writer,
            updater: self.updater,
            deleter: self.deleter,
            archiver: self.archiver,
            id_source: self.id_source,
        }
    }
}

impl<K, E, C, U, F> Default for RepositoryBuilder<K, E, C, U, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E, C, U, F> Repository<K, E, C, U, F> {
    pub fn builder() -> RepositoryBuilder<K, E, C, U, F> {
        RepositoryBuilder::new()
    }

    pub async fn get(&self, ctx: &OpContext, id: &K, filter: Option<&F>) -> Result<E, Error> {
        let Some(reader) = &self.reader else {
            return Err(Error::Unsupported("get"));
        };
        reader.get(ctx, id, filter).await
    }

    pub async fn list(
        &self,
        ctx: &OpContext,
        filter: Option<&F>,
        order: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<E>, Error> {
        let Some(reader) = &self.reader else {
            return Err(Error::Unsupported("list"));
        };
        reader.list(ctx, filter, order, page).await
    }

    pub async fn update(&self, ctx: &OpContext, id: &K, payload: U) -> Result<E, Error> {
        let Some(updater) = &self.updater else {
            return Err(Error::Unsupported("update"));
        };
        updater.update(ctx, id, payload).await
    }

    pub async fn delete(&self, ctx: &OpContext, id: &K) -> Result<(), Error> {
        let Some(deleter) = &self.deleter else {
            return Err(Error::Unsupported("delete"));
        };
        deleter.delete(ctx, id).await
    }

    pub async fn archive(&self, ctx: &OpContext, id: &K) -> Result<(), Error> {
        let Some(archiver) = &self.archiver else {
            return Err(Error::Unsupported("archive"));
        };
        archiver.archive(ctx, id).await
    }
}

impl<K, E, C: Keyed + Send, U, F> Repository<K, E, C, U, F> {
    /// Create, minting an identifier first when the payload arrives without
    /// one and an id source is bound.
    pub async fn create(&self, ctx: &OpContext, mut payload: C) -> Result<E, Error> {
        let Some(writer) = &self.writer else {
            return Err(Error::Unsupported("create"));
        };
        if payload.key_is_empty() {
            if let Some(ids) = &self.id_source {
                payload.set_key(ids.mint());
            }
        }
        writer.create(ctx, payload).await
    }
}
