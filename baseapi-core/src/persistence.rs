//! Persistence managers and data store lookup.

use crate::{
    document::Document,
    error::{RepositoryError, StoreError},
    hook::BoxFuture,
    repository::RepositoryHandle,
};
use std::{future::Future, sync::Arc};

/// The unit of work of one data store.
///
/// `persist` and `remove` stage changes; `flush` writes them. The
/// transactional boundary belongs to the implementation.
pub trait Manager<D: Document>: Send + Sync + 'static {
    /// Look up a repository of this data store by name.
    fn repository(&self, name: &str) -> Result<RepositoryHandle<D>, StoreError>;

    /// Stage `document` for insertion or update. May assign its identifier.
    fn persist(&self, document: &mut D) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Stage `document` for removal.
    fn remove(&self, document: &D) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Write all staged changes.
    fn flush(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Dynamic object-safe version of [`Manager`].
pub trait DynManager<D: Document>: Send + Sync + 'static {
    /// Look up a repository of this data store by name.
    fn repository(&self, name: &str) -> Result<RepositoryHandle<D>, StoreError>;

    /// Stage `document` for insertion or update.
    fn persist_dyn<'a>(&'a self, document: &'a mut D) -> BoxFuture<'a, Result<(), RepositoryError>>;

    /// Stage `document` for removal.
    fn remove_dyn<'a>(&'a self, document: &'a D) -> BoxFuture<'a, Result<(), RepositoryError>>;

    /// Write all staged changes.
    fn flush_dyn(&self) -> BoxFuture<'_, Result<(), RepositoryError>>;
}

impl<D: Document, M: Manager<D>> DynManager<D> for M {
    fn repository(&self, name: &str) -> Result<RepositoryHandle<D>, StoreError> {
        Manager::repository(self, name)
    }

    fn persist_dyn<'a>(&'a self, document: &'a mut D) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(self.persist(document))
    }

    fn remove_dyn<'a>(&'a self, document: &'a D) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(self.remove(document))
    }

    fn flush_dyn(&self) -> BoxFuture<'_, Result<(), RepositoryError>> {
        Box::pin(self.flush())
    }
}

/// A shared, type-erased manager.
pub type ManagerHandle<D> = Arc<dyn DynManager<D>>;

/// Resolves a data store name (`"doctrine"`, `"doctrine_mongodb"`, ...) to its manager.
pub trait ManagerRegistry<D: Document>: Send + Sync + 'static {
    /// The manager registered as `data_store`.
    fn manager(&self, data_store: &str) -> Result<ManagerHandle<D>, StoreError>;
}
