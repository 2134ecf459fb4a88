//! Data store registry.

use baseapi_core::{Document, Manager, ManagerHandle, ManagerRegistry, StoreError};
use std::{collections::HashMap, sync::Arc};

/// A [`ManagerRegistry`] backed by a `HashMap` of named managers.
///
/// # Example
/// ```ignore
/// let stores = DataStores::new()
///     .register("doctrine", orm_manager)
///     .register("doctrine_mongodb", odm_manager);
/// ```
pub struct DataStores<D: Document> {
    managers: HashMap<String, ManagerHandle<D>>,
}

impl<D: Document> DataStores<D> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            managers: HashMap::new(),
        }
    }

    /// Register `manager` as the data store `name`. Later registrations win.
    pub fn register<M: Manager<D>>(self, name: impl Into<String>, manager: M) -> Self {
        self.register_shared(name, Arc::new(manager))
    }

    /// Register an already shared manager.
    pub fn register_shared(mut self, name: impl Into<String>, manager: ManagerHandle<D>) -> Self {
        self.managers.insert(name.into(), manager);
        self
    }

    /// Number of registered data stores.
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Whether no data store is registered.
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl<D: Document> Default for DataStores<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> ManagerRegistry<D> for DataStores<D> {
    fn manager(&self, data_store: &str) -> Result<ManagerHandle<D>, StoreError> {
        self.managers
            .get(data_store)
            .cloned()
            .ok_or_else(|| StoreError::UnknownStore(data_store.to_owned()))
    }
}
