//! A repository assembled from named operations.
//!
//! Instead of reflecting on a query object at runtime, a [`MethodTable`]
//! registers each operation under its name. Calls to names that were never
//! registered fail with [`RepositoryError::UnknownMethod`], which is what lets
//! a controller's catch-all dispatch report a missing method.

use baseapi_core::{Document, Output, Repository, RepositoryError, Value};
use futures::future::{BoxFuture, FutureExt};
use std::{collections::HashMap, future::Future};

type Operation<D> =
    Box<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Output<D>, RepositoryError>> + Send + Sync>;

/// A repository backed by a table of named operations.
///
/// # Example
/// ```ignore
/// let products = MethodTable::new("Product")
///     .method("count", |_args| async { Ok(Output::Value(42.into())) })
///     .method("findAll", move |_args| {
///         let rows = rows.clone();
///         async move { Ok(Output::many(rows)) }
///     });
/// ```
pub struct MethodTable<D: Document> {
    name: String,
    operations: HashMap<String, Operation<D>>,
}

impl<D: Document> MethodTable<D> {
    /// An empty table for the repository `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: HashMap::new(),
        }
    }

    /// Register `operation` under `method`, replacing any previous one.
    pub fn method<F, Fut>(mut self, method: impl Into<String>, operation: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Output<D>, RepositoryError>> + Send + 'static,
    {
        self.operations
            .insert(method.into(), Box::new(move |arguments| operation(arguments).boxed()));
        self
    }

    /// Whether `method` is registered.
    pub fn contains(&self, method: &str) -> bool {
        self.operations.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no method is registered.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl<D: Document> Repository<D> for MethodTable<D> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, method: &str, arguments: &[Value]) -> Result<Output<D>, RepositoryError> {
        match self.operations.get(method) {
            Some(operation) => operation(arguments.to_vec()).await,
            None => Err(RepositoryError::unknown_method(&self.name, method)),
        }
    }
}
