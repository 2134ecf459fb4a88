//! # Repositories
//!
//! A repository is an opaque query object scoped to one document type. It is
//! called by method name with positional JSON arguments, the way a controller
//! receives them from a route, and answers with an [`Output`].
//!
//! Back-ends disagree on how they hand back many documents (an array, a
//! driver cursor, a lazily evaluated iterable). They all become a [`Cursor`]
//! at this boundary, so callers only ever see one collection shape.

use crate::{
    document::Document,
    error::RepositoryError,
    hook::BoxFuture,
};
use serde_json::Value;
use std::{fmt, future::Future, sync::Arc};

/// A finite, forward-only sequence of documents.
pub struct Cursor<D> {
    inner: Box<dyn Iterator<Item = D> + Send>,
}

impl<D: Send + 'static> Cursor<D> {
    /// Wrap any sendable iterator.
    pub fn new<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Box::new(documents.into_iter()),
        }
    }

    /// A cursor that yields nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Drain the cursor into a vector, preserving order.
    pub fn to_vec(self) -> Vec<D> {
        self.inner.collect()
    }
}

impl<D> Iterator for Cursor<D> {
    type Item = D;

    fn next(&mut self) -> Option<D> {
        self.inner.next()
    }
}

impl<D: Send + 'static> From<Vec<D>> for Cursor<D> {
    fn from(documents: Vec<D>) -> Self {
        Self::new(documents)
    }
}

impl<D> fmt::Debug for Cursor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").finish_non_exhaustive()
    }
}

/// What a repository method returned.
#[derive(Debug)]
pub enum Output<D> {
    /// Nothing (a missing document, `null`).
    Empty,
    /// A single document.
    One(D),
    /// Zero or more documents.
    Many(Cursor<D>),
    /// A scalar or structured value (counts, bulk update reports).
    Value(Value),
}

impl<D: Send + 'static> Output<D> {
    /// Build a [`Output::Many`] from anything iterable.
    pub fn many<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        I::IntoIter: Send + 'static,
    {
        Output::Many(Cursor::new(documents))
    }
}

impl<D> From<Option<D>> for Output<D> {
    fn from(document: Option<D>) -> Self {
        match document {
            Some(document) => Output::One(document),
            None => Output::Empty,
        }
    }
}

/// A query object for one document type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Repository` of `{D}`",
    label = "missing `Repository` implementation",
    note = "Repositories must implement `name` and `call` for documents of type `{D}`."
)]
pub trait Repository<D: Document>: Send + Sync + 'static {
    /// Repository name, used in error messages.
    fn name(&self) -> &str;

    /// Invoke `method` with positional `arguments`.
    ///
    /// Unknown methods must fail with [`RepositoryError::UnknownMethod`].
    fn call(
        &self,
        method: &str,
        arguments: &[Value],
    ) -> impl Future<Output = Result<Output<D>, RepositoryError>> + Send;
}

/// Dynamic object-safe version of [`Repository`].
pub trait DynRepository<D: Document>: Send + Sync + 'static {
    /// Repository name, used in error messages.
    fn name(&self) -> &str;

    /// Invoke `method` with positional `arguments` (dynamic dispatch version).
    fn call_dyn<'a>(
        &'a self,
        method: &'a str,
        arguments: &'a [Value],
    ) -> BoxFuture<'a, Result<Output<D>, RepositoryError>>;
}

impl<D: Document, R: Repository<D>> DynRepository<D> for R {
    fn name(&self) -> &str {
        Repository::name(self)
    }

    fn call_dyn<'a>(
        &'a self,
        method: &'a str,
        arguments: &'a [Value],
    ) -> BoxFuture<'a, Result<Output<D>, RepositoryError>> {
        Box::pin(self.call(method, arguments))
    }
}

/// A shared, type-erased repository.
pub type RepositoryHandle<D> = Arc<dyn DynRepository<D>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_preserves_order() {
        let cursor = Cursor::from(vec![3, 1, 2]);
        assert_eq!(cursor.to_vec(), vec![3, 1, 2]);
    }

    #[test]
    fn test_cursor_from_lazy_iterator() {
        let cursor = Cursor::new((0..4).map(|n| n * 10));
        assert_eq!(cursor.to_vec(), vec![0, 10, 20, 30]);
        assert!(Cursor::<u8>::empty().to_vec().is_empty());
    }

    #[test]
    fn test_output_from_option() {
        assert!(matches!(Output::from(Some(1)), Output::One(1)));
        assert!(matches!(Output::<u8>::from(None), Output::Empty));
    }
}
