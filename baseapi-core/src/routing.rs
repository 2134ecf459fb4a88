//! URL generation for `Location` headers.

use crate::error::RoutingError;

/// Builds absolute URLs from route names.
pub trait UrlGenerator: Send + Sync + 'static {
    /// The absolute URL of `route` for the document identified by `id`.
    fn generate(&self, route: &str, id: &str) -> Result<String, RoutingError>;
}
