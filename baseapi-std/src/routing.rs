//! Route table for `Location` URLs.

use baseapi_core::{RoutingError, UrlGenerator};
use std::collections::HashMap;

/// A [`UrlGenerator`] mapping route names to path patterns.
///
/// Patterns contain an `{id}` placeholder and are joined to the base URL.
///
/// # Example
/// ```ignore
/// let routes = RouteTable::new("https://api.example.com")
///     .route("get_product", "/api/products/{id}");
/// assert_eq!(
///     routes.generate("get_product", "42")?,
///     "https://api.example.com/api/products/42"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    base: String,
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// An empty table generating URLs under `base`.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            base,
            routes: HashMap::new(),
        }
    }

    /// Register `pattern` under `name`.
    pub fn route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.routes.insert(name.into(), pattern.into());
        self
    }
}

impl UrlGenerator for RouteTable {
    fn generate(&self, route: &str, id: &str) -> Result<String, RoutingError> {
        let pattern = self
            .routes
            .get(route)
            .ok_or_else(|| RoutingError::UnknownRoute(route.to_owned()))?;
        let path = pattern.replace("{id}", id);
        if path.starts_with('/') {
            Ok(format!("{}{}", self.base, path))
        } else {
            Ok(format!("{}/{}", self.base, path))
        }
    }
}
