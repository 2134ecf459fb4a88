//! Document trait for persisted resources.

/// A value read, created, updated, or deleted through a controller.
///
/// The controller treats documents as opaque apart from their kind (used to
/// guess the form type) and their identifier (used for `Location` headers).
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct Product { id: Option<String>, name: String }
///
/// impl Document for Product {
///     const KIND: &'static str = "Product";
///
///     fn id(&self) -> Option<String> {
///         self.id.clone()
///     }
/// }
/// ```
pub trait Document: Clone + Send + Sync + 'static {
    /// Short type name, e.g. `"Product"`.
    const KIND: &'static str;

    /// The identifier, once the document has been persisted.
    fn id(&self) -> Option<String>;
}
