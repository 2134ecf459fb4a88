//! Form binding and validation interface.
//!
//! A form binds request data onto a document and validates the result. The
//! controller only needs three things from it: whether it is valid, the tree
//! of field errors, and the materialized document.

use crate::{document::Document, error::FormError, request::Request};

/// A tree of validation errors, one node per form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    name: String,
    errors: Vec<String>,
    children: Vec<FormErrors>,
}

impl FormErrors {
    /// An error node for the field `name`, without errors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            errors: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an error message on this field.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.push_error(message);
        self
    }

    /// Add a child field.
    pub fn with_child(mut self, child: FormErrors) -> Self {
        self.push_child(child);
        self
    }

    /// Add an error message on this field (mutable version).
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Add a child field (mutable version).
    pub fn push_child(&mut self, child: FormErrors) {
        self.children.push(child);
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Errors attached to this field itself.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Child fields, in declaration order.
    pub fn children(&self) -> &[FormErrors] {
        &self.children
    }

    /// A field is valid when neither it nor any descendant has errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.children.iter().all(FormErrors::is_valid)
    }
}

/// A submitted form.
#[derive(Debug, Clone)]
pub struct Form<D> {
    document: D,
    errors: FormErrors,
}

impl<D> Form<D> {
    /// A form holding the bound `document` and its validation `errors`.
    pub fn new(document: D, errors: FormErrors) -> Self {
        Self { document, errors }
    }

    /// Whether the submitted data passed validation.
    pub fn is_valid(&self) -> bool {
        self.errors.is_valid()
    }

    /// The root of the error tree.
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// The bound document.
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Take the bound document.
    pub fn into_document(self) -> D {
        self.document
    }
}

/// Creates forms for a document type.
pub trait FormFactory<D: Document>: Send + Sync + 'static {
    /// Bind `request` onto `document` using the form registered as `form_type`.
    fn create_form(&self, form_type: &str, document: D, request: &Request)
    -> Result<Form<D>, FormError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_is_recursive() {
        let valid = FormErrors::new("product").with_child(FormErrors::new("name"));
        assert!(valid.is_valid());

        let nested = FormErrors::new("product").with_child(
            FormErrors::new("images").with_child(FormErrors::new("0").with_error("too long")),
        );
        assert!(!nested.is_valid());
        assert!(nested.errors().is_empty());
    }

    #[test]
    fn test_form_exposes_document() {
        let form = Form::new(7, FormErrors::new("n").with_error("odd"));
        assert!(!form.is_valid());
        assert_eq!(form.errors().errors(), ["odd".to_string()]);
        assert_eq!(*form.document(), 7);
        assert_eq!(form.into_document(), 7);
    }
}
