//! Validation-error flattening and form-type naming.

use baseapi_core::{Document, FormErrors};
use indexmap::IndexMap;
use serde::Serialize;

/// A flattened error tree, keyed by field name or error index.
pub type ErrorMap = IndexMap<String, ErrorEntry>;

/// One entry of an [`ErrorMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorEntry {
    /// An error message.
    Message(String),
    /// The errors of a child field.
    Nested(ErrorMap),
}

/// Flatten a form's error tree into a serializable map.
///
/// A field's own errors come first, keyed `"0"`, `"1"`, ...; every invalid
/// child follows under its name. Valid children are omitted.
///
/// ```text
/// { "0": "Too many fields.", "name": { "0": "This value should not be blank." } }
/// ```
pub fn flatten_errors(errors: &FormErrors) -> ErrorMap {
    let mut map = ErrorMap::new();
    for (index, message) in errors.errors().iter().enumerate() {
        map.insert(index.to_string(), ErrorEntry::Message(message.clone()));
    }
    for child in errors.children().iter().filter(|child| !child.is_valid()) {
        map.insert(child.name().to_owned(), ErrorEntry::Nested(flatten_errors(child)));
    }
    map
}

/// The form type used when an operation names none: `ProductType` for `Product`.
pub fn guess_form_type<D: Document>() -> String {
    format!("{}Type", D::KIND)
}
