//! JSON form binding.
//!
//! [`JsonForms`] binds the request body onto a document through serde and
//! runs the validator registered for the form type.

use baseapi_core::{Document, Form, FormError, FormErrors, FormFactory, Request, Value};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;

/// Error attached to the root field when the submitted data does not fit the document.
pub const INVALID_VALUE: &str = "This value is not valid.";

type Validator<D> = Box<dyn Fn(&D, &mut FormErrors) + Send + Sync>;

/// A [`FormFactory`] binding JSON request bodies onto serde documents.
///
/// A form type `ProductType` is named `product`. Its data is read from the
/// `product` field of the body, or from the whole body when that field is
/// absent. Submitted fields overwrite the document's serialized fields.
/// A named field holding anything other than an object or `null` leaves
/// the document untouched and fails the form with [`INVALID_VALUE`].
///
/// Binding always merges, whatever the request method: POST, PUT and
/// PATCH all keep the fields they do not submit. Clearing missing fields
/// on PUT would also clear the identifier of the document being edited.
///
/// # Example
/// ```ignore
/// let forms = JsonForms::new().register("ProductType", |product: &Product, errors| {
///     if product.name.is_empty() {
///         errors.push_child(FormErrors::new("name").with_error("This value should not be blank."));
///     }
/// });
/// ```
pub struct JsonForms<D> {
    validators: HashMap<String, Validator<D>>,
}

impl<D> JsonForms<D>
where
    D: Document + Serialize + DeserializeOwned,
{
    /// An empty factory.
    pub fn new() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Register the form `form_type` with its validator.
    ///
    /// The validator receives the bound document and the root of the error
    /// tree, already named after the form.
    pub fn register<F>(mut self, form_type: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&D, &mut FormErrors) + Send + Sync + 'static,
    {
        self.validators.insert(form_type.into(), Box::new(validator));
        self
    }

    /// Register `form_type` without any validation.
    pub fn register_unchecked(self, form_type: impl Into<String>) -> Self {
        self.register(form_type, |_, _| {})
    }
}

impl<D> Default for JsonForms<D>
where
    D: Document + Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> FormFactory<D> for JsonForms<D>
where
    D: Document + Serialize + DeserializeOwned,
{
    fn create_form(
        &self,
        form_type: &str,
        document: D,
        request: &Request,
    ) -> Result<Form<D>, FormError> {
        let validator = self
            .validators
            .get(form_type)
            .ok_or_else(|| FormError::UnknownType(form_type.to_owned()))?;
        let name = form_name(form_type);
        let submitted = submitted_data(request.body(), &name)?;

        let mut errors = FormErrors::new(name);
        let fields = match submitted {
            Value::Object(fields) => Some(fields),
            Value::Null => None,
            other => {
                tracing::debug!(
                    form_type,
                    method = %request.method(),
                    submitted = %other,
                    "submitted data is not an object"
                );
                errors.push_error(INVALID_VALUE);
                return Ok(Form::new(document, errors));
            }
        };

        let mut data =
            serde_json::to_value(&document).map_err(|err| FormError::Malformed(err.to_string()))?;
        if let (Value::Object(target), Some(fields)) = (&mut data, fields) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }

        match serde_json::from_value::<D>(data) {
            Ok(bound) => {
                validator(&bound, &mut errors);
                Ok(Form::new(bound, errors))
            }
            Err(err) => {
                tracing::debug!(
                    form_type,
                    method = %request.method(),
                    error = %err,
                    "submitted data does not bind"
                );
                errors.push_error(INVALID_VALUE);
                Ok(Form::new(document, errors))
            }
        }
    }
}

fn submitted_data<'a>(body: &'a Value, name: &str) -> Result<&'a Value, FormError> {
    match body {
        Value::Object(fields) => Ok(fields.get(name).unwrap_or(body)),
        Value::Null => Ok(body),
        other => Err(FormError::Malformed(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// `ProductImageType` becomes `product_image`.
fn form_name(form_type: &str) -> String {
    let stem = form_type.strip_suffix("Type").unwrap_or(form_type);
    let mut name = String::with_capacity(stem.len() + 4);
    for (i, ch) in stem.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.extend(ch.to_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use baseapi_core::Request;
    use http::Method;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        id: Option<String>,
        name: String,
        price: u32,
    }

    impl Document for Product {
        const KIND: &'static str = "Product";

        fn id(&self) -> Option<String> {
            self.id.clone()
        }
    }

    fn forms() -> JsonForms<Product> {
        JsonForms::new().register("ProductType", |product: &Product, errors| {
            if product.name.is_empty() {
                errors.push_child(
                    FormErrors::new("name").with_error("This value should not be blank."),
                );
            }
        })
    }

    fn blank() -> Product {
        Product {
            id: None,
            name: String::new(),
            price: 0,
        }
    }

    #[test]
    fn test_form_name() {
        assert_eq!(form_name("ProductType"), "product");
        assert_eq!(form_name("ProductImageType"), "product_image");
        assert_eq!(form_name("tag"), "tag");
    }

    #[test]
    fn test_binds_named_field() {
        let request = Request::new(Method::POST)
            .with_body(json!({ "product": { "name": "Lamp", "price": 30 } }));
        let form = forms().create_form("ProductType", blank(), &request).unwrap();

        assert!(form.is_valid());
        assert_eq!(form.errors().name(), "product");
        assert_eq!(
            form.into_document(),
            Product {
                id: None,
                name: "Lamp".into(),
                price: 30
            }
        );
    }

    #[test]
    fn test_binds_whole_body_and_keeps_unsubmitted_fields() {
        let existing = Product {
            id: Some("p1".into()),
            name: "Lamp".into(),
            price: 30,
        };
        let request = Request::new(Method::PUT).with_body(json!({ "price": 35 }));
        let form = forms().create_form("ProductType", existing, &request).unwrap();

        assert!(form.is_valid());
        assert_eq!(form.document().id.as_deref(), Some("p1"));
        assert_eq!(form.document().name, "Lamp");
        assert_eq!(form.document().price, 35);
    }

    #[test]
    fn test_validator_errors() {
        let request = Request::new(Method::POST).with_body(json!({ "price": 3 }));
        let form = forms().create_form("ProductType", blank(), &request).unwrap();

        assert!(!form.is_valid());
        assert_eq!(form.errors().children()[0].name(), "name");
    }

    #[test]
    fn test_unbindable_data_is_a_root_error() {
        let request = Request::new(Method::POST).with_body(json!({ "price": "cheap" }));
        let form = forms().create_form("ProductType", blank(), &request).unwrap();

        assert!(!form.is_valid());
        assert_eq!(form.errors().errors(), [INVALID_VALUE.to_string()]);
        assert_eq!(form.document(), &blank());
    }

    #[test]
    fn test_scalar_named_field_is_a_root_error() {
        for submitted in [json!("garbage"), json!(5), json!([{ "name": "Lamp" }])] {
            let request = Request::new(Method::POST).with_body(json!({ "product": submitted }));
            let form = forms().create_form("ProductType", blank(), &request).unwrap();

            assert!(!form.is_valid());
            assert_eq!(form.errors().errors(), [INVALID_VALUE.to_string()]);
            assert_eq!(form.document(), &blank());
        }
    }

    #[test]
    fn test_null_named_field_binds_nothing() {
        let request = Request::new(Method::POST).with_body(json!({ "product": null }));
        let form = forms().create_form("ProductType", blank(), &request).unwrap();

        assert_eq!(form.document(), &blank());
        assert_eq!(form.errors().children()[0].name(), "name");
    }

    #[test]
    fn test_binding_merges_for_every_method() {
        let existing = Product {
            id: Some("p1".into()),
            name: "Lamp".into(),
            price: 30,
        };
        let bound: Vec<Product> = [Method::POST, Method::PUT, Method::PATCH]
            .into_iter()
            .map(|method| {
                let request = Request::new(method).with_body(json!({ "price": 35 }));
                forms()
                    .create_form("ProductType", existing.clone(), &request)
                    .unwrap()
                    .into_document()
            })
            .collect();

        for product in bound {
            assert_eq!(
                product,
                Product {
                    id: Some("p1".into()),
                    name: "Lamp".into(),
                    price: 35
                }
            );
        }
    }

    #[test]
    fn test_unknown_type_and_malformed_body() {
        let request = Request::new(Method::POST);
        assert_eq!(
            forms().create_form("TagType", blank(), &request).unwrap_err(),
            FormError::UnknownType("TagType".into())
        );

        let request = Request::new(Method::POST).with_body(json!([1, 2]));
        assert!(matches!(
            forms().create_form("ProductType", blank(), &request),
            Err(FormError::Malformed(_))
        ));
    }
}
