#![allow(dead_code)]

use baseapi::{
    DataStores, Document, FormErrors, JsonForms, ResourceController, RouteTable,
    testing::{MemoryDocument, MemoryStore},
};
use serde::{Deserialize, Serialize};

pub const DATA_STORE: &str = "doctrine_mongodb";
pub const LOCATION_ROUTE: &str = "get_product";
pub const BASE_URL: &str = "http://localhost";

// ============================================================================
// Fixture Documents
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: Option<String>,
    pub name: String,
    pub price: u32,
    pub images: Vec<Image>,
}

impl Product {
    pub fn named(name: &str, price: u32) -> Self {
        Self {
            name: name.to_string(),
            price,
            ..Self::default()
        }
    }
}

impl Document for Product {
    const KIND: &'static str = "Product";

    fn id(&self) -> Option<String> {
        self.id.clone()
    }
}

impl MemoryDocument for Product {
    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

// ============================================================================
// Collaborators
// ============================================================================

pub fn validate_product(product: &Product, errors: &mut FormErrors) {
    if product.name.trim().is_empty() {
        errors.push_child(FormErrors::new("name").with_error("This value should not be blank."));
    }
    if product.price == 0 {
        errors.push_child(FormErrors::new("price").with_error("This value should be positive."));
    }
    let mut images = FormErrors::new("images");
    for (index, image) in product.images.iter().enumerate() {
        if !image.url.starts_with("http") {
            images.push_child(
                FormErrors::new(index.to_string()).with_child(
                    FormErrors::new("url").with_error("This value is not a valid URL."),
                ),
            );
        }
    }
    errors.push_child(images);
}

pub fn seeded_store(count: usize) -> MemoryStore<Product> {
    MemoryStore::new().with_documents(
        (0..count).map(|i| Product::named(&format!("Product {i}"), 10 + i as u32)),
    )
}

pub fn controller(store: &MemoryStore<Product>) -> ResourceController<Product> {
    ResourceController::builder("ProductController")
        .default_repository(Product::KIND)
        .default_data_store(DATA_STORE)
        .data_stores(DataStores::new().register(DATA_STORE, store.clone()))
        .forms(JsonForms::new().register("ProductType", validate_product))
        .urls(RouteTable::new(BASE_URL).route(LOCATION_ROUTE, "/api/products/{id}"))
        .build()
        .unwrap()
}
