//! Shared test harness for storage backend testing
//!
//! Provides document builders, a seeded product sample and two macros:
//! - `document_store_tests!` checks a `DocumentStore` against the store contract
//! - `rest_catalog_tests!` runs the catalog REST API on top of a `DocumentDatabase`
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod document_store_tests;
#[macro_use]
pub mod rest_tests;

use catalog::core::{Document, DocumentStore};
use serde_json::{Value, json};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Turn a `json!` object literal into a document
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// A product document as stored (already validated)
pub fn product_doc(title: &str, price: f64, quantity: i64) -> Document {
    doc(json!({
        "title": title,
        "slug": title.to_lowercase().replace(' ', "-"),
        "description": format!("{} description", title),
        "price": price,
        "quantity": quantity,
        "colors": "black",
        "images": ["front.png", "back.png"],
        "active": true,
    }))
}

/// A product request body that passes the product rules
pub fn product_body(title: &str, price: f64, category: &Uuid) -> Value {
    json!({
        "title": title,
        "description": format!("All about {}", title),
        "quantity": 10,
        "price": price,
        "imageCover": "cover.png",
        "category": category.to_string(),
    })
}

/// Six products with distinct prices; two share the price 75 for tie-breaking
pub fn sample_products() -> Vec<Document> {
    vec![
        product_doc("Alpha Phone", 20.0, 5),
        product_doc("Bravo Laptop", 150.0, 2),
        product_doc("Charlie Cable", 75.0, 40),
        product_doc("Delta Charger", 75.0, 12),
        product_doc("Echo Mouse", 50.0, 0),
        product_doc("Foxtrot Monitor", 100.0, 3),
    ]
}

/// Insert every document and return the stored versions
pub async fn seed<S: DocumentStore>(store: &S, documents: Vec<Document>) -> Vec<Document> {
    let mut stored = Vec::with_capacity(documents.len());
    for document in documents {
        stored.push(store.insert(document).await.expect("insert failed"));
    }
    stored
}

/// String field of a document, panicking with context when absent
pub fn text<'a>(document: &'a Document, field: &str) -> &'a str {
    document
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("field '{}' missing in {:?}", field, document))
}

/// Values of one string field, in order
pub fn column(documents: &[Document], field: &str) -> Vec<String> {
    documents
        .iter()
        .map(|d| text(d, field).to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Assertions helpers
// ---------------------------------------------------------------------------

/// Assert that a list contains exactly `n` documents.
pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}

/// Assert that the internal version field never leaks
pub fn assert_no_internal_fields(document: &Document) {
    assert!(
        !document.contains_key("__v"),
        "internal field leaked: {:?}",
        document
    );
}
