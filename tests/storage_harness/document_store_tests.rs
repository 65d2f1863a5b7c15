//! Macro-generated contract suite for `DocumentStore` implementations.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use catalog::storage::InMemoryDocumentStore;
//!
//! document_store_tests!(InMemoryDocumentStore::new("products"));
//! ```
//!
//! # Generated Tests
//!
//! ## Mutations
//! - `test_insert_stamps_generic_fields`
//! - `test_find_by_id_roundtrip` / `test_find_by_id_missing`
//! - `test_update_merges_and_keeps_identity` / `test_update_missing`
//! - `test_delete_returns_document_once`
//!
//! ## Queries
//! - equality with string casting, ranges, array membership, unknown fields
//! - case-insensitive literal search
//! - multi-key sort, skip/limit, projections
//!
//! ## Edge Cases
//! - `test_concurrent_inserts`: parallel inserts from spawned tasks

/// Generate a `DocumentStore` conformance test suite.
///
/// `$factory` must evaluate to a fresh, empty store implementing
/// `DocumentStore + Clone + 'static`. It is re-evaluated for each test.
#[macro_export]
macro_rules! document_store_tests {
    ($factory:expr) => {
        mod document_store_contract_tests {
            use super::*;
            use catalog::core::query::{Comparison, FieldCondition, TextSearch};
            use catalog::core::{Criteria, DocumentQuery, DocumentStore, Projection, SortKey};
            use serde_json::json;
            use uuid::Uuid;

            fn query(criteria: Criteria) -> DocumentQuery {
                DocumentQuery::new(criteria)
            }

            fn by_title() -> Vec<SortKey> {
                vec![SortKey::ascending("title")]
            }

            // ==================================================================
            // Mutations
            // ==================================================================

            #[tokio::test]
            async fn test_insert_stamps_generic_fields() {
                let store = $factory;
                let mut body = product_doc("Alpha Phone", 20.0, 5);
                body.insert("id".into(), json!("client-chosen"));
                body.insert("__v".into(), json!(7));

                let created = store.insert(body).await.unwrap();

                let id = text(&created, "id");
                assert!(Uuid::parse_str(id).is_ok(), "id is not a UUID: {}", id);
                assert_ne!(id, "client-chosen");
                assert_eq!(text(&created, "createdAt"), text(&created, "updatedAt"));
                assert_eq!(created["title"], "Alpha Phone");
                assert_no_internal_fields(&created);
            }

            #[tokio::test]
            async fn test_find_by_id_roundtrip() {
                let store = $factory;
                let created = store.insert(product_doc("Bravo Laptop", 150.0, 2)).await.unwrap();
                let id = Uuid::parse_str(text(&created, "id")).unwrap();

                let found = store.find_by_id(&id).await.unwrap().expect("document missing");
                assert_eq!(found, created);
                assert_no_internal_fields(&found);
            }

            #[tokio::test]
            async fn test_find_by_id_missing() {
                let store = $factory;
                assert!(store.find_by_id(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_update_merges_and_keeps_identity() {
                let store = $factory;
                let created = store.insert(product_doc("Charlie Cable", 75.0, 40)).await.unwrap();
                let id = Uuid::parse_str(text(&created, "id")).unwrap();

                let updated = store
                    .find_and_update(
                        &id,
                        doc(json!({
                            "price": 80.0,
                            "id": Uuid::new_v4().to_string(),
                            "createdAt": "1970-01-01T00:00:00.000000Z",
                        })),
                    )
                    .await
                    .unwrap()
                    .expect("document missing");

                assert_eq!(updated["price"], json!(80.0));
                assert_eq!(updated["title"], "Charlie Cable");
                assert_eq!(text(&updated, "id"), id.to_string());
                assert_eq!(text(&updated, "createdAt"), text(&created, "createdAt"));
                assert!(text(&updated, "updatedAt") >= text(&created, "updatedAt"));
                assert_no_internal_fields(&updated);

                let reread = store.find_by_id(&id).await.unwrap().unwrap();
                assert_eq!(reread, updated);
            }

            #[tokio::test]
            async fn test_update_missing() {
                let store = $factory;
                let result = store
                    .find_and_update(&Uuid::new_v4(), doc(json!({"price": 1})))
                    .await
                    .unwrap();
                assert!(result.is_none());
            }

            #[tokio::test]
            async fn test_delete_returns_document_once() {
                let store = $factory;
                let created = store.insert(product_doc("Delta Charger", 75.0, 12)).await.unwrap();
                let id = Uuid::parse_str(text(&created, "id")).unwrap();

                let deleted = store.find_and_delete(&id).await.unwrap().expect("document missing");
                assert_eq!(text(&deleted, "title"), "Delta Charger");
                assert_no_internal_fields(&deleted);

                assert!(store.find_and_delete(&id).await.unwrap().is_none());
                assert!(store.find_by_id(&id).await.unwrap().is_none());
                assert_eq!(store.count(&Criteria::all()).await.unwrap(), 0);
            }

            // ==================================================================
            // Queries: criteria
            // ==================================================================

            #[tokio::test]
            async fn test_find_empty_store() {
                let store = $factory;
                assert_count(&store.find(&query(Criteria::all())).await.unwrap(), 0);
                assert_eq!(store.count(&Criteria::all()).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_equality_casts_query_strings() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let by_price = Criteria::all().with_condition(FieldCondition::equals("price", "75"));
                assert_eq!(store.count(&by_price).await.unwrap(), 2);

                let by_flag = Criteria::all().with_condition(FieldCondition::equals("active", "true"));
                assert_eq!(store.count(&by_flag).await.unwrap(), 6);

                let by_title = Criteria::all()
                    .with_condition(FieldCondition::equals("title", "Echo Mouse"));
                let found = store.find(&query(by_title)).await.unwrap();
                assert_eq!(column(&found, "title"), vec!["Echo Mouse"]);
            }

            #[tokio::test]
            async fn test_range_conditions() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let criteria = Criteria::all()
                    .with_condition(FieldCondition::new("price", Comparison::Gte, "50"))
                    .with_condition(FieldCondition::new("price", Comparison::Lte, "100"));
                let mut q = query(criteria.clone());
                q.sort = by_title();

                let found = store.find(&q).await.unwrap();
                assert_eq!(
                    column(&found, "title"),
                    vec!["Charlie Cable", "Delta Charger", "Echo Mouse", "Foxtrot Monitor"]
                );
                assert_eq!(store.count(&criteria).await.unwrap(), 4);

                let strict = Criteria::all()
                    .with_condition(FieldCondition::new("price", Comparison::Gt, "75"))
                    .with_condition(FieldCondition::new("price", Comparison::Lt, "150"));
                assert_eq!(store.count(&strict).await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_array_fields_match_any_element() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let criteria = Criteria::all()
                    .with_condition(FieldCondition::equals("images", "back.png"));
                assert_eq!(store.count(&criteria).await.unwrap(), 6);
            }

            #[tokio::test]
            async fn test_unknown_field_matches_nothing() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let criteria = Criteria::all()
                    .with_condition(FieldCondition::equals("warranty", "2y"));
                assert_eq!(store.count(&criteria).await.unwrap(), 0);
                assert_count(&store.find(&query(criteria)).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_embedded_equality_never_matches_a_scalar() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let criteria = Criteria::all()
                    .with_condition(FieldCondition::equals("price", json!({"between": "20"})));
                assert_eq!(store.count(&criteria).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_search_is_case_insensitive_across_fields() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let criteria = Criteria::all().with_search(TextSearch {
                    term: "CHAR".into(),
                    fields: vec!["title".into(), "description".into()],
                });
                let mut q = query(criteria);
                q.sort = by_title();

                let found = store.find(&q).await.unwrap();
                assert_eq!(column(&found, "title"), vec!["Charlie Cable", "Delta Charger"]);
            }

            #[tokio::test]
            async fn test_search_matches_literally() {
                let store = $factory;
                seed(&store, vec![product_doc("C++ Primer", 40.0, 1), product_doc("CCC", 10.0, 1)])
                    .await;

                let criteria = Criteria::all().with_search(TextSearch {
                    term: "c++".into(),
                    fields: vec!["title".into()],
                });
                let found = store.find(&query(criteria)).await.unwrap();
                assert_eq!(column(&found, "title"), vec!["C++ Primer"]);
            }

            #[tokio::test]
            async fn test_search_combines_with_conditions() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let criteria = Criteria::all()
                    .with_condition(FieldCondition::new("price", Comparison::Lt, "80"))
                    .with_search(TextSearch {
                        term: "ch".into(),
                        fields: vec!["title".into()],
                    });
                // Charlie Cable, Delta Charger, Echo Mouse
                assert_eq!(store.count(&criteria).await.unwrap(), 3);
            }

            // ==================================================================
            // Queries: ordering, windows, projections
            // ==================================================================

            #[tokio::test]
            async fn test_multi_key_sort() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let mut q = query(Criteria::all());
                q.sort = SortKey::parse_list("-price,title");
                let found = store.find(&q).await.unwrap();

                assert_eq!(
                    column(&found, "title"),
                    vec![
                        "Bravo Laptop",
                        "Foxtrot Monitor",
                        "Charlie Cable",
                        "Delta Charger",
                        "Echo Mouse",
                        "Alpha Phone"
                    ]
                );
            }

            #[tokio::test]
            async fn test_skip_and_limit() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let mut q = query(Criteria::all());
                q.sort = by_title();
                q.skip = 2;
                q.limit = Some(3);
                let found = store.find(&q).await.unwrap();
                assert_eq!(
                    column(&found, "title"),
                    vec!["Charlie Cable", "Delta Charger", "Echo Mouse"]
                );

                q.skip = 10;
                assert_count(&store.find(&q).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_count_ignores_window() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let mut q = query(Criteria::all());
                q.limit = Some(1);
                assert_count(&store.find(&q).await.unwrap(), 1);
                assert_eq!(store.count(&q.criteria).await.unwrap(), 6);
            }

            #[tokio::test]
            async fn test_include_projection_keeps_id() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let mut q = query(Criteria::all());
                q.projection = Projection::parse("title,price");
                let found = store.find(&q).await.unwrap();

                assert_count(&found, 6);
                for document in &found {
                    let mut keys: Vec<&str> = document.keys().map(String::as_str).collect();
                    keys.sort();
                    assert_eq!(keys, vec!["id", "price", "title"]);
                }
            }

            #[tokio::test]
            async fn test_exclude_projection() {
                let store = $factory;
                seed(&store, sample_products()).await;

                let mut q = query(Criteria::all());
                q.projection = Projection::parse("-description,-images");
                let found = store.find(&q).await.unwrap();

                for document in &found {
                    assert!(!document.contains_key("description"));
                    assert!(!document.contains_key("images"));
                    assert!(document.contains_key("title"));
                    assert!(document.contains_key("id"));
                    assert_no_internal_fields(document);
                }
            }

            // ==================================================================
            // Edge Cases
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let store = $factory;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store
                            .insert(product_doc(&format!("Concurrent {}", i), i as f64, 1))
                            .await
                            .unwrap()
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }

                assert_eq!(store.count(&Criteria::all()).await.unwrap(), 10);
            }
        }
    };
}
