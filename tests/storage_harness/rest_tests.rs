//! REST integration test macro for storage backends.
//!
//! The `rest_catalog_tests!` macro runs the catalog REST API on top of a
//! `DocumentDatabase` and checks full round-trips:
//! JSON → HTTP request → validation → handlers → store → HTTP response → JSON.
//!
//! # Generated Tests
//!
//! ## Pagination
//! - page windows, limit clamping, empty collections, pages past the end, page union
//!
//! ## Query features
//! - range filters, multi-key sort, product and name search, field selection
//!
//! ## CRUD
//! - create/get round-trip, idempotent update, delete twice, not found
//!
//! ## Nested routes
//! - sub-categories listed and created under a category

/// Generate a REST integration test suite for a storage backend.
///
/// `$db_factory` must produce a fresh `impl DocumentDatabase`.
#[macro_export]
macro_rules! rest_catalog_tests {
    ($db_factory:expr) => {
        mod rest_catalog_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use catalog::server::ServerBuilder;
            use serde_json::{Value, json};
            use uuid::Uuid;

            const PRODUCTS: &str = "/api/v1/products";
            const CATEGORIES: &str = "/api/v1/categories";

            async fn make_server() -> TestServer {
                let database = $db_factory;
                let router = ServerBuilder::new(database)
                    .with_catalog_resources()
                    .build()
                    .unwrap();
                TestServer::try_new(router).unwrap()
            }

            /// Create `count` products priced 10, 20, 30, ...
            async fn seed_products(server: &TestServer, count: usize) -> Vec<String> {
                let category = Uuid::new_v4();
                let mut ids = Vec::new();
                for i in 0..count {
                    let response = server
                        .post(PRODUCTS)
                        .json(&product_body(
                            &format!("Product {:02}", i),
                            10.0 * (i + 1) as f64,
                            &category,
                        ))
                        .await;
                    response.assert_status(StatusCode::CREATED);
                    let body: Value = response.json();
                    ids.push(body["data"]["id"].as_str().unwrap().to_string());
                }
                ids
            }

            fn titles(body: &Value) -> Vec<String> {
                body["data"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|d| d["title"].as_str().unwrap().to_string())
                    .collect()
            }

            // ==============================================================
            // Pagination
            // ==============================================================

            #[tokio::test]
            async fn test_rest_second_page_of_twelve() {
                let server = make_server().await;
                seed_products(&server, 12).await;

                let resp = server.get(&format!("{}?page=2&limit=5", PRODUCTS)).await;
                resp.assert_status(StatusCode::OK);

                let body: Value = resp.json();
                assert_eq!(body["status"], "success");
                assert_eq!(body["results"], 5);
                assert_eq!(
                    body["paginationResult"],
                    json!({"currentPage": 2, "limit": 5, "numberOfPages": 3, "next": 3, "prev": 1})
                );
            }

            #[tokio::test]
            async fn test_rest_last_page_has_no_next() {
                let server = make_server().await;
                seed_products(&server, 12).await;

                let body: Value = server
                    .get(&format!("{}?page=3&limit=5", PRODUCTS))
                    .await
                    .json();
                assert_eq!(body["results"], 2);
                assert_eq!(body["paginationResult"]["prev"], 2);
                assert!(body["paginationResult"].get("next").is_none());
            }

            #[tokio::test]
            async fn test_rest_limit_is_clamped() {
                let server = make_server().await;
                seed_products(&server, 3).await;

                let body: Value = server.get(&format!("{}?limit=500", PRODUCTS)).await.json();
                assert_eq!(body["paginationResult"]["limit"], 100);
                assert_eq!(body["results"], 3);
            }

            #[tokio::test]
            async fn test_rest_malformed_pagination_uses_defaults() {
                let server = make_server().await;
                seed_products(&server, 12).await;

                let body: Value = server
                    .get(&format!("{}?page=abc&limit=-4", PRODUCTS))
                    .await
                    .json();
                assert_eq!(body["paginationResult"]["currentPage"], 1);
                assert_eq!(body["paginationResult"]["limit"], 10);
                assert_eq!(body["results"], 10);
            }

            #[tokio::test]
            async fn test_rest_empty_collection() {
                let server = make_server().await;

                let body: Value = server.get(PRODUCTS).await.json();
                assert_eq!(body["results"], 0);
                assert_eq!(body["data"], json!([]));
                assert_eq!(body["paginationResult"]["numberOfPages"], 0);
                assert!(body["paginationResult"].get("next").is_none());
                assert!(body["paginationResult"].get("prev").is_none());
            }

            #[tokio::test]
            async fn test_rest_page_far_past_the_end_is_empty() {
                let server = make_server().await;
                seed_products(&server, 12).await;

                let resp = server
                    .get(&format!("{}?page=100000000000000000&limit=100", PRODUCTS))
                    .await;
                resp.assert_status(StatusCode::OK);

                let body: Value = resp.json();
                assert_eq!(body["results"], 0);
                assert_eq!(body["data"], json!([]));
                assert_eq!(body["paginationResult"]["currentPage"], 100000000000000000u64);
                assert_eq!(body["paginationResult"]["numberOfPages"], 1);
                assert!(body["paginationResult"].get("next").is_none());
            }

            #[tokio::test]
            async fn test_rest_pages_reassemble_result_set() {
                let server = make_server().await;
                let mut ids = seed_products(&server, 7).await;

                let mut seen = Vec::new();
                for page in 1..=3 {
                    let body: Value = server
                        .get(&format!("{}?page={}&limit=3&sort=title", PRODUCTS, page))
                        .await
                        .json();
                    for item in body["data"].as_array().unwrap() {
                        seen.push(item["id"].as_str().unwrap().to_string());
                    }
                }

                assert_eq!(seen.len(), 7);
                assert_eq!(seen, ids.clone());
                ids.sort();
                seen.sort();
                seen.dedup();
                assert_eq!(seen, ids);
            }

            // ==============================================================
            // Query features
            // ==============================================================

            #[tokio::test]
            async fn test_rest_price_range_filter() {
                let server = make_server().await;
                seed_products(&server, 12).await;

                let body: Value = server
                    .get(&format!(
                        "{}?price%5Bgte%5D=50&price%5Blte%5D=100&limit=50",
                        PRODUCTS
                    ))
                    .await
                    .json();

                assert_eq!(body["results"], 6);
                for item in body["data"].as_array().unwrap() {
                    let price = item["price"].as_f64().unwrap();
                    assert!((50.0..=100.0).contains(&price), "price {} out of range", price);
                }
                assert_eq!(body["paginationResult"]["numberOfPages"], 1);
            }

            #[tokio::test]
            async fn test_rest_sort_descending_then_title() {
                let server = make_server().await;
                let category = Uuid::new_v4();
                for (title, price) in [("Beta", 20.0), ("Alpha", 20.0), ("Gamma", 30.0), ("Delta", 5.0)] {
                    server
                        .post(PRODUCTS)
                        .json(&product_body(title, price, &category))
                        .await
                        .assert_status(StatusCode::CREATED);
                }

                let body: Value = server.get(&format!("{}?sort=-price,title", PRODUCTS)).await.json();
                assert_eq!(titles(&body), vec!["Gamma", "Alpha", "Beta", "Delta"]);
            }

            #[tokio::test]
            async fn test_rest_keyword_search() {
                let server = make_server().await;
                let category = Uuid::new_v4();
                for title in ["Wireless Mouse", "Gaming Keyboard", "Mouse Pad"] {
                    server
                        .post(PRODUCTS)
                        .json(&product_body(title, 15.0, &category))
                        .await
                        .assert_status(StatusCode::CREATED);
                }

                let body: Value = server
                    .get(&format!("{}?keyword=mouse&sort=title", PRODUCTS))
                    .await
                    .json();
                assert_eq!(titles(&body), vec!["Mouse Pad", "Wireless Mouse"]);

                let body: Value = server.get(&format!("{}?search=KEYBOARD", PRODUCTS)).await.json();
                assert_eq!(titles(&body), vec!["Gaming Keyboard"]);
            }

            #[tokio::test]
            async fn test_rest_name_search_on_categories_brands_and_sub_categories() {
                let server = make_server().await;
                for name in ["Smart Phones", "Laptops", "Phone Cases"] {
                    server
                        .post(CATEGORIES)
                        .json(&json!({"name": name}))
                        .await
                        .assert_status(StatusCode::CREATED);
                }

                let body: Value = server
                    .get(&format!("{}?search=PHO&sort=name", CATEGORIES))
                    .await
                    .json();
                assert_eq!(body["results"], 2);
                assert_eq!(body["data"][0]["name"], "Phone Cases");
                assert_eq!(body["data"][1]["name"], "Smart Phones");

                // `keyword` is reserved but only products search through it
                let body: Value = server
                    .get(&format!("{}?keyword=laptop", CATEGORIES))
                    .await
                    .json();
                assert_eq!(body["results"], 3);

                for name in ["Acme", "Apex Audio"] {
                    server
                        .post("/api/v1/brands")
                        .json(&json!({"name": name}))
                        .await
                        .assert_status(StatusCode::CREATED);
                }
                let body: Value = server.get("/api/v1/brands?search=audio").await.json();
                assert_eq!(body["results"], 1);
                assert_eq!(body["data"][0]["name"], "Apex Audio");

                let parent = Uuid::new_v4().to_string();
                for name in ["Gaming Laptops", "Office Chairs"] {
                    server
                        .post("/api/v1/sub-categories")
                        .json(&json!({"name": name, "category": parent}))
                        .await
                        .assert_status(StatusCode::CREATED);
                }
                let body: Value = server
                    .get("/api/v1/sub-categories?search=chair")
                    .await
                    .json();
                assert_eq!(body["results"], 1);
                assert_eq!(body["data"][0]["name"], "Office Chairs");
                assert_eq!(body["paginationResult"]["numberOfPages"], 1);
            }

            #[tokio::test]
            async fn test_rest_field_selection() {
                let server = make_server().await;
                seed_products(&server, 2).await;

                let body: Value = server.get(&format!("{}?fields=title,price", PRODUCTS)).await.json();
                for item in body["data"].as_array().unwrap() {
                    let mut keys: Vec<&String> = item.as_object().unwrap().keys().collect();
                    keys.sort();
                    assert_eq!(keys, vec!["id", "price", "title"]);
                }

                let body: Value = server
                    .get(&format!("{}?fields=-description,-imageCover", PRODUCTS))
                    .await
                    .json();
                for item in body["data"].as_array().unwrap() {
                    assert!(item.get("description").is_none());
                    assert!(item.get("imageCover").is_none());
                    assert!(item.get("title").is_some());
                    assert!(item.get("__v").is_none());
                }
            }

            #[tokio::test]
            async fn test_rest_unknown_filter_field_yields_empty() {
                let server = make_server().await;
                seed_products(&server, 3).await;

                let body: Value = server.get(&format!("{}?warranty=2y", PRODUCTS)).await.json();
                assert_eq!(body["results"], 0);
                assert_eq!(body["paginationResult"]["numberOfPages"], 0);
            }

            // ==============================================================
            // CRUD
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_then_get() {
                let server = make_server().await;
                let category = Uuid::new_v4();
                let submitted = product_body("Studio Headphones", 199.99, &category);

                let created = server.post(PRODUCTS).json(&submitted).await;
                created.assert_status(StatusCode::CREATED);
                let created: Value = created.json();
                assert_eq!(created["status"], "success");
                assert_eq!(created["data"]["slug"], "studio-headphones");
                let id = created["data"]["id"].as_str().unwrap();

                let fetched = server.get(&format!("{}/{}", PRODUCTS, id)).await;
                fetched.assert_status(StatusCode::OK);
                let fetched: Value = fetched.json();

                for (field, value) in submitted.as_object().unwrap() {
                    assert_eq!(&fetched["data"][field], value, "field {} differs", field);
                }
                assert!(fetched["data"].get("__v").is_none());
            }

            #[tokio::test]
            async fn test_rest_update_is_idempotent() {
                let server = make_server().await;
                let ids = seed_products(&server, 1).await;
                let path = format!("{}/{}", PRODUCTS, ids[0]);

                let first = server.put(&path).json(&json!({"price": 42, "sold": 3})).await;
                first.assert_status(StatusCode::OK);
                let second = server.put(&path).json(&json!({"price": 42, "sold": 3})).await;
                second.assert_status(StatusCode::OK);

                let mut first: Value = first.json();
                let mut second: Value = second.json();
                first["data"].as_object_mut().unwrap().remove("updatedAt");
                second["data"].as_object_mut().unwrap().remove("updatedAt");
                assert_eq!(first, second);
                assert_eq!(second["data"]["price"], 42);
            }

            #[tokio::test]
            async fn test_rest_get_missing_document() {
                let server = make_server().await;
                let id = Uuid::new_v4();

                let resp = server.get(&format!("{}/{}", PRODUCTS, id)).await;
                resp.assert_status(StatusCode::NOT_FOUND);

                let body: Value = resp.json();
                assert_eq!(body["status"], "fail");
                assert_eq!(body["code"], "DOCUMENT_NOT_FOUND");
                assert_eq!(body["message"], format!("No document found with id: {}", id));
            }

            #[tokio::test]
            async fn test_rest_delete_twice() {
                let server = make_server().await;
                let ids = seed_products(&server, 1).await;
                let path = format!("{}/{}", PRODUCTS, ids[0]);

                let resp = server.delete(&path).await;
                resp.assert_status(StatusCode::NO_CONTENT);
                assert!(resp.text().is_empty());

                server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
                server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_update_missing_document() {
                let server = make_server().await;
                server
                    .put(&format!("{}/{}", PRODUCTS, Uuid::new_v4()))
                    .json(&json!({"price": 10}))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Nested sub-category routes
            // ==============================================================

            #[tokio::test]
            async fn test_rest_nested_sub_categories() {
                let server = make_server().await;

                let category: Value = server
                    .post(CATEGORIES)
                    .json(&json!({"name": "Electronics"}))
                    .await
                    .json();
                let category_id = category["data"]["id"].as_str().unwrap().to_string();
                let other = Uuid::new_v4().to_string();
                let nested = format!("{}/{}/sub-categories", CATEGORIES, category_id);

                server
                    .post(&nested)
                    .json(&json!({"name": "Laptops"}))
                    .await
                    .assert_status(StatusCode::CREATED);
                server
                    .post("/api/v1/sub-categories")
                    .json(&json!({"name": "Sofas", "category": other}))
                    .await
                    .assert_status(StatusCode::CREATED);

                let scoped: Value = server.get(&nested).await.json();
                assert_eq!(scoped["results"], 1);
                assert_eq!(scoped["data"][0]["name"], "Laptops");
                assert_eq!(scoped["data"][0]["category"], category_id);

                let all: Value = server.get("/api/v1/sub-categories").await.json();
                assert_eq!(all["results"], 2);
            }
        }
    };
}
