//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides [`MongoDocumentStore`] (one collection) and [`MongoDatabase`]
//! (hands out one store per resource collection).
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! catalog-rs = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! Documents are handled as `serde_json` objects and converted to BSON at
//! the driver boundary. The `id` field is mapped to MongoDB's `_id`
//! convention and stored as a UUID string.
//!
//! # Query rendering
//!
//! Criteria become one `$and` of field conditions. Filter values arrive as
//! raw query strings, so equality uses `$in` over every type the string can
//! be cast to (string, integer, float, boolean), and range comparisons use
//! the numeric value when the string is numeric. Text search becomes an
//! `$or` of case-insensitive `$regex` matches on escaped input.

use crate::core::document::{
    Document as JsonDocument, ID_FIELD, VERSION_FIELD, prepare_insert, prepare_update,
    strip_internal,
};
use crate::core::query::{
    Comparison, Criteria, DocumentQuery, FieldCondition, Projection, SortDirection, SortKey,
};
use crate::core::store::{DocumentDatabase, DocumentStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a JSON object into a BSON Document, renaming `id` → `_id`.
fn json_to_document(json: JsonDocument) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&Value::Object(json))
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove(ID_FIELD) {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a JSON object, renaming `_id` → `id`
/// and dropping the internal version field.
fn document_to_json(mut doc: Document) -> JsonDocument {
    if let Some(id) = doc.remove("_id") {
        doc.insert(ID_FIELD, id);
    }

    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => strip_internal(map),
        _ => JsonDocument::new(),
    }
}

/// Convert a UUID to its BSON string representation for queries.
fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

fn storage_field(field: &str) -> &str {
    if field == ID_FIELD { "_id" } else { field }
}

/// Every BSON value a raw query string can be cast to
fn cast_variants(raw: &str) -> Vec<Bson> {
    let mut variants: Vec<Bson> = vec![Bson::String(raw.to_string())];

    match raw {
        "true" => variants.push(Bson::Boolean(true)),
        "false" => variants.push(Bson::Boolean(false)),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                variants.push(Bson::Int64(i));
            } else if let Ok(f) = raw.parse::<f64>()
                && f.is_finite()
            {
                variants.push(Bson::Double(f));
            }
        }
    }

    variants
}

/// Operand of a range comparison: numeric when the string is numeric
fn range_operand(raw: &str) -> Bson {
    match raw.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => Bson::Double(f),
        _ => Bson::String(raw.to_string()),
    }
}

fn render_condition(condition: &FieldCondition) -> Result<Document> {
    let field = storage_field(&condition.field);

    let rendered = match (&condition.value, condition.comparison) {
        (Value::String(raw), Comparison::Eq) => {
            doc! { field: { "$in": cast_variants(raw) } }
        }
        (Value::String(raw), comparison) => {
            doc! { field: { comparison.operator(): range_operand(raw) } }
        }
        (other, comparison) => {
            let operand = mongodb::bson::to_bson(other)
                .map_err(|e| anyhow!("Failed to convert filter value to BSON: {}", e))?;
            doc! { field: { comparison.operator(): operand } }
        }
    };

    Ok(rendered)
}

/// Render criteria as a MongoDB filter document
fn render_filter(criteria: &Criteria) -> Result<Document> {
    let mut clauses = criteria
        .conditions
        .iter()
        .map(render_condition)
        .collect::<Result<Vec<_>>>()?;

    if let Some(search) = &criteria.search {
        let pattern = regex::escape(&search.term);
        let alternatives: Vec<Document> = search
            .fields
            .iter()
            .map(|f| doc! { storage_field(f): { "$regex": pattern.as_str(), "$options": "i" } })
            .collect();
        clauses.push(doc! { "$or": alternatives });
    }

    Ok(if clauses.is_empty() {
        doc! {}
    } else {
        doc! { "$and": clauses }
    })
}

fn render_sort(keys: &[SortKey]) -> Document {
    let mut sort = Document::new();
    for key in keys {
        let direction = match key.direction {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        };
        sort.insert(storage_field(&key.field), direction);
    }
    sort
}

fn render_projection(projection: &Projection) -> Document {
    match projection {
        Projection::All => doc! { VERSION_FIELD: 0 },
        Projection::Include(fields) => {
            let mut doc = Document::new();
            for field in fields {
                doc.insert(storage_field(field), 1);
            }
            doc
        }
        Projection::Exclude(fields) => {
            let mut doc = doc! { VERSION_FIELD: 0 };
            for field in fields {
                doc.insert(storage_field(field), 0);
            }
            doc
        }
    }
}

/// The driver encodes skip as a signed 64-bit integer
fn driver_skip(skip: u64) -> u64 {
    skip.min(i64::MAX as u64)
}

fn driver_limit(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// MongoDocumentStore
// ---------------------------------------------------------------------------

/// One resource collection backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use catalog::storage::MongoDocumentStore;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoDocumentStore::new(client.database("ecommerce"), "products");
/// let product = store.insert(body).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoDocumentStore {
    name: String,
    collection: Collection<Document>,
}

impl MongoDocumentStore {
    pub fn new(database: Database, name: &str) -> Self {
        Self {
            name: name.to_string(),
            collection: database.collection(name),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn collection_name(&self) -> &str {
        &self.name
    }

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<JsonDocument>> {
        let filter = render_filter(&query.criteria)?;
        let mut find = self
            .collection
            .find(filter)
            .sort(render_sort(&query.sort))
            .projection(render_projection(&query.projection))
            .skip(driver_skip(query.skip));
        if let Some(limit) = query.limit {
            find = find.limit(driver_limit(limit));
        }

        let cursor = find
            .await
            .map_err(|e| anyhow!("Failed to find documents: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect documents: {}", e))?;

        Ok(docs
            .into_iter()
            .map(|d| query.projection.apply(document_to_json(d)))
            .collect())
    }

    async fn count(&self, criteria: &Criteria) -> Result<u64> {
        self.collection
            .count_documents(render_filter(criteria)?)
            .await
            .map_err(|e| anyhow!("Failed to count documents: {}", e))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<JsonDocument>> {
        let doc = self
            .collection
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get document: {}", e))?;

        Ok(doc.map(document_to_json))
    }

    /// Inserts the document and reads it back to return the stored version.
    async fn insert(&self, document: JsonDocument) -> Result<JsonDocument> {
        let (id, document) = prepare_insert(document);

        self.collection
            .insert_one(json_to_document(document)?)
            .await
            .map_err(|e| anyhow!("Failed to insert document: {}", e))?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| anyhow!("Document not found after insert"))
    }

    async fn find_and_update(
        &self,
        id: &Uuid,
        changes: JsonDocument,
    ) -> Result<Option<JsonDocument>> {
        let changes = json_to_document(prepare_update(changes))?;

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to update document: {}", e))?;

        Ok(updated.map(document_to_json))
    }

    async fn find_and_delete(&self, id: &Uuid) -> Result<Option<JsonDocument>> {
        let deleted = self
            .collection
            .find_one_and_delete(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete document: {}", e))?;

        Ok(deleted.map(document_to_json))
    }
}

// ---------------------------------------------------------------------------
// MongoDatabase
// ---------------------------------------------------------------------------

/// A MongoDB database handing out one [`MongoDocumentStore`] per collection
#[derive(Clone, Debug)]
pub struct MongoDatabase {
    database: Database,
}

impl MongoDatabase {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Connect with a `mongodb://` or `mongodb+srv://` URI
    pub async fn connect(uri: &str, name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| anyhow!("Failed to connect to MongoDB: {}", e))?;
        Ok(Self::new(client.database(name)))
    }
}

#[async_trait]
impl DocumentDatabase for MongoDatabase {
    type Store = MongoDocumentStore;

    fn collection(&self, name: &str) -> MongoDocumentStore {
        MongoDocumentStore::new(self.database.clone(), name)
    }

    async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| anyhow!("MongoDB ping failed: {}", e))
    }
}
