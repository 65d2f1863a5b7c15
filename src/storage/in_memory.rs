//! In-memory document store for testing and development
//!
//! Documents live in an insertion-ordered map behind an `RwLock`. Query
//! evaluation mirrors what a schema-aware document database does: filter
//! strings are cast against the stored value, arrays match when any element
//! matches, and mixed-type sorting follows a fixed type order.

use crate::core::document::{Document, lookup, prepare_insert, prepare_update, strip_internal};
use crate::core::query::{Comparison, Criteria, DocumentQuery, FieldCondition, SortDirection};
use crate::core::store::{DocumentDatabase, DocumentStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// One in-memory collection
///
/// Clones share the same data.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    name: String,
    documents: Arc<RwLock<IndexMap<Uuid, Document>>>,
}

impl InMemoryDocumentStore {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, criteria: &Criteria) -> Result<Vec<Document>> {
        let matcher = Matcher::new(criteria)?;
        let documents = self
            .documents
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(documents
            .values()
            .filter(|doc| matcher.matches(doc))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn collection_name(&self) -> &str {
        &self.name
    }

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        let mut documents = self.matching(&query.criteria)?;

        if !query.sort.is_empty() {
            // Stable sort keeps insertion order for full ties
            documents.sort_by(|a, b| {
                query
                    .sort
                    .iter()
                    .map(|key| {
                        let ordering = compare_values(lookup(a, &key.field), lookup(b, &key.field));
                        match key.direction {
                            SortDirection::Ascending => ordering,
                            SortDirection::Descending => ordering.reverse(),
                        }
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(documents
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| query.projection.apply(doc))
            .collect())
    }

    async fn count(&self, criteria: &Criteria) -> Result<u64> {
        let matcher = Matcher::new(criteria)?;
        let documents = self
            .documents
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(documents.values().filter(|doc| matcher.matches(doc)).count() as u64)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Document>> {
        let documents = self
            .documents
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(documents.get(id).cloned().map(strip_internal))
    }

    async fn insert(&self, document: Document) -> Result<Document> {
        let (id, document) = prepare_insert(document);
        let mut documents = self
            .documents
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        documents.insert(id, document.clone());
        Ok(strip_internal(document))
    }

    async fn find_and_update(&self, id: &Uuid, changes: Document) -> Result<Option<Document>> {
        let changes = prepare_update(changes);
        let mut documents = self
            .documents
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(document) = documents.get_mut(id) else {
            return Ok(None);
        };
        for (field, value) in changes {
            document.insert(field, value);
        }
        Ok(Some(strip_internal(document.clone())))
    }

    async fn find_and_delete(&self, id: &Uuid) -> Result<Option<Document>> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(documents.shift_remove(id).map(strip_internal))
    }
}

/// In-memory database: one [`InMemoryDocumentStore`] per collection name
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    collections: Arc<RwLock<HashMap<String, InMemoryDocumentStore>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentDatabase for InMemoryDatabase {
    type Store = InMemoryDocumentStore;

    fn collection(&self, name: &str) -> InMemoryDocumentStore {
        let mut collections = match self.collections.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        collections
            .entry(name.to_string())
            .or_insert_with(|| InMemoryDocumentStore::new(name))
            .clone()
    }

    async fn ping(&self) -> Result<()> {
        self.collections
            .read()
            .map(|_| ())
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }
}

// =============================================================================
// Criteria evaluation
// =============================================================================

/// Criteria compiled once per query
struct Matcher<'a> {
    conditions: &'a [FieldCondition],
    search: Option<(Regex, &'a [String])>,
}

impl<'a> Matcher<'a> {
    fn new(criteria: &'a Criteria) -> Result<Self> {
        let search = match &criteria.search {
            Some(search) => {
                let regex = RegexBuilder::new(&regex::escape(&search.term))
                    .case_insensitive(true)
                    .build()?;
                Some((regex, search.fields.as_slice()))
            }
            None => None,
        };
        Ok(Self {
            conditions: &criteria.conditions,
            search,
        })
    }

    fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition_matches(document, condition))
            && self.search.as_ref().is_none_or(|(regex, fields)| {
                fields
                    .iter()
                    .any(|field| lookup(document, field).is_some_and(|v| text_matches(regex, v)))
            })
    }
}

fn text_matches(regex: &Regex, value: &Value) -> bool {
    match value {
        Value::String(s) => regex.is_match(s),
        Value::Array(items) => items.iter().any(|item| text_matches(regex, item)),
        _ => false,
    }
}

fn condition_matches(document: &Document, condition: &FieldCondition) -> bool {
    let Some(stored) = lookup(document, &condition.field) else {
        return false;
    };

    if let Value::Array(items) = stored {
        if condition.comparison == Comparison::Eq && stored == &condition.value {
            return true;
        }
        return items
            .iter()
            .any(|item| compare_cast(item, &condition.value).is_some_and(|o| condition.comparison.accepts(o)));
    }

    compare_cast(stored, &condition.value).is_some_and(|o| condition.comparison.accepts(o))
}

/// Compare a stored value with a query operand, casting the operand to the
/// stored type; `None` when the two cannot be compared
fn compare_cast(stored: &Value, operand: &Value) -> Option<Ordering> {
    match (stored, operand) {
        (Value::Number(n), Value::String(raw)) => {
            let rhs = raw.trim().parse::<f64>().ok()?;
            n.as_f64()?.partial_cmp(&rhs)
        }
        (Value::String(s), Value::String(raw)) => Some(s.as_str().cmp(raw.as_str())),
        (Value::Bool(b), Value::String(raw)) => match raw.as_str() {
            "true" => Some(b.cmp(&true)),
            "false" => Some(b.cmp(&false)),
            _ => None,
        },
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (a, b) if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

/// Type order used for sorting mixed values
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
