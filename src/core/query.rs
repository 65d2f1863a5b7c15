//! Query directives decoded from URL query strings
//!
//! A raw query string is first decoded into [`QueryParams`], an ordered
//! mapping where bracket keys become nested mappings:
//!
//! ```text
//! ?price[gte]=50&price[lte]=100&sort=-price,title&fields=title,price&page=2
//! ```
//!
//! ```text
//! price  -> { gte: "50", lte: "100" }
//! sort   -> "-price,title"
//! fields -> "title,price"
//! page   -> "2"
//! ```
//!
//! The typed directives ([`Criteria`], [`SortKey`], [`Projection`]) are then
//! assembled into a deferred [`DocumentQuery`] by the query pipeline and
//! executed by a [`DocumentStore`](crate::core::store::DocumentStore).

use crate::core::document::{Document, ID_FIELD, VERSION_FIELD};
use indexmap::IndexMap;
use serde_json::Value;

/// Keys consumed by pagination, sorting, field selection and search
///
/// These never take part in the equality-filter pass.
pub const RESERVED_KEYS: &[&str] = &["page", "limit", "sort", "fields", "search", "keyword"];

/// A decoded query-string value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// `key=value`
    Scalar(String),
    /// `key[token]=value`, one entry per token
    Nested(IndexMap<String, String>),
}

impl QueryValue {
    /// The scalar string, if this is not a nested mapping
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            QueryValue::Scalar(s) => Some(s),
            QueryValue::Nested(_) => None,
        }
    }
}

/// Ordered mapping decoded from a query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: IndexMap<String, QueryValue>,
}

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already percent-decoded `(key, value)` pairs
    ///
    /// `key[token]=value` is folded into a nested mapping under `key`; a
    /// repeated plain key keeps its last value. Keys and tokens starting
    /// with `$` are discarded so clients cannot inject database operators.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key.into(), value.into());
        }
        params
    }

    fn insert(&mut self, key: String, value: String) {
        if key.starts_with('$') {
            return;
        }
        match split_bracket_key(&key) {
            Some((_, token)) if token.starts_with('$') => {}
            Some((base, token)) => {
                let entry = self
                    .entries
                    .entry(base.to_string())
                    .or_insert_with(|| QueryValue::Nested(IndexMap::new()));
                match entry {
                    QueryValue::Nested(map) => {
                        map.insert(token.to_string(), value);
                    }
                    QueryValue::Scalar(_) => {
                        let mut map = IndexMap::new();
                        map.insert(token.to_string(), value);
                        *entry = QueryValue::Nested(map);
                    }
                }
            }
            None => {
                let key = key.strip_suffix("[]").map(str::to_string).unwrap_or(key);
                self.entries.insert(key, QueryValue::Scalar(value));
            }
        }
    }

    /// Look up a decoded value
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.get(key)
    }

    /// Look up a scalar value, ignoring nested mappings
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(QueryValue::as_scalar)
    }

    /// Iterate entries in query-string order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryValue)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split `base[token]` into its parts; `base[]` is not a bracket key
fn split_bracket_key(key: &str) -> Option<(&str, &str)> {
    let inner = key.strip_suffix(']')?;
    let open = inner.find('[')?;
    let (base, token) = (&inner[..open], &inner[open + 1..]);
    if base.is_empty() || token.is_empty() {
        return None;
    }
    Some((base, token))
}

/// Comparison applied by a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    /// Map a query-string operator token (`gte`, `gt`, `lte`, `lt`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Comparison::Gt),
            "gte" => Some(Comparison::Gte),
            "lt" => Some(Comparison::Lt),
            "lte" => Some(Comparison::Lte),
            _ => None,
        }
    }

    /// Database-level operator
    pub fn operator(self) -> &'static str {
        match self {
            Comparison::Eq => "$eq",
            Comparison::Gt => "$gt",
            Comparison::Gte => "$gte",
            Comparison::Lt => "$lt",
            Comparison::Lte => "$lte",
        }
    }

    /// Whether `stored` compared to the operand satisfies this comparison
    pub fn accepts(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Comparison::Eq => ordering == Equal,
            Comparison::Gt => ordering == Greater,
            Comparison::Gte => ordering != Less,
            Comparison::Lt => ordering == Less,
            Comparison::Lte => ordering != Greater,
        }
    }
}

/// A single predicate on one document field
///
/// `value` is a string taken verbatim from the query string (stores cast it
/// against the stored value), or an embedded object when the query used an
/// unknown bracket token.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    pub field: String,
    pub comparison: Comparison,
    pub value: Value,
}

impl FieldCondition {
    pub fn new(field: impl Into<String>, comparison: Comparison, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            comparison,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Comparison::Eq, value)
    }
}

/// Case-insensitive substring match over several text fields (OR semantics)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub term: String,
    pub fields: Vec<String>,
}

/// The filtering part of a query: every condition AND the optional search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub conditions: Vec<FieldCondition>,
    pub search: Option<TextSearch>,
}

impl Criteria {
    /// Criteria matching every document
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, condition: FieldCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_search(mut self, search: TextSearch) -> Self {
        self.search = Some(search);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.search.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One `(field, direction)` pair of a sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse `-price,title` into ordered sort keys
    ///
    /// A `-` prefix means descending; `+` or no prefix means ascending.
    /// Empty segments are skipped.
    pub fn parse_list(raw: &str) -> Vec<SortKey> {
        raw.split(',')
            .map(str::trim)
            .filter_map(|segment| {
                if let Some(field) = segment.strip_prefix('-') {
                    (!field.is_empty()).then(|| SortKey::descending(field))
                } else {
                    let field = segment.strip_prefix('+').unwrap_or(segment);
                    (!field.is_empty()).then(|| SortKey::ascending(field))
                }
            })
            .collect()
    }
}

/// Typed field-selection directive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every field except internal ones
    #[default]
    All,
    /// Only these fields (plus `id`)
    Include(Vec<String>),
    /// Every field except these
    Exclude(Vec<String>),
}

impl Projection {
    /// Parse a `fields` parameter such as `title,price` or `-description,-slug`
    ///
    /// The first token decides the mode; tokens of the other mode are
    /// dropped. The internal version field can never be selected.
    pub fn parse(raw: &str) -> Self {
        let tokens: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "-" && *t != "+")
            .collect();

        let Some(first) = tokens.first() else {
            return Projection::All;
        };

        if first.starts_with('-') {
            let fields: Vec<String> = tokens
                .iter()
                .filter_map(|t| t.strip_prefix('-'))
                .map(str::to_string)
                .collect();
            Projection::Exclude(fields)
        } else {
            let fields: Vec<String> = tokens
                .iter()
                .filter(|t| !t.starts_with('-'))
                .map(|t| t.strip_prefix('+').unwrap_or(*t))
                .filter(|t| *t != VERSION_FIELD)
                .map(str::to_string)
                .collect();
            if fields.is_empty() {
                Projection::All
            } else {
                Projection::Include(fields)
            }
        }
    }

    /// Apply the projection to a single document
    pub fn apply(&self, mut document: Document) -> Document {
        document.remove(VERSION_FIELD);
        match self {
            Projection::All => document,
            Projection::Include(fields) => {
                document.retain(|key, _| key == ID_FIELD || fields.iter().any(|f| f == key));
                document
            }
            Projection::Exclude(fields) => {
                for field in fields {
                    document.remove(field);
                }
                document
            }
        }
    }
}

/// A deferred, fully-described find operation
///
/// Nothing is executed until a store receives it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub criteria: Criteria,
    pub sort: Vec<SortKey>,
    pub projection: Projection,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl DocumentQuery {
    pub fn new(criteria: Criteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }
}
