//! Query-feature pipeline
//!
//! Turns [`QueryParams`] into a deferred [`DocumentQuery`] through a fixed
//! sequence of stages:
//!
//! ```text
//! filter -> sort -> search -> limit_fields -> paginate
//! ```
//!
//! Each stage consumes the pipeline and returns a new one; nothing touches a
//! store. `paginate` is the terminal stage and yields a [`PreparedQuery`]
//! carrying the skip/limit window and the pagination metadata.
//!
//! ```rust,ignore
//! let pipeline = QueryPipeline::new(params, Criteria::all())
//!     .filter()
//!     .sort()
//!     .search(&SearchSpec::new(&["search"], &["name"]))
//!     .limit_fields();
//! let total = store.count(pipeline.criteria()).await?;
//! let prepared = pipeline.paginate(total, PaginationSettings::default());
//! let documents = store.find(&prepared.query).await?;
//! ```

use crate::core::document::CREATED_AT_FIELD;
use crate::core::pagination::{PageWindow, PaginationResult, PaginationSettings};
use crate::core::query::{
    Comparison, Criteria, DocumentQuery, FieldCondition, Projection, QueryParams, QueryValue,
    RESERVED_KEYS, SortKey, TextSearch,
};
use serde_json::{Map, Value};

/// Which query parameters carry a search term and which fields it matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    /// Parameter names, in priority order (e.g. `keyword`, `search`)
    pub params: Vec<String>,
    /// Text fields matched with OR semantics
    pub fields: Vec<String>,
}

impl SearchSpec {
    pub fn new(params: &[&str], fields: &[&str]) -> Self {
        Self {
            params: params.iter().map(|p| p.to_string()).collect(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Intermediate pipeline state
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPipeline {
    params: QueryParams,
    query: DocumentQuery,
}

impl QueryPipeline {
    /// Start from a base criteria (e.g. a parent scope) and the raw parameters
    pub fn new(params: QueryParams, base: Criteria) -> Self {
        Self {
            params,
            query: DocumentQuery::new(base),
        }
    }

    /// Translate every non-reserved parameter into a filter condition
    ///
    /// `field=value` becomes an equality; `field[gte]=value` (and `gt`,
    /// `lte`, `lt`) becomes a range condition. A nested mapping with any
    /// other token is kept as an equality against that mapping.
    pub fn filter(mut self) -> Self {
        let mut conditions = Vec::new();

        for (key, value) in self.params.iter() {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            match value {
                QueryValue::Scalar(raw) => {
                    conditions.push(FieldCondition::equals(key.as_str(), raw.as_str()));
                }
                QueryValue::Nested(tokens) => {
                    let mut embedded = Map::new();
                    for (token, raw) in tokens {
                        match Comparison::from_token(token) {
                            Some(comparison) => conditions.push(FieldCondition::new(
                                key.as_str(),
                                comparison,
                                raw.as_str(),
                            )),
                            None => {
                                embedded.insert(token.clone(), Value::String(raw.clone()));
                            }
                        }
                    }
                    if !embedded.is_empty() {
                        conditions.push(FieldCondition::equals(
                            key.as_str(),
                            Value::Object(embedded),
                        ));
                    }
                }
            }
        }

        tracing::debug!(conditions = conditions.len(), "filter stage");
        self.query.criteria.conditions.extend(conditions);
        self
    }

    /// Apply `sort`, or newest-first when absent
    pub fn sort(mut self) -> Self {
        let keys = self
            .params
            .scalar("sort")
            .map(SortKey::parse_list)
            .unwrap_or_default();

        self.query.sort = if keys.is_empty() {
            vec![SortKey::descending(CREATED_AT_FIELD)]
        } else {
            keys
        };
        self
    }

    /// Apply the first non-blank search parameter listed in `spec`
    pub fn search(mut self, spec: &SearchSpec) -> Self {
        let term = spec
            .params
            .iter()
            .filter_map(|param| self.params.scalar(param))
            .map(str::trim)
            .find(|term| !term.is_empty());

        if let Some(term) = term
            && !spec.fields.is_empty()
        {
            self.query.criteria.search = Some(TextSearch {
                term: term.to_string(),
                fields: spec.fields.clone(),
            });
        }
        self
    }

    /// Apply `fields`, or every field except internal ones when absent
    pub fn limit_fields(mut self) -> Self {
        self.query.projection = self
            .params
            .scalar("fields")
            .map(Projection::parse)
            .unwrap_or_default();
        self
    }

    /// Criteria accumulated so far, used to count matching documents
    pub fn criteria(&self) -> &Criteria {
        &self.query.criteria
    }

    /// Query built so far
    pub fn query(&self) -> &DocumentQuery {
        &self.query
    }

    /// Terminal stage: attach skip/limit and compute pagination metadata
    pub fn paginate(mut self, total: u64, settings: PaginationSettings) -> PreparedQuery {
        let window = PageWindow::calculate(
            self.params.scalar("page"),
            self.params.scalar("limit"),
            total,
            settings,
        );
        self.query.skip = window.skip;
        self.query.limit = Some(window.limit);

        PreparedQuery {
            query: self.query,
            pagination: window.result(),
        }
    }
}

/// A query ready for execution plus the metadata of the page it selects
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub query: DocumentQuery,
    pub pagination: PaginationResult,
}
