//! Success response envelopes

use crate::core::document::Document;
use crate::core::pagination::PaginationResult;
use serde::Serialize;

const SUCCESS: &str = "success";

/// `{status, results, paginationResult, data: [...]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEnvelope {
    pub status: &'static str,
    /// Number of documents in this page
    pub results: usize,
    pub pagination_result: PaginationResult,
    pub data: Vec<Document>,
}

impl ListEnvelope {
    pub fn new(data: Vec<Document>, pagination_result: PaginationResult) -> Self {
        Self {
            status: SUCCESS,
            results: data.len(),
            pagination_result,
            data,
        }
    }
}

/// `{status, data: {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataEnvelope {
    pub status: &'static str,
    pub data: Document,
}

impl DataEnvelope {
    pub fn new(data: Document) -> Self {
        Self {
            status: SUCCESS,
            data,
        }
    }
}
