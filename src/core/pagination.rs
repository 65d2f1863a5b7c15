//! Pagination calculator
//!
//! Pure functions from raw `page`/`limit` query input and a total document
//! count to the page window and the pagination metadata returned to clients.
//! Malformed input is never an error: it is replaced by defaults or clamped.

use serde::{Deserialize, Serialize};

/// Default and maximum page size for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl PaginationSettings {
    /// Build settings, keeping `1 <= default_limit <= max_limit`
    pub fn new(default_limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }
}

/// The normalized page a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
    pub number_of_pages: u64,
    pub total: u64,
}

impl PageWindow {
    /// Normalize raw query input against a total count
    ///
    /// - `page` defaults to 1 when absent, non-numeric or below 1
    /// - `limit` defaults to `default_limit` when absent, non-numeric or
    ///   below 1, and is capped at `max_limit`
    pub fn calculate(
        raw_page: Option<&str>,
        raw_limit: Option<&str>,
        total: u64,
        settings: PaginationSettings,
    ) -> Self {
        let settings = PaginationSettings::new(settings.default_limit, settings.max_limit);
        let page = parse_positive(raw_page).unwrap_or(1);
        let limit = parse_positive(raw_limit)
            .unwrap_or(settings.default_limit)
            .min(settings.max_limit);

        Self {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit),
            number_of_pages: total.div_ceil(limit),
            total,
        }
    }

    /// Metadata for the response envelope
    pub fn result(&self) -> PaginationResult {
        PaginationResult {
            current_page: self.page,
            limit: self.limit,
            number_of_pages: self.number_of_pages,
            next: (self.page.saturating_mul(self.limit) < self.total).then(|| self.page + 1),
            prev: (self.page > 1).then(|| self.page - 1),
        }
    }
}

/// Pagination metadata returned alongside list data
///
/// `next` and `prev` are omitted when there is no such page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub current_page: u64,
    pub limit: u64,
    pub number_of_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<u64>,
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|v| *v >= 1)
}
