//! List query parameters: pagination, search, filter, sort.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Record;

/// Page size used when the client does not send one.
pub const DEFAULT_LIMIT: usize = 20;
/// Hard page size ceiling; larger requests are clamped, not rejected.
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Parameters for listing the records of one tenant.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Substring match across each record's serialized props.
    pub search: Option<String>,
    /// Top-level column (`createdAt`, `updatedAt`, `version`, `id`) or a
    /// prop key. Defaults to `createdAt`.
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    /// Exact-match key/value pairs over props.
    pub filter: Option<Map<String, Value>>,
}

impl ListQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(sort.into());
        self.order = Some(order);
        self
    }

    pub fn with_filter(mut self, filter: Map<String, Value>) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// One page of list results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub items: Vec<Record>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

pub(crate) fn matches_search(record: &Record, term: &str) -> bool {
    let needle = term.to_lowercase();
    match serde_json::to_string(&record.props) {
        Ok(serialized) => serialized.to_lowercase().contains(&needle),
        Err(_) => false,
    }
}

pub(crate) fn matches_filter(record: &Record, filter: &Map<String, Value>) -> bool {
    filter
        .iter()
        .all(|(key, expected)| record.props.get(key) == Some(expected))
}

/// Sort records by a top-level column or a prop key. Records missing the
/// sort key group together at the null end.
pub(crate) fn sort_records(records: &mut [Record], sort: &str, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match sort {
            "createdAt" => a.created_at.cmp(&b.created_at),
            "updatedAt" => a.updated_at.cmp(&b.updated_at),
            "version" => a.version.cmp(&b.version),
            "id" => a.id.cmp(&b.id),
            prop => value_cmp(a.props.get(prop), b.props.get(prop)),
        };
        // ULIDs are time-ordered, so the id tiebreak keeps equal keys stable
        // across reads.
        let ordering = ordering.then_with(|| a.id.cmp(&b.id));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn value_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => type_rank(a)
                .cmp(&type_rank(b))
                .then_with(|| a.to_string().cmp(&b.to_string())),
        },
    }
}
