//! Wire types: request bodies, query parameters, response envelopes.
//!
//! Success responses wrap their payload as `{"success": true, "data": ...}`;
//! list responses add a `pagination` object. Record payloads are the props
//! spread over `{id, version}`, so a prop named `id` or `version` can never
//! shadow the real columns.

use axum::Json;
use dossier_records::{ListPage, ListQuery, Record, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::api::error::ApiError;

/// Body of `POST /{dir}`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    #[serde(default)]
    pub props: Map<String, Value>,
}

/// Body of `PATCH /{dir}/{id}`. `version` is an optional precondition:
/// when present, the update only applies if it matches the stored version.
#[derive(Debug, Deserialize)]
pub struct PatchBody {
    #[serde(default)]
    pub props: Map<String, Value>,
    pub version: Option<u64>,
}

/// Body of `DELETE /{dir}/batch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchBody {
    #[serde(default)]
    pub record_ids: Vec<String>,
}

/// Query string of `GET /{dir}`. `filter` arrives as a JSON object
/// serialized into a single query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub filter: Option<String>,
}

impl ListParams {
    /// Convert the raw query string into a store query. A `filter` value
    /// that is not a JSON object is a client error.
    pub fn into_query(self) -> Result<ListQuery, ApiError> {
        let filter = match self.filter.as_deref() {
            None | Some("") => None,
            Some(raw) => match serde_json::from_str::<Map<String, Value>>(raw) {
                Ok(map) if map.is_empty() => None,
                Ok(map) => Some(map),
                Err(_) => return Err(ApiError::bad_request("filter must be a JSON object")),
            },
        };
        let order = self.order.as_deref().map(|raw| {
            if raw.eq_ignore_ascii_case("asc") {
                SortOrder::Asc
            } else {
                SortOrder::Desc
            }
        });
        Ok(ListQuery {
            page: self.page,
            limit: self.limit,
            search: self.search,
            sort: self.sort,
            order,
            filter,
        })
    }
}

/// Pagination block of list responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl From<&ListPage> for Pagination {
    fn from(page: &ListPage) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

/// Serialize one record as its wire shape: `{id, version, ...props}`.
pub fn record_data(record: &Record) -> Value {
    let mut data = record.props.clone();
    data.insert("id".to_string(), json!(record.id));
    data.insert("version".to_string(), json!(record.version));
    Value::Object(data)
}

/// `{"success": true, "data": ...}`
pub fn success(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// `{"success": true}`
pub fn success_empty() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// List envelope with the pagination block.
pub fn success_page(page: &ListPage) -> Json<Value> {
    let data: Vec<Value> = page.items.iter().map(record_data).collect();
    Json(json!({
        "success": true,
        "data": data,
        "pagination": Pagination::from(page),
    }))
}
