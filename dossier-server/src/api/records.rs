//! Record CRUD handlers.
//!
//! Every route resolves its `{dir}` segment (slug or id) through the
//! catalog first, then derives the tenant scope from the application id
//! and the resolved directory id. A record is therefore only ever read
//! or written inside the tenant its directory belongs to; no handler
//! accepts a tenant from the client.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use dossier_records::{DirectorySchema, RecordId, TenantId};
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::types::{
    record_data, success, success_empty, success_page, BatchBody, CreateBody, ListParams, PatchBody,
};
use crate::app::AppState;

/// Liveness probe.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The acting user, from the `x-user-id` header the authentication
/// collaborator injects. Absent or blank means an anonymous actor.
fn actor_from(headers: &HeaderMap) -> String {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| "anonymous".to_string())
}

fn tenant_for(state: &AppState, schema: &DirectorySchema) -> TenantId {
    TenantId::derive(&state.app_id, &schema.directory.id)
}

/// `GET /{dir}` — paginated listing with search, filter and sort.
pub async fn list_records(
    State(state): State<AppState>,
    Path(dir): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let schema = state.catalog.resolve(&dir).await?;
    let tenant = tenant_for(&state, &schema);
    let query = params.into_query()?;

    let page = state.store.list(&tenant, &query).await?;
    Ok(success_page(&page))
}

/// `POST /{dir}` — validate and create, returning 201 with the record.
pub async fn create_record(
    State(state): State<AppState>,
    Path(dir): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let schema = state.catalog.resolve(&dir).await?;
    let tenant = tenant_for(&state, &schema);
    let actor = actor_from(&headers);

    let record = state
        .store
        .create(&tenant, &schema.fields, body.props, &actor)
        .await?;
    Ok((StatusCode::CREATED, success(record_data(&record))))
}

/// `GET /{dir}/{id}` — fetch one live record.
pub async fn get_record(
    State(state): State<AppState>,
    Path((dir, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let schema = state.catalog.resolve(&dir).await?;
    let tenant = tenant_for(&state, &schema);
    let id = RecordId::parse(&id)?;

    let record = state.store.get(&tenant, &id).await?;
    Ok(success(record_data(&record)))
}

/// `PATCH /{dir}/{id}` — partial update. Only the submitted props are
/// validated and merged; a stale `version` in the body is a 409.
pub async fn patch_record(
    State(state): State<AppState>,
    Path((dir, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<PatchBody>,
) -> Result<Json<Value>, ApiError> {
    let schema = state.catalog.resolve(&dir).await?;
    let tenant = tenant_for(&state, &schema);
    let actor = actor_from(&headers);
    let id = RecordId::parse(&id)?;

    let record = state
        .store
        .update(&tenant, &schema.fields, &id, body.props, body.version, &actor)
        .await?;
    Ok(success(record_data(&record)))
}

/// `DELETE /{dir}/{id}` — soft delete.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((dir, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let schema = state.catalog.resolve(&dir).await?;
    let tenant = tenant_for(&state, &schema);
    let actor = actor_from(&headers);
    let id = RecordId::parse(&id)?;

    state.store.delete(&tenant, &id, &actor).await?;
    Ok(success_empty())
}

/// `DELETE /{dir}/batch` — best-effort batch delete with per-id results.
pub async fn delete_batch(
    State(state): State<AppState>,
    Path(dir): Path<String>,
    headers: HeaderMap,
    Json(body): Json<BatchBody>,
) -> Result<Json<Value>, ApiError> {
    let schema = state.catalog.resolve(&dir).await?;
    let tenant = tenant_for(&state, &schema);
    let actor = actor_from(&headers);

    let outcome = state
        .store
        .delete_batch(&tenant, &body.record_ids, &actor)
        .await;
    Ok(success(json!(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_defaults_to_anonymous() {
        let headers = HeaderMap::new();
        assert_eq!(actor_from(&headers), "anonymous");

        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "  ".parse().unwrap());
        assert_eq!(actor_from(&headers), "anonymous");
    }

    #[test]
    fn actor_reads_the_user_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "user-42".parse().unwrap());
        assert_eq!(actor_from(&headers), "user-42");
    }
}
