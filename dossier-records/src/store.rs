//! RecordStore - tenant-scoped CRUD with schema-driven processing
//!
//! Every write runs the same pipeline: kind normalization (structure),
//! validation (aggregated per field), transformation (canonical values),
//! then persistence. Reads never return soft-deleted records.
//!
//! Concurrency is optimistic: an update may carry the version the client
//! last saw, and a mismatch rejects the whole operation with no partial
//! effect. Updates without an expected version are last-writer-wins.
//! Writers to the same record serialize on its advisory file lock, so the
//! version check always sees the latest persisted write.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::RecordContext;
use crate::error::{RecordError, Result};
use crate::query::{matches_filter, matches_search, sort_records, ListPage, ListQuery};
use crate::types::{Record, RecordId, TenantId};
use dossier_fields::{FieldDefinition, KindRegistry, ProcessorRegistry};

/// Outcome of a batch delete. Items fail independently; one bad id never
/// aborts the rest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteOutcome {
    pub deleted_count: usize,
    pub failed_count: usize,
    pub results: Vec<BatchDeleteResult>,
}

/// Per-id result within a batch delete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResult {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Generic CRUD over tenant-scoped JSON document records.
pub struct RecordStore {
    context: RecordContext,
    processors: ProcessorRegistry,
    kinds: KindRegistry,
}

impl RecordStore {
    /// Create a store with the built-in processor and kind registries.
    pub fn new(context: RecordContext) -> Self {
        Self::with_registries(context, ProcessorRegistry::new(), KindRegistry::new())
    }

    /// Create a store with custom registries (extension point, exercised
    /// at composition time, not per request).
    pub fn with_registries(
        context: RecordContext,
        processors: ProcessorRegistry,
        kinds: KindRegistry,
    ) -> Self {
        Self {
            context,
            processors,
            kinds,
        }
    }

    pub fn context(&self) -> &RecordContext {
        &self.context
    }

    /// Create a record from client props: normalize, validate, transform,
    /// persist at version 1.
    pub async fn create(
        &self,
        tenant: &TenantId,
        fields: &[FieldDefinition],
        props: Map<String, Value>,
        actor: &str,
    ) -> Result<Record> {
        let normalized = self.kinds.normalize_record(props, fields)?;

        let report = self.processors.validate_record(&normalized, fields);
        if !report.is_valid() {
            return Err(RecordError::validation(report.into_errors()));
        }

        let transformed = self.processors.transform_record(&normalized, fields);
        let record = Record::new(tenant.clone(), transformed, actor);

        self.context.ensure_tenant(tenant).await?;
        self.context.write_record(&record).await?;
        tracing::debug!(record = %record.id, tenant = %tenant, "created record");
        Ok(record)
    }

    /// Fetch one live record. Soft-deleted records read as not found.
    pub async fn get(&self, tenant: &TenantId, id: &RecordId) -> Result<Record> {
        let record = self.context.read_record(tenant, id).await?;
        if record.is_deleted() {
            return Err(RecordError::record_not_found(id.to_string()));
        }
        Ok(record)
    }

    /// List live records with search, filter, sort and pagination.
    pub async fn list(&self, tenant: &TenantId, query: &ListQuery) -> Result<ListPage> {
        let mut records: Vec<Record> = self
            .context
            .read_all_records(tenant)
            .await?
            .into_iter()
            .filter(|record| !record.is_deleted())
            .collect();

        if let Some(term) = query.search.as_deref() {
            if !term.is_empty() {
                records.retain(|record| matches_search(record, term));
            }
        }
        if let Some(filter) = &query.filter {
            records.retain(|record| matches_filter(record, filter));
        }

        let sort = query.sort.as_deref().unwrap_or("createdAt");
        let order = query.order.unwrap_or_default();
        sort_records(&mut records, sort, order);

        let total = records.len();
        let page = query.page();
        let limit = query.limit();
        let total_pages = total.div_ceil(limit);
        let items = records
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        Ok(ListPage {
            items,
            page,
            limit,
            total,
            total_pages,
        })
    }

    /// Partial update: only the submitted keys are validated and
    /// transformed, then shallow-merged over the stored props.
    ///
    /// When `expected_version` is given and does not match the stored
    /// version, the operation fails with a conflict and no effect. The
    /// whole read-merge-write holds the record's exclusive file lock, so
    /// nothing can slip in between the version check and the write.
    pub async fn update(
        &self,
        tenant: &TenantId,
        fields: &[FieldDefinition],
        id: &RecordId,
        patch: Map<String, Value>,
        expected_version: Option<u64>,
        actor: &str,
    ) -> Result<Record> {
        let _lock = self.context.lock_record(tenant, id).await?;
        let mut record = self.get(tenant, id).await?;

        if let Some(expected) = expected_version {
            if expected != record.version {
                return Err(RecordError::version_conflict(
                    id.to_string(),
                    expected,
                    record.version,
                ));
            }
        }

        // Partial-update semantics: absent keys stay untouched, so only
        // the definitions for submitted keys participate.
        let touched: Vec<FieldDefinition> = fields
            .iter()
            .filter(|field| patch.contains_key(&field.key))
            .cloned()
            .collect();

        let normalized = self.kinds.normalize_record(patch, &touched)?;

        let report = self.processors.validate_record(&normalized, &touched);
        if !report.is_valid() {
            return Err(RecordError::validation(report.into_errors()));
        }

        let transformed = self.processors.transform_record(&normalized, &touched);
        for (key, value) in transformed {
            record.props.insert(key, value);
        }

        record.touch(actor);
        self.context.write_record(&record).await?;
        tracing::debug!(record = %record.id, version = record.version, "updated record");
        Ok(record)
    }

    /// Soft-delete: stamp `deletedAt` and bump the version. The file stays
    /// on disk; reads stop returning it. Holds the record's file lock the
    /// way `update` does.
    pub async fn delete(&self, tenant: &TenantId, id: &RecordId, actor: &str) -> Result<Record> {
        let _lock = self.context.lock_record(tenant, id).await?;
        let mut record = self.get(tenant, id).await?;
        record.mark_deleted(actor);
        self.context.write_record(&record).await?;
        tracing::debug!(record = %record.id, "soft-deleted record");
        Ok(record)
    }

    /// Delete a batch of ids, collecting a per-id outcome. Unparseable ids
    /// fail their own entry instead of rejecting the batch.
    pub async fn delete_batch(
        &self,
        tenant: &TenantId,
        ids: &[String],
        actor: &str,
    ) -> BatchDeleteOutcome {
        let mut results = Vec::with_capacity(ids.len());
        let mut deleted_count = 0;

        for raw in ids {
            let outcome = match RecordId::parse(raw) {
                Ok(id) => self.delete(tenant, &id, actor).await.map(|_| ()),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(()) => {
                    deleted_count += 1;
                    results.push(BatchDeleteResult {
                        id: raw.clone(),
                        success: true,
                        error: None,
                    });
                }
                Err(err) => {
                    results.push(BatchDeleteResult {
                        id: raw.clone(),
                        success: false,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        BatchDeleteOutcome {
            deleted_count,
            failed_count: results.len() - deleted_count,
            results,
        }
    }
}
