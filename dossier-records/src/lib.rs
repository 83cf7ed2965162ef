//! Tenant-scoped record store with file-backed storage
//!
//! This crate stores instances of runtime-defined schemas. A directory's
//! field definitions come from the [`DirectoryCatalog`]; the
//! [`RecordStore`] runs every write through kind normalization,
//! aggregated validation and idempotent transformation from
//! `dossier-fields`, then persists the record as a JSON file under its
//! tenant.
//!
//! - **Tenant scoping is structural** - every path helper and store
//!   operation takes the [`TenantId`], so cross-tenant access cannot be
//!   expressed
//! - **Optimistic concurrency** - records carry a version counter;
//!   updates may carry the expected version and fail on mismatch with no
//!   partial effect. The version check runs under an exclusive per-record
//!   file lock, so racing writers serialize instead of losing writes
//! - **Soft delete** - deletion stamps `deletedAt` and hides the record
//!   from reads; files are never removed on the hot path
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use dossier_records::{ListQuery, RecordContext, RecordStore, TenantId};
//! use dossier_fields::{FieldDefinition, FieldKind};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RecordStore::new(RecordContext::new("/var/lib/dossier"));
//! let tenant = TenantId::derive("app1", "dir_users");
//! let fields = vec![
//!     FieldDefinition::new("dir_users", "name", FieldKind::Primitive, "text")
//!         .with_required(true),
//! ];
//!
//! let props = json!({ "name": " Ana " });
//! let record = store
//!     .create(&tenant, &fields, props.as_object().unwrap().clone(), "user-1")
//!     .await?;
//! assert_eq!(record.version, 1);
//!
//! let page = store.list(&tenant, &ListQuery::default()).await?;
//! println!("{} records", page.total);
//! # Ok(())
//! # }
//! ```

mod catalog;
mod context;
mod error;
mod query;
mod store;
pub mod types;

pub use catalog::DirectoryCatalog;
pub use context::{RecordContext, RecordLock};
pub use error::{RecordError, Result};
pub use query::{ListPage, ListQuery, SortOrder, DEFAULT_LIMIT, MAX_LIMIT};
pub use store::{BatchDeleteOutcome, BatchDeleteResult, RecordStore};
pub use types::{Directory, DirectorySchema, Record, RecordId, TenantId};
