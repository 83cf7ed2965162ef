//! RecordContext - I/O primitives for record storage
//!
//! The context provides tenant-scoped data access, no business logic. The
//! store does all the work. Every path helper takes the tenant, so a read
//! or write that crosses tenants is impossible to express.
//!
//! Storage layout:
//!
//! ```text
//! data/
//! ├── directories/
//! │   └── {directoryId}.json     # Directory schema (catalog input)
//! └── tenants/
//!     └── {tenantId}/
//!         └── records/
//!             ├── {recordId}.json
//!             └── {recordId}.lock   # Advisory lock sidecar
//! ```
//!
//! Mutations of an existing record serialize on an exclusive advisory lock,
//! taken per record via [`RecordContext::lock_record`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use tokio::fs;
use ulid::Ulid;

use crate::error::{RecordError, Result};
use crate::types::{Record, RecordId, TenantId};

/// Delay between attempts to take a contended record lock
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Attempts before a contended record lock turns into `LockBusy`
const LOCK_ATTEMPTS: u32 = 100;

/// Context passed to every store operation - provides access, not logic
pub struct RecordContext {
    /// Path to the data directory
    root: PathBuf,
}

impl RecordContext {
    /// Create a new context for the given data directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Get the root data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the directory schema files consumed by the catalog
    pub fn schemas_dir(&self) -> PathBuf {
        self.root.join("directories")
    }

    /// Path to the tenants directory
    pub fn tenants_dir(&self) -> PathBuf {
        self.root.join("tenants")
    }

    /// Path to one tenant's directory
    pub fn tenant_dir(&self, tenant: &TenantId) -> PathBuf {
        self.tenants_dir().join(tenant.as_str())
    }

    /// Path to a tenant's records directory
    pub fn records_dir(&self, tenant: &TenantId) -> PathBuf {
        self.tenant_dir(tenant).join("records")
    }

    /// Path to a record's JSON file
    pub fn record_path(&self, tenant: &TenantId, id: &RecordId) -> PathBuf {
        self.records_dir(tenant).join(format!("{}.json", id))
    }

    /// Path to a record's lock file. The record file itself is replaced by
    /// rename on every write, which would strand a lock held on its inode,
    /// so the lock lives in a sidecar that is never renamed. The `.lock`
    /// extension keeps it out of the `.json` directory listing.
    pub fn record_lock_path(&self, tenant: &TenantId, id: &RecordId) -> PathBuf {
        self.records_dir(tenant).join(format!("{}.lock", id))
    }

    // =========================================================================
    // Directory initialization
    // =========================================================================

    /// Create the storage tree for a tenant
    ///
    /// This is idempotent - safe to call before every write.
    pub async fn ensure_tenant(&self, tenant: &TenantId) -> Result<()> {
        fs::create_dir_all(self.records_dir(tenant)).await?;
        Ok(())
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Take an exclusive advisory lock on a record
    ///
    /// A contended lock is retried for about a second before giving up with
    /// [`RecordError::LockBusy`]. The returned guard releases the lock on
    /// drop. Readers do not lock; the lock only serializes writers that
    /// read-merge-write the same record.
    pub async fn lock_record(&self, tenant: &TenantId, id: &RecordId) -> Result<RecordLock> {
        let path = self.record_lock_path(tenant, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        for _ in 0..LOCK_ATTEMPTS {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(RecordLock { file }),
                Err(err)
                    if err.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
                {
                    tokio::time::sleep(LOCK_RETRY_DELAY).await;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(RecordError::LockBusy { id: id.to_string() })
    }

    // =========================================================================
    // Record I/O
    // =========================================================================

    /// Read a record file
    pub async fn read_record(&self, tenant: &TenantId, id: &RecordId) -> Result<Record> {
        let path = self.record_path(tenant, id);
        if !path.exists() {
            return Err(RecordError::record_not_found(id.to_string()));
        }

        let content = fs::read_to_string(&path).await?;
        let record: Record = serde_json::from_str(&content)?;
        Ok(record)
    }

    /// Write a record file (atomic write via temp file)
    pub async fn write_record(&self, record: &Record) -> Result<()> {
        let path = self.record_path(&record.tenant_id, &record.id);
        let content = serde_json::to_string_pretty(record)?;
        atomic_write(&path, content.as_bytes()).await
    }

    /// Check if a record file exists
    pub async fn record_exists(&self, tenant: &TenantId, id: &RecordId) -> bool {
        self.record_path(tenant, id).exists()
    }

    /// List all record IDs by reading the tenant's records directory
    pub async fn list_record_ids(&self, tenant: &TenantId) -> Result<Vec<RecordId>> {
        let records_dir = self.records_dir(tenant);
        if !records_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&records_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Ok(id) = RecordId::parse(stem) {
                        ids.push(id);
                    }
                }
            }
        }

        Ok(ids)
    }

    /// Read all records for a tenant
    pub async fn read_all_records(&self, tenant: &TenantId) -> Result<Vec<Record>> {
        let ids = self.list_record_ids(tenant).await?;
        let mut records = Vec::with_capacity(ids.len());

        for id in ids {
            records.push(self.read_record(tenant, &id).await?);
        }

        Ok(records)
    }
}

/// Exclusive lock on one record, released when dropped
pub struct RecordLock {
    file: std::fs::File,
}

impl Drop for RecordLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Atomic write via temp file and rename. The temp name carries a fresh
/// ULID so two writers to the same record never share a temp file.
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    // Write to temp file in same directory
    let temp_path = path.with_extension(format!("{}.tmp", Ulid::new()));
    fs::write(&temp_path, content).await?;

    // Rename (atomic on same filesystem)
    fs::rename(&temp_path, path).await?;

    Ok(())
}
