//! Directory catalog - resolves a directory identifier to its schema.
//!
//! The store consults the catalog before every write and read. Directories
//! are registered at startup (loaded from schema files under the data
//! directory) and are read-mostly afterward; schema administration itself
//! lives outside this engine.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tokio::fs;
use tokio::sync::RwLock;

use crate::error::{RecordError, Result};
use crate::types::{Directory, DirectorySchema};
use dossier_fields::FieldDefinition;

/// In-memory directory registry, safe for concurrent resolution.
#[derive(Default)]
pub struct DirectoryCatalog {
    inner: RwLock<CatalogInner>,
}

#[derive(Default)]
struct CatalogInner {
    by_id: HashMap<String, Directory>,
    slug_to_id: HashMap<String, String>,
    fields: HashMap<String, Vec<FieldDefinition>>,
}

impl DirectoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` schema file under the given directory. A
    /// missing directory is an empty catalog, not an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let catalog = Self::new();
        let path = path.as_ref();
        if !path.exists() {
            return Ok(catalog);
        }

        let mut entries = fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file = entry.path();
            if file.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&file).await?;
            let schema: DirectorySchema = serde_json::from_str(&content)?;
            tracing::debug!(
                directory = %schema.directory.id,
                fields = schema.fields.len(),
                "loaded directory schema"
            );
            catalog.register(schema.directory, schema.fields).await?;
        }

        Ok(catalog)
    }

    /// Register or replace a directory and its field definitions.
    ///
    /// Rejects duplicate field keys within the directory and slugs already
    /// owned by another directory. Fields are stored ordered by key.
    pub async fn register(
        &self,
        directory: Directory,
        mut fields: Vec<FieldDefinition>,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &fields {
            if field.directory_id != directory.id {
                return Err(RecordError::Schema(dossier_fields::FieldError::invalid_config(
                    &field.key,
                    format!(
                        "field belongs to directory {} but was registered under {}",
                        field.directory_id, directory.id
                    ),
                )));
            }
            if !seen.insert(field.key.clone()) {
                return Err(RecordError::DuplicateFieldKey {
                    directory: directory.id.clone(),
                    key: field.key.clone(),
                });
            }
        }
        fields.sort_by(|a, b| a.key.cmp(&b.key));

        let mut inner = self.inner.write().await;
        if let Some(owner) = inner.slug_to_id.get(&directory.slug) {
            if owner != &directory.id {
                return Err(RecordError::SlugConflict {
                    slug: directory.slug.clone(),
                    directory: owner.clone(),
                });
            }
        }
        // Drop the old slug mapping when a directory is re-registered
        // under a new slug.
        if let Some(previous) = inner.by_id.get(&directory.id) {
            if previous.slug != directory.slug {
                let old_slug = previous.slug.clone();
                inner.slug_to_id.remove(&old_slug);
            }
        }
        inner
            .slug_to_id
            .insert(directory.slug.clone(), directory.id.clone());
        inner.fields.insert(directory.id.clone(), fields);
        inner.by_id.insert(directory.id.clone(), directory);
        Ok(())
    }

    /// Resolve a slug or id to the directory and its live fields.
    ///
    /// A directory with no fields resolves successfully with an empty
    /// field list; only an unknown identifier is an error.
    pub async fn resolve(&self, slug_or_id: &str) -> Result<DirectorySchema> {
        let inner = self.inner.read().await;
        let id = if inner.by_id.contains_key(slug_or_id) {
            slug_or_id
        } else {
            inner
                .slug_to_id
                .get(slug_or_id)
                .map(String::as_str)
                .ok_or_else(|| RecordError::directory_not_found(slug_or_id))?
        };
        let directory = inner
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| RecordError::directory_not_found(slug_or_id))?;
        let fields = inner.fields.get(id).cloned().unwrap_or_default();
        Ok(DirectorySchema { directory, fields })
    }

    /// All registered directories.
    pub async fn list(&self) -> Vec<Directory> {
        let inner = self.inner.read().await;
        let mut directories: Vec<Directory> = inner.by_id.values().cloned().collect();
        directories.sort_by(|a, b| a.id.cmp(&b.id));
        directories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_fields::FieldKind;
    use tempfile::TempDir;

    fn users_directory() -> Directory {
        Directory::new("dir_users", "users", "Users")
    }

    fn users_fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("dir_users", "name", FieldKind::Primitive, "text"),
            FieldDefinition::new("dir_users", "age", FieldKind::Primitive, "number"),
        ]
    }

    #[tokio::test]
    async fn resolves_by_slug_and_by_id() {
        let catalog = DirectoryCatalog::new();
        catalog
            .register(users_directory(), users_fields())
            .await
            .unwrap();

        let by_slug = catalog.resolve("users").await.unwrap();
        assert_eq!(by_slug.directory.id, "dir_users");
        let by_id = catalog.resolve("dir_users").await.unwrap();
        assert_eq!(by_id.directory.slug, "users");
    }

    #[tokio::test]
    async fn unknown_directory_is_not_found() {
        let catalog = DirectoryCatalog::new();
        let err = catalog.resolve("ghost").await.unwrap_err();
        assert!(matches!(err, RecordError::DirectoryNotFound { .. }));
    }

    #[tokio::test]
    async fn directory_without_fields_resolves_empty() {
        let catalog = DirectoryCatalog::new();
        catalog
            .register(Directory::new("dir_raw", "raw", "Raw"), Vec::new())
            .await
            .unwrap();
        let schema = catalog.resolve("raw").await.unwrap();
        assert!(schema.fields.is_empty());
    }

    #[tokio::test]
    async fn fields_come_back_ordered_by_key() {
        let catalog = DirectoryCatalog::new();
        catalog
            .register(users_directory(), users_fields())
            .await
            .unwrap();
        let schema = catalog.resolve("users").await.unwrap();
        let keys: Vec<&str> = schema.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["age", "name"]);
    }

    #[tokio::test]
    async fn duplicate_field_key_is_rejected() {
        let catalog = DirectoryCatalog::new();
        let fields = vec![
            FieldDefinition::new("dir_users", "name", FieldKind::Primitive, "text"),
            FieldDefinition::new("dir_users", "name", FieldKind::Primitive, "email"),
        ];
        let err = catalog.register(users_directory(), fields).await.unwrap_err();
        assert!(matches!(err, RecordError::DuplicateFieldKey { .. }));
    }

    #[tokio::test]
    async fn foreign_field_is_rejected() {
        let catalog = DirectoryCatalog::new();
        let fields = vec![FieldDefinition::new(
            "dir_other",
            "name",
            FieldKind::Primitive,
            "text",
        )];
        let err = catalog.register(users_directory(), fields).await.unwrap_err();
        assert!(matches!(err, RecordError::Schema(_)));
    }

    #[tokio::test]
    async fn slug_cannot_move_between_directories() {
        let catalog = DirectoryCatalog::new();
        catalog
            .register(users_directory(), Vec::new())
            .await
            .unwrap();
        let err = catalog
            .register(Directory::new("dir_other", "users", "Other"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::SlugConflict { .. }));
    }

    #[tokio::test]
    async fn reregistering_updates_slug_mapping() {
        let catalog = DirectoryCatalog::new();
        catalog
            .register(users_directory(), Vec::new())
            .await
            .unwrap();
        catalog
            .register(Directory::new("dir_users", "people", "People"), Vec::new())
            .await
            .unwrap();

        assert!(catalog.resolve("people").await.is_ok());
        let err = catalog.resolve("users").await.unwrap_err();
        assert!(matches!(err, RecordError::DirectoryNotFound { .. }));
    }

    #[tokio::test]
    async fn loads_schema_files_from_disk() {
        let temp = TempDir::new().unwrap();
        let schema = DirectorySchema {
            directory: users_directory(),
            fields: users_fields(),
        };
        std::fs::write(
            temp.path().join("dir_users.json"),
            serde_json::to_string_pretty(&schema).unwrap(),
        )
        .unwrap();
        std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let catalog = DirectoryCatalog::load(temp.path()).await.unwrap();
        let resolved = catalog.resolve("users").await.unwrap();
        assert_eq!(resolved.fields.len(), 2);
    }

    #[tokio::test]
    async fn load_of_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let catalog = DirectoryCatalog::load(temp.path().join("absent")).await.unwrap();
        assert!(catalog.list().await.is_empty());
    }
}
