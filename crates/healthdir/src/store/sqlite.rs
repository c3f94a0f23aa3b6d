//! `SQLite`-backed document store.
//!
//! Holds collections of JSON documents locally so the directory can run
//! without a remote database. Documents get in through [`SqliteStore::import`],
//! which skips documents whose content is unchanged.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use super::migrations;
use super::DocumentStore;
use crate::error::{Error, Result};
use crate::facility::Document;

/// Local document store.
///
/// The connection sits behind a shared mutex so the store can be used as a
/// `DocumentStore` trait object. Reads made through the trait run on the
/// blocking thread pool, off the async executor.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

/// What happened to one document during an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The document was new.
    Inserted,
    /// The document existed with different content.
    Updated,
    /// The document existed with identical content.
    Unchanged,
}

/// Counts from an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// New documents.
    pub inserted: usize,
    /// Changed documents.
    pub updated: usize,
    /// Documents skipped because their content hash matched.
    pub unchanged: usize,
    /// Documents removed before the import (`replace` mode).
    pub removed: usize,
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of documents across collections.
    pub total_documents: i64,
    /// Document count per collection, by collection name.
    pub collections: Vec<(String, i64)>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates parent directories and initializes the schema as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening document store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Document store opened at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        lock(&self.conn)
    }

    /// Import documents into a collection in one transaction.
    ///
    /// With `replace`, the collection is emptied first.
    ///
    /// # Errors
    ///
    /// Returns an error if any database operation fails; nothing is
    /// committed in that case.
    pub fn import(
        &self,
        collection: &str,
        documents: &[Document],
        replace: bool,
    ) -> Result<ImportStats> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut stats = ImportStats::default();

        if replace {
            stats.removed = tx.execute("DELETE FROM documents WHERE collection = ?1", [collection])?;
        }
        for document in documents {
            match upsert_with(&tx, collection, document)? {
                UpsertOutcome::Inserted => stats.inserted += 1,
                UpsertOutcome::Updated => stats.updated += 1,
                UpsertOutcome::Unchanged => stats.unchanged += 1,
            }
        }
        tx.commit()?;

        info!(
            collection,
            inserted = stats.inserted,
            updated = stats.updated,
            unchanged = stats.unchanged,
            removed = stats.removed,
            "Imported documents"
        );
        Ok(stats)
    }

    /// Number of documents in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, collection: &str) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let collections = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(
                "SELECT collection, COUNT(*) FROM documents GROUP BY collection ORDER BY collection",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<(String, i64)>, _>>()?;
            rows
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            total_documents: collections.iter().map(|(_, n)| n).sum(),
            collections,
            db_size_bytes,
        })
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| Error::internal("document store connection lock poisoned"))
}

/// All documents of a collection, ordered by id.
fn documents_with(conn: &Connection, collection: &str) -> Result<Vec<Document>> {
    let mut stmt = conn
        .prepare("SELECT doc_id, fields FROM documents WHERE collection = ?1 ORDER BY doc_id")?;
    let rows = stmt
        .query_map([collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, fields)| match serde_json::from_str::<Value>(&fields)? {
            Value::Object(map) => Ok(Document::new(id, map)),
            _ => Err(Error::malformed(Some(&id), "stored fields are not an object")),
        })
        .collect()
}

fn upsert_with(conn: &Connection, collection: &str, document: &Document) -> Result<UpsertOutcome> {
    let hash = document.content_hash();
    let existing: Option<String> = conn
        .query_row(
            "SELECT content_hash FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![collection, document.id],
            |row| row.get(0),
        )
        .optional()?;

    if existing.as_deref() == Some(hash.as_str()) {
        debug!(collection, id = %document.id, "Skipping unchanged document");
        return Ok(UpsertOutcome::Unchanged);
    }

    let fields = Value::Object(document.fields.clone()).to_string();
    conn.execute(
        r"
        INSERT INTO documents (collection, doc_id, fields, content_hash, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (collection, doc_id) DO UPDATE SET
            fields = excluded.fields,
            content_hash = excluded.content_hash,
            updated_at = excluded.updated_at
        ",
        params![collection, document.id, fields, hash, Utc::now().to_rfc3339()],
    )?;

    Ok(if existing.is_some() {
        UpsertOutcome::Updated
    } else {
        UpsertOutcome::Inserted
    })
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        let shared = Arc::clone(&self.conn);
        let collection = collection.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = lock(&shared)?;
            documents_with(&conn, &collection)
        })
        .await
        .map_err(|e| Error::internal(format!("document store read task failed: {e}")))?
    }
}
