//! Document stores that supply facility records.
//!
//! The directory only needs one operation from a store: read every document
//! of a collection. Implementations:
//!
//! - [`FirestoreStore`]: Cloud Firestore over its REST API
//! - [`SqliteStore`]: a local `SQLite` document table, fed by `import`
//! - [`JsonFileStore`]: a JSON file keyed by collection
//! - [`MemoryStore`]: in-process documents

pub mod firestore;
pub mod json;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::config::{Config, SourceKind};
use crate::error::Result;
use crate::facility::Document;

pub use firestore::FirestoreStore;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::{ImportStats, SqliteStore, StoreStats};

/// Read access to a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name of the backend, for logs and status output.
    fn name(&self) -> &'static str;

    /// Fetch every document of `collection`, in the store's natural order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or a document cannot
    /// be decoded.
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        (**self).fetch_all(collection).await
    }
}

/// Open the store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or its client built.
pub fn open_store(config: &Config) -> Result<Box<dyn DocumentStore>> {
    let store: Box<dyn DocumentStore> = match config.source.kind {
        SourceKind::Sqlite => Box::new(SqliteStore::open(config.database_path())?),
        SourceKind::Firestore => Box::new(FirestoreStore::from_config(&config.firestore)?),
        SourceKind::Json => {
            let path = config.source.json_path.clone().ok_or_else(|| {
                crate::error::Error::config_validation("source.json_path is not set")
            })?;
            Box::new(JsonFileStore::new(path))
        }
    };
    Ok(store)
}
