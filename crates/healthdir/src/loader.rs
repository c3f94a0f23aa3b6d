//! Loading the facility collection from a document store.

use thiserror::Error;
use tracing::{error, info};

use crate::error::Error;
use crate::facility::FacilityRecord;
use crate::store::DocumentStore;

/// A failed read of the facility collection.
#[derive(Error, Debug)]
#[error("failed to load collection '{collection}' from {store}: {source}")]
pub struct LoadError {
    /// Collection that was being read.
    pub collection: String,
    /// Store backend name.
    pub store: &'static str,
    /// The underlying failure.
    #[source]
    pub source: Error,
}

/// Reads one fixed collection from a store.
#[derive(Debug)]
pub struct Loader<S> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> Loader<S> {
    /// Create a loader for `collection`.
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// The collection this loader reads.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Fetch every document and convert it to a record.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the store read fails. No retry is made.
    pub async fn load(&self) -> Result<Vec<FacilityRecord>, LoadError> {
        match self.store.fetch_all(&self.collection).await {
            Ok(documents) => {
                let records: Vec<_> = documents
                    .into_iter()
                    .map(FacilityRecord::from_document)
                    .collect();
                info!(
                    store = self.store.name(),
                    collection = %self.collection,
                    count = records.len(),
                    "Loaded facility records"
                );
                Ok(records)
            }
            Err(source) => {
                error!(
                    store = self.store.name(),
                    collection = %self.collection,
                    error = %source,
                    "Failed to load facility records"
                );
                Err(LoadError {
                    collection: self.collection.clone(),
                    store: self.store.name(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::Document;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};

    fn doc(id: &str, fields: Value) -> Document {
        match fields {
            Value::Object(map) => Document::new(id, map),
            other => panic!("fields must be an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_load_merges_id_and_fields() {
        let store = MemoryStore::with_collection(
            "unidades_saude",
            vec![
                doc("a", json!({"nome": "UBS Centro", "servicos": ["Vacina"]})),
                doc("b", json!({"nome": "UPA Norte"})),
            ],
        );
        let loader = Loader::new(store, "unidades_saude");

        let records = loader.load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].name, "UBS Centro");
        assert_eq!(records[1].id, "b");
        assert_eq!(loader.collection(), "unidades_saude");
    }

    #[tokio::test]
    async fn test_load_failure_wraps_cause() {
        crate::logging::init_test_logging();
        let loader = Loader::new(FailingStore, "unidades_saude");

        let err = loader.load().await.unwrap_err();
        assert_eq!(err.collection, "unidades_saude");
        assert_eq!(err.store, "failing");
        assert!(err.source.is_remote());
        assert!(err.to_string().contains("unidades_saude"));
    }

    #[tokio::test]
    async fn test_load_empty_collection() {
        let loader = Loader::new(MemoryStore::new(), "unidades_saude");
        assert!(loader.load().await.unwrap().is_empty());
    }
}
