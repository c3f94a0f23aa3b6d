//! JSON-file document store.
//!
//! The file is an object keyed by collection name. Each collection is either
//! an array of documents (each with an `"id"` key; the array index is used
//! when it is missing) or an object mapping ids to field maps:
//!
//! ```json
//! {
//!   "unidades_saude": [
//!     { "id": "ubs-01", "nome": "UBS Centro", "servicos": ["Vacina"] }
//!   ]
//! }
//! ```
//!
//! A bare top-level array is accepted as "every collection".

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use super::DocumentStore;
use crate::error::{Error, Result};
use crate::facility::Document;

/// Reads documents from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store over the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one collection from the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// collection is missing.
    pub async fn read_collection(&self, collection: &str) -> Result<Vec<Document>> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let root: Value = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), collection, "Read JSON document file");
        documents_from_value(root, collection)
    }
}

/// Extract a collection's documents from a parsed JSON file.
///
/// # Errors
///
/// Returns an error if the collection is missing or has the wrong shape.
pub fn documents_from_value(root: Value, collection: &str) -> Result<Vec<Document>> {
    match root {
        Value::Array(items) => documents_from_array(items),
        Value::Object(mut collections) => match collections.remove(collection) {
            Some(Value::Array(items)) => documents_from_array(items),
            Some(Value::Object(by_id)) => documents_from_map(by_id),
            Some(_) => Err(Error::malformed(
                None,
                format!("collection {collection:?} must be an array or an object"),
            )),
            None => Err(Error::CollectionNotFound(collection.to_string())),
        },
        _ => Err(Error::malformed(None, "document file must hold an object or an array")),
    }
}

fn documents_from_array(items: Vec<Value>) -> Result<Vec<Document>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(mut fields) => {
                let id = match fields.remove("id") {
                    Some(Value::String(id)) => id,
                    Some(Value::Number(n)) => n.to_string(),
                    _ => index.to_string(),
                };
                Ok(Document::new(id, fields))
            }
            _ => Err(Error::malformed(
                Some(&index.to_string()),
                "document must be an object",
            )),
        })
        .collect()
}

fn documents_from_map(by_id: Map<String, Value>) -> Result<Vec<Document>> {
    by_id
        .into_iter()
        .map(|(id, item)| match item {
            Value::Object(fields) => Ok(Document::new(id, fields)),
            _ => Err(Error::malformed(Some(&id), "document must be an object")),
        })
        .collect()
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.read_collection(collection).await
    }
}
