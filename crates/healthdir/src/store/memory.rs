//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;

use super::DocumentStore;
use crate::error::Result;
use crate::facility::Document;

/// Documents held in memory, grouped by collection in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document to a collection.
    pub fn insert(&mut self, collection: &str, document: Document) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Build a store with a single collection.
    #[must_use]
    pub fn with_collection(collection: &str, documents: Vec<Document>) -> Self {
        let mut store = Self::new();
        store.collections.insert(collection.to_string(), documents);
        store
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        // Like Firestore, an unknown collection is simply empty.
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[tokio::test]
    async fn test_fetch_keeps_insertion_order() {
        let mut store = MemoryStore::new();
        store.insert("unidades", Document::new("b", Map::new()));
        store.insert("unidades", Document::new("a", Map::new()));

        let docs = store.fetch_all("unidades").await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.fetch_all("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_with_collection() {
        let store = MemoryStore::with_collection("c", vec![Document::new("1", Map::new())]);
        assert_eq!(store.fetch_all("c").await.unwrap().len(), 1);
    }
}
