//! The in-memory dataset cache.
//!
//! Holds the most recently loaded facility records for the session. The
//! records are only ever replaced wholesale. Each load takes a
//! [`LoadTicket`]; only the most recently issued ticket may write, so a slow
//! load that finishes after a newer one cannot clobber it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::facility::FacilityRecord;

/// Where the cache is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load has been started.
    #[default]
    Idle,
    /// A load is in flight.
    Loading,
    /// The last load succeeded.
    Ready,
    /// The last load failed.
    Failed,
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Proof that a load was started; required to complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Generation number of this ticket.
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Session-owned cache of facility records.
#[derive(Debug, Clone, Default)]
pub struct DatasetCache {
    records: Arc<[FacilityRecord]>,
    state: LoadState,
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl DatasetCache {
    /// Create an empty, idle cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current records.
    #[must_use]
    pub fn records(&self) -> &[FacilityRecord] {
        &self.records
    }

    /// Number of cached records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// When the current records were loaded.
    #[must_use]
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Start a load, superseding any load already in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        debug!(generation = self.generation, "Dataset load started");
        LoadTicket(self.generation)
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        if ticket.0 == self.generation {
            true
        } else {
            warn!(
                stale = ticket.0,
                current = self.generation,
                "Discarding result of superseded dataset load"
            );
            false
        }
    }

    /// Replace the records with a completed load.
    ///
    /// Returns `false`, leaving the cache untouched, if `ticket` has been
    /// superseded.
    pub fn complete(&mut self, ticket: LoadTicket, records: Vec<FacilityRecord>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.records = records.into();
        self.state = LoadState::Ready;
        self.loaded_at = Some(Utc::now());
        true
    }

    /// Record a failed load. The cache is left empty.
    ///
    /// Returns `false` if `ticket` has been superseded.
    pub fn fail(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.records = Arc::from(Vec::new());
        self.state = LoadState::Failed;
        self.loaded_at = None;
        true
    }

    /// BLAKE3 fingerprint of the cached records, in order.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for record in self.records.iter() {
            // Serializing a plain struct of strings cannot fail.
            let bytes = serde_json::to_vec(record).unwrap_or_default();
            hasher.update(&bytes);
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> FacilityRecord {
        FacilityRecord {
            id: id.to_string(),
            name: format!("Unidade {id}"),
            ..FacilityRecord::default()
        }
    }

    #[test]
    fn test_new_cache_is_empty_and_idle() {
        let cache = DatasetCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.state(), LoadState::Idle);
        assert!(cache.loaded_at().is_none());
    }

    #[test]
    fn test_complete_replaces_records() {
        let mut cache = DatasetCache::new();
        let ticket = cache.begin_load();
        assert_eq!(cache.state(), LoadState::Loading);

        assert!(cache.complete(ticket, vec![record("1"), record("2")]));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.state(), LoadState::Ready);
        assert!(cache.loaded_at().is_some());

        let ticket = cache.begin_load();
        assert!(cache.complete(ticket, vec![record("3")]));
        assert_eq!(cache.records()[0].id, "3");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fail_leaves_cache_empty() {
        let mut cache = DatasetCache::new();
        let ticket = cache.begin_load();
        assert!(cache.fail(ticket));
        assert!(cache.is_empty());
        assert_eq!(cache.state(), LoadState::Failed);
    }

    #[test]
    fn test_superseded_load_is_discarded() {
        let mut cache = DatasetCache::new();
        let slow = cache.begin_load();
        let fast = cache.begin_load();

        assert!(cache.complete(fast, vec![record("new")]));
        assert!(!cache.complete(slow, vec![record("old")]));
        assert_eq!(cache.records()[0].id, "new");

        assert!(!cache.fail(slow));
        assert_eq!(cache.state(), LoadState::Ready);
    }

    #[test]
    fn test_ticket_generations_increase() {
        let mut cache = DatasetCache::new();
        let a = cache.begin_load();
        let b = cache.begin_load();
        assert!(b.generation() > a.generation());
    }

    #[test]
    fn test_fingerprint_tracks_content_and_order() {
        let mut a = DatasetCache::new();
        let t = a.begin_load();
        a.complete(t, vec![record("1"), record("2")]);

        let mut b = DatasetCache::new();
        let t = b.begin_load();
        b.complete(t, vec![record("2"), record("1")]);

        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
    }

    #[test]
    fn test_load_state_display() {
        assert_eq!(LoadState::Loading.to_string(), "loading");
        assert_eq!(LoadState::Failed.to_string(), "failed");
    }
}
