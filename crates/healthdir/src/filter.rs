//! Search filtering over the loaded dataset.
//!
//! A linear, stable scan: each record is kept when its name, neighborhood or
//! any of its services contains the normalized term. An empty term keeps
//! everything.

use crate::facility::FacilityRecord;

/// A search term after lower-casing and trimming.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Normalize raw input text.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// The normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the term normalized to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check a record against this term.
    ///
    /// An empty term matches every record.
    #[must_use]
    pub fn matches(&self, record: &FacilityRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        let term = self.as_str();
        contains(&record.name, term)
            || contains(record.neighborhood(), term)
            || record.services.iter().any(|s| contains(s, term))
    }
}

fn contains(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

/// Return the records of `dataset` matching `term`, in dataset order.
#[must_use]
pub fn filter<'a>(dataset: &'a [FacilityRecord], term: &str) -> Vec<&'a FacilityRecord> {
    let term = SearchTerm::new(term);
    if term.is_empty() {
        return dataset.iter().collect();
    }
    dataset.iter().filter(|r| term.matches(r)).collect()
}
