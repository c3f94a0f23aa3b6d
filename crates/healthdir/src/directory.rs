//! The filter-and-render pipeline.
//!
//! [`Directory`] owns the dataset cache and the display surface. It is the
//! only writer of either: loads replace the cache, searches read it, and
//! every state change re-renders the whole list area.

use tracing::{debug, warn};

use crate::dataset::{DatasetCache, LoadState, LoadTicket};
use crate::facility::FacilityRecord;
use crate::filter::filter;
use crate::loader::{LoadError, Loader};
use crate::render::{render_load_error, render_loading, render_records};
use crate::store::DocumentStore;
use crate::surface::DisplaySurface;

/// Dataset cache plus the surface it is rendered to.
#[derive(Debug)]
pub struct Directory<D> {
    cache: DatasetCache,
    surface: D,
    term: String,
    visible: usize,
}

impl<D: DisplaySurface> Directory<D> {
    /// Create a directory with an empty cache.
    pub fn new(surface: D) -> Self {
        Self {
            cache: DatasetCache::new(),
            surface,
            term: String::new(),
            visible: 0,
        }
    }

    /// The cache.
    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Every cached record.
    pub fn records(&self) -> &[FacilityRecord] {
        self.cache.records()
    }

    /// The display surface.
    pub fn surface(&self) -> &D {
        &self.surface
    }

    /// Last search text received.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Cards shown by the last render.
    pub fn visible_count(&self) -> usize {
        self.visible
    }

    fn show(&mut self, markup: maud::Markup) {
        if let Err(e) = self.surface.replace(markup) {
            warn!(error = %e, "Failed to update display surface");
        }
    }

    /// Show the loading state.
    pub fn show_loading(&mut self) {
        self.visible = 0;
        self.show(render_loading());
    }

    /// Start a load: take a ticket and show the loading state.
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = self.cache.begin_load();
        self.show_loading();
        ticket
    }

    /// Apply the outcome of a load started with `ticket`.
    ///
    /// Success replaces the cache and renders the full, unfiltered set.
    /// Failure empties the cache and shows the load-error message. Outcomes
    /// of superseded loads are dropped. Returns whether the outcome was
    /// applied.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Vec<FacilityRecord>, LoadError>,
    ) -> bool {
        match outcome {
            Ok(records) => {
                if !self.cache.complete(ticket, records) {
                    return false;
                }
                self.visible = self.cache.len();
                let markup = render_records(Some(self.cache.records()));
                self.show(markup);
                true
            }
            Err(e) => {
                if !self.cache.fail(ticket) {
                    return false;
                }
                debug!(error = %e, "Showing load error");
                self.visible = 0;
                self.show(render_load_error());
                true
            }
        }
    }

    /// Load the dataset through `loader` and render the result.
    pub async fn load<S: DocumentStore>(&mut self, loader: &Loader<S>) -> LoadState {
        let ticket = self.begin_load();
        let outcome = loader.load().await;
        self.finish_load(ticket, outcome);
        self.cache.state()
    }

    /// Handle one change of the search box.
    ///
    /// Filters whatever the cache holds right now. Before a load completes
    /// that is nothing, which shows the no-results message. Returns the
    /// number of matching records.
    pub fn on_search_input(&mut self, text: &str) -> usize {
        text.clone_into(&mut self.term);
        self.surface.set_term(text);

        let matches = filter(self.cache.records(), text);
        let count = matches.len();
        let markup = render_records(Some(matches.as_slice()));
        self.visible = count;
        self.show(markup);

        debug!(term = text, count, "Search");
        count
    }
}
