//! `healthdir` - A searchable directory of health-care facilities
//!
//! The directory is loaded once from a document store, cached in memory, and
//! filtered locally on every search. Matches are rendered as HTML cards onto
//! a display surface.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dataset;
pub mod debounce;
pub mod directory;
pub mod error;
pub mod facility;
pub mod feedback;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod render;
pub mod session;
pub mod store;
pub mod surface;

pub use config::Config;
pub use dataset::{DatasetCache, LoadState, LoadTicket};
pub use directory::Directory;
pub use error::{Error, Result};
pub use facility::{Document, FacilityRecord};
pub use feedback::{FeedbackForm, FeedbackSubmission, FeedbackSubmitter, SubmitError};
pub use filter::{filter, SearchTerm};
pub use loader::{LoadError, Loader};
pub use logging::init_logging;
pub use session::{run_session, SessionSummary};
pub use store::{open_store, DocumentStore};
pub use surface::{DisplaySurface, FileSurface, MemorySurface, WriterSurface};
