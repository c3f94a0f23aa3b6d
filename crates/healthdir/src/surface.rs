//! Display surfaces: where the rendered list area ends up.
//!
//! Each render replaces the whole list area. A surface never appends.

use std::io::Write;
use std::path::{Path, PathBuf};

use maud::{Markup, Render};
use tracing::trace;

use crate::error::{Error, Result};
use crate::feedback::FeedbackForm;
use crate::render::Page;

/// A container whose whole contents can be replaced with new markup.
pub trait DisplaySurface {
    /// Replace the current contents with `markup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be written.
    fn replace(&mut self, markup: Markup) -> Result<()>;

    /// Note the text currently in the search box.
    ///
    /// Surfaces that show the search box override this; the default
    /// ignores it.
    fn set_term(&mut self, _term: &str) {}
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for &mut D {
    fn replace(&mut self, markup: Markup) -> Result<()> {
        (**self).replace(markup)
    }

    fn set_term(&mut self, term: &str) {
        (**self).set_term(term);
    }
}

/// Keeps the latest markup in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    content: String,
    replacements: usize,
}

impl MemorySurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current contents.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// How many times the contents were replaced.
    #[must_use]
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl DisplaySurface for MemorySurface {
    fn replace(&mut self, markup: Markup) -> Result<()> {
        self.content = markup.into_string();
        self.replacements += 1;
        Ok(())
    }
}

/// Writes each new list area to a stream, one render per line.
#[derive(Debug)]
pub struct WriterSurface<W> {
    writer: W,
}

impl<W: Write> WriterSurface<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DisplaySurface for WriterSurface<W> {
    fn replace(&mut self, markup: Markup) -> Result<()> {
        writeln!(self.writer, "{}", markup.into_string())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes a full HTML page around the list area to a file.
///
/// The page carries an empty feedback form. The file is rewritten through
/// a temporary sibling and renamed into place, so a reader never sees a
/// half-written page.
#[derive(Debug)]
pub struct FileSurface {
    path: PathBuf,
    title: String,
    term: String,
}

impl FileSurface {
    /// Create a surface that writes to `path`.
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            term: String::new(),
        }
    }

    /// Target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DisplaySurface for FileSurface {
    fn replace(&mut self, markup: Markup) -> Result<()> {
        let feedback = FeedbackForm::new();
        let page = Page {
            title: &self.title,
            term: &self.term,
            list: &markup,
            feedback: &feedback,
        }
        .render()
        .into_string();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = self.temp_path();
        std::fs::write(&tmp, page)?;
        std::fs::rename(&tmp, &self.path)?;
        trace!(path = %self.path.display(), "Wrote page");
        Ok(())
    }

    fn set_term(&mut self, term: &str) {
        term.clone_into(&mut self.term);
    }
}
