//! Per-interview session state
//!
//! A [`Session`] carries the answer store, the host format converter, the
//! page-view counter and the memoization maps for rendered artifacts and
//! computed `enabled` flags. One request uses a session at a time.

use crate::error::Result;
use crate::host::{FormatConverter, PassthroughConverter};
use shared_types::{AnswerStore, Answers, Artifact};
use std::collections::HashMap;

/// Output flavour an artifact was rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Pdf,
    PdfA,
    Docx,
    Zip,
    ZipWithOriginals,
}

/// Identifies one cached rendering: the owning document or bundle, the
/// rendering key ("final", "preview") and the format
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub owner: String,
    pub key: String,
    pub format: OutputFormat,
}

impl CacheKey {
    pub fn new(owner: &str, key: &str, format: OutputFormat) -> Self {
        Self {
            owner: owner.to_string(),
            key: key.to_string(),
            format,
        }
    }
}

pub struct Session {
    answers: Box<dyn AnswerStore>,
    converter: Box<dyn FormatConverter>,
    page_view: u64,
    enabled: HashMap<String, (u64, bool)>,
    artifacts: HashMap<CacheKey, Artifact>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Answers::new())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("page_view", &self.page_view)
            .field("enabled", &self.enabled.len())
            .field("artifacts", &self.artifacts.len())
            .finish()
    }
}

impl Session {
    pub fn new(answers: impl AnswerStore + 'static) -> Self {
        Self {
            answers: Box::new(answers),
            converter: Box::new(PassthroughConverter),
            page_view: 0,
            enabled: HashMap::new(),
            artifacts: HashMap::new(),
        }
    }

    pub fn with_converter(mut self, converter: impl FormatConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn answers(&self) -> &dyn AnswerStore {
        self.answers.as_ref()
    }

    /// Swap in a new answer store, e.g. after the user submits a page.
    /// Cached `enabled` flags survive until the next page view.
    pub fn replace_answers(&mut self, answers: impl AnswerStore + 'static) {
        self.answers = Box::new(answers);
    }

    pub fn converter(&self) -> &dyn FormatConverter {
        self.converter.as_ref()
    }

    pub fn page_view(&self) -> u64 {
        self.page_view
    }

    /// Start a new page view; computed `enabled` flags become stale
    pub fn next_page_view(&mut self) {
        self.page_view += 1;
        tracing::debug!(page_view = self.page_view, "new page view");
    }

    /// Drop every cached rendering
    pub fn clear_cache(&mut self) {
        self.artifacts.clear();
    }

    pub fn cached_artifacts(&self) -> usize {
        self.artifacts.len()
    }

    pub(crate) fn cached_artifact(&self, key: &CacheKey) -> Option<&Artifact> {
        self.artifacts.get(key)
    }

    pub(crate) fn store_artifact(&mut self, key: CacheKey, artifact: Artifact) {
        self.artifacts.insert(key, artifact);
    }

    /// Enabled flag computed for `owner` during the current page view
    pub(crate) fn cached_enabled(&self, owner: &str) -> Option<bool> {
        match self.enabled.get(owner) {
            Some((view, value)) if *view == self.page_view => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn store_enabled(&mut self, owner: &str, value: bool) {
        self.enabled
            .insert(owner.to_string(), (self.page_view, value));
    }

    /// Convert `file` to PDF with the host converter unless it already is one
    pub fn ensure_pdf(&self, file: Artifact) -> Result<Artifact> {
        if file.is_pdf() {
            return Ok(file);
        }
        tracing::debug!(file = %file.filename, kind = file.kind.mimetype(), "converting to PDF");
        self.converter.to_pdf(&file)
    }
}
