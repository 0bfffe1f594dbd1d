//! Documents: one rendered file plus an optional overflow addendum
//!
//! An [`AlDocument`] pairs a [`DocumentSource`] (whatever produces the primary
//! rendering for a key such as "final" or "preview") with the overflow fields
//! of its template. When any field overflows and the document has an
//! addendum, the addendum pages are appended to the primary rendering.
//!
//! Renderings are memoized in the [`Session`] per document, key and format.

use crate::error::{AssemblyError, Result};
use crate::overflow::{display_value, AddendumField, AddendumFields, OverflowOptions};
use crate::session::{CacheKey, OutputFormat, Session};
use pdf_compose::{merge_documents, set_title, TextPdf};
use serde_json::Value;
use shared_types::{with_extension, AnswerStore, Artifact};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Everything a source needs to render one key of a document
pub struct RenderRequest<'a> {
    pub key: &'a str,
    pub session: &'a Session,
    pub document: &'a AlDocument,
}

impl RenderRequest<'_> {
    pub fn answers(&self) -> &dyn AnswerStore {
        self.session.answers()
    }
}

/// Produces the file behind a document
pub trait DocumentSource {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Artifact>;

    /// A PDF the host already produced, used when converting the primary
    /// rendering to PDF fails
    fn pdf_fallback(&self, _request: &RenderRequest<'_>) -> Option<Artifact> {
        None
    }

    /// `false` for files that must never be converted or combined
    fn transformable(&self) -> bool {
        true
    }
}

/// Whether a document or bundle takes part in the output
#[derive(Clone, Default)]
pub enum Enabled {
    #[default]
    Always,
    Fixed(bool),
    /// Computed from the answers once per page view
    When(Rc<dyn Fn(&dyn AnswerStore) -> bool>),
}

impl Enabled {
    pub fn when(predicate: impl Fn(&dyn AnswerStore) -> bool + 'static) -> Self {
        Enabled::When(Rc::new(predicate))
    }

    /// Enabled while the answer `name` is truthy
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::when(move |answers| answers.lookup(&name).is_some_and(is_truthy))
    }

    pub fn evaluate(&self, owner: &str, session: &mut Session) -> bool {
        match self {
            Enabled::Always => true,
            Enabled::Fixed(value) => *value,
            Enabled::When(predicate) => {
                if let Some(cached) = session.cached_enabled(owner) {
                    return cached;
                }
                let value = predicate(session.answers());
                tracing::debug!(owner, value, page_view = session.page_view(), "computed enabled");
                session.store_enabled(owner, value);
                value
            }
        }
    }
}

impl fmt::Debug for Enabled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enabled::Always => write!(f, "Always"),
            Enabled::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Enabled::When(_) => write!(f, "When(..)"),
        }
    }
}

impl From<bool> for Enabled {
    fn from(value: bool) -> Self {
        Enabled::Fixed(value)
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub struct AlDocument {
    name: String,
    pub filename: String,
    pub title: String,
    enabled: Enabled,
    has_addendum: bool,
    overflow_fields: AddendumFields,
    overflow_options: OverflowOptions,
    source: Box<dyn DocumentSource>,
    addendum: Option<Box<dyn DocumentSource>>,
}

impl fmt::Debug for AlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlDocument")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("title", &self.title)
            .field("enabled", &self.enabled)
            .field("has_addendum", &self.has_addendum)
            .field("overflow_fields", &self.overflow_fields.len())
            .finish()
    }
}

impl AlDocument {
    /// `name` identifies the document in session caches and must be unique
    /// within an interview
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        title: impl Into<String>,
        source: impl DocumentSource + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            title: title.into(),
            enabled: Enabled::Always,
            has_addendum: false,
            overflow_fields: AddendumFields::new(),
            overflow_options: OverflowOptions::default(),
            source: Box::new(source),
            addendum: None,
        }
    }

    pub fn with_enabled(mut self, enabled: impl Into<Enabled>) -> Self {
        self.enabled = enabled.into();
        self
    }

    /// Use a custom addendum instead of the generated text addendum
    pub fn with_addendum(mut self, addendum: impl DocumentSource + 'static) -> Self {
        self.addendum = Some(Box::new(addendum));
        self.has_addendum = true;
        self
    }

    pub fn has_addendum(mut self, has_addendum: bool) -> Self {
        self.has_addendum = has_addendum;
        self
    }

    pub fn with_overflow_fields(mut self, fields: AddendumFields) -> Self {
        self.overflow_fields = fields;
        self
    }

    pub fn add_overflow_field(mut self, field: AddendumField) -> Self {
        self.overflow_fields.insert(field);
        self
    }

    pub fn with_overflow_options(mut self, options: OverflowOptions) -> Self {
        self.overflow_options = options;
        self
    }

    /// Message appended to truncated values
    pub fn with_overflow_message(mut self, message: impl Into<String>) -> Self {
        self.overflow_options.message = message.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn overflow_fields(&self) -> &AddendumFields {
        &self.overflow_fields
    }

    pub fn overflow_options(&self) -> &OverflowOptions {
        &self.overflow_options
    }

    pub fn default_overflow_message(&self) -> &str {
        &self.overflow_options.message
    }

    pub fn is_enabled(&self, session: &mut Session) -> bool {
        self.enabled.evaluate(&self.name, session)
    }

    pub fn has_overflow(&self, answers: &dyn AnswerStore) -> bool {
        self.overflow_fields
            .has_overflow(answers, &self.overflow_options)
    }

    pub fn overflow(&self, answers: &dyn AnswerStore) -> Vec<&AddendumField> {
        self.overflow_fields.overflow(answers, &self.overflow_options)
    }

    pub fn need_addendum(&self, answers: &dyn AnswerStore) -> bool {
        self.has_addendum && self.has_overflow(answers)
    }

    fn options_with(&self, message: Option<&str>) -> OverflowOptions {
        match message {
            Some(message) => self.overflow_options.clone().with_message(message),
            None => self.overflow_options.clone(),
        }
    }

    /// Safe part of `field`. Fields that are not registered for overflow are
    /// returned whole.
    pub fn safe_value(
        &self,
        answers: &dyn AnswerStore,
        field: &str,
        message: Option<&str>,
    ) -> Value {
        match self.overflow_fields.get(field) {
            Some(f) => f.safe_value(answers, &self.options_with(message)),
            None => answers
                .lookup(field)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
        }
    }

    pub fn overflow_value(&self, answers: &dyn AnswerStore, field: &str) -> Value {
        match self.overflow_fields.get(field) {
            Some(f) => f.overflow_value(answers, &self.overflow_options),
            None => Value::String(String::new()),
        }
    }

    pub fn original_or_overflow_message(
        &self,
        answers: &dyn AnswerStore,
        field: &str,
        message: Option<&str>,
    ) -> String {
        match self.overflow_fields.get(field) {
            Some(f) => f.original_or_overflow_message(answers, &self.options_with(message)),
            None => answers.lookup(field).map(display_value).unwrap_or_default(),
        }
    }

    /// The document as one PDF (PDF/A when `pdfa`), primary pages followed by
    /// the addendum when needed
    pub fn render(
        &self,
        session: &mut Session,
        key: &str,
        refresh: bool,
        pdfa: bool,
    ) -> Result<Artifact> {
        let format = if pdfa { OutputFormat::PdfA } else { OutputFormat::Pdf };
        let cache_key = CacheKey::new(&self.name, key, format);
        if !refresh {
            if let Some(hit) = session.cached_artifact(&cache_key) {
                return Ok(hit.clone());
            }
        }
        let artifact = self.render_uncached(session, key, pdfa)?;
        session.store_artifact(cache_key, artifact.clone());
        Ok(artifact)
    }

    pub fn as_pdf(&self, session: &mut Session, key: &str, refresh: bool) -> Result<Artifact> {
        self.render(session, key, refresh, false)
    }

    fn render_uncached(&self, session: &Session, key: &str, pdfa: bool) -> Result<Artifact> {
        let request = RenderRequest {
            key,
            session,
            document: self,
        };
        let primary = self.source.render(&request)?;
        if !self.source.transformable() {
            return Ok(primary);
        }

        let primary = self.primary_pdf(&request, primary)?;
        let bytes = if self.need_addendum(session.answers()) {
            let addendum = self.addendum_pdf(&request)?;
            tracing::info!(document = %self.name, key, "appending addendum");
            merge_documents(vec![primary.bytes, addendum.bytes])?
        } else {
            primary.bytes
        };
        let bytes = set_title(&bytes, &self.title)?;

        let artifact = Artifact::pdf(with_extension(&self.filename, "pdf"), bytes)
            .with_title(self.title.clone());
        if pdfa {
            return session.converter().to_pdfa(&artifact);
        }
        Ok(artifact)
    }

    fn primary_pdf(&self, request: &RenderRequest<'_>, primary: Artifact) -> Result<Artifact> {
        match request.session.ensure_pdf(primary) {
            Ok(pdf) => Ok(pdf),
            Err(err) => match self.source.pdf_fallback(request) {
                Some(fallback) => {
                    tracing::warn!(
                        document = %self.name,
                        key = request.key,
                        error = %err,
                        "conversion failed, using host PDF rendering"
                    );
                    Ok(fallback)
                }
                None => Err(err),
            },
        }
    }

    fn addendum_pdf(&self, request: &RenderRequest<'_>) -> Result<Artifact> {
        let addendum = match &self.addendum {
            Some(source) => source.render(request)?,
            None => TextAddendum::default().render(request)?,
        };
        request.session.ensure_pdf(addendum)
    }

    /// The primary rendering followed by the addendum, as separate files
    pub fn as_list(&self, session: &Session, key: &str) -> Result<Vec<Artifact>> {
        let request = RenderRequest {
            key,
            session,
            document: self,
        };
        let primary = self.source.render(&request)?;
        if !self.source.transformable() {
            return Ok(vec![primary]);
        }
        let mut files = vec![self.primary_pdf(&request, primary)?];
        if self.need_addendum(session.answers()) {
            files.push(self.addendum_pdf(&request)?);
        }
        Ok(files)
    }

    /// The editable original when the source renders DOCX, otherwise the PDF
    pub fn as_docx(&self, session: &mut Session, key: &str, refresh: bool) -> Result<Artifact> {
        let cache_key = CacheKey::new(&self.name, key, OutputFormat::Docx);
        if !refresh {
            if let Some(hit) = session.cached_artifact(&cache_key) {
                return Ok(hit.clone());
            }
        }
        let primary = {
            let request = RenderRequest {
                key,
                session: &*session,
                document: self,
            };
            self.source.render(&request)?
        };
        if primary.is_docx() {
            let docx = primary.with_title(self.title.clone());
            session.store_artifact(cache_key, docx.clone());
            return Ok(docx);
        }
        self.render(session, key, refresh, false)
    }
}

/// Files the host already rendered, one per key
#[derive(Debug, Clone, Default)]
pub struct PreRendered {
    renderings: BTreeMap<String, Artifact>,
    pdf_renderings: BTreeMap<String, Artifact>,
}

impl PreRendered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, file: Artifact) -> Self {
        self.renderings.insert(key.into(), file);
        self
    }

    /// PDF produced alongside a DOCX rendering
    pub fn with_pdf_fallback(mut self, key: impl Into<String>, file: Artifact) -> Self {
        self.pdf_renderings.insert(key.into(), file);
        self
    }
}

impl DocumentSource for PreRendered {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Artifact> {
        self.renderings
            .get(request.key)
            .cloned()
            .ok_or_else(|| AssemblyError::MissingRendering {
                document: request.document.name().to_string(),
                key: request.key.to_string(),
            })
    }

    fn pdf_fallback(&self, request: &RenderRequest<'_>) -> Option<Artifact> {
        self.pdf_renderings.get(request.key).cloned()
    }
}

/// The same file for every key
#[derive(Debug, Clone)]
pub struct StaticDocument {
    pub file: Artifact,
}

impl StaticDocument {
    pub fn new(file: Artifact) -> Self {
        Self { file }
    }
}

impl DocumentSource for StaticDocument {
    fn render(&self, _request: &RenderRequest<'_>) -> Result<Artifact> {
        Ok(self.file.clone())
    }
}

/// A file handed out exactly as uploaded
#[derive(Debug, Clone)]
pub struct Untransformed {
    pub file: Artifact,
}

impl Untransformed {
    pub fn new(file: Artifact) -> Self {
        Self { file }
    }
}

impl DocumentSource for Untransformed {
    fn render(&self, _request: &RenderRequest<'_>) -> Result<Artifact> {
        Ok(self.file.clone())
    }

    fn transformable(&self) -> bool {
        false
    }
}

/// Renders through a host closure
pub struct FnSource<F>(pub F);

impl<F> FnSource<F>
where
    F: Fn(&RenderRequest<'_>) -> Result<Artifact>,
{
    pub fn new(render: F) -> Self {
        FnSource(render)
    }
}

impl<F> DocumentSource for FnSource<F>
where
    F: Fn(&RenderRequest<'_>) -> Result<Artifact>,
{
    fn render(&self, request: &RenderRequest<'_>) -> Result<Artifact> {
        (self.0)(request)
    }
}

/// Default addendum: every overflowing field under its own heading
#[derive(Debug, Clone, Default)]
pub struct TextAddendum {
    /// Title line on the first page; defaults to "Addendum to <title>"
    pub heading: Option<String>,
}

impl DocumentSource for TextAddendum {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Artifact> {
        let document = request.document;
        let answers = request.answers();
        let options = document.overflow_options();
        let title = format!("Addendum to {}", document.title);

        let mut pdf = TextPdf::new()
            .document_title(title.clone())
            .title(self.heading.clone().unwrap_or_else(|| title.clone()));
        for field in document.overflow(answers) {
            pdf = pdf.heading(field.heading());
            if let Some(table) = field.overflow_table(answers, options) {
                for row in &table.rows {
                    let cells: Vec<String> = table
                        .columns
                        .iter()
                        .zip(row)
                        .map(|(column, cell)| format!("{}: {}", column.label, cell))
                        .collect();
                    pdf = pdf.paragraph(cells.join("; "));
                }
            } else {
                match field.overflow_value(answers, options) {
                    Value::Array(items) => {
                        for item in &items {
                            pdf = pdf.paragraph(format!("\u{2022} {}", display_value(item)));
                        }
                    }
                    other => pdf = pdf.paragraph(display_value(&other)),
                }
            }
            pdf = pdf.blank_line();
        }

        let filename = format!("{}_addendum.pdf", document.filename.trim_end_matches(".pdf"));
        Ok(Artifact::pdf(filename, pdf.render()?).with_title(title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FormatConverter;
    use lopdf::Document;
    use serde_json::json;
    use shared_types::{Answers, FileKind};
    use std::cell::Cell;

    fn pdf(text: &str) -> Artifact {
        Artifact::pdf("main.pdf", TextPdf::new().paragraph(text).render().unwrap())
    }

    fn session_with(value: Value) -> Session {
        Session::new(Answers::from_value(value))
    }

    fn letter(trigger: usize) -> AlDocument {
        AlDocument::new("letter", "letter", "Letter", StaticDocument::new(pdf("body")))
            .has_addendum(true)
            .add_overflow_field(AddendumField::new("story", trigger))
    }

    struct PdfAConverter;

    impl FormatConverter for PdfAConverter {
        fn to_pdf(&self, file: &Artifact) -> Result<Artifact> {
            Ok(file.clone())
        }

        fn to_pdfa(&self, file: &Artifact) -> Result<Artifact> {
            Ok(file.clone().with_filename("pdfa.pdf"))
        }
    }

    #[test]
    fn test_render_without_overflow_is_single_file() {
        let mut session = session_with(json!({"story": "short"}));
        let doc = letter(50);
        let out = doc.render(&mut session, "final", false, false).unwrap();
        assert_eq!(out.filename, "letter.pdf");
        assert_eq!(out.title, "Letter");
        assert_eq!(pdf_compose::page_count(&out.bytes).unwrap(), 1);
    }

    #[test]
    fn test_render_appends_addendum_on_overflow() {
        let mut session = session_with(json!({"story": "a story far too long for the box"}));
        let doc = letter(10);
        assert!(doc.need_addendum(session.answers()));
        let out = doc.render(&mut session, "final", false, false).unwrap();
        assert_eq!(pdf_compose::page_count(&out.bytes).unwrap(), 2);
        assert_eq!(doc.as_list(&session, "final").unwrap().len(), 2);
    }

    #[test]
    fn test_no_addendum_flag_means_no_addendum() {
        let session = session_with(json!({"story": "a story far too long for the box"}));
        let doc = letter(10).has_addendum(false);
        assert!(doc.has_overflow(session.answers()));
        assert!(!doc.need_addendum(session.answers()));
    }

    #[test]
    fn test_render_is_cached_until_refresh() {
        let mut session = session_with(json!({"story": "short"}));
        let doc = letter(10);
        let first = doc.render(&mut session, "final", false, false).unwrap();
        session.replace_answers(Answers::from_value(json!({"story": "now it is much too long"})));
        let cached = doc.render(&mut session, "final", false, false).unwrap();
        assert_eq!(first, cached);
        let fresh = doc.render(&mut session, "final", true, false).unwrap();
        assert_eq!(pdf_compose::page_count(&fresh.bytes).unwrap(), 2);
    }

    #[test]
    fn test_keys_render_separately() {
        let source = PreRendered::new()
            .with("final", pdf("signed"))
            .with("preview", pdf("unsigned"));
        let doc = AlDocument::new("form", "form.pdf", "Form", source);
        let mut session = Session::default();
        let final_pdf = doc.render(&mut session, "final", false, false).unwrap();
        let preview = doc.render(&mut session, "preview", false, false).unwrap();
        assert_ne!(final_pdf.bytes, preview.bytes);
        assert_eq!(session.cached_artifacts(), 2);
    }

    #[test]
    fn test_missing_rendering_is_an_error() {
        let doc = AlDocument::new("form", "form.pdf", "Form", PreRendered::new());
        let err = doc.render(&mut Session::default(), "final", false, false).unwrap_err();
        assert!(matches!(err, AssemblyError::MissingRendering { ref key, .. } if key == "final"));
    }

    #[test]
    fn test_docx_falls_back_to_host_pdf() {
        let source = PreRendered::new()
            .with("final", Artifact::docx("form.docx", b"PK".to_vec()))
            .with_pdf_fallback("final", pdf("converted by host"));
        let doc = AlDocument::new("form", "form.docx", "Form", source);
        let mut session = Session::default();
        let out = doc.render(&mut session, "final", false, false).unwrap();
        assert!(out.is_pdf());
        assert_eq!(out.filename, "form.pdf");
    }

    #[test]
    fn test_docx_without_fallback_propagates_conversion_error() {
        let source = StaticDocument::new(Artifact::docx("form.docx", b"PK".to_vec()));
        let doc = AlDocument::new("form", "form.docx", "Form", source);
        let err = doc.render(&mut Session::default(), "final", false, false).unwrap_err();
        assert!(matches!(err, AssemblyError::Conversion(_)));
    }

    #[test]
    fn test_as_docx_returns_editable_original() {
        let source = PreRendered::new()
            .with("final", Artifact::docx("form.docx", b"PK".to_vec()))
            .with_pdf_fallback("final", pdf("converted"));
        let doc = AlDocument::new("form", "form.docx", "Form", source);
        let mut session = Session::default();
        let docx = doc.as_docx(&mut session, "final", false).unwrap();
        assert!(docx.is_docx());
        assert_eq!(docx.title, "Form");

        let pdf_only = AlDocument::new("p", "p.pdf", "P", StaticDocument::new(pdf("x")));
        assert!(pdf_only.as_docx(&mut session, "final", false).unwrap().is_pdf());
    }

    #[test]
    fn test_untransformed_file_passes_through() {
        let upload = Artifact::new(
            "photo.jpg",
            FileKind::from_filename("photo.jpg"),
            b"\xFF\xD8".to_vec(),
        );
        let doc = AlDocument::new("photo", "photo.jpg", "Photo", Untransformed::new(upload.clone()))
            .has_addendum(true);
        let out = doc.render(&mut Session::default(), "final", false, false).unwrap();
        assert_eq!(out, upload);
    }

    #[test]
    fn test_pdfa_uses_converter() {
        let doc = letter(100);
        let mut plain = Session::default();
        assert!(doc.render(&mut plain, "final", false, true).is_err());

        let mut session = Session::default().with_converter(PdfAConverter);
        let out = doc.render(&mut session, "final", false, true).unwrap();
        assert_eq!(out.filename, "pdfa.pdf");
    }

    #[test]
    fn test_enabled_computed_once_per_page_view() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let doc = letter(10).with_enabled(Enabled::when(move |answers| {
            counter.set(counter.get() + 1);
            answers.is_defined("story")
        }));
        let mut session = session_with(json!({"story": "x"}));
        assert!(doc.is_enabled(&mut session));
        assert!(doc.is_enabled(&mut session));
        assert_eq!(calls.get(), 1);

        session.replace_answers(Answers::new());
        assert!(doc.is_enabled(&mut session));
        session.next_page_view();
        assert!(!doc.is_enabled(&mut session));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_enabled_field_and_fixed() {
        let mut session = session_with(json!({"wants_letter": true, "empty": ""}));
        assert!(Enabled::field("wants_letter").evaluate("a", &mut session));
        assert!(!Enabled::field("empty").evaluate("b", &mut session));
        assert!(!Enabled::field("missing").evaluate("c", &mut session));
        assert!(!Enabled::from(false).evaluate("d", &mut session));
        assert!(Enabled::Always.evaluate("e", &mut session));
    }

    #[test]
    fn test_field_helpers_use_default_message() {
        let answers = Answers::from_value(json!({
            "story": "one two three four five",
            "other": "kept"
        }));
        let doc = letter(12).with_overflow_message("...");
        assert_eq!(doc.safe_value(&answers, "story", None), json!("one two t..."));
        assert_eq!(doc.safe_value(&answers, "story", Some("")), json!("one two thre"));
        assert_eq!(doc.overflow_value(&answers, "story"), json!("e four five"));
        assert_eq!(doc.original_or_overflow_message(&answers, "story", None), "...");
        assert_eq!(doc.safe_value(&answers, "other", None), json!("kept"));
    }

    #[test]
    fn test_text_addendum_lists_overflow() {
        let session = session_with(json!({
            "story": "a story far too long for the box",
            "children": ["Ann", "Bob", "Cy"]
        }));
        let doc = letter(10)
            .add_overflow_field(AddendumField::new("children", 1usize).with_label("Children"));
        let request = RenderRequest {
            key: "final",
            session: &session,
            document: &doc,
        };
        let addendum = TextAddendum::default().render(&request).unwrap();
        assert_eq!(addendum.filename, "letter_addendum.pdf");
        assert_eq!(addendum.title, "Addendum to Letter");
        let parsed = Document::load_mem(&addendum.bytes).unwrap();
        let page_id = parsed.get_pages()[&1];
        let content = parsed.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content).into_owned();
        assert!(text.contains("(Children)"));
        assert!(text.contains("Bob)"));
        assert!(!text.contains("Ann"));
    }

    #[test]
    fn test_custom_addendum_source() {
        let mut session = session_with(json!({"story": "a story far too long for the box"}));
        let doc = letter(10).with_addendum(FnSource::new(|_| Ok(pdf("custom"))));
        let out = doc.render(&mut session, "final", false, false).unwrap();
        assert_eq!(pdf_compose::page_count(&out.bytes).unwrap(), 2);
    }
}
