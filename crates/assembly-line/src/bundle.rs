//! Bundles: ordered, nestable collections of documents
//!
//! A bundle flattens its enabled children into one document list and hands
//! it out as a single merged PDF, a list of files, a zip archive or an email.
//! Every output is memoized in the [`Session`] per bundle, key and format.

use crate::document::{AlDocument, Enabled};
use crate::error::{AssemblyError, Result};
use crate::host::{EmailMessage, EmailTemplate, Mailer};
use crate::session::{CacheKey, OutputFormat, Session};
use pdf_compose::{merge_documents, set_title};
use shared_types::{with_extension, Artifact, FileKind};
use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Write};
use std::rc::Rc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone)]
pub enum BundleItem {
    Document(Rc<AlDocument>),
    Bundle(Rc<DocumentBundle>),
}

impl BundleItem {
    pub fn is_enabled(&self, session: &mut Session) -> bool {
        match self {
            BundleItem::Document(doc) => doc.is_enabled(session),
            BundleItem::Bundle(bundle) => bundle.is_enabled(session),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentBundle {
    name: String,
    pub filename: String,
    pub title: String,
    enabled: Enabled,
    items: Vec<BundleItem>,
    email_template: Option<EmailTemplate>,
}

impl DocumentBundle {
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            title: title.into(),
            enabled: Enabled::Always,
            items: Vec::new(),
            email_template: None,
        }
    }

    pub fn with_document(mut self, document: Rc<AlDocument>) -> Self {
        self.items.push(BundleItem::Document(document));
        self
    }

    pub fn with_bundle(mut self, bundle: Rc<DocumentBundle>) -> Self {
        self.items.push(BundleItem::Bundle(bundle));
        self
    }

    pub fn with_enabled(mut self, enabled: impl Into<Enabled>) -> Self {
        self.enabled = enabled.into();
        self
    }

    pub fn with_email_template(mut self, template: EmailTemplate) -> Self {
        self.email_template = Some(template);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[BundleItem] {
        &self.items
    }

    /// Bundles share session caches with documents, so keep their keys apart
    fn cache_owner(&self) -> String {
        format!("bundle:{}", self.name)
    }

    fn cache_key(&self, key: &str, format: OutputFormat) -> CacheKey {
        CacheKey::new(&self.cache_owner(), key, format)
    }

    /// Enabled when its own flag is set and at least one child is enabled
    pub fn is_enabled(&self, session: &mut Session) -> bool {
        self.enabled.evaluate(&self.cache_owner(), session)
            && self.items.iter().any(|item| item.is_enabled(session))
    }

    /// Enabled top-level children
    pub fn enabled_items(&self, session: &mut Session) -> Vec<BundleItem> {
        self.items
            .iter()
            .filter(|item| item.is_enabled(session))
            .cloned()
            .collect()
    }

    /// Enabled leaf documents, nested bundles flattened in order
    pub fn enabled_documents(&self, session: &mut Session) -> Vec<Rc<AlDocument>> {
        let mut documents = Vec::new();
        for item in self.enabled_items(session) {
            match item {
                BundleItem::Document(doc) => documents.push(doc),
                BundleItem::Bundle(bundle) => documents.extend(bundle.enabled_documents(session)),
            }
        }
        documents
    }

    /// All enabled documents merged into one PDF.
    ///
    /// `None` when nothing is enabled. A single document is returned exactly
    /// as that document renders it.
    pub fn as_pdf(
        &self,
        session: &mut Session,
        key: &str,
        refresh: bool,
    ) -> Result<Option<Artifact>> {
        let documents = self.enabled_documents(session);
        match documents.as_slice() {
            [] => {
                tracing::debug!(bundle = %self.name, key, "no enabled documents");
                return Ok(None);
            }
            [only] => return only.render(session, key, refresh, false).map(Some),
            _ => {}
        }

        let cache_key = self.cache_key(key, OutputFormat::Pdf);
        if !refresh {
            if let Some(hit) = session.cached_artifact(&cache_key) {
                return Ok(Some(hit.clone()));
            }
        }

        let mut parts = Vec::with_capacity(documents.len());
        for doc in &documents {
            let file = doc.render(session, key, refresh, false)?;
            if !file.is_pdf() {
                tracing::warn!(
                    bundle = %self.name,
                    document = %doc.name(),
                    kind = file.kind.mimetype(),
                    "skipping file that is not a PDF"
                );
                continue;
            }
            parts.push(file.bytes);
        }
        if parts.is_empty() {
            return Ok(None);
        }

        let count = parts.len();
        let merged = set_title(&merge_documents(parts)?, &self.title)?;
        let artifact = Artifact::pdf(with_extension(&self.filename, "pdf"), merged)
            .with_title(self.title.clone());
        tracing::info!(bundle = %self.name, key, documents = count, "merged bundle");
        session.store_artifact(cache_key, artifact.clone());
        Ok(Some(artifact))
    }

    pub fn preview(&self, session: &mut Session) -> Result<Option<Artifact>> {
        self.as_pdf(session, "preview", false)
    }

    /// One file per enabled leaf document
    pub fn as_flat_list(
        &self,
        session: &mut Session,
        key: &str,
        refresh: bool,
    ) -> Result<Vec<Artifact>> {
        self.enabled_documents(session)
            .iter()
            .map(|doc| doc.render(session, key, refresh, false))
            .collect()
    }

    /// One PDF per enabled top-level item; nested bundles are merged
    pub fn as_pdf_list(
        &self,
        session: &mut Session,
        key: &str,
        refresh: bool,
    ) -> Result<Vec<Artifact>> {
        let mut files = Vec::new();
        for item in self.enabled_items(session) {
            match item {
                BundleItem::Document(doc) => files.push(doc.render(session, key, refresh, false)?),
                BundleItem::Bundle(bundle) => {
                    if let Some(pdf) = bundle.as_pdf(session, key, refresh)? {
                        files.push(pdf);
                    }
                }
            }
        }
        Ok(files)
    }

    /// Editable versions where the document has one, PDFs otherwise
    pub fn as_editable_list(
        &self,
        session: &mut Session,
        key: &str,
        refresh: bool,
    ) -> Result<Vec<Artifact>> {
        self.enabled_documents(session)
            .iter()
            .map(|doc| doc.as_docx(session, key, refresh))
            .collect()
    }

    /// Zip archive of the flat list, plus each DOCX original when
    /// `include_original`
    pub fn as_zip(
        &self,
        session: &mut Session,
        key: &str,
        include_original: bool,
        refresh: bool,
    ) -> Result<Artifact> {
        let format = if include_original {
            OutputFormat::ZipWithOriginals
        } else {
            OutputFormat::Zip
        };
        let cache_key = self.cache_key(key, format);
        if !refresh {
            if let Some(hit) = session.cached_artifact(&cache_key) {
                return Ok(hit.clone());
            }
        }

        let mut files = Vec::new();
        for doc in self.enabled_documents(session) {
            files.push(doc.render(session, key, refresh, false)?);
            if include_original {
                let editable = doc.as_docx(session, key, refresh)?;
                if editable.is_docx() {
                    files.push(editable);
                }
            }
        }

        let bytes = write_zip(&files)?;
        let artifact = Artifact::new(
            with_extension(&self.filename, "zip"),
            FileKind::from_filename("bundle.zip"),
            bytes,
        )
        .with_title(self.title.clone());
        tracing::info!(bundle = %self.name, key, files = files.len(), "wrote zip archive");
        session.store_artifact(cache_key, artifact.clone());
        Ok(artifact)
    }

    /// Send the bundle as attachments through the host mailer. The bundle's
    /// own template is used when `template` is `None`; an empty subject
    /// falls back to the bundle title.
    pub fn send_email(
        &self,
        session: &mut Session,
        mailer: &dyn Mailer,
        to: &[String],
        key: &str,
        editable: bool,
        template: Option<&EmailTemplate>,
    ) -> Result<()> {
        if to.is_empty() {
            return Err(AssemblyError::Mail(format!(
                "no recipients for bundle '{}'",
                self.name
            )));
        }
        let attachments = if editable {
            self.as_editable_list(session, key, false)?
        } else {
            self.as_flat_list(session, key, false)?
        };
        let template = template
            .or(self.email_template.as_ref())
            .cloned()
            .unwrap_or_default();
        let subject = if template.subject.is_empty() {
            self.title.clone()
        } else {
            template.subject
        };

        let message = EmailMessage {
            to: to.to_vec(),
            subject,
            body: template.body,
            attachments,
        };
        mailer.send(&message)?;
        tracing::info!(
            bundle = %self.name,
            recipients = message.to.len(),
            attachments = message.attachments.len(),
            "sent bundle by email"
        );
        Ok(())
    }
}

fn write_zip(files: &[Artifact]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();
    for file in files {
        writer.start_file(unique_name(&mut used, &file.filename), options)?;
        writer.write_all(&file.bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// `name`, or `name` with a counter before the extension when taken
fn unique_name(used: &mut HashSet<String>, name: &str) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    let mut candidate = name.to_string();
    let mut counter = 1;
    while used.contains(&candidate) {
        candidate = format!("{}_{}{}", stem, counter, ext);
        counter += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Named bundles an interview offers for download or email
#[derive(Debug, Clone, Default)]
pub struct BundleSet {
    bundles: BTreeMap<String, Rc<DocumentBundle>>,
}

impl BundleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bundle: Rc<DocumentBundle>) {
        self.bundles.insert(bundle.name().to_string(), bundle);
    }

    pub fn get(&self, name: &str) -> Result<&Rc<DocumentBundle>> {
        self.bundles
            .get(name)
            .ok_or_else(|| AssemblyError::UnknownBundle(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn preview(&self, session: &mut Session, name: &str) -> Result<Option<Artifact>> {
        self.get(name)?.preview(session)
    }

    /// The final merged PDF of a bundle, for attaching to a message
    pub fn as_attachment(&self, session: &mut Session, name: &str) -> Result<Option<Artifact>> {
        self.get(name)?.as_pdf(session, "final", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PreRendered, StaticDocument};
    use pdf_compose::{page_count, TextPdf};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared_types::Answers;
    use std::cell::RefCell;
    use std::io::Read;

    fn doc(name: &str, pages: usize) -> Rc<AlDocument> {
        let mut text = TextPdf::new();
        for page in 0..pages {
            if page > 0 {
                text = text.page_break();
            }
            text = text.paragraph(format!("{} page {}", name, page + 1));
        }
        let file = Artifact::pdf(format!("{}.pdf", name), text.render().unwrap());
        Rc::new(AlDocument::new(name, name, name.to_uppercase(), StaticDocument::new(file)))
    }

    fn docx_doc(name: &str) -> Rc<AlDocument> {
        let fallback = Artifact::pdf(
            format!("{}.pdf", name),
            TextPdf::new().paragraph(name).render().unwrap(),
        );
        let source = PreRendered::new()
            .with("final", Artifact::docx(format!("{}.docx", name), b"PK\x03\x04".to_vec()))
            .with_pdf_fallback("final", fallback);
        Rc::new(AlDocument::new(name, name, name, source))
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: RefCell<Vec<EmailMessage>>,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, message: &EmailMessage) -> Result<()> {
            self.sent.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    fn zip_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_empty_bundle_has_no_pdf() {
        let bundle = DocumentBundle::new("b", "b", "Bundle")
            .with_document(Rc::new(
                AlDocument::new(
                    "off",
                    "off",
                    "Off",
                    StaticDocument::new(Artifact::pdf("x.pdf", vec![])),
                )
                .with_enabled(false),
            ));
        let mut session = Session::default();
        assert!(bundle.as_pdf(&mut session, "final", false).unwrap().is_none());
        assert!(!bundle.is_enabled(&mut session));
    }

    #[test]
    fn test_single_document_is_untouched() {
        let only = doc("motion", 2);
        let bundle = DocumentBundle::new("b", "b", "Bundle").with_document(Rc::clone(&only));
        let mut session = Session::default();
        let direct = only.render(&mut session, "final", false, false).unwrap();
        let bundled = bundle.as_pdf(&mut session, "final", false).unwrap().unwrap();
        assert_eq!(bundled, direct);
    }

    #[test]
    fn test_merges_enabled_documents_in_order() {
        let bundle = DocumentBundle::new("b", "packet", "Court Packet")
            .with_document(doc("motion", 2))
            .with_document(doc("affidavit", 1))
            .with_document(Rc::new(
                AlDocument::new(
                    "skip",
                    "skip",
                    "Skip",
                    StaticDocument::new(Artifact::pdf("s.pdf", vec![])),
                )
                .with_enabled(false),
            ));
        let mut session = Session::default();
        let pdf = bundle.as_pdf(&mut session, "final", false).unwrap().unwrap();
        assert_eq!(pdf.filename, "packet.pdf");
        assert_eq!(pdf.title, "Court Packet");
        assert_eq!(page_count(&pdf.bytes).unwrap(), 3);
    }

    #[test]
    fn test_nested_bundles_flatten() {
        let inner = Rc::new(
            DocumentBundle::new("inner", "inner", "Inner")
                .with_document(doc("b", 1))
                .with_document(doc("c", 1)),
        );
        let outer = DocumentBundle::new("outer", "outer", "Outer")
            .with_document(doc("a", 1))
            .with_bundle(inner);
        let mut session = Session::default();
        let names: Vec<String> = outer
            .enabled_documents(&mut session)
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(outer.as_flat_list(&mut session, "final", false).unwrap().len(), 3);
        assert_eq!(outer.as_pdf_list(&mut session, "final", false).unwrap().len(), 2);
    }

    #[test]
    fn test_disabled_sub_bundle_is_skipped() {
        let inner = Rc::new(
            DocumentBundle::new("inner", "inner", "Inner")
                .with_document(doc("b", 1))
                .with_enabled(Enabled::field("include_inner")),
        );
        let outer = DocumentBundle::new("outer", "outer", "Outer")
            .with_document(doc("a", 1))
            .with_bundle(inner);
        let mut session = Session::new(Answers::from_value(json!({"include_inner": false})));
        assert_eq!(outer.enabled_documents(&mut session).len(), 1);
    }

    #[test]
    fn test_merged_pdf_is_cached() {
        let bundle = DocumentBundle::new("b", "b", "B")
            .with_document(doc("one", 1))
            .with_document(doc("two", 1));
        let mut session = Session::default();
        let first = bundle.as_pdf(&mut session, "final", false).unwrap();
        let cached = session.cached_artifacts();
        let second = bundle.as_pdf(&mut session, "final", false).unwrap();
        assert_eq!(first, second);
        assert_eq!(session.cached_artifacts(), cached);
        assert!(bundle.preview(&mut session).unwrap().is_some());
    }

    #[test]
    fn test_zip_names_are_unique() {
        let bundle = DocumentBundle::new("b", "files.pdf", "Files")
            .with_document(doc("same", 1))
            .with_document(Rc::new(AlDocument::new(
                "same2",
                "same",
                "Same again",
                StaticDocument::new(Artifact::pdf(
                    "same.pdf",
                    TextPdf::new().paragraph("x").render().unwrap(),
                )),
            )));
        let mut session = Session::default();
        let archive = bundle.as_zip(&mut session, "final", false, false).unwrap();
        assert_eq!(archive.filename, "files.zip");
        assert_eq!(archive.kind.mimetype(), "application/zip");
        assert_eq!(zip_names(&archive.bytes), vec!["same.pdf", "same_1.pdf"]);
    }

    #[test]
    fn test_zip_with_originals_adds_docx() {
        let bundle = DocumentBundle::new("b", "b", "B")
            .with_document(docx_doc("lease"))
            .with_document(doc("notice", 1));
        let mut session = Session::default();
        let archive = bundle.as_zip(&mut session, "final", true, false).unwrap();
        assert_eq!(
            zip_names(&archive.bytes),
            vec!["lease.pdf", "lease.docx", "notice.pdf"]
        );

        let mut reader = zip::ZipArchive::new(Cursor::new(archive.bytes.as_slice())).unwrap();
        let mut docx = Vec::new();
        reader.by_name("lease.docx").unwrap().read_to_end(&mut docx).unwrap();
        assert_eq!(docx, b"PK\x03\x04".to_vec());
    }

    #[test]
    fn test_editable_list_prefers_docx() {
        let bundle = DocumentBundle::new("b", "b", "B")
            .with_document(docx_doc("lease"))
            .with_document(doc("notice", 1));
        let mut session = Session::default();
        let files = bundle.as_editable_list(&mut session, "final", false).unwrap();
        assert!(files[0].is_docx());
        assert!(files[1].is_pdf());
    }

    #[test]
    fn test_send_email_uses_template() {
        let template = EmailTemplate {
            subject: "Your forms".into(),
            body: "Attached.".into(),
        };
        let bundle = DocumentBundle::new("b", "b", "Packet")
            .with_document(doc("one", 1))
            .with_email_template(template);
        let mailer = RecordingMailer::default();
        let mut session = Session::default();
        bundle
            .send_email(&mut session, &mailer, &["a@example.com".to_string()], "final", false, None)
            .unwrap();
        let sent = mailer.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Your forms");
        assert_eq!(sent[0].attachments.len(), 1);
    }

    #[test]
    fn test_send_email_requires_recipient() {
        let bundle = DocumentBundle::new("b", "b", "Packet").with_document(doc("one", 1));
        let err = bundle
            .send_email(
                &mut Session::default(),
                &RecordingMailer::default(),
                &[],
                "final",
                false,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, AssemblyError::Mail(_)));
    }

    #[test]
    fn test_bundle_set_lookup() {
        let mut set = BundleSet::new();
        set.insert(Rc::new(
            DocumentBundle::new("court", "court", "Court").with_document(doc("one", 1)),
        ));
        let mut session = Session::default();
        assert!(set.as_attachment(&mut session, "court").unwrap().is_some());
        assert!(matches!(
            set.preview(&mut session, "nope"),
            Err(AssemblyError::UnknownBundle(name)) if name == "nope"
        ));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["court"]);
    }
}
