//! Exhibit lists: uploaded pages assembled into labeled, Bates-numbered
//! exhibits behind a table of contents
//!
//! Labels and starting page numbers are recomputed every time the list
//! changes, so the table of contents always agrees with the stamped pages.

use crate::document::{AlDocument, DocumentSource, Enabled, RenderRequest};
use crate::error::{AssemblyError, Result};
use crate::host::{OcrJob, OcrService};
use crate::session::Session;
use pdf_compose::{
    merge_documents, page_count, set_title, stamp_page_numbers, BatesOptions, TextPdf,
};
use serde::{Deserialize, Serialize};
use shared_types::Artifact;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Table of contents rows that fit on one page
pub const TOC_ROWS_PER_PAGE: usize = 30;

/// Automatic exhibit labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// A, B, ... Z, AA, AB, ...
    #[default]
    Alphabetic,
    /// 1, 2, 3, ...
    Numeric,
    /// I, II, III, ...
    Roman,
}

impl LabelStyle {
    /// Label of the exhibit at zero-based `index`
    pub fn label(self, index: usize) -> String {
        match self {
            LabelStyle::Alphabetic => alphabetic(index),
            LabelStyle::Numeric => (index + 1).to_string(),
            LabelStyle::Roman => roman(index + 1),
        }
    }
}

fn alphabetic(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

fn roman(mut n: usize) -> String {
    const NUMERALS: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhibitOptions {
    pub include_cover_pages: bool,
    pub include_toc: bool,
    pub add_page_numbers: bool,
    pub first_page: u32,
    pub bates_prefix: String,
    pub digits: usize,
    pub label_style: LabelStyle,
}

impl Default for ExhibitOptions {
    fn default() -> Self {
        Self {
            include_cover_pages: true,
            include_toc: true,
            add_page_numbers: true,
            first_page: 1,
            bates_prefix: String::new(),
            digits: 0,
            label_style: LabelStyle::Alphabetic,
        }
    }
}

impl ExhibitOptions {
    fn bates(&self, start: u32) -> BatesOptions {
        BatesOptions {
            start,
            prefix: self.bates_prefix.clone(),
            digits: self.digits,
            ..BatesOptions::default()
        }
    }
}

/// One uploaded file inside an exhibit
pub struct ExhibitPage {
    pub file: Artifact,
    pub pages: u32,
    ocr: Option<Box<dyn OcrJob>>,
}

impl fmt::Debug for ExhibitPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhibitPage")
            .field("file", &self.file.filename)
            .field("pages", &self.pages)
            .field("ocr", &self.ocr.is_some())
            .finish()
    }
}

impl ExhibitPage {
    /// Count the pages of an uploaded PDF
    pub fn from_pdf(file: Artifact) -> Result<Self> {
        let pages = page_count(&file.bytes)?;
        Ok(Self::with_page_count(file, pages))
    }

    /// Files that are not PDFs yet (images, office documents) report their
    /// own page count
    pub fn with_page_count(file: Artifact, pages: u32) -> Self {
        Self {
            file,
            pages,
            ocr: None,
        }
    }

    pub fn start_ocr(&mut self, service: &dyn OcrService) {
        self.ocr = Some(service.start(&self.file));
    }

    pub fn ocr_started(&self) -> bool {
        self.ocr.is_some()
    }

    /// Finished, successfully or not
    pub fn ocr_ready(&self) -> bool {
        self.ocr
            .as_ref()
            .map_or(true, |job| job.ready() || job.failed())
    }

    /// The OCRed file when its job finished successfully, the upload otherwise
    pub fn effective_file(&self) -> Artifact {
        match &self.ocr {
            Some(job) if job.ready() && !job.failed() => {
                job.result().unwrap_or_else(|| self.file.clone())
            }
            _ => self.file.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Exhibit {
    pub title: String,
    pub label: String,
    pub start_page: u32,
    pages: Vec<ExhibitPage>,
    cover_page: Option<ExhibitPage>,
}

impl Exhibit {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            label: String::new(),
            start_page: 1,
            pages: Vec::new(),
            cover_page: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_page(mut self, page: ExhibitPage) -> Self {
        self.pages.push(page);
        self
    }

    /// Replace the generated cover page
    pub fn with_cover_page(mut self, cover: ExhibitPage) -> Self {
        self.cover_page = Some(cover);
        self
    }

    pub fn pages(&self) -> &[ExhibitPage] {
        &self.pages
    }

    pub fn push_page(&mut self, page: ExhibitPage) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> u32 {
        self.pages.iter().map(|p| p.pages).sum()
    }

    pub fn cover_pages(&self, include: bool) -> u32 {
        match (&self.cover_page, include) {
            (_, false) => 0,
            (Some(cover), true) => cover.pages,
            (None, true) => self.generated_cover().page_count() as u32,
        }
    }

    fn generated_cover(&self) -> TextPdf {
        TextPdf::new()
            .title(format!("EXHIBIT {}", self.label))
            .blank_line()
            .paragraph(self.title.clone())
    }

    pub fn start_ocr(&mut self, service: &dyn OcrService) {
        for page in &mut self.pages {
            page.start_ocr(service);
        }
    }

    pub fn ocr_started(&self) -> bool {
        self.pages.iter().any(ExhibitPage::ocr_started)
    }

    pub fn ocr_ready(&self) -> bool {
        self.pages.iter().all(ExhibitPage::ocr_ready)
    }

    /// Cover page and pages, stamped from `start_page`
    pub fn as_pdf(&self, session: &Session, options: &ExhibitOptions) -> Result<Artifact> {
        let mut parts = Vec::with_capacity(self.pages.len() + 1);
        if options.include_cover_pages {
            let cover = match &self.cover_page {
                Some(cover) => session.ensure_pdf(cover.effective_file())?.bytes,
                None => self.generated_cover().render()?,
            };
            parts.push(cover);
        }
        for page in &self.pages {
            parts.push(session.ensure_pdf(page.effective_file())?.bytes);
        }

        let mut bytes = merge_documents(parts)?;
        if options.add_page_numbers {
            bytes = stamp_page_numbers(&bytes, &options.bates(self.start_page))?;
        }
        Ok(Artifact::pdf(format!("exhibit_{}.pdf", self.label), bytes)
            .with_title(format!("Exhibit {}: {}", self.label, self.title)))
    }
}

/// A row of the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub label: String,
    pub title: String,
    pub start_page: u32,
}

pub struct ExhibitList {
    name: String,
    exhibits: Vec<Exhibit>,
    options: ExhibitOptions,
    label_fn: Option<Rc<dyn Fn(usize) -> String>>,
    auto_label: bool,
    ocr_started: bool,
}

impl fmt::Debug for ExhibitList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhibitList")
            .field("name", &self.name)
            .field("exhibits", &self.exhibits)
            .field("options", &self.options)
            .field("auto_label", &self.auto_label)
            .finish()
    }
}

impl ExhibitList {
    pub fn new(name: impl Into<String>, options: ExhibitOptions) -> Self {
        Self {
            name: name.into(),
            exhibits: Vec::new(),
            options,
            label_fn: None,
            auto_label: true,
            ocr_started: false,
        }
    }

    /// Compute labels from the zero-based position instead of the label style
    pub fn with_label_fn(mut self, label_fn: impl Fn(usize) -> String + 'static) -> Self {
        self.label_fn = Some(Rc::new(label_fn));
        self.recompute();
        self
    }

    /// Keep whatever labels the exhibits were given
    pub fn with_manual_labels(mut self) -> Self {
        self.auto_label = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ExhibitOptions {
        &self.options
    }

    pub fn exhibits(&self) -> &[Exhibit] {
        &self.exhibits
    }

    pub fn len(&self) -> usize {
        self.exhibits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exhibits.is_empty()
    }

    pub fn push(&mut self, exhibit: Exhibit) {
        self.exhibits.push(exhibit);
        self.recompute();
    }

    pub fn remove(&mut self, index: usize) -> Option<Exhibit> {
        if index >= self.exhibits.len() {
            return None;
        }
        let removed = self.exhibits.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Append several exhibits at once
    pub fn gather(&mut self, exhibits: impl IntoIterator<Item = Exhibit>) {
        self.exhibits.extend(exhibits);
        self.recompute();
    }

    /// Edit one exhibit in place; returns `false` when `index` is out of range
    pub fn update(&mut self, index: usize, edit: impl FnOnce(&mut Exhibit)) -> bool {
        match self.exhibits.get_mut(index) {
            Some(exhibit) => {
                edit(exhibit);
                self.recompute();
                true
            }
            None => false,
        }
    }

    fn recompute(&mut self) {
        let mut next = self.options.first_page + self.toc_pages();
        let include_covers = self.options.include_cover_pages;
        for (index, exhibit) in self.exhibits.iter_mut().enumerate() {
            if self.auto_label {
                exhibit.label = match &self.label_fn {
                    Some(label_fn) => label_fn(index),
                    None => self.options.label_style.label(index),
                };
            }
            exhibit.start_page = next;
            next += exhibit.cover_pages(include_covers) + exhibit.page_count();
        }
        tracing::debug!(
            list = %self.name,
            exhibits = self.exhibits.len(),
            next_page = next,
            "renumbered exhibits"
        );
    }

    /// Pages reserved for the table of contents. Every entry renders on
    /// one line, so start page digits never change this count.
    pub fn toc_pages(&self) -> u32 {
        if !self.options.include_toc {
            return 0;
        }
        self.toc_text().page_count() as u32
    }

    pub fn total_pages(&self) -> u32 {
        let include_covers = self.options.include_cover_pages;
        self.toc_pages()
            + self
                .exhibits
                .iter()
                .map(|e| e.cover_pages(include_covers) + e.page_count())
                .sum::<u32>()
    }

    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        self.exhibits
            .iter()
            .map(|e| TocEntry {
                label: e.label.clone(),
                title: e.title.clone(),
                start_page: e.start_page,
            })
            .collect()
    }

    fn toc_text(&self) -> TextPdf {
        let mut pdf = TextPdf::new().document_title(format!("{}: table of contents", self.name));
        let width = pdf.chars_per_line();
        for (row, entry) in self.table_of_contents().iter().enumerate() {
            if row == 0 {
                pdf = pdf.heading("Exhibits").blank_line();
            } else if row % TOC_ROWS_PER_PAGE == 0 {
                pdf = pdf.page_break();
            }
            pdf = pdf.paragraph(toc_line(entry, width));
        }
        pdf
    }

    /// Table of contents pages, stamped from `first_page`
    pub fn toc_pdf(&self) -> Result<Vec<u8>> {
        let mut bytes = self.toc_text().render()?;
        if self.options.add_page_numbers {
            bytes = stamp_page_numbers(&bytes, &self.options.bates(self.options.first_page))?;
        }
        Ok(bytes)
    }

    pub fn start_ocr(&mut self, service: &dyn OcrService) {
        for exhibit in &mut self.exhibits {
            exhibit.start_ocr(service);
        }
        self.ocr_started = true;
        tracing::info!(list = %self.name, exhibits = self.exhibits.len(), "started OCR");
    }

    /// `false` while any OCR job is still running
    pub fn ocr_ready(&self) -> bool {
        if !self.ocr_started {
            tracing::warn!(list = %self.name, "OCR readiness checked before OCR was started");
            return true;
        }
        self.exhibits.iter().all(Exhibit::ocr_ready)
    }

    /// Table of contents followed by every exhibit. `None` for an empty list.
    pub fn as_pdf(&self, session: &Session) -> Result<Option<Artifact>> {
        if self.exhibits.is_empty() {
            return Ok(None);
        }
        let mut parts = Vec::with_capacity(self.exhibits.len() + 1);
        if self.options.include_toc {
            parts.push(self.toc_pdf()?);
        }
        for exhibit in &self.exhibits {
            if exhibit.pages.is_empty() && !self.options.include_cover_pages {
                tracing::debug!(
                    list = %self.name,
                    label = %exhibit.label,
                    "skipping empty exhibit"
                );
                continue;
            }
            parts.push(exhibit.as_pdf(session, &self.options)?.bytes);
        }
        if parts.is_empty() {
            return Ok(None);
        }

        let bytes = set_title(&merge_documents(parts)?, &self.name)?;
        Ok(Some(
            Artifact::pdf(format!("{}.pdf", self.name), bytes).with_title(self.name.clone()),
        ))
    }
}

/// "Exhibit A: Title .... 3", shortened to at most `width` chars so every
/// entry takes exactly one line
fn toc_line(entry: &TocEntry, width: usize) -> String {
    let head = one_line(&format!("Exhibit {}: {}", entry.label, entry.title));
    let suffix = format!(" .... {}", entry.start_page);
    let room = width.saturating_sub(suffix.chars().count());
    let line = if head.chars().count() > room {
        let short: String = head.chars().take(room.saturating_sub(3)).collect();
        format!("{}...{}", short, suffix)
    } else {
        format!("{}{}", head, suffix)
    };
    line.chars().take(width).collect()
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders a shared exhibit list as a document
#[derive(Debug, Clone)]
pub struct ExhibitDocument {
    pub list: Rc<RefCell<ExhibitList>>,
}

impl ExhibitDocument {
    pub fn new(list: Rc<RefCell<ExhibitList>>) -> Self {
        Self { list }
    }

    /// A document over `list` that is enabled while the list has exhibits
    pub fn document(
        name: impl Into<String>,
        filename: impl Into<String>,
        title: impl Into<String>,
        list: Rc<RefCell<ExhibitList>>,
    ) -> AlDocument {
        let watched = Rc::clone(&list);
        AlDocument::new(name, filename, title, Self::new(list))
            .with_enabled(Enabled::when(move |_| !watched.borrow().is_empty()))
    }
}

impl DocumentSource for ExhibitDocument {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Artifact> {
        let list = self.list.borrow();
        list.as_pdf(request.session)?
            .ok_or_else(|| AssemblyError::NoExhibits(list.name().to_string()))
    }
}
