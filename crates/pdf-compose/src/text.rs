//! Plain text page composition
//!
//! Builds simple Letter-size PDFs from headings and paragraphs using the
//! standard Helvetica fonts. Used for addendum pages, exhibit cover pages and
//! tables of contents, where layout fidelity matters less than the text.

use crate::error::PdfComposeError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const LEADING: f32 = 1.35;
/// Average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Title(String),
    Heading(String),
    Paragraph(String),
    Blank,
    PageBreak,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }
}

#[derive(Debug, Clone)]
struct PlacedLine {
    text: String,
    font: Font,
    size: f32,
    x: f32,
    y: f32,
}

/// Builder for a text-only PDF
#[derive(Debug, Clone)]
pub struct TextPdf {
    blocks: Vec<Block>,
    font_size: f32,
    title: Option<String>,
}

impl Default for TextPdf {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPdf {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            font_size: 11.0,
            title: None,
        }
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size.max(4.0);
        self
    }

    /// Document title written to the Info dictionary
    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Large bold centered line, e.g. "EXHIBIT A" on a cover page
    pub fn title(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Title(text.into()));
        self
    }

    pub fn heading(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Heading(text.into()));
        self
    }

    /// Wrapped body text; embedded newlines start new lines
    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Paragraph(text.into()));
        self
    }

    pub fn blank_line(mut self) -> Self {
        self.blocks.push(Block::Blank);
        self
    }

    pub fn page_break(mut self) -> Self {
        self.blocks.push(Block::PageBreak);
        self
    }

    /// Characters of body text that fit on one line
    pub fn chars_per_line(&self) -> usize {
        chars_for_width(PAGE_WIDTH - 2.0 * MARGIN, self.font_size)
    }

    /// Lines of body text that fit on one page
    pub fn lines_per_page(&self) -> usize {
        ((PAGE_HEIGHT - 2.0 * MARGIN) / (self.font_size * LEADING)).floor() as usize
    }

    /// Number of pages `render` will produce
    pub fn page_count(&self) -> usize {
        self.layout().len()
    }

    pub fn render(&self) -> Result<Vec<u8>, PdfComposeError> {
        let pages = self.layout();

        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => Object::Reference(regular_id),
                "F2" => Object::Reference(bold_id),
            },
        });

        let mut kids = Vec::with_capacity(pages.len());
        for lines in &pages {
            let content = page_content(lines);
            let encoded = content
                .encode()
                .map_err(|e| PdfComposeError::OperationError(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
                "Resources" => Object::Reference(resources_id),
                "Contents" => Object::Reference(content_id),
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
            });
            doc.trailer.set("Info", Object::Reference(info_id));
        }

        doc.compress();
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfComposeError::OperationError(e.to_string()))?;
        Ok(buffer)
    }

    /// Place every line on a page. Always yields at least one page.
    fn layout(&self) -> Vec<Vec<PlacedLine>> {
        let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
        let top = PAGE_HEIGHT - MARGIN;
        let mut y = top;

        let place = |pages: &mut Vec<Vec<PlacedLine>>,
                         y: &mut f32,
                         text: String,
                         font: Font,
                         size: f32,
                         centered: bool| {
            let step = size * LEADING;
            if *y - step < MARGIN {
                pages.push(Vec::new());
                *y = top;
            }
            *y -= step;
            let x = if centered {
                let width = text.chars().count() as f32 * size * AVG_GLYPH_WIDTH;
                ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
            } else {
                MARGIN
            };
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    text,
                    font,
                    size,
                    x,
                    y: *y,
                });
            }
        };

        let body = self.font_size;
        for block in &self.blocks {
            match block {
                Block::Title(text) => {
                    let size = body * 2.0;
                    // Cover titles sit a third of the way down the page
                    if y == top {
                        y = PAGE_HEIGHT * 2.0 / 3.0;
                    }
                    for line in wrap_text(text, chars_for_width(PAGE_WIDTH - 2.0 * MARGIN, size)) {
                        place(&mut pages, &mut y, line, Font::Bold, size, true);
                    }
                }
                Block::Heading(text) => {
                    let size = body * 1.25;
                    for line in wrap_text(text, chars_for_width(PAGE_WIDTH - 2.0 * MARGIN, size)) {
                        place(&mut pages, &mut y, line, Font::Bold, size, false);
                    }
                }
                Block::Paragraph(text) => {
                    for line in wrap_text(text, self.chars_per_line()) {
                        place(&mut pages, &mut y, line, Font::Regular, body, false);
                    }
                }
                Block::Blank => {
                    y -= body * LEADING;
                }
                Block::PageBreak => {
                    pages.push(Vec::new());
                    y = top;
                }
            }
        }
        pages
    }
}

fn chars_for_width(width: f32, size: f32) -> usize {
    ((width / (size * AVG_GLYPH_WIDTH)).floor() as usize).max(1)
}

fn page_content(lines: &[PlacedLine]) -> Content {
    let mut operations = vec![Operation::new("BT", vec![])];
    for line in lines {
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(line.font.resource_name().to_vec()),
                line.size.into(),
            ],
        ));
        operations.push(Operation::new(
            "Tm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                line.x.into(),
                line.y.into(),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(&line.text),
                StringFormat::Literal,
            )],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Greedy word wrap. Newlines are hard breaks, blank lines are kept, and
/// words longer than `width` are split.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;
        for word in raw_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Encode text for a WinAnsiEncoding font. Characters outside the encoding
/// become '?'.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{0152}' => 0x8C,
            '\u{0153}' => 0x9C,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
