//! Bates-style page stamping
//!
//! Appends a content stream to every page that draws a sequential label in
//! the bottom-right corner. The original page content is wrapped in a
//! `q`/`Q` pair so its graphics state cannot leak into the stamp.

use crate::error::PdfComposeError;
use crate::text::encode_win_ansi;
use crate::{as_number, inherited_attribute, resolve};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Resource name of the stamp font; unlikely to collide with existing fonts
const STAMP_FONT: &str = "FBates";

#[derive(Debug, Clone, PartialEq)]
pub struct BatesOptions {
    /// Number stamped on the first page
    pub start: u32,
    /// Text placed before the number, e.g. "SMITH-"
    pub prefix: String,
    /// Zero-pad the number to this many digits
    pub digits: usize,
    pub font_size: f32,
    /// Distance from the right and bottom page edges
    pub margin: f32,
}

impl Default for BatesOptions {
    fn default() -> Self {
        Self {
            start: 1,
            prefix: String::new(),
            digits: 0,
            font_size: 10.0,
            margin: 24.0,
        }
    }
}

impl BatesOptions {
    pub fn starting_at(start: u32) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    /// Label for the page `offset` pages after the first
    pub fn label(&self, offset: u32) -> String {
        format!(
            "{}{:0width$}",
            self.prefix,
            self.start + offset,
            width = self.digits
        )
    }
}

/// Stamp every page with consecutive labels starting at `options.start`
pub fn stamp_page_numbers(
    bytes: &[u8],
    options: &BatesOptions,
) -> Result<Vec<u8>, PdfComposeError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| PdfComposeError::ParseError(e.to_string()))?;

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

    let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    for (offset, page_id) in pages.iter().enumerate() {
        let label = options.label(offset as u32);
        stamp_page(&mut doc, *page_id, font_id, save_id, &label, options)?;
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfComposeError::OperationError(e.to_string()))?;

    tracing::debug!(
        pages = pages.len(),
        first = %options.label(0),
        "stamped page numbers"
    );
    Ok(buffer)
}

fn stamp_page(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    save_id: ObjectId,
    label: &str,
    options: &BatesOptions,
) -> Result<(), PdfComposeError> {
    let (x1, y0) = page_corner(doc, page_id);

    let mut resources = inherited_attribute(doc, page_id, b"Resources")
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);
    let mut fonts = resources
        .get(b"Font")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);
    fonts.set(STAMP_FONT, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let existing: Vec<Object> = match doc.get_dictionary(page_id).map(|p| p.get(b"Contents")) {
        Ok(Ok(Object::Reference(id))) => vec![Object::Reference(*id)],
        Ok(Ok(Object::Array(items))) => items.clone(),
        _ => Vec::new(),
    };

    let text_width = label.chars().count() as f32 * options.font_size * 0.6;
    let x = (x1 - options.margin - text_width).max(0.0);
    let y = y0 + options.margin;
    let content = Content {
        operations: vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(STAMP_FONT.as_bytes().to_vec()),
                    options.font_size.into(),
                ],
            ),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(label), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| PdfComposeError::OperationError(e.to_string()))?;
    let stamp_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(stamp_id));

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| PdfComposeError::OperationError(e.to_string()))?;
    if let Object::Dictionary(ref mut page_dict) = page {
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Array(contents));
    }
    Ok(())
}

/// Right and bottom edges of the page's MediaBox, defaulting to US Letter
fn page_corner(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|o| o.as_array().ok())
        .map(|items| {
            items
                .iter()
                .filter_map(|o| as_number(resolve(doc, o)))
                .collect::<Vec<_>>()
        });
    match media_box.as_deref() {
        Some([x0, y0, x1, y1]) => (x0.max(*x1), y0.min(*y1)),
        _ => (612.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextPdf;

    fn page_text(bytes: &[u8], page: u32) -> String {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = doc.get_pages()[&page];
        let content = doc.get_page_content(page_id).unwrap();
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn test_labels_are_padded_and_prefixed() {
        let options = BatesOptions {
            start: 7,
            prefix: "DEF-".into(),
            digits: 4,
            ..BatesOptions::default()
        };
        assert_eq!(options.label(0), "DEF-0007");
        assert_eq!(options.label(5), "DEF-0012");
    }

    #[test]
    fn test_unpadded_label() {
        assert_eq!(BatesOptions::starting_at(3).label(1), "4");
    }

    #[test]
    fn test_stamp_every_page_sequentially() {
        let pdf = TextPdf::new()
            .paragraph("first")
            .page_break()
            .paragraph("second")
            .page_break()
            .paragraph("third")
            .render()
            .unwrap();
        let options = BatesOptions {
            start: 12,
            prefix: "EX".into(),
            digits: 3,
            ..BatesOptions::default()
        };
        let stamped = stamp_page_numbers(&pdf, &options).unwrap();

        assert_eq!(crate::page_count(&stamped).unwrap(), 3);
        assert!(page_text(&stamped, 1).contains("(EX012)"));
        assert!(page_text(&stamped, 2).contains("(EX013)"));
        assert!(page_text(&stamped, 3).contains("(EX014)"));
        // Original text is still present
        assert!(page_text(&stamped, 2).contains("(second)"));
    }

    #[test]
    fn test_stamp_registers_font_resource() {
        let pdf = TextPdf::new().paragraph("only").render().unwrap();
        let stamped = stamp_page_numbers(&pdf, &BatesOptions::default()).unwrap();
        let doc = Document::load_mem(&stamped).unwrap();
        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.get(STAMP_FONT.as_bytes()).is_ok());
        // Fonts the page already used are kept
        assert!(fonts.get(b"F1").is_ok());
    }
}
