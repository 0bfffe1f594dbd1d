//! PDF composition primitives for document assembly
//!
//! This crate provides the file-level operations the assembly layer needs,
//! all on top of lopdf:
//! - `merge_documents`: concatenate PDFs in order
//! - `stamp_page_numbers`: Bates-style page stamping
//! - `TextPdf`: compose plain text pages (addenda, cover pages, tables of contents)
//! - `page_count` / `set_title`: inspect and relabel a PDF

pub mod error;
pub mod merge;
pub mod stamp;
pub mod text;

pub use error::PdfComposeError;
pub use merge::merge_documents;
pub use stamp::{stamp_page_numbers, BatesOptions};
pub use text::{encode_win_ansi, TextPdf};

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

/// Parse PDF bytes and return page count
pub fn page_count(bytes: &[u8]) -> Result<u32, PdfComposeError> {
    let doc =
        Document::load_mem(bytes).map_err(|e| PdfComposeError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

/// Set the document title in the Info dictionary
pub fn set_title(bytes: &[u8], title: &str) -> Result<Vec<u8>, PdfComposeError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| PdfComposeError::ParseError(e.to_string()))?;

    let title_obj = text_string(title);
    let info_id = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok()
        .filter(|id| matches!(doc.objects.get(id), Some(Object::Dictionary(_))));
    match info_id {
        Some(id) => {
            if let Some(Object::Dictionary(info)) = doc.objects.get_mut(&id) {
                info.set("Title", title_obj);
            }
        }
        None => {
            let mut info = Dictionary::new();
            info.set("Title", title_obj);
            let id = doc.add_object(Object::Dictionary(info));
            doc.trailer.set("Info", Object::Reference(id));
        }
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfComposeError::OperationError(e.to_string()))?;
    Ok(buffer)
}

/// Encode a PDF text string: ASCII stays literal, anything else becomes UTF-16BE
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Look up a page attribute, walking up the page tree when the page lacks it.
/// References are resolved.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node_id = page_id;
    // Page trees deeper than this are malformed
    for _ in 0..32 {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

pub(crate) fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_of(bytes: &[u8]) -> Vec<u8> {
        let doc = Document::load_mem(bytes).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        info.get(b"Title").unwrap().as_str().unwrap().to_vec()
    }

    #[test]
    fn test_page_count_of_composed_pdf() {
        let bytes = TextPdf::new().paragraph("one").page_break().paragraph("two").render().unwrap();
        assert_eq!(page_count(&bytes).unwrap(), 2);
    }

    #[test]
    fn test_page_count_rejects_garbage() {
        assert!(matches!(
            page_count(b"definitely not a pdf"),
            Err(PdfComposeError::ParseError(_))
        ));
    }

    #[test]
    fn test_set_title_ascii() {
        let bytes = TextPdf::new().paragraph("body").render().unwrap();
        let titled = set_title(&bytes, "Motion to Dismiss").unwrap();
        assert_eq!(title_of(&titled), b"Motion to Dismiss".to_vec());
    }

    #[test]
    fn test_set_title_overwrites_existing() {
        let bytes = TextPdf::new().paragraph("body").render().unwrap();
        let once = set_title(&bytes, "First").unwrap();
        let twice = set_title(&once, "Second").unwrap();
        assert_eq!(title_of(&twice), b"Second".to_vec());
    }

    #[test]
    fn test_set_title_non_ascii_uses_utf16() {
        let bytes = TextPdf::new().paragraph("body").render().unwrap();
        let titled = set_title(&bytes, "Déclaration").unwrap();
        let raw = title_of(&titled);
        assert_eq!(&raw[..2], &[0xFE, 0xFF]);
    }
}
