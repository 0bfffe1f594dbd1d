//! PDF concatenation
//!
//! Combines multiple PDFs into a single document, in order.

use crate::error::PdfComposeError;
use crate::inherited_attribute;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: &[&[u8]] = &[b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Merge multiple PDFs into one
///
/// The algorithm:
/// 1. If empty, return error
/// 2. If single document, return it as-is
/// 3. Use the first document as the destination
/// 4. For each following document:
///    a. Offset its object IDs past the destination's highest ID
///    b. Import all objects with remapped references
///    c. Append its pages to the destination page list
/// 5. Rebuild a flat page tree, prune orphans, compress and save
pub fn merge_documents(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfComposeError> {
    if documents.is_empty() {
        return Err(PdfComposeError::EmptyInput);
    }

    if documents.len() == 1 {
        return Ok(documents.into_iter().next().unwrap_or_default());
    }

    let mut loaded_docs = Vec::with_capacity(documents.len());
    for (i, doc_bytes) in documents.iter().enumerate() {
        let mut doc = Document::load_mem(doc_bytes).map_err(|e| {
            PdfComposeError::ParseError(format!("Failed to load document {}: {}", i, e))
        })?;
        // Pages move into a flat tree, so they must carry what they used to inherit
        materialize_inherited(&mut doc);
        loaded_docs.push(doc);
    }

    let mut dest = loaded_docs.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut dest_page_refs = get_page_references(&dest);

    for source in loaded_docs.into_iter() {
        let source_pages = get_page_references(&source);
        let id_offset = dest_max_id;

        let mut remapped_objects = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            remapped_objects.insert(new_id, remap_object_refs(object, id_offset));
        }
        dest.objects.extend(remapped_objects);

        dest_page_refs.extend(
            source_pages
                .into_iter()
                .map(|old| (old.0 + id_offset, old.1)),
        );

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    dest.max_id = dest_max_id;
    update_page_tree(&mut dest, &dest_page_refs)?;

    dest.prune_objects();
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer).map_err(|e| {
        PdfComposeError::OperationError(format!("Failed to save merged PDF: {}", e))
    })?;

    tracing::debug!(
        documents = documents.len(),
        pages = dest_page_refs.len(),
        bytes = buffer.len(),
        "merged PDF documents"
    );

    Ok(buffer)
}

/// All page object references in page order
fn get_page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Copy inheritable attributes down onto every page that lacks them
fn materialize_inherited(doc: &mut Document) {
    let pages = get_page_references(doc);
    for page_id in pages {
        let mut missing = Vec::new();
        if let Ok(page) = doc.get_dictionary(page_id) {
            for key in INHERITABLE {
                if page.get(key).is_err() {
                    if let Some(value) = inherited_attribute(doc, page_id, key) {
                        missing.push((key.to_vec(), value.clone()));
                    }
                }
            }
        }
        if missing.is_empty() {
            continue;
        }
        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            for (key, value) in missing {
                page.set(key, value);
            }
        }
    }
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's root Pages node at `page_refs` and reparent them
fn update_page_tree(doc: &mut Document, page_refs: &[ObjectId]) -> Result<(), PdfComposeError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfComposeError::OperationError("No Root in trailer".into()))?;

    let pages_id = doc
        .get_dictionary(catalog_id)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| PdfComposeError::OperationError("No Pages in catalog".into()))?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            let kids = page_refs.iter().map(|&id| Object::Reference(id)).collect();
            pages_dict.set("Kids", Object::Array(kids));
            pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
        }
        _ => {
            return Err(PdfComposeError::OperationError(
                "Invalid pages dictionary".into(),
            ))
        }
    }

    for page_id in page_refs {
        if let Some(Object::Dictionary(page)) = doc.objects.get_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}
