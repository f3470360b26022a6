//! Low-level page plumbing shared by the stamper and the signature compositor

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::FormError;

/// Resource name of the Helvetica font added to stamped pages
pub const STAMP_FONT: &str = "FOnbHelv";

// Parent chains deeper than this are treated as malformed
const MAX_PARENT_DEPTH: usize = 32;

/// Object id of 1-based `page_num`
pub fn page_id(doc: &Document, page_num: u32) -> Result<ObjectId, FormError> {
    doc.get_pages().get(&page_num).copied().ok_or_else(|| {
        FormError::Template(format!(
            "page {} requested but the document has {} page(s)",
            page_num,
            doc.get_pages().len()
        ))
    })
}

/// Check that caller-supplied `pdf_bytes` load and contain `page_num`.
/// Failures are the caller's, unlike [`page_id`] on a template.
pub fn check_upload(pdf_bytes: &[u8], page_num: u32) -> Result<(), FormError> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| FormError::InvalidDocument(format!("not a readable PDF: {}", e)))?;
    let pages = doc.get_pages().len();
    if !doc.get_pages().contains_key(&page_num) {
        return Err(FormError::InvalidDocument(format!(
            "page {} requested but the document has {} page(s)",
            page_num, pages
        )));
    }
    Ok(())
}

fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// The page's Resources, following inheritance through the page tree
fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut current = Some(page_id);
    for _ in 0..MAX_PARENT_DEPTH {
        let Some(id) = current else { break };
        let Ok(node) = doc.get_dictionary(id) else { break };
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dict(doc, resources)
                .cloned()
                .unwrap_or_else(Dictionary::new);
        }
        current = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Dictionary::new()
}

/// Register `value` as `/Resources/<category>/<name>` on the page.
///
/// The page gets its own copy of the resource dictionary so shared or
/// inherited resources of other pages are left alone.
pub fn add_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    value: Object,
) -> Result<(), FormError> {
    let mut resources = effective_resources(doc, page_id);
    let mut entries = resources
        .get(category.as_bytes())
        .ok()
        .and_then(|o| resolve_dict(doc, o))
        .cloned()
        .unwrap_or_else(Dictionary::new);
    entries.set(name, value);
    resources.set(category, Object::Dictionary(entries));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Helvetica with WinAnsiEncoding under [`STAMP_FONT`]
pub fn add_stamp_font(doc: &mut Document, page_id: ObjectId) -> Result<(), FormError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    add_resource(doc, page_id, "Font", STAMP_FONT, Object::Reference(font_id))
}

/// Draw `operations` on top of the page.
///
/// Existing content is wrapped in `q`/`Q` so a graphics state left dirty by
/// the template cannot move or recolor the overlay.
pub fn append_operations(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<(), FormError> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let mut overlay = Vec::with_capacity(operations.len() + 1);
    overlay.push(Operation::new("Q", vec![]));
    overlay.extend(operations);
    let overlay = Content {
        operations: overlay,
    }
    .encode()?;

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Strings drawn with `Tj` on a page, in content order
pub fn text_runs(pdf_bytes: &[u8], page_num: u32) -> Result<Vec<String>, FormError> {
    let doc = Document::load_mem(pdf_bytes)?;
    let id = page_id(&doc, page_num)?;
    let content = Content::decode(&doc.get_page_content(id)?)?;

    Ok(content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => {
                Some(bytes.iter().map(|&b| char::from(b)).collect())
            }
            _ => None,
        })
        .collect())
}

/// Builds a blank Letter document of `pages` pages
pub(crate) fn blank_document(pages: u32) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let contents_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(crate::registry::PAGE_WIDTH as f32),
                    Object::Real(crate::registry::PAGE_HEIGHT as f32),
                ],
                "Contents" => contents_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    fn save(doc: &mut Document) -> Vec<u8> {
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_blank_document_has_requested_pages() {
        let doc = blank_document(2);
        assert_eq!(doc.get_pages().len(), 2);
        assert!(page_id(&doc, 3).is_err());
    }

    #[test]
    fn test_appended_text_is_readable() {
        let mut doc = blank_document(1);
        let id = page_id(&doc, 1).unwrap();
        add_stamp_font(&mut doc, id).unwrap();
        append_operations(
            &mut doc,
            id,
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![STAMP_FONT.into(), Object::Integer(10)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(b"Ana Ruiz".to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        )
        .unwrap();

        let pdf = save(&mut doc);
        assert_eq!(text_runs(&pdf, 1).unwrap(), vec!["Ana Ruiz".to_string()]);
    }

    #[test]
    fn test_inherited_resources_are_copied_to_page() {
        let mut doc = blank_document(1);
        let id = page_id(&doc, 1).unwrap();
        let parent = doc
            .get_dictionary(id)
            .unwrap()
            .get(b"Parent")
            .unwrap()
            .as_reference()
            .unwrap();
        let inherited_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
        });
        doc.get_dictionary_mut(parent).unwrap().set(
            "Resources",
            dictionary! { "Font" => dictionary! { "F1" => inherited_font } },
        );

        add_stamp_font(&mut doc, id).unwrap();

        let resources = doc
            .get_dictionary(id)
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(STAMP_FONT.as_bytes()));
    }
}
