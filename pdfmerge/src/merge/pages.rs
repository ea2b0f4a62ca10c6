//! Importing pages from source PDFs.
//!
//! Pages are moved into the output document as-is: their content streams,
//! resources and annotations come along untouched. Two things change:
//! - Attributes the page inherited from its old page tree are copied onto
//!   the page itself, since the old tree is dropped.
//! - The page's rotation is advanced by the entry's rotation.

use log::warn;
use lopdf::{Document, Object, ObjectId};

use crate::rotation::{Rotation, normalize_degrees};

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used when a page declares no media box anywhere.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Moves pages from source documents into an output document.
#[derive(Debug, Default)]
pub struct PageImporter;

impl PageImporter {
    /// Create a new page importer.
    pub fn new() -> Self {
        Self
    }

    /// Import every page of the PDF in `bytes` into `output`, in source order.
    ///
    /// Imported pages are re-parented under `parent` but not yet listed in
    /// its `Kids`; the caller does that once all entries are in.
    ///
    /// # Errors
    ///
    /// Returns the parser's message if the bytes are not a readable PDF.
    /// A readable PDF without pages contributes nothing.
    pub fn import(
        &self,
        output: &mut Document,
        parent: ObjectId,
        bytes: &[u8],
        rotation: Rotation,
    ) -> Result<Vec<ObjectId>, String> {
        let mut source = Document::load_mem(bytes).map_err(|e| e.to_string())?;

        if source.get_pages().is_empty() {
            warn!("PDF has no pages; nothing to import");
            return Ok(Vec::new());
        }

        // Renumber objects to avoid ID conflicts
        source.renumber_objects_with(output.max_id + 1);

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();

        for &page_id in &page_ids {
            self.prepare_page(&mut source, page_id, parent, rotation)?;
        }

        output.max_id = output.max_id.max(source.max_id);
        output.objects.extend(source.objects);

        Ok(page_ids)
    }

    /// Materialize inherited attributes, apply rotation and re-parent.
    fn prepare_page(
        &self,
        source: &mut Document,
        page_id: ObjectId,
        parent: ObjectId,
        rotation: Rotation,
    ) -> Result<(), String> {
        let inherited: Vec<(&[u8], Object)> = {
            let page = source
                .get_dictionary(page_id)
                .map_err(|e| format!("Page {page_id:?} is not a dictionary: {e}"))?;

            INHERITABLE
                .iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| inherited_attribute(source, page_id, key).map(|v| (*key, v)))
                .collect()
        };

        let current_rotation = {
            let page = source
                .get_dictionary(page_id)
                .map_err(|e| e.to_string())?;
            match page.get(b"Rotate") {
                Ok(value) => resolve_integer(source, value),
                Err(_) => inherited
                    .iter()
                    .find(|(key, _)| *key == b"Rotate")
                    .and_then(|(_, value)| resolve_integer(source, value)),
            }
            .unwrap_or(0)
        };

        let page = source
            .get_object_mut(page_id)
            .and_then(|obj| obj.as_dict_mut())
            .map_err(|e| e.to_string())?;

        for (key, value) in inherited {
            page.set(key.to_vec(), value);
        }

        if !page.has(b"MediaBox") {
            page.set(
                "MediaBox",
                DEFAULT_MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
            );
        }

        let rotate = normalize_degrees(current_rotation + i64::from(rotation.as_degrees()));
        if rotate != 0 || page.has(b"Rotate") {
            page.set("Rotate", Object::Integer(rotate));
        }

        page.set("Parent", Object::Reference(parent));

        Ok(())
    }
}

/// Find `key` on the nearest ancestor of `page_id` that defines it.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc
        .get_dictionary(page_id)
        .ok()?
        .get(b"Parent")
        .and_then(|p| p.as_reference())
        .ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(current?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        current = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    None
}

/// Read an integer that may sit behind an indirect reference.
fn resolve_integer(doc: &Document, value: &Object) -> Option<i64> {
    match value {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_i64().ok(),
        other => other.as_i64().ok(),
    }
}
