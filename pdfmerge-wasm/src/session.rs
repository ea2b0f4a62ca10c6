//! Stateful merge session.
//!
//! Holds the staged entries, their preview URLs and the optional PDF
//! renderer in Rust memory. Identifiers handed to JavaScript are the raw
//! [`EntryId`] values.

use std::collections::HashMap;

use anyhow::{anyhow, bail};
use log::warn;
use pdfmerge::collection::EntryList;
use pdfmerge::entry::{EntryId, EntryView};
use pdfmerge::io::{DEFAULT_OUTPUT_NAME, IntakeFile, OutputDispatcher};
use pdfmerge::merge::MergePipeline;
use pdfmerge::preview::{PdfRasterizer, Thumbnail};
use pdfmerge::rotation::RotateDirection;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::download::{BrowserDownload, ObjectUrl};

/// Entry summary for JS serialization.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryJs {
    #[serde(flatten)]
    view: EntryView,
    preview_url: Option<String>,
}

impl EntryJs {
    /// A preview URL, generated or attached from JS, counts as a preview.
    fn new(mut view: EntryView, preview_url: Option<String>) -> Self {
        view.has_preview |= preview_url.is_some();
        Self { view, preview_url }
    }
}

/// Forwards PDF previews to a JavaScript renderer.
///
/// The function receives the PDF as a `Uint8Array` and must return the PNG
/// bytes of the first page as a `Uint8Array`.
struct JsRasterizer {
    render: js_sys::Function,
}

impl PdfRasterizer for JsRasterizer {
    fn render_first_page(&self, pdf: &[u8]) -> anyhow::Result<Thumbnail> {
        let input = js_sys::Uint8Array::from(pdf);
        let output = self
            .render
            .call1(&JsValue::NULL, &input)
            .map_err(|err| anyhow!("PDF renderer threw: {err:?}"))?;

        if !output.is_instance_of::<js_sys::Uint8Array>() {
            bail!("PDF renderer must return a Uint8Array of PNG bytes");
        }

        let png = js_sys::Uint8Array::new(&output).to_vec();
        Ok(Thumbnail::from_png(png)?)
    }
}

/// Stateful session staging files for one merge.
#[wasm_bindgen]
pub struct MergeSession {
    list: EntryList,
    preview_urls: HashMap<EntryId, ObjectUrl>,
    progress_callback: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl MergeSession {
    /// Create an empty session.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            list: EntryList::new(),
            preview_urls: HashMap::new(),
            progress_callback: None,
        }
    }

    /// Set a progress callback function
    /// Callback signature: (position: number, total: number, name: string) => void
    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    /// Install a synchronous PDF first-page renderer for previews.
    #[wasm_bindgen(js_name = setPdfRenderer)]
    pub fn set_pdf_renderer(&mut self, render: js_sys::Function) {
        self.list
            .previews_mut()
            .set_rasterizer(Box::new(JsRasterizer { render }));
    }

    /// Internal method to stage a file (testable without JsValue)
    fn add_file_internal(&mut self, name: &str, media_type: &str, bytes: &[u8]) -> Result<EntryId, String> {
        let file = IntakeFile::new(name, bytes.to_vec()).with_media_type(media_type);

        self.list
            .append_file(file)
            .ok_or_else(|| format!("{name}: only PDF, PNG and JPEG files are accepted"))
    }

    /// Stage a file at the end of the list.
    ///
    /// `media_type` is the browser-reported type and may be empty. Returns
    /// the new entry's id. A preview URL that cannot be created is skipped.
    #[wasm_bindgen(js_name = addFile)]
    pub fn add_file(&mut self, name: &str, media_type: &str, bytes: &[u8]) -> Result<u32, JsValue> {
        let id = self
            .stage_with_preview(name, media_type, bytes, |png| {
                ObjectUrl::new(png, "image/png").map_err(|err| format!("{err:?}"))
            })
            .map_err(|e| JsValue::from_str(&e))?;

        Ok(id.get())
    }

    /// Attach a preview rendered asynchronously on the JavaScript side.
    ///
    /// Replaces (and revokes) any previous preview URL of the entry.
    #[wasm_bindgen(js_name = attachPreview)]
    pub fn attach_preview(&mut self, id: u32, png: &[u8]) -> Result<(), JsValue> {
        let id = EntryId::from(id);
        if self.list.get(id).is_none() {
            return Err(JsValue::from_str(&format!("Unknown entry {id}")));
        }

        let url = ObjectUrl::new(png, "image/png")?;
        self.preview_urls.insert(id, url);
        Ok(())
    }

    /// Move an entry to `index`. Unknown ids are ignored.
    #[wasm_bindgen(js_name = moveEntry)]
    pub fn move_entry(&mut self, id: u32, index: usize) -> bool {
        self.list.move_entry(EntryId::from(id), index)
    }

    /// Rotate an entry 90° clockwise, returning its new rotation.
    #[wasm_bindgen(js_name = rotateClockwise)]
    pub fn rotate_clockwise(&mut self, id: u32) -> Option<u16> {
        self.list
            .rotate(EntryId::from(id), RotateDirection::Clockwise)
            .map(|rotation| rotation.as_degrees())
    }

    /// Rotate an entry 90° counter-clockwise, returning its new rotation.
    #[wasm_bindgen(js_name = rotateCounterClockwise)]
    pub fn rotate_counter_clockwise(&mut self, id: u32) -> Option<u16> {
        self.list
            .rotate(EntryId::from(id), RotateDirection::CounterClockwise)
            .map(|rotation| rotation.as_degrees())
    }

    /// Remove an entry and revoke its preview URL.
    pub fn remove(&mut self, id: u32) -> bool {
        let id = EntryId::from(id);
        self.preview_urls.remove(&id);
        self.list.remove(id)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.preview_urls.clear();
        self.list.clear();
    }

    fn entries_internal(&self) -> Vec<EntryJs> {
        self.list
            .entries()
            .iter()
            .map(|entry| {
                EntryJs::new(
                    entry.view(),
                    self.preview_urls
                        .get(&entry.id())
                        .map(|url| url.as_str().to_string()),
                )
            })
            .collect()
    }

    /// Staged entries in merge order.
    pub fn entries(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.entries_internal())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Number of staged entries.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.list.len()
    }

    /// Whether the merge control should be enabled.
    #[wasm_bindgen(js_name = canMerge)]
    pub fn can_merge(&self) -> bool {
        self.list.can_merge()
    }

    fn merge_internal(&self) -> Result<Vec<u8>, String> {
        if !self.can_merge() {
            return Err("Add at least two files to merge".to_string());
        }

        let output = self
            .list
            .merge_with_progress(&MergePipeline::new(), |progress| {
                self.report_progress(progress.position, progress.total, progress.name);
            })
            .map_err(|e| e.to_string())?;

        Ok(output.bytes)
    }

    /// Merge the staged entries and return the PDF bytes.
    ///
    /// The session is left unchanged, whether the merge succeeds or not.
    pub fn merge(&self) -> Result<js_sys::Uint8Array, JsValue> {
        let bytes = self.merge_internal().map_err(|e| JsValue::from_str(&e))?;
        Ok(js_sys::Uint8Array::from(bytes.as_slice()))
    }

    /// Merge and save the result as `merged-document.pdf`.
    #[wasm_bindgen(js_name = mergeAndDownload)]
    pub fn merge_and_download(&self) -> Result<(), JsValue> {
        let bytes = self.merge_internal().map_err(|e| JsValue::from_str(&e))?;

        BrowserDownload
            .dispatch(&bytes, DEFAULT_OUTPUT_NAME)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(())
    }

    /// Report progress to JavaScript callback
    fn report_progress(&self, position: usize, total: usize, name: &str) {
        if let Some(ref callback) = self.progress_callback {
            let _ = callback.call3(
                &JsValue::null(),
                &JsValue::from(position as u32),
                &JsValue::from(total as u32),
                &JsValue::from_str(name),
            );
        }
    }
}

impl MergeSession {
    /// Stage a file and publish its generated thumbnail through `make_url`.
    ///
    /// Only intake can fail; once the entry is staged the id is returned.
    fn stage_with_preview<F>(
        &mut self,
        name: &str,
        media_type: &str,
        bytes: &[u8],
        make_url: F,
    ) -> Result<EntryId, String>
    where
        F: FnOnce(&[u8]) -> Result<ObjectUrl, String>,
    {
        let id = self.add_file_internal(name, media_type, bytes)?;

        let thumbnail = self
            .list
            .get(id)
            .and_then(|entry| entry.preview())
            .and_then(|preview| preview.thumbnail());
        if let Some(thumb) = thumbnail {
            match make_url(&thumb.png) {
                Ok(url) => {
                    self.preview_urls.insert(id, url);
                }
                Err(err) => warn!("No preview URL for {name}: {err}"),
            }
        }

        Ok(id)
    }
}

impl Default for MergeSession {
    fn default() -> Self {
        Self::new()
    }
}
