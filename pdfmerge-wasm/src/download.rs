//! Browser-side output: object URLs and the download trigger.

use pdfmerge::error::{Error, Result};
use pdfmerge::io::{DispatchReceipt, OutputDispatcher};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Delay before a download URL is revoked, in milliseconds.
const REVOKE_DELAY_MS: i32 = 10_000;

/// A `blob:` URL that is revoked when dropped.
#[derive(Debug)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    /// Wrap `bytes` in a Blob of `media_type` and create a URL for it.
    pub fn new(bytes: &[u8], media_type: &str) -> std::result::Result<Self, JsValue> {
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(media_type);

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        Ok(Self(Url::create_object_url_with_blob(&blob)?))
    }

    /// The URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Give up ownership; the caller becomes responsible for revoking.
    fn into_string(mut self) -> String {
        std::mem::take(&mut self.0)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if !self.0.is_empty() {
            let _ = Url::revoke_object_url(&self.0);
        }
    }
}

/// Saves a document through the browser's download mechanism.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDownload;

impl BrowserDownload {
    fn trigger(&self, bytes: &[u8], file_name: &str) -> std::result::Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let anchor: HtmlAnchorElement = document
            .create_element("a")?
            .dyn_into()
            .map_err(|_| JsValue::from_str("Failed to create download link"))?;

        let url = ObjectUrl::new(bytes, "application/pdf")?;
        anchor.set_href(url.as_str());
        anchor.set_download(file_name);
        anchor.click();

        // The download may still be reading the blob after click() returns
        let href = url.into_string();
        let revoke = Closure::once_into_js(move || {
            let _ = Url::revoke_object_url(&href);
        });
        window.set_timeout_with_callback_and_timeout_and_arguments_0(
            revoke.unchecked_ref(),
            REVOKE_DELAY_MS,
        )?;

        Ok(())
    }
}

impl OutputDispatcher for BrowserDownload {
    fn dispatch(&self, bytes: &[u8], file_name: &str) -> Result<DispatchReceipt> {
        self.trigger(bytes, file_name)
            .map_err(|err| Error::other(format!("Download failed: {err:?}")))?;

        Ok(DispatchReceipt {
            location: file_name.to_string(),
            bytes_written: bytes.len() as u64,
        })
    }
}
