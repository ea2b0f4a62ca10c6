//! WASM bindings for merging PDFs and images in the browser.
//!
//! All state lives in Rust inside a [`MergeSession`]; JavaScript only
//! forwards file picks, button clicks and drag-and-drop moves. Files never
//! leave the page: the merged document is handed back as bytes or saved
//! through a download link.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { MergeSession } from './pkg/pdfmerge_wasm.js';
//!
//! await init();
//!
//! const session = new MergeSession();
//! for (const file of input.files) {
//!   session.addFile(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! }
//! session.rotateClockwise(2);
//! session.moveEntry(2, 0);
//! render(session.entries());
//!
//! if (session.canMerge()) {
//!   session.mergeAndDownload();
//! }
//! ```

pub mod download;
pub mod session;

use wasm_bindgen::prelude::*;

pub use download::{BrowserDownload, ObjectUrl};
pub use session::MergeSession;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    pdfmerge::VERSION.to_string()
}

/// File-picker `accept` value for the intake allow-list.
#[wasm_bindgen(js_name = acceptedExtensions)]
pub fn accepted_extensions() -> String {
    pdfmerge::classify::ACCEPTED_EXTENSIONS.join(",")
}
