//! pdfmerge - Merge PDF documents and images into a single PDF, locally.
//!
//! This library stages user-selected files, lets the caller reorder and
//! rotate them, and merges them into one document without any file ever
//! leaving the machine. It supports:
//!
//! - PDF inputs (every page, in source order, rotation added to each page)
//! - PNG and JPEG inputs (one page each, sized to the image)
//! - Quarter-turn rotation per entry
//! - Thumbnails for staged files
//! - Metadata and stream compression on the output
//!
//! # Examples
//!
//! ## Staging and merging
//!
//! ```no_run
//! use pdfmerge::collection::EntryList;
//! use pdfmerge::merge::MergePipeline;
//! use pdfmerge::rotation::RotateDirection;
//!
//! # fn example(report: Vec<u8>, scan: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut list = EntryList::new();
//! list.append("report.pdf", "application/pdf", report);
//! let scan_id = list.append("scan.jpg", "image/jpeg", scan);
//!
//! list.rotate(scan_id, RotateDirection::Clockwise);
//! list.move_entry(scan_id, 0);
//!
//! if list.can_merge() {
//!     let output = list.merge(&MergePipeline::new())?;
//!     println!("Created {} page document", output.statistics.total_pages);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading from disk and writing the result
//!
//! ```no_run
//! use pdfmerge::collection::EntryList;
//! use pdfmerge::io::{FileDispatcher, FileReader, OutputDispatcher, DEFAULT_OUTPUT_NAME};
//! use pdfmerge::merge::MergePipeline;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let files = FileReader::new()
//!     .read_all(&[PathBuf::from("a.pdf"), PathBuf::from("b.png")])
//!     .await?;
//!
//! let mut list = EntryList::new();
//! for file in files {
//!     list.append_file(file);
//! }
//!
//! let output = list.merge(&MergePipeline::new())?;
//! FileDispatcher::new(".").dispatch(&output.bytes, DEFAULT_OUTPUT_NAME)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod collection;
pub mod config;
pub mod entry;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod preview;
pub mod rotation;
pub mod utils;

// Re-export commonly used types
pub use classify::FileKind;
pub use collection::EntryList;
pub use config::Config;
pub use entry::{Entry, EntryId};
pub use error::{DecodeError, Error, MergeError, Result};
pub use merge::{MergeOptions, MergeOutput, MergePipeline};
pub use rotation::Rotation;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
