//! The merge pipeline.
//!
//! Takes an ordered list of entries and produces one PDF:
//! - PDF entries contribute all their pages, in source order, with the
//!   entry rotation added to each page's own rotation.
//! - Image entries contribute exactly one synthesized page.

pub mod image;
pub mod metadata;
pub mod pages;
pub mod pipeline;

pub use pipeline::{MergeOutput, MergePipeline, MergeProgress, MergeStatistics};

use crate::config::{CompressionLevel, Metadata};
use crate::entry::Entry;
use crate::error::MergeError;

/// Options controlling the merged document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Stream compression applied before serializing.
    pub compression: CompressionLevel,

    /// Info dictionary fields.
    pub metadata: Metadata,
}

/// Merge `entries` with default options.
///
/// Convenience wrapper around [`MergePipeline::merge`].
pub fn merge_entries(entries: &[Entry]) -> Result<MergeOutput, MergeError> {
    MergePipeline::new().merge(entries)
}
