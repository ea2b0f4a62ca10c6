//! Core merge implementation.
//!
//! This module implements the pipeline that turns an ordered list of
//! entries into one PDF. Entries are processed strictly one at a time, in
//! order; the first entry that fails to decode aborts the whole merge.

use lopdf::{Document, Object, ObjectId, dictionary};
use log::{debug, info};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::classify::FileKind;
use crate::config::CompressionLevel;
use crate::entry::Entry;
use crate::error::{DecodeError, MergeError};
use crate::merge::MergeOptions;
use crate::merge::image::{RasterImage, append_image_page};
use crate::merge::metadata::MetadataManager;
use crate::merge::pages::PageImporter;
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone, Serialize)]
pub struct MergeStatistics {
    /// Number of entries merged.
    pub entries_merged: usize,

    /// How many of them were PDFs.
    pub pdf_entries: usize,

    /// How many of them were images.
    pub image_entries: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Sum of the entries' payload sizes.
    pub input_size: u64,

    /// Size of the merged document.
    pub output_size: u64,

    /// Total time taken for the merge.
    pub merge_time: Duration,

    /// Compression level applied.
    pub compression: CompressionLevel,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Result of a merge operation.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// The merged PDF, serialized.
    pub bytes: Vec<u8>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// Progress report emitted after each entry is appended.
#[derive(Debug, Clone, Copy)]
pub struct MergeProgress<'a> {
    /// 1-based position of the entry just appended.
    pub position: usize,
    /// Number of entries in this merge.
    pub total: usize,
    /// Name of the entry.
    pub name: &'a str,
    /// Kind of the entry.
    pub kind: FileKind,
    /// Pages this entry contributed.
    pub pages_added: usize,
}

/// Merge pipeline combining PDFs and images into one document.
#[derive(Debug, Default)]
pub struct MergePipeline {
    options: MergeOptions,
    page_importer: PageImporter,
    metadata_manager: MetadataManager,
}

impl MergePipeline {
    /// Create a pipeline with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with custom options.
    pub fn with_options(options: MergeOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `entries`, in order, into one PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `entries` is empty
    /// - Any payload cannot be decoded as its kind
    /// - The merged document cannot be serialized
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmerge::entry::{Entry, EntryId};
    /// # use pdfmerge::merge::MergePipeline;
    /// # fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
    /// let entries = vec![
    ///     Entry::new(EntryId::from(1), "a.pdf", "application/pdf", a),
    ///     Entry::new(EntryId::from(2), "b.png", "image/png", b),
    /// ];
    /// let output = MergePipeline::new().merge(&entries)?;
    /// println!("{} pages", output.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub fn merge(&self, entries: &[Entry]) -> Result<MergeOutput, MergeError> {
        self.merge_with_progress(entries, |_| {})
    }

    /// Merge `entries`, calling `on_progress` after each one is appended.
    pub fn merge_with_progress<F>(
        &self,
        entries: &[Entry],
        mut on_progress: F,
    ) -> Result<MergeOutput, MergeError>
    where
        F: FnMut(MergeProgress<'_>),
    {
        if entries.is_empty() {
            return Err(MergeError::Empty);
        }

        let start = Instant::now();
        let total = entries.len();

        let mut output = Document::with_version("1.7");
        let pages_id = output.new_object_id();
        let mut kids: Vec<ObjectId> = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            let position = index + 1;
            debug!(
                "Appending {} entry {position}/{total}: {} ({})",
                entry.kind(),
                entry.name(),
                entry.rotation()
            );

            let page_ids = self
                .append_entry(&mut output, pages_id, entry)
                .map_err(|reason| DecodeError::new(position, entry.name(), entry.kind(), reason))?;

            on_progress(MergeProgress {
                position,
                total,
                name: entry.name(),
                kind: entry.kind(),
                pages_added: page_ids.len(),
            });
            kids.extend(page_ids);
        }

        let total_pages = kids.len();
        self.finish_page_tree(&mut output, pages_id, kids)?;

        self.metadata_manager
            .set_metadata(&mut output, &self.options.metadata)?;

        // Drop the source catalogs and outlines nothing points at anymore
        output.prune_objects();

        match self.options.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => output.compress(),
            CompressionLevel::Maximum => {
                output.compress();
                output.delete_zero_length_streams();
                output.prune_objects();
            }
        }

        // Always renumber for consistency
        output.renumber_objects();

        let mut bytes = Vec::new();
        output.save_to(&mut bytes).map_err(|e| MergeError::Serialize {
            reason: e.to_string(),
        })?;

        let statistics = MergeStatistics {
            entries_merged: total,
            pdf_entries: entries.iter().filter(|e| e.kind() == FileKind::Pdf).count(),
            image_entries: entries.iter().filter(|e| e.kind() == FileKind::Image).count(),
            total_pages,
            input_size: entries.iter().map(|e| e.payload().len() as u64).sum(),
            output_size: bytes.len() as u64,
            merge_time: start.elapsed(),
            compression: self.options.compression,
        };

        info!(
            "Merged {} entries into {} pages ({})",
            statistics.entries_merged,
            statistics.total_pages,
            statistics.format_output_size()
        );

        Ok(MergeOutput { bytes, statistics })
    }

    /// Add the pages of one entry to `output`.
    fn append_entry(
        &self,
        output: &mut Document,
        pages_id: ObjectId,
        entry: &Entry,
    ) -> Result<Vec<ObjectId>, String> {
        match entry.kind() {
            FileKind::Pdf => {
                self.page_importer
                    .import(output, pages_id, entry.payload(), entry.rotation())
            }
            FileKind::Image => {
                let image = RasterImage::decode(entry.payload(), entry.image_hint())?;
                let page_id = append_image_page(output, pages_id, &image, entry.rotation())?;
                Ok(vec![page_id])
            }
        }
    }

    /// Write the root page tree node and the catalog.
    fn finish_page_tree(
        &self,
        output: &mut Document,
        pages_id: ObjectId,
        kids: Vec<ObjectId>,
    ) -> Result<(), MergeError> {
        let count = i64::try_from(kids.len())
            .map_err(|_| MergeError::assemble("Too many pages"))?;

        output.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
                "Count" => count,
            }),
        );

        let catalog_id = output.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        output.trailer.set("Root", catalog_id);

        Ok(())
    }
}
