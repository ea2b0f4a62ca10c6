//! Output formatting and display for pdfmerge.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - The staged entry list
//! - Merge summaries
//! - Quiet and verbose modes
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::output::OutputFormatter;
//! use pdfmerge::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Staging files");
//! formatter.success("Merge completed successfully");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::collection::EntryList;
use crate::entry::Entry;
use crate::merge::MergeStatistics;
use crate::utils::format_file_size;

/// One-line description of an entry: name, kind, size and rotation.
pub fn describe_entry(entry: &Entry) -> String {
    let mut details = format!(
        "{}, {}",
        entry.kind(),
        format_file_size(entry.payload().len() as u64)
    );
    if entry.rotation().as_degrees() != 0 {
        details.push_str(&format!(", rotated {}", entry.rotation()));
    }
    format!("{} ({details})", entry.name())
}

/// Display the staged entries in merge order.
pub fn display_entry_list(formatter: &OutputFormatter, list: &EntryList) {
    formatter.section(&format!("Staged {} file(s):", list.len()));
    for (index, entry) in list.entries().iter().enumerate() {
        formatter.list_item(index + 1, &describe_entry(entry));
    }
}

/// Display merge statistics to the user.
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    formatter.info(&format!(
        "Merged {} file(s) ({} PDF, {} image) into {} pages in {:.2}s",
        stats.entries_merged,
        stats.pdf_entries,
        stats.image_entries,
        stats.total_pages,
        stats.merge_time.as_secs_f64()
    ));
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail("Output size", &stats.format_output_size());
}
