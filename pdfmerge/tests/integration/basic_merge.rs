//! Basic merge tests: page counts, page order, and mixed inputs.

use crate::common::{
    FIXTURE_PAGE_HEIGHT, fixture_page_width, jpeg, load, page_sizes, pdf, png, translucent_png,
};
use pdfmerge::config::{CompressionLevel, Metadata};
use pdfmerge::merge::metadata::MetadataManager;
use pdfmerge::merge::{MergeOptions, MergePipeline, merge_entries};
use pdfmerge::{EntryList, FileKind};

#[test]
fn test_merge_two_pdfs() {
    let mut list = EntryList::new();
    list.append("a.pdf", "application/pdf", pdf(2));
    list.append("b.pdf", "application/pdf", pdf(3));

    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(output.statistics.entries_merged, 2);
    assert_eq!(output.statistics.pdf_entries, 2);
    assert_eq!(output.statistics.total_pages, 5);
    assert_eq!(load(&output.bytes).get_pages().len(), 5);
}

#[test]
fn test_pages_follow_entry_order() {
    let mut list = EntryList::new();
    list.append("a.pdf", "application/pdf", pdf(2));
    list.append("photo.png", "image/png", png(40, 30));
    list.append("b.pdf", "application/pdf", pdf(1));

    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(
        page_sizes(&output.bytes),
        vec![
            (fixture_page_width(0), FIXTURE_PAGE_HEIGHT),
            (fixture_page_width(1), FIXTURE_PAGE_HEIGHT),
            (40, 30),
            (fixture_page_width(0), FIXTURE_PAGE_HEIGHT),
        ]
    );
}

#[test]
fn test_reordering_changes_output_order() {
    let mut list = EntryList::new();
    list.append("a.pdf", "application/pdf", pdf(1));
    let photo = list.append("photo.jpg", "image/jpeg", jpeg(64, 48));

    assert!(list.move_entry(photo, 0));
    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(
        page_sizes(&output.bytes),
        vec![(64, 48), (fixture_page_width(0), FIXTURE_PAGE_HEIGHT)]
    );
}

#[test]
fn test_images_only() {
    let mut list = EntryList::new();
    list.append("a.png", "image/png", png(10, 20));
    list.append("b.png", "image/png", translucent_png(30, 10));
    list.append("c.jpg", "image/jpeg", jpeg(16, 16));

    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(output.statistics.image_entries, 3);
    assert_eq!(output.statistics.pdf_entries, 0);
    assert_eq!(page_sizes(&output.bytes), vec![(10, 20), (30, 10), (16, 16)]);
}

#[test]
fn test_single_entry_merges() {
    let mut list = EntryList::new();
    let id = list.append("only.pdf", "application/pdf", pdf(3));

    assert!(!list.can_merge());

    let entries = list.entries();
    assert_eq!(entries[0].id(), id);
    let output = merge_entries(entries).unwrap();
    assert_eq!(output.statistics.total_pages, 3);
}

#[test]
fn test_progress_reports_every_entry() {
    let mut list = EntryList::new();
    list.append("a.pdf", "application/pdf", pdf(2));
    list.append("b.png", "image/png", png(8, 8));

    let mut reports = Vec::new();
    list.merge_with_progress(&MergePipeline::new(), |progress| {
        reports.push((
            progress.position,
            progress.total,
            progress.name.to_string(),
            progress.kind,
            progress.pages_added,
        ));
    })
    .unwrap();

    assert_eq!(
        reports,
        vec![
            (1, 2, "a.pdf".to_string(), FileKind::Pdf, 2),
            (2, 2, "b.png".to_string(), FileKind::Image, 1),
        ]
    );
}

#[test]
fn test_metadata_and_compression_options() {
    let mut list = EntryList::new();
    list.append("a.pdf", "application/pdf", pdf(1));
    list.append("b.jpg", "image/jpeg", jpeg(20, 20));

    let pipeline = MergePipeline::with_options(MergeOptions {
        compression: CompressionLevel::Maximum,
        metadata: Metadata::new(
            Some("Quarterly report".to_string()),
            Some("Finance".to_string()),
            None,
            None,
        ),
    });
    let output = list.merge(&pipeline).unwrap();

    let metadata = MetadataManager::new().get_metadata(&load(&output.bytes));
    assert_eq!(metadata.title.as_deref(), Some("Quarterly report"));
    assert_eq!(metadata.author.as_deref(), Some("Finance"));
    assert_eq!(metadata.subject, None);
    assert_eq!(output.statistics.compression, CompressionLevel::Maximum);
    assert_eq!(output.statistics.output_size, output.bytes.len() as u64);
}

#[test]
fn test_merge_leaves_list_intact() {
    let mut list = EntryList::new();
    list.append("a.pdf", "application/pdf", pdf(1));
    list.append("b.pdf", "application/pdf", pdf(1));
    let before = list.views();

    list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(list.views(), before);
}
