//! Error handling tests.

use crate::common::{corrupted_pdf, jpeg, pdf, png, write_fixture};
use pdfmerge::config::OverwriteMode;
use pdfmerge::io::{FileDispatcher, FileReader, OutputDispatcher};
use pdfmerge::merge::MergePipeline;
use pdfmerge::{EntryList, Error, FileKind, MergeError};
use tempfile::TempDir;

#[test]
fn test_empty_merge_is_rejected() {
    let list = EntryList::new();

    let result = list.merge(&MergePipeline::new());
    assert!(matches!(result, Err(MergeError::Empty)));
}

#[test]
fn test_corrupted_pdf_names_the_entry() {
    let mut list = EntryList::new();
    list.append("good.pdf", "application/pdf", pdf(1));
    list.append("broken.pdf", "application/pdf", corrupted_pdf());
    list.append("photo.png", "image/png", png(4, 4));
    let before = list.views();

    let err = list.merge(&MergePipeline::new()).unwrap_err();

    assert_eq!(err.failed_position(), Some(2));
    match err {
        MergeError::Decode(decode) => {
            assert_eq!(decode.name, "broken.pdf");
            assert_eq!(decode.kind, FileKind::Pdf);
        }
        other => panic!("Expected a decode error, got {other:?}"),
    }
    assert_eq!(list.views(), before);
}

#[test]
fn test_undecodable_image_fails() {
    let mut list = EntryList::new();
    list.append("a.pdf", "application/pdf", pdf(1));
    list.append("fake.png", "image/png", b"not an image at all".to_vec());

    let err = list.merge(&MergePipeline::new()).unwrap_err();
    assert_eq!(err.failed_position(), Some(2));
}

#[test]
fn test_mislabelled_image_is_sniffed() {
    let mut list = EntryList::new();
    list.append("photo.png", "image/png", jpeg(12, 6));
    list.append("scan.jpg", "image/jpeg", png(6, 12));

    let output = list.merge(&MergePipeline::new()).unwrap();
    assert_eq!(output.statistics.total_pages, 2);
}

#[test]
fn test_pdf_bytes_staged_as_image_fail() {
    let mut list = EntryList::new();
    list.append("doc.png", "image/png", pdf(1));
    list.append("b.pdf", "application/pdf", pdf(1));

    let err = list.merge(&MergePipeline::new()).unwrap_err();
    assert_eq!(err.failed_position(), Some(1));
}

#[test]
fn test_decode_error_converts_to_front_end_error() {
    let mut list = EntryList::new();
    list.append("broken.pdf", "application/pdf", corrupted_pdf());

    let err: Error = list.merge(&MergePipeline::new()).unwrap_err().into();
    assert!(err.to_string().contains("broken.pdf"));
    assert_ne!(err.exit_code(), 0);
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();

    let result = FileReader::new().read(&dir.path().join("missing.pdf")).await;
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
}

#[tokio::test]
async fn test_directory_is_not_a_file() {
    let dir = TempDir::new().unwrap();

    let result = FileReader::new().read(dir.path()).await;
    assert!(matches!(result, Err(Error::NotAFile { .. })));
}

#[test]
fn test_dispatcher_does_not_clobber_by_default() {
    let dir = TempDir::new().unwrap();
    let existing = write_fixture(dir.path(), "merged-document.pdf", b"keep me");

    let result = FileDispatcher::new(dir.path()).dispatch(&pdf(1), "merged-document.pdf");

    assert!(matches!(result, Err(Error::OutputExists { .. })));
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
}

#[test]
fn test_dispatcher_force_overwrites() {
    let dir = TempDir::new().unwrap();
    let existing = write_fixture(dir.path(), "out.pdf", b"old");
    let bytes = pdf(1);

    FileDispatcher::new(dir.path())
        .with_overwrite(OverwriteMode::Force)
        .dispatch(&bytes, "out.pdf")
        .unwrap();

    assert_eq!(std::fs::read(&existing).unwrap(), bytes);
}
