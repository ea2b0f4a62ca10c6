//! End-to-end staging tests: read files from disk, stage them, merge and
//! write the result.

use crate::common::{jpeg, page_sizes, pdf, png, write_fixture};
use pdfmerge::io::{
    DEFAULT_OUTPUT_NAME, FileDispatcher, FileReader, IntakeFile, OutputDispatcher,
};
use pdfmerge::merge::MergePipeline;
use pdfmerge::utils::collect_paths_for_patterns;
use pdfmerge::EntryList;
use tempfile::TempDir;

#[tokio::test]
async fn test_read_stage_merge_write() {
    let dir = TempDir::new().unwrap();
    let a = write_fixture(dir.path(), "a.pdf", &pdf(2));
    let b = write_fixture(dir.path(), "b.png", &png(12, 9));

    let files = FileReader::new().read_all(&[a, b]).await.unwrap();
    let mut list = EntryList::new();
    for file in files {
        assert!(list.append_file(file).is_some());
    }
    assert!(list.can_merge());

    let output = list.merge(&MergePipeline::new()).unwrap();
    let out_dir = dir.path().join("out");
    let stats = FileDispatcher::new(&out_dir)
        .save_with_stats(output.bytes.clone(), DEFAULT_OUTPUT_NAME)
        .await
        .unwrap();

    assert_eq!(stats.output_path, out_dir.join("merged-document.pdf"));
    let written = std::fs::read(&stats.output_path).unwrap();
    assert_eq!(written, output.bytes);
    assert_eq!(page_sizes(&written).len(), 3);
}

#[tokio::test]
async fn test_glob_expansion_keeps_argument_order() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "page-1.pdf", &pdf(1));
    write_fixture(dir.path(), "page-2.pdf", &pdf(1));
    write_fixture(dir.path(), "cover.jpg", &jpeg(8, 8));

    let cover = dir.path().join("cover.jpg");
    let pages = dir.path().join("page-*.pdf");
    let paths = collect_paths_for_patterns([
        cover.to_string_lossy().into_owned(),
        pages.to_string_lossy().into_owned(),
    ])
    .unwrap();

    let names: Vec<String> = FileReader::new()
        .read_all(&paths)
        .await
        .unwrap()
        .into_iter()
        .map(|file| file.name)
        .collect();
    assert_eq!(names, vec!["cover.jpg", "page-1.pdf", "page-2.pdf"]);
}

#[test]
fn test_unaccepted_files_are_not_staged() {
    let mut list = EntryList::new();

    assert!(list.append_file(IntakeFile::new("notes.txt", b"hello".to_vec())).is_none());
    assert!(list.append_file(IntakeFile::new("movie.gif", png(2, 2))).is_none());
    assert!(list.append_file(IntakeFile::new("SCAN.JPEG", jpeg(2, 2))).is_some());
    assert!(list.append_file(IntakeFile::new("doc.PDF", pdf(1))).is_some());

    assert_eq!(list.len(), 2);
}

#[test]
fn test_previews_released_on_remove_and_clear() {
    let mut list = EntryList::new();
    let first = list.append("a.png", "image/png", png(20, 10));
    list.append("b.pdf", "application/pdf", pdf(1));
    list.append("c.jpg", "image/jpeg", jpeg(10, 20));
    assert_eq!(list.previews().live_handles(), 3);

    let views = list.views();
    assert!(views[0].has_preview);
    assert!(!views[1].has_preview);

    assert!(list.remove(first));
    assert_eq!(list.previews().live_handles(), 2);
    assert!(!list.remove(first));

    list.clear();
    assert_eq!(list.previews().live_handles(), 0);
}

#[test]
fn test_file_dispatcher_for_path() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("nested").join("report.pdf");
    let (dispatcher, file_name) = FileDispatcher::for_path(&target);

    let receipt = dispatcher.dispatch(&pdf(1), &file_name).unwrap();

    assert_eq!(file_name, "report.pdf");
    assert_eq!(receipt.location, target.display().to_string());
    assert!(target.exists());
}
