//! Rotation tests: PDF pages keep their own rotation plus the entry's,
//! image pages are laid out so the rotated picture fills the page.

use crate::common::{
    FIXTURE_PAGE_HEIGHT, fixture_page_width, jpeg, page_rotations, page_sizes, page_transform,
    pdf, pdf_with_rotations, png,
};
use pdfmerge::merge::MergePipeline;
use pdfmerge::rotation::{RotateDirection, Rotation};
use pdfmerge::EntryList;
use rstest::rstest;

#[test]
fn test_pdf_rotation_adds_to_page_rotation() {
    let mut list = EntryList::new();
    let id = list.append("scan.pdf", "application/pdf", pdf_with_rotations(&[0, 90, 180]));
    list.append("cover.pdf", "application/pdf", pdf(1));
    assert!(list.set_rotation(id, Rotation::Clockwise90));

    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(page_rotations(&output.bytes), vec![90, 180, 270, 0]);
}

#[test]
fn test_pdf_rotation_wraps_around() {
    let mut list = EntryList::new();
    let id = list.append("a.pdf", "application/pdf", pdf_with_rotations(&[270, 180]));
    list.append("b.pdf", "application/pdf", pdf(1));
    list.set_rotation(id, Rotation::Rotate180);

    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(page_rotations(&output.bytes), vec![90, 0, 0]);
}

#[test]
fn test_pdf_rotation_keeps_media_box() {
    let mut list = EntryList::new();
    let id = list.append("a.pdf", "application/pdf", pdf(2));
    list.append("b.png", "image/png", png(4, 4));
    list.set_rotation(id, Rotation::Clockwise270);

    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(
        page_sizes(&output.bytes)[..2],
        [
            (fixture_page_width(0), FIXTURE_PAGE_HEIGHT),
            (fixture_page_width(1), FIXTURE_PAGE_HEIGHT),
        ]
    );
}

#[test]
fn test_rotated_landscape_matches_portrait() {
    let mut list = EntryList::new();
    let landscape = list.append("landscape.png", "image/png", png(80, 60));
    list.append("portrait.png", "image/png", png(60, 80));
    list.rotate(landscape, RotateDirection::Clockwise);

    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(page_sizes(&output.bytes), vec![(60, 80), (60, 80)]);
    assert_eq!(page_rotations(&output.bytes), vec![0, 0]);
}

#[rstest]
#[case(Rotation::None, (40, 30), vec![40, 0, 0, 30, 0, 0])]
#[case(Rotation::Clockwise90, (30, 40), vec![0, 40, -30, 0, 30, 0])]
#[case(Rotation::Rotate180, (40, 30), vec![-40, 0, 0, -30, 40, 30])]
#[case(Rotation::Clockwise270, (30, 40), vec![0, -40, 30, 0, 0, 40])]
fn test_image_page_layout(
    #[case] rotation: Rotation,
    #[case] expected_size: (i64, i64),
    #[case] expected_transform: Vec<i64>,
) {
    let mut list = EntryList::new();
    let id = list.append("photo.jpg", "image/jpeg", jpeg(40, 30));
    list.append("other.pdf", "application/pdf", pdf(1));
    list.set_rotation(id, rotation);

    let output = list.merge(&MergePipeline::new()).unwrap();

    assert_eq!(page_sizes(&output.bytes)[0], expected_size);
    assert_eq!(page_transform(&output.bytes, 0), expected_transform);
}

#[test]
fn test_four_clockwise_turns_restore_original() {
    let mut list = EntryList::new();
    let id = list.append("a.pdf", "application/pdf", pdf_with_rotations(&[90]));
    list.append("b.pdf", "application/pdf", pdf(1));

    for _ in 0..4 {
        list.rotate(id, RotateDirection::Clockwise);
    }
    assert_eq!(list.get(id).unwrap().rotation(), Rotation::None);

    let output = list.merge(&MergePipeline::new()).unwrap();
    assert_eq!(page_rotations(&output.bytes), vec![90, 0]);
}

#[test]
fn test_counter_clockwise_from_none() {
    let mut list = EntryList::new();
    let id = list.append("a.png", "image/png", png(10, 20));

    assert_eq!(
        list.rotate(id, RotateDirection::CounterClockwise),
        Some(Rotation::Clockwise270)
    );
}
