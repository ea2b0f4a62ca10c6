//! Fixture builders and inspection helpers shared by the integration tests.
//!
//! Fixtures are generated in memory: PDFs with lopdf, rasters with the
//! image crate. Every PDF page gets a distinct media box width so page
//! order can be checked after a merge.

#![allow(dead_code)]

use lopdf::{Document, Object, dictionary};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Width of page `index` in fixtures from [`pdf_with_rotations`].
pub fn fixture_page_width(index: usize) -> i64 {
    200 + index as i64
}

/// Height of every page in fixtures from [`pdf_with_rotations`].
pub const FIXTURE_PAGE_HEIGHT: i64 = 500;

/// A PDF with one page per entry of `rotations`, each carrying that
/// `/Rotate` value (0 means no `/Rotate` key).
pub fn pdf_with_rotations(rotations: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = rotations
        .iter()
        .enumerate()
        .map(|(index, &rotate)| {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    fixture_page_width(index).into(),
                    FIXTURE_PAGE_HEIGHT.into(),
                ],
            };
            if rotate != 0 {
                page.set("Rotate", rotate);
            }
            doc.add_object(page).into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => rotations.len() as i64,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize fixture PDF");
    bytes
}

/// A PDF with `pages` unrotated pages.
pub fn pdf(pages: usize) -> Vec<u8> {
    pdf_with_rotations(&vec![0; pages])
}

/// A solid-color PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(
        image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 40, 40]),
        )),
        image::ImageFormat::Png,
    )
}

/// A PNG with a translucent pixel.
pub fn translucent_png(width: u32, height: u32) -> Vec<u8> {
    let mut rgba = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 255, 255]));
    rgba.put_pixel(0, 0, image::Rgba([0, 0, 255, 64]));
    encode(image::DynamicImage::ImageRgba8(rgba), image::ImageFormat::Png)
}

/// A solid-color baseline JPEG.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(
        image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([40, 200, 40]),
        )),
        image::ImageFormat::Jpeg,
    )
}

fn encode(image: image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture image");
    bytes
}

/// Bytes that start like a PDF but are not one.
pub fn corrupted_pdf() -> Vec<u8> {
    b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R\ngarbage without end".to_vec()
}

fn number(obj: &Object) -> f64 {
    match obj {
        Object::Integer(value) => *value as f64,
        Object::Real(value) => f64::from(*value),
        other => panic!("not a number: {other:?}"),
    }
}

/// Load merged output, panicking with context if it is not a PDF.
pub fn load(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).expect("merged output should parse")
}

/// `(width, height)` of every page's media box, in page order.
pub fn page_sizes(bytes: &[u8]) -> Vec<(i64, i64)> {
    let doc = load(bytes);
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).expect("page dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(|b| b.as_array())
                .expect("page media box");
            let coords: Vec<f64> = media_box.iter().map(number).collect();
            (
                (coords[2] - coords[0]).round() as i64,
                (coords[3] - coords[1]).round() as i64,
            )
        })
        .collect()
}

/// `/Rotate` of every page (0 when absent), in page order.
pub fn page_rotations(bytes: &[u8]) -> Vec<i64> {
    let doc = load(bytes);
    doc.get_pages()
        .values()
        .map(|&page_id| {
            doc.get_dictionary(page_id)
                .expect("page dictionary")
                .get(b"Rotate")
                .and_then(|r| r.as_i64())
                .unwrap_or(0)
        })
        .collect()
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// Operands of the first `cm` operator on page `index`.
pub fn page_transform(bytes: &[u8], index: usize) -> Vec<i64> {
    let doc = load(bytes);
    let page_id = *doc
        .get_pages()
        .values()
        .nth(index)
        .expect("page index in range");
    let content = doc.get_page_content(page_id).expect("page content");
    let content = lopdf::content::Content::decode(&content).expect("decodable content");
    content
        .operations
        .iter()
        .find(|op| op.operator == "cm")
        .expect("cm operator")
        .operands
        .iter()
        .map(|operand| number(operand).round() as i64)
        .collect()
}
