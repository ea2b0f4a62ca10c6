//! File classification and the intake allow-list.
//!
//! Classification happens once, at intake, from the file's declared media
//! type. The extension allow-list is applied before that by whoever accepts
//! files (CLI argument expansion, browser drop zone); classification does not
//! re-validate it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File extensions accepted at intake, with leading dot.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = [".pdf", ".png", ".jpg", ".jpeg"];

/// Media type of PDF documents.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Kind of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// A PDF document; all of its pages are copied.
    Pdf,
    /// A raster image; it becomes exactly one page.
    Image,
}

impl FileKind {
    /// Classify a declared media type.
    ///
    /// Returns [`FileKind::Pdf`] for `application/pdf` (case-insensitive,
    /// parameters ignored) and [`FileKind::Image`] for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfmerge::classify::FileKind;
    ///
    /// assert_eq!(FileKind::from_media_type("application/pdf"), FileKind::Pdf);
    /// assert_eq!(FileKind::from_media_type("image/png"), FileKind::Image);
    /// ```
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            Self::Pdf
        } else {
            Self::Image
        }
    }

    /// Lowercase label used in messages and serialized views.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raster sub-type implied by a declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormatHint {
    /// `image/png`
    Png,
    /// `image/jpeg` (and anything else that is not PNG)
    Jpeg,
}

impl ImageFormatHint {
    /// Derive the hint from a declared media type.
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case("image/png") {
            Self::Png
        } else {
            Self::Jpeg
        }
    }

    /// Matching `image` crate format.
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// Lowercased extension of `name`, with leading dot.
fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}

/// Check a file name against the intake allow-list.
pub fn is_accepted(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Declared media type for an accepted file name.
///
/// Front ends without a browser-provided type (the CLI) use this to derive
/// one from the extension. Returns `None` outside the allow-list.
pub fn media_type_for_name(name: &str) -> Option<&'static str> {
    match extension_of(name)?.as_str() {
        ".pdf" => Some(PDF_MEDIA_TYPE),
        ".png" => Some("image/png"),
        ".jpg" | ".jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("application/pdf", FileKind::Pdf)]
    #[case("APPLICATION/PDF", FileKind::Pdf)]
    #[case("application/pdf; charset=binary", FileKind::Pdf)]
    #[case("image/png", FileKind::Image)]
    #[case("image/jpeg", FileKind::Image)]
    #[case("", FileKind::Image)]
    #[case("application/octet-stream", FileKind::Image)]
    fn test_classify_media_type(#[case] media_type: &str, #[case] expected: FileKind) {
        assert_eq!(FileKind::from_media_type(media_type), expected);
    }

    #[rstest]
    #[case("report.pdf", true)]
    #[case("Scan.PNG", true)]
    #[case("photo.jpg", true)]
    #[case("photo.JPEG", true)]
    #[case("notes.txt", false)]
    #[case("archive.pdf.zip", false)]
    #[case("pdf", false)]
    #[case("image.gif", false)]
    fn test_is_accepted(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_accepted(name), expected);
    }

    #[test]
    fn test_media_type_for_name() {
        assert_eq!(media_type_for_name("a.pdf"), Some("application/pdf"));
        assert_eq!(media_type_for_name("a.PNG"), Some("image/png"));
        assert_eq!(media_type_for_name("a.jpeg"), Some("image/jpeg"));
        assert_eq!(media_type_for_name("a.jpg"), Some("image/jpeg"));
        assert_eq!(media_type_for_name("a.webp"), None);
        assert_eq!(media_type_for_name("noext"), None);
    }

    #[test]
    fn test_image_format_hint() {
        assert_eq!(ImageFormatHint::from_media_type("image/png"), ImageFormatHint::Png);
        assert_eq!(ImageFormatHint::from_media_type("image/jpeg"), ImageFormatHint::Jpeg);
        assert_eq!(ImageFormatHint::from_media_type("image/jpg"), ImageFormatHint::Jpeg);
    }

    #[test]
    fn test_file_kind_display() {
        assert_eq!(FileKind::Pdf.to_string(), "pdf");
        assert_eq!(FileKind::Image.to_string(), "image");
    }
}
