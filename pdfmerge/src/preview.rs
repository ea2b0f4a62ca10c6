//! Preview generation for staged files.
//!
//! Previews are cosmetic: they never influence the merge and a failure here
//! never blocks intake. Images get a PNG thumbnail. PDFs are rendered by an
//! optional [`PdfRasterizer`] supplied by the host (the browser binding
//! forwards to pdf.js, for instance). The first rasterizer failure turns PDF
//! previews off for the rest of the generator's lifetime; later PDFs get a
//! placeholder straight away.
//!
//! Every [`PreviewHandle`] holds a lease on its generator's live-handle
//! counter and gives it back when dropped, so a handle is released exactly
//! once, whenever its entry goes away.

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};

use crate::classify::FileKind;
use crate::error::PreviewError;

/// Default longest side of image thumbnails, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 256;

/// A rendered preview bitmap, PNG encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Thumbnail {
    /// Wrap PNG bytes rendered elsewhere, reading the size from the header.
    ///
    /// # Errors
    ///
    /// Returns an error if `png` is not a PNG.
    pub fn from_png(png: Vec<u8>) -> image::ImageResult<Self> {
        let (width, height) =
            image::io::Reader::with_format(Cursor::new(&png), image::ImageFormat::Png)
                .into_dimensions()?;

        Ok(Self { png, width, height })
    }
}

/// Renders the first page of a PDF for preview purposes.
pub trait PdfRasterizer {
    /// Render the first page of `pdf` as a PNG thumbnail.
    fn render_first_page(&self, pdf: &[u8]) -> anyhow::Result<Thumbnail>;
}

/// What a preview shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// A rendered bitmap.
    Thumbnail(Thumbnail),
    /// A generic icon for the given kind.
    Placeholder(FileKind),
}

/// Lease on a generator's live-handle counter.
#[derive(Debug)]
struct Lease(Arc<AtomicUsize>);

impl Lease {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Short-lived display resource attached to one entry.
#[derive(Debug)]
pub struct PreviewHandle {
    preview: Preview,
    _lease: Lease,
}

impl PreviewHandle {
    /// The preview content.
    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// The thumbnail, unless this is a placeholder.
    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        match &self.preview {
            Preview::Thumbnail(thumb) => Some(thumb),
            Preview::Placeholder(_) => None,
        }
    }

    /// Whether this handle shows a placeholder icon.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.preview, Preview::Placeholder(_))
    }
}

/// Produces preview handles and tracks how many are alive.
pub struct PreviewGenerator {
    thumbnail_size: u32,
    image_thumbnails: bool,
    rasterizer: Option<Box<dyn PdfRasterizer>>,
    pdf_previews_enabled: bool,
    live: Arc<AtomicUsize>,
}

impl PreviewGenerator {
    /// Create a generator without a PDF rasterizer.
    pub fn new() -> Self {
        Self {
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            image_thumbnails: true,
            rasterizer: None,
            pdf_previews_enabled: true,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the longest side of image thumbnails.
    pub fn with_thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size.max(1);
        self
    }

    /// Give images a placeholder instead of decoding them for a thumbnail.
    ///
    /// For hosts that never display previews.
    pub fn without_image_thumbnails(mut self) -> Self {
        self.image_thumbnails = false;
        self
    }

    /// Install a PDF rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn PdfRasterizer>) -> Self {
        self.set_rasterizer(rasterizer);
        self
    }

    /// Install or replace the PDF rasterizer and re-enable PDF previews.
    pub fn set_rasterizer(&mut self, rasterizer: Box<dyn PdfRasterizer>) {
        self.rasterizer = Some(rasterizer);
        self.pdf_previews_enabled = true;
    }

    /// Whether PDF previews will still be attempted.
    pub fn pdf_previews_enabled(&self) -> bool {
        self.pdf_previews_enabled && self.rasterizer.is_some()
    }

    /// Number of handles produced by this generator that are still alive.
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Generate a preview for a file. Never fails.
    pub fn generate(&mut self, name: &str, kind: FileKind, bytes: &[u8]) -> PreviewHandle {
        let attempt = match kind {
            FileKind::Pdf => self.render_pdf(name, bytes),
            FileKind::Image if !self.image_thumbnails => Ok(None),
            FileKind::Image => self.thumbnail(name, bytes).map(Some),
        };

        let preview = match attempt {
            Ok(Some(thumb)) => Preview::Thumbnail(thumb),
            Ok(None) => Preview::Placeholder(kind),
            Err(err) => {
                warn!("{err}; using placeholder");
                Preview::Placeholder(kind)
            }
        };

        PreviewHandle {
            preview,
            _lease: Lease::acquire(&self.live),
        }
    }

    /// Render a PDF preview, or `Ok(None)` when PDF previews are off.
    fn render_pdf(&mut self, name: &str, bytes: &[u8]) -> Result<Option<Thumbnail>, PreviewError> {
        if !self.pdf_previews_enabled {
            return Ok(None);
        }
        let Some(rasterizer) = self.rasterizer.as_ref() else {
            return Ok(None);
        };

        match rasterizer.render_first_page(bytes) {
            Ok(thumb) => Ok(Some(thumb)),
            Err(err) => {
                debug!("Disabling PDF previews after failure on {name}");
                self.pdf_previews_enabled = false;
                Err(PreviewError::Rasterize {
                    name: name.to_string(),
                    reason: format!("{err:#}"),
                })
            }
        }
    }

    /// Downscale an image to a PNG thumbnail.
    fn thumbnail(&self, name: &str, bytes: &[u8]) -> Result<Thumbnail, PreviewError> {
        let to_error = |err: image::ImageError| PreviewError::Thumbnail {
            name: name.to_string(),
            reason: err.to_string(),
        };

        let image = image::load_from_memory(bytes).map_err(to_error)?;
        let thumb = image.thumbnail(self.thumbnail_size, self.thumbnail_size);

        let mut png = Vec::new();
        thumb
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(to_error)?;

        Ok(Thumbnail {
            png,
            width: thumb.width(),
            height: thumb.height(),
        })
    }
}

impl Default for PreviewGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PreviewGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewGenerator")
            .field("thumbnail_size", &self.thumbnail_size)
            .field("image_thumbnails", &self.image_thumbnails)
            .field("has_rasterizer", &self.rasterizer.is_some())
            .field("pdf_previews_enabled", &self.pdf_previews_enabled)
            .field("live_handles", &self.live_handles())
            .finish()
    }
}
