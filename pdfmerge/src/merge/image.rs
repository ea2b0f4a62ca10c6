//! Synthesizing pages from raster images.
//!
//! Every image becomes one page at 1 pt per pixel. Rotation turns the page
//! itself: for a quarter turn the page is `H×W`, and the image is drawn with
//! a rotation matrix whose origin is chosen so the rotated `W×H` box lands
//! exactly on the page.
//!
//! | rotation | page  | origin             |
//! |----------|-------|--------------------|
//! | 0        | W×H   | (0, 0)             |
//! | 90       | H×W   | (page w, 0)        |
//! | 180      | W×H   | (page w, page h)   |
//! | 270      | H×W   | (0, page h)        |
//!
//! Gray, RGB and CMYK JPEGs are embedded unchanged with `DCTDecode`; the
//! color space comes from the component count of the frame header. Adobe
//! CMYK streams store inverted samples and get a `Decode` array to match.
//! Everything else is decoded to 8-bit RGB, with a gray soft mask when any
//! pixel is translucent, and stored Flate-compressed.

use std::io::{Cursor, Write};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegDecoder;
use image::{ImageDecoder, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use log::warn;

use crate::classify::ImageFormatHint;
use crate::rotation::Rotation;

/// Resource name of the image on its page.
const IMAGE_RESOURCE: &str = "Im0";

/// Where and how an image is drawn on its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlacement {
    /// Page width in points.
    pub page_width: u32,
    /// Page height in points.
    pub page_height: u32,
    /// X of the drawing origin.
    pub origin_x: u32,
    /// Y of the drawing origin.
    pub origin_y: u32,
    /// Native image width.
    pub draw_width: u32,
    /// Native image height.
    pub draw_height: u32,
    /// Rotation of the drawing.
    pub rotation: Rotation,
}

impl ImagePlacement {
    /// Compute the placement of a `width×height` image under `rotation`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfmerge::merge::image::ImagePlacement;
    /// use pdfmerge::rotation::Rotation;
    ///
    /// let placement = ImagePlacement::compute(800, 600, Rotation::Clockwise90);
    /// assert_eq!((placement.page_width, placement.page_height), (600, 800));
    /// assert_eq!((placement.origin_x, placement.origin_y), (600, 0));
    /// ```
    pub fn compute(width: u32, height: u32, rotation: Rotation) -> Self {
        let (page_width, page_height) = if rotation.is_quarter_turn() {
            (height, width)
        } else {
            (width, height)
        };

        let (origin_x, origin_y) = match rotation {
            Rotation::None => (0, 0),
            Rotation::Clockwise90 => (page_width, 0),
            Rotation::Rotate180 => (page_width, page_height),
            Rotation::Clockwise270 => (0, page_height),
        };

        Self {
            page_width,
            page_height,
            origin_x,
            origin_y,
            draw_width: width,
            draw_height: height,
            rotation,
        }
    }

    /// Operands of the `cm` operator: `w·c w·s −h·s h·c x y`.
    pub fn transform(&self) -> [i64; 6] {
        let (c, s) = self.rotation.cos_sin();
        let w = i64::from(self.draw_width);
        let h = i64::from(self.draw_height);

        [
            w * c,
            w * s,
            -h * s,
            h * c,
            i64::from(self.origin_x),
            i64::from(self.origin_y),
        ]
    }

    /// Map a point of the unit image square to page coordinates.
    pub fn map_point(&self, u: i64, v: i64) -> (i64, i64) {
        let [a, b, c, d, e, f] = self.transform();
        (a * u + c * v + e, b * u + d * v + f)
    }
}

/// Pixel data ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pixels {
    /// Original JPEG stream.
    Dct {
        bytes: Vec<u8>,
        color_space: &'static str,
        inverted: bool,
    },
    /// Uncompressed 8-bit samples.
    Raw {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

/// A decoded raster image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Pixels,
}

impl RasterImage {
    /// Decode PNG or JPEG bytes.
    ///
    /// The format is sniffed from the content; `hint` (from the declared
    /// media type) only matters for the mismatch warning.
    ///
    /// # Errors
    ///
    /// Returns the decoder's message if the bytes are not a readable PNG or
    /// JPEG.
    pub fn decode(bytes: &[u8], hint: ImageFormatHint) -> Result<Self, String> {
        let format = match image::guess_format(bytes) {
            Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
            Ok(other) => return Err(format!("unsupported image format: {other:?}")),
            Err(_) => return Err("unrecognized image data".to_string()),
        };

        if format != hint.image_format() {
            warn!(
                "Declared {:?} but content is {format:?}; decoding as {format:?}",
                hint.image_format()
            );
        }

        match format {
            ImageFormat::Jpeg => Self::decode_jpeg(bytes),
            _ => Self::decode_raw(bytes, format),
        }
    }

    fn decode_jpeg(bytes: &[u8]) -> Result<Self, String> {
        let decoder = JpegDecoder::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
        let (width, height) = decoder.dimensions();

        // The decoder reports CMYK as RGB, so the frame header decides
        let Some(frame) = JpegFrame::scan(bytes) else {
            return Self::decode_raw(bytes, ImageFormat::Jpeg);
        };

        let (color_space, inverted) = match frame.components {
            1 => ("DeviceGray", false),
            3 => ("DeviceRGB", false),
            4 => ("DeviceCMYK", frame.adobe),
            _ => return Self::decode_raw(bytes, ImageFormat::Jpeg),
        };

        Ok(Self {
            width,
            height,
            pixels: Pixels::Dct {
                bytes: bytes.to_vec(),
                color_space,
                inverted,
            },
        })
    }

    fn decode_raw(bytes: &[u8], format: ImageFormat) -> Result<Self, String> {
        let image = image::load_from_memory_with_format(bytes, format).map_err(|e| e.to_string())?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixel_count = (width as usize) * (height as usize);
        let mut rgb = Vec::with_capacity(pixel_count * 3);
        let mut alpha = Vec::with_capacity(pixel_count);
        for pixel in rgba.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }

        let alpha = alpha.iter().any(|&a| a != u8::MAX).then_some(alpha);

        Ok(Self {
            width,
            height,
            pixels: Pixels::Raw { rgb, alpha },
        })
    }

    /// Native width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Native height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the original JPEG stream is embedded unchanged.
    pub fn is_passthrough(&self) -> bool {
        matches!(self.pixels, Pixels::Dct { .. })
    }

    /// Whether a soft mask will be attached.
    pub fn has_alpha(&self) -> bool {
        matches!(self.pixels, Pixels::Raw { alpha: Some(_), .. })
    }

    /// Add the image XObject (and its soft mask) to `doc`.
    fn add_xobject(&self, doc: &mut Document) -> Result<ObjectId, String> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "BitsPerComponent" => 8,
        };

        let content = match &self.pixels {
            Pixels::Dct {
                bytes,
                color_space,
                inverted,
            } => {
                dict.set("ColorSpace", *color_space);
                dict.set("Filter", "DCTDecode");
                if *inverted {
                    let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0]
                        .into_iter()
                        .map(Object::Integer)
                        .collect();
                    dict.set("Decode", decode);
                }
                bytes.clone()
            }
            Pixels::Raw { rgb, alpha } => {
                dict.set("ColorSpace", "DeviceRGB");
                dict.set("Filter", "FlateDecode");
                if let Some(alpha) = alpha {
                    let mask = Stream::new(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Image",
                            "Width" => i64::from(self.width),
                            "Height" => i64::from(self.height),
                            "ColorSpace" => "DeviceGray",
                            "BitsPerComponent" => 8,
                            "Filter" => "FlateDecode",
                        },
                        deflate(alpha)?,
                    );
                    dict.set("SMask", doc.add_object(mask));
                }
                deflate(rgb)?
            }
        };

        Ok(doc.add_object(Stream::new(dict, content)))
    }
}

/// Append a page showing `image` under `rotation` to `doc`.
///
/// The page is parented under `parent` but not listed in its `Kids`.
pub fn append_image_page(
    doc: &mut Document,
    parent: ObjectId,
    image: &RasterImage,
    rotation: Rotation,
) -> Result<ObjectId, String> {
    let placement = ImagePlacement::compute(image.width(), image.height(), rotation);
    let image_id = image.add_xobject(doc)?;

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                placement.transform().iter().map(|&v| Object::Integer(v)).collect(),
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(|e| e.to_string())?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            i64::from(placement.page_width).into(),
            i64::from(placement.page_height).into(),
        ],
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_RESOURCE => image_id,
            },
        },
        "Contents" => content_id,
    });

    Ok(page_id)
}

/// What the marker segments before the first scan say about a JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    /// Component count of the start-of-frame header.
    components: u8,
    /// Whether an Adobe APP14 segment precedes the frame.
    adobe: bool,
}

impl JpegFrame {
    /// Walk the marker segments up to the start-of-frame header.
    fn scan(data: &[u8]) -> Option<Self> {
        if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
            return None;
        }

        let mut adobe = false;
        let mut pos = 2;
        while pos + 1 < data.len() {
            if data[pos] != 0xFF {
                pos += 1;
                continue;
            }

            let marker = data[pos + 1];
            pos += 2;

            match marker {
                // Fill bytes and standalone markers
                0xFF | 0x00 | 0x01 | 0xD0..=0xD7 => continue,
                0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => {
                    return data.get(pos + 7).map(|&components| Self { components, adobe });
                }
                // Start of scan without a frame header
                0xDA | 0xD9 => return None,
                _ => {}
            }

            let length = usize::from(u16::from_be_bytes([*data.get(pos)?, *data.get(pos + 1)?]));
            if marker == 0xEE && data.get(pos + 2..pos + 7) == Some(b"Adobe".as_slice()) {
                adobe = true;
            }
            pos += length;
        }

        None
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(|e| e.to_string())?;
    encoder.finish().map_err(|e| e.to_string())
}
