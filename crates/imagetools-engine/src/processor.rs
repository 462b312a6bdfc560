// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: binarization, encoding (PNG/JPEG/WEBP/base64), cache
// output, and RGBA pixel extraction. Operates on in-memory images using the
// `image` and `imageproc` crates.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument};

use imagetools_core::CompressFormat;
use imagetools_core::error::{ImageToolsError, Result};

use crate::binarize::{BinarizeOptions, binarize};
use crate::output::{SavedFile, unique_file_name, write_new_file};
use crate::source::ImageSource;

/// Processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`:
///
/// ```ignore
/// let saved = ImageProcessor::load(&ImageSource::parse("photo.jpg")?, 7_680_000)?
///     .binarize(&BinarizeOptions::new(BinarizeType::Global, 128))
///     .save_new(cache_dir, CompressFormat::Png, 100)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode an image source, downsampling when larger than `max_area` pixels.
    pub fn load(source: &ImageSource, max_area: u64) -> Result<Self> {
        let image = source.load(max_area)?;
        debug!(width = image.width(), height = image.height(), "Image loaded");
        Ok(Self::from_dynamic(image))
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Row-major pixels packed as `0xRRGGBBAA`.
    pub fn rgba_pixels(&self) -> Vec<u32> {
        self.image
            .to_rgba8()
            .pixels()
            .map(|p| u32::from_be_bytes(p.0))
            .collect()
    }

    // -- Transformations ------------------------------------------------------

    /// Replace the image with its two-color binarization.
    pub fn binarize(self, options: &BinarizeOptions) -> Self {
        info!(kind = ?options.kind, threshold = options.threshold, "Binarizing image");
        Self {
            image: DynamicImage::ImageRgba8(binarize(&self.image, options)),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode in `format`. Quality only affects JPEG.
    pub fn encode(&self, format: CompressFormat, quality: i32) -> Result<Vec<u8>> {
        match format {
            CompressFormat::Png => self.to_png_bytes(),
            CompressFormat::Jpeg => self.to_jpeg_bytes(quality.clamp(1, 100) as u8),
            CompressFormat::Webp => self.to_webp_bytes(),
        }
    }

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode as JPEG with the given quality (1-100). Alpha is discarded.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|err| ImageToolsError::Encode(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode as lossless WEBP.
    pub fn to_webp_bytes(&self) -> Result<Vec<u8>> {
        let rgba = DynamicImage::ImageRgba8(self.image.to_rgba8());
        encode_to_format(&rgba, ImageFormat::WebP)
    }

    /// PNG encoding of the current image, base64 encoded without line breaks.
    pub fn to_base64_png(&self) -> Result<String> {
        Ok(general_purpose::STANDARD.encode(self.to_png_bytes()?))
    }

    /// Encode and write to a freshly named file in the existing directory `dir`.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub fn save_new(&self, dir: &Path, format: CompressFormat, quality: i32) -> Result<SavedFile> {
        let bytes = self.encode(format, quality)?;
        write_new_file(dir, &unique_file_name(format), &bytes)
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| ImageToolsError::Encode(format!("{:?} encoding failed: {}", format, err)))?;
    Ok(buffer)
}
