// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image source resolution and decoding.
//
// A source locator is either a plain filesystem path, a `file://` URI, or a
// `data:image/png;base64,...` / `data:image/jpeg;base64,...` URI. Sources
// whose pixel area exceeds the configured limit are downsampled by a
// power-of-two sample size straight after decoding.
//
// Dimensions are read from the header first and the decoder's allocation
// limit is sized to that image, so large sources decode instead of tripping
// the `image` crate's default 512 MiB cap. Peak memory is still one
// full-resolution buffer; only the retained image is bounded by the area limit.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use tracing::{debug, info, instrument};

use imagetools_core::error::{ImageToolsError, Result};

const SCHEME_FILE: &str = "file";
const SCHEME_DATA: &str = "data";
const SCHEME_CONTENT: &str = "content";

const IMAGE_JPEG: &str = "image/jpeg";
const IMAGE_PNG: &str = "image/png";

/// Widest pixel type a decoder may produce (RGBA, 32-bit float channels).
const MAX_BYTES_PER_PIXEL: u64 = 16;

/// A resolved image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// An image file on the local filesystem.
    File(PathBuf),
    /// An image embedded in a `data:` URI, already base64-decoded.
    Inline { format: ImageFormat, bytes: Vec<u8> },
}

impl ImageSource {
    /// Resolve a locator string into a source.
    pub fn parse(locator: &str) -> Result<Self> {
        match split_scheme(locator) {
            None => Ok(ImageSource::File(PathBuf::from(locator))),
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case(SCHEME_FILE) => {
                let path = rest.strip_prefix("//").unwrap_or(rest);
                Ok(ImageSource::File(PathBuf::from(path)))
            }
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case(SCHEME_DATA) => parse_data_uri(rest),
            Some((scheme, _)) if scheme.eq_ignore_ascii_case(SCHEME_CONTENT) => Err(
                ImageToolsError::UnsupportedSource(format!(
                    "{SCHEME_CONTENT}:// URIs must be resolved by the host content resolver"
                )),
            ),
            Some((scheme, _)) => Err(ImageToolsError::UnsupportedSource(scheme.to_string())),
        }
    }

    /// Filesystem path of a `File` source.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ImageSource::File(path) => Some(path),
            ImageSource::Inline { .. } => None,
        }
    }

    /// Decode the source, downsampling when its area exceeds `max_area`.
    ///
    /// A `max_area` of zero disables downsampling.
    #[instrument(skip(self), fields(source = %self.describe()))]
    pub fn load(&self, max_area: u64) -> Result<DynamicImage> {
        let image = match self {
            ImageSource::File(path) => decode_file(path)?,
            ImageSource::Inline { format, bytes } => decode_inline(*format, bytes)?,
        };

        let sample = sample_size(image.width(), image.height(), max_area);
        if sample == 1 {
            debug!(width = image.width(), height = image.height(), "Image decoded");
            return Ok(image);
        }

        let width = (image.width() / sample).max(1);
        let height = (image.height() / sample).max(1);
        info!(
            from_w = image.width(),
            from_h = image.height(),
            sample,
            width,
            height,
            "Downsampling oversized image"
        );
        Ok(image.resize_exact(width, height, FilterType::Triangle))
    }

    fn describe(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Inline { format, bytes } => format!("inline {format:?} ({} bytes)", bytes.len()),
        }
    }
}

/// Power-of-two sample size that brings `width * height` under `max_area`.
///
/// Each doubling of the sample size divides the area by four.
pub fn sample_size(width: u32, height: u32, max_area: u64) -> u32 {
    if max_area == 0 {
        return 1;
    }
    let mut area = u64::from(width) * u64::from(height);
    let mut sample = 1u32;
    while area > max_area {
        area /= 4;
        sample = sample.saturating_mul(2);
    }
    sample
}

/// Split `scheme:rest`. A scheme must start with a letter and be at least two
/// characters long, so Windows drive letters are treated as plain paths.
fn split_scheme(locator: &str) -> Option<(&str, &str)> {
    let colon = locator.find(':')?;
    let scheme = &locator[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if scheme.len() < 2
        || !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }
    Some((scheme, &locator[colon + 1..]))
}

fn parse_data_uri(rest: &str) -> Result<ImageSource> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageToolsError::SourceUnavailable("data URI has no payload".into()))?;

    let mime = header.replace('\\', "/").to_ascii_lowercase();
    let format = if mime.starts_with(IMAGE_JPEG) {
        ImageFormat::Jpeg
    } else if mime.starts_with(IMAGE_PNG) {
        ImageFormat::Png
    } else {
        return Err(ImageToolsError::UnsupportedSource(format!("data URI of type {mime:?}")));
    };

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| ImageToolsError::Decode(format!("invalid base64 payload: {err}")))?;
    Ok(ImageSource::Inline { format, bytes })
}

/// Decoder limits admitting a `width` x `height` image of any pixel type.
///
/// Never lower than the `image` crate's defaults.
pub fn decode_limits(width: u32, height: u32) -> Limits {
    let mut limits = Limits::default();
    let needed = u64::from(width)
        .saturating_mul(u64::from(height))
        .saturating_mul(MAX_BYTES_PER_PIXEL);
    limits.max_alloc = Some(limits.max_alloc.map_or(needed, |default| default.max(needed)));
    limits
}

/// Read the header, then decode with limits sized to the image.
///
/// `open` is called twice because reading the dimensions consumes the reader.
fn decode_sized<R, F>(open: F, what: &str) -> Result<DynamicImage>
where
    R: BufRead + Seek,
    F: Fn() -> Result<ImageReader<R>>,
{
    let (width, height) = open()?
        .into_dimensions()
        .map_err(|err| ImageToolsError::Decode(format!("{what}: {err}")))?;
    debug!(width, height, "Source header read");

    let mut reader = open()?;
    reader.limits(decode_limits(width, height));
    reader
        .decode()
        .map_err(|err| ImageToolsError::Decode(format!("{what}: {err}")))
}

fn decode_file(path: &Path) -> Result<DynamicImage> {
    let open = || -> Result<ImageReader<BufReader<File>>> {
        ImageReader::open(path)
            .map_err(|err| ImageToolsError::SourceUnavailable(format!("{}: {err}", path.display())))?
            .with_guessed_format()
            .map_err(|err| ImageToolsError::SourceUnavailable(format!("{}: {err}", path.display())))
    };
    decode_sized(open, &path.display().to_string())
}

fn decode_inline(format: ImageFormat, bytes: &[u8]) -> Result<DynamicImage> {
    let open = || -> Result<ImageReader<Cursor<&[u8]>>> {
        Ok(ImageReader::with_format(Cursor::new(bytes), format))
    };
    decode_sized(open, &format!("inline {format:?} image"))
}
