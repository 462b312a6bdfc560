// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The two native operations: binary image generation and RGBA extraction.
//
// Both are synchronous and CPU-bound. Callers that must not block (the
// platform bridge) run them on a blocking task or worker thread.

use tracing::{info, instrument};

use imagetools_core::error::Result;
use imagetools_core::{BinarizeType, BinaryImageArgs, Response, RgbaColor, ToolsConfig};

use crate::binarize::BinarizeOptions;
use crate::output::file_uri;
use crate::processor::ImageProcessor;
use crate::source::ImageSource;

/// Native image module. Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct ImageToolsEngine {
    config: ToolsConfig,
}

impl ImageToolsEngine {
    pub fn new(config: ToolsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Binarize the source image and write it to the cache directory.
    ///
    /// The response always carries `path`, `uri`, `name`, and `size`; `base64`
    /// (a PNG encoding of the binary image) only when requested.
    #[instrument(skip(self, args), fields(path = %args.image_path, kind = args.binarize_type))]
    pub fn create_binary_image(&self, args: &BinaryImageArgs) -> Result<Response> {
        let kind = BinarizeType::try_from(args.binarize_type)?;
        let front: RgbaColor = args.front_color.parse()?;
        let back: RgbaColor = args.back_color.parse()?;
        let source = ImageSource::parse(&args.image_path)?;

        let options = BinarizeOptions::new(kind, args.threshold)
            .with_colors(front, back)
            .with_block_radius(self.config.adaptive_block_radius);

        let binary = ImageProcessor::load(&source, self.config.max_decode_area)?.binarize(&options);
        let cache_dir = self.config.ensure_cache_dir()?;
        let saved = binary.save_new(cache_dir, args.compress_format, args.quality)?;
        let base64 = if args.output_base64 {
            Some(binary.to_base64_png()?)
        } else {
            None
        };

        info!(
            output = %saved.path.display(),
            size = saved.size,
            format = %args.compress_format,
            "Binary image created"
        );
        Ok(Response {
            uri: saved.uri(),
            path: saved.path.to_string_lossy().into_owned(),
            name: Some(saved.name),
            size: Some(saved.size),
            base64,
            ..Default::default()
        })
    }

    /// Decode the source and return its dimensions and RGBA pixels.
    #[instrument(skip(self))]
    pub fn get_image_rgbas(&self, image_path: &str) -> Result<Response> {
        let source = ImageSource::parse(image_path)?;
        let processor = ImageProcessor::load(&source, self.config.max_decode_area)?;
        let (width, height) = (processor.width(), processor.height());
        info!(width, height, "Extracting RGBA pixels");

        let (path, uri) = match source.path() {
            Some(file) => (file.to_string_lossy().into_owned(), file_uri(file)),
            None => (String::new(), image_path.to_string()),
        };
        Ok(Response {
            path,
            uri,
            width: Some(width),
            height: Some(height),
            rgba: Some(processor.rgba_pixels()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use imagetools_core::{BinaryImageRequest, CompressFormat, ImageToolsError};

    struct Fixture {
        _dir: tempfile::TempDir,
        engine: ImageToolsEngine,
        source: String,
    }

    /// 4x2 image: left half dark, right half light.
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("source.png");
        RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 { Rgba([10, 10, 10, 255]) } else { Rgba([240, 240, 240, 255]) }
        })
        .save_with_format(&source, ImageFormat::Png)
        .expect("write source");

        let config = ToolsConfig::default().with_cache_dir(dir.path().join("cache"));
        Fixture {
            engine: ImageToolsEngine::new(config),
            source: source.to_string_lossy().into_owned(),
            _dir: dir,
        }
    }

    #[test]
    fn creates_binary_png_in_cache() {
        let fx = fixture();
        let args = BinaryImageRequest::new(&fx.source, 1, 128, CompressFormat::Png, 100).into_args();
        let response = fx.engine.create_binary_image(&args).expect("create");

        assert!(std::path::Path::new(&response.path).is_file());
        assert!(response.uri.starts_with("file://"));
        assert!(response.base64.is_none());
        assert!(response.name.as_deref().is_some_and(|n| n.ends_with(".png")));

        let out = image::open(&response.path).expect("decode output").to_rgba8();
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(3, 1), &Rgba([255, 255, 255, 255]));
        assert_eq!(
            response.size,
            Some(std::fs::metadata(&response.path).expect("stat").len())
        );
    }

    #[test]
    fn base64_is_added_on_request() {
        let fx = fixture();
        let args = BinaryImageRequest::new(&fx.source, 1, 128, CompressFormat::Jpeg, 70)
            .with_base64(true)
            .into_args();
        let response = fx.engine.create_binary_image(&args).expect("create");
        assert!(response.base64.is_some());
        assert!(!response.path.is_empty());
    }

    #[test]
    fn custom_colors_reach_the_output() {
        let fx = fixture();
        let args = BinaryImageRequest::new(&fx.source, 1, 128, CompressFormat::Png, 100)
            .with_front_color("ff0000ff")
            .with_back_color("00ff0080")
            .into_args();
        let response = fx.engine.create_binary_image(&args).expect("create");
        let out = image::open(&response.path).expect("decode").to_rgba8();
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(3, 0), &Rgba([0, 255, 0, 128]));
    }

    #[test]
    fn rejects_unknown_type_and_bad_colors() {
        let fx = fixture();
        let args = BinaryImageRequest::new(&fx.source, 9, 128, CompressFormat::Png, 100).into_args();
        assert!(matches!(
            fx.engine.create_binary_image(&args),
            Err(ImageToolsError::UnsupportedType(9))
        ));

        let args = BinaryImageRequest::new(&fx.source, 1, 128, CompressFormat::Png, 100)
            .with_front_color("black")
            .into_args();
        assert!(matches!(
            fx.engine.create_binary_image(&args),
            Err(ImageToolsError::InvalidColor(_))
        ));
    }

    #[test]
    fn adaptive_type_tolerates_any_configured_radius() {
        let fx = fixture();
        let config = ToolsConfig {
            adaptive_block_radius: u32::MAX,
            ..fx.engine.config().clone()
        };
        let engine = ImageToolsEngine::new(config);
        let args = BinaryImageRequest::new(&fx.source, 3, 0, CompressFormat::Png, 100).into_args();
        let response = engine.create_binary_image(&args).expect("create");
        let out = image::open(&response.path).expect("decode").to_rgba8();
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(3, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn missing_source_is_reported() {
        let fx = fixture();
        let args = BinaryImageRequest::new("/no/such/image.png", 1, 128, CompressFormat::Png, 100)
            .into_args();
        assert!(matches!(
            fx.engine.create_binary_image(&args),
            Err(ImageToolsError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn extracts_rgba_pixels() {
        let fx = fixture();
        let response = fx.engine.get_image_rgbas(&fx.source).expect("rgba");
        assert_eq!(response.width, Some(4));
        assert_eq!(response.height, Some(2));
        let rgba = response.rgba.expect("pixels");
        assert_eq!(rgba.len(), 8);
        assert_eq!(rgba[0], 0x0a0a_0aff);
        assert_eq!(rgba[3], 0xf0f0_f0ff);
        assert_eq!(response.path, fx.source);
    }

    #[test]
    fn extracts_rgba_from_data_uri() {
        use base64::{Engine as _, engine::general_purpose};

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255])))
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode");
        let uri = format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(bytes));

        let response = ImageToolsEngine::default().get_image_rgbas(&uri).expect("rgba");
        assert_eq!(response.rgba, Some(vec![0x0102_03ff]));
        assert!(response.path.is_empty());
        assert_eq!(response.uri, uri);
    }
}
