// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: request parameters, native call arguments, and the
// response record shared by both operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::{DEFAULT_BACK_COLOR, DEFAULT_FRONT_COLOR};
use crate::error::ImageToolsError;

/// Output compression format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompressFormat {
    Png,
    Jpeg,
    Webp,
}

impl CompressFormat {
    /// Upper-case wire name ("PNG", "JPEG", "WEBP").
    pub fn name(self) -> &'static str {
        match self {
            CompressFormat::Png => "PNG",
            CompressFormat::Jpeg => "JPEG",
            CompressFormat::Webp => "WEBP",
        }
    }

    /// File extension used for files written in this format.
    pub fn extension(self) -> &'static str {
        match self {
            CompressFormat::Png => "png",
            CompressFormat::Jpeg => "jpg",
            CompressFormat::Webp => "webp",
        }
    }
}

impl FromStr for CompressFormat {
    type Err = ImageToolsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PNG" => Ok(CompressFormat::Png),
            "JPEG" => Ok(CompressFormat::Jpeg),
            "WEBP" => Ok(CompressFormat::Webp),
            _ => Err(ImageToolsError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for CompressFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Thresholding algorithm selected by the numeric `type` argument.
///
/// The bridge forwards the raw number untouched; only the native module
/// interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarizeType {
    /// Fixed threshold on weighted luma (`0.3 R + 0.59 G + 0.11 B`).
    Global,
    /// Threshold derived from the luma histogram; the caller's threshold is ignored.
    Otsu,
    /// Local mean over a square neighbourhood, minus the caller's threshold.
    AdaptiveMean,
}

impl BinarizeType {
    pub fn code(self) -> i32 {
        match self {
            BinarizeType::Global => 1,
            BinarizeType::Otsu => 2,
            BinarizeType::AdaptiveMean => 3,
        }
    }
}

impl TryFrom<i32> for BinarizeType {
    type Error = ImageToolsError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(BinarizeType::Global),
            2 => Ok(BinarizeType::Otsu),
            3 => Ok(BinarizeType::AdaptiveMean),
            other => Err(ImageToolsError::UnsupportedType(other)),
        }
    }
}

/// Parameters of a `create_binary_image` call as the application supplies them.
///
/// Colors are optional here; [`BinaryImageRequest::into_args`] fills in the
/// defaults so the native module always receives a fully specified call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryImageRequest {
    pub path: String,
    #[serde(rename = "type")]
    pub binarize_type: i32,
    pub threshold: i32,
    pub format: CompressFormat,
    pub quality: i32,
    #[serde(default)]
    pub output_base64: bool,
    #[serde(default)]
    pub front_color: Option<String>,
    #[serde(default)]
    pub back_color: Option<String>,
}

impl BinaryImageRequest {
    pub fn new(
        path: impl Into<String>,
        binarize_type: i32,
        threshold: i32,
        format: CompressFormat,
        quality: i32,
    ) -> Self {
        Self {
            path: path.into(),
            binarize_type,
            threshold,
            format,
            quality,
            output_base64: false,
            front_color: None,
            back_color: None,
        }
    }

    pub fn with_base64(mut self, output_base64: bool) -> Self {
        self.output_base64 = output_base64;
        self
    }

    pub fn with_front_color(mut self, color: impl Into<String>) -> Self {
        self.front_color = Some(color.into());
        self
    }

    pub fn with_back_color(mut self, color: impl Into<String>) -> Self {
        self.back_color = Some(color.into());
        self
    }

    /// Resolve defaults and produce the arguments forwarded to the native module.
    pub fn into_args(self) -> BinaryImageArgs {
        BinaryImageArgs {
            image_path: self.path,
            binarize_type: self.binarize_type,
            threshold: self.threshold,
            compress_format: self.format,
            quality: self.quality,
            output_base64: self.output_base64,
            front_color: self
                .front_color
                .unwrap_or_else(|| DEFAULT_FRONT_COLOR.to_string()),
            back_color: self
                .back_color
                .unwrap_or_else(|| DEFAULT_BACK_COLOR.to_string()),
        }
    }
}

/// Fully specified arguments of a native `createBinaryImage` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryImageArgs {
    pub image_path: String,
    pub binarize_type: i32,
    pub threshold: i32,
    pub compress_format: CompressFormat,
    pub quality: i32,
    pub output_base64: bool,
    pub front_color: String,
    pub back_color: String,
}

/// Record returned to the caller on success.
///
/// `path` and `uri` are always populated by `create_binary_image`. The
/// pixel fields are populated by `get_image_rgbas` only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub path: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Row-major pixels packed as `0xRRGGBBAA`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgba: Option<Vec<u32>>,
}

impl Response {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_colors() {
        let args = BinaryImageRequest::new("/tmp/a.png", 1, 128, CompressFormat::Png, 90).into_args();
        assert_eq!(args.front_color, "000000ff");
        assert_eq!(args.back_color, "ffffffff");
        assert!(!args.output_base64);
    }

    #[test]
    fn request_keeps_explicit_colors() {
        let args = BinaryImageRequest::new("/tmp/a.png", 1, 128, CompressFormat::Jpeg, 90)
            .with_front_color("ff0000ff")
            .with_back_color("00000000")
            .with_base64(true)
            .into_args();
        assert_eq!(args.front_color, "ff0000ff");
        assert_eq!(args.back_color, "00000000");
        assert!(args.output_base64);
        assert_eq!(args.compress_format, CompressFormat::Jpeg);
    }

    #[test]
    fn compress_format_parsing() {
        assert_eq!("PNG".parse::<CompressFormat>().unwrap(), CompressFormat::Png);
        assert_eq!("jpeg".parse::<CompressFormat>().unwrap(), CompressFormat::Jpeg);
        assert_eq!("WEBP".parse::<CompressFormat>().unwrap(), CompressFormat::Webp);
        assert!(matches!(
            "GIF".parse::<CompressFormat>(),
            Err(ImageToolsError::UnsupportedFormat(name)) if name == "GIF"
        ));
    }

    #[test]
    fn binarize_type_codes() {
        assert_eq!(BinarizeType::try_from(1).unwrap(), BinarizeType::Global);
        assert_eq!(BinarizeType::try_from(3).unwrap().code(), 3);
        assert!(matches!(
            BinarizeType::try_from(0),
            Err(ImageToolsError::UnsupportedType(0))
        ));
    }

    #[test]
    fn response_omits_absent_fields() {
        let response = Response {
            path: "/cache/1.png".into(),
            uri: "file:///cache/1.png".into(),
            name: Some("1.png".into()),
            size: Some(42),
            ..Default::default()
        };
        let json = response.to_json().unwrap();
        assert!(json.contains("\"path\":\"/cache/1.png\""));
        assert!(json.contains("\"size\":42"));
        assert!(!json.contains("base64"));
        assert!(!json.contains("rgba"));
    }

    #[test]
    fn request_deserializes_from_camel_case_json() {
        let request: BinaryImageRequest = serde_json::from_str(
            r#"{"path":"/a.png","type":1,"threshold":100,"format":"JPEG","quality":80}"#,
        )
        .unwrap();
        assert_eq!(request.format, CompressFormat::Jpeg);
        assert!(request.front_color.is_none());
        assert!(!request.output_base64);
    }
}
