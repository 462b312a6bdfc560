// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for imagetools.

use thiserror::Error;

/// Top-level error type for all imagetools operations.
///
/// The bridge never rewrites an error produced by a native module: whatever
/// variant the module rejects with is exactly what the caller's promise
/// resolves to.
#[derive(Debug, Error)]
pub enum ImageToolsError {
    // -- Validation (raised before any native dispatch) --
    #[error("unsupported compress format: {0}")]
    UnsupportedFormat(String),

    // -- Native module errors --
    #[error("unable to load source image: {0}")]
    SourceUnavailable(String),

    #[error("unsupported image source scheme: {0}")]
    UnsupportedSource(String),

    #[error("unsupported binarization type {0}")]
    UnsupportedType(i32),

    #[error("invalid RGBA color string: {0:?}")]
    InvalidColor(String),

    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    /// Opaque failure reported by a foreign native module.
    #[error("{0}")]
    Native(String),

    // -- Settlement --
    #[error("native module dropped its callbacks without settling")]
    Abandoned,

    #[error("native module reported neither an error nor a response")]
    EmptyResponse,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ImageToolsError {
    /// Stable machine-readable code, used when errors cross a foreign boundary.
    pub fn code(&self) -> &'static str {
        match self {
            ImageToolsError::UnsupportedFormat(_) => "E_UNSUPPORTED_FORMAT",
            ImageToolsError::SourceUnavailable(_) => "E_SOURCE_UNAVAILABLE",
            ImageToolsError::UnsupportedSource(_) => "E_UNSUPPORTED_SOURCE",
            ImageToolsError::UnsupportedType(_) => "E_UNSUPPORTED_TYPE",
            ImageToolsError::InvalidColor(_) => "E_INVALID_COLOR",
            ImageToolsError::Decode(_) => "E_DECODE",
            ImageToolsError::Encode(_) => "E_ENCODE",
            ImageToolsError::Native(_) => "E_NATIVE",
            ImageToolsError::Abandoned => "E_ABANDONED",
            ImageToolsError::EmptyResponse => "E_EMPTY_RESPONSE",
            ImageToolsError::Io(_) => "E_IO",
            ImageToolsError::Serialization(_) => "E_SERIALIZATION",
        }
    }

    /// JSON object `{"code": ..., "message": ...}` for foreign callers.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        })
        .to_string()
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ImageToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_errors_display_their_message_only() {
        assert_eq!(ImageToolsError::Native("boom".into()).to_string(), "boom");
        assert_eq!(ImageToolsError::Native("boom".into()).code(), "E_NATIVE");
    }

    #[test]
    fn json_carries_code_and_message() {
        let err = ImageToolsError::UnsupportedType(7);
        let value: serde_json::Value = serde_json::from_str(&err.to_json()).expect("valid json");
        assert_eq!(value["code"], "E_UNSUPPORTED_TYPE");
        assert_eq!(value["message"], "unsupported binarization type 7");
    }

    #[test]
    fn io_errors_convert() {
        let err: ImageToolsError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.code(), "E_IO");
    }
}
