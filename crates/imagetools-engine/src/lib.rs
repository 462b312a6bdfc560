// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imagetools-engine: the native image module behind the bridge.
//
// Loads images from paths, `file://` and `data:` URIs (downsampling very large
// sources), binarizes them with configurable foreground/background colors,
// encodes the result into the cache directory, and extracts raw RGBA pixels.

pub mod binarize;
pub mod engine;
pub mod output;
pub mod processor;
pub mod source;

pub use binarize::BinarizeOptions;
pub use engine::ImageToolsEngine;
pub use processor::ImageProcessor;
pub use source::ImageSource;
