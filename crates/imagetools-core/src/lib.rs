// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imagetools: core types, error definitions, and configuration shared across
// all crates.

pub mod color;
pub mod config;
pub mod error;
pub mod types;

pub use color::RgbaColor;
pub use config::ToolsConfig;
pub use error::ImageToolsError;
pub use types::*;
