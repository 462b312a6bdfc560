// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// RGBA color strings ("rrggbbaa", 8 hex digits).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ImageToolsError;

/// Default foreground: fully opaque black.
pub const DEFAULT_FRONT_COLOR: &str = "000000ff";

/// Default background: fully opaque white.
pub const DEFAULT_BACK_COLOR: &str = "ffffffff";

/// A color parsed from an 8-hex-digit `rrggbbaa` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RgbaColor {
    pub const BLACK: Self = Self::new(0, 0, 0, 0xff);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in RGBA order, as stored by `image::Rgba`.
    pub fn channels(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Pack into `0xRRGGBBAA`.
    pub fn packed(self) -> u32 {
        u32::from_be_bytes(self.channels())
    }

    pub fn from_packed(value: u32) -> Self {
        let [r, g, b, a] = value.to_be_bytes();
        Self::new(r, g, b, a)
    }
}

impl FromStr for RgbaColor {
    type Err = ImageToolsError;

    /// Accepts exactly eight hex digits, optionally prefixed with `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ImageToolsError::InvalidColor(s.to_string()));
        }
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| ImageToolsError::InvalidColor(s.to_string()))?;
        Ok(Self::from_packed(value))
    }
}

impl TryFrom<String> for RgbaColor {
    type Error = ImageToolsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbaColor> for String {
    fn from(color: RgbaColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for RgbaColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.packed())
    }
}
