// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use imagetools_core::config::CACHE_DIR_ENV;
use imagetools_core::{BinaryImageRequest, CompressFormat};

#[derive(Parser, Debug)]
#[command(
    name = "imagetools",
    version,
    about = "Binarize images and extract RGBA pixels through the imagetools bridge"
)]
pub struct Cli {
    /// JSON configuration file. Missing files fall back to the defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory that receives generated images.
    #[arg(long, global = true, env = CACHE_DIR_ENV)]
    pub cache_dir: Option<PathBuf>,

    /// Pretty-print the JSON response.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Write a two-color version of an image to the cache directory.
    Binarize(BinarizeArgs),

    /// Print the dimensions and packed RGBA pixels of an image.
    Rgba {
        /// Path, file:// URI or data: URI of the source image.
        path: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct BinarizeArgs {
    /// Path, file:// URI or data: URI of the source image.
    pub path: String,

    /// 1 = global threshold, 2 = Otsu, 3 = adaptive mean.
    #[arg(long = "type", default_value_t = 1)]
    pub binarize_type: i32,

    #[arg(long, default_value_t = 128)]
    pub threshold: i32,

    /// PNG, JPEG or WEBP.
    #[arg(long, default_value = "PNG")]
    pub format: CompressFormat,

    /// JPEG quality, 1-100.
    #[arg(long, default_value_t = 100)]
    pub quality: i32,

    /// Include a base64 PNG of the result in the response.
    #[arg(long)]
    pub base64: bool,

    /// Foreground color as RRGGBBAA.
    #[arg(long)]
    pub front: Option<String>,

    /// Background color as RRGGBBAA.
    #[arg(long)]
    pub back: Option<String>,
}

impl BinarizeArgs {
    pub fn to_request(&self) -> BinaryImageRequest {
        let mut request = BinaryImageRequest::new(
            self.path.clone(),
            self.binarize_type,
            self.threshold,
            self.format,
            self.quality,
        )
        .with_base64(self.base64);
        if let Some(front) = &self.front {
            request = request.with_front_color(front.clone());
        }
        if let Some(back) = &self.back {
            request = request.with_back_color(back.clone());
        }
        request
    }
}
