// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binarization: map every pixel of a source image to one of two colors.
//
// Three algorithms are selected by `BinarizeType`: a fixed global threshold on
// weighted luma, Otsu's histogram threshold, and an adaptive local mean
// computed from an integral image.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::contrast::otsu_level;
use tracing::{debug, instrument};

use imagetools_core::{BinarizeType, RgbaColor};

/// Parameters for one binarization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarizeOptions {
    pub kind: BinarizeType,
    /// Global: luma at or below this value becomes foreground.
    /// Adaptive: offset subtracted from the local mean. Ignored by Otsu.
    pub threshold: i32,
    pub front: RgbaColor,
    pub back: RgbaColor,
    /// Neighbourhood radius for the adaptive algorithm.
    pub block_radius: u32,
}

impl BinarizeOptions {
    pub fn new(kind: BinarizeType, threshold: i32) -> Self {
        Self {
            kind,
            threshold,
            front: RgbaColor::BLACK,
            back: RgbaColor::WHITE,
            block_radius: 15,
        }
    }

    pub fn with_colors(mut self, front: RgbaColor, back: RgbaColor) -> Self {
        self.front = front;
        self.back = back;
        self
    }

    pub fn with_block_radius(mut self, block_radius: u32) -> Self {
        self.block_radius = block_radius;
        self
    }
}

/// Binarize `image` into a two-color RGBA image of the same size.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn binarize(image: &DynamicImage, options: &BinarizeOptions) -> RgbaImage {
    let gray = weighted_luma(&image.to_rgba8());
    let front = Rgba(options.front.channels());
    let back = Rgba(options.back.channels());

    match options.kind {
        BinarizeType::Global => threshold_map(&gray, options.threshold, front, back),
        BinarizeType::Otsu => {
            let level = otsu_level(&gray);
            debug!(level, "Otsu threshold computed");
            threshold_map(&gray, i32::from(level), front, back)
        }
        BinarizeType::AdaptiveMean => {
            adaptive_map(&gray, options.block_radius, options.threshold, front, back)
        }
    }
}

/// Luma with 0.3/0.59/0.11 channel weights, truncated. Alpha is ignored.
pub fn weighted_luma(rgba: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, _]) = *rgba.get_pixel(x, y);
        let gray = f32::from(r) * 0.3 + f32::from(g) * 0.59 + f32::from(b) * 0.11;
        Luma([gray.clamp(0.0, 255.0) as u8])
    })
}

fn threshold_map(gray: &GrayImage, threshold: i32, front: Rgba<u8>, back: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
        if i32::from(gray.get_pixel(x, y).0[0]) <= threshold {
            front
        } else {
            back
        }
    })
}

fn adaptive_map(
    gray: &GrayImage,
    block_radius: u32,
    offset: i32,
    front: Rgba<u8>,
    back: Rgba<u8>,
) -> RgbaImage {
    let (width, height) = gray.dimensions();
    let integral = integral_image(gray);

    RgbaImage::from_fn(width, height, |x, y| {
        let mean = region_mean(&integral, width, height, x, y, block_radius);
        let local = (mean as i32 - offset).clamp(0, 255);
        if i32::from(gray.get_pixel(x, y).0[0]) < local {
            front
        } else {
            back
        }
    })
}

/// Summed-area table with a zero row and column prepended.
fn integral_image(gray: &GrayImage) -> Vec<u64> {
    let (width, height) = gray.dimensions();
    let stride = width as usize + 1;
    let mut table = vec![0u64; stride * (height as usize + 1)];

    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += u64::from(gray.get_pixel(x as u32, y as u32).0[0]);
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
        }
    }
    table
}

/// Mean intensity of the square window centred on (x, y), clipped to the image.
fn region_mean(integral: &[u64], width: u32, height: u32, x: u32, y: u32, radius: u32) -> u64 {
    let stride = width as usize + 1;
    let x0 = x.saturating_sub(radius) as usize;
    let y0 = y.saturating_sub(radius) as usize;
    let x1 = x.saturating_add(radius).saturating_add(1).min(width) as usize;
    let y1 = y.saturating_add(radius).saturating_add(1).min(height) as usize;

    let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
        - integral[y0 * stride + x1]
        - integral[y1 * stride + x0];
    let count = ((x1 - x0) * (y1 - y0)) as u64;
    sum / count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32) -> DynamicImage {
        let img = RgbaImage::from_fn(width, 1, |x, _| {
            let v = (x * 255 / (width - 1)) as u8;
            Rgba([v, v, v, 255])
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn luma_uses_weighted_channels() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([100, 200, 50, 0]));
        // 30 + 118 + 5.5 = 153.5, truncated.
        assert_eq!(weighted_luma(&img).get_pixel(0, 0).0[0], 153);
    }

    #[test]
    fn global_threshold_is_inclusive() {
        let rgba = RgbaImage::from_fn(3, 1, |x, _| {
            let v = [50u8, 100, 150][x as usize];
            Rgba([v, v, v, 255])
        });
        let middle = i32::from(weighted_luma(&rgba).get_pixel(1, 0).0[0]);
        let img = DynamicImage::ImageRgba8(rgba);
        let out = binarize(&img, &BinarizeOptions::new(BinarizeType::Global, middle));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(1, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(2, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn custom_colors_are_applied() {
        let front = RgbaColor::new(255, 0, 0, 128);
        let back = RgbaColor::new(0, 0, 255, 0);
        let options = BinarizeOptions::new(BinarizeType::Global, 127).with_colors(front, back);
        let out = binarize(&gradient(16), &options);
        assert_eq!(out.get_pixel(0, 0), &Rgba(front.channels()));
        assert_eq!(out.get_pixel(15, 0), &Rgba(back.channels()));
    }

    #[test]
    fn negative_threshold_yields_all_background() {
        let out = binarize(&gradient(8), &BinarizeOptions::new(BinarizeType::Global, -1));
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn otsu_splits_a_bimodal_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(20, 1, |x, _| {
            if x < 10 { Rgba([20, 20, 20, 255]) } else { Rgba([230, 230, 230, 255]) }
        }));
        // The caller threshold is ignored by Otsu.
        let out = binarize(&img, &BinarizeOptions::new(BinarizeType::Otsu, 999));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(19, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn adaptive_marks_dark_spot_on_light_page() {
        let mut gray = RgbaImage::from_pixel(21, 21, Rgba([220, 220, 220, 255]));
        gray.put_pixel(10, 10, Rgba([10, 10, 10, 255]));
        let options = BinarizeOptions::new(BinarizeType::AdaptiveMean, 10).with_block_radius(3);
        let out = binarize(&DynamicImage::ImageRgba8(gray), &options);
        assert_eq!(out.get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn output_only_contains_the_two_colors() {
        for kind in [BinarizeType::Global, BinarizeType::Otsu, BinarizeType::AdaptiveMean] {
            let out = binarize(&gradient(64), &BinarizeOptions::new(kind, 128));
            assert!(out
                .pixels()
                .all(|p| *p == Rgba([0, 0, 0, 255]) || *p == Rgba([255, 255, 255, 255])));
        }
    }

    #[test]
    fn huge_block_radius_uses_the_whole_image() {
        let mut rgba = RgbaImage::from_pixel(4, 4, Rgba([200, 200, 200, 255]));
        rgba.put_pixel(1, 2, Rgba([0, 0, 0, 255]));
        let options = BinarizeOptions::new(BinarizeType::AdaptiveMean, 0).with_block_radius(u32::MAX);
        let out = binarize(&DynamicImage::ImageRgba8(rgba), &options);
        assert_eq!(out.get_pixel(1, 2), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(3, 3), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn region_mean_of_uniform_image() {
        let gray = GrayImage::from_pixel(5, 4, Luma([42]));
        let integral = integral_image(&gray);
        assert_eq!(region_mean(&integral, 5, 4, 0, 0, 2), 42);
        assert_eq!(region_mean(&integral, 5, 4, 4, 3, 10), 42);
        assert_eq!(region_mean(&integral, 5, 4, 4, 3, u32::MAX), 42);
    }
}
