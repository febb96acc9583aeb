// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Smoothed resampling and prep-size calculation.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};

/// Filter used for every resample. Catmull-Rom is a close match for the
/// "high quality" smoothing browsers use when drawing a scaled image.
const FILTER: FilterType = FilterType::CatmullRom;

/// Resample an RGBA image to exactly `width` x `height`.
///
/// Returns a plain copy when the size already matches.
pub fn resize(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FILTER)
}

/// Resample a single-channel mask to exactly `width` x `height`.
pub fn resize_mask(mask: &GrayImage, width: u32, height: u32) -> GrayImage {
    if mask.dimensions() == (width, height) {
        return mask.clone();
    }
    imageops::resize(mask, width, height, FILTER)
}

/// Dimensions of the prep copy: the longest side is capped at `max_dim`,
/// images are never upscaled, and each side is at least one pixel.
pub fn prep_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 {
        return (0, 0);
    }
    let scale = (max_dim as f64 / longest as f64).min(1.0);
    let w = ((width as f64 * scale).floor() as u32).max(1);
    let h = ((height as f64 * scale).floor() as u32).max(1);
    (w, h)
}

/// Downscaled working copy for network transfer.
pub fn prep_image(image: &RgbaImage, max_dim: u32) -> RgbaImage {
    let (w, h) = prep_dimensions(image.width(), image.height(), max_dim);
    resize(image, w, h)
}
