// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Post-processing: put the inpainted pixels back onto the full-resolution
//! original.
//!
//! The service works on the downscaled prep image, so its result is blurrier
//! than the original everywhere. Only the masked region is taken from the
//! result; the rest of the original is left untouched. This is an alpha
//! punch (pixels are either replaced or kept), not a blend.

use image::imageops;
use image::{GrayImage, RgbaImage};

use super::resize::{resize, resize_mask};
use crate::settings;

/// Zero the alpha of every pixel of `image` whose mask value is below the
/// threshold. `mask` must have the same dimensions as `image`.
pub fn punch_outside_mask(image: &mut RgbaImage, mask: &GrayImage) {
    debug_assert_eq!(image.dimensions(), mask.dimensions());
    for (pixel, m) in image.pixels_mut().zip(mask.pixels()) {
        if m.0[0] < settings::mask::THRESHOLD {
            pixel.0[3] = 0;
        }
    }
}

/// Zero the alpha of pure-black pixels.
pub fn punch_black(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r == 0 && g == 0 && b == 0 {
            pixel.0[3] = 0;
        }
    }
}

/// Composite an inpainted result back onto the original.
///
/// 1. Resize the inpainted result and the mask to the original's size.
/// 2. Zero alpha on the inpainted layer outside the mask.
/// 3. Zero alpha on pure-black pixels of that layer.
/// 4. Draw the layer source-over onto the original.
pub fn composite_result(
    original: &RgbaImage,
    inpainted: &RgbaImage,
    mask: &GrayImage,
) -> RgbaImage {
    let (w, h) = original.dimensions();
    let mut layer = resize(inpainted, w, h);
    let mask = resize_mask(mask, w, h);

    punch_outside_mask(&mut layer, &mask);
    punch_black(&mut layer);

    let mut out = original.clone();
    imageops::overlay(&mut out, &layer, 0, 0);
    out
}
