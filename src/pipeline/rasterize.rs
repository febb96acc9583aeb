// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Mask rasterization: lasso polygons to a black/white bitmap.
//!
//! Each path is filled on its own with the nonzero winding rule, sampled at
//! pixel centers, and the results are unioned. This is the same coverage a
//! 2D canvas produces for `fill()` without anti-aliasing.

use image::{GrayImage, Luma};
use kurbo::Point;

use crate::editing::MaskPath;

const INSIDE: Luma<u8> = Luma([255]);

/// Rasterize `paths` onto a black `width` x `height` mask.
pub fn rasterize_mask(paths: &[MaskPath], width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for path in paths {
        if !path.is_committable() {
            continue;
        }
        fill_polygon(&mut mask, path.points());
    }
    mask
}

/// Scanline fill of one implicitly closed polygon.
fn fill_polygon(mask: &mut GrayImage, points: &[Point]) {
    let (w, h) = mask.dimensions();
    let n = points.len();

    let (min_y, max_y) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }
    // Only rows whose centre lies inside the vertical extent can be hit
    let first_row = (min_y - 0.5).ceil().max(0.0) as u32;
    let last_row = ((max_y - 0.5).floor().min(h as f64 - 1.0)).max(-1.0);
    if last_row < 0.0 {
        return;
    }
    let last_row = last_row as u32;

    // (x, winding direction) per crossing
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    for y in first_row..=last_row {
        let yf = y as f64 + 0.5;
        crossings.clear();

        // Walk edges including the closing edge n-1 -> 0. Half-open
        // interval [y0, y1) so shared vertices are counted once.
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let dir = if a.y <= yf && b.y > yf {
                1
            } else if b.y <= yf && a.y > yf {
                -1
            } else {
                continue;
            };
            let t = (yf - a.y) / (b.y - a.y);
            crossings.push((a.x + t * (b.x - a.x), dir));
        }
        if crossings.is_empty() {
            continue;
        }
        crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            if winding == 0 {
                continue;
            }
            // Pixels whose centre x + 0.5 lies in [x_start, x_end)
            let x_start = (pair[0].0 - 0.5).ceil().max(0.0);
            let x_end = (pair[1].0 - 0.5).ceil().min(w as f64);
            if x_end <= x_start {
                continue;
            }
            for x in x_start as u32..x_end as u32 {
                mask.put_pixel(x, y, INSIDE);
            }
        }
    }
}
