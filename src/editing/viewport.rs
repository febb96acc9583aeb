// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Viewport transform between image space and screen space.
//!
//! The mapping is `screen = image * zoom + offset`. Image space has its
//! origin at the top-left pixel of the displayed image, screen space at the
//! top-left corner of the canvas. Both use y-down coordinates.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::settings;

/// Zoom range a viewport is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    /// Wide range used by the single-page editor.
    pub const EDITOR: ZoomLimits = ZoomLimits {
        min: settings::viewport::EDITOR_MIN_ZOOM,
        max: settings::viewport::EDITOR_MAX_ZOOM,
    };

    /// Narrow range used by the canvas controller.
    pub const CONTROLLER: ZoomLimits = ZoomLimits {
        min: settings::viewport::CONTROLLER_MIN_ZOOM,
        max: settings::viewport::CONTROLLER_MAX_ZOOM,
    };

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min && zoom <= self.max
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::EDITOR
    }
}

/// Pan and zoom of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPort {
    /// Scale from image pixels to screen pixels
    pub zoom: f64,
    /// Screen position of the image origin
    pub offset: Vec2,
}

impl ViewPort {
    /// Identity viewport (zoom 1, no pan)
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::ZERO,
        }
    }

    /// Map an image-space point to screen space.
    pub fn to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x * self.zoom + self.offset.x,
            image.y * self.zoom + self.offset.y,
        )
    }

    /// Map a screen-space point back to image space.
    pub fn to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) / self.zoom,
            (screen.y - self.offset.y) / self.zoom,
        )
    }

    /// The image-to-screen transform, for renderers that draw with an affine.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Pan by a screen-space delta (drag).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom by `factor`, keeping the image point under `anchor`
    /// (screen space) fixed. The result is clamped to `limits`.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64, limits: ZoomLimits) {
        let new_zoom = limits.clamp(self.zoom * factor);
        self.set_zoom_at(anchor, new_zoom);
    }

    /// Set an absolute zoom, keeping the image point under `anchor` fixed.
    pub fn set_zoom_at(&mut self, anchor: Point, new_zoom: f64) {
        let scale_change = new_zoom / self.zoom;
        let anchor = anchor.to_vec2();
        self.offset = anchor - (anchor - self.offset) * scale_change;
        self.zoom = new_zoom;
    }

    /// Wheel zoom. Negative `delta_y` (scrolling up) zooms in, positive zooms
    /// out, zero is ignored. Only the sign matters, so the zoom can never
    /// leave `limits` no matter how large the delta is.
    pub fn wheel_zoom(&mut self, anchor: Point, delta_y: f64, limits: ZoomLimits) {
        if delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        let factor = if delta_y > 0.0 {
            settings::viewport::WHEEL_ZOOM_OUT
        } else {
            settings::viewport::WHEEL_ZOOM_IN
        };
        self.zoom_at(anchor, factor, limits);
    }

    /// Viewport that shows the whole image centered in the canvas.
    ///
    /// Returns `None` when either size is empty. The fit zoom is not clamped
    /// to any zoom limits, so tiny images fill the canvas and huge ones are
    /// fully visible; only wheel and pinch zoom are clamped.
    pub fn fit(canvas: Size, image: Size) -> Option<Self> {
        if canvas.is_zero_area() || image.is_zero_area() {
            return None;
        }
        let zoom = (canvas.width / image.width).min(canvas.height / image.height);
        let offset = Vec2::new(
            (canvas.width - image.width * zoom) / 2.0,
            (canvas.height - image.height * zoom) / 2.0,
        );
        Some(Self { zoom, offset })
    }
}

impl Default for ViewPort {
    fn default() -> Self {
        Self::new()
    }
}
