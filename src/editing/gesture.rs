// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Pointer gesture states and the two-finger pinch tracker.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use super::mask::MaskPath;
use super::viewport::{ViewPort, ZoomLimits};

/// What a primary pointer drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Drags pan the canvas, the wheel zooms
    #[default]
    Pan,
    /// Drags draw lasso masks
    Draw,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Pan => Mode::Draw,
            Mode::Draw => Mode::Pan,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Pan => "zoom mode",
            Mode::Draw => "draw mode",
        }
    }
}

/// The gesture currently in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Collecting lasso points (image space)
    Drawing(MaskPath),
    /// Dragging the canvas; `last` is the previous screen position
    Panning { last: Point },
    /// Two touches down
    Pinching(PinchGesture),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// The path being drawn, if any.
    pub fn current_path(&self) -> Option<&MaskPath> {
        match self {
            Gesture::Drawing(path) => Some(path),
            _ => None,
        }
    }
}

/// Snapshot taken when a second finger lands.
///
/// Every update is computed from this snapshot rather than incrementally, so
/// rounding does not accumulate over a long pinch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    initial_distance: f64,
    initial_viewport: ViewPort,
    center: Point,
}

impl PinchGesture {
    /// Start tracking. Returns `None` if both touches are at the same spot.
    pub fn start(a: Point, b: Point, viewport: ViewPort) -> Option<Self> {
        let initial_distance = a.distance(b);
        if initial_distance <= f64::EPSILON {
            return None;
        }
        Some(Self {
            initial_distance,
            initial_viewport: viewport,
            center: a.midpoint(b),
        })
    }

    /// Viewport for the current touch positions.
    ///
    /// The zoom scales with the distance ratio and the image point that was
    /// under the initial midpoint stays there.
    pub fn update(&self, a: Point, b: Point, limits: ZoomLimits) -> ViewPort {
        let scale = a.distance(b) / self.initial_distance;
        let zoom = limits.clamp(self.initial_viewport.zoom * scale);
        let anchor_image = self.initial_viewport.to_image(self.center);
        ViewPort {
            zoom,
            offset: self.center.to_vec2() - anchor_image.to_vec2() * zoom,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }
}
