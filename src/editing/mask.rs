// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Lasso paths and the stack of committed masks.
//!
//! `MaskSet` keeps its paths behind `Arc`s so cloning it for a new editor
//! state is cheap; mutations copy on write via `Arc::make_mut`.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::settings;

/// A freehand lasso in image space. Closed implicitly when filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskPath {
    points: Vec<Point>,
}

impl MaskPath {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the path has enough points to enclose anything.
    pub fn is_committable(&self) -> bool {
        self.points.len() >= settings::mask::MIN_POINTS
    }

    /// Scale every point, e.g. to move a path between image resolutions.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x * sx, p.y * sy))
                .collect(),
        }
    }
}

/// Committed masks plus the redo stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskSet {
    masks: Arc<Vec<MaskPath>>,
    redo: Arc<Vec<MaskPath>>,
}

impl MaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a finished path. Paths that are too short are dropped and
    /// `false` is returned. A successful commit clears the redo stack.
    pub fn commit(&mut self, path: MaskPath) -> bool {
        if !path.is_committable() {
            return false;
        }
        Arc::make_mut(&mut self.masks).push(path);
        if !self.redo.is_empty() {
            self.redo = Arc::new(Vec::new());
        }
        true
    }

    /// Move the newest mask onto the redo stack.
    pub fn undo(&mut self) -> bool {
        match Arc::make_mut(&mut self.masks).pop() {
            Some(last) => {
                Arc::make_mut(&mut self.redo).push(last);
                true
            }
            None => false,
        }
    }

    /// Restore the most recently undone mask.
    pub fn redo(&mut self) -> bool {
        match Arc::make_mut(&mut self.redo).pop() {
            Some(next) => {
                Arc::make_mut(&mut self.masks).push(next);
                true
            }
            None => false,
        }
    }

    /// Scale every committed and undone path, for when the image they were
    /// drawn on is replaced by one of a different size.
    pub fn rescale(&mut self, sx: f64, sy: f64) {
        let scale = |paths: &[MaskPath]| -> Vec<MaskPath> {
            paths.iter().map(|p| p.scaled(sx, sy)).collect()
        };
        self.masks = Arc::new(scale(self.masks.as_slice()));
        self.redo = Arc::new(scale(self.redo.as_slice()));
    }

    /// Drop all masks and the redo stack.
    pub fn clear(&mut self) {
        self.masks = Arc::new(Vec::new());
        self.redo = Arc::new(Vec::new());
    }

    pub fn masks(&self) -> &[MaskPath] {
        &self.masks
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.masks.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
