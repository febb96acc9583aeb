// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! The image pyramid of one editing session.
//!
//! A `Document` holds the full-resolution original, the image currently on
//! screen, and the "prep" working copy (longest side capped) that is sent to
//! the inpainting service. Every inpaint produces a new prep snapshot; older
//! snapshots are kept in an [`UndoState`] so they can be restored.
//!
//! Pixel buffers are shared through `Arc`, so cloning a document for a new
//! editor state never copies image data.

use image::{GrayImage, RgbaImage};
use kurbo::Size;
use std::sync::Arc;

use super::mask::MaskPath;
use super::undo::UndoState;
use crate::pipeline::{prep_image, rasterize_mask, resize_mask};

/// One entry of the prep history.
#[derive(Debug, Clone)]
pub struct PrepSnapshot {
    /// Working copy sent with the next request
    pub prep: Arc<RgbaImage>,
    /// Service result this prep was made from (`None` for the upload)
    pub inpainted: Option<Arc<RgbaImage>>,
    /// Union of all masks erased so far, at prep resolution
    pub mask: Option<Arc<GrayImage>>,
}

#[derive(Debug, Clone)]
pub struct Document {
    original: Arc<RgbaImage>,
    display: Arc<RgbaImage>,
    current: PrepSnapshot,
    history: UndoState<PrepSnapshot>,
    max_prep_dim: u32,
}

impl Document {
    /// Start a document from an uploaded image.
    pub fn new(original: Arc<RgbaImage>, max_prep_dim: u32, max_undo: usize) -> Self {
        let prep = Arc::new(prep_image(&original, max_prep_dim));
        Self {
            display: original.clone(),
            original,
            current: PrepSnapshot {
                prep,
                inpainted: None,
                mask: None,
            },
            history: UndoState::new(max_undo),
            max_prep_dim,
        }
    }

    pub fn original(&self) -> &Arc<RgbaImage> {
        &self.original
    }

    /// The image shown on the canvas. Mask paths live in its pixel space.
    pub fn display(&self) -> &Arc<RgbaImage> {
        &self.display
    }

    pub fn prep(&self) -> &Arc<RgbaImage> {
        &self.current.prep
    }

    pub fn inpainted(&self) -> Option<&Arc<RgbaImage>> {
        self.current.inpainted.as_ref()
    }

    /// Accumulated erase mask at prep resolution.
    pub fn mask(&self) -> Option<&Arc<GrayImage>> {
        self.current.mask.as_ref()
    }

    pub fn display_size(&self) -> Size {
        Size::new(self.display.width() as f64, self.display.height() as f64)
    }

    /// Rasterize `paths` (display space) and scale the result to the prep
    /// size, ready to be sent alongside [`Document::prep`].
    pub fn request_mask(&self, paths: &[MaskPath]) -> GrayImage {
        let mask = rasterize_mask(paths, self.display.width(), self.display.height());
        resize_mask(&mask, self.current.prep.width(), self.current.prep.height())
    }

    /// Accept an inpainting result produced from the current prep and `mask`.
    ///
    /// The result becomes the displayed image and the source of the next
    /// prep. Its mask is merged with the masks of earlier inpaints so the
    /// final composite keeps every erased region.
    pub fn apply_inpaint(&mut self, result: Arc<RgbaImage>, mask: GrayImage) {
        let merged = match &self.current.mask {
            Some(previous) => union_masks(previous, mask),
            None => mask,
        };
        let next = PrepSnapshot {
            prep: Arc::new(prep_image(&result, self.max_prep_dim)),
            inpainted: Some(result),
            mask: Some(Arc::new(merged)),
        };
        let previous = std::mem::replace(&mut self.current, next);
        self.history.add_undo_group(previous);
        self.sync_display();
    }

    /// Restore the previous prep snapshot.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.current.clone()) {
            Some(previous) => {
                self.current = previous;
                self.sync_display();
                true
            }
            None => false,
        }
    }

    /// Re-apply a snapshot removed by [`Document::undo`].
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.current.clone()) {
            Some(next) => {
                self.current = next;
                self.sync_display();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn sync_display(&mut self) {
        self.display = self
            .current
            .inpainted
            .clone()
            .unwrap_or_else(|| self.original.clone());
    }
}

/// Per-pixel maximum of two masks, at the size of `next`.
fn union_masks(previous: &GrayImage, mut next: GrayImage) -> GrayImage {
    let previous = resize_mask(previous, next.width(), next.height());
    for (dst, src) in next.pixels_mut().zip(previous.pixels()) {
        dst.0[0] = dst.0[0].max(src.0[0]);
    }
    next
}
