// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Editor state and its reducer.
//!
//! `EditorState` is an immutable value: [`EditorState::reduce`] takes an
//! [`Action`] and returns the next state, leaving the old one untouched.
//! Large members (masks, the image pyramid) sit behind `Arc`s, so keeping
//! old states around or comparing them is cheap. No rendering framework is
//! involved; a front end only translates its input events into actions and
//! paints the state it gets back.

use image::{GrayImage, RgbaImage};
use kurbo::{Point, Size};
use serde::Deserialize;
use std::sync::Arc;

use super::document::Document;
use super::gesture::{Gesture, Mode, PinchGesture};
use super::mask::{MaskPath, MaskSet};
use super::viewport::{ViewPort, ZoomLimits};
use crate::settings;

/// Behaviour switches that differ between front ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorOptions {
    pub zoom_limits: ZoomLimits,
    /// Whether the wheel zooms while in draw mode
    pub zoom_while_drawing: bool,
    pub max_prep_dim: u32,
    pub max_prep_undo: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            zoom_limits: ZoomLimits::EDITOR,
            zoom_while_drawing: false,
            max_prep_dim: settings::image::MAX_PREP_DIM,
            max_prep_undo: settings::image::MAX_PREP_UNDO,
        }
    }
}

/// Input to the reducer.
///
/// Pointer and touch positions are in canvas (screen) pixels. Variants that
/// carry pixel data are produced by the application, never deserialized.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// The canvas element changed size
    Resize { width: f64, height: f64 },
    /// A new image was uploaded
    #[serde(skip)]
    ImageLoaded(Arc<RgbaImage>),
    /// The service returned a result for the current prep and `mask`
    #[serde(skip)]
    InpaintApplied {
        result: Arc<RgbaImage>,
        mask: GrayImage,
    },
    FitToScreen,
    ToggleMode,
    SetMode { mode: Mode },
    PointerDown { position: Point },
    PointerMove { position: Point },
    PointerUp,
    Wheel { position: Point, delta_y: f64 },
    TouchStart { touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    /// A touch was lifted; `remaining` touches are still down. The current
    /// gesture ends either way.
    TouchEnd { remaining: usize },
    Undo,
    Redo,
    ClearMasks,
    /// Add an already finished path (image space), e.g. from a file
    CommitPath { path: MaskPath },
}

/// An outline to paint over the image, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub points: Vec<Point>,
    /// Committed masks are closed and filled; the live path is an open stroke
    pub closed: bool,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub canvas: Size,
    pub viewport: ViewPort,
    pub mode: Mode,
    pub gesture: Gesture,
    pub masks: MaskSet,
    pub document: Option<Arc<Document>>,
    pub options: EditorOptions,
}

impl EditorState {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            canvas: Size::ZERO,
            viewport: ViewPort::new(),
            mode: Mode::default(),
            gesture: Gesture::Idle,
            masks: MaskSet::new(),
            document: None,
            options,
        }
    }

    pub fn has_image(&self) -> bool {
        self.document.is_some()
    }

    /// Compute the state that follows `action`.
    pub fn reduce(&self, action: Action) -> Self {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Resize { width, height } => {
                self.canvas = Size::new(width.max(0.0), height.max(0.0));
                self.fit_to_screen();
            }
            Action::ImageLoaded(image) => self.load_image(image),
            Action::InpaintApplied { result, mask } => self.apply_inpaint(result, mask),
            Action::FitToScreen => self.fit_to_screen(),
            Action::ToggleMode => self.set_mode(self.mode.toggled()),
            Action::SetMode { mode } => self.set_mode(mode),
            Action::PointerDown { position } => self.pointer_down(position),
            Action::PointerMove { position } => self.pointer_move(position),
            Action::PointerUp => self.pointer_up(),
            Action::Wheel { position, delta_y } => self.wheel(position, delta_y),
            Action::TouchStart { touches } => self.touch_start(&touches),
            Action::TouchMove { touches } => self.touch_move(&touches),
            Action::TouchEnd { .. } => self.touch_end(),
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
            Action::ClearMasks => {
                self.masks.clear();
                tracing::debug!("Cleared masks");
            }
            Action::CommitPath { path } => {
                if !self.masks.commit(path) {
                    tracing::debug!("Ignored mask path with too few points");
                }
            }
        }
    }

    // ===== Image lifecycle =====

    fn load_image(&mut self, image: Arc<RgbaImage>) {
        tracing::info!("Loaded image {}x{}", image.width(), image.height());
        self.document = Some(Arc::new(Document::new(
            image,
            self.options.max_prep_dim,
            self.options.max_prep_undo,
        )));
        self.masks.clear();
        self.gesture = Gesture::Idle;
        self.viewport = ViewPort::new();
        self.fit_to_screen();
    }

    fn apply_inpaint(&mut self, result: Arc<RgbaImage>, mask: GrayImage) {
        let Some(document) = self.document.as_mut() else {
            tracing::warn!("Inpaint result arrived with no image loaded");
            return;
        };
        Arc::make_mut(document).apply_inpaint(result, mask);
        self.masks.clear();
        self.gesture = Gesture::Idle;
        // Inspect the result rather than draw over it
        self.mode = Mode::Pan;
        self.fit_to_screen();
    }

    fn fit_to_screen(&mut self) {
        let Some(document) = &self.document else {
            return;
        };
        if let Some(viewport) = ViewPort::fit(self.canvas, document.display_size()) {
            self.viewport = viewport;
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            tracing::debug!("Switched to {}", mode.label());
        }
        self.mode = mode;
        // An unfinished lasso or drag does not survive a mode switch
        if !matches!(self.gesture, Gesture::Pinching(_)) {
            self.gesture = Gesture::Idle;
        }
    }

    // ===== Pointer =====

    fn pointer_down(&mut self, position: Point) {
        if !self.has_image() || matches!(self.gesture, Gesture::Pinching(_)) {
            return;
        }
        self.gesture = match self.mode {
            Mode::Draw => {
                let mut path = MaskPath::new();
                path.push(self.viewport.to_image(position));
                Gesture::Drawing(path)
            }
            Mode::Pan => Gesture::Panning { last: position },
        };
    }

    fn pointer_move(&mut self, position: Point) {
        match &mut self.gesture {
            Gesture::Drawing(path) => path.push(self.viewport.to_image(position)),
            Gesture::Panning { last } => {
                let delta = position - *last;
                *last = position;
                self.viewport.pan_by(delta);
            }
            Gesture::Idle | Gesture::Pinching(_) => {}
        }
    }

    fn pointer_up(&mut self) {
        if let Gesture::Drawing(path) = std::mem::take(&mut self.gesture) {
            let points = path.len();
            if self.masks.commit(path) {
                tracing::debug!("Committed mask with {} points", points);
            }
        }
    }

    fn wheel(&mut self, position: Point, delta_y: f64) {
        if !self.has_image() {
            return;
        }
        if self.mode == Mode::Draw && !self.options.zoom_while_drawing {
            return;
        }
        self.viewport
            .wheel_zoom(position, delta_y, self.options.zoom_limits);
    }

    // ===== Touch =====

    fn touch_start(&mut self, touches: &[Point]) {
        match touches {
            [] => {}
            [single] => self.pointer_down(*single),
            [a, b, ..] => {
                if !self.has_image() {
                    return;
                }
                // Second finger: any half-drawn lasso is dropped
                self.gesture = PinchGesture::start(*a, *b, self.viewport)
                    .map_or(Gesture::Idle, Gesture::Pinching);
            }
        }
    }

    fn touch_move(&mut self, touches: &[Point]) {
        if let Gesture::Pinching(pinch) = &self.gesture {
            if let [a, b, ..] = touches {
                self.viewport = pinch.update(*a, *b, self.options.zoom_limits);
            }
            return;
        }
        if let [first, ..] = touches {
            self.pointer_move(*first);
        }
    }

    /// Any lifted finger ends the current gesture, committing a lasso in
    /// progress.
    fn touch_end(&mut self) {
        if matches!(self.gesture, Gesture::Pinching(_)) {
            self.gesture = Gesture::Idle;
            return;
        }
        self.pointer_up();
        self.gesture = Gesture::Idle;
    }

    // ===== History =====

    fn undo(&mut self) {
        match self.mode {
            Mode::Draw => {
                self.masks.undo();
            }
            Mode::Pan => self.step_document(Document::undo),
        }
    }

    fn redo(&mut self) {
        match self.mode {
            Mode::Draw => {
                self.masks.redo();
            }
            Mode::Pan => self.step_document(Document::redo),
        }
    }

    fn step_document(&mut self, step: fn(&mut Document) -> bool) {
        let Some(document) = self.document.as_mut() else {
            return;
        };
        if !(document.can_undo() || document.can_redo()) {
            return;
        }
        let before = document.display_size();
        if !step(Arc::make_mut(document)) {
            return;
        }
        let after = document.display_size();
        if after != before {
            // Mask paths live in display pixels; keep them over the same region
            if !before.is_zero_area() {
                self.masks
                    .rescale(after.width / before.width, after.height / before.height);
            }
            self.fit_to_screen();
        }
    }

    // ===== Queries for front ends =====

    /// Outlines to paint, in screen space.
    ///
    /// Masks are only shown in draw mode so the result can be inspected
    /// without them in pan mode.
    pub fn overlays(&self) -> Vec<Overlay> {
        if self.mode != Mode::Draw {
            return Vec::new();
        }
        let to_screen = |path: &MaskPath| -> Vec<Point> {
            path.points()
                .iter()
                .map(|p| self.viewport.to_screen(*p))
                .collect()
        };
        let mut out: Vec<Overlay> = self
            .masks
            .masks()
            .iter()
            .filter(|m| m.is_committable())
            .map(|m| Overlay {
                points: to_screen(m),
                closed: true,
            })
            .collect();
        if let Some(path) = self.gesture.current_path()
            && path.len() > 1
        {
            out.push(Overlay {
                points: to_screen(path),
                closed: false,
            });
        }
        out
    }

    pub fn can_undo(&self) -> bool {
        match self.mode {
            Mode::Draw => self.masks.can_undo(),
            Mode::Pan => self.document.as_ref().is_some_and(|d| d.can_undo()),
        }
    }

    pub fn can_redo(&self) -> bool {
        match self.mode {
            Mode::Draw => self.masks.can_redo(),
            Mode::Pan => self.document.as_ref().is_some_and(|d| d.can_redo()),
        }
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    fn loaded(w: u32, h: u32) -> EditorState {
        EditorState::default()
            .reduce(Action::Resize {
                width: 800.0,
                height: 600.0,
            })
            .reduce(Action::ImageLoaded(Arc::new(RgbaImage::from_pixel(
                w,
                h,
                Rgba([50, 50, 50, 255]),
            ))))
    }

    fn draw_square(state: EditorState, x: f64, y: f64, size: f64) -> EditorState {
        state
            .reduce(Action::PointerDown {
                position: Point::new(x, y),
            })
            .reduce(Action::PointerMove {
                position: Point::new(x + size, y),
            })
            .reduce(Action::PointerMove {
                position: Point::new(x + size, y + size),
            })
            .reduce(Action::PointerMove {
                position: Point::new(x, y + size),
            })
            .reduce(Action::PointerUp)
    }

    #[test]
    fn load_fits_image() {
        let state = loaded(400, 400);
        assert!((state.viewport.zoom - 1.5).abs() < 1e-9);
        assert!((state.viewport.offset.x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn reduce_leaves_previous_state_untouched() {
        let before = loaded(400, 300).reduce(Action::SetMode { mode: Mode::Draw });
        let after = draw_square(before.clone(), 100.0, 100.0, 50.0);
        assert_eq!(before.masks.len(), 0);
        assert_eq!(after.masks.len(), 1);
    }

    #[test]
    fn drawing_commits_image_space_path() {
        let state = loaded(400, 400).reduce(Action::ToggleMode);
        assert_eq!(state.mode, Mode::Draw);
        let state = draw_square(state, 100.0, 0.0, 150.0);
        assert!(state.gesture.is_idle());
        let path = &state.masks.masks()[0];
        // Screen (100, 0) is image (0, 0) at zoom 1.5 with offset (100, 0)
        assert_eq!(path.points()[0], Point::new(0.0, 0.0));
        assert_eq!(path.points()[2], Point::new(100.0, 100.0));
    }

    #[test]
    fn single_click_is_not_a_mask() {
        let state = loaded(400, 400)
            .reduce(Action::ToggleMode)
            .reduce(Action::PointerDown {
                position: Point::new(10.0, 10.0),
            })
            .reduce(Action::PointerUp);
        assert!(state.masks.is_empty());
    }

    #[test]
    fn pointer_ignored_without_image() {
        let state = EditorState::default()
            .reduce(Action::ToggleMode)
            .reduce(Action::PointerDown {
                position: Point::new(10.0, 10.0),
            });
        assert!(state.gesture.is_idle());
    }

    #[test]
    fn pan_drag_moves_offset() {
        let state = loaded(400, 400);
        let start = state.viewport.offset;
        let state = state
            .reduce(Action::PointerDown {
                position: Point::new(10.0, 10.0),
            })
            .reduce(Action::PointerMove {
                position: Point::new(30.0, 5.0),
            })
            .reduce(Action::PointerMove {
                position: Point::new(40.0, 15.0),
            })
            .reduce(Action::PointerUp);
        assert_eq!(state.viewport.offset - start, kurbo::Vec2::new(30.0, 5.0));
        assert!(state.masks.is_empty());
    }

    #[test]
    fn undo_redo_masks_in_draw_mode() {
        let mut state = loaded(400, 400).reduce(Action::ToggleMode);
        for i in 0..4 {
            state = draw_square(state, 100.0 + i as f64 * 10.0, 100.0, 40.0);
        }
        let committed = state.masks.masks().to_vec();
        for _ in 0..4 {
            state = state.reduce(Action::Undo);
        }
        assert!(state.masks.is_empty());
        assert!(state.can_redo());

        state = state.reduce(Action::Redo);
        assert_eq!(state.masks.masks(), &committed[..1]);
        for _ in 0..3 {
            state = state.reduce(Action::Redo);
        }
        assert_eq!(state.masks.masks(), &committed[..]);
    }

    #[test]
    fn new_mask_clears_redo() {
        let state = draw_square(loaded(400, 400).reduce(Action::ToggleMode), 150.0, 150.0, 30.0)
            .reduce(Action::Undo);
        assert!(state.can_redo());
        let state = draw_square(state, 200.0, 200.0, 30.0);
        assert!(!state.can_redo());
    }

    #[test]
    fn wheel_ignored_in_draw_mode_by_default() {
        let state = loaded(400, 400).reduce(Action::ToggleMode);
        let zoomed = state.reduce(Action::Wheel {
            position: Point::new(400.0, 300.0),
            delta_y: -100.0,
        });
        assert_eq!(zoomed.viewport, state.viewport);

        let mut options = EditorOptions::default();
        options.zoom_while_drawing = true;
        let mut state = state.clone();
        state.options = options;
        let zoomed = state.reduce(Action::Wheel {
            position: Point::new(400.0, 300.0),
            delta_y: -100.0,
        });
        assert!(zoomed.viewport.zoom > state.viewport.zoom);
    }

    #[test]
    fn wheel_zoom_clamped() {
        let mut state = loaded(400, 400);
        for _ in 0..200 {
            state = state.reduce(Action::Wheel {
                position: Point::new(123.0, 456.0),
                delta_y: -1.0e9,
            });
        }
        assert_eq!(state.viewport.zoom, ZoomLimits::EDITOR.max);
    }

    #[test]
    fn pinch_zoom_and_release() {
        let state = loaded(400, 400).reduce(Action::ToggleMode);
        // Start drawing with one finger, then a second finger lands
        let state = state
            .reduce(Action::TouchStart {
                touches: vec![Point::new(300.0, 300.0)],
            })
            .reduce(Action::TouchMove {
                touches: vec![Point::new(320.0, 300.0)],
            })
            .reduce(Action::TouchStart {
                touches: vec![Point::new(300.0, 300.0), Point::new(400.0, 300.0)],
            });
        assert!(matches!(state.gesture, Gesture::Pinching(_)));

        let zoom_before = state.viewport.zoom;
        let state = state.reduce(Action::TouchMove {
            touches: vec![Point::new(250.0, 300.0), Point::new(450.0, 300.0)],
        });
        assert!((state.viewport.zoom - zoom_before * 2.0).abs() < 1e-9);

        let state = state.reduce(Action::TouchEnd { remaining: 1 });
        assert!(state.gesture.is_idle());
        // The interrupted lasso was dropped
        assert!(state.masks.is_empty());
    }

    #[test]
    fn touch_draws_like_pointer() {
        let state = loaded(400, 400).reduce(Action::ToggleMode);
        let state = state
            .reduce(Action::TouchStart {
                touches: vec![Point::new(200.0, 200.0)],
            })
            .reduce(Action::TouchMove {
                touches: vec![Point::new(260.0, 200.0)],
            })
            .reduce(Action::TouchMove {
                touches: vec![Point::new(260.0, 260.0)],
            })
            .reduce(Action::TouchEnd { remaining: 0 });
        assert_eq!(state.masks.len(), 1);
    }

    #[test]
    fn inpaint_switches_to_pan_and_clears_masks() {
        let state = draw_square(loaded(400, 400).reduce(Action::ToggleMode), 150.0, 150.0, 60.0);
        let result = Arc::new(RgbaImage::from_pixel(400, 400, Rgba([9, 9, 9, 255])));
        let state = state.reduce(Action::InpaintApplied {
            result: result.clone(),
            mask: GrayImage::from_pixel(400, 400, Luma([255])),
        });
        assert_eq!(state.mode, Mode::Pan);
        assert!(state.masks.is_empty());
        let doc = state.document.as_ref().unwrap();
        assert!(Arc::ptr_eq(doc.display(), &result));

        // Undo in pan mode walks the prep history
        let undone = state.reduce(Action::Undo);
        let doc = undone.document.as_ref().unwrap();
        assert!(doc.inpainted().is_none());
        let redone = undone.reduce(Action::Redo);
        assert!(redone.document.as_ref().unwrap().inpainted().is_some());
    }

    #[test]
    fn history_step_keeps_masks_over_the_same_region() {
        let state = EditorState::default()
            .reduce(Action::Resize {
                width: 800.0,
                height: 600.0,
            })
            .reduce(Action::ImageLoaded(Arc::new(RgbaImage::from_pixel(
                2160,
                1080,
                Rgba([50, 50, 50, 255]),
            ))))
            .reduce(Action::InpaintApplied {
                result: Arc::new(RgbaImage::from_pixel(1080, 540, Rgba([9, 9, 9, 255]))),
                mask: GrayImage::new(1080, 540),
            })
            .reduce(Action::SetMode { mode: Mode::Draw })
            .reduce(Action::CommitPath {
                path: MaskPath::from_points(vec![
                    Point::new(600.0, 100.0),
                    Point::new(1000.0, 100.0),
                    Point::new(1000.0, 400.0),
                    Point::new(600.0, 400.0),
                ]),
            });

        let check = |state: &EditorState| {
            let doc = state.document.as_ref().unwrap();
            let mask = doc.request_mask(state.masks.masks());
            assert_eq!(mask.dimensions(), (1080, 540));
            assert_eq!(mask.get_pixel(800, 250).0[0], 255);
            assert_eq!(mask.get_pixel(400, 100).0[0], 0);
        };
        check(&state);

        let undone = state
            .reduce(Action::SetMode { mode: Mode::Pan })
            .reduce(Action::Undo)
            .reduce(Action::SetMode { mode: Mode::Draw });
        assert_eq!(undone.document.as_ref().unwrap().display_size(), Size::new(2160.0, 1080.0));
        assert_eq!(undone.masks.len(), 1);
        check(&undone);

        let redone = undone
            .reduce(Action::SetMode { mode: Mode::Pan })
            .reduce(Action::Redo)
            .reduce(Action::SetMode { mode: Mode::Draw });
        assert_eq!(redone.masks.masks(), state.masks.masks());
        check(&redone);
    }

    #[test]
    fn lifting_any_finger_commits_the_lasso() {
        let state = loaded(400, 400)
            .reduce(Action::ToggleMode)
            .reduce(Action::TouchStart {
                touches: vec![Point::new(200.0, 200.0)],
            })
            .reduce(Action::TouchMove {
                touches: vec![Point::new(260.0, 200.0)],
            })
            .reduce(Action::TouchMove {
                touches: vec![Point::new(260.0, 260.0)],
            })
            .reduce(Action::TouchEnd { remaining: 1 });
        assert_eq!(state.masks.len(), 1);
        assert!(state.gesture.is_idle());
    }

    #[test]
    fn coincident_second_touch_drops_the_lasso() {
        let state = loaded(400, 400)
            .reduce(Action::ToggleMode)
            .reduce(Action::TouchStart {
                touches: vec![Point::new(200.0, 200.0)],
            })
            .reduce(Action::TouchMove {
                touches: vec![Point::new(260.0, 200.0)],
            })
            .reduce(Action::TouchStart {
                touches: vec![Point::new(260.0, 200.0), Point::new(260.0, 200.0)],
            });
        assert!(state.gesture.is_idle());
        let state = state.reduce(Action::TouchEnd { remaining: 0 });
        assert!(state.masks.is_empty());
    }

    #[test]
    fn overlays_only_in_draw_mode() {
        let state = draw_square(loaded(400, 400).reduce(Action::ToggleMode), 150.0, 150.0, 60.0);
        let overlays = state.overlays();
        assert_eq!(overlays.len(), 1);
        assert!(overlays[0].closed);
        let first = overlays[0].points[0];
        assert!((first.x - 150.0).abs() < 1e-9 && (first.y - 150.0).abs() < 1e-9);
        assert!(state.reduce(Action::ToggleMode).overlays().is_empty());
    }

    #[test]
    fn actions_deserialize_from_json() {
        let json = r#"[
            {"type": "resize", "width": 640.0, "height": 480.0},
            {"type": "set_mode", "mode": "draw"},
            {"type": "pointer_down", "position": {"x": 1.0, "y": 2.0}},
            {"type": "wheel", "position": {"x": 0.0, "y": 0.0}, "delta_y": 3.0},
            {"type": "touch_end", "remaining": 0},
            {"type": "commit_path", "path": [{"x": 0.0, "y": 0.0}, {"x": 5.0, "y": 0.0}, {"x": 5.0, "y": 5.0}]},
            {"type": "undo"}
        ]"#;
        let actions: Vec<Action> = serde_json::from_str(json).unwrap();
        assert_eq!(actions.len(), 7);
        assert!(matches!(actions[1], Action::SetMode { mode: Mode::Draw }));
        assert!(matches!(actions[6], Action::Undo));
    }
}
