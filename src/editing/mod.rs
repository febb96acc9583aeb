// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model and interaction

pub mod document;
pub mod gesture;
pub mod mask;
pub mod state;
pub mod undo;
pub mod viewport;

pub use document::{Document, PrepSnapshot};
pub use gesture::{Gesture, Mode, PinchGesture};
pub use mask::{MaskPath, MaskSet};
pub use state::{Action, EditorOptions, EditorState, Overlay};
pub use undo::UndoState;
pub use viewport::{ViewPort, ZoomLimits};
