// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Application state (`AppState`) behind a Kupu front end.
//!
//! `AppState` owns the editor reducer state, the result gallery, the status
//! line and the runtime config. Front ends forward input as
//! [`Action`]s through [`AppState::dispatch`] and call the user-level
//! operations (import, erase, save) directly. Sub-modules split the methods
//! by concern: file I/O and the erase round trip.

mod erase;
mod file_io;
mod history;
mod status;

pub use erase::EraseJob;
pub use file_io::{ImportError, SUPPORTED_MIME_TYPES};
pub use history::{HistoryEntry, ResultHistory};
pub use status::ProcessingStatus;

use crate::config::Config;
use crate::editing::{Action, EditorState};
use crate::inpaint::InpaintError;
use crate::pipeline::{Export, PipelineError};

/// Why a user-level operation was refused or failed.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No image loaded")]
    NoImage,

    #[error("Draw a mask over the area to erase first")]
    NoMasks,

    #[error("An inpaint request is already in progress")]
    Busy,

    #[error("No inpainted image to save")]
    NothingToSave,

    #[error("No result at position {0}")]
    NoSuchResult(usize),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Inpaint(#[from] InpaintError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    /// Text for the status line.
    pub fn status_message(&self) -> String {
        match self {
            AppError::Inpaint(err) => err.status_message(),
            AppError::Pipeline(err) => format!("Error: {err}"),
            other => other.to_string(),
        }
    }
}

/// Main application state
pub struct AppState {
    pub editor: EditorState,
    pub history: ResultHistory,
    pub status: ProcessingStatus,
    pub config: Config,
    /// Last import or save problem, shown until the next success
    pub error_message: Option<String>,
    /// When the last export was produced (formatted for display)
    pub last_saved: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            editor: EditorState::new(config.editor_options()),
            history: ResultHistory::new(),
            status: ProcessingStatus::Idle,
            config,
            error_message: None,
            last_saved: None,
        }
    }

    /// Feed one input action through the editor reducer.
    pub fn dispatch(&mut self, action: Action) {
        self.editor = self.editor.reduce(action);
    }

    pub fn has_image(&self) -> bool {
        self.editor.has_image()
    }

    /// Whether the erase control should be enabled.
    pub fn can_erase(&self) -> bool {
        self.has_image() && !self.editor.masks.is_empty() && !self.status.is_processing()
    }

    pub fn can_save(&self) -> bool {
        self.editor
            .document
            .as_ref()
            .is_some_and(|d| d.inpainted().is_some())
    }

    pub fn remove_from_history(&mut self, index: usize) -> Result<(), AppError> {
        self.history
            .remove(index)
            .ok_or(AppError::NoSuchResult(index))?;
        tracing::debug!("Removed result {} from history", index);
        Ok(())
    }

    pub fn history_download(&self, index: usize) -> Result<Export, AppError> {
        let export = self
            .history
            .download(index)
            .ok_or(AppError::NoSuchResult(index))??;
        Ok(export)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
