// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! File I/O operations for AppState (import, save)

use chrono::Local;
use image::ImageFormat;
use std::path::Path;
use std::sync::Arc;

use super::{AppError, AppState};
use crate::editing::Action;
use crate::pipeline::{Export, composite_result, export_jpeg};

/// Upload types the editor accepts.
pub const SUPPORTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Unsupported file type {0}. Please select a JPEG or PNG image.")]
    UnsupportedType(String),

    #[error("File size too large. Please select an image smaller than {}MB.", .max / (1024 * 1024))]
    TooLarge { size: u64, max: u64 },

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Check size and type of an upload before decoding it.
fn validate(
    bytes: &[u8],
    mime: Option<&str>,
    max_size: u64,
) -> Result<ImageFormat, ImportError> {
    check_size(bytes.len() as u64, max_size)?;
    if let Some(mime) = mime
        && !SUPPORTED_MIME_TYPES.contains(&mime)
    {
        return Err(ImportError::UnsupportedType(mime.to_string()));
    }
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => Ok(format),
        Ok(other) => Err(ImportError::UnsupportedType(
            other.to_mime_type().to_string(),
        )),
        Err(_) => Err(ImportError::UnsupportedType("unknown".to_string())),
    }
}

fn check_size(size: u64, max: u64) -> Result<(), ImportError> {
    if size > max {
        Err(ImportError::TooLarge { size, max })
    } else {
        Ok(())
    }
}

impl AppState {
    /// Load an image file from disk.
    pub fn import_image(&mut self, path: &Path) -> Result<(), AppError> {
        let result = std::fs::metadata(path)
            .map_err(ImportError::from)
            .and_then(|meta| check_size(meta.len(), self.config.max_file_size))
            .and_then(|()| std::fs::read(path).map_err(ImportError::from));
        match result {
            Ok(bytes) => self.import_bytes(&bytes, None),
            Err(err) => self.import_failed(err),
        }
    }

    /// Load an uploaded image. `mime` is the type the upload claims, if any.
    pub fn import_bytes(&mut self, bytes: &[u8], mime: Option<&str>) -> Result<(), AppError> {
        let decoded = validate(bytes, mime, self.config.max_file_size).and_then(|format| {
            Ok(image::load_from_memory_with_format(bytes, format)?.to_rgba8())
        });
        match decoded {
            Ok(image) => {
                self.dispatch(Action::ImageLoaded(Arc::new(image)));
                self.history = Default::default();
                self.status = Default::default();
                self.error_message = None;
                Ok(())
            }
            Err(err) => self.import_failed(err),
        }
    }

    fn import_failed(&mut self, err: ImportError) -> Result<(), AppError> {
        tracing::error!("Import failed: {}", err);
        self.error_message = Some(err.to_string());
        Err(err.into())
    }

    /// Composite the latest result onto the original and encode it as JPEG.
    pub fn save(&mut self) -> Result<Export, AppError> {
        let document = self.editor.document.as_ref().ok_or(AppError::NothingToSave)?;
        let (Some(inpainted), Some(mask)) = (document.inpainted(), document.mask()) else {
            self.error_message = Some(AppError::NothingToSave.to_string());
            return Err(AppError::NothingToSave);
        };

        let composite = composite_result(document.original(), inpainted, mask);
        let export = export_jpeg(&composite, self.config.jpeg_quality)?;
        tracing::info!("Exported {} ({} bytes)", export.file_name, export.bytes.len());
        self.last_saved = Some(Local::now().format("%I:%M %p").to_string());
        self.error_message = None;
        Ok(export)
    }
}
