// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Image pre- and post-processing.
//!
//! Everything here is a pure function over `image` buffers: resizing to the
//! prep size, rasterizing lasso masks, encoding data URLs for the service,
//! compositing the result back onto the original, and JPEG export.

pub mod composite;
pub mod data_url;
pub mod export;
pub mod rasterize;
pub mod resize;

pub use composite::composite_result;
pub use data_url::{DataUrl, ensure_data_url, image_to_data_url, mask_to_data_url};
pub use export::{Export, encode_jpeg, export_jpeg};
pub use rasterize::rasterize_mask;
pub use resize::{prep_dimensions, prep_image, resize, resize_mask};

/// Errors from encoding or decoding image payloads.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("malformed data URL: {0}")]
    MalformedDataUrl(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}
