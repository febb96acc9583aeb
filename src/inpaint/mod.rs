// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Client side of the remote inpainting service.
//!
//! The service takes one JSON POST with the prep image and mask as data URLs
//! and answers with the repaired image. This module defines the wire types,
//! the error classification shown to the user, and the [`Inpainter`] seam
//! so the application can be driven by a fake service in tests.

mod http;

pub use http::HttpInpainter;

use serde::{Deserialize, Serialize};

use crate::pipeline::ensure_data_url;

/// Body of `POST /inpaint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InpaintRequest {
    /// Prep image as a data URL
    pub image: String,
    /// Black/white mask as a data URL, same size as `image`
    pub mask: String,
}

/// Every response shape the service is known to produce.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InpaintResponse {
    /// A JSON string holding the data URL (or bare base64)
    Bare(String),
    /// Tried before `Wrapped`: an `error` field fails the request even when
    /// a `result` is present too
    Failed { error: String },
    Wrapped { result: String },
    /// FastAPI `HTTPException` body
    Detail { detail: String },
}

impl InpaintResponse {
    /// Extract the image as a full data URL, or the service's error.
    pub fn into_data_url(self) -> Result<String, InpaintError> {
        match self {
            InpaintResponse::Bare(data) | InpaintResponse::Wrapped { result: data } => {
                if data.trim().is_empty() {
                    Err(InpaintError::NoImageData)
                } else {
                    Ok(ensure_data_url(data.trim()))
                }
            }
            InpaintResponse::Failed { error } | InpaintResponse::Detail { detail: error } => {
                Err(InpaintError::from_service_message(error))
            }
        }
    }
}

/// Why an inpaint request failed. None of these are retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum InpaintError {
    #[error("request timed out")]
    Timeout,

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("{0}")]
    Service(String),

    #[error("{0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("No image data in response")]
    NoImageData,
}

impl InpaintError {
    /// Classify an error message reported by the service.
    pub fn from_service_message(message: String) -> Self {
        if message.contains("Rate limit exceeded") {
            InpaintError::RateLimited(message)
        } else {
            InpaintError::Service(message)
        }
    }

    /// Text for the status line.
    pub fn status_message(&self) -> String {
        match self {
            InpaintError::Timeout => "Inpainting error, try again".to_string(),
            InpaintError::RateLimited(_) => "The demo trial limit has been reached.".to_string(),
            other => format!("Error: {other}"),
        }
    }
}

/// Something that can inpaint a prep image.
pub trait Inpainter {
    /// Send one request and return the repaired image as a data URL.
    fn inpaint(&self, request: &InpaintRequest) -> Result<String, InpaintError>;
}
