// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Application settings and default constants.
//!
//! These are compile-time defaults. Anything a deployment may want to change
//! at runtime (service endpoint, timeout, limits) is also exposed through
//! [`crate::config::Config`], which starts from these values.

// ============================================================================
// VIEWPORT SETTINGS
// ============================================================================
/// Minimum zoom for the editor profile (5% of original size)
const EDITOR_MIN_ZOOM: f64 = 0.05;

/// Maximum zoom for the editor profile (20x original size)
const EDITOR_MAX_ZOOM: f64 = 20.0;

/// Minimum zoom for the controller profile
const CONTROLLER_MIN_ZOOM: f64 = 0.1;

/// Maximum zoom for the controller profile
const CONTROLLER_MAX_ZOOM: f64 = 5.0;

/// Zoom multiplier for one wheel notch towards the user (zoom in)
const WHEEL_ZOOM_IN: f64 = 1.1;

/// Zoom multiplier for one wheel notch away from the user (zoom out)
const WHEEL_ZOOM_OUT: f64 = 0.9;

// ============================================================================
// MASK SETTINGS
// ============================================================================
/// A gesture must collect at least this many points to become a mask
const MIN_MASK_POINTS: usize = 2;

/// Mask luminance below this value counts as "outside" when compositing
const MASK_THRESHOLD: u8 = 128;

// ============================================================================
// IMAGE SETTINGS
// ============================================================================
/// Longest side of the prep image sent to the inpainting service
const MAX_PREP_DIM: u32 = 1080;

/// Largest accepted upload (6 MB)
const MAX_FILE_SIZE: u64 = 6 * 1024 * 1024;

/// JPEG quality for exported results
const EXPORT_JPEG_QUALITY: u8 = 95;

/// Number of prep snapshots kept for undo
const MAX_PREP_UNDO: usize = 64;

// ============================================================================
// SERVICE SETTINGS
// ============================================================================
/// Default inpainting service base URL
const DEFAULT_BASE_URL: &str = "http://localhost:8003";

/// Client-side timeout for one inpaint request (seconds)
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Viewport settings (zoom limits, wheel step)
pub mod viewport {
    /// Zoom floor of the editor profile
    pub const EDITOR_MIN_ZOOM: f64 = super::EDITOR_MIN_ZOOM;

    /// Zoom ceiling of the editor profile
    pub const EDITOR_MAX_ZOOM: f64 = super::EDITOR_MAX_ZOOM;

    /// Zoom floor of the controller profile
    pub const CONTROLLER_MIN_ZOOM: f64 = super::CONTROLLER_MIN_ZOOM;

    /// Zoom ceiling of the controller profile
    pub const CONTROLLER_MAX_ZOOM: f64 = super::CONTROLLER_MAX_ZOOM;

    /// Wheel zoom-in factor
    pub const WHEEL_ZOOM_IN: f64 = super::WHEEL_ZOOM_IN;

    /// Wheel zoom-out factor
    pub const WHEEL_ZOOM_OUT: f64 = super::WHEEL_ZOOM_OUT;
}

/// Mask drawing and compositing settings
pub mod mask {
    pub const MIN_POINTS: usize = super::MIN_MASK_POINTS;
    pub const THRESHOLD: u8 = super::MASK_THRESHOLD;
}

/// Image pipeline limits
pub mod image {
    /// Prep image longest side
    pub const MAX_PREP_DIM: u32 = super::MAX_PREP_DIM;

    /// Upload size limit in bytes
    pub const MAX_FILE_SIZE: u64 = super::MAX_FILE_SIZE;

    /// Export JPEG quality (1-100)
    pub const EXPORT_JPEG_QUALITY: u8 = super::EXPORT_JPEG_QUALITY;

    /// Undo depth for prep snapshots
    pub const MAX_PREP_UNDO: usize = super::MAX_PREP_UNDO;
}

/// Inpainting service defaults
pub mod service {
    pub const DEFAULT_BASE_URL: &str = super::DEFAULT_BASE_URL;
    pub const REQUEST_TIMEOUT_SECS: u64 = super::REQUEST_TIMEOUT_SECS;
}
