// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration.
//!
//! Values start from [`crate::settings`], may be overridden by a TOML file,
//! and finally by `KUPU_API_BASE_URL` / `KUPU_TIMEOUT_SECS` from the
//! environment.
//!
//! ```toml
//! base_url = "https://inpaint.example.com"
//! timeout_secs = 45
//! zoom_profile = "controller"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::editing::{EditorOptions, ZoomLimits};
use crate::settings;

pub const BASE_URL_ENV: &str = "KUPU_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "KUPU_TIMEOUT_SECS";

/// Zoom bounds preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomProfile {
    /// 0.05 to 20, the full editor
    #[default]
    Editor,
    /// 0.1 to 5, the embedded canvas controller
    Controller,
}

impl ZoomProfile {
    pub fn limits(self) -> ZoomLimits {
        match self {
            ZoomProfile::Editor => ZoomLimits::EDITOR,
            ZoomProfile::Controller => ZoomLimits::CONTROLLER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Inpainting service base URL, without the `/inpaint` path
    pub base_url: String,
    pub timeout_secs: u64,
    pub zoom_profile: ZoomProfile,
    pub zoom_while_drawing: bool,
    /// Largest accepted upload in bytes
    pub max_file_size: u64,
    pub max_prep_dim: u32,
    pub max_prep_undo: usize,
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: settings::service::DEFAULT_BASE_URL.to_string(),
            timeout_secs: settings::service::REQUEST_TIMEOUT_SECS,
            zoom_profile: ZoomProfile::default(),
            zoom_while_drawing: false,
            max_file_size: settings::image::MAX_FILE_SIZE,
            max_prep_dim: settings::image::MAX_PREP_DIM,
            max_prep_undo: settings::image::MAX_PREP_UNDO,
            jpeg_quality: settings::image::EXPORT_JPEG_QUALITY,
        }
    }
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        tracing::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number of seconds"))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            zoom_limits: self.zoom_profile.limits(),
            zoom_while_drawing: self.zoom_while_drawing,
            max_prep_dim: self.max_prep_dim,
            max_prep_undo: self.max_prep_undo,
        }
    }
}
