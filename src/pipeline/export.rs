// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! JPEG export of the final composite.

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use super::PipelineError;

/// Encoded image ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct Export {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Download name for an export made at `at`: `kupu-<unix millis>.jpg`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("kupu-{}.jpg", at.timestamp_millis())
}

/// Encode as baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, PipelineError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Encode `image` and name it after the current time.
pub fn export_jpeg(image: &RgbaImage, quality: u8) -> Result<Export, PipelineError> {
    Ok(Export {
        file_name: export_file_name(Utc::now()),
        bytes: encode_jpeg(image, quality)?,
    })
}
