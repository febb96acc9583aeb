// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! `data:` URL encoding for images sent to and received from the service.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, GrayImage, ImageFormat, RgbaImage};
use std::io::Cursor;

use super::PipelineError;

/// Prefix assumed for bare base64 payloads returned by the service.
pub const JPEG_PREFIX: &str = "data:image/jpeg;base64,";

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parse `data:<mime>;base64,<payload>`.
    ///
    /// A string without the `data:` scheme is treated as a bare base64 JPEG,
    /// which is what some service builds return.
    pub fn parse(input: &str) -> Result<Self, PipelineError> {
        let input = input.trim();
        let Some(rest) = input.strip_prefix("data:") else {
            let bytes = BASE64.decode(input)?;
            return Ok(Self {
                mime: "image/jpeg".to_string(),
                bytes,
            });
        };
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| PipelineError::MalformedDataUrl("missing ',' separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| PipelineError::MalformedDataUrl("only base64 payloads are supported".into()))?;
        Ok(Self {
            mime: if mime.is_empty() {
                "text/plain".to_string()
            } else {
                mime.to_string()
            },
            bytes: BASE64.decode(payload)?,
        })
    }

    /// Render back to a `data:` URL string.
    pub fn to_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            _ => "bin",
        }
    }

    /// Decode the payload as an RGBA image.
    pub fn decode_image(&self) -> Result<RgbaImage, PipelineError> {
        let img = image::load_from_memory(&self.bytes)?;
        Ok(img.to_rgba8())
    }
}

/// Normalise a service payload to a full data URL string.
pub fn ensure_data_url(payload: &str) -> String {
    if payload.starts_with("data:") {
        payload.to_string()
    } else {
        format!("{JPEG_PREFIX}{payload}")
    }
}

fn encode_png(image: DynamicImage) -> Result<String, PipelineError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(DataUrl {
        mime: "image/png".to_string(),
        bytes,
    }
    .to_url())
}

/// Encode an RGBA image as a PNG data URL.
pub fn image_to_data_url(image: &RgbaImage) -> Result<String, PipelineError> {
    encode_png(DynamicImage::ImageRgba8(image.clone()))
}

/// Encode a mask as a PNG data URL.
pub fn mask_to_data_url(mask: &GrayImage) -> Result<String, PipelineError> {
    encode_png(DynamicImage::ImageLuma8(mask.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    #[test]
    fn parse_png_data_url() {
        let url = DataUrl {
            mime: "image/png".into(),
            bytes: vec![1, 2, 3],
        }
        .to_url();
        assert_eq!(url, "data:image/png;base64,AQID");
        let parsed = DataUrl::parse(&url).unwrap();
        assert_eq!(parsed.mime, "image/png");
        assert_eq!(parsed.bytes, vec![1, 2, 3]);
        assert_eq!(parsed.extension(), "png");
    }

    #[test]
    fn bare_base64_is_jpeg() {
        let parsed = DataUrl::parse("AQID").unwrap();
        assert_eq!(parsed.mime, "image/jpeg");
        assert_eq!(parsed.bytes, vec![1, 2, 3]);
        assert_eq!(ensure_data_url("AQID"), "data:image/jpeg;base64,AQID");
        assert_eq!(ensure_data_url("data:image/png;base64,AQID"), "data:image/png;base64,AQID");
    }

    #[test]
    fn malformed_urls_are_rejected() {
        assert!(matches!(
            DataUrl::parse("data:image/png;base64"),
            Err(PipelineError::MalformedDataUrl(_))
        ));
        assert!(matches!(
            DataUrl::parse("data:image/png,rawtext"),
            Err(PipelineError::MalformedDataUrl(_))
        ));
        assert!(matches!(
            DataUrl::parse("data:image/png;base64,@@@"),
            Err(PipelineError::Base64(_))
        ));
    }

    #[test]
    fn image_survives_png_encoding() {
        let img = RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 80, 7, 255]));
        let url = image_to_data_url(&img).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let back = DataUrl::parse(&url).unwrap().decode_image().unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn mask_is_encoded_as_png() {
        let mask = GrayImage::from_pixel(4, 4, Luma([255]));
        let url = mask_to_data_url(&mask).unwrap();
        let back = DataUrl::parse(&url).unwrap().decode_image().unwrap();
        assert_eq!(back.get_pixel(2, 2), &Rgba([255, 255, 255, 255]));
    }
}
