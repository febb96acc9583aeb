// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Headless command-line front end.
//!
//! ```text
//! kupu mask --input photo.jpg --masks masks.json --output mask.png
//! kupu erase --input photo.jpg --masks masks.json --output clean.jpg
//! kupu erase --input photo.jpg --events session.json --output clean.jpg --endpoint http://gpu:8003
//! kupu composite --original photo.jpg --inpainted result.png --mask mask.png --output clean.jpg
//! ```
//!
//! Mask files hold a JSON array of paths, each an array of `{"x", "y"}`
//! points in image pixels. Event files hold a JSON array of editor actions
//! (`{"type": "pointer_down", "position": {"x": 10, "y": 20}}` and so on)
//! that are replayed through the reducer as if they came from a canvas.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::data::AppState;
use crate::editing::{Action, MaskPath};
use crate::inpaint::HttpInpainter;
use crate::pipeline::{composite_result, encode_jpeg, rasterize_mask};

/// Lasso-and-erase photo editing backed by an inpainting service.
#[derive(Parser, Debug)]
#[command(name = "kupu", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rasterize mask paths into a black/white PNG the size of the input
    Mask {
        #[arg(short, long, value_name = "IMAGE")]
        input: PathBuf,
        #[arg(short, long, value_name = "MASKS.json")]
        masks: PathBuf,
        #[arg(short, long, value_name = "MASK.png")]
        output: PathBuf,
    },
    /// Send an image and its masks to the service and save the composite
    Erase(EraseArgs),
    /// Composite an inpainted result back onto its original
    Composite {
        #[arg(long, value_name = "IMAGE")]
        original: PathBuf,
        #[arg(long, value_name = "IMAGE")]
        inpainted: PathBuf,
        #[arg(long, value_name = "MASK.png")]
        mask: PathBuf,
        #[arg(short, long, value_name = "OUT.jpg")]
        output: PathBuf,
        /// JPEG quality (1-100)
        #[arg(short, long, default_value_t = crate::settings::image::EXPORT_JPEG_QUALITY)]
        quality: u8,
    },
}

#[derive(Args, Debug)]
pub struct EraseArgs {
    #[arg(short, long, value_name = "IMAGE")]
    pub input: PathBuf,

    /// Mask paths in image coordinates
    #[arg(short, long, value_name = "MASKS.json", conflicts_with = "events", required_unless_present = "events")]
    pub masks: Option<PathBuf>,

    /// Recorded editor actions to replay instead of a mask file
    #[arg(short, long, value_name = "EVENTS.json")]
    pub events: Option<PathBuf>,

    #[arg(short, long, value_name = "OUT.jpg")]
    pub output: PathBuf,

    /// Service base URL (overrides config and KUPU_API_BASE_URL)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[arg(short, long, value_name = "kupu.toml")]
    pub config: Option<PathBuf>,
}

/// Execute one parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Mask {
            input,
            masks,
            output,
        } => write_mask(&input, &masks, &output),
        Command::Erase(args) => erase(&args),
        Command::Composite {
            original,
            inpainted,
            mask,
            output,
            quality,
        } => composite(&original, &inpainted, &mask, &output, quality),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_masks(path: &Path) -> Result<Vec<MaskPath>> {
    read_json(path)
}

pub fn load_events(path: &Path) -> Result<Vec<Action>> {
    read_json(path)
}

fn write_mask(input: &Path, masks: &Path, output: &Path) -> Result<()> {
    let (width, height) = image::image_dimensions(input)
        .with_context(|| format!("Failed to read image {}", input.display()))?;
    let paths = load_masks(masks)?;
    let mask = rasterize_mask(&paths, width, height);
    mask.save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Wrote {}x{} mask to {}", width, height, output.display());
    Ok(())
}

fn erase(args: &EraseArgs) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(endpoint) = &args.endpoint {
        config.base_url = endpoint.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    let mut state = AppState::new(config);
    state
        .import_image(&args.input)
        .with_context(|| format!("Failed to import {}", args.input.display()))?;

    if let Some(events) = &args.events {
        let actions = load_events(events)?;
        tracing::debug!("Replaying {} actions", actions.len());
        for action in actions {
            state.dispatch(action);
        }
    } else if let Some(masks) = &args.masks {
        for path in load_masks(masks)? {
            state.dispatch(Action::CommitPath { path });
        }
    }
    if state.editor.masks.is_empty() {
        bail!("No mask to erase: draw at least one path with two or more points");
    }

    let inpainter = HttpInpainter::new(&state.config.base_url, state.config.timeout())?;
    if let Err(err) = state.erase(&inpainter) {
        bail!("{}", err.status_message());
    }

    let export = state.save()?;
    std::fs::write(&args.output, &export.bytes)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Saved {}", args.output.display());
    Ok(())
}

fn composite(
    original: &Path,
    inpainted: &Path,
    mask: &Path,
    output: &Path,
    quality: u8,
) -> Result<()> {
    let open = |path: &Path| {
        image::open(path).with_context(|| format!("Failed to read image {}", path.display()))
    };
    let original = open(original)?.to_rgba8();
    let inpainted = open(inpainted)?.to_rgba8();
    let mask = open(mask)?.to_luma8();

    let result = composite_result(&original, &inpainted, &mask);
    let bytes = encode_jpeg(&result, quality)?;
    std::fs::write(output, bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Wrote composite to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn parses_erase_with_masks() {
        let cli = Cli::try_parse_from([
            "kupu", "erase", "-i", "a.jpg", "--masks", "m.json", "-o", "out.jpg", "--timeout",
            "5",
        ])
        .unwrap();
        let Command::Erase(args) = cli.command else {
            panic!("expected erase");
        };
        assert_eq!(args.masks.as_deref(), Some(Path::new("m.json")));
        assert_eq!(args.timeout, Some(5));
    }

    #[test]
    fn erase_needs_exactly_one_mask_source() {
        assert!(Cli::try_parse_from(["kupu", "erase", "-i", "a.jpg", "-o", "o.jpg"]).is_err());
        assert!(
            Cli::try_parse_from([
                "kupu", "erase", "-i", "a.jpg", "-m", "m.json", "-e", "e.json", "-o", "o.jpg",
            ])
            .is_err()
        );
    }

    #[test]
    fn mask_command_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        RgbaImage::from_pixel(20, 10, Rgba([5, 5, 5, 255]))
            .save(&input)
            .unwrap();
        let masks = dir.path().join("masks.json");
        std::fs::write(
            &masks,
            r#"[[{"x":0,"y":0},{"x":10,"y":0},{"x":10,"y":10},{"x":0,"y":10}]]"#,
        )
        .unwrap();
        let output = dir.path().join("mask.png");

        write_mask(&input, &masks, &output).unwrap();

        let mask = image::open(&output).unwrap().to_luma8();
        assert_eq!(mask.dimensions(), (20, 10));
        assert_eq!(mask.get_pixel(5, 5).0[0], 255);
        assert_eq!(mask.get_pixel(15, 5).0[0], 0);
    }

    #[test]
    fn composite_command_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("original.png");
        let inpainted = dir.path().join("inpainted.png");
        let mask = dir.path().join("mask.png");
        let output = dir.path().join("out.jpg");
        RgbaImage::from_pixel(16, 16, Rgba([0, 0, 250, 255]))
            .save(&original)
            .unwrap();
        RgbaImage::from_pixel(8, 8, Rgba([250, 250, 0, 255]))
            .save(&inpainted)
            .unwrap();
        GrayImage::from_fn(8, 8, |x, _| Luma([if x < 4 { 255 } else { 0 }]))
            .save(&mask)
            .unwrap();

        composite(&original, &inpainted, &mask, &output, 95).unwrap();

        let out = image::open(&output).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (16, 16));
        assert!(out.get_pixel(2, 8).0[0] > 200);
        assert!(out.get_pixel(14, 8).0[2] > 200);
    }

    #[test]
    fn events_file_replays_actions() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("events.json");
        std::fs::write(
            &events,
            r#"[
                {"type": "resize", "width": 400, "height": 300},
                {"type": "toggle_mode"},
                {"type": "pointer_down", "position": {"x": 10, "y": 10}},
                {"type": "pointer_move", "position": {"x": 50, "y": 10}},
                {"type": "pointer_move", "position": {"x": 50, "y": 50}},
                {"type": "pointer_up"}
            ]"#,
        )
        .unwrap();
        let actions = load_events(&events).unwrap();
        assert_eq!(actions.len(), 6);

        let mut state = AppState::default();
        state.dispatch(Action::ImageLoaded(std::sync::Arc::new(RgbaImage::new(
            100, 100,
        ))));
        for action in actions {
            state.dispatch(action);
        }
        assert_eq!(state.editor.masks.len(), 1);
    }

    #[test]
    fn erase_without_masks_fails_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]))
            .save(&input)
            .unwrap();
        let masks = dir.path().join("masks.json");
        std::fs::write(&masks, r#"[[{"x": 1, "y": 1}]]"#).unwrap();

        let args = EraseArgs {
            input,
            masks: Some(masks),
            events: None,
            output: dir.path().join("out.jpg"),
            endpoint: Some("http://127.0.0.1:9".into()),
            timeout: Some(1),
            config: None,
        };
        let err = erase(&args).unwrap_err();
        assert!(err.to_string().contains("No mask to erase"));
    }
}
