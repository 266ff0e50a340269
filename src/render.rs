//! Headless backdrop rendering.
//!
//! Renders N frames of the glyph pipeline to stdout as plain text and
//! prints FNV-1a hashes per frame plus a sequence hash over all of them.
//! With `--expected-hash` the run doubles as a regression check; with
//! `--sidecar` the hashes also land in a JSON file at the given path.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::canvas::CellCanvas;
use crate::compositor::{compose_backdrop, grid_for};
use crate::glyph::fnv1a64;
use crate::source::{FrameSource, SourceSpec};
use crate::theme::Theme;
use crate::viewport::{ViewportState, ZOOM_MAX, ZOOM_MIN};

pub struct RenderArgs {
    pub source: SourceSpec,
    pub cols: u32,
    pub rows: u32,
    pub frames: u32,
    pub theme: Theme,
    pub zoom: f32,
    pub quiet: bool,
    pub sidecar: Option<PathBuf>,
    pub expected_hash: Option<u64>,
}

#[derive(serde::Serialize)]
struct RenderSidecar {
    cols: u32,
    rows: u32,
    theme: String,
    source: String,
    zoom: f32,
    frame_hashes: Vec<String>,
    sequence_hash: String,
}

pub fn parse_hash(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16).with_context(|| format!("invalid hash '{raw}'"))
}

pub fn run_render(args: RenderArgs) -> Result<()> {
    if args.cols == 0 || args.rows == 0 {
        bail!("render dimensions must be greater than zero");
    }
    if args.frames == 0 {
        bail!("frame count must be greater than zero");
    }
    if !(ZOOM_MIN..=ZOOM_MAX).contains(&args.zoom) {
        bail!("zoom must be within [{ZOOM_MIN}, {ZOOM_MAX}]");
    }

    let grid = grid_for(args.cols, args.rows, args.theme);
    let mut source = FrameSource::open(&args.source)?;
    let mut viewport = ViewportState::new();
    viewport.zoom = args.zoom;

    let mut canvas = CellCanvas::new(args.cols as usize, args.rows as usize, args.theme.backdrop());
    let mut frame_hashes: Vec<u64> = Vec::with_capacity(args.frames as usize);

    for index in 0..args.frames {
        let Some(frame) = source.next_frame(grid.cols, grid.rows)? else {
            bail!("source produced no frame at index {index}");
        };
        compose_backdrop(frame, grid, &viewport, args.theme, &mut canvas);

        let text = canvas.text_lines().join("\n");
        let hash = fnv1a64(text.as_bytes());
        frame_hashes.push(hash);

        if !args.quiet {
            println!("{text}");
            println!();
        }
    }

    let mut sequence_bytes = Vec::with_capacity(frame_hashes.len() * 8);
    for hash in &frame_hashes {
        sequence_bytes.extend_from_slice(&hash.to_le_bytes());
    }
    let sequence_hash = fnv1a64(&sequence_bytes);

    for (index, hash) in frame_hashes.iter().enumerate() {
        println!("[kiosk] frame {index} hash: 0x{hash:016x}");
    }
    if let Some(expected) = args.expected_hash {
        if expected != sequence_hash {
            bail!("sequence hash mismatch! expected 0x{expected:016x}, got 0x{sequence_hash:016x}");
        }
        println!("[kiosk] regression check passed: 0x{sequence_hash:016x}");
    } else {
        println!("[kiosk] sequence hash: 0x{sequence_hash:016x}");
    }

    if let Some(path) = &args.sidecar {
        let sidecar = RenderSidecar {
            cols: args.cols,
            rows: args.rows,
            theme: args.theme.as_str().to_owned(),
            source: args.source.describe(),
            zoom: args.zoom,
            frame_hashes: frame_hashes
                .iter()
                .map(|hash| format!("0x{hash:016x}"))
                .collect(),
            sequence_hash: format!("0x{sequence_hash:016x}"),
        };
        let json = serde_json::to_string_pretty(&sidecar)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write sidecar {}", path.display()))?;
        println!("[kiosk] wrote sidecar to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_hash;

    #[test]
    fn hash_parsing_accepts_prefixed_and_bare_hex() {
        assert_eq!(parse_hash("0x10").unwrap(), 16);
        assert_eq!(parse_hash("ff").unwrap(), 255);
        assert_eq!(
            parse_hash("0xcbf29ce484222325").unwrap(),
            0xcbf2_9ce4_8422_2325
        );
        assert!(parse_hash("zz").is_err());
    }
}
