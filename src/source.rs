//! Frame sources for the backdrop compositor.
//!
//! A source yields RGBA frames at cell resolution. Three kinds exist:
//! built-in procedural clips (the "playing video" of the page), still
//! images, and (when ffmpeg is on PATH) real video files. A source that
//! cannot produce a frame yet reports `None` and the compositor simply
//! draws nothing that tick.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use crate::clip::{ClipKind, ClipPlayer};
use crate::video::{VideoInput, DECODE_HEIGHT, DECODE_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB at (x, y), clamped to the frame edge.
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let idx = (y * self.width as usize + x) * 4;
        (self.rgba[idx], self.rgba[idx + 1], self.rgba[idx + 2])
    }

    /// Channel-inverted copy. The dark theme shows the cover still
    /// inverted; computing it once up front keeps the frame loop cheap.
    pub fn inverted(&self) -> PixelFrame {
        let mut rgba = self.rgba.clone();
        for pixel in rgba.chunks_exact_mut(4) {
            pixel[0] = 255 - pixel[0];
            pixel[1] = 255 - pixel[1];
            pixel[2] = 255 - pixel[2];
        }
        PixelFrame {
            width: self.width,
            height: self.height,
            rgba,
        }
    }
}

/// Area-averaged downsample. Every destination cell averages its whole
/// source footprint, so thin features dim instead of flickering.
pub fn resample_box(src: &PixelFrame, out_w: u32, out_h: u32) -> PixelFrame {
    if src.width == 0 || src.height == 0 || out_w == 0 || out_h == 0 {
        return PixelFrame::new(out_w, out_h);
    }

    let mut out = PixelFrame::new(out_w, out_h);
    for y in 0..out_h {
        let y0 = (y as u64 * src.height as u64 / out_h as u64) as u32;
        let mut y1 = ((y + 1) as u64 * src.height as u64 / out_h as u64) as u32;
        y1 = y1.max(y0 + 1).min(src.height);
        for x in 0..out_w {
            let x0 = (x as u64 * src.width as u64 / out_w as u64) as u32;
            let mut x1 = ((x + 1) as u64 * src.width as u64 / out_w as u64) as u32;
            x1 = x1.max(x0 + 1).min(src.width);

            let mut total = [0u32; 4];
            for sy in y0..y1 {
                for sx in x0..x1 {
                    let idx = (sy as usize * src.width as usize + sx as usize) * 4;
                    for (channel, value) in total.iter_mut().zip(&src.rgba[idx..idx + 4]) {
                        *channel += u32::from(*value);
                    }
                }
            }
            let count = (y1 - y0) * (x1 - x0);
            let idx = (y as usize * out_w as usize + x as usize) * 4;
            for channel in 0..4 {
                out.rgba[idx + channel] = ((total[channel] + count / 2) / count) as u8;
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Clip(ClipKind),
    Image(PathBuf),
    Video(PathBuf),
}

impl SourceSpec {
    /// Parse `clip:<id>`, `image:<path>`, `video:<path>`, or a bare
    /// built-in clip id.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if let Some(id) = trimmed.strip_prefix("clip:") {
            return ClipKind::from_id(id)
                .map(SourceSpec::Clip)
                .ok_or_else(|| unknown_clip(id));
        }
        if let Some(path) = trimmed.strip_prefix("image:") {
            return Ok(SourceSpec::Image(PathBuf::from(path)));
        }
        if let Some(path) = trimmed.strip_prefix("video:") {
            return Ok(SourceSpec::Video(PathBuf::from(path)));
        }
        ClipKind::from_id(trimmed)
            .map(SourceSpec::Clip)
            .ok_or_else(|| unknown_clip(trimmed))
    }

    pub fn describe(&self) -> String {
        match self {
            SourceSpec::Clip(kind) => format!("clip:{}", kind.as_str()),
            SourceSpec::Image(path) => format!("image:{}", path.display()),
            SourceSpec::Video(path) => format!("video:{}", path.display()),
        }
    }
}

fn unknown_clip(id: &str) -> anyhow::Error {
    anyhow!(
        "unknown source '{id}' (built-in clips: drift, pulse, lattice; \
         or use image:<path> / video:<path>)"
    )
}

pub enum FrameSource {
    Clip(ClipPlayer),
    Still(StillSource),
    Video(VideoStream),
}

pub struct StillSource {
    image: PixelFrame,
    scaled: Option<PixelFrame>,
}

pub struct VideoStream {
    input: VideoInput,
    decoded: Option<PixelFrame>,
    scaled: Option<PixelFrame>,
}

impl FrameSource {
    pub fn open(spec: &SourceSpec) -> Result<Self> {
        match spec {
            SourceSpec::Clip(kind) => Ok(FrameSource::Clip(ClipPlayer::new(*kind))),
            SourceSpec::Image(path) => Ok(FrameSource::Still(StillSource {
                image: load_image(path)?,
                scaled: None,
            })),
            SourceSpec::Video(path) => Ok(FrameSource::Video(VideoStream {
                input: VideoInput::spawn(path, DECODE_WIDTH, DECODE_HEIGHT)?,
                decoded: None,
                scaled: None,
            })),
        }
    }

    pub fn is_animated(&self) -> bool {
        !matches!(self, FrameSource::Still(_))
    }

    /// Produce the next frame at exactly `cols x rows`. `None` means the
    /// source is not ready yet (a video still waiting on its first frame).
    pub fn next_frame(&mut self, cols: u32, rows: u32) -> Result<Option<&PixelFrame>> {
        match self {
            FrameSource::Clip(player) => player.advance(cols, rows).map(Some),
            FrameSource::Still(still) => Ok(Some(still.frame_at(cols, rows))),
            FrameSource::Video(stream) => Ok(stream.frame_at(cols, rows)),
        }
    }

    /// A single representative frame, used for the game-overlay cover.
    pub fn cover_frame(&mut self, width: u32, height: u32) -> Result<PixelFrame> {
        match self {
            FrameSource::Clip(player) => Ok(player.render_at(0, width, height)?.clone()),
            FrameSource::Still(still) => Ok(resample_box(&still.image, width, height)),
            FrameSource::Video(stream) => Ok(stream
                .frame_at(width, height)
                .cloned()
                .unwrap_or_else(|| PixelFrame::new(width, height))),
        }
    }
}

impl StillSource {
    fn frame_at(&mut self, cols: u32, rows: u32) -> &PixelFrame {
        let stale = self
            .scaled
            .as_ref()
            .map(|f| f.width() != cols || f.height() != rows)
            .unwrap_or(true);
        if stale {
            self.scaled = Some(resample_box(&self.image, cols, rows));
        }
        self.scaled.as_ref().unwrap_or(&self.image)
    }
}

impl VideoStream {
    fn frame_at(&mut self, cols: u32, rows: u32) -> Option<&PixelFrame> {
        // Drain to the newest decoded frame; hold the last one on EOF.
        while let Some(rgba) = self.input.try_frame() {
            self.decoded = Some(PixelFrame::from_rgba(
                self.input.width(),
                self.input.height(),
                rgba,
            ));
            self.scaled = None;
        }

        let decoded = self.decoded.as_ref()?;
        let stale = self
            .scaled
            .as_ref()
            .map(|f| f.width() != cols || f.height() != rows)
            .unwrap_or(true);
        if stale {
            self.scaled = Some(resample_box(decoded, cols, rows));
        }
        self.scaled.as_ref()
    }
}

fn load_image(path: &Path) -> Result<PixelFrame> {
    let image = image::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        bail!("image {} has zero dimensions", path.display());
    }
    Ok(PixelFrame::from_rgba(width, height, image.into_raw()))
}

// ---------------------------------------------------------------------------
// Source registry (static list; printed by `kiosk sources`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEntry {
    pub id: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
    pub command_example: &'static str,
}

pub const SOURCE_REGISTRY: &[SourceEntry] = &[
    SourceEntry {
        id: "clip:drift",
        kind: "clip",
        description: "Three orbiting discs with halos (default backdrop).",
        command_example: "kiosk run --source clip:drift",
    },
    SourceEntry {
        id: "clip:pulse",
        kind: "clip",
        description: "Concentric rings expanding from the center.",
        command_example: "kiosk run --source clip:pulse",
    },
    SourceEntry {
        id: "clip:lattice",
        kind: "clip",
        description: "Two translating bar sets forming a drifting weave.",
        command_example: "kiosk run --source clip:lattice",
    },
    SourceEntry {
        id: "image:<path>",
        kind: "image",
        description: "Still image (png/jpeg/webp), area-averaged to the grid.",
        command_example: "kiosk render --source image:back.png --frames 1",
    },
    SourceEntry {
        id: "video:<path>",
        kind: "video",
        description: "Video file decoded by ffmpeg on PATH, looped.",
        command_example: "kiosk run --source video:back.mov",
    },
];

pub fn render_source_list() -> String {
    let mut output = String::new();
    output.push_str("KIOSK FRAME SOURCES\n");
    output.push_str("Static list only. Clips are procedural and need no assets.\n");
    for entry in SOURCE_REGISTRY {
        output.push('\n');
        output.push_str("- id: ");
        output.push_str(entry.id);
        output.push('\n');
        output.push_str("  type: ");
        output.push_str(entry.kind);
        output.push('\n');
        output.push_str("  description: ");
        output.push_str(entry.description);
        output.push('\n');
        output.push_str("  command: ");
        output.push_str(entry.command_example);
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{resample_box, PixelFrame, SourceSpec};
    use crate::clip::ClipKind;

    #[test]
    fn spec_parses_schemes_and_bare_clips() {
        assert_eq!(
            SourceSpec::parse("clip:pulse").unwrap(),
            SourceSpec::Clip(ClipKind::Pulse)
        );
        assert_eq!(
            SourceSpec::parse("drift").unwrap(),
            SourceSpec::Clip(ClipKind::Drift)
        );
        assert!(matches!(
            SourceSpec::parse("image:/tmp/x.png").unwrap(),
            SourceSpec::Image(_)
        ));
        assert!(SourceSpec::parse("clip:nope").is_err());
        assert!(SourceSpec::parse("nope").is_err());
    }

    #[test]
    fn rgb_at_clamps_to_edges() {
        let mut rgba = vec![0u8; 2 * 2 * 4];
        rgba[(1 * 2 + 1) * 4] = 200; // bottom-right red
        let frame = PixelFrame::from_rgba(2, 2, rgba);
        assert_eq!(frame.rgb_at(9, 9), (200, 0, 0));
    }

    #[test]
    fn inversion_flips_channels_only() {
        let frame = PixelFrame::from_rgba(1, 1, vec![10, 20, 30, 255]);
        let inv = frame.inverted();
        assert_eq!(inv.rgb_at(0, 0), (245, 235, 225));
    }

    #[test]
    fn resample_averages_footprint() {
        // 2x1 black/white collapses to a mid gray.
        let rgba = vec![0, 0, 0, 255, 255, 255, 255, 255];
        let src = PixelFrame::from_rgba(2, 1, rgba);
        let out = resample_box(&src, 1, 1);
        assert_eq!(out.rgb_at(0, 0), (128, 128, 128));
    }

    #[test]
    fn resample_upscale_replicates() {
        let src = PixelFrame::from_rgba(1, 1, vec![7, 8, 9, 255]);
        let out = resample_box(&src, 3, 2);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(out.rgb_at(x, y), (7, 8, 9));
            }
        }
    }
}
