//! Built-in procedural clips.
//!
//! Each clip is a pure function of `(frame_index, width, height)` rendered
//! with tiny-skia, so the backdrop needs no media assets and headless
//! renders hash identically across runs. Geometry is tuned for the glyph
//! ramp: large smooth shapes, strong brightness separation.

use anyhow::{anyhow, Result};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::source::PixelFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    Drift,
    Pulse,
    Lattice,
}

impl ClipKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "drift" => Some(ClipKind::Drift),
            "pulse" => Some(ClipKind::Pulse),
            "lattice" => Some(ClipKind::Lattice),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClipKind::Drift => "drift",
            ClipKind::Pulse => "pulse",
            ClipKind::Lattice => "lattice",
        }
    }
}

pub struct ClipPlayer {
    kind: ClipKind,
    frame_index: u64,
    frame: PixelFrame,
}

impl ClipPlayer {
    pub fn new(kind: ClipKind) -> Self {
        Self {
            kind,
            frame_index: 0,
            frame: PixelFrame::new(0, 0),
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Render a specific frame at the requested size.
    pub fn render_at(&mut self, index: u64, width: u32, height: u32) -> Result<&PixelFrame> {
        let pixmap = render_clip(self.kind, index, width, height)?;
        self.frame = PixelFrame::from_rgba(width, height, pixmap.data().to_vec());
        Ok(&self.frame)
    }

    /// Render the current frame and advance the playhead.
    pub fn advance(&mut self, width: u32, height: u32) -> Result<&PixelFrame> {
        let index = self.frame_index;
        self.frame_index += 1;
        self.render_at(index, width, height)
    }
}

fn render_clip(kind: ClipKind, index: u64, width: u32, height: u32) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("failed to allocate {width}x{height} clip pixmap"))?;
    pixmap.fill(Color::from_rgba8(8, 8, 8, 255));

    match kind {
        ClipKind::Drift => draw_drift(&mut pixmap, index),
        ClipKind::Pulse => draw_pulse(&mut pixmap, index),
        ClipKind::Lattice => draw_lattice(&mut pixmap, index),
    }

    Ok(pixmap)
}

fn gray_paint(level: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(level, level, level, 255);
    paint.anti_alias = true;
    paint
}

fn fill_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, radius: f32, level: u8) {
    let mut builder = PathBuilder::new();
    builder.push_circle(cx, cy, radius.max(0.5));
    if let Some(path) = builder.finish() {
        pixmap.fill_path(
            &path,
            &gray_paint(level),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

/// Three slow orbiting discs with a dim halo each.
fn draw_drift(pixmap: &mut Pixmap, index: u64) {
    let w = pixmap.width() as f32;
    let h = pixmap.height() as f32;
    let t = index as f32 * 0.02;

    let orbits: [(f32, f32, f32, u8); 3] = [
        (0.0, 0.33, 0.30, 230),
        (2.1, 0.27, 0.22, 170),
        (4.2, 0.38, 0.16, 110),
    ];
    for (phase, sweep, size, level) in orbits {
        let cx = w * (0.5 + sweep * (t + phase).cos());
        let cy = h * (0.5 + sweep * 0.8 * (t * 1.3 + phase).sin());
        let radius = h * size;
        fill_circle(pixmap, cx, cy, radius * 1.6, level / 3);
        fill_circle(pixmap, cx, cy, radius, level);
    }
}

/// Concentric rings expanding from the center, brightest when young.
fn draw_pulse(pixmap: &mut Pixmap, index: u64) {
    let w = pixmap.width() as f32;
    let h = pixmap.height() as f32;
    let cx = w / 2.0;
    let cy = h / 2.0;
    let max_radius = (w.max(h)) * 0.75;
    let spacing = max_radius / 5.0;
    let travel = index as f32 * 0.9;

    for ring in 0..6 {
        let radius = (travel + ring as f32 * spacing) % max_radius;
        let age = radius / max_radius;
        let level = (235.0 * (1.0 - age)) as u8;
        if level < 16 {
            continue;
        }

        let mut builder = PathBuilder::new();
        builder.push_circle(cx, cy, radius.max(0.5));
        if let Some(path) = builder.finish() {
            let stroke = Stroke {
                width: (h / 14.0).max(1.0),
                ..Stroke::default()
            };
            pixmap.stroke_path(
                &path,
                &gray_paint(level),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }
}

/// Two translating bar sets forming a drifting weave.
fn draw_lattice(pixmap: &mut Pixmap, index: u64) {
    let w = pixmap.width() as f32;
    let h = pixmap.height() as f32;
    let t = index as f32;

    let bar_w = w / 9.0;
    let shift_x = (t * 0.7) % (bar_w * 2.0);
    let mut x = -bar_w * 2.0 + shift_x;
    while x < w {
        if let Some(rect) = Rect::from_xywh(x, 0.0, bar_w, h) {
            pixmap.fill_rect(rect, &gray_paint(120), Transform::identity(), None);
        }
        x += bar_w * 2.0;
    }

    let bar_h = h / 5.0;
    let shift_y = (t * 0.45) % (bar_h * 2.0);
    let mut y = -bar_h * 2.0 + shift_y;
    while y < h {
        if let Some(rect) = Rect::from_xywh(0.0, y, w, bar_h) {
            pixmap.fill_rect(rect, &gray_paint(210), Transform::identity(), None);
        }
        y += bar_h * 2.0;
    }
}
