//! The ASCII backdrop compositor.
//!
//! Per frame: the source is sampled onto a low-resolution grid (one RGBA
//! sample per cell), each cell's brightness picks a ramp glyph, and the
//! cell's position runs through the parallax + zoom projection before it
//! lands on the canvas. The grid is padded well past the visible canvas
//! so the projection always has material to pull in from the edges.

use crate::canvas::{Cell, CellCanvas};
use crate::glyph::{glyph_for, mean_brightness};
use crate::source::PixelFrame;
use crate::theme::Theme;
use crate::viewport::ViewportState;

/// Overdraw margin around the canvas, in source pixels.
pub const PADDING_PX: u32 = 200;

/// The cover still stretches this far past the canvas on both axes.
pub const COVER_STRETCH: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
    pub pad_cells: u32,
}

/// Grid dimensions for a terminal of `term_w x term_h` cells:
/// `floor((extent_px + 2 * padding) / cell_px)` per axis, with one
/// terminal cell standing in for one `cell_px`-sized virtual cell.
pub fn grid_for(term_w: u32, term_h: u32, theme: Theme) -> GridSpec {
    let cell = theme.cell_px();
    GridSpec {
        cols: (term_w * cell + 2 * PADDING_PX) / cell,
        rows: (term_h * cell + 2 * PADDING_PX) / cell,
        pad_cells: PADDING_PX / cell,
    }
}

/// Paint one sampled frame through the glyph pipeline onto `canvas`.
/// `frame` must be sampled at `grid.cols x grid.rows`; cells whose
/// projected position falls outside the canvas are dropped.
pub fn compose_backdrop(
    frame: &PixelFrame,
    grid: GridSpec,
    viewport: &ViewportState,
    theme: Theme,
    canvas: &mut CellCanvas,
) {
    canvas.fill(theme.backdrop());

    let center_x = canvas.width() as f32 / 2.0;
    let center_y = canvas.height() as f32 / 2.0;
    let pad = grid.pad_cells as f32;
    let zoom = viewport.zoom;
    let bg = theme.backdrop();

    for j in 0..grid.rows {
        for i in 0..grid.cols {
            let (r, g, b) = frame.rgb_at(i, j);
            let brightness = mean_brightness(r, g, b);
            let glyph = glyph_for(brightness);
            if glyph == b' ' {
                continue;
            }

            let base_x = i as f32 - pad + viewport.mouse.0;
            let base_y = j as f32 - pad + viewport.mouse.1;
            let x = center_x + (base_x - center_x) * zoom;
            let y = center_y + (base_y - center_y) * zoom;
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (cx, cy) = (x.round() as usize, y.round() as usize);
            canvas.set(
                cx,
                cy,
                Cell {
                    ch: glyph as char,
                    fg: theme.glyph_color(brightness),
                    bg,
                },
            );
        }
    }
}

/// The cheap game-overlay path: stretch the still over the canvas as
/// background-colored cells, cover-fit with `COVER_STRETCH` overflow and
/// no glyph mapping.
pub fn compose_cover(still: &PixelFrame, theme: Theme, canvas: &mut CellCanvas) {
    canvas.fill(theme.backdrop());
    if still.width() == 0 || still.height() == 0 {
        return;
    }

    let cw = canvas.width() as f32;
    let ch = canvas.height() as f32;
    let iw = still.width() as f32;
    let ih = still.height() as f32;
    let scale = (cw / iw).max(ch / ih) * COVER_STRETCH;
    let offset_x = (cw - iw * scale) / 2.0;
    let offset_y = (ch - ih * scale) / 2.0;

    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            let sx = (x as f32 - offset_x) / scale;
            let sy = (y as f32 - offset_y) / scale;
            if sx < 0.0 || sy < 0.0 || sx >= iw || sy >= ih {
                continue;
            }
            let (r, g, b) = still.rgb_at(sx as u32, sy as u32);
            canvas.set_bg(x, y, crossterm::style::Color::Rgb { r, g, b });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_backdrop, compose_cover, grid_for, GridSpec, PADDING_PX};
    use crate::canvas::CellCanvas;
    use crate::glyph::fnv1a64;
    use crate::source::PixelFrame;
    use crate::theme::Theme;
    use crate::viewport::ViewportState;

    fn flat_frame(grid: GridSpec, level: u8) -> PixelFrame {
        let len = (grid.cols * grid.rows * 4) as usize;
        let mut rgba = vec![level; len];
        for pixel in rgba.chunks_exact_mut(4) {
            pixel[3] = 255;
        }
        PixelFrame::from_rgba(grid.cols, grid.rows, rgba)
    }

    fn canvas_hash(canvas: &CellCanvas) -> u64 {
        fnv1a64(canvas.text_lines().join("\n").as_bytes())
    }

    #[test]
    fn grid_adds_theme_scaled_padding() {
        let dark = grid_for(120, 40, Theme::Dark);
        assert_eq!(dark, GridSpec { cols: 170, rows: 90, pad_cells: 25 });

        let light = grid_for(120, 40, Theme::Light);
        assert_eq!(light, GridSpec { cols: 220, rows: 140, pad_cells: 50 });

        assert_eq!(dark.pad_cells * Theme::Dark.cell_px(), PADDING_PX);
    }

    #[test]
    fn composition_is_deterministic() {
        let grid = grid_for(60, 20, Theme::Dark);
        let frame = flat_frame(grid, 180);
        let viewport = ViewportState::new();

        let mut first = CellCanvas::new(60, 20, Theme::Dark.backdrop());
        let mut second = CellCanvas::new(60, 20, Theme::Dark.backdrop());
        compose_backdrop(&frame, grid, &viewport, Theme::Dark, &mut first);
        compose_backdrop(&frame, grid, &viewport, Theme::Dark, &mut second);
        assert_eq!(canvas_hash(&first), canvas_hash(&second));
    }

    #[test]
    fn bright_frame_projects_a_spread_glyph_field() {
        let grid = grid_for(40, 12, Theme::Dark);
        let frame = flat_frame(grid, 255);
        let viewport = ViewportState::new();
        let mut canvas = CellCanvas::new(40, 12, Theme::Dark.backdrop());
        compose_backdrop(&frame, grid, &viewport, Theme::Dark, &mut canvas);

        // At zoom 3 neighboring grid cells land 3 canvas cells apart: the
        // canvas center takes a glyph, the cell next to it stays blank.
        assert_eq!(canvas.get(20, 6).map(|c| c.ch), Some('@'));
        assert_eq!(canvas.get(21, 6).map(|c| c.ch), Some(' '));

        let drawn: usize = canvas
            .text_lines()
            .iter()
            .map(|line| line.chars().filter(|c| *c == '@').count())
            .sum();
        assert!(drawn > 0);
        assert!(drawn < 40 * 12);
    }

    #[test]
    fn dark_frame_composes_to_blank_canvas() {
        let grid = grid_for(40, 12, Theme::Dark);
        let frame = flat_frame(grid, 0);
        let viewport = ViewportState::new();
        let mut canvas = CellCanvas::new(40, 12, Theme::Dark.backdrop());
        compose_backdrop(&frame, grid, &viewport, Theme::Dark, &mut canvas);
        for line in canvas.text_lines() {
            assert!(line.chars().all(|c| c == ' '));
        }
    }

    #[test]
    fn zoom_changes_the_projection() {
        let grid = grid_for(40, 12, Theme::Dark);
        // A single bright column a few cells right of grid center: it
        // stays on canvas at both zooms but lands at different positions.
        let column = grid.cols / 2 + 3;
        let mut rgba = vec![0u8; (grid.cols * grid.rows * 4) as usize];
        for j in 0..grid.rows {
            let idx = ((j * grid.cols + column) * 4) as usize;
            rgba[idx] = 255;
            rgba[idx + 1] = 255;
            rgba[idx + 2] = 255;
        }
        let frame = PixelFrame::from_rgba(grid.cols, grid.rows, rgba);

        let mut near = ViewportState::new();
        near.zoom = 3.0;
        let mut far = ViewportState::new();
        far.zoom = 2.0;

        let mut canvas_near = CellCanvas::new(40, 12, Theme::Dark.backdrop());
        let mut canvas_far = CellCanvas::new(40, 12, Theme::Dark.backdrop());
        compose_backdrop(&frame, grid, &near, Theme::Dark, &mut canvas_near);
        compose_backdrop(&frame, grid, &far, Theme::Dark, &mut canvas_far);
        assert_ne!(canvas_hash(&canvas_near), canvas_hash(&canvas_far));
    }

    #[test]
    fn cover_fit_covers_every_cell() {
        let mut rgba = Vec::new();
        for _ in 0..(4 * 4) {
            rgba.extend_from_slice(&[90, 120, 150, 255]);
        }
        let still = PixelFrame::from_rgba(4, 4, rgba);
        let mut canvas = CellCanvas::new(10, 6, Theme::Dark.backdrop());
        compose_cover(&still, Theme::Dark, &mut canvas);

        let expected = crossterm::style::Color::Rgb { r: 90, g: 120, b: 150 };
        for y in 0..6 {
            for x in 0..10 {
                let cell = canvas.get(x, y).expect("cell in range");
                assert_eq!(cell.bg, expected, "cell ({x},{y})");
            }
        }
    }
}
