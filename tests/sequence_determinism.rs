//! End-to-end determinism of the glyph pipeline through the library API:
//! the same source, grid, and viewport must hash identically, and the
//! scroll-driven zoom must actually move glyphs.

use kiosk::canvas::CellCanvas;
use kiosk::clip::{ClipKind, ClipPlayer};
use kiosk::compositor::{compose_backdrop, grid_for};
use kiosk::glyph::fnv1a64;
use kiosk::theme::Theme;
use kiosk::viewport::{zoom_for_scroll, ViewportState};

fn render_sequence(theme: Theme, zoom: f32, frames: u64) -> Vec<u64> {
    let grid = grid_for(60, 20, theme);
    let mut player = ClipPlayer::new(ClipKind::Drift);
    let mut viewport = ViewportState::new();
    viewport.zoom = zoom;

    (0..frames)
        .map(|index| {
            let mut canvas = CellCanvas::new(60, 20, theme.backdrop());
            let frame = player
                .render_at(index, grid.cols, grid.rows)
                .expect("clip should render")
                .clone();
            compose_backdrop(&frame, grid, &viewport, theme, &mut canvas);
            fnv1a64(canvas.text_lines().join("\n").as_bytes())
        })
        .collect()
}

#[test]
fn identical_runs_hash_identically() {
    let first = render_sequence(Theme::Dark, 3.0, 5);
    let second = render_sequence(Theme::Dark, 3.0, 5);
    assert_eq!(first, second);
}

#[test]
fn successive_frames_differ() {
    let hashes = render_sequence(Theme::Dark, 3.0, 5);
    let distinct: std::collections::HashSet<_> = hashes.iter().collect();
    assert!(distinct.len() > 1, "clip frames should animate");
}

#[test]
fn zoom_setting_changes_the_field() {
    let near = render_sequence(Theme::Dark, 3.0, 3);
    let far = render_sequence(Theme::Dark, 2.0, 3);
    assert_ne!(near, far);
}

#[test]
fn scroll_zoom_mapping_spans_the_range() {
    // The zoom a full scroll produces is exactly the projection's far end.
    let max_scroll = 300.0;
    assert_eq!(zoom_for_scroll(0.0, max_scroll), 3.0);
    assert_eq!(zoom_for_scroll(max_scroll, max_scroll), 2.0);
    let mid = zoom_for_scroll(max_scroll / 2.0, max_scroll);
    assert!(mid > 2.0 && mid < 3.0);
}
