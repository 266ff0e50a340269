//! Game presentation: maps the 600x300 simulation space onto a cell box.
//!
//! World-space rectangles go through one shared projection; sprites are
//! fixed cell art anchored at projected points so they stay readable at
//! any terminal size.

use crossterm::style::Color;

use crate::canvas::{Cell, CellCanvas};
use crate::game::{
    Building, GameSim, SpriteSet, BUILDING_W, CRATE_PX, GROUND_LINE_Y, PLAYER_X, WORLD_H, WORLD_W,
};
use crate::theme::Theme;

/// Two-frame run cycles; the second frame is swapped in while grounded.
const ALIEN_FRAMES: [&[&str]; 2] = [
    &[" o^o ", "(|=|)", " / \\ "],
    &[" o^o ", "(|=|)", " \\ / "],
];
const RUNNER_FRAMES: [&[&str]; 2] = [
    &["  O  ", " /|\\ ", " / \\ "],
    &["  O  ", " \\|/ ", " | | "],
];

#[derive(Debug, Clone, Copy)]
pub struct GameBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl GameBox {
    /// Center a box in the canvas, capped so small terminals still fit.
    pub fn centered(canvas_w: usize, canvas_h: usize) -> Self {
        let width = canvas_w.saturating_sub(4).min(100).max(20);
        let height = canvas_h.saturating_sub(6).min(28).max(10);
        Self {
            x: (canvas_w - width) / 2,
            y: (canvas_h.saturating_sub(height)) / 2,
            width,
            height,
        }
    }

    fn project_x(&self, world_x: f32) -> i32 {
        self.x as i32 + (world_x / WORLD_W * self.width as f32) as i32
    }

    fn project_y(&self, world_y: f32) -> i32 {
        self.y as i32 + (world_y / WORLD_H * self.height as f32) as i32
    }
}

fn fill_world_rect(
    canvas: &mut CellCanvas,
    game_box: GameBox,
    world_x: f32,
    world_y: f32,
    world_w: f32,
    world_h: f32,
    ch: char,
    fg: Color,
    bg: Color,
) {
    let x0 = game_box.project_x(world_x);
    let x1 = game_box.project_x(world_x + world_w).max(x0 + 1);
    let y0 = game_box.project_y(world_y);
    let y1 = game_box.project_y(world_y + world_h).max(y0 + 1);
    let right = (game_box.x + game_box.width) as i32;
    let bottom = (game_box.y + game_box.height) as i32;

    for y in y0.max(game_box.y as i32)..y1.min(bottom) {
        for x in x0.max(game_box.x as i32)..x1.min(right) {
            canvas.set(x as usize, y as usize, Cell { ch, fg, bg });
        }
    }
}

fn sprite_frames(sprite: SpriteSet) -> [&'static [&'static str]; 2] {
    match sprite {
        SpriteSet::Alien => ALIEN_FRAMES,
        SpriteSet::Runner => RUNNER_FRAMES,
    }
}

pub fn draw_game(
    sim: &GameSim,
    skyline: &[Building],
    theme: Theme,
    canvas: &mut CellCanvas,
    game_box: GameBox,
) {
    let (building_color, window_color) = match theme {
        Theme::Dark => (
            Color::Rgb { r: 30, g: 30, b: 50 },
            Color::Rgb { r: 255, g: 220, b: 100 },
        ),
        Theme::Light => (
            Color::Rgb { r: 200, g: 200, b: 220 },
            Color::Rgb { r: 255, g: 200, b: 50 },
        ),
    };
    let bg = theme.backdrop();
    let fg = theme.text();
    let accent = theme.accent();

    draw_skyline(
        sim.skyline_offset,
        skyline,
        canvas,
        game_box,
        building_color,
        window_color,
    );

    // Ground.
    fill_world_rect(
        canvas,
        game_box,
        0.0,
        GROUND_LINE_Y,
        WORLD_W,
        6.0,
        '=',
        accent,
        bg,
    );

    // Obstacles as stacked crates.
    let crate_color = match theme {
        Theme::Dark => Color::Rgb { r: 180, g: 120, b: 60 },
        Theme::Light => Color::Rgb { r: 120, g: 80, b: 40 },
    };
    for obstacle in &sim.obstacles {
        let crates = (obstacle.height / CRATE_PX).ceil() as u32;
        for stack in 0..crates {
            fill_world_rect(
                canvas,
                game_box,
                obstacle.x,
                GROUND_LINE_Y - (stack + 1) as f32 * CRATE_PX,
                obstacle.width,
                CRATE_PX,
                '#',
                crate_color,
                bg,
            );
        }
    }

    // Player sprite, anchored above its ground point.
    let frames = sprite_frames(sim.preset.sprite);
    let frame = frames[sim.anim_frame % frames.len()];
    let sprite_h = frame.len() as i32;
    let px = game_box.project_x(PLAYER_X);
    let py = game_box.project_y(sim.player.y + 30.0) - sprite_h;
    for (row, line) in frame.iter().enumerate() {
        let y = py + row as i32;
        if y < game_box.y as i32 || y >= (game_box.y + game_box.height) as i32 {
            continue;
        }
        for (col, ch) in line.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let x = px + col as i32;
            if x < game_box.x as i32 || x >= (game_box.x + game_box.width) as i32 {
                continue;
            }
            canvas.set(x as usize, y as usize, Cell { ch, fg, bg });
        }
    }

    // HUD.
    let hud = format!(
        "Score: {} | High: {} | Level: {}",
        sim.score, sim.high_score, sim.level
    );
    canvas.put_str(game_box.x, game_box.y.saturating_sub(2), &hud, fg, bg);
    canvas.put_str(
        game_box.x,
        game_box.y.saturating_sub(1),
        "SPACE/UP jump . R restart . ESC close",
        fg,
        bg,
    );

    if sim.over_visible() {
        let center_y = game_box.y + game_box.height / 2;
        let banner = "GAME OVER";
        let hint = "Press R to restart";
        canvas.put_str(
            game_box.x + (game_box.width.saturating_sub(banner.len())) / 2,
            center_y.saturating_sub(1),
            banner,
            accent,
            bg,
        );
        canvas.put_str(
            game_box.x + (game_box.width.saturating_sub(hint.len())) / 2,
            center_y + 1,
            hint,
            fg,
            bg,
        );
    }
}

/// Wrapping parallax skyline. Building order is fixed by the seeded
/// layout; only the scroll offset moves.
fn draw_skyline(
    offset: f32,
    skyline: &[Building],
    canvas: &mut CellCanvas,
    game_box: GameBox,
    building_color: Color,
    window_color: Color,
) {
    if skyline.is_empty() {
        return;
    }
    let count = (WORLD_W / BUILDING_W).ceil() as i64 + 3;
    let scrolled = (-offset / BUILDING_W).floor() as i64;
    let len = skyline.len() as i64;

    for i in 0..count {
        let index = (((scrolled + i) % len + len) % len) as usize;
        let building = &skyline[index];
        let x = i as f32 * BUILDING_W + offset + scrolled as f32 * BUILDING_W;

        fill_world_rect(
            canvas,
            game_box,
            x,
            GROUND_LINE_Y - building.height,
            BUILDING_W - 5.0,
            building.height,
            ' ',
            building_color,
            building_color,
        );
        for (col, row) in &building.windows {
            fill_world_rect(
                canvas,
                game_box,
                x + 15.0 + *col as f32 * 20.0,
                GROUND_LINE_Y - building.height + 10.0 + *row as f32 * 15.0,
                12.0,
                10.0,
                ' ',
                window_color,
                window_color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{draw_game, GameBox};
    use crate::game::build_skyline;
    use crate::canvas::CellCanvas;
    use crate::game::{GameSim, Obstacle, CRATE_PX, FLOATY, OBSTACLE_W, WORLD_W};
    use crate::theme::Theme;

    #[test]
    fn box_fits_small_terminals() {
        let game_box = GameBox::centered(30, 12);
        assert!(game_box.x + game_box.width <= 30);
        assert!(game_box.y + game_box.height <= 12);
    }

    #[test]
    fn draw_is_total_within_bounds() {
        // Nothing panics and nothing lands outside the canvas even with
        // obstacles half off both edges.
        let mut sim = GameSim::new(&FLOATY, 0, 1);
        sim.obstacles.push(Obstacle {
            x: -20.0,
            width: OBSTACLE_W,
            height: 3.0 * CRATE_PX,
        });
        sim.obstacles.push(Obstacle {
            x: WORLD_W - 5.0,
            width: OBSTACLE_W,
            height: CRATE_PX,
        });
        sim.skyline_offset = -1234.5;
        let mut canvas = CellCanvas::new(80, 24, Theme::Dark.backdrop());
        draw_game(&sim, &build_skyline(), Theme::Dark, &mut canvas, GameBox::centered(80, 24));
    }

    #[test]
    fn hud_reports_score_high_and_level() {
        let mut sim = GameSim::new(&FLOATY, 120, 1);
        sim.score = 60;
        sim.level = 2;
        let mut canvas = CellCanvas::new(80, 24, Theme::Dark.backdrop());
        draw_game(&sim, &build_skyline(), Theme::Dark, &mut canvas, GameBox::centered(80, 24));
        let text = canvas.text_lines().join("\n");
        assert!(text.contains("Score: 60 | High: 120 | Level: 2"));
    }

    #[test]
    fn crates_appear_for_visible_obstacles() {
        let mut sim = GameSim::new(&FLOATY, 0, 1);
        sim.obstacles.push(Obstacle {
            x: WORLD_W / 2.0,
            width: OBSTACLE_W,
            height: 2.0 * CRATE_PX,
        });
        let mut canvas = CellCanvas::new(80, 24, Theme::Dark.backdrop());
        draw_game(&sim, &build_skyline(), Theme::Dark, &mut canvas, GameBox::centered(80, 24));
        let text = canvas.text_lines().join("\n");
        assert!(text.contains('#'));
    }

    #[test]
    fn game_over_banner_waits_for_the_delay() {
        let mut sim = GameSim::new(&FLOATY, 0, 1);
        sim.obstacles.push(Obstacle {
            x: crate::game::PLAYER_X,
            width: OBSTACLE_W,
            height: 3.0 * CRATE_PX,
        });
        sim.tick();
        assert!(sim.game_over);

        let mut canvas = CellCanvas::new(80, 24, Theme::Dark.backdrop());
        draw_game(&sim, &build_skyline(), Theme::Dark, &mut canvas, GameBox::centered(80, 24));
        assert!(!canvas.text_lines().join("\n").contains("GAME OVER"));

        for _ in 0..40 {
            sim.tick();
        }
        let mut canvas = CellCanvas::new(80, 24, Theme::Dark.backdrop());
        draw_game(&sim, &build_skyline(), Theme::Dark, &mut canvas, GameBox::centered(80, 24));
        assert!(canvas.text_lines().join("\n").contains("GAME OVER"));
    }
}
