//! The interactive session.
//!
//! One cooperative loop owns every piece of mutable UI state (viewport,
//! scroll, shell, game) and threads it through the subsystems each tick.
//! Event handlers mutate state; the composer only reads it. The game and
//! the backdrop clip never simulate in the same tick: while the game
//! overlay is up the clip's playhead is simply not advanced.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;

use crate::canvas::{CellCanvas, TermPainter};
use crate::compositor::{compose_backdrop, compose_cover, grid_for};
use crate::config::KioskConfig;
use crate::game::{build_skyline, Building, GamePreset, GameSim, Lcg};
use crate::game_render::{draw_game, GameBox};
use crate::input::InputState;
use crate::sections;
use crate::shell::{Shell, ShellEffect};
use crate::source::{FrameSource, PixelFrame, SourceSpec};
use crate::store;
use crate::theme::Theme;
use crate::viewport::{
    parallax_offset, resolve_active_section, zoom_for_scroll, ViewportState, ZoomReset,
};

const TICK: Duration = Duration::from_millis(16);
const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Rows per wheel notch.
const SCROLL_STEP: f32 = 2.0;

const SHELL_WIDTH: usize = 62;
const SHELL_HEIGHT: usize = 14;

const BOOT_WORD: &str = "DECRYPTING";
const BOOT_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";
const BOOT_SCRAMBLE_FRAMES: u32 = 20;
const BOOT_REVEAL_FRAMES: u32 = 20;
const BOOT_FRAME_MS: u64 = 30;

pub fn run(config: KioskConfig) -> Result<()> {
    let mut painter = TermPainter::new();
    painter.init()?;

    let result = App::new(config).and_then(|mut app| app.main_loop(&mut painter));

    let cleanup = painter.cleanup();
    result?;
    cleanup
}

struct App {
    theme: Theme,
    source: FrameSource,
    cover: PixelFrame,
    viewport: ViewportState,
    zoom_reset: ZoomReset,
    scroll_y: f32,
    shell: Shell,
    game: Option<GameSim>,
    skyline: Vec<Building>,
    preset: &'static GamePreset,
    game_seed: Option<u32>,
    term_w: u16,
    term_h: u16,
    title: String,
    source_warned: bool,
}

impl App {
    fn new(config: KioskConfig) -> Result<Self> {
        let theme = config.theme.resolve();
        let (term_w, term_h) =
            crossterm::terminal::size().context("failed to query terminal size")?;

        let mut source = FrameSource::open(&config.source)?;
        tracing::info!(
            source = %config.source.describe(),
            theme = theme.as_str(),
            preset = config.preset.name,
            "session starting"
        );

        // Cover still for the game overlay: the configured image, or
        // frame 0 of the active source. Dark theme shows it inverted;
        // invert once here, not per frame.
        let mut cover = match &config.cover {
            Some(path) => {
                FrameSource::open(&SourceSpec::Image(path.clone()))?
                    .cover_frame(u32::from(term_w), u32::from(term_h))?
            }
            None => source.cover_frame(u32::from(term_w), u32::from(term_h))?,
        };
        if theme == Theme::Dark {
            cover = cover.inverted();
        }

        Ok(Self {
            theme,
            source,
            cover,
            viewport: ViewportState::new(),
            zoom_reset: ZoomReset::new(),
            scroll_y: 0.0,
            shell: Shell::new(),
            game: None,
            skyline: build_skyline(),
            preset: config.preset,
            game_seed: config.game_seed,
            term_w,
            term_h,
            title: String::new(),
            source_warned: false,
        })
    }

    fn main_loop(&mut self, painter: &mut TermPainter) -> Result<()> {
        self.boot_sequence(painter)?;
        self.update_title(painter)?;

        let mut input = InputState::new();
        let mut last_tick = Instant::now();

        loop {
            input.drain_events();
            if input.ctrl_c_pressed() {
                break;
            }
            if let Some((w, h)) = input.resized {
                self.term_w = w;
                self.term_h = h;
                self.scroll_y = self.scroll_y.min(sections::max_scroll(f32::from(h)));
                painter.invalidate();
            }

            if self.game.is_some() {
                self.handle_game_input(&input);
            } else {
                self.handle_page_input(&input, painter)?;
            }

            let elapsed = last_tick.elapsed();
            if elapsed >= TICK {
                last_tick = Instant::now();
                self.tick(elapsed.as_millis() as u64, painter)?;
                let frame = self.compose()?;
                painter.present(&frame)?;
            }

            std::thread::sleep(FRAME_SLEEP);
        }

        self.persist_high_score();
        Ok(())
    }

    fn tick(&mut self, elapsed_ms: u64, painter: &mut TermPainter) -> Result<()> {
        if let Some(game) = &mut self.game {
            game.tick();
            if let Some(score) = game.take_high_score_update() {
                if let Err(error) = store::store_high_score(score) {
                    tracing::warn!("failed to persist high score: {error}");
                }
            }
        } else {
            self.zoom_reset.tick(elapsed_ms, &mut self.viewport.zoom);
        }
        self.shell.poll_pending();
        self.update_title(painter)
    }

    fn handle_game_input(&mut self, input: &InputState) {
        let Some(game) = &mut self.game else {
            return;
        };
        if input.any_pressed(&[KeyCode::Char(' '), KeyCode::Up]) {
            game.jump();
        }
        // A click stands in for the touch controls: restart once the
        // banner is up, jump otherwise.
        if input.clicked {
            if game.over_visible() {
                game.reset();
            } else {
                game.jump();
            }
        }
        if input.any_pressed(&[KeyCode::Char('r'), KeyCode::Char('R')]) {
            game.reset();
        }
        if input.was_pressed(KeyCode::Esc) {
            self.close_game();
        }
    }

    fn handle_page_input(&mut self, input: &InputState, painter: &mut TermPainter) -> Result<()> {
        // Pointer parallax. This handler never runs while the game overlay
        // is active, which is what freezes the offset during play.
        if let Some((col, row)) = input.mouse {
            let cell = self.theme.cell_px();
            self.viewport.mouse = (
                parallax_offset(f32::from(col), f32::from(self.term_w), cell),
                parallax_offset(f32::from(row), f32::from(self.term_h), cell),
            );
        }

        // Page scroll.
        let viewport_h = f32::from(self.term_h);
        let mut scrolled = input.wheel != 0;
        let mut target = self.scroll_y + input.wheel as f32 * SCROLL_STEP;
        if input.was_pressed(KeyCode::PageDown) {
            target += viewport_h * 0.9;
            scrolled = true;
        }
        if input.was_pressed(KeyCode::PageUp) {
            target -= viewport_h * 0.9;
            scrolled = true;
        }
        if input.was_pressed(KeyCode::Home) {
            target = 0.0;
            scrolled = true;
        }
        if input.was_pressed(KeyCode::End) {
            target = sections::max_scroll(viewport_h);
            scrolled = true;
        }
        if scrolled {
            self.set_scroll(target);
        }

        // Shell editing. Typed characters win over key chords, matching a
        // real terminal's feel.
        for ch in input.typed_chars() {
            self.shell.type_char(ch);
        }
        if input.was_pressed(KeyCode::Backspace) {
            self.shell.backspace();
        }
        if input.was_pressed(KeyCode::Tab) {
            self.shell.complete();
        }
        if input.was_pressed(KeyCode::Up) {
            self.shell.history_prev();
        }
        if input.was_pressed(KeyCode::Down) {
            self.shell.history_next();
        }
        if input.was_pressed(KeyCode::Enter) {
            let effect = self.shell.submit();
            self.apply_shell_effect(effect, painter)?;
        }
        Ok(())
    }

    fn apply_shell_effect(
        &mut self,
        effect: ShellEffect,
        painter: &mut TermPainter,
    ) -> Result<()> {
        match effect {
            ShellEffect::None => Ok(()),
            ShellEffect::LaunchGame => {
                self.open_game();
                painter.invalidate();
                Ok(())
            }
            ShellEffect::ScrollTo(section) => {
                self.set_scroll(sections::scroll_target(section, f32::from(self.term_h)));
                Ok(())
            }
        }
    }

    fn set_scroll(&mut self, target: f32) {
        let viewport_h = f32::from(self.term_h);
        let max_scroll = sections::max_scroll(viewport_h);
        self.scroll_y = target.clamp(0.0, max_scroll);

        self.viewport.zoom = zoom_for_scroll(self.scroll_y, max_scroll);
        if max_scroll > 0.0 {
            self.zoom_reset.observe_scroll(self.scroll_y / max_scroll);
        }

        let rects = sections::rects_at(self.scroll_y, viewport_h);
        self.viewport.active = resolve_active_section(&rects, viewport_h);
        self.shell.follow_scroll(self.scroll_y, self.viewport.active);
    }

    /// Window-title analog of the page's location hash; written only on
    /// change.
    fn update_title(&mut self, painter: &mut TermPainter) -> Result<()> {
        let title = format!("kiosk #{}", self.viewport.active.as_str());
        if title != self.title {
            painter.set_title(&title)?;
            self.title = title;
        }
        Ok(())
    }

    fn open_game(&mut self) {
        let seed = self.game_seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs() as u32)
                .unwrap_or(1)
        });
        let high_score = store::load_high_score();
        tracing::info!(seed, high_score, "game opened");
        self.game = Some(GameSim::new(self.preset, high_score, seed));
    }

    fn close_game(&mut self) {
        self.persist_high_score();
        self.game = None;
        tracing::info!("game closed");
    }

    fn persist_high_score(&mut self) {
        if let Some(game) = &mut self.game {
            if let Some(score) = game.take_high_score_update() {
                if let Err(error) = store::store_high_score(score) {
                    tracing::warn!("failed to persist high score: {error}");
                }
            }
        }
    }

    fn compose(&mut self) -> Result<CellCanvas> {
        let (w, h) = (self.term_w as usize, self.term_h as usize);
        let mut canvas = CellCanvas::new(w, h, self.theme.backdrop());

        if let Some(game) = &self.game {
            compose_cover(&self.cover, self.theme, &mut canvas);
            draw_game(
                game,
                &self.skyline,
                self.theme,
                &mut canvas,
                GameBox::centered(w, h),
            );
        } else {
            let grid = grid_for(u32::from(self.term_w), u32::from(self.term_h), self.theme);
            match self.source.next_frame(grid.cols, grid.rows) {
                Ok(Some(frame)) => {
                    compose_backdrop(frame, grid, &self.viewport, self.theme, &mut canvas);
                }
                Ok(None) => {} // source not ready; backdrop stays blank
                Err(error) => {
                    if !self.source_warned {
                        tracing::warn!("frame source failed, backdrop disabled: {error}");
                        self.source_warned = true;
                    }
                }
            }
            sections::draw(&mut canvas, self.scroll_y, self.theme);
        }

        self.draw_shell(&mut canvas);
        Ok(canvas)
    }

    /// The shell widget, pinned bottom-left. Read-only while the game is
    /// active (no cursor drawn).
    fn draw_shell(&self, canvas: &mut CellCanvas) {
        let width = SHELL_WIDTH.min(canvas.width().saturating_sub(2));
        let height = SHELL_HEIGHT.min(canvas.height().saturating_sub(2));
        if width < 12 || height < 4 {
            return;
        }
        let x0 = 1;
        let y0 = canvas.height() - height - 1;

        let accent = self.theme.accent();
        let text = self.theme.text();
        let panel = match self.theme {
            Theme::Dark => crossterm::style::Color::Rgb { r: 4, g: 12, b: 4 },
            Theme::Light => crossterm::style::Color::Rgb { r: 244, g: 244, b: 248 },
        };

        for y in y0..y0 + height {
            for x in x0..x0 + width {
                canvas.set_bg(x, y, panel);
            }
        }
        // Border.
        for x in x0..x0 + width {
            canvas.put_str(x, y0, "-", accent, panel);
            canvas.put_str(x, y0 + height - 1, "-", accent, panel);
        }
        for y in y0..y0 + height {
            canvas.put_str(x0, y, "|", accent, panel);
            canvas.put_str(x0 + width - 1, y, "|", accent, panel);
        }
        canvas.put_str(x0 + 2, y0, " shell ", accent, panel);

        // Transcript tail.
        let inner_w = width - 4;
        let inner_h = height - 3;
        let mut lines: Vec<(String, bool)> = Vec::new();
        for entry in &self.shell.entries {
            if !entry.input.is_empty() {
                lines.push((entry.input.clone(), true));
            }
            for line in entry.output.lines() {
                lines.push((line.to_owned(), false));
            }
        }
        let tail = lines.len().saturating_sub(inner_h);
        for (row, (line, is_prompt)) in lines[tail..].iter().enumerate() {
            let fg = if *is_prompt { accent } else { text };
            let clipped: String = line.chars().take(inner_w).collect();
            canvas.put_str(x0 + 2, y0 + 1 + row, &clipped, fg, panel);
        }

        // Prompt line.
        let cursor = if self.game.is_some() { "" } else { "_" };
        let prompt = format!("{}$ {}{}", self.shell.cwd, self.shell.input, cursor);
        let clipped: String = prompt.chars().take(inner_w).collect();
        canvas.put_str(x0 + 2, y0 + height - 2, &clipped, accent, panel);
    }

    /// Scramble-then-reveal boot card, a nod to slow asset loads this
    /// build no longer has.
    fn boot_sequence(&mut self, painter: &mut TermPainter) -> Result<()> {
        let mut rng = Lcg::new(777);
        let total = BOOT_SCRAMBLE_FRAMES + BOOT_REVEAL_FRAMES;
        let word_len = BOOT_WORD.len();

        for frame in 0..total {
            let revealed = if frame < BOOT_SCRAMBLE_FRAMES {
                0
            } else {
                ((frame - BOOT_SCRAMBLE_FRAMES) as usize * word_len)
                    / BOOT_REVEAL_FRAMES.max(1) as usize
            };
            let mut text = String::with_capacity(word_len);
            for (index, ch) in BOOT_WORD.chars().enumerate() {
                if index < revealed {
                    text.push(ch);
                } else {
                    let pick = (rng.next_f32() * BOOT_CHARSET.len() as f32) as usize;
                    text.push(BOOT_CHARSET[pick.min(BOOT_CHARSET.len() - 1)] as char);
                }
            }

            let (w, h) = (self.term_w as usize, self.term_h as usize);
            let mut canvas = CellCanvas::new(w, h, self.theme.backdrop());
            let x = w.saturating_sub(text.len()) / 2;
            canvas.put_str(x, h / 2, &text, self.theme.accent(), self.theme.backdrop());
            painter.present(&canvas)?;
            std::thread::sleep(Duration::from_millis(BOOT_FRAME_MS));
        }
        Ok(())
    }
}
