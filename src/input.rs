//! Per-frame input drain.
//!
//! All pending terminal events are read once per frame, before the tick.
//! Keys are tracked two ways: edge-triggered presses for one-shot actions
//! (jump, submit) and a held set with timeout expiry for terminals that
//! never report Release. Mouse position and wheel travel feed the
//! parallax and page scroll.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind, poll,
};

/// After this long without a Press/Repeat, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    last_active: HashMap<KeyCode, Instant>,
    fresh_presses: Vec<KeyCode>,
    /// Raw key events from this frame, in arrival order. The shell reads
    /// these directly so typed characters keep their ordering.
    pub raw_events: Vec<KeyEvent>,
    /// Last known pointer cell, if the terminal reported any motion yet.
    pub mouse: Option<(u16, u16)>,
    /// Net wheel travel this frame; positive scrolls the page down.
    pub wheel: i32,
    /// A mouse button went down this frame (the touch analog).
    pub clicked: bool,
    /// Most recent resize observed this frame.
    pub resized: Option<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            mouse: None,
            wheel: 0,
            clicked: false,
            resized: None,
        }
    }

    /// Drain all pending events without blocking. Call once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.wheel = 0;
        self.clicked = false;
        self.resized = None;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    self.raw_events.push(key);
                    match key.kind {
                        KeyEventKind::Release => {
                            self.last_active.remove(&key.code);
                        }
                        _ => {
                            let was_held = self.is_held(key.code);
                            self.last_active.insert(key.code, Instant::now());
                            if !was_held {
                                self.fresh_presses.push(key.code);
                            }
                        }
                    }
                }
                Ok(Event::Mouse(mouse)) => match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        self.mouse = Some((mouse.column, mouse.row));
                    }
                    MouseEventKind::Down(_) => self.clicked = true,
                    MouseEventKind::ScrollDown => self.wheel += 1,
                    MouseEventKind::ScrollUp => self.wheel -= 1,
                    _ => {}
                },
                Ok(Event::Resize(w, h)) => {
                    self.resized = Some((w, h));
                }
                _ => {}
            }
        }

        let now = Instant::now();
        self.last_active
            .retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Edge trigger: the key went down during this frame's drain.
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }

    /// Printable characters typed this frame, in order, excluding anything
    /// pressed with Control held.
    pub fn typed_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.raw_events.iter().filter_map(|k| {
            if k.kind == KeyEventKind::Release {
                return None;
            }
            if k.modifiers.contains(KeyModifiers::CONTROL) {
                return None;
            }
            match k.code {
                KeyCode::Char(c) => Some(c),
                _ => None,
            }
        })
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
