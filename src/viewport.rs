//! Scroll-driven viewport state: zoom, parallax, active section.
//!
//! The backdrop zoom tracks scroll position linearly, 3.0 at the top of
//! the page down to 2.0 at the bottom, and springs back to 3.0 once the reader
//! reaches the end. The spring is modeled as an explicit state machine
//! (`ZoomReset`) ticked with elapsed wall-clock milliseconds so it stays
//! testable without a timer.

pub const ZOOM_MIN: f32 = 2.0;
pub const ZOOM_MAX: f32 = 3.0;

/// A section counts as active while its top sits within the upper band of
/// the viewport and its bottom has not scrolled past.
pub const SECTION_BAND: f32 = 0.4;

/// Pointer travel maps to +-this many source pixels of parallax.
pub const PARALLAX_RANGE_PX: f32 = 100.0;

pub const RESET_TRIGGER: f32 = 0.99;
pub const RESET_DEBOUNCE_MS: u64 = 500;
pub const RESET_STEP_MS: u64 = 16;
pub const RESET_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Home,
    About,
    Projects,
    Contact,
}

impl SectionId {
    /// Document order. Section resolution depends on it: the *last* match
    /// in this order wins.
    pub const ALL: [SectionId; 4] = [
        SectionId::Home,
        SectionId::About,
        SectionId::Projects,
        SectionId::Contact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Home => "home",
            SectionId::About => "about",
            SectionId::Projects => "projects",
            SectionId::Contact => "contact",
        }
    }

    pub fn from_keyword(value: &str) -> Option<Self> {
        match value {
            "home" => Some(SectionId::Home),
            "about" => Some(SectionId::About),
            "projects" => Some(SectionId::Projects),
            "contact" => Some(SectionId::Contact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ViewportState {
    /// Parallax offset in cells, derived from the pointer.
    pub mouse: (f32, f32),
    pub zoom: f32,
    pub active: SectionId,
}

impl ViewportState {
    pub fn new() -> Self {
        Self {
            mouse: (0.0, 0.0),
            zoom: ZOOM_MAX,
            active: SectionId::Home,
        }
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear zoom: 3 at the top, 2 at the bottom, clamped.
pub fn zoom_for_scroll(scroll_y: f32, max_scroll: f32) -> f32 {
    if max_scroll <= 0.0 {
        return ZOOM_MAX;
    }
    let progress = scroll_y / max_scroll;
    (ZOOM_MAX - 2.0 * progress).clamp(ZOOM_MIN, ZOOM_MAX)
}

/// Parallax offset in cells for one axis. `position` and `extent` are in
/// terminal cells; `cell_px` converts the pixel-tuned range into cells.
pub fn parallax_offset(position: f32, extent: f32, cell_px: u32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    -(position / extent - 0.9) * (PARALLAX_RANGE_PX / cell_px as f32)
}

/// A section's bounding box relative to the viewport top, in rows.
#[derive(Debug, Clone, Copy)]
pub struct SectionRect {
    pub id: SectionId,
    pub top: f32,
    pub bottom: f32,
}

/// Last section whose box satisfies the visibility band; defaults to Home.
pub fn resolve_active_section(rects: &[SectionRect], viewport_h: f32) -> SectionId {
    let mut current = SectionId::Home;
    for rect in rects {
        if rect.top <= viewport_h * SECTION_BAND && rect.bottom >= 0.0 {
            current = rect.id;
        }
    }
    current
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResetPhase {
    Idle,
    Debounce { remaining_ms: u64 },
    Easing { carry_ms: u64 },
}

/// Spring-back of the zoom once the page bottom is reached.
///
/// Arms on `progress >= RESET_TRIGGER`, waits out the debounce, then adds
/// `RESET_STEP` per `RESET_STEP_MS` until zoom returns to `ZOOM_MAX`.
/// While armed it will not re-trigger.
#[derive(Debug)]
pub struct ZoomReset {
    phase: ResetPhase,
}

impl ZoomReset {
    pub fn new() -> Self {
        Self {
            phase: ResetPhase::Idle,
        }
    }

    pub fn observe_scroll(&mut self, progress: f32) {
        if progress >= RESET_TRIGGER && self.phase == ResetPhase::Idle {
            self.phase = ResetPhase::Debounce {
                remaining_ms: RESET_DEBOUNCE_MS,
            };
        }
    }

    pub fn is_armed(&self) -> bool {
        self.phase != ResetPhase::Idle
    }

    /// Advance the spring by `elapsed_ms`, easing `zoom` toward `ZOOM_MAX`.
    pub fn tick(&mut self, elapsed_ms: u64, zoom: &mut f32) {
        match self.phase {
            ResetPhase::Idle => {}
            ResetPhase::Debounce { remaining_ms } => {
                if elapsed_ms >= remaining_ms {
                    self.phase = ResetPhase::Easing {
                        carry_ms: elapsed_ms - remaining_ms,
                    };
                    self.ease(0, zoom);
                } else {
                    self.phase = ResetPhase::Debounce {
                        remaining_ms: remaining_ms - elapsed_ms,
                    };
                }
            }
            ResetPhase::Easing { .. } => self.ease(elapsed_ms, zoom),
        }
    }

    fn ease(&mut self, elapsed_ms: u64, zoom: &mut f32) {
        let ResetPhase::Easing { mut carry_ms } = self.phase else {
            return;
        };
        carry_ms += elapsed_ms;
        while carry_ms >= RESET_STEP_MS {
            carry_ms -= RESET_STEP_MS;
            if *zoom < ZOOM_MAX {
                *zoom += RESET_STEP;
            }
            if *zoom >= ZOOM_MAX {
                *zoom = ZOOM_MAX;
                self.phase = ResetPhase::Idle;
                return;
            }
        }
        self.phase = ResetPhase::Easing { carry_ms };
    }
}

impl Default for ZoomReset {
    fn default() -> Self {
        Self::new()
    }
}
