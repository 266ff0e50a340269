//! Page sections: Home, About, Projects, Contact.
//!
//! Each section is a full-viewport block of static text stacked into one
//! scrollable document; the scroll controller reads the resulting rects
//! to pick the active section and the zoom level.

use crate::canvas::CellCanvas;
use crate::theme::Theme;
use crate::viewport::{SectionId, SectionRect};

/// Left margin for section text, in cells.
const TEXT_MARGIN_X: usize = 6;
/// Rows of headroom above a section's first line.
const TEXT_MARGIN_Y: f32 = 4.0;

pub struct SectionBlock {
    pub id: SectionId,
    pub lines: &'static [&'static str],
}

pub const SECTIONS: [SectionBlock; 4] = [
    SectionBlock {
        id: SectionId::Home,
        lines: &[
            "AVERY QUINN",
            "",
            "systems & interface engineer",
            "",
            "This page is a terminal. The shell in the corner is live:",
            "try `help`, `cd about`, or `game`.",
        ],
    },
    SectionBlock {
        id: SectionId::About,
        lines: &[
            "ABOUT",
            "",
            "I build renderers, command-line tools, and the occasional",
            "toy game. I care about software that stays legible under",
            "load, both the kind a profiler measures and the kind a",
            "maintainer feels.",
            "",
            "Most at home where pixels meet plumbing.",
        ],
    },
    SectionBlock {
        id: SectionId::Projects,
        lines: &[
            "PROJECTS",
            "",
            "backdrop   a character-cell video compositor (this page)",
            "crater     the jump game hiding behind `game`",
            "fieldnote  a plain-text lab notebook with a query language",
            "",
            "`cat project1.md` in the shell for details.",
        ],
    },
    SectionBlock {
        id: SectionId::Contact,
        lines: &[
            "CONTACT",
            "",
            "mail      avery@averyquinn.dev",
            "code      github.com/averyquinn",
            "",
            "`cat info.txt` for the long form.",
        ],
    },
];

#[derive(Debug, Clone, Copy)]
pub struct SectionLayout {
    pub id: SectionId,
    pub top: f32,
    pub height: f32,
}

/// Stack the sections; every block takes at least one full viewport so the
/// page scrolls roughly four screens.
pub fn layout(viewport_h: f32) -> Vec<SectionLayout> {
    let mut top = 0.0;
    SECTIONS
        .iter()
        .map(|section| {
            let content = section.lines.len() as f32 + 2.0 * TEXT_MARGIN_Y;
            let height = content.max(viewport_h);
            let placed = SectionLayout {
                id: section.id,
                top,
                height,
            };
            top += height;
            placed
        })
        .collect()
}

pub fn document_height(viewport_h: f32) -> f32 {
    layout(viewport_h).iter().map(|s| s.height).sum()
}

pub fn max_scroll(viewport_h: f32) -> f32 {
    (document_height(viewport_h) - viewport_h).max(0.0)
}

/// Section boxes relative to the viewport top at the given scroll offset.
pub fn rects_at(scroll_y: f32, viewport_h: f32) -> Vec<SectionRect> {
    layout(viewport_h)
        .iter()
        .map(|s| SectionRect {
            id: s.id,
            top: s.top - scroll_y,
            bottom: s.top + s.height - scroll_y,
        })
        .collect()
}

/// Scroll offset that brings a section's top to the viewport top.
pub fn scroll_target(id: SectionId, viewport_h: f32) -> f32 {
    layout(viewport_h)
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.top.min(max_scroll(viewport_h)))
        .unwrap_or(0.0)
}

/// Draw all lines visible at the current scroll offset.
pub fn draw(canvas: &mut CellCanvas, scroll_y: f32, theme: Theme) {
    let viewport_h = canvas.height() as f32;
    let fg = theme.text();
    let bg = theme.backdrop();

    for section in layout(viewport_h) {
        let block = SECTIONS
            .iter()
            .find(|s| s.id == section.id)
            .map(|s| s.lines)
            .unwrap_or(&[]);
        for (offset, line) in block.iter().enumerate() {
            let row = section.top + TEXT_MARGIN_Y + offset as f32 - scroll_y;
            if row < 0.0 || row >= viewport_h {
                continue;
            }
            canvas.put_str(TEXT_MARGIN_X, row as usize, line, fg, bg);
        }
    }
}
