//! Cell canvas and diff-based terminal presenter.
//!
//! Every frame is composed into a `CellCanvas` (plain data, no terminal
//! handles), then handed to `TermPainter::present` which diffs it against
//! the previously shown frame and only emits commands for cells that
//! changed. Commands are batched with `queue!` and flushed once.

use std::io::{self, BufWriter, Stdout, Write};

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub const fn blank(bg: Color) -> Self {
        Cell {
            ch: ' ',
            fg: Color::Reset,
            bg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CellCanvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellCanvas {
    pub fn new(width: usize, height: usize, bg: Color) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank(bg); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fill(&mut self, bg: Color) {
        self.cells.fill(Cell::blank(bg));
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Paint only the background of a cell, keeping any glyph out of it.
    pub fn set_bg(&mut self, x: usize, y: usize, bg: Color) {
        self.set(x, y, Cell::blank(bg));
    }

    pub fn put_str(&mut self, x: usize, y: usize, text: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in text.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }

    /// One line per row, glyphs only. Headless render output and tests.
    pub fn text_lines(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.cells[y * self.width + x].ch)
                    .collect()
            })
            .collect()
    }
}

pub struct TermPainter {
    writer: BufWriter<Stdout>,
    back: Option<CellCanvas>,
}

impl TermPainter {
    pub fn new() -> Self {
        Self {
            writer: BufWriter::with_capacity(256 * 1024, io::stdout()),
            back: None,
        }
    }

    pub fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            Clear(ClearType::All),
        )?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> Result<()> {
        execute!(
            self.writer,
            ResetColor,
            Show,
            DisableMouseCapture,
            LeaveAlternateScreen,
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(self.writer, SetTitle(title))?;
        Ok(())
    }

    /// Drop the back buffer so the next present repaints everything.
    pub fn invalidate(&mut self) {
        self.back = None;
    }

    pub fn present(&mut self, frame: &CellCanvas) -> Result<()> {
        let full_repaint = match &self.back {
            Some(back) => back.width != frame.width || back.height != frame.height,
            None => true,
        };
        if full_repaint {
            queue!(self.writer, Clear(ClearType::All))?;
        }

        let mut last_fg: Option<Color> = None;
        let mut last_bg: Option<Color> = None;
        let mut cursor: Option<(usize, usize)> = None;

        for y in 0..frame.height {
            for x in 0..frame.width {
                let cell = frame.cells[y * frame.width + x];
                if !full_repaint {
                    if let Some(back) = &self.back {
                        if back.cells[y * frame.width + x] == cell {
                            continue;
                        }
                    }
                }

                if cursor != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor = Some((x + 1, y));
            }
        }

        self.writer.flush()?;
        self.back = Some(frame.clone());
        Ok(())
    }
}

impl Default for TermPainter {
    fn default() -> Self {
        Self::new()
    }
}
