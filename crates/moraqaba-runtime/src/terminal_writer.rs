#![forbid(unsafe_code)]

//! Terminal output.
//!
//! The writer keeps the last presented buffer and emits only the cells that
//! changed since, one cursor move per run of adjacent changes. Styles are
//! applied through crossterm commands, queued into a buffered writer and
//! flushed once per present.
//!
//! # Screen Modes
//!
//! - **AltScreen**: full-screen UI on the alternate buffer.
//! - **Inline**: the UI occupies the bottom `ui_height` rows of the normal
//!   screen and scrollback above it is preserved.

use std::io::{self, BufWriter, Write};

use crossterm::style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use crate::frame::{Buffer, Cell, Style};

/// Screen mode determines whether we use alternate screen or inline mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenMode {
    /// UI anchored at the bottom of the normal screen.
    Inline {
        /// Height of the UI region in rows.
        ui_height: u16,
    },
    #[default]
    AltScreen,
}

impl ScreenMode {
    /// Rows the UI occupies on a terminal `term_height` rows tall.
    pub fn ui_height(self, term_height: u16) -> u16 {
        match self {
            ScreenMode::Inline { ui_height } => ui_height.min(term_height),
            ScreenMode::AltScreen => term_height,
        }
    }

    /// First terminal row of the UI region.
    pub fn ui_origin(self, term_height: u16) -> u16 {
        term_height - self.ui_height(term_height)
    }
}

/// Counters for the last present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentStats {
    pub runs: usize,
    pub cells: usize,
}

pub struct TerminalWriter<W: Write> {
    out: BufWriter<W>,
    mode: ScreenMode,
    previous: Option<Buffer>,
    origin_y: u16,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(out: W, mode: ScreenMode) -> Self {
        Self {
            out: BufWriter::new(out),
            mode,
            previous: None,
            origin_y: 0,
        }
    }

    #[inline]
    pub fn mode(&self) -> ScreenMode {
        self.mode
    }

    /// Reserve the UI region for a terminal of the given size.
    ///
    /// Forces a full redraw on the next present.
    pub fn resize(&mut self, term_height: u16) -> io::Result<()> {
        self.previous = None;
        self.origin_y = self.mode.ui_origin(term_height);
        match self.mode {
            ScreenMode::AltScreen => {
                queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
            }
            ScreenMode::Inline { .. } => {
                let rows = self.mode.ui_height(term_height);
                // Scroll existing content up so the region below is free.
                for _ in 0..rows {
                    queue!(self.out, Print("\r\n"))?;
                }
                queue!(
                    self.out,
                    cursor::MoveTo(0, self.origin_y),
                    terminal::Clear(terminal::ClearType::FromCursorDown)
                )?;
            }
        }
        self.out.flush()
    }

    /// Emit the difference between `buffer` and the last presented buffer.
    pub fn present(
        &mut self,
        buffer: &Buffer,
        cursor_pos: Option<(u16, u16)>,
    ) -> io::Result<PresentStats> {
        let full = match &self.previous {
            Some(prev) => prev.width() != buffer.width() || prev.height() != buffer.height(),
            None => true,
        };
        let mut stats = PresentStats::default();
        let mut current: Option<Style> = None;

        queue!(self.out, cursor::Hide)?;
        for y in 0..buffer.height() {
            let mut x = 0;
            while x < buffer.width() {
                if !full && !self.changed(buffer, x, y) {
                    x += 1;
                    continue;
                }
                queue!(self.out, cursor::MoveTo(x, self.origin_y + y))?;
                stats.runs += 1;
                while x < buffer.width() && (full || self.changed(buffer, x, y)) {
                    let cell = buffer.get(x, y).copied().unwrap_or_default();
                    x += 1;
                    if cell.continuation {
                        continue;
                    }
                    if current != Some(cell.style) {
                        emit_style(&mut self.out, cell.style)?;
                        current = Some(cell.style);
                    }
                    queue!(self.out, Print(cell.ch))?;
                    stats.cells += 1;
                }
            }
        }
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        if let Some((cx, cy)) = cursor_pos {
            queue!(self.out, cursor::MoveTo(cx, self.origin_y + cy), cursor::Show)?;
        }
        self.out.flush()?;
        tracing::trace!(runs = stats.runs, cells = stats.cells, full, "frame presented");
        self.previous = Some(buffer.clone());
        Ok(stats)
    }

    fn changed(&self, buffer: &Buffer, x: u16, y: u16) -> bool {
        let prev: Option<&Cell> = self.previous.as_ref().and_then(|p| p.get(x, y));
        prev != buffer.get(x, y)
    }

    /// Move below the UI so the shell prompt does not overwrite it.
    pub fn finish(&mut self) -> io::Result<()> {
        if let ScreenMode::Inline { .. } = self.mode {
            let height = self.previous.as_ref().map_or(0, Buffer::height);
            queue!(
                self.out,
                SetAttribute(Attribute::Reset),
                cursor::MoveTo(0, self.origin_y.saturating_add(height)),
                Print("\r\n")
            )?;
        }
        self.out.flush()
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> io::Result<W> {
        self.out.into_inner().map_err(|e| e.into_error())
    }
}

fn emit_style(out: &mut impl Write, style: Style) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetForegroundColor(style.fg.into()),
        SetBackgroundColor(style.bg.into())
    )?;
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.italic {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if style.reverse {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn frame_with(text: &str) -> Frame {
        let mut f = Frame::new(10, 2);
        f.print(f.area(), text, Style::new());
        f
    }

    #[test]
    fn first_present_is_full() {
        let mut w = TerminalWriter::new(Vec::new(), ScreenMode::AltScreen);
        let stats = w.present(&frame_with("abc").buffer, None).unwrap();
        assert_eq!(stats.cells, 20);
        assert_eq!(stats.runs, 2);
    }

    #[test]
    fn unchanged_frame_emits_no_cells() {
        let mut w = TerminalWriter::new(Vec::new(), ScreenMode::AltScreen);
        w.present(&frame_with("abc").buffer, None).unwrap();
        let stats = w.present(&frame_with("abc").buffer, None).unwrap();
        assert_eq!(stats, PresentStats::default());
    }

    #[test]
    fn single_change_is_one_run() {
        let mut w = TerminalWriter::new(Vec::new(), ScreenMode::AltScreen);
        w.present(&frame_with("abc").buffer, None).unwrap();
        let stats = w.present(&frame_with("abx").buffer, None).unwrap();
        assert_eq!(stats, PresentStats { runs: 1, cells: 1 });
        let bytes = w.into_inner().unwrap();
        assert!(String::from_utf8_lossy(&bytes).ends_with("x\u{1b}[0m"));
    }

    #[test]
    fn inline_origin_is_bottom() {
        let mode = ScreenMode::Inline { ui_height: 10 };
        assert_eq!(mode.ui_origin(24), 14);
        assert_eq!(mode.ui_height(5), 5);
        assert_eq!(ScreenMode::AltScreen.ui_origin(24), 0);
    }
}
