#![forbid(unsafe_code)]

//! Cell buffer and frame.
//!
//! Models render into a [`Frame`] of styled cells. The runtime diffs the
//! frame against the previous one and writes only changed cells; tests read
//! the buffer back as plain text.

use unicode_width::UnicodeWidthChar;

/// A rectangle in terminal coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by `margin` cells on every side.
    pub const fn inset(&self, margin: u16) -> Rect {
        let double = margin.saturating_mul(2);
        Rect {
            x: self.x.saturating_add(margin),
            y: self.y.saturating_add(margin),
            width: self.width.saturating_sub(double),
            height: self.height.saturating_sub(double),
        }
    }

    /// Split into a left part `left_width` wide and the remainder.
    pub fn split_left(&self, left_width: u16) -> (Rect, Rect) {
        let w = left_width.min(self.width);
        (
            Rect::new(self.x, self.y, w, self.height),
            Rect::new(self.x + w, self.y, self.width - w, self.height),
        )
    }

    /// Split into a top part `top_height` tall and the remainder.
    pub fn split_top(&self, top_height: u16) -> (Rect, Rect) {
        let h = top_height.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, h),
            Rect::new(self.x, self.y + h, self.width, self.height - h),
        )
    }

    /// Single row `dy` rows below the top, clipped to this rect.
    pub fn row(&self, dy: u16) -> Rect {
        if dy >= self.height {
            return Rect::new(self.x, self.bottom(), self.width, 0);
        }
        Rect::new(self.x, self.y + dy, self.width, 1)
    }
}

/// Terminal colors used by the dashboard palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Reset,
    Black,
    White,
    Grey,
    DarkGrey,
    Red,
    Green,
    Blue,
    Cyan,
    Yellow,
    Rgb(u8, u8, u8),
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        use crossterm::style::Color as C;
        match color {
            Color::Reset => C::Reset,
            Color::Black => C::Black,
            Color::White => C::White,
            Color::Grey => C::Grey,
            Color::DarkGrey => C::DarkGrey,
            Color::Red => C::Red,
            Color::Green => C::Green,
            Color::Blue => C::Blue,
            Color::Cyan => C::Cyan,
            Color::Yellow => C::Yellow,
            Color::Rgb(r, g, b) => C::Rgb { r, g, b },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub reverse: bool,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
            bold: false,
            italic: false,
            reverse: false,
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
    /// Trailing half of a double-width character.
    pub continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::new(),
            continuation: false,
        }
    }
}

/// Row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn fill(&mut self, rect: Rect, style: Style) {
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                self.set(
                    x,
                    y,
                    Cell {
                        ch: ' ',
                        style,
                        continuation: false,
                    },
                );
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Text of row `y`, trailing spaces trimmed.
    pub fn row_text(&self, y: u16) -> String {
        let mut out = String::with_capacity(self.width as usize);
        for x in 0..self.width {
            if let Some(cell) = self.get(x, y)
                && !cell.continuation
            {
                out.push(cell.ch);
            }
        }
        out.truncate(out.trim_end().len());
        out
    }

    /// Whole buffer as text, one line per row.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether `needle` appears on any row.
    pub fn contains_text(&self, needle: &str) -> bool {
        (0..self.height).any(|y| self.row_text(y).contains(needle))
    }
}

/// Render target handed to `Model::view`.
#[derive(Debug)]
pub struct Frame {
    pub buffer: Buffer,
    cursor: Option<(u16, u16)>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            cursor: None,
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.buffer.height()
    }

    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.buffer.width(), self.buffer.height())
    }

    /// Place the terminal cursor (shown only while set).
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor = position;
    }

    #[inline]
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Print `text` starting at `(x, y)`, clipped to `max_x` (exclusive).
    ///
    /// Returns the column after the last cell written.
    pub fn print_clipped(&mut self, x: u16, y: u16, max_x: u16, text: &str, style: Style) -> u16 {
        let max_x = max_x.min(self.width());
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > max_x {
                break;
            }
            self.buffer.set(
                col,
                y,
                Cell {
                    ch,
                    style,
                    continuation: false,
                },
            );
            if w == 2 {
                self.buffer.set(
                    col + 1,
                    y,
                    Cell {
                        ch: ' ',
                        style,
                        continuation: true,
                    },
                );
            }
            col += w;
        }
        col
    }

    /// Print `text` on the first row of `area`, clipped to its width.
    pub fn print(&mut self, area: Rect, text: &str, style: Style) -> u16 {
        if area.is_empty() {
            return area.x;
        }
        self.print_clipped(area.x, area.y, area.right(), text, style)
    }

    /// Word-wrap `text` into `area`. Returns the number of rows used.
    pub fn print_wrapped(&mut self, area: Rect, text: &str, style: Style) -> u16 {
        let width = area.width as usize;
        if width == 0 {
            return 0;
        }
        let mut row = 0u16;
        for line in wrap(text, width) {
            if row >= area.height {
                break;
            }
            self.print(area.row(row), &line, style);
            row += 1;
        }
        row
    }

    /// Draw a single-line box border around `area`.
    pub fn draw_box(&mut self, area: Rect, style: Style) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let right = area.right() - 1;
        let bottom = area.bottom() - 1;
        for x in area.x..=right {
            let (top, bot) = if x == area.x {
                ('┌', '└')
            } else if x == right {
                ('┐', '┘')
            } else {
                ('─', '─')
            };
            self.put(x, area.y, top, style);
            self.put(x, bottom, bot, style);
        }
        for y in area.y + 1..bottom {
            self.put(area.x, y, '│', style);
            self.put(right, y, '│', style);
        }
    }

    fn put(&mut self, x: u16, y: u16, ch: char, style: Style) {
        self.buffer.set(
            x,
            y,
            Cell {
                ch,
                style,
                continuation: false,
            },
        );
    }
}

/// Greedy word wrap by display width.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0usize;
        for word in paragraph.split_whitespace() {
            let w: usize = word.chars().map(|c| c.width().unwrap_or(0)).sum();
            if line_width > 0 && line_width + 1 + w > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            line.push_str(word);
            line_width += w;
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_clips_to_area() {
        let mut frame = Frame::new(10, 2);
        let end = frame.print(Rect::new(2, 0, 4, 1), "Bonjour", Style::new());
        assert_eq!(end, 6);
        assert_eq!(frame.buffer.row_text(0), "  Bonj");
    }

    #[test]
    fn accented_text_is_single_width() {
        let mut frame = Frame::new(20, 1);
        frame.print(frame.area(), "Fès-Meknès", Style::new());
        assert_eq!(frame.buffer.row_text(0), "Fès-Meknès");
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut frame = Frame::new(4, 1);
        let end = frame.print(frame.area(), "日本語", Style::new());
        assert_eq!(end, 4);
        assert_eq!(frame.buffer.row_text(0), "日本");
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(
            wrap("La région Nord présente un risque", 12),
            vec!["La région", "Nord", "présente un", "risque"]
        );
    }

    #[test]
    fn print_wrapped_stops_at_height() {
        let mut frame = Frame::new(6, 2);
        let rows = frame.print_wrapped(frame.area(), "aa bb cc dd ee", Style::new());
        assert_eq!(rows, 2);
        assert_eq!(frame.buffer.to_text(), "aa bb\ncc dd");
    }

    #[test]
    fn box_corners() {
        let mut frame = Frame::new(4, 3);
        frame.draw_box(frame.area(), Style::new());
        assert_eq!(frame.buffer.to_text(), "┌──┐\n│  │\n└──┘");
    }

    #[test]
    fn rect_splits() {
        let r = Rect::new(0, 0, 80, 24);
        let (side, main) = r.split_left(28);
        assert_eq!(side, Rect::new(0, 0, 28, 24));
        assert_eq!(main, Rect::new(28, 0, 52, 24));
        let (head, body) = main.split_top(3);
        assert_eq!(head.height, 3);
        assert_eq!(body.y, 3);
        assert!(r.row(30).is_empty());
        assert_eq!(r.inset(1), Rect::new(1, 1, 78, 22));
    }
}
