#![forbid(unsafe_code)]

//! Screens and content panes.
//!
//! Stateful panes implement [`Screen`]; stateless panes are plain `view`
//! functions. The app model decides which one is mounted from the session.

pub mod checkin;
pub mod dashboard;
pub mod history;
pub mod landing;
pub mod login;
pub mod map;
pub mod placeholder;
pub mod predictions;
pub mod reviews;

use moraqaba_runtime::{Cmd, Frame, KeyEvent, Rect, Style};
use unicode_width::UnicodeWidthStr;

use crate::app::AppMsg;
use crate::theme;

/// A key/action pair shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpEntry {
    pub key: &'static str,
    pub action: &'static str,
}

impl HelpEntry {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

/// A pane that owns state and reacts to keys.
pub trait Screen {
    /// Handle a key press, returning a command.
    fn update(&mut self, key: &KeyEvent) -> Cmd<AppMsg>;

    /// Render into `area`.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Keybindings specific to this screen for the status bar.
    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![]
    }

    /// Title used in logs.
    fn title(&self) -> &'static str;
}

/// Display width of `text` in cells.
pub(crate) fn text_width(text: &str) -> u16 {
    u16::try_from(UnicodeWidthStr::width(text)).unwrap_or(u16::MAX)
}

/// Print `text` horizontally centered on the first row of `area`.
pub(crate) fn print_centered(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let w = text_width(text).min(area.width);
    let x = area.x + (area.width - w) / 2;
    frame.print(Rect::new(x, area.y, area.width - (x - area.x), 1), text, style);
}

/// Word-wrap `text` centered line by line. Returns rows used.
pub(crate) fn print_wrapped_centered(
    frame: &mut Frame,
    area: Rect,
    text: &str,
    style: Style,
) -> u16 {
    let lines = moraqaba_runtime::frame::wrap(text, area.width as usize);
    let mut row = 0;
    for line in lines {
        if row >= area.height {
            break;
        }
        print_centered(frame, area.row(row), &line, style);
        row += 1;
    }
    row
}

/// Bordered card with a bold title on the top border. Returns the inner area.
pub(crate) fn card(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.draw_box(area, theme::border());
    if !title.is_empty() && area.width > 4 {
        frame.print(
            Rect::new(area.x + 2, area.y, area.width - 4, 1),
            &format!(" {title} "),
            theme::heading(),
        );
    }
    area.inset(1)
}

/// Horizontal bar `value`% of `width` cells.
pub(crate) fn bar(width: u16, value: u8) -> String {
    let filled = (u32::from(width) * u32::from(value.min(100)) / 100) as usize;
    let mut s = "█".repeat(filled);
    s.push_str(&"░".repeat(width as usize - filled));
    s
}

/// Split `area` into `n` columns separated by `gap` cells.
pub(crate) fn columns(area: Rect, n: u16, gap: u16) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let gaps = gap.saturating_mul(n - 1);
    let w = area.width.saturating_sub(gaps) / n;
    (0..n)
        .map(|i| Rect::new(area.x + i * (w + gap), area.y, w, area.height))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(10, 50), "█████░░░░░");
        assert_eq!(bar(10, 0), "░░░░░░░░░░");
        assert_eq!(bar(4, 200), "████");
    }

    #[test]
    fn columns_share_width() {
        let cols = columns(Rect::new(0, 0, 32, 5), 4, 2);
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0], Rect::new(0, 0, 6, 5));
        assert_eq!(cols[3].x, 24);
        assert!(columns(Rect::new(0, 0, 10, 1), 0, 1).is_empty());
    }

    #[test]
    fn centered_text_is_centered() {
        let mut frame = Frame::new(10, 1);
        let area = frame.area();
        print_centered(&mut frame, area, "abcd", Style::new());
        assert_eq!(frame.buffer.row_text(0), "   abcd");
    }

    #[test]
    fn card_titles_the_border() {
        let mut frame = Frame::new(20, 4);
        let area = frame.area();
        let inner = card(&mut frame, area, "KPI");
        assert_eq!(inner, Rect::new(1, 1, 18, 2));
        assert!(frame.buffer.row_text(0).contains(" KPI "));
    }
}
