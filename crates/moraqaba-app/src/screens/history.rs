#![forbid(unsafe_code)]

//! Check-ins recorded during this session.

use moraqaba_core::CheckInTime;
use moraqaba_runtime::{Frame, Rect};

use super::card;
use crate::theme;

pub const EMPTY_TEXT: &str = "Aucun check-in enregistré pendant cette session.";

pub fn view(frame: &mut Frame, area: Rect, recorded: &[CheckInTime]) {
    frame.print(area.row(1), "Historique des Check-ins", theme::title());
    let list = Rect::new(
        area.x,
        area.y + 3,
        area.width.min(60),
        area.height.saturating_sub(3).min(recorded.len() as u16 + 4),
    );
    let inner = card(frame, list, "Aujourd'hui");
    if recorded.is_empty() {
        frame.print(inner.row(1), &format!(" {EMPTY_TEXT}"), theme::muted());
        return;
    }
    // Newest first.
    for (i, at) in recorded.iter().rev().enumerate() {
        let row = inner.row(i as u16 + 1);
        let end = frame.print(row, &format!(" ✔ {at}"), theme::success());
        let rest = Rect::new(end + 2, row.y, row.right().saturating_sub(end + 2), 1);
        frame.print(rest, "Reconnaissance faciale (simulée)", theme::faint());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_says_so() {
        let mut frame = Frame::new(80, 12);
        let area = frame.area();
        view(&mut frame, area, &[]);
        assert!(frame.buffer.contains_text(EMPTY_TEXT));
    }

    #[test]
    fn lists_newest_first() {
        let mut frame = Frame::new(80, 12);
        let area = frame.area();
        view(&mut frame, area, &[CheckInTime::at(8, 1), CheckInTime::at(13, 45)]);
        let rows: Vec<String> = (0..12).map(|y| frame.buffer.row_text(y)).collect();
        let first = rows.iter().position(|r| r.contains("13:45"));
        let second = rows.iter().position(|r| r.contains("08:01"));
        assert!(first.is_some() && second.is_some());
        assert!(first < second);
        assert!(!frame.buffer.contains_text(EMPTY_TEXT));
    }
}
