#![forbid(unsafe_code)]

//! Pane for tabs that have no content yet.

use moraqaba_core::Tab;
use moraqaba_runtime::{Frame, Rect};

use super::print_centered;
use crate::theme;

pub const NOTE: &str = "Ce module n'est pas encore disponible.";

pub fn view(frame: &mut Frame, area: Rect, tab: Tab) {
    let mid = area.height / 2;
    print_centered(frame, area.row(mid.saturating_sub(1)), tab.label(), theme::heading());
    print_centered(frame, area.row(mid + 1), NOTE, theme::muted());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_the_tab() {
        let mut frame = Frame::new(60, 10);
        let area = frame.area();
        view(&mut frame, area, Tab::Settings);
        assert!(frame.buffer.contains_text("Paramètres"));
        assert!(frame.buffer.contains_text(NOTE));
    }
}
