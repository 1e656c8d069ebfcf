#![forbid(unsafe_code)]

//! Citizen reviews list for facility staff.

use moraqaba_core::Feedback;
use moraqaba_core::mock;
use moraqaba_runtime::{Frame, Rect};

use super::{card, text_width};
use crate::theme;

pub const HEADING: &str = "Retours d'expérience Citoyens";

pub fn view(frame: &mut Frame, area: Rect) {
    let reviews = mock::citizen_reviews();
    let width = area.width.min(100);
    let col = Rect::new(area.x, area.y, width, area.height);
    frame.print(col.row(1), HEADING, theme::title());

    let mut y = 3;
    for review in &reviews {
        if y + 5 > col.height {
            break;
        }
        view_review(frame, Rect::new(col.x, col.y + y, col.width, 5), review);
        y += 6;
    }
}

fn view_review(frame: &mut Frame, area: Rect, review: &Feedback) {
    let inner = card(frame, area, "");
    let inner = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
    frame.print(inner, &review.citizen_name, theme::heading());
    let meta = format!("{} • {}", review.facility, review.date);
    frame.print(inner.row(1), &meta, theme::faint());

    let stars = review.rating.stars();
    let w = text_width(&stars);
    let x = inner.right().saturating_sub(w);
    frame.print(Rect::new(x, inner.y, w, 1), &stars, theme::stars());

    let comment = format!("\u{201c}{}\u{201d}", review.comment);
    frame.print(inner.row(2), &comment, theme::quote());
}
