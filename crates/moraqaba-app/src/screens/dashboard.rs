#![forbid(unsafe_code)]

//! Dashboard pane.
//!
//! Staff see headline KPIs, the weekly presence trend and the latest
//! check-ins. Citizens land on the facility-rating view instead.

use moraqaba_core::mock::{self, DASHBOARD_KPIS, FACILITY_CITY, RATEABLE_FACILITIES, WEEKLY_STATS};
use moraqaba_core::{AttendanceRecord, AttendanceStatus};
use moraqaba_runtime::{Cmd, Frame, KeyCode, KeyEvent, Rect, Style};
use tracing::info;

use super::{HelpEntry, Screen, bar, card, columns, print_centered, print_wrapped_centered};
use crate::app::AppMsg;
use crate::theme;

fn trend_style(trend: &str) -> Style {
    if trend.starts_with('+') {
        theme::success()
    } else if trend.starts_with('-') {
        theme::danger()
    } else {
        theme::accent()
    }
}

fn status_style(status: AttendanceStatus) -> Style {
    match status {
        AttendanceStatus::Present => theme::success(),
        AttendanceStatus::Late => theme::warning(),
        AttendanceStatus::Absent => theme::danger(),
    }
}

pub fn view_staff(frame: &mut Frame, area: Rect) {
    let (kpi_row, rest) = area.split_top(5);
    let n = DASHBOARD_KPIS.len() as u16;
    for (kpi, rect) in DASHBOARD_KPIS.iter().zip(columns(kpi_row, n, theme::SM)) {
        let inner = card(frame, rect, "");
        let inner = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
        frame.print(inner, kpi.label, theme::faint());
        let end = frame.print(inner.row(1), kpi.value, theme::heading());
        let trend = Rect::new(end + 2, inner.y + 1, inner.right().saturating_sub(end + 2), 1);
        frame.print(trend, kpi.trend, trend_style(kpi.trend));
    }

    let rest = Rect::new(rest.x, rest.y + 1, rest.width, rest.height.saturating_sub(1));
    let halves = columns(rest, 2, theme::SM);
    let [trends, recent] = [halves[0], halves[1]];
    view_trends(frame, Rect::new(trends.x, trends.y, trends.width, trends.height.min(15)));
    view_recent(frame, Rect::new(recent.x, recent.y, recent.width, recent.height.min(18)));
}

fn view_trends(frame: &mut Frame, area: Rect) {
    let inner = card(frame, area, "Tendances de Présence (Semaine)").inset(1);
    let bar_width = inner.width.saturating_sub(10);
    let mut y = 0;
    for day in WEEKLY_STATS {
        frame.print(inner.row(y), day.name, theme::muted());
        let bars = Rect::new(inner.x + 4, inner.y + y, bar_width, 1);
        frame.print(bars, &bar(bar_width, day.presence), Style::new().fg(theme::palette::BLUE));
        let pct = Rect::new(bars.right() + 1, inner.y + y, 5, 1);
        frame.print(pct, &format!("{}%", day.presence), theme::heading());
        let bars = Rect::new(inner.x + 4, inner.y + y + 1, bar_width, 1);
        frame.print(bars, &bar(bar_width, day.predicted), Style::new().fg(theme::palette::LIME));
        let pct = Rect::new(bars.right() + 1, inner.y + y + 1, 5, 1);
        frame.print(pct, &format!("{}%", day.predicted), theme::faint());
        y += 2;
    }
    frame.print(
        inner.row(y),
        "█ présence   █ prédiction",
        theme::faint(),
    );
}

fn view_recent(frame: &mut Frame, area: Rect) {
    let inner = card(frame, area, "Derniers Check-ins").inset(1);
    let mut y = 0;
    for record in mock::attendance() {
        view_record(frame, Rect::new(inner.x, inner.y + y, inner.width, 2), &record);
        y += 3;
    }
    print_centered(frame, inner.row(y), "Voir tout le personnel", theme::accent());
}

fn view_record(frame: &mut Frame, area: Rect, record: &AttendanceRecord) {
    frame.print(area, &format!("({})", record.avatar()), theme::accent());
    let text = Rect::new(area.x + 4, area.y, area.width.saturating_sub(4), area.height);
    frame.print(text, &record.user_name, theme::heading());
    frame.print(text.row(1), &record.facility, theme::muted());

    let summary = record.summary();
    let w = super::text_width(&summary);
    let right = area.right().saturating_sub(w);
    frame.print(Rect::new(right, area.y, w, 1), &summary, status_style(record.status));
    let badge = "FACEID VERIFIED";
    let bw = super::text_width(badge);
    let right = area.right().saturating_sub(bw);
    frame.print(Rect::new(right, area.y + 1, bw, 1), badge, theme::faint());
}

/// Citizen dashboard: pick a facility to rate.
#[derive(Debug, Clone, Default)]
pub struct CitizenHome {
    cursor: usize,
}

impl CitizenHome {
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    pub fn selected(&self) -> &'static str {
        RATEABLE_FACILITIES[self.cursor % RATEABLE_FACILITIES.len()]
    }
}

impl Screen for CitizenHome {
    fn update(&mut self, key: &KeyEvent) -> Cmd<AppMsg> {
        let n = RATEABLE_FACILITIES.len();
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => self.cursor = (self.cursor + 1) % n,
            KeyCode::Left | KeyCode::Char('h') => self.cursor = (self.cursor + n - 1) % n,
            KeyCode::Enter | KeyCode::Char(' ') => {
                // The review form does not exist yet; record the intent only.
                info!(facility = self.selected(), "feedback requested");
            }
            _ => {}
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut y = 1;
        print_centered(frame, area.row(y), super::landing::LOGO, theme::accent());
        y += 2;
        print_centered(frame, area.row(y), "Évaluez vos services publics", theme::heading());
        y += 1;
        let blurb = Rect::new(area.x, area.y + y, area.width, 2);
        y += print_wrapped_centered(
            frame,
            blurb,
            "Votre avis nous aide à améliorer la qualité et la présence dans nos établissements.",
            theme::muted(),
        ) + 1;

        let n = RATEABLE_FACILITIES.len() as u16;
        let row = Rect::new(area.x, area.y + y, area.width, 6);
        for (i, (name, rect)) in RATEABLE_FACILITIES
            .iter()
            .zip(columns(row, n, theme::SM))
            .enumerate()
        {
            let focused = i == self.cursor;
            frame.draw_box(rect, if focused { theme::accent() } else { theme::border() });
            let inner = rect.inset(1);
            let inner = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
            frame.print(inner, name, theme::heading());
            frame.print(inner.row(1), FACILITY_CITY, theme::faint());
            let style = if focused { theme::selected() } else { theme::button() };
            let button = inner.row(3);
            frame.buffer.fill(button, style);
            print_centered(frame, button, "Donner mon avis", style);
        }
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![
            HelpEntry::new("←/→", "Établissement"),
            HelpEntry::new("Entrée", "Donner mon avis"),
        ]
    }

    fn title(&self) -> &'static str {
        "citizen-home"
    }
}
