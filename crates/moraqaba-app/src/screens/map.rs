#![forbid(unsafe_code)]

//! National map pane: region list, national KPIs and the regional note.

use moraqaba_core::Region;
use moraqaba_core::mock::{NATIONAL_KPIS, REGIONAL_ANALYSIS, REGIONS};
use moraqaba_runtime::{Cmd, Frame, KeyCode, KeyEvent, Rect};
use tracing::info;

use super::{HelpEntry, Screen, card};
use crate::app::AppMsg;
use crate::theme;

const LEGEND: [(&str, &str); 3] = [
    ("█", "> 95% Excellent"),
    ("▓", "80-95% Normal"),
    ("░", "< 80% Alerte"),
];

#[derive(Debug, Clone, Default)]
pub struct MapPane {
    cursor: usize,
    selected: Option<&'static str>,
}

impl MapPane {
    pub const fn new() -> Self {
        Self {
            cursor: 0,
            selected: None,
        }
    }

    pub fn cursor_region(&self) -> &'static Region {
        &REGIONS[self.cursor.min(REGIONS.len() - 1)]
    }

    /// Id of the last clicked region.
    pub fn selected(&self) -> Option<&'static str> {
        self.selected
    }

    fn click(&mut self) -> Cmd<AppMsg> {
        let region = self.cursor_region();
        self.selected = Some(region.id);
        info!(region = region.id, "region clicked");
        Cmd::log(region.id)
    }

    fn view_details(&self, frame: &mut Frame, area: Rect) {
        frame.buffer.fill(area, theme::dark_panel());
        let inner = area.inset(2);
        frame.print(inner, "Détails Région : Rabat-Salé", theme::dark_panel().bold());
        let stats = [
            (
                "Taux Présence Global",
                format!("{:.1}%", NATIONAL_KPIS.presence_rate),
                theme::scan_overlay(),
            ),
            (
                "Établissements Actifs",
                NATIONAL_KPIS.active_facilities.to_string(),
                theme::dark_panel().bold(),
            ),
            (
                "Alertes Critiques",
                NATIONAL_KPIS.critical_alerts.to_string(),
                theme::danger().bg(theme::palette::SLATE_900),
            ),
        ];
        let mut y = 2;
        for (label, value, style) in stats {
            frame.print(inner.row(y), label, theme::faint().bg(theme::palette::SLATE_900));
            frame.print(inner.row(y + 1), &value, style);
            y += 3;
        }
        frame.print(inner.row(y), "▲ Analyse IA", theme::scan_overlay());
        let note = Rect::new(inner.x, inner.y + y + 1, inner.width, inner.height.saturating_sub(y + 1));
        frame.print_wrapped(
            note,
            &format!("\u{201c}{REGIONAL_ANALYSIS}\u{201d}"),
            theme::dark_panel().italic(),
        );
    }
}

impl Screen for MapPane {
    fn update(&mut self, key: &KeyEvent) -> Cmd<AppMsg> {
        let n = REGIONS.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.cursor = (self.cursor + 1) % n,
            KeyCode::Up | KeyCode::Char('k') => self.cursor = (self.cursor + n - 1) % n,
            KeyCode::Enter | KeyCode::Char(' ') => return self.click(),
            _ => {}
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let side = (area.width / 3).max(30).min(area.width);
        let (map, details) = area.split_left(area.width - side);
        let inner = card(frame, Rect::new(map.x, map.y, map.width.saturating_sub(2), map.height), "Supervision Territoriale");
        let inner = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
        frame.print_wrapped(
            Rect::new(inner.x, inner.y, inner.width, 2),
            "Cliquez sur une région pour voir les détails de présence et les prédictions.",
            theme::muted(),
        );

        let list = Rect::new(inner.x, inner.y + 3, inner.width, inner.height.saturating_sub(3));
        for (i, region) in REGIONS.iter().enumerate() {
            let row = list.row(i as u16);
            let is_cursor = i == self.cursor;
            let is_selected = self.selected == Some(region.id);
            let marker = if is_selected { "◆" } else { "◇" };
            let style = if is_cursor {
                theme::selected()
            } else if is_selected {
                theme::success()
            } else {
                theme::base()
            };
            if is_cursor {
                frame.buffer.fill(Rect::new(row.x, row.y, row.width.min(36), row.height), style);
            }
            frame.print(row, &format!(" {marker} {}", region.name), style);
        }

        let legend_x = list.x + 38;
        if legend_x + 18 <= list.right() {
            let legend = Rect::new(legend_x, list.y, list.right() - legend_x, 4);
            frame.print(legend, "TAUX PRÉSENCE", theme::muted());
            for (i, (glyph, label)) in LEGEND.iter().enumerate() {
                let row = legend.row(i as u16 + 1);
                let end = frame.print(row, glyph, theme::accent());
                frame.print(Rect::new(end + 1, row.y, row.right().saturating_sub(end + 1), 1), label, theme::base());
            }
        }

        self.view_details(frame, details);
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![
            HelpEntry::new("↑/↓", "Région"),
            HelpEntry::new("Entrée", "Sélectionner"),
        ]
    }

    fn title(&self) -> &'static str {
        "map"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    #[test]
    fn enter_logs_region_id() {
        let mut pane = MapPane::new();
        pane.update(&key(KeyCode::Down));
        pane.update(&key(KeyCode::Down));
        pane.update(&key(KeyCode::Down));
        match pane.update(&key(KeyCode::Enter)) {
            Cmd::Log(id) => assert_eq!(id, "rabat"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(pane.selected(), Some("rabat"));
    }

    #[test]
    fn cursor_wraps() {
        let mut pane = MapPane::new();
        pane.update(&key(KeyCode::Up));
        assert_eq!(pane.cursor_region().id, "dakhla");
        pane.update(&key(KeyCode::Char('j')));
        assert_eq!(pane.cursor_region().id, "tanger");
    }

    #[test]
    fn renders_regions_and_kpis() {
        let pane = MapPane::new();
        let mut frame = Frame::new(120, 32);
        let area = frame.area();
        pane.view(&mut frame, area);
        let text = frame.buffer.to_text();
        assert!(text.contains("Supervision Territoriale"));
        for region in REGIONS {
            assert!(text.contains(region.name), "{}", region.name);
        }
        assert!(text.contains("92.4%"));
        assert!(text.contains("142"));
        assert!(text.contains("Alertes Critiques"));
        assert!(text.contains("Analyse IA"));
    }
}
