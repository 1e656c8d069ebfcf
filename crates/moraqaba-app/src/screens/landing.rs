#![forbid(unsafe_code)]

//! Landing screen: choose professional or citizen access.

use moraqaba_core::{EntryKind, SessionAction};
use moraqaba_runtime::{Cmd, Frame, KeyCode, KeyEvent, Rect};

use super::{HelpEntry, Screen, columns, print_centered, print_wrapped_centered};
use crate::app::AppMsg;
use crate::theme;

pub const LOGO: &str = "◆ MORAQABA AI";
pub const HEADLINE: &str =
    "La plateforme intelligente de gouvernance et de performance des services publics";
pub const TAGLINE: &str = "Améliorer la transparence et la qualité des soins grâce au suivi \
biométrique et à l'intelligence artificielle.";

struct EntryCard {
    kind: EntryKind,
    title: &'static str,
    blurb: &'static str,
    action: &'static str,
}

const CARDS: [EntryCard; 2] = [
    EntryCard {
        kind: EntryKind::Professional,
        title: "Accès Professionnel",
        blurb: "Médecins, Directeurs, Superviseurs et Administrateurs.",
        action: "Se connecter →",
    },
    EntryCard {
        kind: EntryKind::Citizen,
        title: "Accès Citoyen",
        blurb: "Évaluez vos établissements et soumettez vos avis.",
        action: "Contribuer →",
    },
];

#[derive(Debug, Clone)]
pub struct LandingScreen {
    highlight: EntryKind,
}

impl Default for LandingScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LandingScreen {
    pub const fn new() -> Self {
        Self {
            highlight: EntryKind::Professional,
        }
    }

    pub const fn highlight(&self) -> EntryKind {
        self.highlight
    }

    fn toggle(&mut self) {
        self.highlight = match self.highlight {
            EntryKind::Professional => EntryKind::Citizen,
            EntryKind::Citizen => EntryKind::Professional,
        };
    }
}

fn enter(kind: EntryKind) -> Cmd<AppMsg> {
    Cmd::msg(AppMsg::Session(SessionAction::Enter(kind)))
}

impl Screen for LandingScreen {
    fn update(&mut self, key: &KeyEvent) -> Cmd<AppMsg> {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.toggle();
                Cmd::none()
            }
            KeyCode::Enter | KeyCode::Char(' ') => enter(self.highlight),
            KeyCode::Char('p') => enter(EntryKind::Professional),
            KeyCode::Char('c') => enter(EntryKind::Citizen),
            KeyCode::Char('q') | KeyCode::Escape => Cmd::quit(),
            _ => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(84);
        let body = Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height);
        let mut y = area.height.saturating_sub(20) / 2;

        print_centered(frame, body.row(y), LOGO, theme::accent());
        y += 2;
        let rows = Rect::new(body.x, body.y + y, body.width, 3);
        y += print_wrapped_centered(frame, rows, HEADLINE, theme::title()) + 1;
        let rows = Rect::new(body.x, body.y + y, body.width, 3);
        y += print_wrapped_centered(frame, rows, TAGLINE, theme::muted()) + 1;

        let cards_area = Rect::new(body.x, body.y + y, body.width, 7);
        for (card, rect) in CARDS.iter().zip(columns(cards_area, 2, theme::SM)) {
            let focused = card.kind == self.highlight;
            let border = if focused { theme::accent() } else { theme::border() };
            frame.draw_box(rect, border);
            let inner = rect.inset(1);
            let inner = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
            frame.print(inner, card.title, theme::heading());
            frame.print_wrapped(
                Rect::new(inner.x, inner.y + 1, inner.width, 2),
                card.blurb,
                theme::muted(),
            );
            let action_style = if focused { theme::selected() } else { theme::accent() };
            frame.print(inner.row(4), card.action, action_style);
        }
        y += 8;

        print_centered(
            frame,
            body.row(y),
            "←/→ choisir  ·  Entrée valider  ·  q quitter",
            theme::faint(),
        );
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![
            HelpEntry::new("←/→", "Choisir"),
            HelpEntry::new("Entrée", "Valider"),
            HelpEntry::new("q", "Quitter"),
        ]
    }

    fn title(&self) -> &'static str {
        "landing"
    }
}
