#![forbid(unsafe_code)]

//! Shared UI chrome for the signed-in screen: sidebar, header and status bar.

use moraqaba_core::{Tab, User};
use moraqaba_runtime::{Frame, Rect};

use crate::screens::{HelpEntry, landing, text_width};
use crate::theme;

/// Render the sidebar with the role's tabs, numbered for quick selection.
pub fn render_sidebar(frame: &mut Frame, area: Rect, tabs: &[Tab], active: Tab) {
    frame.buffer.fill(area, theme::base());
    frame.draw_box(area, theme::border());
    let inner = area.inset(1);
    let inner = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
    frame.print(inner.row(1), landing::LOGO, theme::accent());

    for (i, tab) in tabs.iter().enumerate() {
        let row = inner.row(i as u16 + 3);
        let selected = *tab == active;
        let style = if selected { theme::selected() } else { theme::base() };
        if selected {
            frame.buffer.fill(row, style);
        }
        let label = if i < 9 {
            format!(" {} {}", i + 1, tab.label())
        } else {
            format!("   {}", tab.label())
        };
        frame.print(row, &label, style);
    }

    let bottom = inner.row(inner.height.saturating_sub(1));
    frame.print(bottom, "Ctrl+L Déconnexion", theme::danger());
}

/// Header title: a greeting on the dashboard, the tab heading elsewhere.
pub fn header_title(user: &User, tab: Tab) -> String {
    if tab == Tab::Dashboard {
        format!("Bonjour, {}", user.name)
    } else {
        tab.heading()
    }
}

/// Header subtitle: the user's facility, else region, else the country.
pub fn header_subtitle(user: &User) -> &str {
    user.facility
        .as_deref()
        .or(user.region.as_deref())
        .unwrap_or("Maroc")
}

pub fn render_header(frame: &mut Frame, area: Rect, user: &User, tab: Tab) {
    let inner = Rect::new(area.x + 2, area.y, area.width.saturating_sub(4), area.height);
    frame.print(inner, &header_title(user, tab), theme::title());
    frame.print(inner.row(1), header_subtitle(user), theme::muted());

    let badge = format!("({})  {}", user.initial(), user.role.label());
    let w = text_width(&badge);
    let x = inner.right().saturating_sub(w);
    frame.print(Rect::new(x, inner.y, w, 1), &badge, theme::accent());
}

/// State needed to render the status bar.
pub struct StatusBarState<'a> {
    pub view_name: &'a str,
    pub bindings: &'a [HelpEntry],
}

/// Render the status bar at the bottom of the screen: view name on the left,
/// then key hints.
pub fn render_status_bar(state: &StatusBarState<'_>, frame: &mut Frame, area: Rect) {
    frame.buffer.fill(area, theme::dark_panel());
    let mut x = frame.print(area, &format!(" {} ", state.view_name), theme::scan_overlay());
    for entry in state.bindings {
        if x >= area.right() {
            break;
        }
        let rest = Rect::new(x + 1, area.y, area.right().saturating_sub(x + 1), 1);
        let end = frame.print(rest, entry.key, theme::dark_panel().bold());
        let rest = Rect::new(end + 1, area.y, area.right().saturating_sub(end + 1), 1);
        x = frame.print(rest, entry.action, theme::faint().bg(theme::palette::SLATE_900)) + 1;
    }
}
