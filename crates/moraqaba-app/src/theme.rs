#![forbid(unsafe_code)]

//! Shared palette and text styles.
//!
//! # Spacing
//!
//! | Token | Value | Use |
//! |-------|-------|-----|
//! | `XS` | 1 | Inline gaps |
//! | `SM` | 2 | Between list items and cards |
//! | `MD` | 3 | Panel padding |

use moraqaba_runtime::{Color, Style};

pub const XS: u16 = 1;
pub const SM: u16 = 2;
pub const MD: u16 = 3;

/// Sidebar width in columns.
pub const SIDEBAR_WIDTH: u16 = 30;

pub mod palette {
    use moraqaba_runtime::Color;

    pub const BLUE: Color = Color::Rgb(37, 99, 235);
    pub const BLUE_DEEP: Color = Color::Rgb(30, 58, 138);
    pub const LIME: Color = Color::Rgb(132, 204, 22);
    pub const RED: Color = Color::Rgb(239, 68, 68);
    pub const ORANGE: Color = Color::Rgb(249, 115, 22);
    pub const YELLOW: Color = Color::Rgb(250, 204, 21);
    pub const SLATE_50: Color = Color::Rgb(248, 250, 252);
    pub const SLATE_400: Color = Color::Rgb(148, 163, 184);
    pub const SLATE_500: Color = Color::Rgb(100, 116, 139);
    pub const SLATE_800: Color = Color::Rgb(30, 41, 59);
    pub const SLATE_900: Color = Color::Rgb(15, 23, 42);
}

pub const fn base() -> Style {
    Style::new().fg(Color::Reset)
}

pub const fn title() -> Style {
    Style::new().fg(palette::BLUE_DEEP).bold()
}

pub const fn heading() -> Style {
    Style::new().fg(palette::SLATE_800).bold()
}

pub const fn muted() -> Style {
    Style::new().fg(palette::SLATE_500)
}

pub const fn faint() -> Style {
    Style::new().fg(palette::SLATE_400)
}

pub const fn accent() -> Style {
    Style::new().fg(palette::BLUE).bold()
}

pub const fn success() -> Style {
    Style::new().fg(palette::LIME).bold()
}

pub const fn warning() -> Style {
    Style::new().fg(palette::ORANGE).bold()
}

pub const fn danger() -> Style {
    Style::new().fg(palette::RED).bold()
}

pub const fn stars() -> Style {
    Style::new().fg(palette::YELLOW)
}

pub const fn quote() -> Style {
    Style::new().fg(palette::SLATE_800).italic()
}

pub const fn border() -> Style {
    Style::new().fg(palette::SLATE_400)
}

/// Highlighted item (active tab, focused card).
pub const fn selected() -> Style {
    Style::new().fg(Color::White).bg(palette::BLUE).bold()
}

pub const fn button() -> Style {
    Style::new().fg(Color::White).bg(palette::BLUE).bold()
}

pub const fn dark_panel() -> Style {
    Style::new().fg(palette::SLATE_50).bg(palette::SLATE_900)
}

pub const fn scan_overlay() -> Style {
    Style::new().fg(palette::LIME).bg(palette::SLATE_900).bold()
}

pub const fn success_overlay() -> Style {
    Style::new().fg(Color::White).bg(palette::LIME).bold()
}
