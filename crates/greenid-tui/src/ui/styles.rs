//! Color scheme of the admin shell.

use ratatui::style::{Color, Modifier, Style};

// Palette
pub const LEAF: Color = Color::Rgb(56, 142, 96);
pub const MOSS: Color = Color::Rgb(40, 56, 48);
pub const SAND: Color = Color::Rgb(192, 160, 64);
pub const RUST: Color = Color::Rgb(192, 64, 64);
pub const ASH: Color = Color::Rgb(128, 128, 128);
pub const SLATE: Color = Color::Rgb(32, 32, 40);
pub const TEXT: Color = Color::White;

/// The countdown turns amber at this many minutes left
pub const EXPIRY_WARNING_MINUTES: i64 = 5;

/// ...and red at this many
pub const EXPIRY_CRITICAL_MINUTES: i64 = 1;

pub fn title_style() -> Style {
    Style::default().fg(LEAF).add_modifier(Modifier::BOLD)
}

pub fn text_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn muted_style() -> Style {
    Style::default().fg(ASH)
}

pub fn heading_style() -> Style {
    Style::default().fg(SAND)
}

pub fn error_style() -> Style {
    Style::default().fg(RUST)
}

pub fn selected_style() -> Style {
    Style::default().bg(MOSS).add_modifier(Modifier::BOLD)
}

pub fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { LEAF } else { ASH })
}

// ===== Tab bar =====

pub fn active_tab_style() -> Style {
    Style::default()
        .fg(LEAF)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn inactive_tab_style() -> Style {
    muted_style()
}

/// Close marker after every tab but the home tab.
pub fn tab_close_marker_style() -> Style {
    Style::default().fg(ASH).add_modifier(Modifier::DIM)
}

// ===== Tables =====

pub fn table_header_style() -> Style {
    Style::default()
        .fg(SAND)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Alternate row shading keeps wide tables readable.
pub fn table_row_style(index: usize) -> Style {
    if index % 2 == 0 {
        text_style()
    } else {
        Style::default().fg(TEXT).bg(Color::Rgb(24, 28, 26))
    }
}

// ===== Login form =====

pub fn field_style(focused: bool) -> Style {
    if focused {
        selected_style()
    } else {
        text_style()
    }
}

pub fn button_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(SLATE).bg(LEAF).add_modifier(Modifier::BOLD)
    } else {
        text_style()
    }
}

// ===== Status bar =====

pub fn status_bar_style() -> Style {
    Style::default().bg(SLATE).fg(TEXT)
}

/// Notices from failed requests.
pub fn notice_style() -> Style {
    Style::default().bg(SLATE).fg(SAND)
}

/// Session countdown, colored by how close automatic logout is.
pub fn countdown_style(minutes_left: i64) -> Style {
    let base = Style::default().bg(SLATE);
    if minutes_left < EXPIRY_CRITICAL_MINUTES {
        base.fg(RUST).add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
    } else if minutes_left < EXPIRY_WARNING_MINUTES {
        base.fg(SAND).add_modifier(Modifier::BOLD)
    } else {
        base.fg(ASH)
    }
}

// ===== Help overlay =====

pub fn help_key_style() -> Style {
    Style::default().fg(SAND).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_escalates_near_expiry() {
        assert_eq!(countdown_style(29).fg, Some(ASH));
        assert_eq!(countdown_style(4).fg, Some(SAND));
        assert_eq!(countdown_style(0).fg, Some(RUST));
    }

    #[test]
    fn test_table_rows_alternate() {
        assert_ne!(table_row_style(0), table_row_style(1));
        assert_eq!(table_row_style(0), table_row_style(2));
    }
}
