use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use greenid_core::tabs::HOME_PATH;

use crate::app::{App, AppState, Focus, LoginFocus};

use super::{pages, styles};

/// Width of the navigation menu column
const MENU_WIDTH: u16 = 28;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Menu + page
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(MENU_WIDTH), Constraint::Min(20)])
        .split(chunks[2]);
    render_menu(frame, app, body[0]);
    render_page(frame, app, body[1]);

    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Green Finance Identification";
    let user = app
        .session
        .identity()
        .map(|identity| identity.display_name().to_string())
        .unwrap_or_else(|| "not logged in".to_string());
    let right = format!("{}  {}  [?] Help", user, chrono::Local::now().format("%H:%M"));

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + right.chars().count() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in app.tabs.tabs().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let style = if tab.path == app.tabs.active_tab() {
            styles::active_tab_style()
        } else {
            styles::inactive_tab_style()
        };
        spans.push(Span::styled(tab.title.clone(), style));
        if tab.path != HOME_PATH {
            spans.push(Span::styled(" ×", styles::tab_close_marker_style()));
        }
    }

    if app.tabs.is_empty() {
        spans.push(Span::styled("No open pages", styles::muted_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .menu()
        .iter()
        .map(|route| ListItem::new(Line::from(route.title)).style(styles::text_style()))
        .collect();

    let block = Block::default()
        .title(" Menu ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.focus == Focus::Menu));

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style())
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.menu_selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_page(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.focus == Focus::Content));

    let Some(tab) = app.tabs.active() else {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            " Select a page from the menu",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    if let Some(view) = app.active_view() {
        pages::render_list_page(frame, app, view, tab, block, area);
        return;
    }

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", tab.title), styles::title_style())),
        Line::from(Span::styled(format!(" {}", tab.path), styles::muted_style())),
        Line::from(""),
    ];

    if tab.original_path == HOME_PATH {
        lines.extend(dashboard_lines(app));
    } else {
        lines.push(Line::from(Span::styled(
            " Nothing to list on this page.",
            styles::muted_style(),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.content_scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

fn dashboard_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(identity) = app.session.identity() {
        lines.push(Line::from(vec![
            Span::styled(" Signed in as ", styles::muted_style()),
            Span::styled(identity.display_name().to_string(), styles::heading_style()),
            Span::styled(
                if identity.is_superuser { " (administrator)" } else { "" },
                styles::muted_style(),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!(" {} permissions", app.session.permissions().len()),
            styles::muted_style(),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(" Announcements", styles::heading_style())));
    if app.announcements.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", styles::muted_style())));
    }
    for (i, announcement) in app.announcements.iter().enumerate() {
        let style = if i == app.ticker_offset {
            styles::selected_style()
        } else {
            styles::text_style()
        };
        lines.push(Line::from(Span::styled(format!("  • {}", announcement.headline()), style)));
    }

    lines
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (left_text, left_style) = match (&app.status_message, app.current_headline()) {
        (Some(msg), _) => (format!(" {} ", msg), styles::notice_style()),
        (None, Some(headline)) => (format!(" {} ", headline), styles::muted_style()),
        (None, None) => (String::new(), styles::muted_style()),
    };

    let (countdown, countdown_style) = match app.session.minutes_until_expiry() {
        Some(minutes) => (
            format!(" Session: {}m ", minutes),
            styles::countdown_style(minutes),
        ),
        None => (String::new(), styles::muted_style()),
    };
    let keys = if app.is_authenticated() {
        "| [L]ogout [q]uit "
    } else {
        " [q]uit "
    };

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(countdown.chars().count())
        .saturating_sub(keys.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(countdown, countdown_style),
        Span::styled(keys, styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(styles::status_bar_style()), area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, styles::help_key_style()),
        Span::styled(desc, styles::text_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 22, frame.area());
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(Span::styled(" Navigation", styles::heading_style())),
        help_line("  ↑↓ PgUp/Dn", "Move in menu / rows of a page"),
        help_line("  Enter     ", "Open selected page"),
        help_line("  Tab       ", "Switch focus (menu ↔ page)"),
        help_line("  ←/→ [ ]   ", "Previous/next tab"),
        Line::from(""),
        Line::from(Span::styled(" Tabs", styles::heading_style())),
        help_line("  x         ", "Close current tab"),
        help_line("  o         ", "Close other tabs"),
        help_line("  a         ", "Close all tabs"),
        help_line("  h / l     ", "Close tabs to the left / right"),
        Line::from(""),
        Line::from(Span::styled(" Session", styles::heading_style())),
        help_line("  r         ", "Reload the current page"),
        help_line("  L         ", "Log out"),
        help_line("  q         ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(format!(" greenid {} ", env!("CARGO_PKG_VERSION")))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 11 } else { 9 };
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];

    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = styles::field_style(username_focused);
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(format!("{:<16}{}", app.login_username, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = styles::field_style(password_focused);
    let password_masked = "*".repeat(app.login_password.chars().count().min(16));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{:<16}{}", password_masked, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = styles::button_style(button_focused);
    let label = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .title(" Login ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 6, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::heading_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
