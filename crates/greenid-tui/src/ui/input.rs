//! Keyboard input handling for the TUI.
//!
//! This module translates key events into application state changes and
//! maps every raw terminal event onto the user activity that keeps the
//! session alive.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseEventKind};

use greenid_core::Activity;

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, Focus, LoginFocus};

/// Which activity, if any, a terminal event represents.
pub fn activity_for(event: &Event) -> Option<Activity> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(Activity::KeyPress),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(_) => Some(Activity::MouseDown),
            MouseEventKind::Up(_) => Some(Activity::Click),
            MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(Activity::MouseMove),
            MouseEventKind::ScrollUp
            | MouseEventKind::ScrollDown
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight => Some(Activity::Scroll),
        },
        _ => None,
    }
}

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.kind == KeyEventKind::Release {
        return Ok(false);
    }

    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = match app.focus {
                Focus::Menu => Focus::Content,
                Focus::Content => Focus::Menu,
            };
        }
        KeyCode::Up => match app.focus {
            Focus::Menu => app.move_menu_selection(-1),
            Focus::Content => app.scroll_content(-1),
        },
        KeyCode::Down => match app.focus {
            Focus::Menu => app.move_menu_selection(1),
            Focus::Content => app.scroll_content(1),
        },
        KeyCode::Enter if app.focus == Focus::Menu => app.open_selected_menu_item(),
        KeyCode::Left | KeyCode::Char('[') => app.cycle_tab(-1),
        KeyCode::Right | KeyCode::Char(']') => app.cycle_tab(1),
        KeyCode::Char('x') => app.close_active_tab(),
        KeyCode::Char('o') => app.close_other_tabs(),
        KeyCode::Char('a') => app.close_all_tabs(),
        KeyCode::Char('h') => app.close_left_tabs(),
        KeyCode::Char('l') => app.close_right_tabs(),
        KeyCode::PageUp if app.focus == Focus::Content => app.scroll_content(-10),
        KeyCode::PageDown if app.focus == Focus::Content => app.scroll_content(10),
        KeyCode::Char('r') => app.refresh_active(),
        KeyCode::Char('L') => app.logout().await,
        _ => {}
    }

    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                // Failure details land in login_error
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent};

    use super::*;

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_activity_for_terminal_events() {
        let press = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(activity_for(&press), Some(Activity::KeyPress));
        assert_eq!(
            activity_for(&mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Activity::MouseDown)
        );
        assert_eq!(
            activity_for(&mouse(MouseEventKind::Up(MouseButton::Left))),
            Some(Activity::Click)
        );
        assert_eq!(activity_for(&mouse(MouseEventKind::Moved)), Some(Activity::MouseMove));
        assert_eq!(activity_for(&mouse(MouseEventKind::ScrollDown)), Some(Activity::Scroll));
        assert_eq!(activity_for(&Event::Resize(80, 24)), None);
        assert_eq!(activity_for(&Event::FocusGained), None);
    }
}
