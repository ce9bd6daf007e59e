//! Keyboard input handling.
//!
//! Routes key presses to the right handler for the current view and any
//! active overlay. Overlays capture all input while visible.

use crate::app::{App, AppEvent, LoginField, PromptDialog, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{open_in_browser, request_next_page_if_near, spawn_auth, spawn_generate, start_search};
use super::Action;

/// Maximum allowed search query length.
const MAX_QUERY_LENGTH: usize = 256;

/// Maximum allowed generation prompt length.
const MAX_PROMPT_LENGTH: usize = 1000;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Overlays capture all keys while visible
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }
    if app.prompt.is_some() {
        return Ok(handle_prompt_input(app, code, event_tx));
    }
    if app.detail_open {
        return Ok(handle_detail_input(app, code));
    }
    if app.search_mode {
        return Ok(handle_search_input(app, code, event_tx));
    }

    match app.view {
        View::Login => Ok(handle_login_input(app, code, modifiers, event_tx)),
        View::Browse => Ok(handle_browse_input(app, code, event_tx)),
    }
}

fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
        app.show_help = false;
    }
    Action::Continue
}

/// Sign-in / sign-up form input.
///
/// Plain characters go to the focused field, so view-level commands live on
/// non-character keys (Tab, Enter, Esc) and Ctrl chords.
fn handle_login_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.login.toggle_mode();
        }
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            app.login.field = match app.login.field {
                LoginField::Email => LoginField::Password,
                LoginField::Password => LoginField::Email,
            };
        }
        KeyCode::Enter => {
            if app.login.busy {
                return Action::Continue;
            }
            if app.login.email.trim().is_empty() || app.login.password.is_empty() {
                app.login.error = Some("Enter email and password.".to_string());
            } else {
                spawn_auth(app, event_tx);
            }
        }
        KeyCode::Backspace => {
            app.login.active_input_mut().pop();
        }
        KeyCode::Char(c) if !c.is_control() && !modifiers.contains(KeyModifiers::CONTROL) => {
            let input = app.login.active_input_mut();
            if input.len() < 128 {
                input.push(c);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Browse-view input: grid navigation and view commands.
fn handle_browse_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('/') => {
            app.search_mode = true;
            app.search_input = app.feed.query().to_string();
        }
        KeyCode::Char('g') => {
            app.prompt = Some(PromptDialog::new());
        }
        KeyCode::Enter | KeyCode::Char('v') => {
            if app.selected_record().is_some() {
                app.detail_open = true;
            }
        }
        KeyCode::Char('o') => {
            if let Some(record) = app.selected_record() {
                let url = record.full_url.clone();
                open_in_browser(app, &url);
            }
        }
        KeyCode::Char('r') => {
            start_search(app, app.feed.query().to_string(), event_tx);
        }
        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('L') => app.logout(),
        KeyCode::Left | KeyCode::Char('h') => {
            app.nav_left();
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.nav_right();
            request_next_page_if_near(app, event_tx);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.nav_up();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.nav_down();
            request_next_page_if_near(app, event_tx);
        }
        KeyCode::End | KeyCode::Char('G') => {
            if !app.feed.is_empty() {
                app.selected = app.feed.len() - 1;
            }
            request_next_page_if_near(app, event_tx);
        }
        KeyCode::Home => app.selected = 0,
        _ => {}
    }
    Action::Continue
}

/// Search input line: edit the query, Enter submits, Esc cancels.
fn handle_search_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Esc => {
            app.search_mode = false;
            app.search_input.clear();
        }
        KeyCode::Enter => {
            app.search_mode = false;
            let query = std::mem::take(&mut app.search_input);
            app.selected = 0;
            start_search(app, query, event_tx);
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) if !c.is_control() => {
            if app.search_input.len() < MAX_QUERY_LENGTH {
                app.search_input.push(c);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Generation dialog input.
///
/// An empty prompt is rejected here, before any request is issued.
fn handle_prompt_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    let Some(dialog) = &mut app.prompt else {
        return Action::Continue;
    };
    match code {
        KeyCode::Esc => {
            app.prompt = None;
        }
        KeyCode::Enter => {
            if dialog.busy {
                return Action::Continue;
            }
            if dialog.input.trim().is_empty() {
                dialog.error = Some("Enter a prompt first.".to_string());
                return Action::Continue;
            }
            dialog.busy = true;
            dialog.error = None;
            let prompt = dialog.input.clone();
            spawn_generate(app, prompt, event_tx);
        }
        KeyCode::Backspace => {
            dialog.input.pop();
        }
        KeyCode::Char(c) if !c.is_control() => {
            if dialog.input.len() < MAX_PROMPT_LENGTH {
                dialog.input.push(c);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Detail overlay input.
fn handle_detail_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
            app.detail_open = false;
        }
        KeyCode::Char('o') => {
            if let Some(record) = app.selected_record() {
                let url = record.full_url.clone();
                open_in_browser(app, &url);
            }
        }
        KeyCode::Char('d') => match app.selected_record().and_then(|r| r.download_url.clone()) {
            Some(url) => open_in_browser(app, &url),
            None => app.set_status("No download link for this image"),
        },
        _ => {}
    }
    Action::Continue
}
