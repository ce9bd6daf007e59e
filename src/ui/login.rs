//! Sign-in / sign-up form.

use crate::app::{App, LoginField, LoginMode};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::centered_rect;

/// Spinner frames for the busy indicator.
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    let overlay = centered_rect(area, 54, 14);
    if overlay.width < 30 || overlay.height < 10 {
        return;
    }

    f.render_widget(Clear, overlay);

    let label = app.style("form_label");
    let error_style = app.style("form_error");

    let (title, submit_label) = match app.login.mode {
        LoginMode::SignIn => ("Sign in to snaply", "Sign In"),
        LoginMode::Register => ("Create your snaply account", "Create Account"),
    };

    let email_style = if app.login.field == LoginField::Email {
        app.style("form_input_focused")
    } else {
        app.style("form_input")
    };
    let password_style = if app.login.field == LoginField::Password {
        app.style("form_input_focused")
    } else {
        app.style("form_input")
    };
    let masked: String = "•".repeat(app.login.password.chars().count());

    let mut lines = vec![
        Line::from(Span::styled(title, app.style("detail_heading"))).alignment(Alignment::Center),
        Line::default(),
    ];

    match &app.login.error {
        Some(error) => {
            lines.push(Line::from(Span::styled(error.clone(), error_style)).alignment(Alignment::Center))
        }
        None => lines.push(Line::default()),
    }
    lines.push(Line::default());

    lines.push(Line::from(vec![
        Span::styled("Email:    ", label),
        Span::styled(format!(" {} ", app.login.email), email_style),
    ]));
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("Password: ", label),
        Span::styled(format!(" {} ", masked), password_style),
    ]));
    lines.push(Line::default());

    if app.login.busy {
        let frame = SPINNER[app.spinner_frame % SPINNER.len()];
        let busy_text = match app.login.mode {
            LoginMode::SignIn => format!("{} Signing in…", frame),
            LoginMode::Register => format!("{} Creating…", frame),
        };
        lines.push(Line::from(Span::styled(busy_text, label)).alignment(Alignment::Center));
    } else {
        lines.push(
            Line::from(Span::styled(format!("(Enter) {}", submit_label), label))
                .alignment(Alignment::Center),
        );
    }

    let toggle_hint = match app.login.mode {
        LoginMode::SignIn => "No account? Ctrl+R to register",
        LoginMode::Register => "Have an account? Ctrl+R to sign in",
    };
    lines.push(
        Line::from(Span::styled(
            format!("{}  ·  (Tab) Switch field  ·  (Esc) Quit", toggle_hint),
            app.style("detail_metadata"),
        ))
        .alignment(Alignment::Center),
    );

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(" snaply "),
    );

    f.render_widget(paragraph, overlay);
}
