//! Status bar widget.

use crate::app::{App, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the status bar.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Cow avoids allocations for the static hint strings
    let text: Cow<'_, str> = if app.feed.is_loading() {
        Cow::Owned(format!(
            "{} Loading…",
            SPINNER[app.spinner_frame % SPINNER.len()]
        ))
    } else if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.feed.is_exhausted() && !app.feed.is_empty() {
        Cow::Borrowed("End of results · [/]search [g]enerate [q]uit")
    } else {
        match app.view {
            View::Browse => {
                if app.search_mode {
                    Cow::Borrowed("Type to search | ESC cancel | ENTER confirm")
                } else {
                    Cow::Borrowed(
                        "[/]search [g]enerate [Enter]view [o]pen [t]heme [L]ogout [?]help [q]uit",
                    )
                }
            }
            View::Login => Cow::Borrowed("[Tab]switch [Enter]submit [Ctrl+R]mode [Esc]quit"),
        }
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
