//! Image generation dialog.

use crate::app::App;
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::centered_rect;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn render(f: &mut Frame, app: &App) {
    let Some(dialog) = &app.prompt else {
        return;
    };

    let area = f.area();
    let overlay = centered_rect(area, 60, 9);
    if overlay.width < 30 || overlay.height < 7 {
        return;
    }

    f.render_widget(Clear, overlay);

    let label = app.style("form_label");

    let mut lines = vec![
        Line::from(Span::styled("Describe the image to generate", label)),
        Line::from(Span::styled(
            format!("> {}_", dialog.input),
            app.style("form_input"),
        )),
    ];

    match &dialog.error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.clone(),
            app.style("form_error"),
        ))),
        None => lines.push(Line::default()),
    }

    if dialog.busy {
        let frame = SPINNER[app.spinner_frame % SPINNER.len()];
        lines.push(
            Line::from(Span::styled(format!("{} Generating…", frame), label))
                .alignment(Alignment::Center),
        );
    } else {
        lines.push(
            Line::from(Span::styled(
                "(Enter) Generate  (Esc) Cancel",
                app.style("detail_metadata"),
            ))
            .alignment(Alignment::Center),
        );
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(" Generate Image "),
    );

    f.render_widget(paragraph, overlay);
}
