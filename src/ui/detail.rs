//! Image detail overlay.
//!
//! Full metadata for the selected record: attribution, counts, and the
//! resource URLs, with keys to hand them to the OS browser.

use crate::app::App;
use crate::util::sanitize_api_text;
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::render::centered_rect;

pub(super) fn render(f: &mut Frame, app: &App) {
    let Some(record) = app.selected_record() else {
        return;
    };

    let area = f.area();
    let overlay = centered_rect(area, 76, 20);
    if overlay.width < 30 || overlay.height < 10 {
        return;
    }

    f.render_widget(Clear, overlay);

    let heading = app.style("detail_heading");
    let body = app.style("detail_body");
    let meta = app.style("detail_metadata");
    let link = app.style("detail_link");

    let counts = format!(
        "Likes: {}   Views: {}",
        record
            .likes
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        record
            .views
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    );

    let mut lines = vec![
        Line::from(Span::styled(
            sanitize_api_text(record.title()).into_owned(),
            heading,
        )),
        Line::from(Span::styled(
            sanitize_api_text(record.description_text()).into_owned(),
            body,
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(
                sanitize_api_text(&record.author.name).into_owned(),
                body,
            ),
            Span::styled(format!("  @{}", record.author.username), meta),
        ]),
    ];

    if let Some(avatar) = &record.author.avatar_url {
        lines.push(Line::from(Span::styled(
            format!("Avatar: {}", avatar),
            meta,
        )));
    }
    if record.generated {
        lines.push(Line::from(Span::styled(
            "Generated from a prompt",
            app.style("card_generated_tag"),
        )));
    }
    if let Some(created) = record.created_at {
        lines.push(Line::from(Span::styled(
            format!("Published: {}", created.format("%b %d, %Y")),
            meta,
        )));
    }
    lines.push(Line::from(Span::styled(counts, meta)));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Image: {}", record.full_url),
        link,
    )));
    if let Some(download) = &record.download_url {
        lines.push(Line::from(Span::styled(
            format!("Download: {}", download),
            link,
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(o) Open in browser  (d) Download  (Esc) Close",
        meta,
    )));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(" Image "),
        );

    f.render_widget(paragraph, overlay);
}
