//! Image card grid widget.
//!
//! Lays the feed out as a grid of fixed-size cards, masonry-style columns
//! collapsed to uniform rows for the terminal. Scrolling follows the
//! selection; the column count feeds back into the app for row-wise
//! navigation and the end-of-feed proximity check.

use crate::app::App;
use crate::util::{sanitize_api_text, truncate_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Minimum card width in columns (including borders).
const CARD_WIDTH: u16 = 28;
/// Card height in rows (including borders).
const CARD_HEIGHT: u16 = 5;
/// Upper bound on columns, mirroring the widest web layout.
const MAX_COLUMNS: usize = 5;

/// Render the image grid panel.
pub(super) fn render(f: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.search_mode {
        format!(" Search: {}_ ", app.search_input)
    } else if let Some(session) = &app.session {
        format!(
            " {} — {} images · {} ",
            app.feed.query(),
            app.feed.len(),
            session.display_label()
        )
    } else {
        format!(" {} — {} images ", app.feed.query(), app.feed.len())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border"))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < CARD_WIDTH || inner.height < CARD_HEIGHT {
        return;
    }

    let columns = ((inner.width / CARD_WIDTH) as usize).clamp(1, MAX_COLUMNS);
    app.last_grid_columns = columns;

    if app.feed.is_empty() {
        let placeholder = if app.feed.is_loading() {
            "Loading..."
        } else {
            "Start searching\n\nPress / and type something to see images"
        };
        let msg = Paragraph::new(placeholder)
            .alignment(Alignment::Center)
            .style(app.style("grid_placeholder"));
        // Drop the message roughly a third of the way down
        let y = inner.y + inner.height / 3;
        let msg_area = Rect::new(inner.x, y, inner.width, inner.height - (y - inner.y));
        f.render_widget(msg, msg_area);
        return;
    }

    let card_width = inner.width / columns as u16;
    let rows_visible = (inner.height / CARD_HEIGHT) as usize;
    let total_rows = app.feed.len().div_ceil(columns);
    let selected_row = app.selected / columns;

    // Keep the selection centered where possible
    let max_first = total_rows.saturating_sub(rows_visible);
    let first_row = selected_row
        .saturating_sub(rows_visible / 2)
        .min(max_first);

    for visible_row in 0..rows_visible {
        let row = first_row + visible_row;
        if row >= total_rows {
            break;
        }
        for col in 0..columns {
            let index = row * columns + col;
            let Some(record) = app.feed.records().get(index) else {
                break;
            };

            let cell = Rect::new(
                inner.x + col as u16 * card_width,
                inner.y + visible_row as u16 * CARD_HEIGHT,
                card_width,
                CARD_HEIGHT,
            );
            render_card(f, app, cell, index, record);
        }
    }
}

fn render_card(
    f: &mut Frame,
    app: &App,
    cell: Rect,
    index: usize,
    record: &crate::search::ImageRecord,
) {
    let selected = index == app.selected;
    let border_style = if selected {
        app.style("card_border_selected")
    } else {
        app.style("card_border")
    };

    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    let inner = block.inner(cell);
    f.render_widget(block, cell);
    if inner.width < 4 || inner.height < 1 {
        return;
    }

    let text_width = inner.width as usize;
    let title = sanitize_api_text(record.title());
    let author = sanitize_api_text(&record.author.name);

    let mut meta_spans: Vec<Span> = Vec::new();
    if record.generated {
        meta_spans.push(Span::styled("AI ", app.style("card_generated_tag")));
    }
    if let Some(likes) = record.likes {
        meta_spans.push(Span::styled(
            format!("{} likes", likes),
            app.style("card_meta"),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&title, text_width).into_owned(),
            app.style("card_title"),
        )),
        Line::from(Span::styled(
            truncate_to_width(&format!("by {}", author), text_width).into_owned(),
            app.style("card_author"),
        )),
        Line::from(meta_spans),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}
