//! Keybinding help overlay.

use crate::app::App;
use ratatui::{
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::centered_rect;

const HELP_TEXT: &str = "\
Navigation
  h/l, Left/Right   move selection
  j/k, Down/Up      move by row
  Home / End        first / last image

Images
  Enter, v          open detail view
  o                 open image in browser
  d                 open download link (detail view)

Search & generate
  /                 edit the search query
  r                 re-run the current search
  g                 generate an image from a prompt

Other
  t                 cycle theme
  L                 sign out
  ?                 toggle this help
  q                 quit";

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    let overlay = centered_rect(area, 48, 24);
    if overlay.width < 30 || overlay.height < 8 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(HELP_TEXT).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(" Help "),
    );
    f.render_widget(paragraph, overlay);
}
