//! Theme system for the TUI.
//!
//! Semantic color roles resolved to ratatui `Style` values through a
//! string-keyed `StyleMap`. `ThemeVariant` selects between the Dark and
//! Light palettes and can be cycled at runtime.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a config string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette — semantic roles to Style
// ============================================================================

/// A complete palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Image grid --
    pub card_border: Style,
    pub card_border_selected: Style,
    pub card_title: Style,
    pub card_author: Style,
    pub card_meta: Style,
    pub card_generated_tag: Style,
    pub grid_placeholder: Style,

    // -- Detail overlay --
    pub detail_heading: Style,
    pub detail_body: Style,
    pub detail_metadata: Style,
    pub detail_link: Style,

    // -- Forms (login, search, generation prompt) --
    pub form_label: Style,
    pub form_input: Style,
    pub form_input_focused: Style,
    pub form_error: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            card_border: Style::default().fg(Color::DarkGray),
            card_border_selected: Style::default().fg(Color::Cyan),
            card_title: Style::default().add_modifier(Modifier::BOLD),
            card_author: Style::default().fg(Color::Gray),
            card_meta: Style::default().fg(Color::DarkGray),
            card_generated_tag: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            grid_placeholder: Style::default().fg(Color::DarkGray),

            detail_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default(),
            detail_metadata: Style::default().fg(Color::DarkGray),
            detail_link: Style::default().fg(Color::Blue),

            form_label: Style::default().fg(Color::Gray),
            form_input: Style::default(),
            form_input_focused: Style::default().fg(Color::White).bg(Color::DarkGray),
            form_error: Style::default().fg(Color::Red),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
        }
    }

    fn light() -> Self {
        Self {
            card_border: Style::default().fg(Color::Gray),
            card_border_selected: Style::default().fg(Color::Blue),
            card_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            card_author: Style::default().fg(Color::DarkGray),
            card_meta: Style::default().fg(Color::DarkGray),
            card_generated_tag: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            grid_placeholder: Style::default().fg(Color::DarkGray),

            detail_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default().fg(Color::Black),
            detail_metadata: Style::default().fg(Color::DarkGray),
            detail_link: Style::default().fg(Color::Blue),

            form_label: Style::default().fg(Color::DarkGray),
            form_input: Style::default().fg(Color::Black),
            form_input_focused: Style::default().fg(Color::White).bg(Color::Blue),
            form_error: Style::default().fg(Color::Red),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Style Map — string-keyed lookup
// ============================================================================

/// String-keyed style lookup built from a `ColorPalette`.
///
/// Role names (e.g. `"card_title"`) resolve to concrete styles at render
/// time; unknown roles fall back to `Style::default()`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let mut map = HashMap::new();
        map.insert("card_border", p.card_border);
        map.insert("card_border_selected", p.card_border_selected);
        map.insert("card_title", p.card_title);
        map.insert("card_author", p.card_author);
        map.insert("card_meta", p.card_meta);
        map.insert("card_generated_tag", p.card_generated_tag);
        map.insert("grid_placeholder", p.grid_placeholder);
        map.insert("detail_heading", p.detail_heading);
        map.insert("detail_body", p.detail_body);
        map.insert("detail_metadata", p.detail_metadata);
        map.insert("detail_link", p.detail_link);
        map.insert("form_label", p.form_label);
        map.insert("form_input", p.form_input);
        map.insert("form_input_focused", p.form_input_focused);
        map.insert("form_error", p.form_error);
        map.insert("status_bar", p.status_bar);
        map.insert("panel_border", p.panel_border);
        map.insert("panel_border_focused", p.panel_border_focused);
        Self { map }
    }

    /// Resolve a role name to its style. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}
