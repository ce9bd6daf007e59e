//! Shared utility functions.

mod text;

pub use text::{display_width, sanitize_api_text, truncate_to_width};
