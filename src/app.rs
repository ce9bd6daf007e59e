//! Central application state and background-task events.

use crate::auth::{AuthError, Session};
use crate::config::Config;
use crate::feed::FeedController;
use crate::generate::GenerateError;
use crate::search::{ImageRecord, SearchError, PER_PAGE};
use crate::theme::{StyleMap, ThemeVariant};
use anyhow::Result;
use ratatui::style::Style;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use tokio::time::Instant;

/// How close (in grid items) the selection must be to the feed tail before
/// the next page is requested. One default grid row from the end counts as
/// the viewport touching the last card.
pub const NEAR_END_ITEMS: usize = 4;

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy with loop detection and limited hops.
///
/// Image CDNs redirect freely; identity and search APIs should not. Three
/// hops covers the legitimate cases.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

// ============================================================================
// Views and Dialogs
// ============================================================================

/// Current top-level view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Sign-in / sign-up form.
    Login,
    /// The image grid.
    Browse,
}

/// Which login form flavor is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    SignIn,
    Register,
}

/// Which login input has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

/// State for the sign-in / sign-up form.
pub struct LoginForm {
    pub mode: LoginMode,
    pub email: String,
    pub password: String,
    pub field: LoginField,
    /// Inline error from the last attempt, mapped through the auth message table.
    pub error: Option<String>,
    /// True while a request is outstanding; suppresses double submission.
    pub busy: bool,
}

impl LoginForm {
    fn new() -> Self {
        Self {
            mode: LoginMode::SignIn,
            email: String::new(),
            password: String::new(),
            field: LoginField::Email,
            error: None,
            busy: false,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::Register,
            LoginMode::Register => LoginMode::SignIn,
        };
        self.error = None;
    }

    pub fn active_input_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

/// State for the image-generation prompt dialog.
pub struct PromptDialog {
    pub input: String,
    /// Inline validation or request error.
    pub error: Option<String>,
    pub busy: bool,
}

impl PromptDialog {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            error: None,
            busy: false,
        }
    }
}

impl Default for PromptDialog {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Background task events
// ============================================================================

/// Events from background tasks, delivered over the app channel.
pub enum AppEvent {
    /// A search page fetch completed (success or failure).
    ///
    /// `generation` and `page` echo the request so the feed controller can
    /// discard responses from a superseded search.
    PageLoaded {
        generation: u64,
        page: u32,
        result: Result<Vec<ImageRecord>, SearchError>,
    },
    /// Sign-in or sign-up finished.
    AuthFinished {
        result: Result<Session, AuthError>,
    },
    /// Image generation finished.
    ImageGenerated {
        result: Result<ImageRecord, GenerateError>,
    },
    /// A background task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
pub struct App {
    pub http_client: reqwest::Client,
    pub config: Config,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    // Feed
    pub feed: FeedController,

    // UI state
    pub view: View,
    pub login: LoginForm,
    pub session: Option<Session>,
    /// Grid selection index into the feed.
    pub selected: usize,
    /// Detail overlay for the selected record.
    pub detail_open: bool,
    pub search_mode: bool,
    pub search_input: String,
    /// Generation dialog, when open.
    pub prompt: Option<PromptDialog>,
    pub show_help: bool,

    /// Column count from the last grid render; used for row-wise navigation
    /// and the near-end check before the first frame defaults to 1.
    pub last_grid_columns: usize,

    /// Status message with expiry — Cow avoids allocation for static literals.
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders.
    pub needs_redraw: bool,

    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or(ThemeVariant::Dark);
        let seed_query = config.default_query.clone();

        Ok(Self {
            http_client,
            config,
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            feed: FeedController::new(seed_query, PER_PAGE),
            view: View::Login,
            login: LoginForm::new(),
            session: None,
            selected: 0,
            detail_open: false,
            search_mode: false,
            search_input: String::new(),
            prompt: None,
            show_help: false,
            last_grid_columns: 1,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        })
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch theme at runtime and mark the UI for a full redraw.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant. Returns its name for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    /// Set status message (auto-expires after 3 seconds).
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if older than 3 seconds.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Currently selected record (bounds-checked).
    pub fn selected_record(&self) -> Option<&ImageRecord> {
        self.feed.records().get(self.selected)
    }

    /// Clamp the grid selection after the feed changes.
    pub fn clamp_selection(&mut self) {
        self.selected = if self.feed.is_empty() {
            0
        } else {
            self.selected.min(self.feed.len() - 1)
        };
    }

    /// Whether the selection sits close enough to the feed tail that the
    /// next page should load. This is the viewport-proximity signal: checked
    /// after navigation, after every feed change, and whenever loading
    /// clears, mirroring an on-screen marker on the last card.
    pub fn near_feed_end(&self) -> bool {
        if self.feed.is_empty() {
            return false;
        }
        let threshold = NEAR_END_ITEMS.max(self.last_grid_columns);
        self.selected + threshold >= self.feed.len()
    }

    // -- Grid navigation ------------------------------------------------

    pub fn nav_left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn nav_right(&mut self) {
        if !self.feed.is_empty() {
            self.selected = (self.selected + 1).min(self.feed.len() - 1);
        }
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(self.last_grid_columns.max(1));
    }

    pub fn nav_down(&mut self) {
        if !self.feed.is_empty() {
            let step = self.last_grid_columns.max(1);
            self.selected = (self.selected + step).min(self.feed.len() - 1);
        }
    }

    /// Drop the session and return to the login form.
    pub fn logout(&mut self) {
        self.session = None;
        self.view = View::Login;
        self.login = LoginForm::new();
        self.detail_open = false;
        self.prompt = None;
        self.search_mode = false;
        self.needs_redraw = true;
        tracing::info!("Signed out");
    }
}
