//! Application event handling.
//!
//! Processes background task completion events: search page fetches,
//! sign-in results, and image generation outcomes.

use crate::app::{App, AppEvent, View};
use tokio::sync::mpsc;

use super::helpers;

/// Handle an event from a background task and update application state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::PageLoaded {
            generation,
            page,
            result,
        } => match result {
            Ok(records) => {
                app.feed.apply_page(generation, page, records);
                app.clamp_selection();
                // Re-arm the proximity trigger: if the selection still sits at
                // the tail, the following page loads without further input.
                helpers::request_next_page_if_near(app, event_tx);
            }
            Err(e) => {
                // Silent degradation: the grid just stops growing until the
                // next trigger retries the same page.
                tracing::warn!(error = %e, page = page, "Page fetch failed");
                app.feed.fail_page(generation, page);
            }
        },
        AppEvent::AuthFinished { result } => match result {
            Ok(session) => {
                tracing::info!(email = %session.email, "Signed in");
                app.set_status(format!("Signed in as {}", session.display_label()));
                app.session = Some(session);
                app.login.busy = false;
                app.login.password.clear();
                app.login.error = None;
                app.view = View::Browse;
                app.selected = 0;
                // The grid opens on the seed query
                helpers::start_search(app, app.config.default_query.clone(), event_tx);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-in failed");
                app.login.busy = false;
                app.login.error = Some(e.user_message());
            }
        },
        AppEvent::ImageGenerated { result } => match result {
            Ok(record) => {
                tracing::info!(id = %record.id, "Generated image added to feed");
                app.feed.prepend(record);
                app.selected = 0;
                app.prompt = None;
                app.set_status("Generated image added to the feed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Image generation failed");
                if let Some(dialog) = &mut app.prompt {
                    dialog.busy = false;
                    dialog.error = Some(e.user_message());
                }
            }
        },
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            // The dead task never reported back; release whatever in-flight
            // flag it owned so the UI does not wedge, mirroring the error
            // branches above.
            match task {
                "page_fetch" => app.feed.abort_loading(),
                "auth" => {
                    app.login.busy = false;
                    app.login.error = Some("Internal error. Try again.".to_string());
                }
                "generate" => {
                    if let Some(dialog) = &mut app.prompt {
                        dialog.busy = false;
                        dialog.error = Some("Internal error. Try again.".to_string());
                    }
                }
                _ => {}
            }
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PromptDialog;
    use crate::auth::AuthError;
    use crate::config::Config;
    use crate::generate::GenerateError;
    use crate::search::{Author, ImageRecord, SearchError};

    fn test_app() -> App {
        App::new(Config::default()).unwrap()
    }

    fn record(id: &str) -> ImageRecord {
        ImageRecord {
            id: id.to_string(),
            description: None,
            alt_description: None,
            preview_url: "p".to_string(),
            full_url: "f".to_string(),
            download_url: None,
            author: Author {
                name: "A".to_string(),
                username: "a".to_string(),
                avatar_url: None,
            },
            likes: None,
            views: None,
            created_at: None,
            generated: false,
        }
    }

    fn channel() -> tokio::sync::mpsc::Sender<AppEvent> {
        let (tx, _rx) = tokio::sync::mpsc::channel(8);
        tx
    }

    #[tokio::test]
    async fn test_page_loaded_applies_records() {
        let mut app = test_app();
        let req = app.feed.submit_search("q");

        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                generation: req.generation,
                page: req.page,
                result: Ok(vec![record("a"), record("b")]),
            },
            &channel(),
        );

        assert_eq!(app.feed.len(), 2);
        assert!(!app.feed.is_loading());
    }

    #[tokio::test]
    async fn test_page_failure_is_silent() {
        let mut app = test_app();
        let req = app.feed.submit_search("q");

        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                generation: req.generation,
                page: req.page,
                result: Err(SearchError::HttpStatus(500)),
            },
            &channel(),
        );

        assert!(app.feed.is_empty());
        assert!(!app.feed.is_loading());
        // No user-facing message for a failed page fetch
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_auth_failure_sets_inline_error() {
        let mut app = test_app();
        app.login.busy = true;

        handle_app_event(
            &mut app,
            AppEvent::AuthFinished {
                result: Err(AuthError::InvalidCredentials),
            },
            &channel(),
        );

        assert!(!app.login.busy);
        assert_eq!(
            app.login.error.as_deref(),
            Some("Incorrect email or password.")
        );
        assert_eq!(app.view, View::Login);
    }

    #[tokio::test]
    async fn test_generated_image_prepended_and_dialog_closed() {
        let mut app = test_app();
        let req = app.feed.submit_search("q");
        app.feed
            .apply_page(req.generation, req.page, vec![record("existing")]);
        app.selected = 0;
        app.prompt = Some(PromptDialog::new());

        let mut generated = record("generated-1");
        generated.generated = true;
        handle_app_event(
            &mut app,
            AppEvent::ImageGenerated {
                result: Ok(generated),
            },
            &channel(),
        );

        assert!(app.prompt.is_none());
        assert_eq!(app.feed.records()[0].id, "generated-1");
        assert_eq!(app.feed.len(), 2);
    }

    #[tokio::test]
    async fn test_panicked_fetch_releases_loading_flag() {
        let mut app = test_app();
        let _req = app.feed.submit_search("q");
        assert!(app.feed.is_loading());

        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "page_fetch",
                error: "boom".to_string(),
            },
            &channel(),
        );

        assert!(!app.feed.is_loading());
    }

    #[tokio::test]
    async fn test_panicked_auth_releases_login_form() {
        let mut app = test_app();
        app.login.busy = true;

        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "auth",
                error: "boom".to_string(),
            },
            &channel(),
        );

        // The form is usable again and shows the failure inline (the login
        // view has no status bar)
        assert!(!app.login.busy);
        assert!(app.login.error.is_some());
    }

    #[tokio::test]
    async fn test_panicked_generation_releases_dialog() {
        let mut app = test_app();
        let mut dialog = PromptDialog::new();
        dialog.busy = true;
        app.prompt = Some(dialog);

        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "generate",
                error: "boom".to_string(),
            },
            &channel(),
        );

        let dialog = app.prompt.as_ref().unwrap();
        assert!(!dialog.busy);
        assert!(dialog.error.is_some());
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_dialog_open() {
        let mut app = test_app();
        let mut dialog = PromptDialog::new();
        dialog.busy = true;
        app.prompt = Some(dialog);

        handle_app_event(
            &mut app,
            AppEvent::ImageGenerated {
                result: Err(GenerateError::NoImage),
            },
            &channel(),
        );

        let dialog = app.prompt.as_ref().unwrap();
        assert!(!dialog.busy);
        assert!(dialog.error.is_some());
    }
}
