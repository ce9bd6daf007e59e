//! Background task spawning and the pagination trigger.

use crate::app::{App, AppEvent, LoginMode, View};
use crate::auth;
use crate::feed::PageRequest;
use crate::generate;
use crate::search;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Panics in spawned tasks would otherwise vanish into the runtime; here
/// they come back as `Err(message)` so the UI can report them.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            }
        })
}

/// Begin a new search: reset the feed to page 1 and dispatch the fetch.
///
/// Without an access key there is nothing to fetch; the controller is left
/// untouched so it never waits on a request that will not be issued.
pub(super) fn start_search(app: &mut App, query: String, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(access_key) = app.config.search_key() else {
        app.set_status("Search needs an access key (set UNSPLASH_ACCESS_KEY)");
        return;
    };
    let request = app.feed.submit_search(query);
    spawn_page_fetch(app, request, access_key, event_tx);
}

/// The viewport-proximity trigger: request the next page when the selection
/// is near the feed tail. Called after navigation and after each applied
/// page; the controller's re-entrancy guard and exhausted flag make
/// repeated calls harmless.
pub(super) fn request_next_page_if_near(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.view != View::Browse || !app.near_feed_end() {
        return;
    }
    let Some(access_key) = app.config.search_key() else {
        return;
    };
    if let Some(request) = app.feed.next_page() {
        spawn_page_fetch(app, request, access_key, event_tx);
    }
}

fn spawn_page_fetch(
    app: &App,
    request: PageRequest,
    access_key: secrecy::SecretString,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let client = app.http_client.clone();
    let base_url = app.config.search_base_url.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let PageRequest {
            query,
            page,
            generation,
        } = request;
        let outcome = catch_task_panic(search::search_photos(
            &client,
            &access_key,
            &query,
            page,
            base_url.as_deref(),
        ))
        .await;

        match outcome {
            Ok(result) => {
                let _ = tx
                    .send(AppEvent::PageLoaded {
                        generation,
                        page,
                        result,
                    })
                    .await;
            }
            Err(error) => {
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task: "page_fetch",
                        error,
                    })
                    .await;
            }
        }
    });
}

/// Submit the login form as a background sign-in or sign-up request.
pub(super) fn spawn_auth(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(api_key) = app.config.auth_key() else {
        app.login.error = Some("Sign-in needs an API key (set SNAPLY_AUTH_KEY).".to_string());
        return;
    };

    app.login.busy = true;
    app.login.error = None;

    let client = app.http_client.clone();
    let base_url = app.config.auth_base_url.clone();
    let mode = app.login.mode;
    let email = app.login.email.clone();
    let password = app.login.password.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let outcome = catch_task_panic(async {
            match mode {
                LoginMode::SignIn => {
                    auth::sign_in(&client, &api_key, &email, &password, base_url.as_deref()).await
                }
                LoginMode::Register => {
                    auth::sign_up(&client, &api_key, &email, &password, base_url.as_deref()).await
                }
            }
        })
        .await;

        match outcome {
            Ok(result) => {
                let _ = tx.send(AppEvent::AuthFinished { result }).await;
            }
            Err(error) => {
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task: "auth",
                        error,
                    })
                    .await;
            }
        }
    });
}

/// Kick off image generation for the prompt dialog.
///
/// The prompt has already passed the empty check in the input handler; the
/// generation client re-validates anyway before issuing a request.
pub(super) fn spawn_generate(app: &mut App, prompt: String, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(api_key) = app.config.generation_key() else {
        if let Some(dialog) = &mut app.prompt {
            dialog.error =
                Some("Generation needs an API key (set SNAPLY_GENERATION_KEY).".to_string());
            dialog.busy = false;
        }
        return;
    };

    let client = app.http_client.clone();
    let base_url = app.config.generation_base_url.clone();
    let author = app
        .session
        .as_ref()
        .map(|s| s.display_label().to_string())
        .unwrap_or_else(|| "You".to_string());
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let outcome = catch_task_panic(generate::generate_image(
            &client,
            &api_key,
            &prompt,
            &author,
            base_url.as_deref(),
        ))
        .await;

        match outcome {
            Ok(result) => {
                let _ = tx.send(AppEvent::ImageGenerated { result }).await;
            }
            Err(error) => {
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task: "generate",
                        error,
                    })
                    .await;
            }
        }
    });
}

/// Open a URL in the OS browser without blocking the event loop.
pub(super) fn open_in_browser(app: &mut App, url: &str) {
    match open::that_detached(url) {
        Ok(()) => app.set_status("Opened in browser"),
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "Failed to open browser");
            app.set_status("Could not open browser");
        }
    }
}
