//! Identity provider client.
//!
//! Sign-in and sign-up are delegated entirely to a hosted identity REST
//! service (Identity-Toolkit-shaped endpoints). The provider's stringly-typed
//! error codes are folded into a closed [`AuthError`] enum with an explicit
//! user-facing message table; nothing downstream ever matches on raw codes.
//!
//! The resulting [`Session`] lives in memory only and is dropped on logout.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// Error Types
// ============================================================================

/// Closed set of sign-in/sign-up failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Email already registered")]
    EmailInUse,
    #[error("Password too weak")]
    WeakPassword,
    #[error("Too many attempts")]
    TooManyAttempts,
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// User-facing message shown inline in the login form.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Incorrect email or password.".to_string(),
            AuthError::InvalidEmail => "Invalid email address.".to_string(),
            AuthError::EmailInUse => "Email already registered. Try signing in.".to_string(),
            AuthError::WeakPassword => "Password should be at least 6 characters.".to_string(),
            AuthError::TooManyAttempts => "Too many attempts. Try again in a moment.".to_string(),
            AuthError::Timeout => "Sign-in timed out. Check your connection.".to_string(),
            AuthError::Network(_) => "Could not reach the sign-in service.".to_string(),
            AuthError::Provider(code) => format!("Sign-in failed ({}).", code),
        }
    }
}

/// Map a provider error code to an [`AuthError`] kind.
///
/// Codes sometimes arrive with a trailing explanation
/// ("WEAK_PASSWORD : Password should be at least 6 characters"), so matching
/// is on the leading token.
fn classify_code(code: &str) -> AuthError {
    let token = code.split_whitespace().next().unwrap_or("");
    match token {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthError::InvalidCredentials
        }
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "WEAK_PASSWORD" | "MISSING_PASSWORD" => AuthError::WeakPassword,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        _ => AuthError::Provider(token.to_string()),
    }
}

// ============================================================================
// Session
// ============================================================================

/// An authenticated session, held in memory for the lifetime of the run.
#[derive(Clone)]
pub struct Session {
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub local_id: String,
    id_token: SecretString,
}

impl Session {
    /// Name to show in the UI: display name when set, else the email.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.email)
    }

    /// Avatar reference, falling back to a generated placeholder derived
    /// from the display label.
    pub fn avatar_or_placeholder(&self) -> String {
        match &self.avatar_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "https://ui-avatars.com/api/?name={}",
                urlencode(self.display_label())
            ),
        }
    }

    #[cfg(test)]
    pub(crate) fn token_for_test(&self) -> &str {
        self.id_token.expose_secret()
    }
}

/// Mask the token in Debug output.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("local_id", &self.local_id)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

/// Minimal percent-encoding for the avatar placeholder query parameter.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "profilePicture", default)]
    profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

// ============================================================================
// Operations
// ============================================================================

/// Sign in with email and password.
pub async fn sign_in(
    client: &reqwest::Client,
    api_key: &SecretString,
    email: &str,
    password: &str,
    base_url: Option<&str>,
) -> Result<Session, AuthError> {
    call_accounts(
        client,
        api_key,
        "accounts:signInWithPassword",
        email,
        password,
        base_url,
    )
    .await
}

/// Create a new account with email and password.
///
/// The provider signs the new account in atomically, so the result is a
/// ready-to-use session.
pub async fn sign_up(
    client: &reqwest::Client,
    api_key: &SecretString,
    email: &str,
    password: &str,
    base_url: Option<&str>,
) -> Result<Session, AuthError> {
    call_accounts(client, api_key, "accounts:signUp", email, password, base_url).await
}

async fn call_accounts(
    client: &reqwest::Client,
    api_key: &SecretString,
    endpoint: &str,
    email: &str,
    password: &str,
    base_url: Option<&str>,
) -> Result<Session, AuthError> {
    let base = base_url.unwrap_or(DEFAULT_BASE_URL);
    let url = format!("{}/v1/{}", base.trim_end_matches('/'), endpoint);

    tracing::debug!(endpoint = %endpoint, "Calling identity provider");

    let request = client
        .post(&url)
        .query(&[("key", api_key.expose_secret())])
        .json(&serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        }));

    let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
        .await
        .map_err(|_| AuthError::Timeout)?
        .map_err(AuthError::Network)?;

    let status = response.status();
    if !status.is_success() {
        // Provider errors carry a code in the body; fall back to the status
        let body = response.text().await.unwrap_or_default();
        let code = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP_{}", status.as_u16()));
        tracing::warn!(endpoint = %endpoint, code = %code, "Identity provider rejected request");
        return Err(classify_code(&code));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AuthError::Provider(format!("malformed response: {}", e)))?;

    Ok(Session {
        email: token.email.unwrap_or_else(|| email.to_string()),
        display_name: token.display_name,
        avatar_url: token.profile_picture,
        local_id: token.local_id,
        id_token: SecretString::from(token.id_token),
    })
}
