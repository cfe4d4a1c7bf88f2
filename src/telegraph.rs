//! HTTP client for the Telegraph-style page-publishing API.
//!
//! The service exposes two calls this crate needs: `createAccount` (returns
//! an access token) and `createPage` (returns the path of the new page).
//! Both answer with the same JSON envelope — `{"ok": true, "result": …}` on
//! success, `{"ok": false, "error": "…"}` otherwise — and rate limiting
//! arrives in-band as the error string `FLOOD_WAIT_<seconds>` rather than an
//! HTTP 429, so the error string is parsed here and surfaced as a typed
//! [`ApiError::FloodWait`].
//!
//! The [`PageService`] trait is the seam between the wire client and the
//! session logic: the session's bootstrap and flood-control behaviour is
//! tested against an in-memory implementation, and callers with exotic needs
//! (a proxy, a fake for a dry run) can supply their own.

use crate::error::{ApiError, PublishError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Identity fields sent with registration and page creation.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Account short name; not displayed on pages.
    pub short_name: String,
    /// Author name displayed below the page title.
    pub author_name: String,
    /// Author link attached to the displayed name. May be empty.
    pub author_url: String,
}

/// One page-creation request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub title: &'a str,
    pub author_name: &'a str,
    pub author_url: &'a str,
    pub html_content: &'a str,
}

/// The two remote calls the session depends on.
///
/// Implementations perform exactly one attempt per call; retry policy
/// (flood-control waits) lives in [`crate::session::Session`].
#[allow(async_fn_in_trait)]
pub trait PageService {
    /// Register an account and return its access token.
    async fn create_account(&self, identity: &Identity) -> Result<String, ApiError>;

    /// Create a page under `access_token` and return its path component.
    async fn create_page(
        &self,
        access_token: &str,
        request: &PageRequest<'_>,
    ) -> Result<String, ApiError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountPayload {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagePayload {
    path: String,
}

static FLOOD_WAIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FLOOD_WAIT_(\d+)$").expect("flood-wait pattern is valid"));

/// Map a service error string to a typed error.
///
/// `FLOOD_WAIT_<n>` is the service's in-band rate-limit signal; anything
/// else is a plain rejection.
fn classify_error(method: &'static str, error: String) -> ApiError {
    if let Some(caps) = FLOOD_WAIT.captures(error.trim()) {
        if let Ok(seconds) = caps[1].parse::<u64>() {
            return ApiError::FloodWait { seconds };
        }
    }
    ApiError::Rejected {
        method,
        message: error,
    }
}

/// Reqwest-backed [`PageService`] implementation.
pub struct TelegraphClient {
    http: reqwest::Client,
    api_base: String,
}

impl TelegraphClient {
    /// A client for `https://api.<domain>` with a per-request timeout.
    pub fn new(domain: &str, timeout_secs: u64) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PublishError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: format!("https://api.{domain}"),
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &'static str,
        form: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.api_base, method);
        debug!(method, "calling publishing service");

        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                method,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport {
                method,
                detail: format!("HTTP {status}"),
            });
        }

        let envelope: ApiEnvelope<T> =
            response.json().await.map_err(|e| ApiError::Transport {
                method,
                detail: format!("invalid response body: {e}"),
            })?;

        if !envelope.ok {
            let error = envelope.error.unwrap_or_else(|| "unknown error".to_string());
            return Err(classify_error(method, error));
        }

        envelope.result.ok_or(ApiError::Transport {
            method,
            detail: "ok response carried no result".to_string(),
        })
    }
}

impl PageService for TelegraphClient {
    async fn create_account(&self, identity: &Identity) -> Result<String, ApiError> {
        let payload: AccountPayload = self
            .call(
                "createAccount",
                &[
                    ("short_name", identity.short_name.as_str()),
                    ("author_name", identity.author_name.as_str()),
                    ("author_url", identity.author_url.as_str()),
                ],
            )
            .await?;

        payload.access_token.ok_or(ApiError::Transport {
            method: "createAccount",
            detail: "response carried no access_token".to_string(),
        })
    }

    async fn create_page(
        &self,
        access_token: &str,
        request: &PageRequest<'_>,
    ) -> Result<String, ApiError> {
        let payload: PagePayload = self
            .call(
                "createPage",
                &[
                    ("access_token", access_token),
                    ("title", request.title),
                    ("author_name", request.author_name),
                    ("author_url", request.author_url),
                    ("html_content", request.html_content),
                    ("return_content", "false"),
                ],
            )
            .await?;

        Ok(payload.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_wait_is_parsed() {
        match classify_error("createPage", "FLOOD_WAIT_23".into()) {
            ApiError::FloodWait { seconds } => assert_eq!(seconds, 23),
            other => panic!("expected FloodWait, got {other:?}"),
        }
    }

    #[test]
    fn flood_wait_tolerates_surrounding_whitespace() {
        assert!(matches!(
            classify_error("createPage", " FLOOD_WAIT_5 ".into()),
            ApiError::FloodWait { seconds: 5 }
        ));
    }

    #[test]
    fn non_flood_errors_are_rejections() {
        match classify_error("createPage", "CONTENT_TEXT_REQUIRED".into()) {
            ApiError::Rejected { method, message } => {
                assert_eq!(method, "createPage");
                assert_eq!(message, "CONTENT_TEXT_REQUIRED");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn flood_wait_without_number_is_rejection() {
        assert!(matches!(
            classify_error("createPage", "FLOOD_WAIT_".into()),
            ApiError::Rejected { .. }
        ));
    }

    #[test]
    fn envelope_parses_success_and_error() {
        let ok: ApiEnvelope<PagePayload> =
            serde_json::from_str(r#"{"ok":true,"result":{"path":"Shots-08-06"}}"#).unwrap();
        assert!(ok.ok);
        assert_eq!(ok.result.unwrap().path, "Shots-08-06");

        let err: ApiEnvelope<PagePayload> =
            serde_json::from_str(r#"{"ok":false,"error":"FLOOD_WAIT_3"}"#).unwrap();
        assert!(!err.ok);
        assert_eq!(err.error.as_deref(), Some("FLOOD_WAIT_3"));
    }
}
