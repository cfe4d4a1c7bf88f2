//! Account session: token bootstrap and flood-control-aware page creation.
//!
//! ## Token lifecycle
//!
//! A [`Session`] is constructed once per process. At construction it reads
//! the persisted token (if a store is attached); [`Session::ensure_ready`]
//! then either does nothing or performs exactly one registration call,
//! adopts the returned token, and hands it to the store. The token is never
//! mutated afterwards, so everything downstream can treat the session as
//! read-only.
//!
//! A registration that yields no usable token fails the run immediately.
//! Continuing unauthenticated would only defer the failure to the later
//! `createPage` call with a less useful error.
//!
//! ## Flood control
//!
//! The publishing service rate-limits page creation with an in-band
//! `FLOOD_WAIT_<n>` error carrying a mandatory wait. [`Session::create_page`]
//! honours every such signal in an explicit loop — sleep exactly `n`
//! seconds, retry the same call — with no upper bound on iterations. An
//! offline batch job prefers eventual success over fast failure here; every
//! wait is logged so a stuck run is at least diagnosable. Any other API
//! error propagates unretried.

use crate::credentials::TokenStore;
use crate::error::{ApiError, PublishError};
use crate::telegraph::{Identity, PageRequest, PageService};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};
use uuid::Uuid;

/// A random 8-char hex short name for throwaway accounts.
pub fn random_short_name() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// The process's identity against the publishing service.
pub struct Session<S> {
    service: S,
    store: Option<TokenStore>,
    identity: Identity,
    access_token: Option<String>,
}

impl<S: PageService> Session<S> {
    /// Build a session, loading any persisted token from `store`.
    ///
    /// Pass `store: None` to run stateless (register per process, persist
    /// nothing).
    pub fn new(service: S, store: Option<TokenStore>, identity: Identity) -> Self {
        let access_token = store.as_ref().and_then(|s| s.load());
        Self {
            service,
            store,
            identity,
            access_token,
        }
    }

    /// Whether the session already holds a trusted token.
    pub fn is_ready(&self) -> bool {
        self.access_token.is_some()
    }

    /// The identity this session registers and publishes under.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Make the session ready to create pages. Idempotent.
    ///
    /// No-op when a token is already held (persisted or from an earlier call
    /// in this process). Otherwise performs one registration call; the
    /// returned token is adopted for all subsequent calls and persisted
    /// best-effort.
    pub async fn ensure_ready(&mut self) -> Result<(), PublishError> {
        if self.access_token.is_some() {
            return Ok(());
        }

        info!(short_name = %self.identity.short_name, "registering publishing account");
        let token = self
            .service
            .create_account(&self.identity)
            .await
            .map_err(|e| PublishError::RegistrationFailed {
                reason: e.to_string(),
            })?;

        if token.is_empty() {
            return Err(PublishError::RegistrationFailed {
                reason: "service returned an empty access token".to_string(),
            });
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&token) {
                // The in-memory token still serves this run; only the next
                // process pays the cost of re-registering.
                warn!(path = %store.path().display(), "could not persist access token: {e}");
            }
        }

        info!(short_name = %self.identity.short_name, "publishing account ready");
        self.access_token = Some(token);
        Ok(())
    }

    /// Create a page and return its path component.
    ///
    /// Sleeps out every flood-control signal the service sends and retries
    /// the identical call; other errors propagate immediately.
    pub async fn create_page(&self, title: &str, html_content: &str) -> Result<String, PublishError> {
        let access_token = self
            .access_token
            .as_deref()
            .ok_or(PublishError::NotRegistered)?;

        let request = PageRequest {
            title,
            author_name: &self.identity.author_name,
            author_url: &self.identity.author_url,
            html_content,
        };

        let mut waits: u32 = 0;
        loop {
            match self.service.create_page(access_token, &request).await {
                Ok(path) => return Ok(path),
                Err(ApiError::FloodWait { seconds }) => {
                    waits += 1;
                    warn!(seconds, waits, "flood control on createPage; sleeping");
                    sleep(Duration::from_secs(seconds)).await;
                }
                Err(e) => {
                    return Err(PublishError::Api {
                        message: e.to_string(),
                    })
                }
            }
        }
    }
}
