use std::sync::RwLock;
use std::time::Duration;

use fb_core::config::Config;
use fb_core::error::ApiError;
use fb_core::session_store::SessionStore;
use fb_telemetry::tracing_setup::{RequestTrace, REQUEST_ID_HEADER};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn, Instrument};

/// Reusable async client + base URL + bearer token.
///
/// The token lives in memory and, when a [`SessionStore`] is attached, on
/// disk as well. A 401 from any endpoint clears both.
pub struct FunnelClient {
    http: reqwest::Client,
    base: String,
    token: RwLock<Option<String>>,
    store: Option<SessionStore>,
}

impl FunnelClient {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            store: None,
        })
    }

    /// Build a client from configuration, resuming any persisted session.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = Self::new(
            &config.api.base_url,
            Duration::from_secs(config.api.request_timeout_secs),
        )?;
        Ok(client.with_session_store(SessionStore::new(config.session.resolved_token_path())))
    }

    /// Persist the token in `store` and pick up whatever it already holds.
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        if let Some(token) = store.token() {
            *self.token.write().expect("token lock poisoned") = Some(token);
        }
        self.store = Some(store);
        self
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(token);
        self
    }

    /// Replace the in-memory token. The session store is left alone.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("token lock poisoned") = Some(token.into());
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn session_store(&self) -> Option<&SessionStore> {
        self.store.as_ref()
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Drop the in-memory token and the persisted session.
    pub fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                warn!(path = %store.path().display(), error = %e, "failed to clear stored session");
            }
        }
    }

    // -- request plumbing ---------------------------------------------------

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, format!("{}{}", self.base, path));
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send `req` and return the raw body of a 2xx response.
    pub(crate) async fn send(&self, operation: &str, req: RequestBuilder) -> Result<String, ApiError> {
        let trace = RequestTrace::start(operation);
        let span = trace.span();
        async move {
            let resp = req
                .header(REQUEST_ID_HEADER, trace.trace_id())
                .send()
                .await
                .map_err(transport)?;
            let status = resp.status();

            if status == StatusCode::UNAUTHORIZED {
                warn!("backend rejected session, clearing token");
                self.clear_token();
                return Err(ApiError::Unauthorized);
            }

            let body = resp.text().await.map_err(transport)?;
            if !status.is_success() {
                warn!(status = status.as_u16(), "request rejected");
                return Err(ApiError::rejected(status.as_u16(), &body));
            }
            debug!(
                status = status.as_u16(),
                bytes = body.len(),
                elapsed_ms = trace.elapsed_ms() as u64,
                "request ok"
            );
            Ok(body)
        }
        .instrument(span)
        .await
    }

    pub(crate) async fn json<T: DeserializeOwned>(&self, operation: &str, req: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(operation, req).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{operation}: {e}")))
    }

    /// For endpoints whose response body, if any, is ignored.
    pub(crate) async fn empty(&self, operation: &str, req: RequestBuilder) -> Result<(), ApiError> {
        self.send(operation, req).await.map(|_| ())
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        ApiError::Transport(format!("cannot connect to backend: {e}"))
    } else {
        ApiError::Transport(e.to_string())
    }
}
