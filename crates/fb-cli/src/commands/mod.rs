pub mod auth;
pub mod board;
pub mod collaborators;
pub mod funnels;
pub mod leads;
pub mod metrics;
pub mod stages;

use std::sync::Arc;

use fb_client::{ApiError, FunnelClient};
use fb_core::config::Config;
use serde::Serialize;

/// Everything a subcommand needs: the backend client, loaded config, and
/// the output mode.
pub struct Context {
    pub client: Arc<FunnelClient>,
    pub config: Config,
    pub json: bool,
}

impl Context {
    pub fn new(client: FunnelClient, config: Config, json: bool) -> Self {
        Self {
            client: Arc::new(client),
            config,
            json,
        }
    }

    /// Print `value` as pretty JSON when `--json` was given. Returns `true`
    /// if it did, so callers can skip their text output.
    pub fn emit_json<T: Serialize>(&self, value: &T) -> anyhow::Result<bool> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(self.json)
    }
}

/// Map backend errors to user-friendly messages.
pub fn friendly_error(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Transport(msg) if msg.contains("cannot connect") => anyhow::anyhow!(
            "Could not connect to the funnelboard backend. Is it running?\n  \
             (hint: check --api-url or FUNNELBOARD_API_URL)"
        ),
        ApiError::Transport(msg) if msg.contains("timed out") => {
            anyhow::anyhow!("Request timed out. The backend may be overloaded.")
        }
        ApiError::Transport(msg) => anyhow::anyhow!("API request failed: {msg}"),
        ApiError::Unauthorized => anyhow::anyhow!(
            "{}\n  (hint: run `fb login <email>`)",
            ApiError::Unauthorized
        ),
        ApiError::Rejected { status, message } => anyhow::anyhow!("{message} (HTTP {status})"),
        ApiError::Decode(msg) => anyhow::anyhow!("Unexpected response from backend: {msg}"),
    }
}

/// Pad or cut `s` to exactly `width` characters.
pub(crate) fn fit(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count > width {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    } else {
        format!("{s}{}", " ".repeat(width - count))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendly_messages() {
        let err = friendly_error(ApiError::Transport("cannot connect to backend: refused".into()));
        assert!(err.to_string().contains("Is it running?"));

        let err = friendly_error(ApiError::Unauthorized);
        assert!(err.to_string().starts_with("Session expired. Please login again."));

        let err = friendly_error(ApiError::rejected(422, "Stage name required"));
        assert_eq!(err.to_string(), "Stage name required (HTTP 422)");
    }

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
    }
}
