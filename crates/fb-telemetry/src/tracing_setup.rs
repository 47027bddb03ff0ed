use std::time::Instant;

use tracing::Span;
use uuid::Uuid;

/// Header used to correlate a client request with backend logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate an OpenTelemetry-compatible trace ID (32 hex characters).
pub fn generate_trace_id() -> String {
    Uuid::new_v4().as_simple().to_string()
}

/// Generate a span ID (16 hex characters).
pub fn generate_span_id() -> String {
    let mut id = Uuid::new_v4().as_simple().to_string();
    id.truncate(16);
    id
}

/// One outbound backend call: its trace id, the span its logs go under, and
/// when it started.
#[derive(Debug)]
pub struct RequestTrace {
    trace_id: String,
    span: Span,
    started: Instant,
}

impl RequestTrace {
    /// Open a trace for `operation` (e.g. `leads.move`).
    pub fn start(operation: &str) -> Self {
        let trace_id = generate_trace_id();
        let span = tracing::info_span!(
            "api_request",
            operation = %operation,
            trace_id = %trace_id,
            span_id = %generate_span_id(),
        );
        Self {
            trace_id,
            span,
            started: Instant::now(),
        }
    }

    /// Value sent in [`REQUEST_ID_HEADER`].
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_id_format() {
        let id = generate_trace_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_span_id_format() {
        let id = generate_span_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn each_request_gets_its_own_trace() {
        let a = RequestTrace::start("funnels.list");
        let b = RequestTrace::start("funnels.list");
        assert_ne!(a.trace_id(), b.trace_id());
        assert_eq!(a.trace_id().len(), 32);
        let _guard = a.span().entered();
    }
}
