//! Observability setup for funnelboard binaries and libraries.
//!
//! - **Logging**: human-readable or JSON output via `tracing-subscriber`
//! - **Tracing**: per-request traces, used by the HTTP client to correlate
//!   requests through `X-Request-Id`

pub mod logging;
pub mod tracing_setup;
