use tracing_subscriber::{fmt, EnvFilter};

/// Output format for [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    /// Parse a config value; anything other than `json` means human output.
    pub fn from_config(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Human
        }
    }
}

/// Initialize logging in the requested format.
///
/// `RUST_LOG` wins over `default_level` (e.g. "info", "fb_client=debug,warn").
/// Output goes to stderr so command output on stdout stays clean. Safe to
/// call more than once; only the first call installs a subscriber.
pub fn init(service_name: &str, default_level: &str, format: LogFormat) {
    match format {
        LogFormat::Human => init_logging(service_name, default_level),
        LogFormat::Json => init_logging_json(service_name, default_level),
    }
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Compact human-readable lines, without source locations.
pub fn init_logging(service_name: &str, default_level: &str) {
    let installed = fmt()
        .compact()
        .with_env_filter(filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(service = service_name, format = "human", "logging ready");
    }
}

/// One JSON object per event, with file and line for log shippers.
pub fn init_logging_json(service_name: &str, default_level: &str) {
    let installed = fmt()
        .json()
        .with_env_filter(filter(default_level))
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(service = service_name, format = "json", "logging ready");
    }
}
