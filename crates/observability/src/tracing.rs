//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Output style for log lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// One JSON object per line, for log shippers.
    #[default]
    Json,
    /// Human readable with file/line, for local runs.
    Pretty,
}

/// Build the filter: `RUST_LOG` wins, then `default_level`.
fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(output: LogOutput, default_level: &str) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = match output {
        LogOutput::Json => builder
            .json()
            .with_current_span(true)
            .with_target(false)
            .try_init(),
        LogOutput::Pretty => builder
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init(LogOutput::Json, "debug");
        init(LogOutput::Pretty, "info");
        ::tracing::info!("still logging");
    }

    #[test]
    fn bad_default_level_falls_back() {
        let f = filter("this is not a directive [");
        assert!(!f.to_string().is_empty());
    }
}
