// supportbot/crates/supportbot/src/telemetry.rs

use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// RUST_LOG wins; otherwise everything at `info` and above.
fn filter_directive(rust_log: Option<String>) -> String {
    rust_log
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.into())
}

/// Install the global subscriber. Logs go to stderr so chat replies on
/// stdout stay clean.
pub fn init_tracing() {
    let env_filter = filter_directive(std::env::var("RUST_LOG").ok());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact()
        .finish();

    // A second call (tests, embedding hosts) keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(filter_directive(None), "info");
        assert_eq!(filter_directive(Some("  ".to_string())), "info");
    }

    #[test]
    fn test_rust_log_overrides_default() {
        assert_eq!(filter_directive(Some("supportbot=debug".to_string())), "supportbot=debug");
    }
}
