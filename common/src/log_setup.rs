use std::sync::OnceLock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_INIT: OnceLock<()> = OnceLock::new();

/// Installs a console subscriber filtered by `RUST_LOG`, or `base_level` when unset.
///
/// Safe to call from every test: only the first call installs anything, and a
/// subscriber installed by someone else is left alone.
pub fn setup_logging(base_level: &str) {
    LOG_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(base_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_test_writer();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init();
    });
}
