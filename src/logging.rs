use std::env;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Console logging. `RUST_LOG` wins; otherwise `LOG_LEVEL` (default `info`,
/// or `debug` when `verbose`).
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| fallback.to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(log_level.parse().unwrap_or(Level::INFO.into()))
    });

    // ignore the error when a subscriber is already installed (tests, reruns)
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
