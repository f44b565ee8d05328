//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "worker_host=info,startup=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level`; `level` wins over [`DEFAULT_FILTER`].
/// Returns false if a subscriber was already installed.
pub fn init_logging(level: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        level
            .map(|l| format!("worker_host={l},startup={l}"))
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
            .into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
