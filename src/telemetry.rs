//! Structured logging setup.

use crate::config::{LogFormat, LoggingConfig};
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a global `tracing` subscriber for `config`.
///
/// `RUST_LOG` overrides `config.level` when set. Only the first call has any
/// effect, and an already-installed global subscriber is left in place.
pub fn init_tracing(config: &LoggingConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
        let registry = tracing_subscriber::registry().with(filter);

        let installed = match config.format {
            LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_target(true))
                .try_init(),
        };

        match installed {
            Ok(()) => tracing::info!(
                level = %config.level,
                format = ?config.format,
                "structured logging initialized"
            ),
            Err(_) => {
                tracing::debug!("global tracing subscriber already installed, keeping it")
            }
        }
    });
}
