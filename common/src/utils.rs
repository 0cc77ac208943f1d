// common/src/utils.rs
use chrono::{DateTime, Utc};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Setup tracing for consistent logging across services.
///
/// `RUST_LOG` wins over `default_level` when it is set. Records emitted
/// through the `log` facade (actix-web's request logger) are captured too.
pub fn setup_tracing(default_level: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .finish()
        .try_init()
}

/// Current wall-clock time, used for record timestamps
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
