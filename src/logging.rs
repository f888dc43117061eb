use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Error, Result};

/// Install the global `tracing` subscriber for the binaries.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` applies to this crate
/// and `warn` to everything else.
pub fn init(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,face_shape={}", default_level)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
