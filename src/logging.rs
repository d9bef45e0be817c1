//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! The library only emits events; installing a subscriber is up to the
//! binary. Levels used:
//!
//! - `warn`: failed or rejected session operations
//! - `info`: symbol generated, file saved
//! - `debug`: version, mask and render details
//!
//! ```ignore
//! use qrsnap::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_verbosity(1)).expect("init logging");
//! ```

use std::io;

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for the stderr log output.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level used when `RUST_LOG` is not set.
    pub level: Level,
    /// Include the module path of each event.
    pub with_target: bool,
    /// Use ANSI colors.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Maps a `-v` count to a level.
    ///
    /// - 0: warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+ (`-vvv`): trace
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_target(mut self, enable: bool) -> Self {
        self.with_target = enable;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    /// Filter from `RUST_LOG`, falling back to [`LogConfig::level`].
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.level).into())
            .from_env_lossy()
    }
}

/// Installs the global subscriber, writing compact lines to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let layer = fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(layer)
        .try_init()
}
