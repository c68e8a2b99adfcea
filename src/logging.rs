//! Tracing setup for the binary.
//!
//! The terminal is in raw mode while the game runs, so log lines go to a file
//! instead of stderr. `RUST_LOG` overrides the default filter.

use std::fs::File;
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber writing to `path`. Only the first call has
/// any effect. If the file cannot be created, logging stays disabled.
pub fn init_file_logging(path: &Path) {
    TRACING_INIT.call_once(|| {
        let Ok(file) = File::create(path) else {
            return;
        };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .compact();

        let _ = subscriber.try_init();
    });
}
