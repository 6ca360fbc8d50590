use std::{fs::OpenOptions, io, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. The terminal belongs to the UI, so logs go
/// to a file; `RUST_LOG` overrides the configured level.
///
/// Returns false if the log file could not be opened and logs are discarded.
pub fn init(level: &str, path: &Path) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let _ = builder.with_writer(Mutex::new(file)).try_init();
            true
        }
        Err(_) => {
            let _ = builder.with_writer(io::sink).try_init();
            false
        }
    }
}
