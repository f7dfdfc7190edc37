//! Logging bootstrap
//!
//! log4rs is configured from a YAML file when one is available. Without it
//! the server falls back to env_logger driven by `RUST_LOG`.

use std::path::Path;

/// Default log4rs configuration shipped next to the binary
pub const DEFAULT_LOG_CONFIG: &str = "server_log.yaml";

/// Which logger ended up installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerKind {
    Log4rs,
    EnvLogger,
}

/// Install the global logger. Only the first call in a process has any effect.
pub fn init(config_file: impl AsRef<Path>) -> LoggerKind {
    let config_file = config_file.as_ref();
    if config_file.exists() {
        match log4rs::init_file(config_file, Default::default()) {
            Ok(()) => return LoggerKind::Log4rs,
            Err(e) => eprintln!(
                "Failed to load log config {}: {}, falling back to env_logger",
                config_file.display(),
                e
            ),
        }
    }

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    LoggerKind::EnvLogger
}
