//! Logging setup shared by Tally binaries and test harnesses.
//!
//! Library crates only use the `log` macros; whoever owns `main` picks the
//! filter once through one of the `setup*` functions. Calling them again is
//! harmless: only the first call installs a logger.

use env_logger::{Builder, Env};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "tally=info";

/// Configure logging from `RUST_LOG`, falling back to errors only.
pub fn setup() {
    setup_with_default("error");
}

/// Configure logging from `RUST_LOG`, falling back to `filter`.
pub fn setup_with_default(filter: &str) {
    let _ = Builder::from_env(Env::new().default_filter_or(filter))
        .format_timestamp_nanos()
        .try_init();
}

/// Configure logging with `filter`, ignoring `RUST_LOG`.
pub fn setup_with(filter: &str) {
    let _ = Builder::new()
        .parse_filters(filter)
        .format_timestamp_nanos()
        .try_init();
}

/// Whether a record at `level` would currently be emitted.
pub fn enabled(level: log::Level) -> bool {
    log::log_enabled!(target: "tally", level)
}
