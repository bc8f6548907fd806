//! Logging utilities
//!
//! The toolkit logs through the `log` facade. Applications pick the sink; these helpers
//! install `env_logger`, which honours `RUST_LOG`.

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a default level, still overridable through `RUST_LOG`.
///
/// Safe to call more than once (later calls are ignored), which keeps tests that
/// each want logging from fighting over the global logger.
pub fn init_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .is_test(cfg!(test))
        .try_init();
}
