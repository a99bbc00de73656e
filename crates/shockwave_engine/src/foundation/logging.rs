//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, tolerating repeat initialization
///
/// Useful for tests and embedded hosts where another component may have
/// installed a logger already.
pub fn try_init() {
    let _ = env_logger::try_init();
}
