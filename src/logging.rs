//! Log Setup

#[cfg(feature = "pretty_env_logger")]
use std::sync::Once;

#[cfg(feature = "pretty_env_logger")]
static INIT: Once = Once::new();

/// Install the `RUST_LOG` driven logger, later calls do nothing.
#[cfg(feature = "pretty_env_logger")]
pub fn setup_logging() {
    INIT.call_once(pretty_env_logger::init);
}

#[cfg(not(feature = "pretty_env_logger"))]
pub fn setup_logging() {}
