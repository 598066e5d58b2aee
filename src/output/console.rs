//! User-facing status messages.
//!
//! Status and diagnostics go to stderr so stdout stays clean for rendered
//! results. Everything is mirrored to the log.

use tracing::{error as log_error, info as log_info, warn as log_warn};

pub fn info(message: &str) {
    log_info!("{message}");
    eprintln!("{message}");
}

pub fn warning(message: &str) {
    log_warn!("{message}");
    eprintln!("Warning: {message}");
}

pub fn error(message: &str) {
    log_error!("{message}");
    eprintln!("Error: {message}");
}
