//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur when configuring the gatekeeper
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
