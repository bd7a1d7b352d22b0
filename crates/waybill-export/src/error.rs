//! Export error types

use thiserror::Error;

/// Errors that can occur while exporting a batch
///
/// Only the writer can fail; an all-failed batch still exports.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The table writer failed
    #[error("Table writer error: {0}")]
    Writer(String),
}
