use std::path::PathBuf;
use thiserror::Error;

/// Recoverable conditions at the parity boundaries.
///
/// None of these are faults: callers report them and end the run cleanly.
/// The arithmetic itself (EMA update, classification) cannot fail.
#[derive(Debug, Error)]
pub enum ParityError {
    #[error("no prices to process")]
    EmptyInput,

    #[error("hardware log not found: {path}: {reason}")]
    LogNotFound { path: PathBuf, reason: String },

    #[error("no 'tick N -> signal=X' records in hardware log: {path}")]
    EmptyLog { path: PathBuf },

    #[error("no overlapping ticks between hardware and software traces")]
    NoOverlap,
}
