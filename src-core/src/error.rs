//! Error types for the narrator core.

use std::fmt;

/// Error type for controller, store, and capture operations.
#[derive(Debug)]
pub enum NarratorError {
    /// The capture device could not be opened or used. Recoverable: the
    /// caller reports it and the controller state is unchanged.
    DeviceUnavailable(String),
    /// An operation was attempted in a state that forbids it
    InvalidState(String),
    /// No recording exists at the requested timestamp
    NotFound(u64),
    /// A delete was requested on a store with no recordings
    EmptyStore,
    /// Persisted annotation data violates the store invariants
    CorruptAnnotations(String),
    /// Underlying persistence I/O failure
    Storage(String),
}

impl fmt::Display for NarratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarratorError::DeviceUnavailable(msg) => write!(f, "Capture device unavailable: {}", msg),
            NarratorError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            NarratorError::NotFound(ts) => write!(f, "No recording at {} ms", ts),
            NarratorError::EmptyStore => write!(f, "No recordings to delete"),
            NarratorError::CorruptAnnotations(msg) => write!(f, "Corrupt annotations: {}", msg),
            NarratorError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for NarratorError {}

impl From<std::io::Error> for NarratorError {
    fn from(err: std::io::Error) -> Self {
        NarratorError::Storage(err.to_string())
    }
}

impl From<NarratorError> for String {
    fn from(err: NarratorError) -> Self {
        err.to_string()
    }
}
