//! Outcome classification for remote calls that a caller may retry.

use crate::error::ApiError;

/// How a caller should treat the result of a remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The call succeeded
    Success,
    /// Retrying the same call cannot succeed
    Fatal,
    /// The call may succeed if attempted again
    Retriable,
}

/// Status the provider uses for an asset name that is already taken
const UNPROCESSABLE_ENTITY: u16 = 422;

/// Classify a remote call result.
///
/// A 422 is fatal. Every other failure, including one where no response was
/// received, is retriable.
pub fn classify<T>(result: &Result<T, ApiError>) -> Outcome {
    match result {
        Ok(_) => Outcome::Success,
        Err(e) if e.status == Some(UNPROCESSABLE_ENTITY) => Outcome::Fatal,
        Err(_) => Outcome::Retriable,
    }
}
