//! Unified error handling for floodserv.
//!
//! Configuration errors are reported synchronously to the requesting
//! operator; everything on the scoring path fails open and is only logged.

use thiserror::Error;

/// Errors from validating operator-supplied flood parameters.
///
/// None of these mutate state: a rejected policy leaves any existing
/// policy in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FloodSetError {
    #[error("unknown flood action")]
    InvalidAction,

    #[error("flood penalty must be at least 1")]
    InvalidPenalty,

    #[error("flood score maximum must be at least 1")]
    InvalidMax,

    #[error("flood penalty must be less than the maximum score")]
    PenaltyNotLessThanMax,
}

/// A persisted flood params record that does not match the
/// `action:penalty:max` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed flood params record: {0:?}")]
pub struct ParamsParseError(pub String);

/// Failure crossing into a host-provided subsystem.
///
/// These never reach the message-processing caller; the engine logs them
/// and carries on.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("capability unavailable: {0}")]
    Unavailable(&'static str),

    #[error("rejected by host: {0}")]
    Rejected(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_error_display_matches_operator_wording() {
        assert_eq!(
            FloodSetError::InvalidPenalty.to_string(),
            "flood penalty must be at least 1"
        );
        assert_eq!(
            FloodSetError::PenaltyNotLessThanMax.to_string(),
            "flood penalty must be less than the maximum score"
        );
    }

    #[test]
    fn parse_error_carries_raw_record() {
        let err = ParamsParseError("k:1".to_string());
        assert!(err.to_string().contains("k:1"));
    }
}
