//! Flood policy parameters and their persisted encoding.
//!
//! A channel's policy is three values: the action taken on a flooder, the
//! per-message penalty, and the score ceiling. The policy is persisted as a
//! single `action:penalty:max` metadata record; the numbers are written with
//! two fractional digits and parsed back as general floats.

use crate::error::{FloodSetError, ParamsParseError};

/// Metadata key under which a channel's flood policy is persisted.
pub const PARAMS_KEY: &str = "flood";

/// Punitive action taken when a user's score is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodAction {
    /// Remove the user from the channel.
    Kick,
    /// Ban the user's hostmask, then kick.
    KickBan,
    /// Strip status and place a mute mask.
    Quiet,
}

impl FloodAction {
    /// Single-character code used in the persisted record.
    pub fn code(self) -> char {
        match self {
            FloodAction::Kick => 'k',
            FloodAction::KickBan => 'K',
            FloodAction::Quiet => 'q',
        }
    }

    /// Inverse of [`FloodAction::code`].
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'k' => Some(FloodAction::Kick),
            'K' => Some(FloodAction::KickBan),
            'q' => Some(FloodAction::Quiet),
            _ => None,
        }
    }

    /// Parse an operator-supplied action name.
    ///
    /// QUIET is only offered when the host has a quiet-mask capability, so
    /// it is gated by `quiet_available` here rather than failing later at
    /// dispatch time.
    pub fn parse(name: &str, quiet_available: bool) -> Option<Self> {
        if name.eq_ignore_ascii_case("KICK") {
            Some(FloodAction::Kick)
        } else if name.eq_ignore_ascii_case("KICKBAN") {
            Some(FloodAction::KickBan)
        } else if name.eq_ignore_ascii_case("QUIET") && quiet_available {
            Some(FloodAction::Quiet)
        } else {
            None
        }
    }
}

/// Per-channel flood policy.
///
/// Invariant, enforced at construction: `max > penalty >= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloodParams {
    pub action: FloodAction,
    /// Score cost of one message, equal to the silence in seconds that
    /// earns it back.
    pub penalty: f64,
    /// Ceiling on accumulated score (burst allowance).
    pub max: f64,
}

impl FloodParams {
    /// Validate and build a policy.
    pub fn new(action: FloodAction, penalty: f64, max: f64) -> Result<Self, FloodSetError> {
        // The negated comparisons also reject NaN.
        if !(penalty >= 1.0) {
            return Err(FloodSetError::InvalidPenalty);
        }
        if !(max >= 1.0) {
            return Err(FloodSetError::InvalidMax);
        }
        if !(penalty < max) {
            return Err(FloodSetError::PenaltyNotLessThanMax);
        }
        Ok(Self {
            action,
            penalty,
            max,
        })
    }

    /// Encode as the persisted `action:penalty:max` record.
    pub fn encode(&self) -> String {
        format!("{}:{:.2}:{:.2}", self.action.code(), self.penalty, self.max)
    }

    /// Decode a persisted record.
    ///
    /// The grammar is strict: one action code, a colon, a finite float, a
    /// colon, a finite float, end of input. Anything else is an error and
    /// the caller is expected to discard the record.
    pub fn decode(raw: &str) -> Result<Self, ParamsParseError> {
        let err = || ParamsParseError(raw.to_string());

        let mut fields = raw.split(':');

        let action = {
            let field = fields.next().ok_or_else(err)?;
            let mut chars = field.chars();
            let code = chars.next().ok_or_else(err)?;
            if chars.next().is_some() {
                return Err(err());
            }
            FloodAction::from_code(code).ok_or_else(err)?
        };

        let penalty: f64 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let max: f64 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;

        if fields.next().is_some() || !penalty.is_finite() || !max.is_finite() {
            return Err(err());
        }

        Ok(Self {
            action,
            penalty,
            max,
        })
    }
}
