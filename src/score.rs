//! Per-user decaying flood score.
//!
//! Silence earns credit at one point per second; each message costs
//! `penalty` points. The score is capped at `max`, and a message that
//! drives it to zero or below marks the user as flooding.

use chrono::{DateTime, Utc};

use crate::params::FloodParams;

/// Outcome of charging one message against a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// Score still positive; message allowed.
    Allowed,
    /// Score exhausted; the caller should dispatch the configured action.
    Flooding,
}

/// Decaying score for one user in one channel.
///
/// Purely transient: never persisted, rebuilt from scratch after a restart,
/// and dropped when the user parts or the channel's policy is cleared.
#[derive(Debug, Clone, Copy)]
pub struct FloodScore {
    score: f64,
    last_message: DateTime<Utc>,
}

impl FloodScore {
    /// Seed a score for a newly tracked user.
    ///
    /// A fresh user starts with `penalty * seed_factor` credit (capped at
    /// `max`): enough that the first few messages pass, not enough to flood
    /// straight from a join.
    pub fn seed(params: &FloodParams, seed_factor: f64, now: DateTime<Utc>) -> Self {
        Self {
            score: (params.penalty * seed_factor).min(params.max),
            last_message: now,
        }
    }

    /// Charge one message sent at `now` against the score.
    ///
    /// On a flooding result the score is clamped to exactly zero, so a
    /// quieting-down user recovers in bounded time.
    pub fn charge(&mut self, params: &FloodParams, now: DateTime<Utc>) -> ScoreOutcome {
        let elapsed = (now - self.last_message)
            .num_microseconds()
            .map(|us| us as f64 * 1e-6)
            // Duration overflow only happens after centuries of silence.
            .unwrap_or(f64::MAX);

        let delta = elapsed - params.penalty;
        self.score = (self.score + delta).min(params.max);
        self.last_message = now;

        if self.score > 0.0 {
            ScoreOutcome::Allowed
        } else {
            self.score = 0.0;
            ScoreOutcome::Flooding
        }
    }

    /// Current score value.
    pub fn value(&self) -> f64 {
        self.score
    }
}
