//! Operator command surface for flood control.
//!
//! Handles the FLOOD channel setting:
//!
//! - `FLOOD <#channel> OFF` — turn flood control off
//! - `FLOOD <#channel> <KICK|KICKBAN|QUIET> <penalty> <max>` — set policy
//!
//! The host performs its channel-management permission check before
//! invoking this handler; replies are NOTICE-style lines for the
//! requesting operator.

use std::sync::Arc;

use tracing::info;

use crate::engine::FloodEngine;
use crate::error::FloodSetError;
use crate::params::{FloodAction, FloodParams};

pub struct FloodCommand {
    engine: Arc<FloodEngine>,
}

impl FloodCommand {
    pub fn new(engine: Arc<FloodEngine>) -> Self {
        Self { engine }
    }

    /// Handle the FLOOD setting for `channel` with raw argument text.
    pub async fn handle(&self, channel: &str, args: &str) -> Vec<String> {
        let parts: Vec<&str> = args.split_whitespace().collect();

        let Some(&first) = parts.first() else {
            return vec![self.syntax()];
        };

        if first.eq_ignore_ascii_case("OFF") {
            self.engine.disable(channel).await;
            info!(channel = %channel, "FLOOD set: off");
            return vec![format!("Flood control turned off in \x02{}\x02.", channel)];
        }

        if parts.len() != 3 {
            return vec![self.syntax()];
        }

        match self.parse_params(parts[0], parts[1], parts[2]) {
            Ok(params) => {
                self.engine.configure(channel, params).await;
                info!(channel = %channel, params = %params.encode(), "FLOOD set");
                vec![format!("Set flood control in \x02{}\x02.", channel)]
            }
            Err(FloodSetError::InvalidAction) => {
                vec![format!("Unknown action \x02{}\x02.", parts[0])]
            }
            Err(FloodSetError::InvalidPenalty) => {
                vec!["Flood penalty must be at least 1.".to_string()]
            }
            Err(FloodSetError::InvalidMax) => {
                vec!["Flood score maximum must be at least 1.".to_string()]
            }
            Err(FloodSetError::PenaltyNotLessThanMax) => {
                vec!["Flood penalty must be less than the maximum score.".to_string()]
            }
        }
    }

    fn parse_params(
        &self,
        action: &str,
        penalty: &str,
        max: &str,
    ) -> Result<FloodParams, FloodSetError> {
        let action = FloodAction::parse(action, self.engine.quiet_available())
            .ok_or(FloodSetError::InvalidAction)?;
        let penalty: f64 = penalty.parse().map_err(|_| FloodSetError::InvalidPenalty)?;
        let max: f64 = max.parse().map_err(|_| FloodSetError::InvalidMax)?;
        FloodParams::new(action, penalty, max)
    }

    fn syntax(&self) -> String {
        "Syntax: FLOOD <#channel> OFF | FLOOD <#channel> <KICK|KICKBAN|QUIET> <penalty> <max>"
            .to_string()
    }
}
