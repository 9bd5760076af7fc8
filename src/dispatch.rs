//! Punitive action dispatch.
//!
//! Applies a triggered flood action through the host's moderation
//! primitives. Dispatch is best-effort: the caller has already reset the
//! offender's score, so failures here are logged and never retried.

use std::sync::Arc;

use tracing::{info, warn};

use crate::host::{Directory, Moderation, QuietSupport};
use crate::params::FloodAction;

pub(crate) struct ActionDispatcher {
    directory: Arc<dyn Directory>,
    moderation: Arc<dyn Moderation>,
    quiet: Option<Arc<dyn QuietSupport>>,
    kick_reason: String,
}

impl ActionDispatcher {
    pub fn new(
        directory: Arc<dyn Directory>,
        moderation: Arc<dyn Moderation>,
        quiet: Option<Arc<dyn QuietSupport>>,
        kick_reason: String,
    ) -> Self {
        Self {
            directory,
            moderation,
            quiet,
            kick_reason,
        }
    }

    pub fn quiet_available(&self) -> bool {
        self.quiet.is_some()
    }

    pub async fn dispatch(&self, channel: &str, uid: &str, action: FloodAction) {
        match action {
            FloodAction::Kick => self.kick(channel, uid, false).await,
            FloodAction::KickBan => {
                // Ban lands before the kick so the host's moderation
                // records stay consistent.
                if let Err(e) = self.moderation.ban(channel, uid).await {
                    warn!(channel = %channel, uid = %uid, error = %e, "flood ban failed");
                }
                self.kick(channel, uid, true).await;
            }
            FloodAction::Quiet => self.quiet(channel, uid).await,
        }
    }

    async fn kick(&self, channel: &str, uid: &str, banned: bool) {
        if let Some(user) = self.directory.user_info(uid).await {
            info!(
                channel = %channel,
                target = %format!("{}!{}@{}", user.nick, user.user, user.host),
                banned,
                "FLOOD: kick"
            );
        }
        if let Err(e) = self.moderation.kick(channel, uid, &self.kick_reason).await {
            warn!(channel = %channel, uid = %uid, error = %e, "flood kick failed");
        }
    }

    async fn quiet(&self, channel: &str, uid: &str) {
        let Some(status) = self.directory.member_status(channel, uid).await else {
            // Raced a part; nothing to do.
            return;
        };

        // Strip any elevated statuses before the mute mask lands, or the
        // mask has no effect.
        for mode in status.held_modes() {
            if let Err(e) = self
                .moderation
                .set_member_mode(channel, uid, mode, false)
                .await
            {
                warn!(channel = %channel, uid = %uid, mode = %mode, error = %e, "flood destatus failed");
            }
        }

        let Some(user) = self.directory.user_info(uid).await else {
            return;
        };
        let mask = format!("*!*@{}", user.host);

        match &self.quiet {
            Some(quiet) => {
                info!(channel = %channel, mask = %mask, "FLOOD: quiet");
                if let Err(e) = quiet.place_quiet_mask(channel, &mask).await {
                    warn!(channel = %channel, mask = %mask, error = %e, "flood quiet failed");
                }
            }
            // QUIET is not configurable without the capability; reaching
            // this means the policy predates the capability disappearing.
            None => {
                warn!(channel = %channel, uid = %uid, "quiet action configured but host has no quiet support");
            }
        }
    }
}
