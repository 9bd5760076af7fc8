//! Host capability interfaces.
//!
//! The engine never talks to the wire or to host state directly; everything
//! it needs from the surrounding server comes through these traits. Hosts
//! hand the engine an implementation of each at construction time, and
//! register the engine's [`ChannelEvents`] with their dispatch loop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::HostError;

/// Elevated member statuses a user may hold in a channel.
///
/// Hosts that lack a given status level simply never report it held.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemberStatus {
    /// +q (~)
    pub owner: bool,
    /// +a (&)
    pub admin: bool,
    /// +o (@)
    pub op: bool,
    /// +h (%)
    pub halfop: bool,
    /// +v (+)
    pub voice: bool,
}

impl MemberStatus {
    /// Mode characters for every status held, highest first.
    pub fn held_modes(&self) -> Vec<char> {
        let mut modes = Vec::with_capacity(5);
        if self.owner {
            modes.push('q');
        }
        if self.admin {
            modes.push('a');
        }
        if self.op {
            modes.push('o');
        }
        if self.halfop {
            modes.push('h');
        }
        if self.voice {
            modes.push('v');
        }
        modes
    }
}

/// Identity details used for logging and mask construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub nick: String,
    pub user: String,
    /// Visible (possibly cloaked) hostname.
    pub host: String,
}

/// Channel/user directory lookups.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Statuses `uid` holds in `channel`, or `None` if not a member.
    async fn member_status(&self, channel: &str, uid: &str) -> Option<MemberStatus>;

    /// Identity of a connected user, or `None` if unknown.
    async fn user_info(&self, uid: &str) -> Option<UserInfo>;
}

/// Persistent per-channel key/value metadata.
///
/// Values are opaque strings; the engine encodes its policy record itself.
/// [`crate::db::SqliteMetadataStore`] is the bundled implementation.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get(&self, channel: &str, key: &str) -> Result<Option<String>, HostError>;

    async fn set(&self, channel: &str, key: &str, value: &str) -> Result<(), HostError>;

    /// Remove a key. Deleting an absent key is not an error.
    async fn delete(&self, channel: &str, key: &str) -> Result<(), HostError>;
}

/// Moderation primitives.
#[async_trait]
pub trait Moderation: Send + Sync {
    /// Remove a user from a channel.
    async fn kick(&self, channel: &str, uid: &str, reason: &str) -> Result<(), HostError>;

    /// Place a persistent ban against the user's hostmask.
    async fn ban(&self, channel: &str, uid: &str) -> Result<(), HostError>;

    /// Add or remove a status mode (`o`, `v`, ...) on a channel member.
    async fn set_member_mode(
        &self,
        channel: &str,
        uid: &str,
        mode_char: char,
        adding: bool,
    ) -> Result<(), HostError>;
}

/// Optional mute-mask capability.
///
/// Presence is a static fact decided at engine construction; the QUIET
/// action is only offered to operators when this capability exists.
#[async_trait]
pub trait QuietSupport: Send + Sync {
    /// Place a mute mask (e.g. `*!*@host`) on the channel.
    async fn place_quiet_mask(&self, channel: &str, mask: &str) -> Result<(), HostError>;
}

/// Channel events the engine consumes.
///
/// Implemented by [`crate::FloodEngine`]; the host calls these from its
/// event loop. Delivery for a given channel must be serialized by the
/// caller or will be serialized internally by the engine's per-channel
/// lock.
#[async_trait]
pub trait ChannelEvents: Send + Sync {
    /// A user spoke in a channel at `at`.
    async fn on_channel_message(&self, channel: &str, uid: &str, at: DateTime<Utc>);

    /// A user left a channel (part, kick, or quit).
    async fn on_channel_part(&self, channel: &str, uid: &str);

    /// A channel was deleted/dropped entirely.
    async fn on_channel_drop(&self, channel: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_modes_orders_highest_first() {
        let status = MemberStatus {
            owner: true,
            admin: false,
            op: true,
            halfop: false,
            voice: true,
        };
        assert_eq!(status.held_modes(), vec!['q', 'o', 'v']);
        assert!(MemberStatus::default().held_modes().is_empty());
    }
}
