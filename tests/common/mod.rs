//! Shared test fixtures: an in-memory host with recording moderation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use floodserv::error::HostError;
use floodserv::host::{
    Directory, MemberStatus, MetadataStore, Moderation, QuietSupport, UserInfo,
};

/// Install a test subscriber so `RUST_LOG=debug` shows engine activity.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Record of a moderation call made by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModCall {
    Kick {
        channel: String,
        uid: String,
        reason: String,
    },
    Ban {
        channel: String,
        uid: String,
    },
    Mode {
        channel: String,
        uid: String,
        mode: char,
        adding: bool,
    },
    QuietMask {
        channel: String,
        mask: String,
    },
}

/// In-memory host: directory, metadata store, and moderation primitives.
///
/// Moderation calls are recorded in order; `fail_moderation` makes kick and
/// ban report rejection (after recording) to exercise the best-effort path.
#[derive(Default)]
pub struct TestHost {
    metadata: Mutex<HashMap<(String, String), String>>,
    members: Mutex<HashMap<(String, String), MemberStatus>>,
    users: Mutex<HashMap<String, UserInfo>>,
    calls: Mutex<Vec<ModCall>>,
    fail_moderation: AtomicBool,
}

impl TestHost {
    pub fn new() -> Arc<Self> {
        init_tracing();
        Arc::new(Self::default())
    }

    pub fn add_user(&self, uid: &str, nick: &str, user: &str, host: &str) {
        self.users.lock().unwrap().insert(
            uid.to_string(),
            UserInfo {
                nick: nick.to_string(),
                user: user.to_string(),
                host: host.to_string(),
            },
        );
    }

    pub fn join(&self, channel: &str, uid: &str, status: MemberStatus) {
        self.members
            .lock()
            .unwrap()
            .insert((channel.to_string(), uid.to_string()), status);
    }

    pub fn calls(&self) -> Vec<ModCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_fail_moderation(&self, fail: bool) {
        self.fail_moderation.store(fail, Ordering::SeqCst);
    }

    /// Plant a raw metadata record, bypassing the engine.
    pub fn set_metadata_raw(&self, channel: &str, key: &str, value: &str) {
        self.metadata
            .lock()
            .unwrap()
            .insert((channel.to_string(), key.to_string()), value.to_string());
    }

    pub fn metadata_raw(&self, channel: &str, key: &str) -> Option<String> {
        self.metadata
            .lock()
            .unwrap()
            .get(&(channel.to_string(), key.to_string()))
            .cloned()
    }

    fn record(&self, call: ModCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn moderation_result(&self) -> Result<(), HostError> {
        if self.fail_moderation.load(Ordering::SeqCst) {
            Err(HostError::Rejected("moderation refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Directory for TestHost {
    async fn member_status(&self, channel: &str, uid: &str) -> Option<MemberStatus> {
        self.members
            .lock()
            .unwrap()
            .get(&(channel.to_string(), uid.to_string()))
            .copied()
    }

    async fn user_info(&self, uid: &str) -> Option<UserInfo> {
        self.users.lock().unwrap().get(uid).cloned()
    }
}

#[async_trait]
impl MetadataStore for TestHost {
    async fn get(&self, channel: &str, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.metadata_raw(channel, key))
    }

    async fn set(&self, channel: &str, key: &str, value: &str) -> Result<(), HostError> {
        self.set_metadata_raw(channel, key, value);
        Ok(())
    }

    async fn delete(&self, channel: &str, key: &str) -> Result<(), HostError> {
        self.metadata
            .lock()
            .unwrap()
            .remove(&(channel.to_string(), key.to_string()));
        Ok(())
    }
}

#[async_trait]
impl Moderation for TestHost {
    async fn kick(&self, channel: &str, uid: &str, reason: &str) -> Result<(), HostError> {
        self.record(ModCall::Kick {
            channel: channel.to_string(),
            uid: uid.to_string(),
            reason: reason.to_string(),
        });
        self.moderation_result()
    }

    async fn ban(&self, channel: &str, uid: &str) -> Result<(), HostError> {
        self.record(ModCall::Ban {
            channel: channel.to_string(),
            uid: uid.to_string(),
        });
        self.moderation_result()
    }

    async fn set_member_mode(
        &self,
        channel: &str,
        uid: &str,
        mode_char: char,
        adding: bool,
    ) -> Result<(), HostError> {
        self.record(ModCall::Mode {
            channel: channel.to_string(),
            uid: uid.to_string(),
            mode: mode_char,
            adding,
        });
        Ok(())
    }
}

#[async_trait]
impl QuietSupport for TestHost {
    async fn place_quiet_mask(&self, channel: &str, mask: &str) -> Result<(), HostError> {
        self.record(ModCall::QuietMask {
            channel: channel.to_string(),
            mask: mask.to_string(),
        });
        Ok(())
    }
}
