//! Flood engine: policy cache, score tracking, and event orchestration.
//!
//! The engine owns all flood state outright, keyed by channel id: an
//! optional cached policy plus the per-user scores accumulated under it.
//! Mutations for a channel are serialized by a per-channel lock; channels
//! are independent, so there is no global lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dispatch::ActionDispatcher;
use crate::host::{ChannelEvents, Directory, MetadataStore, Moderation, QuietSupport};
use crate::params::{FloodParams, PARAMS_KEY};
use crate::score::{FloodScore, ScoreOutcome};

/// Cached policy for a channel.
///
/// `Unloaded` means the persisted record has not been consulted yet this
/// process lifetime; `Absent` means it was consulted and there is none, so
/// the store is not hit again until the cache is invalidated.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ParamsSlot {
    Unloaded,
    Absent,
    Active(FloodParams),
}

/// Transient flood state for one channel: the cached policy and the scores
/// accumulated under it. Both are dropped together.
struct ChannelFloodState {
    params: ParamsSlot,
    scores: HashMap<String, FloodScore>,
}

impl ChannelFloodState {
    fn new() -> Self {
        Self {
            params: ParamsSlot::Unloaded,
            scores: HashMap::new(),
        }
    }
}

/// Per-channel flood protection engine.
///
/// Construct once at startup with the host's capabilities and register it
/// as the host's [`ChannelEvents`] consumer.
pub struct FloodEngine {
    channels: DashMap<String, Arc<Mutex<ChannelFloodState>>>,
    store: Arc<dyn MetadataStore>,
    dispatcher: ActionDispatcher,
    seed_factor: f64,
}

impl FloodEngine {
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn MetadataStore>,
        directory: Arc<dyn Directory>,
        moderation: Arc<dyn Moderation>,
        quiet: Option<Arc<dyn QuietSupport>>,
    ) -> Self {
        Self {
            channels: DashMap::new(),
            store,
            dispatcher: ActionDispatcher::new(directory, moderation, quiet, config.kick_reason.clone()),
            seed_factor: config.seed_factor,
        }
    }

    /// Whether the QUIET action can be offered to operators.
    pub fn quiet_available(&self) -> bool {
        self.dispatcher.quiet_available()
    }

    /// Install a new flood policy for a channel, replacing any existing one
    /// and forgetting accumulated scores.
    ///
    /// Validation happens at [`FloodParams::new`]; persistence of the
    /// encoded record is best-effort and only logged on failure.
    pub async fn configure(&self, channel: &str, params: FloodParams) {
        let slot = self.channel_state(channel);
        let mut state = slot.lock().await;
        state.params = ParamsSlot::Active(params);
        state.scores.clear();
        drop(state);

        if let Err(e) = self.store.set(channel, PARAMS_KEY, &params.encode()).await {
            warn!(channel = %channel, error = %e, "failed to persist flood params");
        }
        info!(channel = %channel, params = %params.encode(), "flood control configured");
    }

    /// Turn flood control off for a channel, dropping the policy, all
    /// scores, and the persisted record. Idempotent.
    pub async fn disable(&self, channel: &str) {
        let had_state = self.channels.remove(channel).is_some();
        if let Err(e) = self.store.delete(channel, PARAMS_KEY).await {
            warn!(channel = %channel, error = %e, "failed to delete flood params record");
        }
        if had_state {
            info!(channel = %channel, "flood control disabled");
        }
    }

    /// Active flood params for a channel, if any, lazily loading the
    /// persisted record on first access.
    pub async fn params(&self, channel: &str) -> Option<FloodParams> {
        let slot = self.channel_state(channel);
        let mut state = slot.lock().await;
        self.load_params(channel, &mut state).await
    }

    /// Drop all transient tracking state for every channel. Persisted
    /// policies are untouched and reload lazily on the next event.
    pub fn clear_runtime(&self) {
        self.channels.clear();
        debug!("flood tracking state cleared");
    }

    fn channel_state(&self, channel: &str) -> Arc<Mutex<ChannelFloodState>> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ChannelFloodState::new())))
            .value()
            .clone()
    }

    async fn load_params(
        &self,
        channel: &str,
        state: &mut ChannelFloodState,
    ) -> Option<FloodParams> {
        match state.params {
            ParamsSlot::Active(params) => Some(params),
            ParamsSlot::Absent => None,
            ParamsSlot::Unloaded => {
                let raw = match self.store.get(channel, PARAMS_KEY).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        // Leave the slot unloaded so the next event retries.
                        warn!(channel = %channel, error = %e, "flood params lookup failed");
                        return None;
                    }
                };

                state.params = match raw {
                    None => ParamsSlot::Absent,
                    Some(raw) => match FloodParams::decode(&raw) {
                        Ok(params) => ParamsSlot::Active(params),
                        Err(e) => {
                            // Self-heal: a record we cannot read is a record
                            // nobody can fix through the command surface.
                            warn!(channel = %channel, error = %e, "discarding corrupt flood params record");
                            if let Err(e) = self.store.delete(channel, PARAMS_KEY).await {
                                warn!(channel = %channel, error = %e, "failed to delete corrupt flood params record");
                            }
                            ParamsSlot::Absent
                        }
                    },
                };

                match state.params {
                    ParamsSlot::Active(params) => Some(params),
                    _ => None,
                }
            }
        }
    }
}

#[async_trait]
impl ChannelEvents for FloodEngine {
    async fn on_channel_message(&self, channel: &str, uid: &str, at: DateTime<Utc>) {
        let slot = self.channel_state(channel);
        let mut state = slot.lock().await;

        let Some(params) = self.load_params(channel, &mut state).await else {
            return;
        };

        let score = state
            .scores
            .entry(uid.to_string())
            .or_insert_with(|| FloodScore::seed(&params, self.seed_factor, at));
        let outcome = score.charge(&params, at);
        debug!(channel = %channel, uid = %uid, score = score.value(), "flood score charged");

        // Release the channel lock before dispatch: the kick/ban may feed
        // a part event straight back into the engine.
        drop(state);

        if outcome == ScoreOutcome::Flooding {
            info!(channel = %channel, uid = %uid, action = ?params.action, "flood threshold crossed");
            self.dispatcher.dispatch(channel, uid, params.action).await;
        }
    }

    async fn on_channel_part(&self, channel: &str, uid: &str) {
        let Some(slot) = self.channels.get(channel).map(|s| s.value().clone()) else {
            return;
        };
        let mut state = slot.lock().await;
        if state.scores.remove(uid).is_some() {
            debug!(channel = %channel, uid = %uid, "flood score dropped");
        }
    }

    async fn on_channel_drop(&self, channel: &str) {
        debug!(channel = %channel, "channel dropped, clearing flood state");
        self.disable(channel).await;
    }
}
