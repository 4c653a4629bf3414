use std::time::Duration as StdDuration;

use chrono::Duration;

use clinpush_core::poll::{TimedOut, poll_until};

use crate::bridge::Bridge;
use crate::push::{Permission, PushSdk};

const PUSH_ENABLED_KEY: &str = "push_last_known_enabled";

/// Age ceiling for the persisted last-known flag.
const FLAG_MAX_AGE_DAYS: i64 = 365;

/// Consecutive disagreeing observations required before a previously-enabled
/// state flips to disabled. SDK state flaps during startup and focus
/// changes; a single negative reading means nothing.
const DISABLE_STREAK: u32 = 5;

/// Polling fallback interval; event triggers call `observe` directly.
pub const OBSERVE_INTERVAL: StdDuration = StdDuration::from_secs(5);

const WAIT_PROBE_INTERVAL: StdDuration = StdDuration::from_millis(300);

/// Reconciles the user-visible "push enabled" flag from three signals — OS
/// permission, SDK opt-in, subscription id — tolerating transient SDK false
/// negatives.
pub struct EnablementMonitor<P: PushSdk> {
    bridge: Bridge,
    push: P,
    enabled: bool,
    ever_enabled: bool,
    disagree_streak: u32,
}

impl<P: PushSdk> EnablementMonitor<P> {
    /// Seed from the persisted last-known flag; a denied permission overrides
    /// the memory immediately.
    pub async fn new(bridge: Bridge, push: P) -> Self {
        let persisted = bridge
            .read(PUSH_ENABLED_KEY, Duration::days(FLAG_MAX_AGE_DAYS))
            .await
            .and_then(|r| r.value.as_bool())
            .unwrap_or(false);
        let denied = push.permission().await == Permission::Denied;
        let enabled = persisted && !denied;
        Self {
            bridge,
            push,
            enabled,
            ever_enabled: enabled,
            disagree_streak: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// One observation. Call on subscription-change, focus, visibility and
    /// permission events; [`EnablementMonitor::run`] is the polling fallback.
    pub async fn observe(&mut self) -> bool {
        if self.push.permission().await != Permission::Granted {
            // Permission revocation is authoritative: no debounce.
            self.disagree_streak = 0;
            self.ever_enabled = false;
            self.set_enabled(false).await;
            return self.enabled;
        }

        let opted = self.push.opted_in().await;
        let id = self.push.subscription_id().await;
        if opted && id.is_some() {
            self.ever_enabled = true;
            self.disagree_streak = 0;
            self.set_enabled(true).await;
        } else if self.ever_enabled {
            self.disagree_streak += 1;
            if self.disagree_streak >= DISABLE_STREAK {
                self.ever_enabled = false;
                self.disagree_streak = 0;
                self.set_enabled(false).await;
            }
        } else {
            // Never enabled yet: report disabled without debounce.
            self.set_enabled(false).await;
        }
        self.enabled
    }

    /// Wait until push reports fully enabled, or time out. Used after the
    /// user walks through an enable/re-enable flow.
    pub async fn wait_enabled(&mut self, timeout: StdDuration) -> Result<(), TimedOut> {
        let push = &self.push;
        let result = poll_until(WAIT_PROBE_INTERVAL, timeout, || async move {
            let granted = push.permission().await == Permission::Granted;
            let opted = push.opted_in().await;
            let id = push.subscription_id().await;
            (granted && opted && id.is_some()).then_some(())
        })
        .await;

        if result.is_ok() {
            self.ever_enabled = true;
            self.disagree_streak = 0;
            self.set_enabled(true).await;
        }
        result
    }

    /// Polling fallback: observe every 5 s. Drive from the host event loop;
    /// cancellation is dropping the future.
    pub async fn run(&mut self) {
        loop {
            self.observe().await;
            tokio::time::sleep(OBSERVE_INTERVAL).await;
        }
    }

    async fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.bridge
            .write(PUSH_ENABLED_KEY, serde_json::json!(enabled))
            .await;
    }
}
