use std::time::Duration;

use serde_json::json;

use clinpush_client::monitor::EnablementMonitor;
use clinpush_client::push::Permission;

use crate::helpers::{TestPush, memory_bridge};

#[tokio::test]
async fn transient_disagreements_do_not_flip_an_enabled_state() {
    let (bridge, _backends) = memory_bridge();
    let push = TestPush::enabled();
    let mut monitor = EnablementMonitor::new(bridge, push.clone()).await;

    assert!(monitor.observe().await);

    // SDK flaps: opt-in reads false for a while.
    push.set_opted_in(false);
    for _ in 0..4 {
        assert!(
            monitor.observe().await,
            "fewer than 5 disagreements must not flip the state"
        );
    }

    // The 5th consecutive disagreement flips it.
    assert!(!monitor.observe().await);
}

#[tokio::test]
async fn recovery_resets_the_disagreement_streak() {
    let (bridge, _backends) = memory_bridge();
    let push = TestPush::enabled();
    let mut monitor = EnablementMonitor::new(bridge, push.clone()).await;
    monitor.observe().await;

    push.set_opted_in(false);
    for _ in 0..4 {
        monitor.observe().await;
    }
    // SDK recovers before the streak completes.
    push.set_opted_in(true);
    assert!(monitor.observe().await);

    // A fresh run of disagreements starts from zero again.
    push.set_opted_in(false);
    for _ in 0..4 {
        assert!(monitor.observe().await);
    }
    assert!(!monitor.observe().await);
}

#[tokio::test]
async fn never_enabled_state_reports_disabled_immediately() {
    let (bridge, _backends) = memory_bridge();
    let mut monitor = EnablementMonitor::new(bridge, TestPush::disabled()).await;
    assert!(!monitor.observe().await);
}

#[tokio::test]
async fn permission_revocation_flips_without_debounce() {
    let (bridge, _backends) = memory_bridge();
    let push = TestPush::enabled();
    let mut monitor = EnablementMonitor::new(bridge, push.clone()).await;
    assert!(monitor.observe().await);

    push.set_permission(Permission::Denied);
    assert!(!monitor.observe().await, "revocation is authoritative");
}

#[tokio::test]
async fn persisted_flag_seeds_the_initial_state() {
    let (bridge, _backends) = memory_bridge();
    bridge.write("push_last_known_enabled", json!(true)).await;

    let monitor = EnablementMonitor::new(bridge, TestPush::enabled()).await;
    assert!(monitor.enabled());
}

#[tokio::test]
async fn denied_permission_overrides_the_persisted_flag() {
    let (bridge, _backends) = memory_bridge();
    bridge.write("push_last_known_enabled", json!(true)).await;

    let push = TestPush::enabled();
    push.set_permission(Permission::Denied);
    let monitor = EnablementMonitor::new(bridge, push).await;
    assert!(!monitor.enabled());
}

#[tokio::test(start_paused = true)]
async fn wait_enabled_succeeds_once_signals_agree() {
    let (bridge, _backends) = memory_bridge();
    let push = TestPush::enabled();
    push.set_subscription_id(None);
    let mut monitor = EnablementMonitor::new(bridge, push.clone()).await;

    push.set_subscription_id(Some("sub-9"));
    monitor
        .wait_enabled(Duration::from_secs(12))
        .await
        .expect("signals agree, wait should resolve");
    assert!(monitor.enabled());
}

#[tokio::test(start_paused = true)]
async fn wait_enabled_times_out_when_subscription_never_appears() {
    let (bridge, _backends) = memory_bridge();
    let push = TestPush::enabled();
    push.set_subscription_id(None);
    let mut monitor = EnablementMonitor::new(bridge, push).await;

    let result = monitor.wait_enabled(Duration::from_secs(2)).await;
    assert!(result.is_err());
}
