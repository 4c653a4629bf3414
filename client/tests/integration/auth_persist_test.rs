use serde_json::json;

use clinpush_client::auth_persist::{
    AuthBackup, clear_auth_backup, persist_auth_backup, read_auth_backup, restore_session,
};

use crate::helpers::{TestIdentity, memory_bridge, test_session};

fn test_backup() -> AuthBackup {
    AuthBackup::from(&test_session())
}

#[tokio::test]
async fn backup_round_trips_through_the_bridge() {
    let (bridge, backends) = memory_bridge();

    persist_auth_backup(&bridge, &test_backup()).await;

    for backend in &backends {
        assert!(backend.get("auth_backup").is_some());
    }
    let restored = read_auth_backup(&bridge).await.unwrap();
    assert_eq!(restored, test_backup());
}

#[tokio::test]
async fn backup_without_tokens_is_rejected() {
    let (bridge, _backends) = memory_bridge();
    bridge
        .write(
            "auth_backup",
            json!({ "access_token": "", "refresh_token": "" }),
        )
        .await;

    assert!(read_auth_backup(&bridge).await.is_none());
}

#[tokio::test]
async fn clear_removes_the_backup_everywhere() {
    let (bridge, backends) = memory_bridge();
    persist_auth_backup(&bridge, &test_backup()).await;

    clear_auth_backup(&bridge).await;

    for backend in &backends {
        assert!(backend.get("auth_backup").is_none());
    }
}

#[tokio::test]
async fn restore_prefers_the_provider_session() {
    let (bridge, backends) = memory_bridge();
    let identity = TestIdentity::with_session();

    let session = restore_session(&bridge, &identity).await.unwrap();

    assert_eq!(session, test_session());
    assert_eq!(identity.set_session_calls(), 0);
    assert!(
        backends[0].get("auth_backup").is_some(),
        "live session refreshes the backup"
    );
}

#[tokio::test]
async fn restore_falls_back_to_the_backup() {
    let (bridge, _backends) = memory_bridge();
    persist_auth_backup(&bridge, &test_backup()).await;

    let identity = TestIdentity::without_session();
    let session = restore_session(&bridge, &identity).await.unwrap();

    assert_eq!(identity.set_session_calls(), 1);
    assert_eq!(session.access_token, "access-token");
}

#[tokio::test]
async fn restore_yields_nothing_without_session_or_backup() {
    let (bridge, _backends) = memory_bridge();
    let identity = TestIdentity::without_session();
    assert!(restore_session(&bridge, &identity).await.is_none());
}
