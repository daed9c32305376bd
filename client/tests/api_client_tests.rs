use std::sync::Arc;

use serde_json::json;
use tokio::test;

use client::{ApiClient, ClientError};
use session::store::SessionStore;
use session::{AuthState, NavigationGate, SessionManager, Workspace};

mod mock_store;
use mock_store::InMemoryKeyValueStore;
use mock_transport::ScriptedTransport;

struct Harness {
    kv: InMemoryKeyValueStore,
    transport: ScriptedTransport,
    session: Arc<SessionManager>,
    api: ApiClient,
}

async fn harness() -> Harness {
    let kv = InMemoryKeyValueStore::new();
    let store = Arc::new(SessionStore::new(Arc::new(kv.clone())));
    let session = SessionManager::start(store).await;
    let transport = ScriptedTransport::new();
    let api = ApiClient::new(Arc::new(transport.clone()), session.clone());
    Harness {
        kv,
        transport,
        session,
        api,
    }
}

async fn signed_in(token: &str) -> Harness {
    let h = harness().await;
    h.session
        .login(token, "Trader", "7", json!({"name": "Ada"}))
        .await
        .unwrap();
    h
}

#[test]
async fn attaches_current_bearer_token() -> anyhow::Result<()> {
    let h = signed_in("tok1").await;
    h.transport
        .reply("get_profile_data.php", 200, json!({"status": true, "profile": {}}));

    let env = h.api.get("get_profile_data.php").await?;
    assert!(env.ok());

    let sent = h.transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bearer.as_deref(), Some("tok1"));
    Ok(())
}

#[test]
async fn unauthorized_status_forces_logout() -> anyhow::Result<()> {
    let h = signed_in("tok1").await;
    let gate = NavigationGate::new(h.session.subscribe());
    assert_eq!(gate.render(), Workspace::TraderWorkspace);

    h.transport
        .reply("get_collected_walkins.php", 401, json!({"message": "nope"}));

    let err = h.api.get("get_collected_walkins.php").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(err.requires_login());

    assert_eq!(h.session.state(), AuthState::SignedOut);
    assert_eq!(h.kv.len().await, 0);
    assert_eq!(gate.render(), Workspace::Unauthenticated);
    Ok(())
}

#[test]
async fn rejection_message_forces_logout() -> anyhow::Result<()> {
    let h = signed_in("tok1").await;
    h.transport.reply(
        "get_rider_orders.php",
        200,
        json!({"success": false, "message": "Invalid session. Please log in again"}),
    );

    let err = h.api.get("get_rider_orders.php").await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(!h.session.is_logged_in());
    Ok(())
}

#[test]
async fn ordinary_failure_keeps_session() -> anyhow::Result<()> {
    let h = signed_in("tok1").await;
    h.transport.reply(
        "update_order_status.php",
        200,
        json!({"status": false, "message": "Order not found"}),
    );

    let env = h
        .api
        .post_json("update_order_status.php", json!({"order_id": "1"}))
        .await?;
    assert!(!env.ok());
    assert!(h.session.is_logged_in());
    Ok(())
}

#[test]
async fn concurrent_rejections_end_the_session_once() -> anyhow::Result<()> {
    let h = signed_in("tok1").await;
    h.transport.reply("a.php", 401, json!({}));
    h.transport.reply("b.php", 401, json!({}));

    let mut rx = h.session.subscribe();
    rx.mark_unchanged();

    let (a, b) = tokio::join!(h.api.get("a.php"), h.api.get("b.php"));
    // Whichever call lands second may already find the user signed out.
    assert!(a.unwrap_err().requires_login());
    assert!(b.unwrap_err().requires_login());

    assert!(rx.has_changed()?);
    assert_eq!(*rx.borrow_and_update(), AuthState::SignedOut);
    assert!(!rx.has_changed()?);
    Ok(())
}

#[test]
async fn stale_token_rejection_does_not_end_new_session() -> anyhow::Result<()> {
    let h = signed_in("old").await;

    // A newer login replaced the token before the rejection is handled.
    h.session
        .login("new", "Rider", "8", json!({"name": "Bo"}))
        .await?;
    assert!(!h.session.expire("old").await);

    assert_eq!(h.session.token().as_deref(), Some("new"));
    Ok(())
}

#[test]
async fn no_session_means_no_request() -> anyhow::Result<()> {
    let h = harness().await;

    let err = h.api.get("get_profile_data.php").await.unwrap_err();
    assert!(matches!(err, ClientError::NotLoggedIn));
    assert!(h.transport.requests().is_empty());
    Ok(())
}

#[test]
async fn malformed_body_is_reported_without_logout() -> anyhow::Result<()> {
    let h = signed_in("tok1").await;
    h.transport
        .reply_raw("get_inventory.php", 200, "<html>Fatal error</html>");

    let err = h.api.get("get_inventory.php").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
    assert!(h.session.is_logged_in());
    Ok(())
}

#[test]
async fn transport_failure_is_transient_and_keeps_session() -> anyhow::Result<()> {
    let h = signed_in("tok1").await;
    h.transport.fail("get_inventory.php", "connection reset");

    let err = h.api.get("get_inventory.php").await.unwrap_err();
    assert!(err.is_transient());
    assert!(h.session.is_logged_in());
    Ok(())
}

#[tracing_test::traced_test]
#[test]
async fn forced_logout_is_logged() -> anyhow::Result<()> {
    let h = signed_in("tok1").await;
    h.transport.reply("get_workshop_orders.php", 401, json!({}));

    let _ = h.api.get("get_workshop_orders.php").await;
    assert!(logs_contain("backend rejected the session credential"));
    Ok(())
}
