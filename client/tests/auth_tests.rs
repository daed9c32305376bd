use std::sync::Arc;

use serde_json::json;
use tokio::test;

use client::http::Body;
use client::{ApiClient, AuthService, ClientError};
use session::store::SessionStore;
use session::{AuthState, NavigationGate, Role, SessionManager, Workspace};

mod mock_store;
use mock_store::InMemoryKeyValueStore;
use mock_transport::ScriptedTransport;

async fn setup(validate: bool) -> (InMemoryKeyValueStore, ScriptedTransport, AuthService) {
    let kv = InMemoryKeyValueStore::new();
    let store = Arc::new(SessionStore::new(Arc::new(kv.clone())));
    let session = SessionManager::start(store).await;
    let transport = ScriptedTransport::new();
    let api = ApiClient::new(Arc::new(transport.clone()), session);
    (kv, transport, AuthService::new(api, validate))
}

fn login_ok(transport: &ScriptedTransport, role: &str) {
    transport.reply(
        "login_with_code.php",
        200,
        json!({
            "success": true,
            "token": "Bearer abc123",
            "role": role,
            "user_id": 42,
            "user": {"name": "Ada", "phone": "0803"}
        }),
    );
}

#[test]
async fn code_login_establishes_session() -> anyhow::Result<()> {
    let (kv, transport, auth) = setup(false).await;
    login_ok(&transport, "Trader");

    let session = auth.login_with_code("0803", "1234").await?;
    assert_eq!(session.token, "abc123");
    assert_eq!(session.role, Role::Trader);
    assert_eq!(session.user_id, "42");

    assert_eq!(kv.get("token").await.as_deref(), Some("abc123"));
    assert_eq!(kv.get("user_id").await.as_deref(), Some("42"));

    let sent = transport.requests_to("login_with_code.php");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].bearer.is_none());
    assert_eq!(
        sent[0].body,
        Body::Json(json!({"phone": "0803", "access_code": "1234"}))
    );
    Ok(())
}

#[test]
async fn refused_login_keeps_user_signed_out() -> anyhow::Result<()> {
    let (kv, transport, auth) = setup(true).await;
    transport.reply(
        "login_with_code.php",
        200,
        json!({"success": false, "message": "Wrong code"}),
    );

    let err = auth.login_with_code("0803", "0000").await.unwrap_err();
    match err {
        ClientError::Rejected(m) => assert_eq!(m, "Wrong code"),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(kv.len().await, 0);
    assert!(transport.requests_to("validate_token.php").is_empty());
    Ok(())
}

#[test]
async fn validation_overrides_role_and_user_id() -> anyhow::Result<()> {
    let (_kv, transport, auth) = setup(true).await;
    login_ok(&transport, "Trader");
    transport.reply(
        "validate_token.php",
        200,
        json!({"success": true, "role": "RIDER", "user_id": "42"}),
    );

    let session = auth.login_with_code("0803", "1234").await?;
    assert_eq!(session.role, Role::Rider);

    let sent = transport.requests_to("validate_token.php");
    assert_eq!(sent[0].bearer.as_deref(), Some("abc123"));
    Ok(())
}

#[test]
async fn failed_validation_leaves_session_untouched() -> anyhow::Result<()> {
    let (kv, transport, auth) = setup(true).await;
    login_ok(&transport, "Trader");
    transport.reply("validate_token.php", 200, json!({"success": false}));

    let err = auth.login_with_code("0803", "1234").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(_)));
    assert_eq!(kv.len().await, 0);
    Ok(())
}

#[test]
async fn garbled_validation_reply_is_a_refusal() -> anyhow::Result<()> {
    let (_kv, transport, auth) = setup(true).await;
    login_ok(&transport, "Trader");
    transport.reply_raw("validate_token.php", 500, "Internal Server Error");

    let err = auth.login_with_code("0803", "1234").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(_)));
    Ok(())
}

#[test]
async fn login_without_token_is_invalid_response() -> anyhow::Result<()> {
    let (_kv, transport, auth) = setup(false).await;
    transport.reply(
        "login_with_code.php",
        200,
        json!({"success": true, "role": "trader", "user_id": 1, "user": {}}),
    );

    let err = auth.login_with_code("0803", "1234").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
    Ok(())
}

#[test]
async fn switch_role_moves_gate_to_new_workspace() -> anyhow::Result<()> {
    let kv = InMemoryKeyValueStore::new();
    let store = Arc::new(SessionStore::new(Arc::new(kv.clone())));
    let session = SessionManager::start(store).await;
    let transport = ScriptedTransport::new();
    let api = ApiClient::new(Arc::new(transport.clone()), session.clone());
    let auth = AuthService::new(api, false);
    let gate = NavigationGate::new(session.subscribe());

    login_ok(&transport, "trader");
    auth.login_with_code("0803", "1234").await?;
    assert_eq!(gate.render(), Workspace::TraderWorkspace);

    transport.reply("switch_role.php", 200, json!({"status": "success"}));
    let switched = auth.switch_role("rider", "9999").await?;

    assert_eq!(switched.role, Role::Rider);
    assert_eq!(switched.token, "abc123");
    assert_eq!(gate.render(), Workspace::RiderWorkspace);
    assert_eq!(kv.get("role").await.as_deref(), Some("rider"));

    let sent = transport.requests_to("switch_role.php");
    assert_eq!(
        sent[0].body,
        Body::Form(vec![
            ("user_id".into(), "42".into()),
            ("new_role".into(), "rider".into()),
            ("access_code".into(), "9999".into()),
        ])
    );
    Ok(())
}

#[test]
async fn refused_role_switch_keeps_current_role() -> anyhow::Result<()> {
    let (_kv, transport, auth) = setup(false).await;
    login_ok(&transport, "trader");
    auth.login_with_code("0803", "1234").await?;

    transport.reply("switch_role.php", 200, json!({"status": false}));
    let err = auth.switch_role("rider", "0000").await.unwrap_err();
    match err {
        ClientError::Rejected(m) => assert_eq!(m, "Invalid access code"),
        other => panic!("unexpected: {other:?}"),
    }

    let err = auth.switch_role("", "0000").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(_)));
    Ok(())
}

#[test]
async fn logout_is_local_and_idempotent() -> anyhow::Result<()> {
    let (kv, transport, auth) = setup(false).await;
    login_ok(&transport, "trader");
    auth.login_with_code("0803", "1234").await?;

    assert!(auth.logout().await);
    assert!(!auth.logout().await);
    assert_eq!(kv.len().await, 0);
    assert_eq!(transport.requests().len(), 1);
    Ok(())
}

#[test]
async fn profile_reads_payload() -> anyhow::Result<()> {
    let (_kv, transport, auth) = setup(false).await;
    login_ok(&transport, "trader");
    auth.login_with_code("0803", "1234").await?;

    transport.reply(
        "get_profile_data.php",
        200,
        json!({"status": true, "profile": {"name": "Ada", "shop": "Clean Co"}}),
    );
    let profile = auth.profile().await?;
    assert_eq!(profile["shop"], "Clean Co");
    Ok(())
}

#[test]
async fn restored_session_needs_no_network() -> anyhow::Result<()> {
    let (kv, transport, auth) = setup(false).await;
    login_ok(&transport, "trader");
    auth.login_with_code("0803", "1234").await?;

    let store = Arc::new(SessionStore::new(Arc::new(kv.clone())));
    let restarted = SessionManager::start(store).await;
    assert!(matches!(restarted.state(), AuthState::SignedIn(_)));
    assert_eq!(transport.requests().len(), 1);
    Ok(())
}
