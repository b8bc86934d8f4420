use anyhow::Result;
use std::time::Duration;

use channel_dashboard::dialogue::{validate_post_text, DashboardSessions, DialogState};

/// Test dialogue state serialization
#[tokio::test]
async fn test_dialogue_state_serialization() -> Result<()> {
    let json = serde_json::to_string(&DialogState::AwaitingPost)?;
    assert_eq!(json, "\"AwaitingPost\"");

    let state: DialogState = serde_json::from_str("\"AwaitingImage\"")?;
    assert_eq!(state, DialogState::AwaitingImage);

    Ok(())
}

/// Test basic dialogue functionality
#[tokio::test]
async fn test_dialogue_default_is_idle() -> Result<()> {
    let default_state = DialogState::default();
    assert!(matches!(default_state, DialogState::Idle));

    Ok(())
}

/// Sessions are independent per user
#[tokio::test]
async fn test_sessions_keyed_by_user() -> Result<()> {
    let sessions = DashboardSessions::new(Duration::from_secs(300));

    sessions.begin(42, DialogState::AwaitingImage).await;
    sessions.begin(7, DialogState::AwaitingPost).await;

    assert_eq!(sessions.state(42).await, DialogState::AwaitingImage);
    assert_eq!(sessions.state(7).await, DialogState::AwaitingPost);
    assert_eq!(sessions.len().await, 2);

    // Starting another dialog replaces the previous one
    sessions.begin(42, DialogState::AwaitingPost).await;
    assert_eq!(sessions.state(42).await, DialogState::AwaitingPost);

    // Beginning Idle clears the session
    sessions.begin(7, DialogState::Idle).await;
    assert_eq!(sessions.state(7).await, DialogState::Idle);
    assert_eq!(sessions.len().await, 1);

    Ok(())
}

/// Finishing an expired session reports Idle
#[tokio::test]
async fn test_finish_after_timeout() -> Result<()> {
    let sessions = DashboardSessions::new(Duration::from_millis(20));
    sessions.begin(1, DialogState::AwaitingImage).await;

    tokio::time::sleep(Duration::from_millis(40)).await;

    assert_eq!(sessions.finish(1).await, DialogState::Idle);
    assert!(sessions.is_empty().await);

    Ok(())
}

/// Unit test for post text validation
#[test]
fn test_post_text_validation() {
    assert!(validate_post_text("Hello").is_ok());
    assert!(validate_post_text("multi\nline\npost").is_ok());

    assert_eq!(validate_post_text(""), Err("empty"));
    assert_eq!(validate_post_text("   "), Err("empty"));
    assert_eq!(validate_post_text(&"a".repeat(4097)), Err("too_long"));
}
