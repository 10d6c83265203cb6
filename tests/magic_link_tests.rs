use chrono::{Duration, Utc};
use larder::{
    auth::{LinkOutcome, MagicLinkError, MagicLinkService, SESSION_NONCE, SESSION_USER_ID},
    config::{AppConfig, Environment},
    repositories::{SqliteUserRepository, UserRepository},
    services::ConsoleEmailService,
    test_utils::test_helpers,
};
use std::sync::Arc;

fn test_config() -> AppConfig {
    AppConfig::new(
        "http://localhost:3000",
        "a-test-secret",
        Environment::Development,
    )
}

async fn build_service() -> (MagicLinkService, Arc<SqliteUserRepository>) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let users = Arc::new(SqliteUserRepository::new(pool));
    let service = MagicLinkService::new(
        &test_config(),
        users.clone(),
        Arc::new(ConsoleEmailService),
    );
    (service, users)
}

fn magic_param(link: &str) -> &str {
    link.split("magic=").nth(1).unwrap()
}

#[tokio::test]
async fn existing_user_logs_in_via_link() {
    let (service, users) = build_service().await;
    let session = test_helpers::create_test_session();

    users
        .create("alex@example.com", "Alex", "Smith")
        .await
        .unwrap();

    let issued = service
        .issue_login_attempt(&session, "alex@example.com")
        .await
        .unwrap();
    let link = issued.dev_link.unwrap();

    let outcome = service
        .consume_link(&session, Some(magic_param(&link)))
        .await
        .unwrap();

    match outcome {
        LinkOutcome::Authenticated(user) => assert_eq!(user.email, "alex@example.com"),
        other => panic!("expected authenticated outcome, got {:?}", other),
    }

    let user_id: Option<i64> = session.get(SESSION_USER_ID).await.unwrap();
    assert!(user_id.is_some());
    let nonce: Option<String> = session.get(SESSION_NONCE).await.unwrap();
    assert!(nonce.is_none());
}

#[tokio::test]
async fn invalid_email_is_rejected_before_any_send() {
    let (service, _users) = build_service().await;
    let session = test_helpers::create_test_session();

    let result = service.issue_login_attempt(&session, "not-an-email").await;
    assert!(matches!(result, Err(MagicLinkError::Validation(_))));

    let nonce: Option<String> = session.get(SESSION_NONCE).await.unwrap();
    assert!(nonce.is_none());
}

#[tokio::test]
async fn expired_link_is_rejected_and_clears_nonce() {
    let (service, _users) = build_service().await;
    let session = test_helpers::create_test_session();

    let nonce = "stale-nonce".to_string();
    session.insert(SESSION_NONCE, &nonce).await.unwrap();

    let stale = Utc::now() - Duration::minutes(11);
    let link = service
        .generate_link_at("alex@example.com", &nonce, stale)
        .unwrap();

    let result = service.consume_link(&session, Some(magic_param(&link))).await;
    assert!(matches!(result, Err(MagicLinkError::Expired)));

    let stored: Option<String> = session.get(SESSION_NONCE).await.unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn link_just_inside_ttl_still_validates() {
    let (service, users) = build_service().await;
    let session = test_helpers::create_test_session();

    users
        .create("alex@example.com", "Alex", "Smith")
        .await
        .unwrap();

    let nonce = "fresh-nonce".to_string();
    session.insert(SESSION_NONCE, &nonce).await.unwrap();

    let nine_minutes_ago = Utc::now() - Duration::minutes(9);
    let link = service
        .generate_link_at("alex@example.com", &nonce, nine_minutes_ago)
        .unwrap();

    let outcome = service
        .consume_link(&session, Some(magic_param(&link)))
        .await
        .unwrap();
    assert!(matches!(outcome, LinkOutcome::Authenticated(_)));
}

#[tokio::test]
async fn second_attempt_invalidates_first_link() {
    let (service, users) = build_service().await;
    let session = test_helpers::create_test_session();

    users
        .create("alex@example.com", "Alex", "Smith")
        .await
        .unwrap();

    let first = service
        .issue_login_attempt(&session, "alex@example.com")
        .await
        .unwrap();
    let second = service
        .issue_login_attempt(&session, "alex@example.com")
        .await
        .unwrap();
    let first_link = first.dev_link.unwrap();
    let second_link = second.dev_link.unwrap();

    // The first link carries a nonce the session no longer holds.
    let result = service
        .consume_link(&session, Some(magic_param(&first_link)))
        .await;
    assert!(matches!(result, Err(MagicLinkError::NonceMismatch)));

    // The mismatch also burned the stored nonce, so the second link is
    // now dead too.
    let result = service
        .consume_link(&session, Some(magic_param(&second_link)))
        .await;
    assert!(matches!(result, Err(MagicLinkError::NonceMismatch)));
}

#[tokio::test]
async fn consumed_link_cannot_be_replayed() {
    let (service, users) = build_service().await;
    let session = test_helpers::create_test_session();

    users
        .create("alex@example.com", "Alex", "Smith")
        .await
        .unwrap();

    let issued = service
        .issue_login_attempt(&session, "alex@example.com")
        .await
        .unwrap();
    let link = issued.dev_link.unwrap();

    service
        .consume_link(&session, Some(magic_param(&link)))
        .await
        .unwrap();

    let result = service.consume_link(&session, Some(magic_param(&link))).await;
    assert!(matches!(result, Err(MagicLinkError::NonceMismatch)));
}

#[tokio::test]
async fn missing_magic_parameter_fails_closed() {
    let (service, _users) = build_service().await;
    let session = test_helpers::create_test_session();

    let result = service.consume_link(&session, None).await;
    assert!(matches!(result, Err(MagicLinkError::InvalidPayload(_))));

    let result = service.consume_link(&session, Some("garbage-token")).await;
    assert!(matches!(result, Err(MagicLinkError::InvalidPayload(_))));
}

#[tokio::test]
async fn unknown_email_hands_off_to_signup_and_keeps_nonce() {
    let (service, _users) = build_service().await;
    let session = test_helpers::create_test_session();

    let issued = service
        .issue_login_attempt(&session, "new@example.com")
        .await
        .unwrap();
    let link = issued.dev_link.unwrap();

    let outcome = service
        .consume_link(&session, Some(magic_param(&link)))
        .await
        .unwrap();
    match outcome {
        LinkOutcome::SignupRequired(email) => assert_eq!(email, "new@example.com"),
        other => panic!("expected signup handoff, got {:?}", other),
    }

    // The nonce survives so the signup form can resubmit the same token.
    let nonce: Option<String> = session.get(SESSION_NONCE).await.unwrap();
    assert!(nonce.is_some());

    let user = service
        .complete_signup(&session, Some(magic_param(&link)), "New", "Person")
        .await
        .unwrap();
    assert_eq!(user.email, "new@example.com");

    let user_id: Option<i64> = session.get(SESSION_USER_ID).await.unwrap();
    assert_eq!(user_id, Some(user.id));
    let nonce: Option<String> = session.get(SESSION_NONCE).await.unwrap();
    assert!(nonce.is_none());
}

#[tokio::test]
async fn blank_signup_names_create_no_account() {
    let (service, users) = build_service().await;
    let session = test_helpers::create_test_session();

    let issued = service
        .issue_login_attempt(&session, "new@example.com")
        .await
        .unwrap();
    let link = issued.dev_link.unwrap();
    service
        .consume_link(&session, Some(magic_param(&link)))
        .await
        .unwrap();

    let result = service
        .complete_signup(&session, Some(magic_param(&link)), "  ", "Person")
        .await;
    let Err(MagicLinkError::Validation(errors)) = result else {
        panic!("expected validation failure");
    };
    assert_eq!(
        errors.get("firstName").map(String::as_str),
        Some("First Name cannot be blank.")
    );

    assert!(users.find_by_email("new@example.com").await.unwrap().is_none());
    let user_id: Option<i64> = session.get(SESSION_USER_ID).await.unwrap();
    assert!(user_id.is_none());
}
