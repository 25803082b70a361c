//! Refresh coordination and boot-time session restoration

mod common;

use common::{stack_for, token_json, user_json};
use cvmatch_client::{ApiError, AuthStatus, NavigationTarget};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seed_tokens(stack: &common::TestStack, access: &str, refresh: &str) {
    stack.store.store_tokens(access, refresh, 3600);
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "OLD_RT"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_json("NEW_AT", "NEW_RT"))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let stack = stack_for(&mock_server.uri());
    seed_tokens(&stack, "OLD_AT", "OLD_RT");

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let refresher = Arc::clone(&stack.refresher);
            tokio::spawn(async move { refresher.refresh().await })
        })
        .collect();

    for result in join_all(tasks).await {
        let tokens = result.unwrap().unwrap();
        assert_eq!(tokens.access_token, "NEW_AT");
    }

    assert!(!stack.refresher.is_inflight());
    assert_eq!(stack.store.access_token().as_deref(), Some("NEW_AT"));
    assert_eq!(stack.store.refresh_token().as_deref(), Some("NEW_RT"));
}

#[tokio::test]
async fn test_concurrent_refresh_failure_fans_out_and_clears_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Refresh token revoked"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let stack = stack_for(&mock_server.uri());
    seed_tokens(&stack, "OLD_AT", "OLD_RT");

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let refresher = Arc::clone(&stack.refresher);
            tokio::spawn(async move { refresher.refresh().await })
        })
        .collect();

    for result in join_all(tasks).await {
        let err = result.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::Authentication { .. }));
    }

    assert!(!stack.store.has_tokens());
    // A later attempt is not wedged by the failed one
    assert!(!stack.refresher.is_inflight());
}

#[tokio::test]
async fn test_startup_refreshes_a_rejected_access_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer OLD_AT"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "OLD_RT"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "NEW_AT",
            "refresh_token": "NEW_RT",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer NEW_AT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let stack = stack_for(&mock_server.uri());
    seed_tokens(&stack, "OLD_AT", "OLD_RT");

    let initializer =
        cvmatch_client::SessionInitializer::new(Arc::clone(&stack.manager));
    let outcome = initializer.initialize("/dashboard").await;

    assert_eq!(outcome.status, AuthStatus::Authenticated);
    assert_eq!(outcome.redirect, None);
    assert_eq!(stack.manager.state().status, AuthStatus::Authenticated);
    assert_eq!(stack.store.access_token().as_deref(), Some("NEW_AT"));
    assert_eq!(stack.store.refresh_token().as_deref(), Some("NEW_RT"));
    assert_eq!(stack.store.user_snapshot().unwrap().email, "a@b.com");
}

#[tokio::test]
async fn test_startup_with_unrecoverable_refresh_signs_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Refresh token revoked"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let stack = stack_for(&mock_server.uri());
    seed_tokens(&stack, "OLD_AT", "OLD_RT");

    let initializer =
        cvmatch_client::SessionInitializer::new(Arc::clone(&stack.manager));
    let outcome = initializer.initialize("/dashboard").await;

    assert_eq!(outcome.status, AuthStatus::Unauthenticated);
    assert!(!stack.store.has_tokens());

    let state = stack.manager.state();
    assert_eq!(state.status, AuthStatus::Unauthenticated);
    assert_eq!(
        state.error.as_deref(),
        Some("Your session has expired. Please sign in again.")
    );
}

#[tokio::test]
async fn test_startup_without_tokens_skips_the_network() {
    // No mock server at all: any request would fail the test with a
    // transport error surfacing in the asserted state
    let stack = stack_for("http://127.0.0.1:9"); // discard port, never dialed

    let initializer =
        cvmatch_client::SessionInitializer::new(Arc::clone(&stack.manager));
    let outcome = initializer.initialize("/dashboard").await;

    assert_eq!(outcome.status, AuthStatus::Unauthenticated);
    assert_eq!(outcome.redirect, None);
    let state = stack.manager.state();
    assert_eq!(state.status, AuthStatus::Unauthenticated);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_cached_snapshot_paints_before_revalidation_returns() {
    let mock_server = MockServer::start().await;

    // Revalidation is still pending when initialize() must have settled
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&mock_server)
        .await;

    let stack = stack_for(&mock_server.uri());
    seed_tokens(&stack, "AT", "RT");
    let user: cvmatch_common::UserProfile = serde_json::from_value(user_json()).unwrap();
    stack.store.store_user_snapshot(&user);

    let initializer =
        cvmatch_client::SessionInitializer::new(Arc::clone(&stack.manager));
    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        initializer.initialize("/dashboard"),
    )
    .await
    .expect("cached-snapshot init must not wait for the network");

    assert_eq!(outcome.status, AuthStatus::Authenticated);
    assert_eq!(
        stack.manager.state().user.unwrap().email,
        "a@b.com"
    );
}

#[tokio::test]
async fn test_restored_session_redirects_away_from_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&mock_server)
        .await;

    let stack = stack_for(&mock_server.uri());
    seed_tokens(&stack, "AT", "RT");
    let user: cvmatch_common::UserProfile = serde_json::from_value(user_json()).unwrap();
    stack.store.store_user_snapshot(&user);

    let initializer =
        cvmatch_client::SessionInitializer::new(Arc::clone(&stack.manager));
    let outcome = initializer.initialize("/login").await;

    assert_eq!(outcome.status, AuthStatus::Authenticated);
    assert_eq!(outcome.redirect, Some(NavigationTarget::Dashboard));
}

#[tokio::test]
async fn test_redirect_matching_ignores_query_and_fragment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&mock_server)
        .await;

    let stack = stack_for(&mock_server.uri());
    seed_tokens(&stack, "AT", "RT");
    let user: cvmatch_common::UserProfile = serde_json::from_value(user_json()).unwrap();
    stack.store.store_user_snapshot(&user);

    let initializer =
        cvmatch_client::SessionInitializer::new(Arc::clone(&stack.manager));
    let outcome = initializer.initialize("/login?next=/dashboard#top").await;

    assert_eq!(outcome.status, AuthStatus::Authenticated);
    assert_eq!(outcome.redirect, Some(NavigationTarget::Dashboard));
}

#[tokio::test]
async fn test_initialize_is_not_reentrant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json())
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let stack = stack_for(&mock_server.uri());
    seed_tokens(&stack, "AT", "RT");

    let initializer = Arc::new(cvmatch_client::SessionInitializer::new(Arc::clone(
        &stack.manager,
    )));

    // Double-mount: the second trigger must not start a second sequence
    let (first, second) = tokio::join!(
        initializer.initialize("/dashboard"),
        initializer.initialize("/dashboard"),
    );

    let statuses = [first.status, second.status];
    assert!(statuses.contains(&AuthStatus::Authenticated));
    assert!(statuses.contains(&AuthStatus::Initializing));
}
