//! SessionProvider lifecycle against a scripted identity source

use meref_portal::{
    RouteGuard, Session, SessionProvider,
    auth::Role,
    session::AuthEvent,
};

use crate::helpers::{FakeIdentitySource, identity_with_claim, wait_for_session};

#[tokio::test]
async fn test_resolves_signed_in_user() {
    let source = FakeIdentitySource::signed_in(identity_with_claim("meref_admin"));
    let provider = SessionProvider::start(source);

    let session = provider.ready().await;
    assert!(session.is_authenticated());
    assert_eq!(session.raw_role_claim.as_deref(), Some("meref_admin"));
}

#[tokio::test]
async fn test_unreachable_source_routes_to_login() {
    let provider = SessionProvider::start(FakeIdentitySource::unreachable());

    let session = provider.ready().await;
    assert_eq!(session, Session::signed_out());

    let decision = RouteGuard::authenticated().check(&session, "/dashboard");
    assert_eq!(decision.redirect().unwrap().target, "/auth");
}

#[tokio::test]
async fn test_guard_follows_session_changes() {
    let source = FakeIdentitySource::signed_out();
    let provider = SessionProvider::start(source.clone());
    let guard = RouteGuard::with_roles([Role::SfdAdmin]);

    assert!(guard.check(&provider.ready().await, "/sfd").redirect().is_some());

    source.emit(AuthEvent::SignedIn(identity_with_claim("user")));
    let session = wait_for_session(&provider, |s| s.user.is_some()).await;
    assert!(guard.check(&session, "/sfd").redirect().unwrap().attachment.is_access_denied());

    source.emit(AuthEvent::TokenRefreshed(identity_with_claim("sfd_admin")));
    let session =
        wait_for_session(&provider, |s| s.raw_role_claim.as_deref() == Some("sfd_admin")).await;
    assert!(guard.check(&session, "/sfd").is_allowed());

    source.emit(AuthEvent::SignedOut);
    let session = wait_for_session(&provider, |s| s.user.is_none()).await;
    assert!(!session.is_loading);
    assert!(!guard.check(&session, "/sfd").is_allowed());
}

#[tokio::test]
async fn test_dropping_provider_releases_subscription() {
    let source = FakeIdentitySource::signed_out();
    {
        let provider = SessionProvider::start(source.clone());
        provider.ready().await;
        assert_eq!(source.subscriber_count(), 1);
    }

    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while source.subscriber_count() > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("subscription outlived its provider");
}

#[tokio::test]
async fn test_many_events_settle_on_latest_state() {
    let source = FakeIdentitySource::signed_out();
    let provider = SessionProvider::start(source.clone());
    provider.ready().await;

    // More events than the channel holds; the provider may lag and re-read.
    for i in 0..40 {
        let claim = if i % 2 == 0 { "user" } else { "admin" };
        source.emit(AuthEvent::TokenRefreshed(identity_with_claim(claim)));
    }
    source.emit(AuthEvent::TokenRefreshed(identity_with_claim("meref_admin")));

    let session =
        wait_for_session(&provider, |s| s.raw_role_claim.as_deref() == Some("meref_admin")).await;
    assert!(session.is_authenticated());
}
