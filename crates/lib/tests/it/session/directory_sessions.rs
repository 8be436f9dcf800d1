//! Sessions following accounts in the in-process directory

use std::sync::Arc;

use meref_portal::{
    RouteGuard, SessionProvider,
    auth::Role,
    directory::{AccountSpec, Directory},
};

use crate::helpers::wait_for_session;

async fn directory_with_user(claim: &str) -> (Arc<Directory>, String) {
    let directory = Arc::new(Directory::new());
    let identity = directory
        .create_account(AccountSpec::new("ousmane@sfd.example", "s3cret").with_role_claim(claim))
        .await
        .unwrap();
    (directory, identity.id)
}

#[tokio::test]
async fn test_role_change_reaches_live_session() {
    let (directory, account_id) = directory_with_user("user").await;
    let source = directory.identity_source(&account_id).await.unwrap();
    let provider = SessionProvider::start(Arc::new(source));
    let admin_guard = RouteGuard::with_roles([Role::Admin]);

    let session = provider.ready().await;
    assert!(!admin_guard.check(&session, "/admin").is_allowed());

    directory.set_role_claim(&account_id, Some("admin")).await.unwrap();
    let session =
        wait_for_session(&provider, |s| s.raw_role_claim.as_deref() == Some("admin")).await;
    assert!(admin_guard.check(&session, "/admin").is_allowed());
}

#[tokio::test]
async fn test_disabling_account_signs_session_out() {
    let (directory, account_id) = directory_with_user("sfd_admin").await;
    let source = directory.identity_source(&account_id).await.unwrap();
    let provider = SessionProvider::start(Arc::new(source));
    assert!(provider.ready().await.is_authenticated());

    directory.disable(&account_id).await.unwrap();
    let session = wait_for_session(&provider, |s| s.user.is_none()).await;

    let decision = RouteGuard::authenticated().check(&session, "/dashboard");
    assert_eq!(decision.redirect().unwrap().target, "/auth");
}

#[tokio::test]
async fn test_disabled_account_resolves_signed_out() {
    let (directory, account_id) = directory_with_user("user").await;
    directory.disable(&account_id).await.unwrap();

    let source = directory.identity_source(&account_id).await.unwrap();
    let provider = SessionProvider::start(Arc::new(source));
    assert!(!provider.ready().await.is_authenticated());
}

#[tokio::test]
async fn test_revoked_session_stays_signed_out_after_reenable() {
    let (directory, account_id) = directory_with_user("admin").await;
    let source = directory.identity_source(&account_id).await.unwrap();
    let revoked = SessionProvider::start(Arc::new(source));
    assert!(revoked.ready().await.is_authenticated());

    directory.disable(&account_id).await.unwrap();
    wait_for_session(&revoked, |s| s.user.is_none()).await;

    // The account comes back and signs in from another device.
    directory.enable(&account_id).await.unwrap();
    directory
        .authenticate("ousmane@sfd.example", "s3cret")
        .await
        .unwrap();
    let source = directory.identity_source(&account_id).await.unwrap();
    let current = SessionProvider::start(Arc::new(source));
    assert!(current.ready().await.is_authenticated());

    // Later changes reach the new session only.
    directory.set_role_claim(&account_id, Some("sfd_admin")).await.unwrap();
    wait_for_session(&current, |s| s.raw_role_claim.as_deref() == Some("sfd_admin")).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let session = revoked.session();
    assert!(!session.is_authenticated());
    assert!(!RouteGuard::authenticated().check(&session, "/dashboard").is_allowed());
}
