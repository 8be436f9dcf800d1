//! Directory logins, seeding and notifications

use std::sync::Arc;

use meref_portal::{
    Error,
    directory::{AccountSpec, Directory, DirectoryError},
    session::{AuthEvent, IdentitySource},
};

#[tokio::test]
async fn test_authenticate() {
    let directory = Directory::new();
    let created = directory
        .create_account(
            AccountSpec::new("Awa@Meref.example", "correct-password")
                .with_role_claim("meref_admin")
                .with_display_name("Awa Diop"),
        )
        .await
        .unwrap();
    assert_eq!(created.email, "awa@meref.example");

    let identity = directory
        .authenticate("awa@meref.example", "correct-password")
        .await
        .unwrap();
    assert_eq!(identity, created);
    assert_eq!(identity.label(), "Awa Diop");

    let err = directory
        .authenticate("awa@meref.example", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Directory(DirectoryError::InvalidCredentials)));

    let err = directory
        .authenticate("nobody@meref.example", "correct-password")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Directory(DirectoryError::InvalidCredentials)));
    assert!(err.is_authentication_error());
}

#[tokio::test]
async fn test_disabled_accounts_cannot_log_in() {
    let directory = Directory::new();
    let identity = directory
        .create_account(AccountSpec::new("x@sfd.example", "pw"))
        .await
        .unwrap();
    directory.disable(&identity.id).await.unwrap();

    let err = directory.authenticate("x@sfd.example", "pw").await.unwrap_err();
    assert!(matches!(err, Error::Directory(DirectoryError::AccountDisabled { .. })));
    assert!(directory.current_user(&identity.id).await.is_none());

    directory.enable(&identity.id).await.unwrap();
    assert!(directory.authenticate("x@sfd.example", "pw").await.is_ok());
}

#[tokio::test]
async fn test_unknown_account_operations() {
    let directory = Arc::new(Directory::new());
    let err = directory.set_role_claim("missing", Some("admin")).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(directory.disable("missing").await.unwrap_err().is_not_found());
    assert!(directory.identity_source("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_account_source_emits_changes() {
    let directory = Arc::new(Directory::new());
    let identity = directory
        .create_account(AccountSpec::new("y@sfd.example", "pw").with_role_claim("user"))
        .await
        .unwrap();

    let source = directory.identity_source(&identity.id).await.unwrap();
    assert_eq!(source.account_id(), identity.id);
    let mut events = source.subscribe();

    // Logins do not broadcast to sessions that already exist.
    directory.authenticate("y@sfd.example", "pw").await.unwrap();
    assert!(events.try_recv().is_err());

    directory.set_role_claim(&identity.id, Some("sfd_admin")).await.unwrap();
    match events.recv().await.unwrap() {
        AuthEvent::TokenRefreshed(updated) => {
            assert_eq!(updated.role_claim.as_deref(), Some("sfd_admin"))
        }
        other => panic!("unexpected event {other:?}"),
    }

    directory.disable(&identity.id).await.unwrap();
    assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
    assert_eq!(source.current_user().await.unwrap(), None);

    // Re-enabling does not revive sources created before the suspension.
    directory.enable(&identity.id).await.unwrap();
    assert_eq!(source.current_user().await.unwrap(), None);
    let fresh = directory.identity_source(&identity.id).await.unwrap();
    assert_eq!(
        fresh.current_user().await.unwrap().map(|i| i.id),
        Some(identity.id.clone())
    );
}

#[tokio::test]
async fn test_seed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(
        &path,
        r#"[
            {"email": "admin@meref.example", "password": "a", "role": "admin"},
            {"email": "agent@sfd.example", "password": "b", "role_claim": "sfd_admin", "display_name": "Agent"},
            {"email": "client@example.org", "password": "c"}
        ]"#,
    )
    .unwrap();

    let directory = Directory::from_seed_file(&path).await.unwrap();
    let accounts = directory.list_accounts().await;
    let emails: Vec<&str> = accounts.iter().map(|a| a.identity.email.as_str()).collect();
    assert_eq!(
        emails,
        vec!["admin@meref.example", "agent@sfd.example", "client@example.org"]
    );
    assert_eq!(accounts[0].identity.role_claim.as_deref(), Some("admin"));
    assert_eq!(accounts[2].identity.role_claim, None);
}

#[tokio::test]
async fn test_invalid_seed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, r#"{"email": "not-a-list"}"#).unwrap();

    let err = Directory::from_seed_file(&path).await.unwrap_err();
    assert!(matches!(err, Error::Directory(DirectoryError::InvalidSeed { .. })));
}
