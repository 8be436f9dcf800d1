//! Guard decisions for the portal's typical pages

use meref_portal::{
    GuardDecision, PortalConfig, RouteGuard, Session,
    auth::Role,
    guard::{RedirectAttachment, RedirectReason},
};

use crate::helpers::session_with_claim;

#[test]
fn test_signed_out_admin_page_redirects_to_default_fallback() {
    let guard = RouteGuard::with_roles([Role::Admin]);
    let decision = guard.check(&Session::signed_out(), "/admin");

    match decision {
        GuardDecision::Redirect(redirect) => {
            assert_eq!(redirect.target, "/auth");
            assert_eq!(redirect.attachment.origin_path, "/admin");
            assert_eq!(redirect.reason(), RedirectReason::NotAuthenticated);
        }
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn test_sfd_admin_enters_shared_admin_page() {
    let guard = RouteGuard::with_roles([Role::Admin, Role::SfdAdmin]);
    assert_eq!(
        guard.check(&session_with_claim("sfd_admin"), "/sfd/loans"),
        GuardDecision::Allow
    );
}

#[test]
fn test_plain_user_denied_admin_page() {
    let guard = RouteGuard::with_roles([Role::Admin]);
    let decision = guard.check(&session_with_claim("user"), "/admin");

    let redirect = decision.redirect().expect("expected redirect");
    assert_eq!(redirect.target, "/auth");
    assert_eq!(redirect.reason(), RedirectReason::AccessDenied);
    assert_eq!(
        redirect.location(),
        "/auth?from=%2Fadmin&reason=access_denied"
    );
}

#[test]
fn test_denied_and_unauthenticated_redirects_are_distinguishable() {
    let config = PortalConfig::default();
    let guard = config.role_guard([Role::MerefAdmin]);

    let unauthenticated = guard.check(&Session::signed_out(), "/meref");
    let denied = guard.check(&session_with_claim("sfd_admin"), "/meref");

    let unauthenticated = unauthenticated.redirect().unwrap();
    let denied = denied.redirect().unwrap();
    assert_eq!(unauthenticated.target, denied.target);
    assert_ne!(unauthenticated.location(), denied.location());
    assert!(!unauthenticated.attachment.is_access_denied());
    assert!(denied.attachment.is_access_denied());
}

#[test]
fn test_login_page_recovers_origin_for_redirect_back() {
    let guard = PortalConfig::default().authenticated_guard();
    let decision = guard.check(&Session::signed_out(), "/settings/biometric?tab=security");
    let location = decision.redirect().unwrap().location();

    let (path, query) = location.split_once('?').unwrap();
    assert_eq!(path, "/auth");
    let attachment = RedirectAttachment::from_query(query).unwrap();
    assert_eq!(attachment.return_path(), Some("/settings/biometric?tab=security"));
}

#[test]
fn test_guard_is_pure() {
    let guard = RouteGuard::with_roles([Role::SfdAdmin]).fallback_path("/dashboard");
    let session = session_with_claim("user");
    let first = guard.check(&session, "/sfd");
    let second = guard.check(&session, "/sfd");
    assert_eq!(first, second);
    assert_eq!(session, session_with_claim("user"));
}
