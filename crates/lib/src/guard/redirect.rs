//! Redirect values produced by route guards

use url::form_urlencoded;

use crate::constants::{ACCESS_DENIED_MARKER, FROM_PARAM, REASON_PARAM};

/// Why a guard redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// Nobody is signed in.
    NotAuthenticated,
    /// The signed-in user lacks every allowed role.
    AccessDenied,
}

impl RedirectReason {
    /// The query marker for this reason. Unauthenticated redirects carry none.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            RedirectReason::NotAuthenticated => None,
            RedirectReason::AccessDenied => Some(ACCESS_DENIED_MARKER),
        }
    }
}

/// State carried along a redirect so the destination can send the user back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectAttachment {
    /// The location originally requested
    pub origin_path: String,
    pub reason: RedirectReason,
}

impl RedirectAttachment {
    /// Recover an attachment from a redirect's query string.
    ///
    /// Returns `None` when no origin was carried.
    pub fn from_query(query: &str) -> Option<Self> {
        let mut origin_path = None;
        let mut reason = RedirectReason::NotAuthenticated;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                FROM_PARAM => origin_path = Some(value.into_owned()),
                REASON_PARAM if value == ACCESS_DENIED_MARKER => {
                    reason = RedirectReason::AccessDenied
                }
                _ => {}
            }
        }
        origin_path.map(|origin_path| Self {
            origin_path,
            reason,
        })
    }

    /// The origin, if it is safe to navigate back to.
    pub fn return_path(&self) -> Option<&str> {
        is_local_path(&self.origin_path).then_some(self.origin_path.as_str())
    }

    pub fn is_access_denied(&self) -> bool {
        self.reason == RedirectReason::AccessDenied
    }
}

/// A navigation instruction returned by a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRedirect {
    /// Path to navigate to
    pub target: String,
    pub attachment: RedirectAttachment,
}

impl GuardRedirect {
    pub fn new(target: &str, origin_path: &str, reason: RedirectReason) -> Self {
        Self {
            target: target.to_string(),
            attachment: RedirectAttachment {
                origin_path: origin_path.to_string(),
                reason,
            },
        }
    }

    pub fn reason(&self) -> RedirectReason {
        self.attachment.reason
    }

    /// Render as a URL with the attachment encoded in the query string.
    pub fn location(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair(FROM_PARAM, &self.attachment.origin_path);
        if let Some(marker) = self.attachment.reason.marker() {
            query.append_pair(REASON_PARAM, marker);
        }
        let separator = if self.target.contains('?') { '&' } else { '?' };
        format!("{}{separator}{}", self.target, query.finish())
    }
}

/// Check that `path` stays on this site.
///
/// Accepts absolute paths only; protocol-relative (`//host`) and backslash
/// forms are rejected. Control characters are rejected too, since browsers
/// strip tabs and newlines and `/\t/host` would become `//host`.
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}
