//! HTML templates for the web interface
//!
//! Simple inline HTML templates without a template engine.

use chrono::Utc;
use meref_portal::{
    auth::Role,
    directory::AccountSummary,
    format::{format_date, format_datetime, truncate},
    session::Identity,
};

/// Longest email or name shown in tables before truncation
const TABLE_TEXT_LIMIT: usize = 32;

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1000px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f4f6f3;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #1d3b2a;
        border-bottom: 2px solid #2e7d4f;
        padding-bottom: 10px;
    }
    h2 {
        color: #444;
        margin-top: 30px;
    }
    .info-row {
        margin: 10px 0;
        padding: 8px;
        background: #f7f9f7;
        border-radius: 4px;
    }
    .label {
        font-weight: bold;
        color: #666;
        display: inline-block;
        width: 170px;
    }
    .value {
        color: #2e7d4f;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="email"],
    input[type="password"],
    select {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    button {
        background: #2e7d4f;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    button:hover {
        background: #23613d;
    }
    button:disabled {
        background: #aaa;
        cursor: not-allowed;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    table {
        width: 100%;
        border-collapse: collapse;
        margin: 20px 0;
    }
    th, td {
        text-align: left;
        padding: 12px;
        border-bottom: 1px solid #ddd;
    }
    th {
        background: #eef2ee;
        color: #333;
    }
    .error {
        color: #b03a2e;
        background: #f6dedb;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .notice {
        color: #7a5b00;
        background: #fff4d1;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .code {
        font-family: monospace;
        background: #f5f5f5;
        padding: 2px 6px;
        border-radius: 3px;
        font-size: 13px;
    }
    nav a {
        margin-right: 16px;
        color: #2e7d4f;
    }
    footer {
        margin-top: 30px;
        color: #999;
        font-size: 12px;
    }
"#;

/// A link to a portal area, shown when the visitor may open it.
pub struct NavLink {
    pub path: &'static str,
    pub title: &'static str,
}

/// The signed-in visitor, as shown in page headers.
pub struct Viewer<'a> {
    pub identity: &'a Identity,
    pub roles: Vec<Role>,
}

impl Viewer<'_> {
    fn roles_html(&self) -> String {
        if self.roles.is_empty() {
            r#"<span style="color: #999;">none</span>"#.to_string()
        } else {
            self.roles
                .iter()
                .map(|r| format!(r#"<span class="code">{r}</span>"#))
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

/// Wrap `body` in the common page chrome.
fn page(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    {head_extra}
    <title>MEREF Portal - {title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        {body}
        <footer>Generated {generated}</footer>
    </div>
</body>
</html>"#,
        title = html_escape(title),
        generated = format_datetime(Utc::now()),
    )
}

/// Header with the page title, navigation and a logout button.
fn header(title: &str, links: &[NavLink]) -> String {
    let nav: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">{}</a>"#, l.path, html_escape(l.title)))
        .collect();
    format!(
        r#"<h1>{}
            <form method="POST" action="/logout" style="display: inline;">
                <button type="submit" class="logout-btn">Logout</button>
            </form>
        </h1>
        <nav>{nav}</nav>"#,
        html_escape(title)
    )
}

fn message(class: &str, text: Option<&str>) -> String {
    text.map_or(String::new(), |t| {
        format!(r#"<div class="{class}">{}</div>"#, html_escape(t))
    })
}

/// Render the login page
///
/// `from` is posted back so the visitor returns to the page they asked for.
pub fn login_page(
    auth_path: &str,
    error: Option<&str>,
    notice: Option<&str>,
    from: Option<&str>,
) -> String {
    let from_field = from.map_or(String::new(), |f| {
        format!(
            r#"<input type="hidden" name="from" value="{}">"#,
            html_escape(f)
        )
    });

    let body = format!(
        r#"<h1>MEREF Portal</h1>
        <h2>Sign in</h2>
        {notice}
        {error}
        <form method="POST" action="{action}">
            {from_field}
            <div class="form-group">
                <label for="email">Email:</label>
                <input type="email" id="email" name="email" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Sign in</button>
        </form>"#,
        notice = message("notice", notice),
        error = message("error", error),
        action = html_escape(auth_path),
    );
    page("Sign in", "", &body)
}

/// Render the page shown while the session is still resolving
///
/// Reloads `location` shortly so the guard runs again once resolved.
pub fn loading_page(location: &str) -> String {
    let refresh = format!(
        r#"<meta http-equiv="refresh" content="1;url={}">"#,
        html_escape(location)
    );
    page(
        "Loading",
        &refresh,
        r#"<h1>MEREF Portal</h1>
        <p>Loading your session&hellip;</p>"#,
    )
}

/// Render the dashboard page
pub fn dashboard_page(
    viewer: &Viewer<'_>,
    links: &[NavLink],
    notice: Option<&str>,
    biometric_enabled: Option<bool>,
) -> String {
    let biometric = match biometric_enabled {
        Some(true) => r#"<span style="color: #2e7d4f;">Enabled</span>"#,
        Some(false) => r#"<span style="color: #999;">Disabled</span>"#,
        None => r#"<span style="color: #999;">Unavailable</span>"#,
    };

    let body = format!(
        r#"{header}
        {notice}
        <h2>Account</h2>
        <div class="info-row">
            <span class="label">Name:</span>
            <span class="value">{name}</span>
        </div>
        <div class="info-row">
            <span class="label">Email:</span>
            <span class="value">{email}</span>
        </div>
        <div class="info-row">
            <span class="label">Roles:</span>
            <span class="value">{roles}</span>
        </div>
        <div class="info-row">
            <span class="label">Biometric sign-in:</span>
            <span class="value">{biometric}</span>
            <a href="/settings/biometric" style="margin-left: 12px;">Change</a>
        </div>
        <div class="info-row">
            <span class="label">Today:</span>
            <span class="value">{today}</span>
        </div>"#,
        header = header("Dashboard", links),
        notice = message("notice", notice),
        name = html_escape(viewer.identity.label()),
        email = html_escape(&viewer.identity.email),
        roles = viewer.roles_html(),
        today = format_date(Utc::now().date_naive()),
    );
    page("Dashboard", "", &body)
}

/// Render the account administration page
pub fn admin_page(
    links: &[NavLink],
    accounts: &[AccountSummary],
    error: Option<&str>,
) -> String {
    let role_options = |current: Option<&str>| -> String {
        let mut options = format!(
            r#"<option value=""{}>none</option>"#,
            if current.is_none() { " selected" } else { "" }
        );
        for role in Role::ALL {
            let selected = if current == Some(role.as_str()) {
                " selected"
            } else {
                ""
            };
            options.push_str(&format!(r#"<option value="{role}"{selected}>{role}</option>"#));
        }
        options
    };

    let rows: String = accounts
        .iter()
        .map(|account| {
            let identity = &account.identity;
            let status = if account.disabled {
                r#"<span style="color: #b03a2e;">Disabled</span>"#
            } else {
                r#"<span style="color: #2e7d4f;">Active</span>"#
            };
            format!(
                r#"<tr>
                    <td title="{email}">{email_short}</td>
                    <td>{name}</td>
                    <td class="code">{claim}</td>
                    <td>{status}</td>
                    <td>
                        <form method="POST" action="/admin/role" style="display: flex; gap: 8px;">
                            <input type="hidden" name="account_id" value="{id}">
                            <select name="role">{options}</select>
                            <button type="submit">Save</button>
                        </form>
                    </td>
                </tr>"#,
                email = html_escape(&identity.email),
                email_short = html_escape(&truncate(&identity.email, TABLE_TEXT_LIMIT)),
                name = html_escape(&truncate(identity.label(), TABLE_TEXT_LIMIT)),
                claim = html_escape(identity.role_claim.as_deref().unwrap_or("")),
                id = html_escape(&identity.id),
                options = role_options(identity.role_claim.as_deref()),
            )
        })
        .collect();

    let body = format!(
        r#"{header}
        {error}
        <h2>Accounts</h2>
        <table>
            <tr>
                <th>Email</th>
                <th>Name</th>
                <th>Role claim</th>
                <th>Status</th>
                <th>Change role</th>
            </tr>
            {rows}
        </table>"#,
        header = header("Administration", links),
        error = message("error", error),
    );
    page("Administration", "", &body)
}

/// Render a role-specific workspace page
pub fn workspace_page(
    title: &str,
    description: &str,
    viewer: &Viewer<'_>,
    links: &[NavLink],
) -> String {
    let body = format!(
        r#"{header}
        <p>{description}</p>
        <div class="info-row">
            <span class="label">Signed in as:</span>
            <span class="value">{name}</span>
        </div>
        <div class="info-row">
            <span class="label">Roles:</span>
            <span class="value">{roles}</span>
        </div>"#,
        header = header(title, links),
        description = html_escape(description),
        name = html_escape(viewer.identity.label()),
        roles = viewer.roles_html(),
    );
    page(title, "", &body)
}

/// Render the biometric settings page
///
/// `enabled` is `None` when secure storage is not configured; the form is
/// then disabled.
pub fn biometric_page(links: &[NavLink], enabled: Option<bool>, error: Option<&str>) -> String {
    let (status, form) = match enabled {
        Some(enabled) => (
            if enabled { "Enabled" } else { "Disabled" },
            format!(
                r#"<form method="POST" action="/settings/biometric">
            <div class="form-group">
                <label>
                    <input type="checkbox" name="enabled" value="on"{checked}>
                    Allow biometric sign-in on this device
                </label>
            </div>
            <button type="submit">Save</button>
        </form>"#,
                checked = if enabled { " checked" } else { "" }
            ),
        ),
        None => (
            "Unavailable",
            r#"<div class="notice">Secure storage is not configured on this server, so the preference cannot be saved.</div>
        <button type="button" disabled>Save</button>"#
                .to_string(),
        ),
    };

    let body = format!(
        r#"{header}
        {error}
        <h2>Biometric sign-in</h2>
        <div class="info-row">
            <span class="label">Current setting:</span>
            <span class="value">{status}</span>
        </div>
        {form}"#,
        header = header("Settings", links),
        error = message("error", error),
    );
    page("Settings", "", &body)
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
