//! Serve command - runs the MEREF portal web server.

use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    Form, Json, Router,
    extract::{RawQuery, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use meref_portal::{
    GuardDecision, PortalConfig, RouteGuard, Session, SessionProvider,
    auth::{Role, can_access, resolve},
    directory::{AccountSpec, Directory},
    guard::{RedirectAttachment, is_local_path},
    session::Identity,
    store::{BiometricSetting, FileStorage, InMemoryStorage, StorageBackend, StoreKey},
};

use crate::cli::ServeArgs;
use crate::session::SessionStore;
use crate::templates::{self, NavLink, Viewer};

const SESSION_COOKIE: &str = "meref_session";
const SETTINGS_FILE: &str = "settings.json";
const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@meref.local";
const HOME_PATH: &str = "/dashboard";
const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Guards for each protected area, built once from the configuration.
struct Guards {
    authenticated: RouteGuard,
    admin: RouteGuard,
    sfd: RouteGuard,
    meref: RouteGuard,
}

impl Guards {
    fn new(config: &PortalConfig) -> Self {
        Self {
            authenticated: config.authenticated_guard(),
            admin: config.role_guard([Role::Admin]),
            sfd: config.role_guard([Role::SfdAdmin, Role::Admin]),
            meref: config.role_guard([Role::MerefAdmin]),
        }
    }

    /// Navigation links the session is allowed to follow.
    fn links(&self, session: &Session) -> Vec<NavLink> {
        let areas = [
            ("/dashboard", "Dashboard", &self.authenticated),
            ("/sfd", "SFD workspace", &self.sfd),
            ("/meref", "MEREF workspace", &self.meref),
            ("/admin", "Administration", &self.admin),
            ("/settings/biometric", "Settings", &self.authenticated),
        ];
        areas
            .into_iter()
            .filter(|(_, _, guard)| can_access(session, guard.allowed_roles()))
            .map(|(path, title, _)| NavLink { path, title })
            .collect()
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    directory: Arc<Directory>,
    sessions: SessionStore,
    config: Arc<PortalConfig>,
    guards: Arc<Guards>,
    storage: Arc<dyn StorageBackend>,
    /// Absent when no store secret is configured; biometric settings are then read-only.
    store_key: Option<Arc<StoreKey>>,
}

/// Login form data
#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
    from: Option<String>,
}

/// Role change form data
#[derive(Deserialize)]
struct RoleForm {
    account_id: String,
    role: String,
}

/// Biometric settings form data. Unchecked checkboxes are not submitted.
#[derive(Deserialize)]
struct BiometricForm {
    enabled: Option<String>,
}

/// Run the portal server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("meref_portal=info".parse()?))
        .init();

    let config = PortalConfig {
        auth_path: args.auth_path.clone(),
        fallback_path: args.fallback_path.clone(),
        ..PortalConfig::default()
    };

    let directory = Arc::new(load_directory(args).await?);
    let storage = open_storage(args.data_dir.as_deref())?;

    let store_key = match args.store_secret.as_deref() {
        Some(secret) if !secret.is_empty() => StoreKey::derive(secret).map(Arc::new),
        _ => config.store_key(),
    };
    let store_key = match store_key {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::warn!("Biometric settings disabled: {e}");
            None
        }
    };

    let app_state = AppState {
        directory,
        sessions: SessionStore::with_idle_timeout(Duration::from_secs(
            args.session_idle_minutes.saturating_mul(60),
        )),
        guards: Arc::new(Guards::new(&config)),
        config: Arc::new(config),
        storage,
        store_key,
    };

    // Sweep sessions nobody comes back for.
    let reaper = {
        let sessions = app_state.sessions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REAP_INTERVAL);
            loop {
                interval.tick().await;
                sessions.reap().await;
            }
        })
    };

    let auth_path = app_state.config.auth_path.clone();
    let app = Router::new()
        .route("/", get(handle_root_request))
        .route("/health", get(handle_health_endpoint))
        .route(&auth_path, get(handle_login_page).post(handle_login_submit))
        .route("/logout", post(handle_logout))
        .route("/dashboard", get(handle_dashboard))
        .route("/admin", get(handle_admin_page))
        .route("/admin/role", post(handle_role_change))
        .route("/sfd", get(handle_sfd_page))
        .route("/meref", get(handle_meref_page))
        .route(
            "/settings/biometric",
            get(handle_biometric_page).post(handle_biometric_submit),
        )
        .layer(CookieManagerLayer::new())
        .with_state(app_state.clone());

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("MEREF Portal started");
    println!();
    println!("Web Interface: http://localhost:{}", local_addr.port());
    println!();
    println!("Available endpoints:");
    println!("  GET  /                    - Redirect to login or dashboard");
    println!("  GET  {auth_path:<20} - Login page");
    println!("  GET  /dashboard           - Dashboard (any signed-in user)");
    println!("  GET  /sfd                 - SFD workspace (sfd_admin, admin)");
    println!("  GET  /meref               - MEREF workspace (meref_admin)");
    println!("  GET  /admin               - Account administration (admin)");
    println!("  GET  /settings/biometric  - Biometric preference");
    println!("  GET  /health              - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
            reaper.abort();
            app_state.sessions.clear().await;
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

/// Load accounts from the users file, or create a bootstrap admin.
async fn load_directory(args: &ServeArgs) -> Result<Directory, Box<dyn std::error::Error>> {
    if let Some(path) = &args.users {
        return Ok(Directory::from_seed_file(path).await?);
    }

    let directory = Directory::new();
    let password = match &args.admin_password {
        Some(password) => password.clone(),
        None => {
            let password = Uuid::new_v4().simple().to_string();
            println!("Bootstrap admin: {BOOTSTRAP_ADMIN_EMAIL} / {password}");
            password
        }
    };
    directory
        .create_account(
            AccountSpec::new(BOOTSTRAP_ADMIN_EMAIL, password)
                .with_role_claim(Role::Admin.as_str())
                .with_display_name("Administrator"),
        )
        .await?;
    tracing::info!("No users file given, created bootstrap admin {BOOTSTRAP_ADMIN_EMAIL}");
    Ok(directory)
}

fn open_storage(
    data_dir: Option<&Path>,
) -> Result<Arc<dyn StorageBackend>, Box<dyn std::error::Error>> {
    match data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(SETTINGS_FILE);
            tracing::info!("Storing encrypted settings in {}", path.display());
            Ok(Arc::new(FileStorage::new(path)))
        }
        None => {
            tracing::info!("No data directory given, settings are kept in memory");
            Ok(Arc::new(InMemoryStorage::new()))
        }
    }
}

// ============================================================================
// Guard helpers
// ============================================================================

/// A request that passed its route guard.
struct Admitted {
    session: Session,
    identity: Identity,
}

impl Admitted {
    fn viewer(&self) -> Viewer<'_> {
        Viewer {
            identity: &self.identity,
            roles: resolve(&self.session).roles().collect(),
        }
    }
}

fn request_location(uri: &Uri) -> String {
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string())
}

async fn current_session(state: &AppState, cookies: &Cookies) -> Session {
    match cookies.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.session(cookie.value()).await,
        None => Session::signed_out(),
    }
}

/// Apply `guard` to the request, turning non-allow decisions into responses.
async fn admit(
    state: &AppState,
    cookies: &Cookies,
    guard: &RouteGuard,
    location: &str,
) -> Result<Admitted, Response> {
    let session = current_session(state, cookies).await;
    match guard.check(&session, location) {
        GuardDecision::Allow => match session.user.clone() {
            Some(identity) => Ok(Admitted { session, identity }),
            None => Err(Redirect::to(guard.auth()).into_response()),
        },
        GuardDecision::Loading => Err(Html(templates::loading_page(location)).into_response()),
        GuardDecision::Redirect(redirect) => {
            tracing::debug!(
                location,
                target = %redirect.target,
                reason = ?redirect.reason(),
                "guard redirected request"
            );
            Err(Redirect::to(&redirect.location()).into_response())
        }
    }
}

// ============================================================================
// Authentication Handlers
// ============================================================================

/// Handler for GET / - Root redirect
async fn handle_root_request(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if current_session(&state, &cookies).await.is_authenticated() {
        return Redirect::to(HOME_PATH);
    }
    Redirect::to(&state.config.auth_path)
}

/// Handler for GET on the auth path - Show login page
async fn handle_login_page(
    State(state): State<AppState>,
    cookies: Cookies,
    RawQuery(query): RawQuery,
) -> Response {
    let attachment = query.as_deref().and_then(RedirectAttachment::from_query);
    let session = current_session(&state, &cookies).await;

    let notice = attachment
        .as_ref()
        .filter(|a| a.is_access_denied())
        .map(|a| format!("Your account does not have access to {}.", a.origin_path));

    if session.is_authenticated() && notice.is_none() {
        let target = attachment
            .as_ref()
            .and_then(RedirectAttachment::return_path)
            .unwrap_or(HOME_PATH);
        return Redirect::to(target).into_response();
    }

    let from = attachment.as_ref().and_then(RedirectAttachment::return_path);
    Html(templates::login_page(
        &state.config.auth_path,
        None,
        notice.as_deref(),
        from,
    ))
    .into_response()
}

/// Handler for POST on the auth path - Process login
async fn handle_login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    let from = form.from.as_deref().filter(|f| is_local_path(f));

    let identity = match state.directory.authenticate(&form.email, &form.password).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!(email = %form.email, "Login rejected: {e}");
            return Html(templates::login_page(
                &state.config.auth_path,
                Some(&e.to_string()),
                None,
                from,
            ))
            .into_response();
        }
    };

    let source = match state.directory.identity_source(&identity.id).await {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("Failed to follow account {}: {e}", identity.id);
            return Html(templates::login_page(
                &state.config.auth_path,
                Some("Login failed, please try again"),
                None,
                from,
            ))
            .into_response();
        }
    };

    // Replace any session this browser already had.
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy_session(cookie.value()).await;
    }

    let provider = SessionProvider::start(Arc::new(source));
    let token = state.sessions.create_session(provider).await;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    Redirect::to(from.unwrap_or(HOME_PATH)).into_response()
}

/// Handler for POST /logout - Logout and destroy session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy_session(cookie.value()).await;
        cookies.remove(Cookie::from(SESSION_COOKIE));
    }
    Redirect::to(&state.config.auth_path)
}

// ============================================================================
// Protected Pages
// ============================================================================

/// Handler for GET /dashboard - Any signed-in user
async fn handle_dashboard(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Response {
    let location = request_location(&uri);
    let admitted = match admit(&state, &cookies, &state.guards.authenticated, &location).await {
        Ok(admitted) => admitted,
        Err(response) => return response,
    };

    let notice = query
        .as_deref()
        .and_then(RedirectAttachment::from_query)
        .filter(RedirectAttachment::is_access_denied)
        .map(|a| format!("Your account does not have access to {}.", a.origin_path));

    let biometric = state.store_key.as_ref().map(|key| {
        BiometricSetting::for_account(state.storage.clone(), key.clone(), &admitted.identity.id)
            .is_enabled()
    });

    let links = state.guards.links(&admitted.session);
    Html(templates::dashboard_page(
        &admitted.viewer(),
        &links,
        notice.as_deref(),
        biometric,
    ))
    .into_response()
}

/// Handler for GET /sfd - SFD administrators
async fn handle_sfd_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> Response {
    let admitted = match admit(&state, &cookies, &state.guards.sfd, &request_location(&uri)).await {
        Ok(admitted) => admitted,
        Err(response) => return response,
    };

    let links = state.guards.links(&admitted.session);
    Html(templates::workspace_page(
        "SFD workspace",
        "Loan portfolio and client follow-up for partner microfinance agencies.",
        &admitted.viewer(),
        &links,
    ))
    .into_response()
}

/// Handler for GET /meref - MEREF administrators
async fn handle_meref_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> Response {
    let admitted = match admit(&state, &cookies, &state.guards.meref, &request_location(&uri)).await
    {
        Ok(admitted) => admitted,
        Err(response) => return response,
    };

    let links = state.guards.links(&admitted.session);
    Html(templates::workspace_page(
        "MEREF workspace",
        "Refinancing requests and subsidy programmes across partner SFDs.",
        &admitted.viewer(),
        &links,
    ))
    .into_response()
}

/// Handler for GET /admin - Account administration
async fn handle_admin_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> Response {
    let admitted = match admit(&state, &cookies, &state.guards.admin, &request_location(&uri)).await
    {
        Ok(admitted) => admitted,
        Err(response) => return response,
    };

    render_admin(&state, &admitted, None).await
}

async fn render_admin(state: &AppState, admitted: &Admitted, error: Option<&str>) -> Response {
    let accounts = state.directory.list_accounts().await;
    let links = state.guards.links(&admitted.session);
    Html(templates::admin_page(&links, &accounts, error)).into_response()
}

/// Handler for POST /admin/role - Change an account's role claim
async fn handle_role_change(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<RoleForm>,
) -> Response {
    // The form lives on /admin; send visitors back there after login.
    let admitted = match admit(&state, &cookies, &state.guards.admin, "/admin").await {
        Ok(admitted) => admitted,
        Err(response) => return response,
    };

    let claim = if form.role.is_empty() {
        None
    } else {
        match form.role.parse::<Role>() {
            Ok(role) => Some(role.as_str()),
            Err(e) => return render_admin(&state, &admitted, Some(&e.to_string())).await,
        }
    };

    match state.directory.set_role_claim(&form.account_id, claim).await {
        Ok(_) => {
            tracing::info!(
                by = %admitted.identity.id,
                account = %form.account_id,
                claim = ?claim,
                "role changed from administration page"
            );
            Redirect::to("/admin").into_response()
        }
        Err(e) => render_admin(&state, &admitted, Some(&e.to_string())).await,
    }
}

/// Handler for GET /settings/biometric - Show the biometric preference
async fn handle_biometric_page(
    State(state): State<AppState>,
    cookies: Cookies,
    uri: Uri,
) -> Response {
    let admitted = match admit(
        &state,
        &cookies,
        &state.guards.authenticated,
        &request_location(&uri),
    )
    .await
    {
        Ok(admitted) => admitted,
        Err(response) => return response,
    };

    render_biometric(&state, &admitted, None)
}

fn render_biometric(state: &AppState, admitted: &Admitted, error: Option<&str>) -> Response {
    let enabled = biometric_setting(state, &admitted.identity).map(|s| s.is_enabled());
    let links = state.guards.links(&admitted.session);
    Html(templates::biometric_page(&links, enabled, error)).into_response()
}

fn biometric_setting(state: &AppState, identity: &Identity) -> Option<BiometricSetting> {
    let key = state.store_key.as_ref()?;
    Some(BiometricSetting::for_account(
        state.storage.clone(),
        key.clone(),
        &identity.id,
    ))
}

/// Handler for POST /settings/biometric - Save the biometric preference
async fn handle_biometric_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<BiometricForm>,
) -> Response {
    let admitted = match admit(
        &state,
        &cookies,
        &state.guards.authenticated,
        "/settings/biometric",
    )
    .await
    {
        Ok(admitted) => admitted,
        Err(response) => return response,
    };

    let Some(setting) = biometric_setting(&state, &admitted.identity) else {
        return render_biometric(
            &state,
            &admitted,
            Some("Secure storage is not configured on this server"),
        );
    };

    let enabled = form.enabled.is_some();
    match setting.set_enabled(enabled) {
        Ok(()) => {
            tracing::info!(account = %admitted.identity.id, enabled, "biometric preference saved");
            Redirect::to("/settings/biometric").into_response()
        }
        Err(e) => {
            tracing::error!("Failed to save biometric preference: {e}");
            render_biometric(&state, &admitted, Some(&e.to_string()))
        }
    }
}

// ============================================================================
// Health
// ============================================================================

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    sessions: usize,
    accounts: usize,
    secure_store: bool,
}

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        sessions: state.sessions.session_count().await,
        accounts: state.directory.len().await,
        secure_store: state.store_key.is_some(),
    })
}
