//! CLI argument definitions for the MEREF portal binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meref_portal::constants::{DEFAULT_AUTH_PATH, STORE_SECRET_ENV};

/// MEREF microfinance portal
#[derive(Parser, Debug)]
#[command(name = "meref-portal")]
#[command(about = "MEREF Portal: role-gated web front end for the MEREF microfinance platform")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the portal web server
    Serve(ServeArgs),
    /// Check health of a running portal server
    Health(HealthArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "MEREF_PORTAL_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "MEREF_PORTAL_HOST")]
    pub host: String,

    /// Data directory for the encrypted settings file (settings.json).
    /// Settings are kept in memory when omitted.
    #[arg(short = 'D', long, env = "MEREF_PORTAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON file of accounts to load at startup
    #[arg(short, long, env = "MEREF_PORTAL_USERS")]
    pub users: Option<PathBuf>,

    /// Password for the bootstrap admin account created when no users file is given.
    /// A random password is generated and printed when omitted.
    #[arg(long, env = "MEREF_PORTAL_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Secret the secure settings key is derived from.
    /// Biometric settings are disabled when it is missing.
    #[arg(long, env = STORE_SECRET_ENV, hide_env_values = true)]
    pub store_secret: Option<String>,

    /// Login route unauthenticated visitors are sent to
    #[arg(long, default_value = DEFAULT_AUTH_PATH)]
    pub auth_path: String,

    /// Route signed-in users without the required role are sent to
    #[arg(long, default_value = "/dashboard")]
    pub fallback_path: String,

    /// Minutes a session may go unused before it is dropped
    #[arg(long, default_value_t = 30, env = "MEREF_PORTAL_SESSION_IDLE_MINUTES")]
    pub session_idle_minutes: u64,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(default_value = "http://127.0.0.1:3000")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
