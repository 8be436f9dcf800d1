mod directory_sessions;
mod provider;
