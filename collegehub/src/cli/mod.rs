//! CLI module for collegehub
//!
//! Provides command-line interface for server startup and user management.

/// serve サブコマンド
pub mod serve;
/// user サブコマンド
pub mod user;

use clap::{Parser, Subcommand};

/// College Hub - College management backend with role-gated APIs and activity logging
#[derive(Parser, Debug)]
#[command(name = "collegehub")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    COLLEGEHUB_HOST                   Bind address (default: 0.0.0.0)
    COLLEGEHUB_PORT                   Listen port (default: 8000)
    COLLEGEHUB_LOG_LEVEL              Log level (default: info)
    COLLEGEHUB_DATA_DIR               Data directory (default: ~/.collegehub)
    COLLEGEHUB_DATABASE_URL           Database URL
    COLLEGEHUB_JWT_SECRET             JWT signing key (auto-generated if not set)
    COLLEGEHUB_ADMIN_EMAIL            Initial admin email (default: admin@collegehub.local)
    COLLEGEHUB_ADMIN_PASSWORD         Initial admin password (required on first run)
    COLLEGEHUB_POLICY_FILE            Access policy YAML (default: built-in table)
    COLLEGEHUB_AUDIT_MAX_BODY_BYTES   Max request body captured into activity logs
    COLLEGEHUB_AUDIT_REDACT_FIELDS    Extra comma-separated fields to redact
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Serve(serve::ServeArgs),
    /// Manage user accounts
    User(user::UserArgs),
}
