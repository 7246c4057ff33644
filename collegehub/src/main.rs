//! College Hub Server Entry Point

use clap::Parser;
use collegehub::audit::writer::ActivityLogWriterConfig;
use collegehub::auth::bootstrap;
use collegehub::cli::{serve::ServeArgs, Cli, Commands};
use collegehub::config::{
    get_database_url, get_env_with_fallback_or, get_env_with_fallback_parse, get_policy_file,
    AuditConfig,
};
use collegehub::db::migrations::initialize_database;
use collegehub::policy::{AccessPolicy, RouteGroup};
use collegehub::{jwt_secret, logging, server, AppState};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// サーバー設定
struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    /// 環境変数から設定を読み込み
    fn from_env() -> Self {
        Self {
            host: get_env_with_fallback_or("COLLEGEHUB_HOST", "HOST", "0.0.0.0"),
            port: get_env_with_fallback_parse("COLLEGEHUB_PORT", "PORT", 8000),
        }
    }

    /// CLI引数から設定を作成
    fn from_args(args: &ServeArgs) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
        }
    }

    fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init()?;

    match cli.command {
        Some(Commands::Serve(args)) => run_server(ServerConfig::from_args(&args)).await,
        Some(Commands::User(args)) => {
            let db_pool = init_db_pool(&get_database_url()).await?;
            collegehub::cli::user::execute(&args, &db_pool).await
        }
        None => run_server(ServerConfig::from_env()).await,
    }
}

/// データディレクトリを作成してからDBへ接続・マイグレーションする
async fn init_db_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        let path = path.trim_start_matches("//");
        if !path.starts_with(':') {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }
    }
    Ok(initialize_database(database_url).await?)
}

fn load_policy() -> anyhow::Result<AccessPolicy> {
    let policy = match get_policy_file() {
        Some(path) => {
            info!("Loading access policy from {}", path.display());
            AccessPolicy::from_file(&path)?
        }
        None => AccessPolicy::default(),
    };
    for role in collegehub::common::auth::Role::ALL {
        let denied: Vec<&str> = policy
            .denied_groups(role)
            .iter()
            .map(RouteGroup::slug)
            .collect();
        if !denied.is_empty() {
            info!(role = %role, groups = ?denied, "Access policy restrictions");
        }
    }
    Ok(policy)
}

async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    info!("College Hub v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = init_db_pool(&get_database_url()).await?;

    match bootstrap::create_admin_from_env(&db_pool).await? {
        Some(email) => info!("Admin account available: {}", email),
        None => {
            if !collegehub::db::users::admin_exists(&db_pool).await? {
                tracing::warn!(
                    "No admin account exists. Set COLLEGEHUB_ADMIN_PASSWORD or run `collegehub user add --role admin`"
                );
            }
        }
    }

    let jwt_secret = jwt_secret::get_or_create_jwt_secret()?;
    let policy = load_policy()?;
    let audit_config = AuditConfig::from_env();
    info!(
        max_body_bytes = audit_config.max_body_bytes,
        extra_redact_fields = ?audit_config.extra_redact_fields,
        "Activity logging configured"
    );

    let state = AppState::new(
        db_pool,
        jwt_secret,
        policy,
        &audit_config,
        ActivityLogWriterConfig::default(),
    );

    server::run(state, &config.bind_addr()).await
}
