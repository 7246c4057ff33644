//! user サブコマンド
//!
//! ユーザーの作成とロールの付与・剥奪を行います。

use crate::auth::password::hash_password;
use crate::common::auth::Role;
use crate::db;
use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use sqlx::SqlitePool;

/// user サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct UserArgs {
    /// User operation
    #[command(subcommand)]
    pub command: UserCommand,
}

/// ユーザー操作
#[derive(Subcommand, Debug, Clone)]
pub enum UserCommand {
    /// Create a user account
    Add(AddUserArgs),
    /// Grant a role to an existing user
    Grant(RoleArgs),
    /// Revoke a role from an existing user
    Revoke(RoleArgs),
}

/// user add の引数
#[derive(Args, Debug, Clone)]
pub struct AddUserArgs {
    /// Email address (login ID)
    #[arg(long)]
    pub email: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Role to assign (admin, staff, student). Repeatable
    #[arg(long = "role", required = true)]
    pub roles: Vec<Role>,

    /// Department ID
    #[arg(long)]
    pub department: Option<i64>,

    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// user grant / revoke の引数
#[derive(Args, Debug, Clone)]
pub struct RoleArgs {
    /// Email address of the user
    #[arg(long)]
    pub email: String,

    /// Role (admin, staff, student)
    #[arg(long)]
    pub role: Role,
}

/// Execute the user command
pub async fn execute(args: &UserArgs, pool: &SqlitePool) -> Result<(), anyhow::Error> {
    match &args.command {
        UserCommand::Add(add) => {
            let password = match &add.password {
                Some(p) => p.clone(),
                None => rpassword::prompt_password("Enter password: ")
                    .context("Failed to read password")?,
            };
            add_user(pool, add, &password).await?;
        }
        UserCommand::Grant(grant) => {
            let user = db::users::find_by_email(pool, &grant.email)
                .await?
                .with_context(|| format!("User not found: {}", grant.email))?;
            db::users::assign_role(pool, user.id, grant.role).await?;
            println!("Granted {} to {}", grant.role, grant.email);
        }
        UserCommand::Revoke(revoke) => {
            let user = db::users::find_by_email(pool, &revoke.email)
                .await?
                .with_context(|| format!("User not found: {}", revoke.email))?;
            if db::users::revoke_role(pool, user.id, revoke.role).await? {
                println!("Revoked {} from {}", revoke.role, revoke.email);
            } else {
                println!("{} does not have role {}", revoke.email, revoke.role);
            }
        }
    }
    Ok(())
}

async fn add_user(
    pool: &SqlitePool,
    args: &AddUserArgs,
    password: &str,
) -> Result<uuid::Uuid, anyhow::Error> {
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    let password_hash = hash_password(password)?;
    let user = db::users::create(
        pool,
        args.name.trim(),
        args.email.trim(),
        &password_hash,
        args.department,
    )
    .await?;
    for role in &args.roles {
        db::users::assign_role(pool, user.id, *role).await?;
    }
    tracing::info!(user_id = %user.id, email = %user.email, "Created user");
    println!("Created user {} ({})", user.email, user.id);
    Ok(user.id)
}
