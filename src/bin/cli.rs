use std::collections::HashSet;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::migrate::Migrator;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use rolegate::client::{ClientSession, HttpProfileSource, InvalidationTag, ReconcilerConfig, StatusReconciler};
use rolegate::config::load_env;
use rolegate::db::{self, seed, MIGRATOR};
use rolegate::events::verify_chain;
use rolegate::session::{Identity, SessionConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "rolegate developer tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
    /// Insert the default departments and roles
    Seed,
    /// Mint a session token the way the identity provider would
    IssueToken {
        user_id: Uuid,
        #[arg(long)]
        email: Option<String>,
    },
    /// Give a user an approved Super Admin profile
    BootstrapAdmin { user_id: Uuid, name: String },
    /// Check the audit log hash chain
    AuditVerify,
    /// Ask a running server what the client would show this user on `path`
    ProfileStatus {
        user_id: Uuid,
        #[arg(long, default_value = "http://localhost:8000")]
        base_url: String,
        #[arg(long, default_value = "/dashboard")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();

    let cli = Cli::parse();

    match cli.command {
        Commands::MigrateRun => {
            let pool = get_pool().await?;
            MIGRATOR.run(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let pool = get_pool().await?;
            print_status(&pool, &MIGRATOR).await?;
        }
        Commands::Seed => {
            let pool = migrated_pool().await?;
            seed::run(&pool).await?;
            println!("Seeded {} departments and {} roles", seed::DEPARTMENTS.len(), seed::ROLES.len());
        }
        Commands::IssueToken { user_id, email } => {
            let session = SessionConfig::from_env()?;
            let token = session.issue(user_id, email.as_deref())?;
            println!("{token}");
        }
        Commands::BootstrapAdmin { user_id, name } => {
            let pool = migrated_pool().await?;
            let profile = seed::bootstrap_admin(&pool, user_id, &name).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::AuditVerify => {
            let pool = get_pool().await?;
            match verify_chain(&pool).await? {
                None => println!("audit chain intact"),
                Some(seq) => anyhow::bail!("audit chain broken at seq {seq}"),
            }
        }
        Commands::ProfileStatus { user_id, base_url, path } => {
            let session = SessionConfig::from_env()?;
            let token = session.issue(user_id, None)?;
            let reconciler = StatusReconciler::new(HttpProfileSource::new(base_url), ReconcilerConfig::from_env());
            reconciler
                .invalidate(InvalidationTag::SignedIn(ClientSession { identity: Identity::new(user_id), token }))
                .await;

            let status = reconciler.status().await?;
            println!("status: {}", serde_json::to_string(&status)?);
            println!("action on {path}: {:?}", reconciler.action_for(&path).await);
        }
    }

    Ok(())
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    db::connect(&database_url).await
}

async fn migrated_pool() -> anyhow::Result<SqlitePool> {
    let pool = get_pool().await?;
    MIGRATOR.run(&pool).await.context("failed to run migrations")?;
    Ok(pool)
}

async fn print_status(pool: &SqlitePool, migrator: &Migrator) -> anyhow::Result<()> {
    let has_table: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'")
            .fetch_optional(pool)
            .await?;

    let applied_versions: HashSet<i64> = if has_table.is_some() {
        let rows = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
        rows.iter().filter_map(|row| row.try_get::<i64, _>("version").ok()).collect()
    } else {
        HashSet::new()
    };

    println!("{:<8} {:<20} {}", "Status", "Version", "Name");
    for migration in migrator.iter() {
        let status = if applied_versions.contains(&migration.version) { "applied" } else { "pending" };
        let desc = migration.description.as_ref().trim();
        let name = if desc.is_empty() { "unknown" } else { desc };
        println!("{:<8} {:<20} {}", status, migration.version, name);
    }

    Ok(())
}
