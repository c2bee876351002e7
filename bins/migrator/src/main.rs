//! Collection migration runner for Stint.
//!
//! Usage:
//!   migrator up                 - Apply all pending migrations
//!   migrator down [-n N]        - Revert the last N migrations (default 1)
//!   migrator down --to ID       - Revert every migration newer than ID
//!   migrator down --all         - Revert every applied migration
//!   migrator status             - Show applied and pending migrations
//!   migrator unlock             - Clear a lock left by a crashed run

use anyhow::Context;
use clap::{Parser, Subcommand};
use stint_core::migration::{MigrationId, Migrator, RollbackReport};
use stint_db::{DbSchemaStore, collections};
use stint_shared::AppConfig;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "migrator", version, about = "Applies and reverts Stint collection migrations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply all pending migrations.
    Up,
    /// Revert applied migrations, newest first.
    Down {
        /// Revert every migration newer than this identifier.
        #[arg(long, conflicts_with_all = ["all", "steps"])]
        to: Option<MigrationId>,
        /// Revert every applied migration.
        #[arg(long, conflicts_with = "steps")]
        all: bool,
        /// Number of migrations to revert.
        #[arg(short = 'n', long, default_value_t = 1)]
        steps: usize,
    },
    /// Show applied, pending and unregistered migrations.
    Status,
    /// Remove the migration lock.
    Unlock,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stint=info,migrator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let store = DbSchemaStore::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let registry = collections::registry().context("Invalid migration registry")?;
    let migrator = Migrator::new(&registry).with_lock_holder(config.migrations.lock_holder);

    match cli.command {
        Command::Up => {
            let applied = migrator.apply(&store).await?;
            info!(count = applied.len(), "Migrations applied");
        }
        Command::Down { to, all, steps } => {
            let report = if all {
                migrator.rollback(&store, None).await?
            } else if let Some(to) = to {
                migrator.rollback(&store, Some(to)).await?
            } else {
                migrator.rollback_last(&store, steps).await?
            };
            report_rollback(&report);
        }
        Command::Status => {
            let status = migrator.status(&store).await?;
            for step in &status.steps {
                match step.applied_at {
                    Some(at) => println!("{}  {:<40} applied {}", step.id, step.name, at.to_rfc3339()),
                    None => println!("{}  {:<40} pending", step.id, step.name),
                }
            }
            for entry in &status.orphaned {
                println!("{}  {:<40} not registered", entry.id, entry.name);
            }
            if let Some(holder) = store.lock_holder().await? {
                println!("Lock held by {holder}");
            }
        }
        Command::Unlock => match store.force_unlock().await? {
            Some(holder) => warn!(holder = %holder, "Removed migration lock"),
            None => info!("Migration lock is not held"),
        },
    }

    Ok(())
}

fn report_rollback(report: &RollbackReport) {
    info!(count = report.reverted.len(), "Migrations reverted");
    if !report.irreversible.is_empty() {
        let ids: Vec<String> = report.irreversible.iter().map(ToString::to_string).collect();
        warn!(
            steps = %ids.join(", "),
            "Some reverted migrations had no reverse action; their collections remain"
        );
    }
}
