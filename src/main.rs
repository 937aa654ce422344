use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::TransactionTrait;
use tracing_subscriber::{fmt, EnvFilter};

use portcullis::authz::{self, RoleDiff, TemplateRegistry};
use portcullis::errors::PortcullisError;
use portcullis::{settings, store};

#[derive(Parser, Debug)]
#[command(
    name = "portcullis",
    version,
    about = "Role-based authorization administration"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered templates
    Templates,
    /// Preview what applying a template would change
    Diff {
        /// Template name
        template: String,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconcile the store to match a template
    Apply {
        /// Template name
        template: String,
    },
    /// Ask whether a user may perform an action
    Check {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        section: String,
        /// Item kind; empty asks about the section in general
        #[arg(long, default_value = "")]
        item: String,
        /// Instance id; 0 asks about the item kind in general
        #[arg(long, default_value_t = 0)]
        item_id: i64,
        #[arg(long)]
        action: String,
    },
    /// Assign a role to a user
    Assign {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        role: String,
    },
    /// Remove a role from a user
    Revoke {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        role: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;

    // init storage (database) and bring the schema up to date
    let db = store::init(&settings.database).await?;
    Migrator::up(&db, None).await.into_diagnostic()?;

    let registry = TemplateRegistry::builtin();

    match cli.command {
        Command::Templates => {
            for name in registry.names() {
                let template = registry.get(&name).expect("registered name");
                println!("{name}: {}", template.description);
            }
        }
        Command::Diff { template, json } => {
            let template = registry
                .get(&template)
                .ok_or(PortcullisError::TemplateNotFound(template))?;
            let report = authz::diff(&db, template).await?;
            if json {
                let rendered =
                    serde_json::to_string_pretty(&report).map_err(PortcullisError::from)?;
                println!("{rendered}");
            } else {
                print_report(&report);
            }
        }
        Command::Apply { template } => {
            let template = registry
                .get(&template)
                .ok_or(PortcullisError::TemplateNotFound(template))?;

            // One transaction around the whole call: apply deletes and
            // re-inserts grants, so a partial run must not become visible.
            let txn = db.begin().await.map_err(PortcullisError::from)?;
            let now = chrono::Utc::now().timestamp();
            if let Err(e) = authz::apply(&txn, template, now).await {
                txn.rollback().await.map_err(PortcullisError::from)?;
                return Err(e.into());
            }
            txn.commit().await.map_err(PortcullisError::from)?;
            tracing::info!(template = %template.name, "template applied");
        }
        Command::Check {
            user,
            section,
            item,
            item_id,
            action,
        } => {
            let allowed = authz::is_allowed(&db, user, &section, &item, item_id, &action).await?;
            println!("{}", if allowed { "allowed" } else { "denied" });
        }
        Command::Assign { user, role } => {
            let stored = store::get_role_by_name(&db, &role)
                .await?
                .ok_or_else(|| PortcullisError::Other(format!("Unknown role: {role}")))?;
            store::assign_user_role(&db, user, stored.id).await?;
            tracing::info!(user, role = %role, "role assigned");
        }
        Command::Revoke { user, role } => {
            let stored = store::get_role_by_name(&db, &role)
                .await?
                .ok_or_else(|| PortcullisError::Other(format!("Unknown role: {role}")))?;
            store::revoke_user_role(&db, user, stored.id).await?;
            tracing::info!(user, role = %role, "role revoked");
        }
    }

    Ok(())
}

fn print_report(report: &[RoleDiff]) {
    for role in report {
        println!("{} ({})", role.role, role.status);
        for change in &role.changes {
            println!("  ~ {change}");
        }
        for key in &role.added {
            println!("  + {key}");
        }
        for key in &role.removed {
            println!("  - {key}");
        }
    }
}
