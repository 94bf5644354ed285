//! Maintenance commands for the attendance database.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use asistencia::auth::password::hash_password;
use asistencia::config::kiosk_url;
use asistencia::db::{init_db, run_migrations};
use asistencia::model::employee::NewEmployee;
use asistencia::qr::kiosk_qr_svg;
use asistencia::repository::mysql::MySqlStore;

#[derive(Parser)]
#[command(name = "asistencia-admin")]
#[command(about = "Maintenance commands for the attendance app")]
#[command(version)]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Apply pending migrations before running the command
    #[arg(long)]
    migrate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the eight attendance types if missing
    SeedTypes,

    /// Bulk insert employees from a JSON array
    LoadEmployees {
        /// File with `[{ first_names, last_names, national_id, contract }]`
        file: PathBuf,
    },

    /// Set a staff user's password
    SetPassword {
        username: String,
        password: String,

        /// Create the user if it does not exist
        #[arg(long)]
        create: bool,
    },

    /// Write the kiosk QR code as SVG
    Qr {
        #[arg(long, default_value = "qr_asistencia.svg")]
        output: PathBuf,

        #[arg(long, env = "APP_URL", default_value = "http://127.0.0.1:8000/")]
        app_url: String,

        #[arg(long, env = "APP_ENTRY_PATH", default_value = "/qr/checkin")]
        entry_path: String,
    },
}

async fn store(cli: &Cli) -> Result<MySqlStore> {
    let url = cli
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set (or pass --database-url)")?;
    let pool = init_db(url).await?;
    if cli.migrate {
        run_migrations(&pool).await?;
    }
    Ok(MySqlStore::new(pool))
}

fn read_employees(file: &Path) -> Result<Vec<NewEmployee>> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid employee list", file.display()))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::SeedTypes => {
            let added = store(&cli).await?.seed_attendance_types().await?;
            info!(added, "Attendance types seeded");
        }
        Commands::LoadEmployees { file } => {
            let employees = read_employees(file)?;
            let store = store(&cli).await?;

            let mut inserted = 0usize;
            for employee in &employees {
                if store.insert_employee(employee).await? {
                    inserted += 1;
                } else {
                    warn!(national_id = %employee.national_id, "Employee already exists, skipped");
                }
            }
            info!(inserted, total = employees.len(), "Employees loaded");
        }
        Commands::SetPassword {
            username,
            password,
            create,
        } => {
            if password.is_empty() {
                bail!("password must not be empty");
            }
            let hashed = hash_password(password).map_err(|e| anyhow::anyhow!("{e}"))?;
            let store = store(&cli).await?;

            if store.set_staff_password(username, &hashed).await? {
                info!(%username, "Password updated");
            } else if *create {
                store.create_staff_user(username, &hashed).await?;
                info!(%username, "Staff user created");
            } else {
                bail!("no staff user named {username} (use --create)");
            }
        }
        Commands::Qr {
            output,
            app_url,
            entry_path,
        } => {
            let url = kiosk_url(app_url, entry_path);
            let svg = kiosk_qr_svg(&url).map_err(|e| anyhow::anyhow!("{e}"))?;
            std::fs::write(output, svg)
                .with_context(|| format!("cannot write {}", output.display()))?;
            info!(%url, output = %output.display(), "QR code written");
        }
    }

    Ok(())
}
