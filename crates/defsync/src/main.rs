//! defsync CLI
//!
//! Reads a desired schema (file or stdin), introspects the target
//! database, and applies the DDLs that converge the database toward the
//! desired schema. Running it twice applies nothing the second time.

mod apply;
mod driver;

use std::fs;
use std::io::Read;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use defsync_core::{generate_idempotent_ddls, Dialect};

use apply::{executable_ddls, format_apply, NO_TABLE_EXISTS};
use driver::{DriverError, SchemaDriver, SqliteDriver};

/// Idempotent schema management: converge a live database toward
/// declarative DDL.
#[derive(Parser)]
#[command(name = "defsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database user (server dialects; ignored for sqlite files).
    #[arg(short = 'U', long = "user")]
    user: Option<String>,

    /// Database password (server dialects; ignored for sqlite files).
    #[arg(short = 'P', long = "password")]
    password: Option<String>,

    /// Target database: a SQLite file path.
    database: String,

    /// Desired schema source; `-` reads stdin.
    #[arg(long, default_value = "-")]
    file: String,

    /// SQL dialect family governing comparison and emission.
    #[arg(long, value_enum, default_value = "sqlite")]
    dialect: DialectArg,

    /// Show the DDLs without executing them.
    #[arg(long)]
    dry_run: bool,

    /// Comment out DROP statements and do not execute them.
    #[arg(long)]
    skip_drop: bool,

    /// Print the current schema of the database and exit.
    #[arg(long)]
    export: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DialectArg {
    Mysql,
    Postgres,
    Sqlite,
    Mssql,
}

impl DialectArg {
    fn dialect(self) -> Dialect {
        match self {
            DialectArg::Mysql => Dialect::Mysql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Mssql => Dialect::Mssql,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if cli.user.is_some() || cli.password.is_some() {
        debug!("credentials are only meaningful for server dialects");
    }

    let mut driver = match cli.dialect {
        DialectArg::Sqlite => SqliteDriver::connect(&cli.database)
            .await
            .with_context(|| format!("failed to open '{}'", cli.database))?,
        DialectArg::Mysql => return Err(DriverError::UnsupportedDialect("mysql").into()),
        DialectArg::Postgres => return Err(DriverError::UnsupportedDialect("postgres").into()),
        DialectArg::Mssql => return Err(DriverError::UnsupportedDialect("mssql").into()),
    };

    let current = driver.export_schema().await?;

    if cli.export {
        if current.is_empty() {
            print!("{NO_TABLE_EXISTS}");
        } else {
            print!("{current}");
        }
        return Ok(());
    }

    let desired = read_desired(&cli.file)?;
    let ddls = generate_idempotent_ddls(cli.dialect.dialect(), &desired, &current)?;

    print!("{}", format_apply(&ddls, cli.dry_run, cli.skip_drop));

    if !cli.dry_run {
        let to_run = executable_ddls(&ddls, cli.skip_drop);
        driver.apply_ddls(&to_run).await?;
    }

    Ok(())
}

fn read_desired(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read the desired schema from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(file).with_context(|| format!("failed to read '{file}'"))
    }
}
