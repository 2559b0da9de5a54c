//! Command-line interface for sqlsource
//!
//! # Usage Examples
//!
//! ```bash
//! # Print the description of a database
//! sqlsource --hostname db.internal --username svc --password x --database shop \
//!   --option charset=utf8mb4 describe
//!
//! # Stream one table as JSON lines, resolving its columns automatically
//! sqlsource --database shop scan --schema shop --table orders
//!
//! # Stream every table listed in a saved description
//! sqlsource --database shop sync --description shop.json
//! ```
//!
//! Connection flags can also come from `SQLSOURCE_*` environment variables.
//! Logging is controlled with `RUST_LOG`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlsource::{
    read_description, resolve_table, run_scan, run_sync, save_description, write_description,
    ConnectionOpts,
};
use sqlsource_mysql::MySQLSource;
use std::io::BufWriter;
use std::path::PathBuf;
use sync_core::{Config, Driver};
use tracing::info;

#[derive(Parser)]
#[command(name = "sqlsource")]
#[command(about = "Describe and stream relational tables as portable JSON rows")]
#[command(long_about = None)]
struct Cli {
    /// Source database connection options
    #[command(flatten)]
    connection: ConnectionOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover schemas, tables, columns and primary keys
    Describe {
        /// Write the description to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Stream rows of one table as JSON lines
    Scan {
        /// Schema containing the table
        #[arg(long)]
        schema: String,

        /// Table to scan
        #[arg(long)]
        table: String,

        /// Columns to select (default: every described column)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
    },

    /// Stream every described table as tagged JSON lines
    Sync {
        /// Description file from `describe --output` (default: describe now)
        #[arg(long)]
        description: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config: Config = cli.connection.into();

    let mut source = MySQLSource::init(&config)
        .await
        .with_context(|| format!("Failed to connect to {}", config.target()))?;
    info!("Using {} source {}", source.dialect(), config.target());

    let result = execute(&mut source, cli.command).await;

    source.close().await.context("Failed to close connection")?;
    result
}

async fn execute<D: Driver>(source: &mut D, command: Commands) -> anyhow::Result<()> {
    let stdout = std::io::stdout();

    match command {
        Commands::Describe { output } => {
            let description = source
                .describe()
                .await
                .context("Failed to describe source database")?;
            match output {
                Some(path) => save_description(&description, &path)?,
                None => write_description(&description, stdout.lock())?,
            }
        }
        Commands::Scan {
            schema,
            table,
            columns,
        } => {
            let table = resolve_table(source, &schema, &table, columns).await?;
            let mut out = BufWriter::new(stdout.lock());
            run_scan(source, &table, &mut out).await?;
        }
        Commands::Sync { description } => {
            let description = match description {
                Some(path) => read_description(&path)?,
                None => source
                    .describe()
                    .await
                    .context("Failed to describe source database")?,
            };
            let mut out = BufWriter::new(stdout.lock());
            run_sync(source, &description, &mut out).await?;
        }
    }

    Ok(())
}
