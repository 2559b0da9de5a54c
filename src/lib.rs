//! sqlsource library
//!
//! Host-side glue between the command line and any [`Driver`]: connection
//! flags, description files, and the loops that turn scans into JSON lines.
//!
//! # CLI Usage
//!
//! ```bash
//! # Describe every table of a database
//! sqlsource --hostname db.internal --database shop describe --output shop.json
//!
//! # Stream selected columns of one table
//! sqlsource --database shop scan --schema shop --table orders --columns id,note
//!
//! # Stream every described table
//! sqlsource --database shop sync --description shop.json
//! ```

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use sync_core::{Config, Description, Driver, Row, RowStream, SqlValue, TableRef};
use tracing::{debug, info};

/// Source database connection options
#[derive(Args, Clone)]
pub struct ConnectionOpts {
    /// Database server hostname
    #[arg(long, default_value = "localhost", env = "SQLSOURCE_HOSTNAME")]
    pub hostname: String,

    /// Database server port
    #[arg(long, default_value_t = 3306, env = "SQLSOURCE_PORT")]
    pub port: u16,

    /// Database username
    #[arg(long, default_value = "root", env = "SQLSOURCE_USERNAME")]
    pub username: String,

    /// Database password
    #[arg(
        long,
        default_value = "",
        env = "SQLSOURCE_PASSWORD",
        hide_env_values = true
    )]
    pub password: String,

    /// Database to read from
    #[arg(long, env = "SQLSOURCE_DATABASE")]
    pub database: String,

    /// Connection option as KEY=VALUE (repeatable)
    #[arg(
        long = "option",
        value_name = "KEY=VALUE",
        env = "SQLSOURCE_OPTIONS",
        value_delimiter = ','
    )]
    pub options: Vec<String>,
}

impl From<ConnectionOpts> for Config {
    fn from(opts: ConnectionOpts) -> Self {
        Config {
            hostname: opts.hostname,
            port: opts.port,
            username: opts.username,
            password: opts.password,
            database: opts.database,
            options: opts.options,
        }
    }
}

/// Load a description previously written by [`write_description`].
pub fn read_description(path: &Path) -> Result<Description> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open description file {path:?}"))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse description file {path:?}"))
}

/// Write a description as pretty JSON.
pub fn write_description<W: Write>(description: &Description, out: W) -> Result<()> {
    let mut out = BufWriter::new(out);
    serde_json::to_writer_pretty(&mut out, description)
        .context("Failed to serialize description")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write a description to `path`, replacing any existing file.
pub fn save_description(description: &Description, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create description file {path:?}"))?;
    write_description(description, file)?;
    info!(
        "Wrote description of {} tables to {:?}",
        description.len(),
        path
    );
    Ok(())
}

/// Build the scan reference for `schema.table`.
///
/// Without an explicit column list, every column of a fresh describe is
/// selected.
pub async fn resolve_table<D: Driver>(
    driver: &mut D,
    schema: &str,
    table: &str,
    columns: Option<Vec<String>>,
) -> Result<TableRef> {
    if let Some(columns) = columns {
        return Ok(TableRef::new(schema, table, columns));
    }

    let description = driver
        .describe()
        .await
        .context("Failed to describe source database")?;

    description
        .table_ref(schema, table)
        .with_context(|| format!("Table {schema}.{table} not found in source database"))
}

/// Rows in column-name order so output is deterministic.
fn ordered(row: &Row) -> BTreeMap<&str, &SqlValue> {
    row.iter().map(|(k, v)| (k.as_str(), v)).collect()
}

#[derive(Serialize)]
struct SyncRecord<'a> {
    schema: &'a str,
    table: &'a str,
    row: BTreeMap<&'a str, &'a SqlValue>,
}

fn write_row<W: Write>(out: &mut W, table: Option<&TableRef>, row: &Row) -> Result<()> {
    let written = match table {
        Some(table) => serde_json::to_writer(
            &mut *out,
            &SyncRecord {
                schema: &table.schema,
                table: &table.table,
                row: ordered(row),
            },
        ),
        None => serde_json::to_writer(&mut *out, &ordered(row)),
    };
    written.context("Failed to serialize row")?;
    writeln!(out).context("Failed to write row")?;
    Ok(())
}

async fn copy_rows<D: Driver, W: Write>(
    driver: &mut D,
    table: &TableRef,
    out: &mut W,
    tagged: bool,
) -> Result<u64> {
    let mut stream = driver
        .scan(table)
        .await
        .with_context(|| format!("Failed to scan {table}"))?;
    debug!("Streaming columns {:?} of {}", stream.columns(), table);

    let mut count = 0;
    while let Some(row) = stream.next().await {
        let mut row = row.with_context(|| format!("Failed to read from {table}"))?;
        D::normalize_row(&mut row);

        if let Err(e) = write_row(out, tagged.then_some(table), &row) {
            let _ = stream.close().await;
            return Err(e);
        }
        count += 1;
    }

    Ok(count)
}

/// Stream one table as JSON lines of normalized rows.
pub async fn run_scan<D: Driver, W: Write>(
    driver: &mut D,
    table: &TableRef,
    out: &mut W,
) -> Result<u64> {
    let rows = copy_rows(driver, table, out, false).await?;
    out.flush()?;
    info!("Scanned {} rows from {}", rows, table);
    Ok(rows)
}

/// Totals of a [`run_sync`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub tables: usize,
    pub rows: u64,
}

/// Stream every table of `description`, tagging each row with its table.
pub async fn run_sync<D: Driver, W: Write>(
    driver: &mut D,
    description: &Description,
    out: &mut W,
) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();

    for table in description.tables() {
        let table_ref = table.to_table_ref();
        let rows = copy_rows(driver, &table_ref, out, true).await?;
        info!("Synced {} rows from {}", rows, table_ref);

        summary.tables += 1;
        summary.rows += rows;
    }

    out.flush()?;
    info!(
        "Sync complete: {} rows from {} tables",
        summary.rows, summary.tables
    );
    Ok(summary)
}
