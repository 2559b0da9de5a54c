//! MySQL driver for sqlsource
//!
//! Implements the [`sync_core::Driver`] contract on top of a single
//! `mysql_async` connection:
//!
//! - [`client`] - Configuration → connection options, session parameters
//! - [`schema`] - Catalog introspection via `INFORMATION_SCHEMA.COLUMNS`
//! - [`scan`] - Quoted, prepared SELECTs streamed over the binary protocol
//! - [`values`] - Binary-protocol values → [`sync_core::SqlValue`]

pub mod client;
pub mod scan;
pub mod schema;
mod source;
pub mod testing;
pub mod values;

pub use client::{connect, ConnectionParams};
pub use scan::{quote_identifier, select_statement, MySQLRowStream};
pub use schema::{CatalogRow, DESCRIBE_QUERY};
pub use source::MySQLSource;
pub use values::{decode_row, MySQLValue};
