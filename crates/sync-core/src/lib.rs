//! Core types for sqlsource relational adapters.
//!
//! This crate provides the dialect-neutral contract a sync engine programs
//! against, including:
//!
//! - [`Config`] - Normalized connection parameters
//! - [`Description`] - Discovered schemas, tables, columns and primary keys
//! - [`SqlValue`] / [`Row`] - Portable values produced by a scan
//! - [`Driver`] / [`RowStream`] - The capability interface every dialect implements
//! - [`SourceError`] - Connection, introspection and query failures
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── sqlsource-mysql   (implements Driver for MySQL)
//!    │
//!    └─── sqlsource         (CLI host driving any Driver)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sync_core::values::{normalize_row, Row, SqlValue};
//!
//! let mut row = Row::new();
//! row.insert("name".to_string(), SqlValue::Bytes(b"alice".to_vec()));
//! row.insert("id".to_string(), SqlValue::Int(7));
//!
//! normalize_row(&mut row);
//! assert_eq!(row["name"], SqlValue::Text("alice".to_string()));
//! assert_eq!(row["id"], SqlValue::Int(7));
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod schema;
pub mod values;

// Re-exports for convenience
pub use config::{parse_option, Config};
pub use driver::{Driver, RowStream};
pub use error::{BoxError, ErrorKind, SourceError};
pub use schema::{Column, Description, TableDescription, TableRef};
pub use values::{normalize_row, normalize_value, Row, SqlValue};
