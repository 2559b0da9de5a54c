//! Capability interface implemented by every relational dialect.
//!
//! A sync engine only ever talks to these two traits:
//!
//! ```text
//! Config ──init──▶ Driver ──describe──▶ Description
//!                    │
//!                    └──scan(TableRef)──▶ RowStream ──next──▶ Row ──normalize_row──▶ Row
//! ```
//!
//! A driver owns exactly one live connection and serves one operation at a
//! time; `describe` and `scan` take `&mut self`, and a [`RowStream`] borrows
//! its driver until it is dropped.

use crate::config::Config;
use crate::error::SourceError;
use crate::schema::{Description, TableRef};
use crate::values::Row;
use async_trait::async_trait;

/// Forward-only stream of rows produced by [`Driver::scan`].
#[async_trait]
pub trait RowStream: Send {
    /// Names of the selected columns, in result order.
    fn columns(&self) -> &[String];

    /// Get the next row from the stream.
    /// Returns None once the result is exhausted; an error ends the stream.
    async fn next(&mut self) -> Option<Result<Row, SourceError>>;

    /// Release the underlying cursor without reading the remaining rows.
    async fn close(&mut self) -> Result<(), SourceError>;
}

/// A connector for one database product.
#[async_trait]
pub trait Driver: Send + Sized {
    /// Get the dialect identifier
    fn dialect(&self) -> &'static str;

    /// Open a connection from normalized configuration.
    async fn init(config: &Config) -> Result<Self, SourceError>;

    /// Discover every column of the connected database.
    async fn describe(&mut self) -> Result<Description, SourceError>;

    /// Start streaming the selected columns of a table.
    async fn scan<'a>(
        &'a mut self,
        table: &TableRef,
    ) -> Result<Box<dyn RowStream + 'a>, SourceError>;

    /// Repair client-library type leakage in a row produced by [`Driver::scan`].
    ///
    /// Takes no receiver so rows can be normalized while a stream still
    /// borrows the driver.
    fn normalize_row(row: &mut Row);

    /// Disconnect. The driver cannot be used afterwards.
    async fn close(self) -> Result<(), SourceError>;
}
