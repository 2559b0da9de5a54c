//! Table scans over the binary protocol
//!
//! The SELECT is always prepared so that `mysql_async` returns typed values;
//! inline text queries would hand every column back as bytes.

use crate::values::decode_row;
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{BinaryProtocol, Conn, QueryResult};
use sync_core::{Row, RowStream, SourceError, TableRef};
use tracing::debug;

/// Quote an identifier with backticks, doubling any embedded backtick.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `SELECT <columns> FROM <schema>.<table>` with every identifier quoted.
pub fn select_statement(table: &TableRef) -> Result<String, SourceError> {
    if table.columns.is_empty() {
        return Err(SourceError::query(format!(
            "Cannot scan {table}: no columns selected"
        )));
    }

    let columns = table
        .columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "SELECT {columns} FROM {}.{}",
        quote_identifier(&table.schema),
        quote_identifier(&table.table)
    ))
}

/// Rows of one prepared SELECT, read from the connection as they are pulled.
///
/// The stream mutably borrows the connection, so nothing else can run on it
/// until the stream is dropped. Dropping an unfinished stream leaves the
/// remaining rows to be discarded by the connection before its next command;
/// [`RowStream::close`] discards them immediately.
pub struct MySQLRowStream<'a> {
    result: Option<QueryResult<'a, 'static, BinaryProtocol>>,
    columns: Vec<String>,
    table: String,
    rows_read: u64,
}

impl<'a> MySQLRowStream<'a> {
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_none()
    }
}

#[async_trait]
impl<'a> RowStream for MySQLRowStream<'a> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Option<Result<Row, SourceError>> {
        let result = self.result.as_mut()?;

        match result.next().await {
            Ok(Some(row)) => {
                self.rows_read += 1;
                Some(Ok(decode_row(row)))
            }
            Ok(None) => {
                debug!("Finished scan of {} after {} rows", self.table, self.rows_read);
                self.result = None;
                None
            }
            Err(e) => {
                self.result = None;
                Some(Err(SourceError::query(format!(
                    "Failed to fetch row {} of {}: {e}",
                    self.rows_read + 1,
                    self.table
                ))))
            }
        }
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        let Some(result) = self.result.take() else {
            return Ok(());
        };

        debug!("Closing scan of {} after {} rows", self.table, self.rows_read);
        result.drop_result().await.map_err(|e| {
            SourceError::query(format!("Failed to release cursor for {}: {e}", self.table))
        })
    }
}

/// Prepare and execute the SELECT for `table`.
///
/// Preparing goes through the connection's statement cache, so repeated scans
/// of the same column list reuse one server-side statement.
///
/// The prepared statement is not closed when the stream is exhausted or
/// closed. It stays open on the server until the cache evicts it (at most
/// `stmt_cache_size` statements per connection) or the connection is closed.
/// Only the result cursor is released by the stream.
pub async fn scan<'a>(
    conn: &'a mut Conn,
    table: &TableRef,
) -> Result<MySQLRowStream<'a>, SourceError> {
    let query = select_statement(table)?;
    debug!("Scanning {}: {}", table, query);

    let statement = conn
        .prep(query.as_str())
        .await
        .map_err(|e| SourceError::query(format!("Failed to prepare scan of {table}: {e}")))?;

    let columns = statement
        .columns()
        .iter()
        .map(|c| c.name_str().into_owned())
        .collect();

    let result = conn
        .exec_iter(statement, ())
        .await
        .map_err(|e| SourceError::query(format!("Failed to execute scan of {table}: {e}")))?;

    Ok(MySQLRowStream {
        result: Some(result),
        columns,
        table: table.to_string(),
        rows_read: 0,
    })
}
