//! [`Driver`] implementation for MySQL

use crate::client::connect;
use crate::scan::{scan, MySQLRowStream};
use crate::schema::describe;
use async_trait::async_trait;
use mysql_async::Conn;
use sync_core::{Config, Description, Driver, Row, RowStream, SourceError, TableRef};
use tracing::{debug, info};

/// MySQL connector owning a single live connection.
pub struct MySQLSource {
    conn: Conn,
    database: String,
}

impl MySQLSource {
    /// Wrap an already established connection.
    pub fn from_conn(conn: Conn, database: impl Into<String>) -> Self {
        Self {
            conn,
            database: database.into(),
        }
    }

    /// Like [`Driver::scan`], without boxing the stream.
    pub async fn scan_table<'a>(
        &'a mut self,
        table: &TableRef,
    ) -> Result<MySQLRowStream<'a>, SourceError> {
        scan(&mut self.conn, table).await
    }
}

#[async_trait]
impl Driver for MySQLSource {
    fn dialect(&self) -> &'static str {
        "mysql"
    }

    async fn init(config: &Config) -> Result<Self, SourceError> {
        let conn = connect(config).await?;
        Ok(Self::from_conn(conn, config.database.clone()))
    }

    async fn describe(&mut self) -> Result<Description, SourceError> {
        let description = describe(&mut self.conn).await?;
        info!(
            "Described MySQL database '{}': {} tables, {} columns",
            self.database,
            description.len(),
            description.column_count()
        );
        Ok(description)
    }

    async fn scan<'a>(
        &'a mut self,
        table: &TableRef,
    ) -> Result<Box<dyn RowStream + 'a>, SourceError> {
        let stream = self.scan_table(table).await?;
        Ok(Box::new(stream))
    }

    fn normalize_row(row: &mut Row) {
        crate::values::normalize_row(row)
    }

    async fn close(self) -> Result<(), SourceError> {
        debug!("Disconnecting from MySQL database '{}'", self.database);
        self.conn.disconnect().await.map_err(|e| {
            SourceError::connection(format!(
                "Failed to disconnect from MySQL database '{}': {e}",
                self.database
            ))
        })
    }
}
