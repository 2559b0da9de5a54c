//! MySQL schema discovery
//!
//! This module reads `INFORMATION_SCHEMA.COLUMNS` for the connected database and
//! builds a [`Description`] with one [`Column`] per catalog row.

use mysql_async::prelude::*;
use mysql_async::{from_value_opt, Conn, Row, Value};
use sync_core::{Column, Description, SourceError};
use tracing::debug;

/// Catalog query listing every column of the current database.
///
/// Columns are described in the order the catalog returns them. The
/// `ORDER BY` only keeps repeated calls stable; callers must not rely on any
/// particular table or column order.
pub const DESCRIBE_QUERY: &str = "
        SELECT TABLE_SCHEMA, TABLE_NAME, COLUMN_NAME, COLUMN_KEY
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE()
        ORDER BY TABLE_NAME, ORDINAL_POSITION";

/// `COLUMN_KEY` value MySQL reports for primary key columns.
pub const PRIMARY_KEY_MARKER: &str = "PRI";

/// One decoded row of [`DESCRIBE_QUERY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub column_key: String,
}

impl CatalogRow {
    pub fn is_primary_key(&self) -> bool {
        self.column_key == PRIMARY_KEY_MARKER
    }

    pub fn into_column(self) -> Column {
        let is_primary_key = self.is_primary_key();
        Column::new(self.schema, self.table, self.column, is_primary_key)
    }
}

impl CatalogRow {
    /// Decode the values of one catalog row, in [`DESCRIBE_QUERY`] column order.
    ///
    /// A missing, NULL or non-text value is an introspection error.
    pub fn from_values(values: Vec<Value>) -> Result<Self, SourceError> {
        let mut values = values.into_iter();
        let mut next = |name: &str| catalog_string(values.next(), name);

        Ok(Self {
            schema: next("TABLE_SCHEMA")?,
            table: next("TABLE_NAME")?,
            column: next("COLUMN_NAME")?,
            column_key: next("COLUMN_KEY")?,
        })
    }
}

impl TryFrom<Row> for CatalogRow {
    type Error = SourceError;

    fn try_from(mut row: Row) -> Result<Self, Self::Error> {
        let values = (0..row.len())
            .map(|index| row.take::<Value, _>(index).unwrap_or(Value::NULL))
            .collect();
        Self::from_values(values)
    }
}

fn catalog_string(value: Option<Value>, name: &str) -> Result<String, SourceError> {
    match value {
        Some(value) => from_value_opt::<String>(value).map_err(|e| {
            SourceError::introspection(format!("Cannot decode {name} in catalog row: {e:?}"))
        }),
        None => Err(SourceError::introspection(format!(
            "Missing {name} in catalog row"
        ))),
    }
}

/// Build a description from catalog rows, keeping their order.
pub fn build_description(rows: impl IntoIterator<Item = CatalogRow>) -> Description {
    rows.into_iter().map(CatalogRow::into_column).collect()
}

/// Describe every table of the connected database.
///
/// The whole result set is read before any row is decoded, so the cursor is
/// closed on every return path.
pub async fn describe(conn: &mut Conn) -> Result<Description, SourceError> {
    let rows: Vec<Row> = conn
        .query(DESCRIBE_QUERY)
        .await
        .map_err(|e| SourceError::introspection(format!("Failed to query MySQL catalog: {e}")))?;

    debug!("MySQL catalog returned {} column rows", rows.len());

    let catalog_rows = rows
        .into_iter()
        .map(CatalogRow::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(build_description(catalog_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_core::ErrorKind;

    fn text(value: &str) -> Value {
        Value::Bytes(value.as_bytes().to_vec())
    }

    fn catalog_row(table: &str, column: &str, key: &str) -> CatalogRow {
        CatalogRow {
            schema: "shop".to_string(),
            table: table.to_string(),
            column: column.to_string(),
            column_key: key.to_string(),
        }
    }

    #[test]
    fn test_primary_key_marker() {
        assert!(catalog_row("orders", "id", "PRI").is_primary_key());
        assert!(!catalog_row("orders", "sku", "UNI").is_primary_key());
        assert!(!catalog_row("orders", "customer_id", "MUL").is_primary_key());
        assert!(!catalog_row("orders", "note", "").is_primary_key());
        assert!(!catalog_row("orders", "id", "pri").is_primary_key());
    }

    #[test]
    fn test_one_column_per_catalog_row() {
        let rows = vec![
            catalog_row("orders", "id", "PRI"),
            catalog_row("orders", "note", ""),
            catalog_row("order_items", "order_id", "PRI"),
            catalog_row("order_items", "line", "PRI"),
            catalog_row("order_items", "sku", "MUL"),
        ];

        let description = build_description(rows.clone());
        assert_eq!(description.column_count(), rows.len());

        let columns: Vec<&Column> = description.columns().collect();
        for (row, column) in rows.iter().zip(columns) {
            assert_eq!(column.table(), row.table);
            assert_eq!(column.name(), row.column);
            assert_eq!(column.is_primary_key(), row.column_key == PRIMARY_KEY_MARKER);
        }

        let items = description.table("shop", "order_items").unwrap();
        assert_eq!(items.primary_key().len(), 2);
    }

    #[test]
    fn test_orders_scenario() {
        let description = build_description(vec![
            catalog_row("orders", "id", "PRI"),
            catalog_row("orders", "note", ""),
        ]);

        assert_eq!(description.len(), 1);
        let orders = description.table("shop", "orders").unwrap();
        assert_eq!(orders.columns().len(), 2);
        assert_eq!(orders.columns()[0].name(), "id");
        assert!(orders.columns()[0].is_primary_key());
        assert_eq!(orders.columns()[1].name(), "note");
        assert!(!orders.columns()[1].is_primary_key());
    }

    #[test]
    fn test_describe_query_is_scoped_to_current_database() {
        assert!(DESCRIBE_QUERY.contains("INFORMATION_SCHEMA.COLUMNS"));
        assert!(DESCRIBE_QUERY.contains("TABLE_SCHEMA = DATABASE()"));
        assert!(DESCRIBE_QUERY.contains("COLUMN_KEY"));
    }

    #[test]
    fn test_catalog_values_decode_in_query_order() {
        let row = CatalogRow::from_values(vec![
            text("shop"),
            text("orders"),
            text("id"),
            text("PRI"),
        ])
        .unwrap();

        assert_eq!(row, catalog_row("orders", "id", "PRI"));
    }

    #[test]
    fn test_null_column_name_is_introspection_error() {
        let err = CatalogRow::from_values(vec![
            text("shop"),
            text("orders"),
            Value::NULL,
            text(""),
        ])
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Introspection);
        assert!(err.to_string().contains("COLUMN_NAME"));
    }

    #[test]
    fn test_integer_column_name_is_introspection_error() {
        let err = CatalogRow::from_values(vec![
            text("shop"),
            text("orders"),
            Value::Int(7),
            text("PRI"),
        ])
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Introspection);
    }

    #[test]
    fn test_short_catalog_row_is_introspection_error() {
        let err = CatalogRow::from_values(vec![text("shop"), text("orders"), text("id")])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Introspection);
        assert!(err.to_string().contains("COLUMN_KEY"));
    }
}
