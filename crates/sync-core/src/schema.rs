//! Schema model for discovered database structure.
//!
//! ## Type Hierarchy
//!
//! - `Column` - One physical column, flagged primary key or not
//! - `TableDescription` - Columns of one (schema, table), in catalog order
//! - `Description` - Every table a describe call found
//! - `TableRef` - A table plus the columns a scan should select
//!
//! A `Description` is a snapshot: it holds no reference to the driver that
//! built it and can be persisted as JSON and reloaded later.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column discovered by introspection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Column {
    schema: String,
    table: String,
    name: String,
    #[serde(default)]
    is_primary_key: bool,
}

impl Column {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        is_primary_key: bool,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            name: name.into(),
            is_primary_key,
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }
}

/// Columns of one table, in the order the catalog returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    schema: String,
    name: String,
    columns: Vec<Column>,
}

impl TableDescription {
    fn new(schema: &str, name: &str) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Primary key columns, in catalog order.
    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }

    /// A scan reference selecting every described column.
    pub fn to_table_ref(&self) -> TableRef {
        TableRef::new(self.schema.clone(), self.name.clone(), self.column_names())
    }

    fn is(&self, schema: &str, table: &str) -> bool {
        self.schema == schema && self.name == table
    }
}

/// Discovered structure of a source database.
///
/// Tables keep the order in which their first column was added; columns keep
/// the order in which they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TableDescription>", into = "Vec<TableDescription>")]
pub struct Description {
    tables: Vec<TableDescription>,
}

impl Description {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one column to its (schema, table) entry.
    ///
    /// Returns `false` and leaves the description unchanged when the same
    /// (schema, table, column) was already added.
    pub fn add_column(&mut self, column: Column) -> bool {
        // Catalog rows arrive grouped by table, so the last entry is the usual hit.
        let index = match self
            .tables
            .iter()
            .rposition(|t| t.is(&column.schema, &column.table))
        {
            Some(index) => index,
            None => {
                self.tables
                    .push(TableDescription::new(&column.schema, &column.table));
                self.tables.len() - 1
            }
        };

        let table = &mut self.tables[index];
        if table.columns.iter().any(|c| c.name == column.name) {
            return false;
        }
        table.columns.push(column);
        true
    }

    pub fn table(&self, schema: &str, table: &str) -> Option<&TableDescription> {
        self.tables.iter().find(|t| t.is(schema, table))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDescription> {
        self.tables.iter()
    }

    /// Every column of every table.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.tables.iter().flat_map(|t| t.columns.iter())
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    /// A scan reference selecting every described column of a table.
    pub fn table_ref(&self, schema: &str, table: &str) -> Option<TableRef> {
        self.table(schema, table).map(TableDescription::to_table_ref)
    }

    pub fn primary_key(&self, schema: &str, table: &str) -> Vec<&Column> {
        self.table(schema, table)
            .map(TableDescription::primary_key)
            .unwrap_or_default()
    }
}

impl FromIterator<Column> for Description {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut description = Description::new();
        for column in iter {
            description.add_column(column);
        }
        description
    }
}

impl From<Vec<TableDescription>> for Description {
    fn from(tables: Vec<TableDescription>) -> Self {
        tables.into_iter().flat_map(|t| t.columns).collect()
    }
}

impl From<Description> for Vec<TableDescription> {
    fn from(description: Description) -> Self {
        description.tables
    }
}

/// A table to scan and the columns to select from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
    pub columns: Vec<String>,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            columns,
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}
