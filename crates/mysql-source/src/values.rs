//! MySQL value decoding: `mysql_async::Value` → `SqlValue`
//!
//! Rows arrive over the binary protocol. Numeric columns come back typed;
//! text, decimal, JSON, enum and set columns come back as byte sequences; and
//! temporal columns are rendered to the same bytes the text protocol would send.
//! [`normalize_row`] then turns every byte sequence into text.

use mysql_async::consts::ColumnType;
use mysql_async::{Column, Value};
use sync_core::{Row, SqlValue};

/// MySQL value with the column metadata needed to decode it.
#[derive(Debug, Clone)]
pub struct MySQLValue {
    /// The raw MySQL value.
    pub value: Value,
    /// The MySQL column type.
    pub column_type: ColumnType,
    /// Declared fractional-second digits for temporal columns.
    pub decimals: u8,
}

impl MySQLValue {
    pub fn new(value: Value, column_type: ColumnType, decimals: u8) -> Self {
        Self {
            value,
            column_type,
            decimals,
        }
    }

    pub fn with_column(value: Value, column: &Column) -> Self {
        Self::new(value, column.column_type(), column.decimals())
    }
}

impl From<MySQLValue> for SqlValue {
    fn from(mv: MySQLValue) -> Self {
        match mv.value {
            Value::NULL => SqlValue::Null,
            Value::Int(i) => SqlValue::Int(i),
            // BIGINT UNSIGNED above i64::MAX keeps its exact digits
            Value::UInt(u) => match i64::try_from(u) {
                Ok(i) => SqlValue::Int(i),
                Err(_) => SqlValue::Text(u.to_string()),
            },
            Value::Float(f) => SqlValue::Float(f64::from(f)),
            Value::Double(d) => SqlValue::Float(d),
            Value::Bytes(b) => SqlValue::Bytes(b),
            Value::Date(year, month, day, hour, minute, second, micros) => {
                let date = format!("{year:04}-{month:02}-{day:02}");
                let rendered = if is_date_only(mv.column_type) {
                    date
                } else {
                    format!(
                        "{date} {hour:02}:{minute:02}:{second:02}{}",
                        fraction(micros, mv.decimals)
                    )
                };
                SqlValue::Bytes(rendered.into_bytes())
            }
            Value::Time(negative, days, hours, minutes, seconds, micros) => {
                let sign = if negative { "-" } else { "" };
                let hours = u64::from(days) * 24 + u64::from(hours);
                SqlValue::Bytes(
                    format!(
                        "{sign}{hours:02}:{minutes:02}:{seconds:02}{}",
                        fraction(micros, mv.decimals)
                    )
                    .into_bytes(),
                )
            }
        }
    }
}

fn is_date_only(column_type: ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE
    )
}

/// Fractional seconds the way the server renders them for the column.
///
/// Columns without a fixed scale report more than 6 decimals; those show all
/// six digits only when there is a fraction at all.
fn fraction(micros: u32, decimals: u8) -> String {
    let digits = match decimals {
        0 => return String::new(),
        1..=6 => decimals as usize,
        _ if micros == 0 => return String::new(),
        _ => 6,
    };
    let micros = format!("{micros:06}");
    format!(".{}", &micros[..digits])
}

/// Decode a client-library row into a name → value map.
pub fn decode_row(row: mysql_async::Row) -> Row {
    let columns = row.columns();
    columns
        .iter()
        .zip(row.unwrap_raw())
        .map(|(column, value)| {
            let value = value.unwrap_or(Value::NULL);
            (
                column.name_str().into_owned(),
                SqlValue::from(MySQLValue::with_column(value, column)),
            )
        })
        .collect()
}

/// The MySQL driver hands text and temporal columns back as bytes; every other
/// value is already correctly typed.
pub fn normalize_row(row: &mut Row) {
    sync_core::normalize_row(row)
}
