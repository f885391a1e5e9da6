use crate::result::{Error, Result};
use indexmap::IndexMap;
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql};
use std::collections::BTreeMap;
use tracing::debug;

/// A single value in an attribute row
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Real(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(v: Vec<u8>) -> Self {
        AttributeValue::Blob(v)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AttributeValue::Null, Into::into)
    }
}

impl ToSql for AttributeValue {
    #[inline]
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            AttributeValue::Null => ToSqlOutput::Owned(Value::Null),
            AttributeValue::Integer(i) => ToSqlOutput::from(*i),
            AttributeValue::Real(f) => ToSqlOutput::from(*f),
            AttributeValue::Text(s) => ToSqlOutput::from(s.as_str()),
            AttributeValue::Blob(b) => ToSqlOutput::from(b.as_slice()),
        })
    }
}

impl FromSql for AttributeValue {
    #[inline]
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => AttributeValue::Null,
            ValueRef::Integer(i) => AttributeValue::Integer(i),
            ValueRef::Real(f) => AttributeValue::Real(f),
            ValueRef::Text(t) => AttributeValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => AttributeValue::Blob(b.to_vec()),
        })
    }
}

/// The attributes of one record, keyed by column name and kept in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeRow(IndexMap<String, AttributeValue>);

impl AttributeRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&AttributeValue> {
        self.0.get(column)
    }

    /// Set a column's value, returning the previous one
    pub fn insert<K, V>(&mut self, column: K, value: V) -> Option<AttributeValue>
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        self.0.insert(column.into(), value.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<AttributeValue> {
        self.0.shift_remove(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Bring the row in line with a table layout: listed columns keep their value
    /// or get `Null`, unlisted columns are dropped, and the order follows `columns`.
    pub fn conform_to<S: AsRef<str>>(&mut self, columns: &[S]) {
        let mut old = std::mem::take(&mut self.0);
        for column in columns {
            let name = column.as_ref();
            let value = old.shift_remove(name).unwrap_or(AttributeValue::Null);
            self.0.insert(name.to_owned(), value);
        }
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AttributeRow(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Where the attribute rows of records live.
pub trait AttributeStore {
    /// Fetch the row for a record, `None` if the record has no row.
    fn fetch_row(&self, record_number: u32) -> Result<Option<AttributeRow>>;

    /// Replace the row for a record, or add it if there is none yet.
    fn write_row(&mut self, record_number: u32, row: &AttributeRow) -> Result<()>;
}

impl AttributeStore for BTreeMap<u32, AttributeRow> {
    fn fetch_row(&self, record_number: u32) -> Result<Option<AttributeRow>> {
        Ok(self.get(&record_number).cloned())
    }

    fn write_row(&mut self, record_number: u32, row: &AttributeRow) -> Result<()> {
        self.insert(record_number, row.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnType {
    fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        ColumnDef {
            name: name.to_owned(),
            column_type,
        }
    }
}

const KEY_COLUMN: &str = "record_number";

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// An attribute table kept in SQLite, one row per record keyed by record number.
pub struct SqliteAttributeStore {
    /// The underlying rusqlite connection
    pub conn: Connection,
    table: String,
    columns: Vec<String>,
}

impl SqliteAttributeStore {
    /// Create the attribute table with the given columns. A `record_number`
    /// primary key column is added in front of them.
    pub fn create(conn: Connection, table: &str, columns: &[ColumnDef]) -> Result<Self> {
        let mut defs = vec![format!("{} INTEGER PRIMARY KEY", quote_ident(KEY_COLUMN))];
        defs.extend(
            columns
                .iter()
                .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_name())),
        );
        let sql = format!("CREATE TABLE {} ({});", quote_ident(table), defs.join(", "));
        conn.execute(&sql, [])?;
        Ok(SqliteAttributeStore {
            conn,
            table: table.to_owned(),
            columns: columns.iter().map(|c| c.name.clone()).collect(),
        })
    }

    /// Use an attribute table that already exists, discovering its columns.
    pub fn open(conn: Connection, table: &str) -> Result<Self> {
        let names = {
            let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
            let rows = stmt.query_map([table], |row| row.get::<_, String>(0))?;
            rows.collect::<rusqlite::Result<Vec<String>>>()?
        };
        if names.is_empty() {
            return Err(Error::MissingTable(table.to_owned()));
        }
        let columns = names.into_iter().filter(|n| n != KEY_COLUMN).collect();
        Ok(SqliteAttributeStore {
            conn,
            table: table.to_owned(),
            columns,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The attribute columns, without the record number key
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {};", quote_ident(&self.table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<String>>()
            .join(", ")
    }
}

impl AttributeStore for SqliteAttributeStore {
    fn fetch_row(&self, record_number: u32) -> Result<Option<AttributeRow>> {
        if self.columns.is_empty() {
            // nothing to select, but the row may still exist
            let sql = format!(
                "SELECT 1 FROM {} WHERE {} = ?1;",
                quote_ident(&self.table),
                quote_ident(KEY_COLUMN)
            );
            let found = self
                .conn
                .query_row(&sql, [record_number], |_| Ok(()))
                .optional()?;
            return Ok(found.map(|_| AttributeRow::new()));
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1;",
            self.column_list(),
            quote_ident(&self.table),
            quote_ident(KEY_COLUMN)
        );
        let row = self
            .conn
            .query_row(&sql, [record_number], |row| {
                let mut out = AttributeRow::new();
                for (i, name) in self.columns.iter().enumerate() {
                    out.insert(name.as_str(), row.get::<_, AttributeValue>(i)?);
                }
                Ok(out)
            })
            .optional()?;
        Ok(row)
    }

    fn write_row(&mut self, record_number: u32, row: &AttributeRow) -> Result<()> {
        for column in row.columns() {
            if !self.columns.iter().any(|c| c == column) {
                debug!(column, table = %self.table, "ignoring column missing from attribute table");
            }
        }
        let mut values = vec![AttributeValue::Integer(record_number as i64)];
        values.extend(
            self.columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or(AttributeValue::Null)),
        );
        let mut names = vec![quote_ident(KEY_COLUMN)];
        names.extend(self.columns.iter().map(|c| quote_ident(c)));
        let params: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({});",
            quote_ident(&self.table),
            names.join(", "),
            params.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(values.iter()))?;
        Ok(())
    }
}
