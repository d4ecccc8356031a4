//! Column descriptors and the table renderer shared by every list screen.

use std::string::FromUtf8Error;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

/// Single date format used by every table.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const EMPTY_MESSAGE: &str = "No records found.";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid utf-8 in export: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Value of one table cell before it is turned into text.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Decimal(f64, usize),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Empty,
}

impl Cell {
    pub fn render(&self) -> String {
        match self {
            Cell::Text(value) => value.clone(),
            Cell::Integer(value) => value.to_string(),
            Cell::Decimal(value, precision) => format!("{value:.precision$}"),
            Cell::Date(value) => value.format(DATE_FORMAT).to_string(),
            Cell::DateTime(value) => value.format(DATE_TIME_FORMAT).to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl<V: Into<Cell>> From<Option<V>> for Cell {
    fn from(value: Option<V>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Integer(i64::from(value))
    }
}

impl From<u16> for Cell {
    fn from(value: u16) -> Self {
        Cell::Integer(i64::from(value))
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl From<DateTime<Utc>> for Cell {
    fn from(value: DateTime<Utc>) -> Self {
        Cell::DateTime(value)
    }
}

/// Accessor plus header label for one column.
pub struct Column<T> {
    pub key: &'static str,
    pub header: &'static str,
    accessor: fn(&T) -> Cell,
}

impl<T> Column<T> {
    pub fn new(key: &'static str, header: &'static str, accessor: fn(&T) -> Cell) -> Self {
        Self {
            key,
            header,
            accessor,
        }
    }

    pub fn cell(&self, record: &T) -> Cell {
        (self.accessor)(record)
    }
}

/// Column set for one record type.
pub struct Table<T> {
    columns: Vec<Column<T>>,
    row_id: fn(&T) -> String,
}

impl<T> Table<T> {
    pub fn new(row_id: fn(&T) -> String) -> Self {
        Self {
            columns: Vec::new(),
            row_id,
        }
    }

    pub fn column(mut self, key: &'static str, header: &'static str, accessor: fn(&T) -> Cell) -> Self {
        self.columns.push(Column::new(key, header, accessor));
        self
    }

    #[cfg(test)]
    pub(crate) fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Renders `items` in their given order.
    pub fn render(&self, items: &[T]) -> RenderedTable {
        let rows = items
            .iter()
            .map(|item| RenderedRow {
                id: (self.row_id)(item),
                cells: self
                    .columns
                    .iter()
                    .map(|column| column.cell(item).render())
                    .collect(),
            })
            .collect::<Vec<_>>();

        RenderedTable {
            keys: self.columns.iter().map(|column| column.key).collect(),
            headers: self.columns.iter().map(|column| column.header).collect(),
            empty: rows.is_empty(),
            empty_message: EMPTY_MESSAGE,
            rows,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RenderedRow {
    pub id: String,
    pub cells: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RenderedTable {
    pub keys: Vec<&'static str>,
    pub headers: Vec<&'static str>,
    pub rows: Vec<RenderedRow>,
    pub empty: bool,
    pub empty_message: &'static str,
}

impl RenderedTable {
    /// Exports headers and rendered cells as CSV.
    pub fn to_csv(&self) -> Result<String, TableError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(&row.cells)?;
        }
        let bytes = writer.into_inner().map_err(|err| err.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}
