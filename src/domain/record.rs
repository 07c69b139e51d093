//! Positional binding of delimited rows onto typed records.
//!
//! A record type describes its columns with an ordered slice of [`Field`]s.
//! Cell `i` of a row is handed to the coercion of field `i`; the position in
//! the slice is the only thing that ties a column to a field.

use std::fmt::Display;
use std::str::FromStr;

use crate::domain::error::TreeTraderError;

/// Number of leading rows skipped by [`normalize`] callers by default (the header).
pub const DEFAULT_SKIP: usize = 1;

/// One delimited line, split into cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source file.
    pub line: u64,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new(line: u64, cells: Vec<String>) -> Self {
        Self { line, cells }
    }
}

/// Parses one cell and stores it into the record.
pub type Coerce<T> = fn(&mut T, &str) -> Result<(), String>;

/// A named column of a record, in declaration order.
pub struct Field<T> {
    pub name: &'static str,
    pub coerce: Coerce<T>,
}

/// A record that can be built from a row of cells.
pub trait TabularRecord: Default + 'static {
    const FIELDS: &'static [Field<Self>];
}

/// Enum types that parse from their symbolic name.
pub trait Symbolic: Copy + 'static {
    const SYMBOLS: &'static [(&'static str, Self)];

    fn symbol(self) -> &'static str;
}

/// Parse a number (or any `FromStr` value) with locale-invariant rules.
pub fn parse_value<V>(cell: &str) -> Result<V, String>
where
    V: FromStr,
    V::Err: Display,
{
    cell.trim()
        .parse::<V>()
        .map_err(|e| format!("cannot parse {:?}: {}", cell, e))
}

pub fn parse_bool(cell: &str) -> Result<bool, String> {
    let trimmed = cell.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("cannot parse {:?} as a boolean", cell))
    }
}

/// Exact name match first, then case-insensitive.
pub fn parse_symbol<E: Symbolic>(cell: &str) -> Result<E, String> {
    let trimmed = cell.trim();
    E::SYMBOLS
        .iter()
        .find(|(name, _)| *name == trimmed)
        .or_else(|| {
            E::SYMBOLS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        })
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            let known: Vec<&str> = E::SYMBOLS.iter().map(|(name, _)| *name).collect();
            format!("{:?} is not one of {}", cell, known.join(", "))
        })
}

/// Bind every row after the first `skip` rows onto `T`.
pub fn normalize<T: TabularRecord>(rows: &[RawRow], skip: usize) -> Result<Vec<T>, TreeTraderError> {
    rows.iter().skip(skip).map(bind_row::<T>).collect()
}

fn bind_row<T: TabularRecord>(row: &RawRow) -> Result<T, TreeTraderError> {
    let fields = T::FIELDS;

    if row.cells.len() != fields.len() {
        let field = if row.cells.len() < fields.len() {
            fields[row.cells.len()].name
        } else {
            "<extra>"
        };
        return Err(TreeTraderError::SchemaMismatch {
            line: row.line,
            field: field.to_string(),
            reason: format!(
                "expected {} cells, found {}",
                fields.len(),
                row.cells.len()
            ),
        });
    }

    let mut record = T::default();
    for (field, cell) in fields.iter().zip(&row.cells) {
        (field.coerce)(&mut record, cell).map_err(|reason| TreeTraderError::SchemaMismatch {
            line: row.line,
            field: field.name.to_string(),
            reason,
        })?;
    }
    Ok(record)
}
