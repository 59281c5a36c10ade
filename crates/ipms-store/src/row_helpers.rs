//! Column decoding and query helpers shared by the repositories.

use rusqlite::{Connection, Params, Row, Statement};

use crate::errors::{Result, StoreError};

/// Get a column value, returning `CorruptRow` on failure.
pub fn get<T: rusqlite::types::FromSql>(
    row: &Row<'_>,
    idx: usize,
    table: &'static str,
    column: &'static str,
) -> Result<T> {
    row.get(idx).map_err(|e| StoreError::CorruptRow {
        table,
        column,
        detail: e.to_string(),
    })
}

/// Decode a text column into an enum via [`std::str::FromStr`].
pub fn get_enum<T: std::str::FromStr>(
    row: &Row<'_>,
    idx: usize,
    table: &'static str,
    column: &'static str,
) -> Result<T> {
    let raw: String = get(row, idx, table, column)?;
    parse_enum(&raw, table, column)
}

/// Decode a JSON text column.
pub fn get_json<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
    table: &'static str,
    column: &'static str,
) -> Result<T> {
    let raw: String = get(row, idx, table, column)?;
    serde_json::from_str(&raw).map_err(|e| StoreError::CorruptRow {
        table,
        column,
        detail: format!("invalid JSON: {e}"),
    })
}

/// Parse a string into an enum, returning `CorruptRow` on failure.
pub fn parse_enum<T: std::str::FromStr>(
    raw: &str,
    table: &'static str,
    column: &'static str,
) -> Result<T> {
    raw.parse().map_err(|_| StoreError::CorruptRow {
        table,
        column,
        detail: format!("unknown variant: {raw}"),
    })
}

/// Escape LIKE special characters for use with `ESCAPE '\'`.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `%needle%` pattern for a case-insensitive substring `LIKE`.
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

/// Run `stmt` and decode every row with `map`.
pub fn collect<T, P, F>(stmt: &mut Statement<'_>, params: P, map: F) -> Result<Vec<T>>
where
    P: Params,
    F: Fn(&Row<'_>) -> Result<T>,
{
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(map(row)?);
    }
    Ok(out)
}

/// Prepare `sql`, run it, and decode every row with `map`.
pub fn query_all<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> Result<Vec<T>>
where
    P: Params,
    F: Fn(&Row<'_>) -> Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    collect(&mut stmt, params, map)
}

/// Prepare `sql`, run it, and decode the first row if any.
pub fn query_opt<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> Result<Option<T>>
where
    P: Params,
    F: FnOnce(&Row<'_>) -> Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => map(row).map(Some),
        None => Ok(None),
    }
}

/// Dynamic `WHERE` clause with positional parameters.
///
/// Conditions are `AND`-joined. Each pushed value binds the next `?N`, and
/// every `?` in that clause refers to it.
#[derive(Default)]
pub struct Conditions {
    clauses: Vec<String>,
    values: Vec<rusqlite::types::Value>,
}

impl Conditions {
    /// Start with the mandatory ownership condition.
    pub fn new(clause: &str, value: impl Into<rusqlite::types::Value>) -> Self {
        let mut c = Self::default();
        c.push(clause, value);
        c
    }

    /// Add `clause`; each `?` in it becomes the placeholder for `value`.
    pub fn push(&mut self, clause: &str, value: impl Into<rusqlite::types::Value>) {
        self.values.push(value.into());
        let index = self.values.len();
        self.clauses.push(clause.replace('?', &format!("?{index}")));
    }

    /// Add `clause` when `value` is present.
    pub fn push_opt<V: Into<rusqlite::types::Value>>(&mut self, clause: &str, value: Option<V>) {
        if let Some(value) = value {
            self.push(clause, value);
        }
    }

    /// Bind an extra value (e.g. for `LIMIT`) and return its placeholder.
    pub fn bind(&mut self, value: impl Into<rusqlite::types::Value>) -> String {
        self.values.push(value.into());
        format!("?{}", self.values.len())
    }

    /// The `AND`-joined clause text.
    pub fn sql(&self) -> String {
        self.clauses.join(" AND ")
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, rusqlite::types::Value>> {
        rusqlite::params_from_iter(self.values.iter())
    }
}

/// Convert a timestamp into a bindable value in the column text format.
pub fn time_value(t: chrono::DateTime<chrono::Utc>) -> rusqlite::types::Value {
    rusqlite::types::Value::Text(t.format("%F %T%.f%:z").to_string())
}
