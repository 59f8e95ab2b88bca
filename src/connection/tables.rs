//! Table discovery on a live session.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::connection::driver::Session;
use crate::connection::error::DriverError;

/// Engine pattern matching every MergeTree-family table.
pub const MERGE_TREE_ENGINES: &str = "MergeTree";

/// Tables grouped by database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableListing {
    /// Databases in server order.
    pub databases: Vec<String>,
    pub tables: BTreeMap<String, Vec<String>>,
}

/// Tables whose engine matches the regular expression `engine`, outside the
/// `system` database.
pub async fn merge_tree_tables<S: Session>(
    session: &S,
    engine: &str,
) -> Result<TableListing, DriverError> {
    let sql = format!(
        "SELECT DISTINCT database, name FROM system.tables \
         WHERE (match(engine, '{}')) AND (database != 'system') \
         ORDER BY database FORMAT TabSeparated",
        escape_literal(engine)
    );
    tracing::debug!(query = %sql, "Listing tables");
    let body = session.query(&sql).await?;
    parse_table_listing(&body)
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn parse_table_listing(body: &str) -> Result<TableListing, DriverError> {
    let mut listing = TableListing::default();
    for line in body.lines().filter(|l| !l.is_empty()) {
        let (database, table) = line
            .split_once('\t')
            .ok_or_else(|| DriverError::Protocol(format!("malformed table row '{}'", line)))?;

        let (database, table) = (unescape_field(database), unescape_field(table));

        if listing.databases.last() != Some(&database) {
            listing.databases.push(database.clone());
        }
        listing.tables.entry(database).or_default().push(table);
    }
    Ok(listing)
}

/// Undo TabSeparated escaping. Unknown escapes keep the escaped character.
fn unescape_field(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
