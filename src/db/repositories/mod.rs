use anyhow::Result;
use rusqlite::{params, Connection};

mod classes;
mod study_sessions;
mod task_types;
mod tasks;

/// Taxonomy identifiers are slugs derived client-side from display names, so
/// two names differing only in case or whitespace produce the same candidate.
/// The store resolves the collision at insert time by suffixing a counter;
/// callers must use the identifier of the record the store returns.
pub(crate) fn assign_unique_id(conn: &Connection, table: &str, candidate: &str) -> Result<String> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
    let mut stmt = conn.prepare(&sql)?;

    let mut id = candidate.to_string();
    let mut suffix = 2u32;
    loop {
        let taken: bool = stmt.query_row(params![id], |row| row.get(0))?;
        if !taken {
            return Ok(id);
        }
        id = format!("{candidate}-{suffix}");
        suffix += 1;
    }
}
