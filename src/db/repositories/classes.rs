use anyhow::{anyhow, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{encode_file_list, parse_datetime, parse_file_list},
    models::Class,
    repositories::assign_unique_id,
};

fn row_to_class(row: &Row) -> Result<Class> {
    let created_at: String = row.get("created_at")?;
    let files: String = row.get("files")?;

    Ok(Class {
        id: row.get("id")?,
        name: row.get("name")?,
        owner_id: row.get("owner_id")?,
        is_task_class: row.get("is_task_class")?,
        files: parse_file_list(&files)?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Persist a new class. The candidate identifier may be replaced with a
    /// uniquified one; the returned record is authoritative.
    pub async fn insert_class(&self, candidate: Class) -> Result<Class> {
        self.execute(move |conn| {
            let id = assign_unique_id(conn, "classes", &candidate.id)?;

            conn.execute(
                "INSERT INTO classes (id, name, owner_id, is_task_class, files, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    candidate.name,
                    candidate.owner_id,
                    candidate.is_task_class,
                    encode_file_list(&candidate.files)?,
                    candidate.created_at.to_rfc3339(),
                ],
            )?;

            let mut stmt = conn.prepare(
                "SELECT id, name, owner_id, is_task_class, files, created_at
                 FROM classes
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![id])?;
            match rows.next()? {
                Some(row) => row_to_class(row),
                None => Err(anyhow!("class not found after insert")),
            }
        })
        .await
    }

    /// Task classes in insertion order.
    pub async fn list_classes(&self) -> Result<Vec<Class>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, owner_id, is_task_class, files, created_at
                 FROM classes
                 WHERE is_task_class = 1
                 ORDER BY rowid ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut classes = Vec::new();
            while let Some(row) = rows.next()? {
                classes.push(row_to_class(row)?);
            }

            Ok(classes)
        })
        .await
    }

    /// Returns true when a row was actually removed.
    pub async fn delete_class(&self, class_id: &str) -> Result<bool> {
        let class_id = class_id.to_string();
        self.execute(move |conn| {
            let affected = conn.execute("DELETE FROM classes WHERE id = ?1", params![class_id])?;
            Ok(affected > 0)
        })
        .await
    }
}
