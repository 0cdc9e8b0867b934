use anyhow::{anyhow, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_color, parse_datetime},
    models::{ColorToken, TaskType},
    repositories::assign_unique_id,
};

fn row_to_task_type(row: &Row) -> Result<TaskType> {
    let created_at: String = row.get("created_at")?;
    let color: String = row.get("color")?;
    let completed_color: String = row.get("completed_color")?;

    Ok(TaskType {
        id: row.get("id")?,
        name: row.get("name")?,
        color: parse_color(&color)?,
        completed_color: parse_color(&completed_color)?,
        owner_id: row.get("owner_id")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Persist a new task type. As with classes, the candidate identifier may
    /// come back uniquified.
    pub async fn insert_task_type(&self, candidate: TaskType) -> Result<TaskType> {
        self.execute(move |conn| {
            let id = assign_unique_id(conn, "task_types", &candidate.id)?;

            conn.execute(
                "INSERT INTO task_types (id, name, color, completed_color, owner_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    candidate.name,
                    candidate.color.as_str(),
                    candidate.completed_color.as_str(),
                    candidate.owner_id,
                    candidate.created_at.to_rfc3339(),
                ],
            )?;

            let mut stmt = conn.prepare(
                "SELECT id, name, color, completed_color, owner_id, created_at
                 FROM task_types
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![id])?;
            match rows.next()? {
                Some(row) => row_to_task_type(row),
                None => Err(anyhow!("task type not found after insert")),
            }
        })
        .await
    }

    pub async fn list_task_types(&self) -> Result<Vec<TaskType>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, color, completed_color, owner_id, created_at
                 FROM task_types
                 ORDER BY rowid ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut task_types = Vec::new();
            while let Some(row) = rows.next()? {
                task_types.push(row_to_task_type(row)?);
            }

            Ok(task_types)
        })
        .await
    }

    pub async fn delete_task_type(&self, type_id: &str) -> Result<bool> {
        let type_id = type_id.to_string();
        self.execute(move |conn| {
            let affected =
                conn.execute("DELETE FROM task_types WHERE id = ?1", params![type_id])?;
            Ok(affected > 0)
        })
        .await
    }

    /// Update the two color fields of an existing type. Identifier and name
    /// are never touched. Returns the stored record, or None when the
    /// identifier is unknown.
    pub async fn update_task_type_colors(
        &self,
        type_id: &str,
        color: ColorToken,
        completed_color: ColorToken,
    ) -> Result<Option<TaskType>> {
        let type_id = type_id.to_string();
        self.execute(move |conn| {
            let affected = conn.execute(
                "UPDATE task_types SET color = ?1, completed_color = ?2 WHERE id = ?3",
                params![color.as_str(), completed_color.as_str(), type_id],
            )?;

            if affected == 0 {
                return Ok(None);
            }

            let mut stmt = conn.prepare(
                "SELECT id, name, color, completed_color, owner_id, created_at
                 FROM task_types
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![type_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_task_type(row)?)),
                None => Err(anyhow!("task type missing after update")),
            }
        })
        .await
    }
}
