use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_scheduling},
    models::Task,
};

fn row_to_task(row: &Row) -> Result<Task> {
    let scheduling: String = row.get("scheduling")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        class_id: row.get("class_id")?,
        type_id: row.get("type_id")?,
        scheduling: parse_scheduling(&scheduling)?,
        due_date: row.get("due_date")?,
        due_time: row.get("due_time")?,
        start_date: row.get("start_date")?,
        start_time: row.get("start_time")?,
        end_date: row.get("end_date")?,
        end_time: row.get("end_time")?,
        completed: row.get("completed")?,
        owner_id: row.get("owner_id")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

const TASK_COLUMNS: &str = "id, title, class_id, type_id, scheduling, due_date, due_time, \
                            start_date, start_time, end_date, end_time, completed, owner_id, \
                            created_at, updated_at";

impl Database {
    pub async fn insert_task(&self, task: &Task) -> Result<()> {
        let record = task.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, title, class_id, type_id, scheduling, due_date, due_time,
                                    start_date, start_time, end_date, end_time, completed,
                                    owner_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    record.id,
                    record.title,
                    record.class_id,
                    record.type_id,
                    record.scheduling.as_str(),
                    record.due_date,
                    record.due_time,
                    record.start_date,
                    record.start_time,
                    record.end_date,
                    record.end_time,
                    record.completed,
                    record.owner_id,
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Overwrite every editable field of an existing task; the identifier and
    /// creation timestamp are preserved. Returns false when the id is unknown.
    pub async fn update_task(&self, task: &Task) -> Result<bool> {
        let record = task.clone();
        self.execute(move |conn| {
            let affected = conn.execute(
                "UPDATE tasks
                 SET title = ?1,
                     class_id = ?2,
                     type_id = ?3,
                     scheduling = ?4,
                     due_date = ?5,
                     due_time = ?6,
                     start_date = ?7,
                     start_time = ?8,
                     end_date = ?9,
                     end_time = ?10,
                     completed = ?11,
                     updated_at = ?12
                 WHERE id = ?13",
                params![
                    record.title,
                    record.class_id,
                    record.type_id,
                    record.scheduling.as_str(),
                    record.due_date,
                    record.due_time,
                    record.start_date,
                    record.start_time,
                    record.end_date,
                    record.end_time,
                    record.completed,
                    record.updated_at.to_rfc3339(),
                    record.id,
                ],
            )?;
            Ok(affected > 0)
        })
        .await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
            let mut rows = stmt.query(params![task_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_task(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY rowid ASC"))?;

            let mut rows = stmt.query([])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }

            Ok(tasks)
        })
        .await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<bool> {
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            Ok(affected > 0)
        })
        .await
    }
}
