use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime, parse_session_status, parse_study_mode, to_i64, to_u64},
    models::{StudySession, StudySessionStatus},
};

fn row_to_session(row: &Row) -> Result<StudySession> {
    let status: String = row.get("status")?;
    let mode: String = row.get("mode")?;
    let target_ms: i64 = row.get("target_ms")?;
    let active_ms: i64 = row.get("active_ms")?;
    let started_at: String = row.get("started_at")?;
    let stopped_at: Option<String> = row.get("stopped_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(StudySession {
        id: row.get("id")?,
        class_id: row.get("class_id")?,
        status: parse_session_status(&status)?,
        mode: parse_study_mode(&mode)?,
        target_ms: to_u64(target_ms, "target_ms")?,
        active_ms: to_u64(active_ms, "active_ms")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        stopped_at: parse_optional_datetime(stopped_at, "stopped_at")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

const SESSION_COLUMNS: &str = "id, class_id, status, mode, target_ms, active_ms, started_at, \
                               stopped_at, created_at, updated_at";

impl Database {
    pub async fn insert_study_session(&self, session: &StudySession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO study_sessions (id, class_id, status, mode, target_ms, active_ms,
                                             started_at, stopped_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.id,
                    record.class_id,
                    record.status.as_str(),
                    record.mode.as_str(),
                    to_i64(record.target_ms)?,
                    to_i64(record.active_ms)?,
                    record.started_at.to_rfc3339(),
                    record.stopped_at.as_ref().map(|dt| dt.to_rfc3339()),
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn update_study_progress(
        &self,
        session_id: &str,
        active_ms: u64,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE study_sessions
                 SET active_ms = ?1,
                     updated_at = ?2
                 WHERE id = ?3",
                params![to_i64(active_ms)?, updated_at.to_rfc3339(), session_id],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn mark_study_status(
        &self,
        session_id: &str,
        status: StudySessionStatus,
        active_ms: u64,
        stopped_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE study_sessions
                 SET status = ?1,
                     active_ms = ?2,
                     stopped_at = ?3,
                     updated_at = ?4
                 WHERE id = ?5",
                params![
                    status.as_str(),
                    to_i64(active_ms)?,
                    stopped_at.map(|dt| dt.to_rfc3339()),
                    updated_at.to_rfc3339(),
                    session_id,
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Most recent session still marked Running, if any. Used at startup to
    /// finalize sessions orphaned by a crash.
    pub async fn get_incomplete_session(&self) -> Result<Option<StudySession>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM study_sessions
                 WHERE status = 'Running'
                 ORDER BY started_at DESC
                 LIMIT 1"
            ))?;

            let mut rows = stmt.query([])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_session(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn list_study_sessions(&self) -> Result<Vec<StudySession>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM study_sessions
                 ORDER BY started_at DESC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}
