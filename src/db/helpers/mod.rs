use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::{ColorToken, SchedulingMode, StudyMode, StudySessionStatus};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_session_status(value: &str) -> Result<StudySessionStatus> {
    match value {
        "Running" => Ok(StudySessionStatus::Running),
        "Completed" => Ok(StudySessionStatus::Completed),
        "Cancelled" => Ok(StudySessionStatus::Cancelled),
        "Interrupted" => Ok(StudySessionStatus::Interrupted),
        other => Err(anyhow!("unknown study session status {other}")),
    }
}

pub fn parse_study_mode(value: &str) -> Result<StudyMode> {
    match value {
        "countdown" => Ok(StudyMode::Countdown),
        "stopwatch" => Ok(StudyMode::Stopwatch),
        other => Err(anyhow!("unknown study mode {other}")),
    }
}

pub fn parse_scheduling(value: &str) -> Result<SchedulingMode> {
    match value {
        "due" => Ok(SchedulingMode::Due),
        "span" => Ok(SchedulingMode::Span),
        other => Err(anyhow!("unknown scheduling mode {other}")),
    }
}

pub fn parse_color(value: &str) -> Result<ColorToken> {
    match value {
        "red" => Ok(ColorToken::Red),
        "orange" => Ok(ColorToken::Orange),
        "yellow" => Ok(ColorToken::Yellow),
        "green" => Ok(ColorToken::Green),
        "teal" => Ok(ColorToken::Teal),
        "blue" => Ok(ColorToken::Blue),
        "purple" => Ok(ColorToken::Purple),
        "pink" => Ok(ColorToken::Pink),
        "gray" => Ok(ColorToken::Gray),
        other => Err(anyhow!("unknown color token {other}")),
    }
}

/// Class file lists are stored as a JSON array in a TEXT column.
pub fn parse_file_list(value: &str) -> Result<Vec<String>> {
    serde_json::from_str(value).with_context(|| "failed to parse class file list")
}

pub fn encode_file_list(files: &[String]) -> Result<String> {
    serde_json::to_string(files).with_context(|| "failed to encode class file list")
}
