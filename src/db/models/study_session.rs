use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum StudySessionStatus {
    Running,
    Completed,
    Cancelled,
    Interrupted,
}

impl StudySessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudySessionStatus::Running => "Running",
            StudySessionStatus::Completed => "Completed",
            StudySessionStatus::Cancelled => "Cancelled",
            StudySessionStatus::Interrupted => "Interrupted",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StudyMode {
    Countdown,
    Stopwatch,
}

impl StudyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyMode::Countdown => "countdown",
            StudyMode::Stopwatch => "stopwatch",
        }
    }
}

impl Default for StudyMode {
    fn default() -> Self {
        StudyMode::Countdown
    }
}

/// One tracked study session. `class_id` is the class the student was
/// studying for, when they picked one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub class_id: Option<String>,
    pub status: StudySessionStatus,
    pub mode: StudyMode,
    pub target_ms: u64,
    pub active_ms: u64,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
