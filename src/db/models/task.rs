use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a task is pinned to a single due date or spans a start/end range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SchedulingMode {
    Due,
    Span,
}

impl SchedulingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingMode::Due => "due",
            SchedulingMode::Span => "span",
        }
    }
}

impl Default for SchedulingMode {
    fn default() -> Self {
        SchedulingMode::Due
    }
}

/// A persisted task. Date and time fields hold the calendar/clock strings
/// exactly as entered ("2024-01-15", "14:30"); only the group selected by
/// `scheduling` is authoritative, the other group is carried along untouched
/// so switching modes in the editor round-trips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub class_id: String,
    pub type_id: String,
    pub scheduling: SchedulingMode,
    pub due_date: String,
    pub due_time: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub completed: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
