use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping a task can belong to ("Biology", "Linear Algebra").
///
/// Classes live in a shared collection alongside other class-like entities;
/// only records with `is_task_class` set are offered in the task editor.
/// The identifier is a slug derived from the name at creation time; the
/// store may uniquify it, so callers must use the identifier of the record
/// the store hands back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub is_task_class: bool,
    pub files: Vec<String>,
    pub created_at: DateTime<Utc>,
}
