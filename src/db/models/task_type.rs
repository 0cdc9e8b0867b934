use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A colored tag applied to tasks ("Homework", "Exam").
///
/// `color` is shown on open tasks, `completed_color` once the tagged task
/// is done.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskType {
    pub id: String,
    pub name: String,
    pub color: ColorToken,
    pub completed_color: ColorToken,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Fixed palette for task-type badges. Stored by token name, resolved to
/// concrete styling by the frontend theme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Purple,
    Pink,
    Gray,
}

impl ColorToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorToken::Red => "red",
            ColorToken::Orange => "orange",
            ColorToken::Yellow => "yellow",
            ColorToken::Green => "green",
            ColorToken::Teal => "teal",
            ColorToken::Blue => "blue",
            ColorToken::Purple => "purple",
            ColorToken::Pink => "pink",
            ColorToken::Gray => "gray",
        }
    }
}

impl Default for ColorToken {
    fn default() -> Self {
        ColorToken::Gray
    }
}
