use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::models::{Class, SchedulingMode, Task, TaskType};

/// The in-progress task being created or edited.
///
/// Both date groups are always carried; `scheduling` selects which one is
/// authoritative, and the inactive group keeps whatever the user last typed
/// so toggling the mode loses nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Absent until the task has been persisted; present while editing.
    pub id: Option<String>,
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
}

/// One-field update to the open draft. Tagged so the webview sends
/// `{"field": "title", "value": "..."}` and nothing else gets touched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum DraftPatch {
    Title(String),
    ClassId(String),
    TypeId(String),
    Scheduling(SchedulingMode),
    DueDate(String),
    DueTime(String),
    StartDate(String),
    StartTime(String),
    EndDate(String),
    EndTime(String),
    Completed(bool),
}

impl TaskDraft {
    /// Replace exactly the attribute named by the patch.
    pub fn apply(&mut self, patch: DraftPatch) {
        match patch {
            DraftPatch::Title(value) => self.title = value,
            DraftPatch::ClassId(value) => self.class_id = value,
            DraftPatch::TypeId(value) => self.type_id = value,
            DraftPatch::Scheduling(value) => self.scheduling = value,
            DraftPatch::DueDate(value) => self.due_date = value,
            DraftPatch::DueTime(value) => self.due_time = value,
            DraftPatch::StartDate(value) => self.start_date = value,
            DraftPatch::StartTime(value) => self.start_time = value,
            DraftPatch::EndDate(value) => self.end_date = value,
            DraftPatch::EndTime(value) => self.end_time = value,
            DraftPatch::Completed(value) => self.completed = value,
        }
    }
}

/// Build the draft shown when the editor opens.
///
/// Creating: a blank template pointed at the first available class and type
/// (empty when the lists are empty), with every date field seeded from the
/// calendar date the editor was opened on. Editing: each non-empty stored
/// field overlays the template, so legacy rows with missing fields still get
/// the template's defaults.
pub fn derive_draft(
    editing: Option<&Task>,
    context_date: Option<&str>,
    classes: &[Class],
    types: &[TaskType],
) -> TaskDraft {
    let seed_date = context_date.unwrap_or_default().to_string();
    let template = TaskDraft {
        id: None,
        title: String::new(),
        class_id: classes.first().map(|c| c.id.clone()).unwrap_or_default(),
        type_id: types.first().map(|t| t.id.clone()).unwrap_or_default(),
        scheduling: SchedulingMode::Due,
        due_date: seed_date.clone(),
        due_time: String::new(),
        start_date: seed_date.clone(),
        start_time: String::new(),
        end_date: seed_date,
        end_time: String::new(),
        completed: false,
    };

    let Some(task) = editing else {
        return template;
    };

    TaskDraft {
        id: Some(task.id.clone()),
        title: overlay(&task.title, &template.title),
        class_id: overlay(&task.class_id, &template.class_id),
        type_id: overlay(&task.type_id, &template.type_id),
        scheduling: task.scheduling,
        due_date: overlay(&task.due_date, &template.due_date),
        due_time: overlay(&task.due_time, &template.due_time),
        start_date: overlay(&task.start_date, &template.start_date),
        start_time: overlay(&task.start_time, &template.start_time),
        end_date: overlay(&task.end_date, &template.end_date),
        end_time: overlay(&task.end_time, &template.end_time),
        completed: task.completed,
    }
}

fn overlay(stored: &str, fallback: &str) -> String {
    if stored.is_empty() {
        fallback.to_string()
    } else {
        stored.to_string()
    }
}

/// The date shown in the editor header: the task's due date when editing,
/// otherwise the calendar date the editor was opened on.
pub fn display_date(editing: Option<&Task>, context_date: Option<&str>) -> String {
    let source = editing
        .map(|task| task.due_date.as_str())
        .filter(|value| !value.is_empty())
        .or_else(|| context_date.filter(|value| !value.is_empty()));

    match source {
        Some(raw) => format_calendar_date(raw),
        None => "No Date".to_string(),
    }
}

fn format_calendar_date(raw: &str) -> String {
    // Plain calendar components only. Running the string through a
    // timezone-aware parser shifts the shown day for users west of UTC.
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => "Invalid Date".to_string(),
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a task title")]
    EmptyTitle,
    #[error("Please select a class")]
    MissingClass,
    #[error("Please select a task type")]
    MissingType,
}

/// Gate a draft before it is persisted. A missing class or type selection
/// only counts when there is anything to select.
pub fn validate(
    draft: &TaskDraft,
    classes: &[Class],
    types: &[TaskType],
) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if !classes.is_empty() && draft.class_id.is_empty() {
        return Err(ValidationError::MissingClass);
    }
    if !types.is_empty() && draft.type_id.is_empty() {
        return Err(ValidationError::MissingType);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::models::ColorToken;

    fn class(id: &str, name: &str) -> Class {
        Class {
            id: id.to_string(),
            name: name.to_string(),
            owner_id: "local".to_string(),
            is_task_class: true,
            files: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn task_type(id: &str, name: &str) -> TaskType {
        TaskType {
            id: id.to_string(),
            name: name.to_string(),
            color: ColorToken::Blue,
            completed_color: ColorToken::Gray,
            owner_id: "local".to_string(),
            created_at: Utc::now(),
        }
    }

    fn stored_task() -> Task {
        Task {
            id: "task-1".to_string(),
            title: "Read chapter 4".to_string(),
            class_id: "biology".to_string(),
            type_id: "reading".to_string(),
            scheduling: SchedulingMode::Span,
            due_date: "2024-01-15".to_string(),
            due_time: "23:59".to_string(),
            start_date: "2024-01-10".to_string(),
            start_time: "09:00".to_string(),
            end_date: "2024-01-14".to_string(),
            end_time: "17:00".to_string(),
            completed: true,
            owner_id: "local".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn blank_draft_seeds_from_first_available_entries() {
        let classes = vec![class("biology", "Biology"), class("calculus", "Calculus")];
        let types = vec![task_type("homework", "Homework")];

        let draft = derive_draft(None, Some("2024-03-01"), &classes, &types);

        assert_eq!(draft.id, None);
        assert_eq!(draft.title, "");
        assert!(!draft.completed);
        assert_eq!(draft.class_id, "biology");
        assert_eq!(draft.type_id, "homework");
        assert_eq!(draft.due_date, "2024-03-01");
        assert_eq!(draft.start_date, "2024-03-01");
        assert_eq!(draft.end_date, "2024-03-01");
        assert_eq!(draft.due_time, "");
    }

    #[test]
    fn blank_draft_with_empty_taxonomies_leaves_references_empty() {
        let draft = derive_draft(None, None, &[], &[]);

        assert_eq!(draft.class_id, "");
        assert_eq!(draft.type_id, "");
        assert_eq!(draft.due_date, "");
    }

    #[test]
    fn editing_reproduces_every_stored_field() {
        let task = stored_task();
        let classes = vec![class("chemistry", "Chemistry")];
        let types = vec![task_type("essay", "Essay")];

        let draft = derive_draft(Some(&task), Some("2024-06-01"), &classes, &types);

        assert_eq!(draft.id.as_deref(), Some("task-1"));
        assert_eq!(draft.title, task.title);
        assert_eq!(draft.class_id, "biology");
        assert_eq!(draft.type_id, "reading");
        assert_eq!(draft.scheduling, SchedulingMode::Span);
        assert_eq!(draft.due_date, "2024-01-15");
        assert_eq!(draft.start_time, "09:00");
        assert_eq!(draft.end_time, "17:00");
        assert!(draft.completed);
    }

    #[test]
    fn editing_falls_back_to_template_for_empty_fields() {
        let mut task = stored_task();
        task.due_date = String::new();
        task.class_id = String::new();

        let classes = vec![class("chemistry", "Chemistry")];
        let draft = derive_draft(Some(&task), Some("2024-06-01"), &classes, &[]);

        assert_eq!(draft.due_date, "2024-06-01");
        assert_eq!(draft.class_id, "chemistry");
    }

    #[test]
    fn apply_touches_exactly_one_field() {
        let mut draft = derive_draft(None, Some("2024-03-01"), &[], &[]);
        let before = draft.clone();

        draft.apply(DraftPatch::Title("Lab report".to_string()));

        assert_eq!(draft.title, "Lab report");
        assert_eq!(draft.due_date, before.due_date);
        assert_eq!(draft.class_id, before.class_id);
        assert_eq!(draft.scheduling, before.scheduling);
    }

    #[test]
    fn display_date_prefers_the_edited_tasks_due_date() {
        let task = stored_task();
        assert_eq!(
            display_date(Some(&task), Some("2024-06-01")),
            "January 15, 2024"
        );
    }

    #[test]
    fn display_date_is_stable_for_a_fixed_calendar_string() {
        // Must hold in every runtime timezone: the string names a calendar
        // day, not an instant.
        let first = display_date(None, Some("2024-01-15"));
        let second = display_date(None, Some("2024-01-15"));
        assert_eq!(first, "January 15, 2024");
        assert_eq!(first, second);
    }

    #[test]
    fn display_date_flags_garbage_and_absence_separately() {
        let mut task = stored_task();
        task.due_date = "not-a-date".to_string();

        assert_eq!(display_date(Some(&task), None), "Invalid Date");
        assert_eq!(display_date(None, None), "No Date");
    }

    #[test]
    fn empty_title_always_fails_validation() {
        let mut draft = derive_draft(None, None, &[], &[]);
        draft.title = "   ".to_string();
        draft.class_id = "biology".to_string();

        assert_eq!(
            validate(&draft, &[], &[]),
            Err(ValidationError::EmptyTitle)
        );
    }

    #[test]
    fn missing_class_only_matters_when_classes_exist() {
        let mut draft = derive_draft(None, None, &[], &[]);
        draft.title = "Problem set".to_string();

        assert_eq!(validate(&draft, &[], &[]), Ok(()));

        let classes = vec![class("biology", "Biology")];
        assert_eq!(
            validate(&draft, &classes, &[]),
            Err(ValidationError::MissingClass)
        );

        draft.class_id = "biology".to_string();
        let types = vec![task_type("homework", "Homework")];
        assert_eq!(
            validate(&draft, &classes, &types),
            Err(ValidationError::MissingType)
        );
    }
}
