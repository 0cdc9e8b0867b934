//! End-to-end flows over a throwaway database: taxonomy CRUD reconciling the
//! open draft, task submission, and the study tracker lifecycle.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;
use studyhall_lib::{
    db::{
        models::{ColorToken, StudyMode, StudySession, StudySessionStatus},
        Database,
    },
    form::{
        controller::{new_draft_slot, DraftRefs},
        DraftPatch, FormController,
    },
    notify::Notifier,
    settings::SettingsStore,
    study::StudyTracker,
    taxonomy::TaxonomyManager,
};
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<String>>,
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    fn event_count(&self, event: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn emit(&self, event: &str, payload: Value) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
    }
}

struct Harness {
    _dir: TempDir,
    db: Database,
    notifier: Arc<RecordingNotifier>,
    taxonomy: Arc<TaxonomyManager>,
    form: Arc<FormController>,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::new(dir.path().join("studyhall.sqlite3")).expect("database");
    let notifier = Arc::new(RecordingNotifier::default());
    let settings =
        Arc::new(SettingsStore::new(dir.path().join("settings.json")).expect("settings"));

    let slot = new_draft_slot();
    let taxonomy = Arc::new(TaxonomyManager::new(
        db.clone(),
        notifier.clone(),
        settings.clone(),
        DraftRefs::new(slot.clone()),
    ));
    let form = Arc::new(FormController::new(
        db.clone(),
        notifier.clone(),
        settings,
        taxonomy.clone(),
        slot,
    ));

    Harness {
        _dir: dir,
        db,
        notifier,
        taxonomy,
        form,
    }
}

#[tokio::test]
async fn adding_a_class_appends_it_and_selects_it_in_the_draft() {
    let h = harness();
    h.form.open_editor(None, Some("2024-03-01")).await.unwrap();

    let stored = h.taxonomy.add_class("Biology").await.unwrap();

    assert_eq!(stored.id, "biology");
    assert_eq!(stored.name, "Biology");

    let classes = h.taxonomy.classes();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, "biology");

    let draft = h.form.current_draft().await.unwrap();
    assert_eq!(draft.class_id, "biology");

    let ui = h.taxonomy.ui_state().await;
    assert!(!ui.classes.adding);
    assert!(!ui.classes.input_open);
}

#[tokio::test]
async fn colliding_class_names_get_uniquified_identifiers() {
    let h = harness();

    let first = h.taxonomy.add_class("Biology").await.unwrap();
    let second = h.taxonomy.add_class("  biology ").await.unwrap();

    assert_eq!(first.id, "biology");
    assert_eq!(second.id, "biology-2");
    assert_eq!(h.taxonomy.classes().len(), 2);
}

#[tokio::test]
async fn empty_class_name_is_rejected_with_one_notice() {
    let h = harness();

    assert!(h.taxonomy.add_class("   ").await.is_err());

    assert!(h.taxonomy.classes().is_empty());
    assert_eq!(h.notifier.notices().len(), 1);
}

#[tokio::test]
async fn deleting_the_selected_class_falls_back_to_the_first_remaining() {
    let h = harness();
    h.form.open_editor(None, None).await.unwrap();

    h.taxonomy.add_class("Biology").await.unwrap();
    h.taxonomy.add_class("Calculus").await.unwrap();
    assert_eq!(
        h.form.current_draft().await.unwrap().class_id,
        "calculus"
    );

    assert!(h.taxonomy.request_delete_class("calculus").await);
    h.taxonomy
        .resolve_delete_class("calculus", true)
        .await
        .unwrap();

    let classes = h.taxonomy.classes();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, "biology");
    assert_eq!(h.form.current_draft().await.unwrap().class_id, "biology");
}

#[tokio::test]
async fn declining_a_delete_changes_nothing() {
    let h = harness();
    h.taxonomy.add_class("Biology").await.unwrap();

    assert!(h.taxonomy.request_delete_class("biology").await);
    h.taxonomy
        .resolve_delete_class("biology", false)
        .await
        .unwrap();

    assert_eq!(h.taxonomy.classes().len(), 1);
    let ui = h.taxonomy.ui_state().await;
    assert!(ui.classes.confirming_delete.is_none());
}

#[tokio::test]
async fn deleting_an_unknown_class_is_a_silent_noop() {
    let h = harness();
    h.taxonomy.add_class("Biology").await.unwrap();
    let notices_before = h.notifier.notices().len();

    assert!(!h.taxonomy.request_delete_class("philosophy").await);

    assert_eq!(h.taxonomy.classes().len(), 1);
    assert_eq!(h.notifier.notices().len(), notices_before);
    let ui = h.taxonomy.ui_state().await;
    assert!(ui.classes.confirming_delete.is_none());
}

#[tokio::test]
async fn failed_task_type_persistence_leaves_everything_untouched() {
    let h = harness();

    // Sabotage the store so the insert rejects.
    h.db
        .execute(|conn| {
            conn.execute_batch("DROP TABLE task_types;")?;
            Ok(())
        })
        .await
        .unwrap();

    let result = h
        .taxonomy
        .add_task_type("Homework", ColorToken::Blue, ColorToken::Gray)
        .await;

    assert!(result.is_err());
    assert!(h.taxonomy.task_types().is_empty());
    assert_eq!(h.notifier.notices().len(), 1);
    assert_eq!(h.notifier.event_count("task-types-changed"), 0);

    let ui = h.taxonomy.ui_state().await;
    assert!(!ui.task_types.adding);
}

#[tokio::test]
async fn updating_type_colors_replaces_the_entry_in_place() {
    let h = harness();
    let stored = h
        .taxonomy
        .add_task_type("Homework", ColorToken::Blue, ColorToken::Gray)
        .await
        .unwrap();

    h.taxonomy.set_type_editing(Some(stored.id.clone())).await;
    h.taxonomy
        .update_task_type(&stored.id, ColorToken::Red, ColorToken::Pink)
        .await
        .unwrap();

    let types = h.taxonomy.task_types();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].id, stored.id);
    assert_eq!(types[0].name, "Homework");
    assert_eq!(types[0].color, ColorToken::Red);
    assert_eq!(types[0].completed_color, ColorToken::Pink);

    let ui = h.taxonomy.ui_state().await;
    assert!(ui.task_types.editing.is_none());
}

#[tokio::test]
async fn updating_an_unknown_type_is_a_silent_noop() {
    let h = harness();

    h.taxonomy
        .update_task_type("nonexistent", ColorToken::Red, ColorToken::Pink)
        .await
        .unwrap();

    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn a_completion_landing_after_the_editor_closed_is_harmless() {
    let h = harness();
    h.form.open_editor(None, None).await.unwrap();
    h.form.close_editor().await;

    h.taxonomy.add_class("Biology").await.unwrap();

    // The list still grew; only the draft repoint became a no-op.
    assert_eq!(h.taxonomy.classes().len(), 1);
    assert!(h.form.current_draft().await.is_none());
}

#[tokio::test]
async fn submitting_a_valid_draft_creates_a_task_and_closes_the_editor() {
    let h = harness();
    h.taxonomy.add_class("Biology").await.unwrap();
    h.taxonomy
        .add_task_type("Homework", ColorToken::Blue, ColorToken::Gray)
        .await
        .unwrap();

    h.form.open_editor(None, Some("2024-03-01")).await.unwrap();
    h.form
        .set_field(DraftPatch::Title("Problem set 3".to_string()))
        .await
        .unwrap();

    let task = h.form.submit().await.unwrap();

    assert_eq!(task.title, "Problem set 3");
    assert_eq!(task.class_id, "biology");
    assert_eq!(task.type_id, "homework");
    assert_eq!(task.due_date, "2024-03-01");
    assert!(!task.completed);

    assert!(h.form.current_draft().await.is_none());
    assert_eq!(h.db.list_tasks().await.unwrap().len(), 1);
    assert_eq!(h.notifier.event_count("tasks-changed"), 1);
}

#[tokio::test]
async fn submitting_without_a_title_fails_and_keeps_the_draft() {
    let h = harness();
    h.form.open_editor(None, None).await.unwrap();

    assert!(h.form.submit().await.is_err());

    assert_eq!(
        h.notifier.notices(),
        vec!["Please enter a task title".to_string()]
    );
    assert!(h.form.current_draft().await.is_some());
    assert!(h.db.list_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn a_missing_class_selection_only_fails_when_classes_exist() {
    let h = harness();

    // Open with no classes: a draft with an empty class reference.
    h.form.open_editor(None, None).await.unwrap();
    h.form
        .set_field(DraftPatch::Title("Reading response".to_string()))
        .await
        .unwrap();

    // With no classes at all, the empty reference is acceptable.
    assert!(h.form.submit().await.is_ok());

    // With a class on the books, an emptied-out reference must fail.
    h.taxonomy.add_class("Biology").await.unwrap();
    h.form.open_editor(None, None).await.unwrap();
    h.form
        .set_field(DraftPatch::Title("Essay outline".to_string()))
        .await
        .unwrap();
    h.form
        .set_field(DraftPatch::ClassId(String::new()))
        .await
        .unwrap();

    assert!(h.form.submit().await.is_err());
    assert!(h
        .notifier
        .notices()
        .contains(&"Please select a class".to_string()));
}

#[tokio::test]
async fn editing_preserves_the_task_identity() {
    let h = harness();
    h.taxonomy.add_class("Biology").await.unwrap();

    h.form.open_editor(None, Some("2024-03-01")).await.unwrap();
    h.form
        .set_field(DraftPatch::Title("First draft".to_string()))
        .await
        .unwrap();
    let created = h.form.submit().await.unwrap();

    h.form
        .open_editor(Some(created.id.as_str()), None)
        .await
        .unwrap();
    h.form
        .set_field(DraftPatch::Title("Final draft".to_string()))
        .await
        .unwrap();
    h.form.set_field(DraftPatch::Completed(true)).await.unwrap();
    let updated = h.form.submit().await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Final draft");
    assert!(updated.completed);
    assert_eq!(h.db.list_tasks().await.unwrap().len(), 1);
}

#[tokio::test]
async fn display_date_reads_the_stored_due_date() {
    let h = harness();
    h.form.open_editor(None, Some("2024-01-15")).await.unwrap();
    h.form
        .set_field(DraftPatch::Title("Lab writeup".to_string()))
        .await
        .unwrap();
    let task = h.form.submit().await.unwrap();

    let shown = h
        .form
        .display_date_for(Some(task.id.as_str()), Some("2024-06-01"))
        .await
        .unwrap();
    assert_eq!(shown, "January 15, 2024");

    let fallback = h.form.display_date_for(None, None).await.unwrap();
    assert_eq!(fallback, "No Date");
}

#[tokio::test]
async fn study_tracker_round_trip() {
    let h = harness();
    let notifier: Arc<RecordingNotifier> = h.notifier.clone();
    let tracker = StudyTracker::new(h.db.clone(), notifier);

    let state = tracker
        .start(25 * 60 * 1000, Some(StudyMode::Countdown), Some("biology".to_string()))
        .await
        .unwrap();
    assert!(state.session_id.is_some());

    // A second start while one is running is rejected.
    assert!(tracker.start(1000, None, None).await.is_err());

    let finished = tracker.finish().await.unwrap();
    assert_eq!(finished.status, StudySessionStatus::Completed);
    assert_eq!(finished.class_id.as_deref(), Some("biology"));

    let sessions = h.db.list_study_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, StudySessionStatus::Completed);

    assert!(h.notifier.event_count("study-state-changed") >= 2);
    assert_eq!(h.notifier.event_count("study-session-completed"), 1);
}

#[tokio::test]
async fn countdown_sessions_need_a_positive_target() {
    let h = harness();
    let tracker = StudyTracker::new(h.db.clone(), h.notifier.clone());

    assert!(tracker
        .start(0, Some(StudyMode::Countdown), None)
        .await
        .is_err());
    assert!(h.db.list_study_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn interrupted_sessions_are_found_for_crash_recovery() {
    let h = harness();
    let now = Utc::now();

    let orphan = StudySession {
        id: Uuid::new_v4().to_string(),
        class_id: None,
        status: StudySessionStatus::Running,
        mode: StudyMode::Countdown,
        target_ms: 1_500_000,
        active_ms: 600_000,
        started_at: now,
        stopped_at: None,
        created_at: now,
        updated_at: now,
    };
    h.db.insert_study_session(&orphan).await.unwrap();

    let found = h.db.get_incomplete_session().await.unwrap().unwrap();
    assert_eq!(found.id, orphan.id);

    h.db.mark_study_status(
        &orphan.id,
        StudySessionStatus::Interrupted,
        found.active_ms,
        Some(now),
        now,
    )
    .await
    .unwrap();

    assert!(h.db.get_incomplete_session().await.unwrap().is_none());
    let sessions = h.db.list_study_sessions().await.unwrap();
    assert_eq!(sessions[0].status, StudySessionStatus::Interrupted);
}
