use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use log::error;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::{models::Task, Database},
    form::draft::{self, derive_draft, display_date, DraftPatch, TaskDraft, ValidationError},
    notify::Notifier,
    settings::SettingsStore,
    taxonomy::TaxonomyManager,
};

/// The single editor slot. The app shows one task editor at a time; closing
/// it discards whatever was in here.
#[derive(Default)]
pub struct DraftSlot {
    draft: Option<TaskDraft>,
    submitting: bool,
}

pub type SharedDraftSlot = Arc<Mutex<DraftSlot>>;

pub fn new_draft_slot() -> SharedDraftSlot {
    Arc::new(Mutex::new(DraftSlot::default()))
}

/// Narrow write capability over the open draft's taxonomy references. This
/// is all the taxonomy manager ever sees of the form: it can read and
/// repoint the class/type selection, nothing else. Every method is a no-op
/// when no editor is open, which is how completions that land after the
/// editor closed stay harmless.
#[derive(Clone)]
pub struct DraftRefs {
    slot: SharedDraftSlot,
}

impl DraftRefs {
    pub fn new(slot: SharedDraftSlot) -> Self {
        Self { slot }
    }

    pub async fn class_id(&self) -> Option<String> {
        self.slot
            .lock()
            .await
            .draft
            .as_ref()
            .map(|draft| draft.class_id.clone())
    }

    pub async fn set_class_id(&self, id: &str) {
        if let Some(draft) = self.slot.lock().await.draft.as_mut() {
            draft.class_id = id.to_string();
        }
    }

    pub async fn type_id(&self) -> Option<String> {
        self.slot
            .lock()
            .await
            .draft
            .as_ref()
            .map(|draft| draft.type_id.clone())
    }

    pub async fn set_type_id(&self, id: &str) {
        if let Some(draft) = self.slot.lock().await.draft.as_mut() {
            draft.type_id = id.to_string();
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("no task editor is open")]
    NoDraft,
    #[error("a submission is already in progress")]
    InFlight,
    #[error("failed to save task")]
    Persistence(#[source] anyhow::Error),
}

pub struct FormController {
    db: Database,
    notifier: Arc<dyn Notifier>,
    settings: Arc<SettingsStore>,
    taxonomy: Arc<TaxonomyManager>,
    slot: SharedDraftSlot,
}

impl FormController {
    pub fn new(
        db: Database,
        notifier: Arc<dyn Notifier>,
        settings: Arc<SettingsStore>,
        taxonomy: Arc<TaxonomyManager>,
        slot: SharedDraftSlot,
    ) -> Self {
        Self {
            db,
            notifier,
            settings,
            taxonomy,
            slot,
        }
    }

    /// Derive and install a fresh draft: blank for creation, overlaid from
    /// the stored task when an id is given.
    pub async fn open_editor(
        &self,
        task_id: Option<&str>,
        context_date: Option<&str>,
    ) -> Result<TaskDraft> {
        let editing = match task_id {
            Some(id) => Some(
                self.db
                    .get_task(id)
                    .await?
                    .ok_or_else(|| anyhow!("task {id} not found"))?,
            ),
            None => None,
        };

        let classes = self.taxonomy.classes();
        let types = self.taxonomy.task_types();
        let draft = derive_draft(editing.as_ref(), context_date, &classes, &types);

        let mut slot = self.slot.lock().await;
        slot.draft = Some(draft.clone());
        slot.submitting = false;
        Ok(draft)
    }

    pub async fn current_draft(&self) -> Option<TaskDraft> {
        self.slot.lock().await.draft.clone()
    }

    /// Apply a single-field patch to the open draft.
    pub async fn set_field(&self, patch: DraftPatch) -> Result<TaskDraft> {
        let mut slot = self.slot.lock().await;
        let draft = slot
            .draft
            .as_mut()
            .ok_or_else(|| anyhow!("no task editor is open"))?;
        draft.apply(patch);
        Ok(draft.clone())
    }

    pub async fn close_editor(&self) {
        let mut slot = self.slot.lock().await;
        slot.draft = None;
        slot.submitting = false;
    }

    /// The date string for the editor header.
    pub async fn display_date_for(
        &self,
        task_id: Option<&str>,
        context_date: Option<&str>,
    ) -> Result<String> {
        let editing = match task_id {
            Some(id) => self.db.get_task(id).await?,
            None => None,
        };
        Ok(display_date(editing.as_ref(), context_date))
    }

    /// Validate and persist the open draft. Validation failures surface one
    /// notification and leave everything untouched; persistence failures
    /// keep the draft so the user can retry. On success the editor closes.
    pub async fn submit(&self) -> Result<Task, SubmitError> {
        let draft = {
            let mut slot = self.slot.lock().await;
            let Some(draft) = slot.draft.clone() else {
                return Err(SubmitError::NoDraft);
            };
            if slot.submitting {
                return Err(SubmitError::InFlight);
            }

            let classes = self.taxonomy.classes();
            let types = self.taxonomy.task_types();
            if let Err(err) = draft::validate(&draft, &classes, &types) {
                self.notifier.notify(&err.to_string());
                return Err(SubmitError::Invalid(err));
            }

            slot.submitting = true;
            draft
        };

        let result = self.persist(&draft).await;

        let mut slot = self.slot.lock().await;
        slot.submitting = false;
        match result {
            Ok(task) => {
                // The editor may have been dismissed while the write was in
                // flight; clearing an already-empty slot is harmless.
                slot.draft = None;
                drop(slot);

                if let Ok(payload) = serde_json::to_value(&task) {
                    self.notifier.emit("tasks-changed", payload);
                }
                Ok(task)
            }
            Err(err) => {
                error!("Failed to save task: {err:#}");
                self.notifier
                    .notify("Something went wrong while saving the task");
                Err(SubmitError::Persistence(err))
            }
        }
    }

    async fn persist(&self, draft: &TaskDraft) -> Result<Task> {
        let now = Utc::now();

        match &draft.id {
            Some(id) => {
                let existing = self
                    .db
                    .get_task(id)
                    .await?
                    .ok_or_else(|| anyhow!("task {id} no longer exists"))?;

                let task = Task {
                    id: id.clone(),
                    title: draft.title.clone(),
                    class_id: draft.class_id.clone(),
                    type_id: draft.type_id.clone(),
                    scheduling: draft.scheduling,
                    due_date: draft.due_date.clone(),
                    due_time: draft.due_time.clone(),
                    start_date: draft.start_date.clone(),
                    start_time: draft.start_time.clone(),
                    end_date: draft.end_date.clone(),
                    end_time: draft.end_time.clone(),
                    completed: draft.completed,
                    owner_id: existing.owner_id,
                    created_at: existing.created_at,
                    updated_at: now,
                };

                if !self.db.update_task(&task).await? {
                    bail!("task {id} vanished during update");
                }
                Ok(task)
            }
            None => {
                let task = Task {
                    id: Uuid::new_v4().to_string(),
                    title: draft.title.clone(),
                    class_id: draft.class_id.clone(),
                    type_id: draft.type_id.clone(),
                    scheduling: draft.scheduling,
                    due_date: draft.due_date.clone(),
                    due_time: draft.due_time.clone(),
                    start_date: draft.start_date.clone(),
                    start_time: draft.start_time.clone(),
                    end_date: draft.end_date.clone(),
                    end_time: draft.end_time.clone(),
                    completed: false,
                    owner_id: self.settings.owner_id(),
                    created_at: now,
                    updated_at: now,
                };

                self.db.insert_task(&task).await?;
                Ok(task)
            }
        }
    }
}
