use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex as StdMutex},
};

use anyhow::Result;
use chrono::Utc;
use log::error;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    db::{
        models::{Class, ColorToken, TaskType},
        Database,
    },
    form::controller::DraftRefs,
    notify::Notifier,
    settings::SettingsStore,
    taxonomy::slug,
};

/// Transient UI state for one entity kind. `management_open` is an
/// orthogonal toggle. The add chain passes through `input_open` and `adding`
/// before returning to idle; the delete chain through `confirming_delete`
/// and `deleting`, keyed per identifier so unrelated entities can be removed
/// concurrently. `editing` and `updating` are only driven for task types.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindState {
    pub input_open: bool,
    pub adding: bool,
    pub management_open: bool,
    pub confirming_delete: Option<String>,
    pub deleting: BTreeSet<String>,
    pub editing: Option<String>,
    pub updating: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyUi {
    pub classes: KindState,
    pub task_types: KindState,
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("a name is required")]
    EmptyName,
    #[error("another operation on this entry is still in progress")]
    InFlight,
    #[error("failed to save changes")]
    Persistence(#[source] anyhow::Error),
}

/// Owns the authoritative class and task-type lists plus the transient state
/// of the inline add/delete/edit flows. Lists are handed out as `Arc`
/// snapshots and replaced wholesale on every mutation, never spliced, so
/// anything holding a previous snapshot can detect the change; every
/// replacement is also broadcast to the webview.
pub struct TaxonomyManager {
    db: Database,
    notifier: Arc<dyn Notifier>,
    settings: Arc<SettingsStore>,
    draft: DraftRefs,
    classes: StdMutex<Arc<Vec<Class>>>,
    task_types: StdMutex<Arc<Vec<TaskType>>>,
    class_ui: Mutex<KindState>,
    type_ui: Mutex<KindState>,
}

impl TaxonomyManager {
    pub fn new(
        db: Database,
        notifier: Arc<dyn Notifier>,
        settings: Arc<SettingsStore>,
        draft: DraftRefs,
    ) -> Self {
        Self {
            db,
            notifier,
            settings,
            draft,
            classes: StdMutex::new(Arc::new(Vec::new())),
            task_types: StdMutex::new(Arc::new(Vec::new())),
            class_ui: Mutex::new(KindState::default()),
            type_ui: Mutex::new(KindState::default()),
        }
    }

    /// Populate both lists from the store. Called once at startup.
    pub async fn load(&self) -> Result<()> {
        let classes = self.db.list_classes().await?;
        let task_types = self.db.list_task_types().await?;
        *self.classes.lock().unwrap() = Arc::new(classes);
        *self.task_types.lock().unwrap() = Arc::new(task_types);
        Ok(())
    }

    pub fn classes(&self) -> Arc<Vec<Class>> {
        self.classes.lock().unwrap().clone()
    }

    pub fn task_types(&self) -> Arc<Vec<TaskType>> {
        self.task_types.lock().unwrap().clone()
    }

    pub async fn ui_state(&self) -> TaxonomyUi {
        TaxonomyUi {
            classes: self.class_ui.lock().await.clone(),
            task_types: self.type_ui.lock().await.clone(),
        }
    }

    pub async fn set_class_input_open(&self, open: bool) {
        self.class_ui.lock().await.input_open = open;
    }

    pub async fn set_type_input_open(&self, open: bool) {
        self.type_ui.lock().await.input_open = open;
    }

    pub async fn toggle_class_management(&self) -> bool {
        let mut ui = self.class_ui.lock().await;
        ui.management_open = !ui.management_open;
        ui.management_open
    }

    pub async fn toggle_type_management(&self) -> bool {
        let mut ui = self.type_ui.lock().await;
        ui.management_open = !ui.management_open;
        ui.management_open
    }

    /// Begin or leave edit mode for a task type's colors. Unknown
    /// identifiers are stale UI and ignored.
    pub async fn set_type_editing(&self, type_id: Option<String>) {
        if let Some(id) = &type_id {
            if !self.task_types().iter().any(|t| &t.id == id) {
                return;
            }
        }
        self.type_ui.lock().await.editing = type_id;
    }

    pub async fn add_class(&self, name: &str) -> Result<Class, TaxonomyError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.notifier.notify("Please enter a class name");
            return Err(TaxonomyError::EmptyName);
        }

        {
            let mut ui = self.class_ui.lock().await;
            if ui.adding {
                return Err(TaxonomyError::InFlight);
            }
            ui.adding = true;
        }

        let candidate = Class {
            id: slug::derive_id(trimmed),
            name: trimmed.to_string(),
            owner_id: self.settings.owner_id(),
            is_task_class: true,
            files: Vec::new(),
            created_at: Utc::now(),
        };

        let result = self.db.insert_class(candidate).await;

        let mut ui = self.class_ui.lock().await;
        ui.adding = false;
        match result {
            Ok(stored) => {
                ui.input_open = false;
                drop(ui);

                self.push_class(stored.clone());
                // Point the open draft (if any) at the confirmed identifier,
                // which may differ from the client-derived one.
                self.draft.set_class_id(&stored.id).await;
                Ok(stored)
            }
            Err(err) => {
                drop(ui);
                error!("Failed to add class: {err:#}");
                self.notifier
                    .notify("Something went wrong while adding the class");
                Err(TaxonomyError::Persistence(err))
            }
        }
    }

    /// First half of the delete flow: enter the confirmation state. Returns
    /// false (and changes nothing) when the identifier is not in the current
    /// list or a delete of it is already running.
    pub async fn request_delete_class(&self, class_id: &str) -> bool {
        if !self.classes().iter().any(|c| c.id == class_id) {
            return false;
        }

        let mut ui = self.class_ui.lock().await;
        if ui.deleting.contains(class_id) {
            return false;
        }
        ui.confirming_delete = Some(class_id.to_string());
        true
    }

    /// Second half: the user confirmed or declined. Decline resets the
    /// confirmation state and nothing else.
    pub async fn resolve_delete_class(
        &self,
        class_id: &str,
        confirmed: bool,
    ) -> Result<(), TaxonomyError> {
        {
            let mut ui = self.class_ui.lock().await;
            if ui.confirming_delete.as_deref() != Some(class_id) {
                return Ok(());
            }
            ui.confirming_delete = None;
            if !confirmed {
                return Ok(());
            }
            ui.deleting.insert(class_id.to_string());
        }

        let result = self.db.delete_class(class_id).await;

        self.class_ui.lock().await.deleting.remove(class_id);

        match result {
            Ok(true) => {
                self.remove_class(class_id);
                if self.draft.class_id().await.as_deref() == Some(class_id) {
                    let fallback = self
                        .classes()
                        .first()
                        .map(|c| c.id.clone())
                        .unwrap_or_default();
                    self.draft.set_class_id(&fallback).await;
                }
                Ok(())
            }
            // The store refused without throwing; same treatment as a throw.
            Ok(false) => {
                self.notifier
                    .notify("Something went wrong while deleting the class");
                Err(TaxonomyError::Persistence(anyhow::anyhow!(
                    "class {class_id} was not deleted"
                )))
            }
            Err(err) => {
                error!("Failed to delete class {class_id}: {err:#}");
                self.notifier
                    .notify("Something went wrong while deleting the class");
                Err(TaxonomyError::Persistence(err))
            }
        }
    }

    pub async fn add_task_type(
        &self,
        name: &str,
        color: ColorToken,
        completed_color: ColorToken,
    ) -> Result<TaskType, TaxonomyError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.notifier.notify("Please enter a task type name");
            return Err(TaxonomyError::EmptyName);
        }

        {
            let mut ui = self.type_ui.lock().await;
            if ui.adding {
                return Err(TaxonomyError::InFlight);
            }
            ui.adding = true;
        }

        let candidate = TaskType {
            id: slug::derive_id(trimmed),
            name: trimmed.to_string(),
            color,
            completed_color,
            owner_id: self.settings.owner_id(),
            created_at: Utc::now(),
        };

        let result = self.db.insert_task_type(candidate).await;

        let mut ui = self.type_ui.lock().await;
        ui.adding = false;
        match result {
            Ok(stored) => {
                ui.input_open = false;
                drop(ui);

                self.push_task_type(stored.clone());
                self.draft.set_type_id(&stored.id).await;
                Ok(stored)
            }
            Err(err) => {
                drop(ui);
                error!("Failed to add task type: {err:#}");
                self.notifier
                    .notify("Something went wrong while adding the task type");
                Err(TaxonomyError::Persistence(err))
            }
        }
    }

    pub async fn request_delete_task_type(&self, type_id: &str) -> bool {
        if !self.task_types().iter().any(|t| t.id == type_id) {
            return false;
        }

        let mut ui = self.type_ui.lock().await;
        if ui.deleting.contains(type_id) {
            return false;
        }
        ui.confirming_delete = Some(type_id.to_string());
        true
    }

    pub async fn resolve_delete_task_type(
        &self,
        type_id: &str,
        confirmed: bool,
    ) -> Result<(), TaxonomyError> {
        {
            let mut ui = self.type_ui.lock().await;
            if ui.confirming_delete.as_deref() != Some(type_id) {
                return Ok(());
            }
            ui.confirming_delete = None;
            if !confirmed {
                return Ok(());
            }
            ui.deleting.insert(type_id.to_string());
        }

        let result = self.db.delete_task_type(type_id).await;

        self.type_ui.lock().await.deleting.remove(type_id);

        match result {
            Ok(true) => {
                self.remove_task_type(type_id);
                if self.draft.type_id().await.as_deref() == Some(type_id) {
                    let fallback = self
                        .task_types()
                        .first()
                        .map(|t| t.id.clone())
                        .unwrap_or_default();
                    self.draft.set_type_id(&fallback).await;
                }
                Ok(())
            }
            Ok(false) => {
                self.notifier
                    .notify("Something went wrong while deleting the task type");
                Err(TaxonomyError::Persistence(anyhow::anyhow!(
                    "task type {type_id} was not deleted"
                )))
            }
            Err(err) => {
                error!("Failed to delete task type {type_id}: {err:#}");
                self.notifier
                    .notify("Something went wrong while deleting the task type");
                Err(TaxonomyError::Persistence(err))
            }
        }
    }

    /// Persist new colors for an existing type. Identifier and name never
    /// change. Unknown identifiers are a silent no-op; failures keep edit
    /// mode open so the user can retry.
    pub async fn update_task_type(
        &self,
        type_id: &str,
        color: ColorToken,
        completed_color: ColorToken,
    ) -> Result<(), TaxonomyError> {
        if !self.task_types().iter().any(|t| t.id == type_id) {
            return Ok(());
        }

        {
            let mut ui = self.type_ui.lock().await;
            if ui.updating.contains(type_id) {
                return Err(TaxonomyError::InFlight);
            }
            ui.updating.insert(type_id.to_string());
        }

        let result = self
            .db
            .update_task_type_colors(type_id, color, completed_color)
            .await;

        let mut ui = self.type_ui.lock().await;
        ui.updating.remove(type_id);
        match result {
            Ok(Some(stored)) => {
                ui.editing = None;
                drop(ui);
                self.replace_task_type(stored);
                Ok(())
            }
            // The row vanished between the list check and the write. Treated
            // like any other refused write: edit mode stays open.
            Ok(None) => {
                drop(ui);
                self.notifier
                    .notify("Something went wrong while updating the task type");
                Err(TaxonomyError::Persistence(anyhow::anyhow!(
                    "task type {type_id} was not updated"
                )))
            }
            Err(err) => {
                drop(ui);
                error!("Failed to update task type {type_id}: {err:#}");
                self.notifier
                    .notify("Something went wrong while updating the task type");
                Err(TaxonomyError::Persistence(err))
            }
        }
    }

    fn push_class(&self, stored: Class) {
        {
            let mut guard = self.classes.lock().unwrap();
            let mut next = guard.as_ref().clone();
            next.push(stored);
            *guard = Arc::new(next);
        }
        self.emit_classes();
    }

    fn remove_class(&self, class_id: &str) {
        {
            let mut guard = self.classes.lock().unwrap();
            let next: Vec<Class> = guard
                .iter()
                .filter(|c| c.id != class_id)
                .cloned()
                .collect();
            *guard = Arc::new(next);
        }
        self.emit_classes();
    }

    fn push_task_type(&self, stored: TaskType) {
        {
            let mut guard = self.task_types.lock().unwrap();
            let mut next = guard.as_ref().clone();
            next.push(stored);
            *guard = Arc::new(next);
        }
        self.emit_task_types();
    }

    fn remove_task_type(&self, type_id: &str) {
        {
            let mut guard = self.task_types.lock().unwrap();
            let next: Vec<TaskType> = guard
                .iter()
                .filter(|t| t.id != type_id)
                .cloned()
                .collect();
            *guard = Arc::new(next);
        }
        self.emit_task_types();
    }

    fn replace_task_type(&self, stored: TaskType) {
        {
            let mut guard = self.task_types.lock().unwrap();
            let next: Vec<TaskType> = guard
                .iter()
                .map(|t| if t.id == stored.id { stored.clone() } else { t.clone() })
                .collect();
            *guard = Arc::new(next);
        }
        self.emit_task_types();
    }

    fn emit_classes(&self) {
        if let Ok(payload) = serde_json::to_value(self.classes().as_ref()) {
            self.notifier.emit("classes-changed", payload);
        }
    }

    fn emit_task_types(&self) {
        if let Ok(payload) = serde_json::to_value(self.task_types().as_ref()) {
            self.notifier.emit("task-types-changed", payload);
        }
    }
}
