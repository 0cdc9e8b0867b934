pub mod db;
pub mod form;
pub mod notify;
pub mod settings;
pub mod study;
pub mod taxonomy;

use std::sync::Arc;

use chrono::Utc;
use db::{models::StudySessionStatus, Database};
use form::{
    commands::{
        close_task_editor, delete_task, get_task_draft, list_tasks, open_task_editor,
        set_draft_field, submit_task_draft, task_display_date,
    },
    controller::{new_draft_slot, DraftRefs},
    FormController,
};
use log::warn;
use notify::{AppNotifier, Notifier};
use settings::{AccountSettings, SettingsStore, ThemeMode, UserSettings};
use study::commands::{
    cancel_study_session, finish_study_session, get_study_state, list_study_sessions,
    start_study_session,
};
use study::StudyTracker;
use tauri::{Emitter, Manager, State};
use taxonomy::{
    commands::{
        add_class, add_task_type, get_classes, get_task_types, get_taxonomy_ui,
        request_delete_class, request_delete_task_type, resolve_delete_class,
        resolve_delete_task_type, set_class_input_open, set_type_editing, set_type_input_open,
        toggle_class_management, toggle_type_management, update_task_type,
    },
    TaxonomyManager,
};

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) form: Arc<FormController>,
    pub(crate) taxonomy: Arc<TaxonomyManager>,
    pub(crate) study: StudyTracker,
    pub(crate) settings: Arc<SettingsStore>,
}

#[tauri::command]
fn get_settings(state: State<AppState>) -> Result<UserSettings, String> {
    Ok(state.settings.snapshot())
}

#[tauri::command]
fn set_theme_mode(
    theme: ThemeMode,
    state: State<AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    state
        .settings
        .update_theme(theme)
        .map_err(|e| e.to_string())?;

    app_handle
        .emit("settings-updated", state.settings.snapshot())
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[tauri::command]
fn update_account(
    account: Option<AccountSettings>,
    state: State<AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    state
        .settings
        .update_account(account)
        .map_err(|e| e.to_string())?;

    app_handle
        .emit("settings-updated", state.settings.snapshot())
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Studyhall starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let db_path = app_data_dir.join("studyhall.sqlite3");
                let database = Database::new(db_path)?;

                // Finalize study sessions that were running when the app last
                // crashed.
                {
                    let db_for_recovery = database.clone();
                    tauri::async_runtime::block_on(async move {
                        if let Some(session) = db_for_recovery.get_incomplete_session().await? {
                            let now = Utc::now();
                            warn!(
                                "Recovered incomplete study session {}; marking as Interrupted",
                                session.id
                            );
                            db_for_recovery
                                .mark_study_status(
                                    &session.id,
                                    StudySessionStatus::Interrupted,
                                    session.active_ms,
                                    Some(now),
                                    now,
                                )
                                .await?;
                        }
                        Ok::<(), anyhow::Error>(())
                    })?;
                }

                let notifier: Arc<dyn Notifier> =
                    Arc::new(AppNotifier::new(app.handle().clone()));

                let settings_path = app_data_dir.join("settings.json");
                let settings = Arc::new(SettingsStore::new(settings_path)?);

                // The draft slot is shared: the form controller owns the whole
                // draft, the taxonomy manager only gets a handle that can
                // repoint the class/type references.
                let slot = new_draft_slot();
                let taxonomy = Arc::new(TaxonomyManager::new(
                    database.clone(),
                    notifier.clone(),
                    settings.clone(),
                    DraftRefs::new(slot.clone()),
                ));
                tauri::async_runtime::block_on(taxonomy.load())?;

                let form = Arc::new(FormController::new(
                    database.clone(),
                    notifier.clone(),
                    settings.clone(),
                    taxonomy.clone(),
                    slot,
                ));

                let study = StudyTracker::new(database.clone(), notifier);

                app.manage(AppState {
                    db: database,
                    form,
                    taxonomy,
                    study,
                    settings,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            open_task_editor,
            get_task_draft,
            set_draft_field,
            close_task_editor,
            submit_task_draft,
            task_display_date,
            list_tasks,
            delete_task,
            get_classes,
            get_task_types,
            get_taxonomy_ui,
            add_class,
            request_delete_class,
            resolve_delete_class,
            add_task_type,
            request_delete_task_type,
            resolve_delete_task_type,
            update_task_type,
            set_type_editing,
            set_class_input_open,
            set_type_input_open,
            toggle_class_management,
            toggle_type_management,
            get_study_state,
            start_study_session,
            finish_study_session,
            cancel_study_session,
            list_study_sessions,
            get_settings,
            set_theme_mode,
            update_account,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application")
}
