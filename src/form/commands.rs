use tauri::State;

use crate::{
    db::models::Task,
    form::draft::{DraftPatch, TaskDraft},
    AppState,
};

#[tauri::command]
pub async fn open_task_editor(
    state: State<'_, AppState>,
    task_id: Option<String>,
    context_date: Option<String>,
) -> Result<TaskDraft, String> {
    state
        .form
        .open_editor(task_id.as_deref(), context_date.as_deref())
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_task_draft(state: State<'_, AppState>) -> Result<Option<TaskDraft>, String> {
    Ok(state.form.current_draft().await)
}

#[tauri::command]
pub async fn set_draft_field(
    state: State<'_, AppState>,
    patch: DraftPatch,
) -> Result<TaskDraft, String> {
    state.form.set_field(patch).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn close_task_editor(state: State<'_, AppState>) -> Result<(), String> {
    state.form.close_editor().await;
    Ok(())
}

#[tauri::command]
pub async fn submit_task_draft(state: State<'_, AppState>) -> Result<Task, String> {
    state.form.submit().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn task_display_date(
    state: State<'_, AppState>,
    task_id: Option<String>,
    context_date: Option<String>,
) -> Result<String, String> {
    state
        .form
        .display_date_for(task_id.as_deref(), context_date.as_deref())
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn list_tasks(state: State<'_, AppState>) -> Result<Vec<Task>, String> {
    let db = &state.db;
    db.list_tasks().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_task(state: State<'_, AppState>, task_id: String) -> Result<bool, String> {
    let db = &state.db;
    db.delete_task(&task_id).await.map_err(|e| e.to_string())
}
