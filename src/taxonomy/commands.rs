use tauri::State;

use crate::{
    db::models::{Class, ColorToken, TaskType},
    taxonomy::manager::TaxonomyUi,
    AppState,
};

#[tauri::command]
pub async fn get_classes(state: State<'_, AppState>) -> Result<Vec<Class>, String> {
    Ok(state.taxonomy.classes().as_ref().clone())
}

#[tauri::command]
pub async fn get_task_types(state: State<'_, AppState>) -> Result<Vec<TaskType>, String> {
    Ok(state.taxonomy.task_types().as_ref().clone())
}

#[tauri::command]
pub async fn get_taxonomy_ui(state: State<'_, AppState>) -> Result<TaxonomyUi, String> {
    Ok(state.taxonomy.ui_state().await)
}

#[tauri::command]
pub async fn add_class(state: State<'_, AppState>, name: String) -> Result<Class, String> {
    state
        .taxonomy
        .add_class(&name)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn request_delete_class(
    state: State<'_, AppState>,
    class_id: String,
) -> Result<bool, String> {
    Ok(state.taxonomy.request_delete_class(&class_id).await)
}

#[tauri::command]
pub async fn resolve_delete_class(
    state: State<'_, AppState>,
    class_id: String,
    confirmed: bool,
) -> Result<(), String> {
    state
        .taxonomy
        .resolve_delete_class(&class_id, confirmed)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn add_task_type(
    state: State<'_, AppState>,
    name: String,
    color: ColorToken,
    completed_color: ColorToken,
) -> Result<TaskType, String> {
    state
        .taxonomy
        .add_task_type(&name, color, completed_color)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn request_delete_task_type(
    state: State<'_, AppState>,
    type_id: String,
) -> Result<bool, String> {
    Ok(state.taxonomy.request_delete_task_type(&type_id).await)
}

#[tauri::command]
pub async fn resolve_delete_task_type(
    state: State<'_, AppState>,
    type_id: String,
    confirmed: bool,
) -> Result<(), String> {
    state
        .taxonomy
        .resolve_delete_task_type(&type_id, confirmed)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_task_type(
    state: State<'_, AppState>,
    type_id: String,
    color: ColorToken,
    completed_color: ColorToken,
) -> Result<(), String> {
    state
        .taxonomy
        .update_task_type(&type_id, color, completed_color)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_type_editing(
    state: State<'_, AppState>,
    type_id: Option<String>,
) -> Result<(), String> {
    state.taxonomy.set_type_editing(type_id).await;
    Ok(())
}

#[tauri::command]
pub async fn set_class_input_open(
    state: State<'_, AppState>,
    open: bool,
) -> Result<(), String> {
    state.taxonomy.set_class_input_open(open).await;
    Ok(())
}

#[tauri::command]
pub async fn set_type_input_open(state: State<'_, AppState>, open: bool) -> Result<(), String> {
    state.taxonomy.set_type_input_open(open).await;
    Ok(())
}

#[tauri::command]
pub async fn toggle_class_management(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state.taxonomy.toggle_class_management().await)
}

#[tauri::command]
pub async fn toggle_type_management(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(state.taxonomy.toggle_type_management().await)
}
