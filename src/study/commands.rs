use tauri::State;

use crate::{
    db::models::{StudyMode, StudySession},
    study::{StudySnapshot, StudyState},
    AppState,
};

#[tauri::command]
pub async fn get_study_state(state: State<'_, AppState>) -> Result<StudySnapshot, String> {
    Ok(state.study.get_snapshot().await)
}

#[tauri::command]
pub async fn start_study_session(
    state: State<'_, AppState>,
    target_ms: u64,
    mode: Option<StudyMode>,
    class_id: Option<String>,
) -> Result<StudyState, String> {
    state
        .study
        .start(target_ms, mode, class_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn finish_study_session(state: State<'_, AppState>) -> Result<StudySession, String> {
    state.study.finish().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn cancel_study_session(state: State<'_, AppState>) -> Result<(), String> {
    state.study.cancel().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn list_study_sessions(
    state: State<'_, AppState>,
) -> Result<Vec<StudySession>, String> {
    let db = &state.db;
    db.list_study_sessions().await.map_err(|e| e.to_string())
}
