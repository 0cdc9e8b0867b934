use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::error;
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time};
use uuid::Uuid;

use crate::{
    db::{
        models::{StudyMode, StudySession, StudySessionStatus},
        Database,
    },
    notify::Notifier,
    study::state::{StudyState, StudyStatus},
};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StudySnapshot {
    pub state: StudyState,
    pub remaining_ms: i64,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct StudyHeartbeatEvent {
    state: StudyState,
    active_ms: u64,
    remaining_ms: i64,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct SessionCompletedEvent {
    session_id: String,
    session: StudySession,
}

/// Drives the study-session widget: one running session at a time, a 1 s
/// ticker for heartbeats, progress persisted every few ticks, and countdown
/// sessions stopped automatically at zero.
#[derive(Clone)]
pub struct StudyTracker {
    state: Arc<Mutex<StudyState>>,
    db: Database,
    notifier: Arc<dyn Notifier>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl StudyTracker {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        let debug_mode = std::env::var("STUDYHALL_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            state: Arc::new(Mutex::new(StudyState::new())),
            db,
            notifier,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    pub async fn get_state(&self) -> StudyState {
        let mut guard = self.state.lock().await;
        guard.sync_active_from_anchor();
        guard.clone()
    }

    pub async fn get_snapshot(&self) -> StudySnapshot {
        let mut guard = self.state.lock().await;
        guard.sync_active_from_anchor();
        StudySnapshot {
            remaining_ms: guard.remaining_ms(),
            state: guard.clone(),
        }
    }

    pub async fn start(
        &self,
        target_ms: u64,
        mode: Option<StudyMode>,
        class_id: Option<String>,
    ) -> Result<StudyState> {
        let mode = mode.unwrap_or(StudyMode::Countdown);

        // Stopwatch sessions get an effectively unlimited, SQLite-safe target.
        let actual_target_ms = match mode {
            StudyMode::Countdown => {
                if target_ms == 0 {
                    return Err(anyhow!("target_ms must be greater than zero for countdown"));
                }
                target_ms
            }
            StudyMode::Stopwatch => i64::MAX as u64,
        };

        {
            let state = self.state.lock().await;
            if state.status != StudyStatus::Idle {
                return Err(anyhow!("a study session is already active"));
            }
        }

        let session_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        let session = StudySession {
            id: session_id.clone(),
            class_id: class_id.clone(),
            status: StudySessionStatus::Running,
            mode,
            target_ms: actual_target_ms,
            active_ms: 0,
            started_at,
            stopped_at: None,
            created_at: started_at,
            updated_at: started_at,
        };

        self.db.insert_study_session(&session).await?;

        {
            let mut state = self.state.lock().await;
            state.begin_session(
                session_id,
                class_id,
                actual_target_ms,
                mode,
                started_at,
                Instant::now(),
            );
        }

        self.spawn_ticker().await;
        self.emit_state_changed().await;

        Ok(self.get_state().await)
    }

    /// End the running session and record it as completed.
    pub async fn finish(&self) -> Result<StudySession> {
        let stopped_at = Utc::now();

        let session_snapshot = {
            let mut state = self.state.lock().await;
            if state.status == StudyStatus::Idle {
                return Err(anyhow!("no active study session to finish"));
            }

            state.sync_active_from_anchor();

            let session_id = state
                .session_id
                .clone()
                .ok_or_else(|| anyhow!("missing session id"))?;
            let started_at = state.started_at.unwrap_or_else(Utc::now);
            let target_ms = state.target_ms;
            let active_ms = state.current_active_ms().min(target_ms);
            let mode = state.mode;
            let class_id = state.class_id.clone();

            state.reset();

            StudySession {
                id: session_id,
                class_id,
                status: StudySessionStatus::Completed,
                mode,
                target_ms,
                active_ms,
                started_at,
                stopped_at: Some(stopped_at),
                created_at: started_at,
                updated_at: stopped_at,
            }
        };

        self.cancel_ticker().await;

        self.db
            .mark_study_status(
                &session_snapshot.id,
                StudySessionStatus::Completed,
                session_snapshot.active_ms,
                session_snapshot.stopped_at,
                stopped_at,
            )
            .await?;

        self.emit_state_changed().await;
        self.emit_session_completed(&session_snapshot);

        Ok(session_snapshot)
    }

    pub async fn cancel(&self) -> Result<()> {
        let cancelled_at = Utc::now();
        let (session_id, active_ms) = {
            let mut state = self.state.lock().await;
            if state.status == StudyStatus::Idle {
                return Ok(());
            }
            state.sync_active_from_anchor();
            let session_id = state
                .session_id
                .clone()
                .ok_or_else(|| anyhow!("no active study session to cancel"))?;
            let active_ms = state.active_ms;
            state.reset();
            (session_id, active_ms)
        };

        self.cancel_ticker().await;

        self.db
            .mark_study_status(
                &session_id,
                StudySessionStatus::Cancelled,
                active_ms,
                Some(cancelled_at),
                cancelled_at,
            )
            .await?;
        self.emit_state_changed().await;
        Ok(())
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let notifier = self.notifier.clone();
        let db = self.db.clone();
        let tick_interval = self.tick_interval;
        let heartbeat_every = self.heartbeat_every_ticks;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            let mut ticks: u32 = 0;
            loop {
                interval.tick().await;

                let (snapshot, remaining) = {
                    let mut guard = state.lock().await;
                    if guard.status != StudyStatus::Running {
                        break;
                    }
                    guard.sync_active_from_anchor();
                    let remaining = guard.remaining_ms();
                    let snapshot = guard.clone();
                    (snapshot, remaining)
                };

                // Countdown sessions stop themselves at zero; the session row
                // is finalized when the user confirms the finish.
                if remaining <= 0 && snapshot.mode == StudyMode::Countdown {
                    let final_snapshot = {
                        let mut guard = state.lock().await;
                        guard.sync_active_from_anchor();
                        guard.stop();
                        guard.active_ms = guard.active_ms.min(guard.target_ms);
                        guard.clone()
                    };

                    emit_study_state(notifier.as_ref(), final_snapshot.clone());

                    if let Some(session_id) = final_snapshot.session_id.clone() {
                        let db_clone = db.clone();
                        tokio::spawn(async move {
                            let _ = db_clone
                                .update_study_progress(
                                    &session_id,
                                    final_snapshot.active_ms,
                                    Utc::now(),
                                )
                                .await;
                        });
                    }

                    break;
                }

                ticks = ticks.wrapping_add(1);

                if let Some(session_id) = snapshot.session_id.clone() {
                    if ticks % heartbeat_every == 0 {
                        let heartbeat = StudyHeartbeatEvent {
                            active_ms: snapshot.active_ms,
                            remaining_ms: snapshot.remaining_ms(),
                            state: snapshot.clone(),
                        };

                        let db_clone = db.clone();
                        let notifier_clone = notifier.clone();
                        let active_ms = snapshot.active_ms;

                        tokio::spawn(async move {
                            let now = Utc::now();
                            let _ = db_clone
                                .update_study_progress(&session_id, active_ms, now)
                                .await;

                            if let Ok(payload) = serde_json::to_value(&heartbeat) {
                                notifier_clone.emit("study-heartbeat", payload);
                            }
                        });
                    }
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn emit_state_changed(&self) {
        let mut guard = self.state.lock().await;
        guard.sync_active_from_anchor();
        emit_study_state(self.notifier.as_ref(), guard.clone());
    }

    fn emit_session_completed(&self, session: &StudySession) {
        let payload = SessionCompletedEvent {
            session_id: session.id.clone(),
            session: session.clone(),
        };

        if let Ok(payload) = serde_json::to_value(&payload) {
            self.notifier.emit("study-session-completed", payload);
        } else {
            error!("Failed to serialize study-session-completed payload");
        }
    }
}

fn emit_study_state(notifier: &dyn Notifier, state: StudyState) {
    let payload = StudySnapshot {
        remaining_ms: state.remaining_ms(),
        state,
    };

    if let Ok(payload) = serde_json::to_value(&payload) {
        notifier.emit("study-state-changed", payload);
    }
}
