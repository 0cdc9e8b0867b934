use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp;
use std::time::Instant;

use crate::db::models::StudyMode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StudyStatus {
    Idle,
    Running,
    Stopped,
}

impl Default for StudyStatus {
    fn default() -> Self {
        StudyStatus::Idle
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyState {
    pub status: StudyStatus,
    pub mode: StudyMode,
    pub session_id: Option<String>,
    /// Class the student is studying for, when they picked one.
    pub class_id: Option<String>,
    pub target_ms: u64,
    pub active_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
    /// Time accumulated from earlier running windows; combines with
    /// `running_anchor` to compute the true active duration.
    #[serde(skip)]
    pub active_ms_baseline: u64,
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl Default for StudyState {
    fn default() -> Self {
        Self {
            status: StudyStatus::Idle,
            mode: StudyMode::Countdown,
            session_id: None,
            class_id: None,
            target_ms: 0,
            active_ms: 0,
            started_at: None,
            active_ms_baseline: 0,
            running_anchor: None,
        }
    }
}

impl StudyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining_ms(&self) -> i64 {
        match (self.status, self.mode) {
            (StudyStatus::Idle | StudyStatus::Stopped, _) => 0,
            (StudyStatus::Running, StudyMode::Countdown) => {
                let remaining = self.target_ms as i64 - self.current_active_ms() as i64;
                cmp::max(remaining, 0)
            }
            // For a stopwatch the interesting number is the elapsed time.
            (StudyStatus::Running, StudyMode::Stopwatch) => self.current_active_ms() as i64,
        }
    }

    pub fn current_active_ms(&self) -> u64 {
        if let (StudyStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            self.active_ms_baseline
                .saturating_add(anchor.elapsed().as_millis() as u64)
        } else {
            self.active_ms
        }
    }

    pub fn sync_active_from_anchor(&mut self) {
        if let (StudyStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            self.active_ms = self
                .active_ms_baseline
                .saturating_add(anchor.elapsed().as_millis() as u64);
        }
    }

    pub fn begin_session(
        &mut self,
        session_id: String,
        class_id: Option<String>,
        target_ms: u64,
        mode: StudyMode,
        start_at: DateTime<Utc>,
        now: Instant,
    ) {
        *self = Self {
            status: StudyStatus::Running,
            mode,
            session_id: Some(session_id),
            class_id,
            target_ms,
            active_ms: 0,
            started_at: Some(start_at),
            active_ms_baseline: 0,
            running_anchor: Some(now),
        };
    }

    pub fn stop(&mut self) {
        self.sync_active_from_anchor();
        self.status = StudyStatus::Stopped;
        self.running_anchor = None;
        self.active_ms_baseline = self.active_ms;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use chrono::Utc;

    use super::*;

    fn running_state(mode: StudyMode, target_ms: u64) -> StudyState {
        let mut state = StudyState::new();
        state.begin_session(
            "session-1".to_string(),
            Some("biology".to_string()),
            target_ms,
            mode,
            Utc::now(),
            Instant::now(),
        );
        state
    }

    #[test]
    fn countdown_remaining_never_goes_negative() {
        let mut state = running_state(StudyMode::Countdown, 1_000);
        state.active_ms_baseline = 5_000;

        assert_eq!(state.remaining_ms(), 0);
    }

    #[test]
    fn stopwatch_reports_elapsed_time() {
        let mut state = running_state(StudyMode::Stopwatch, u64::MAX);
        state.active_ms_baseline = 42_000;

        assert!(state.remaining_ms() >= 42_000);
    }

    #[test]
    fn stop_freezes_the_active_duration() {
        let mut state = running_state(StudyMode::Countdown, 60_000);
        state.active_ms_baseline = 10_000;

        state.stop();

        assert_eq!(state.status, StudyStatus::Stopped);
        assert!(state.running_anchor.is_none());
        assert!(state.active_ms >= 10_000);
        assert_eq!(state.remaining_ms(), 0);
    }

    #[test]
    fn idle_state_has_no_remaining_time() {
        let state = StudyState::new();
        assert_eq!(state.status, StudyStatus::Idle);
        assert_eq!(state.remaining_ms(), 0);
        assert_eq!(state.current_active_ms(), 0);
    }

    #[test]
    fn reset_clears_the_session_entirely() {
        let mut state = running_state(StudyMode::Countdown, 60_000);
        state.reset();

        assert_eq!(state.status, StudyStatus::Idle);
        assert!(state.session_id.is_none());
        assert!(state.class_id.is_none());
    }
}
