//! Crash/reload shadow of the active session.
//!
//! A single well-known slot holds the backup. It exists exactly while an item
//! is selected and is rewritten on every timer-relevant change.

use serde::{Deserialize, Serialize};

use crate::completion::CompletionDetector;
use crate::models::{Screen, SessionMode};
use crate::store::{load_json, save_json, KeyValueStore, StoreError, KEY_ACTIVE_SESSION};
use crate::timer::{TimerEngine, TimerEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionBackup {
    pub screen: Screen,
    pub selected_dikr_id: String,
    pub session_mode: SessionMode,
    #[serde(default)]
    pub target_count: Option<u64>,
    pub is_timer_running: bool,
    pub elapsed_ms: u64,
    pub start_time: i64,
    #[serde(default)]
    pub session_events: Vec<TimerEvent>,
    #[serde(default)]
    pub calibration_attempts: Vec<f64>,
    #[serde(default)]
    pub detector: Option<CompletionDetector>,
}

impl ActiveSessionBackup {
    pub fn timer(&self) -> TimerEngine {
        TimerEngine::from_parts(
            self.elapsed_ms,
            self.is_timer_running,
            self.start_time,
            self.session_events.clone(),
        )
    }

    /// Timer as it should continue at `now`
    pub fn restore_timer(&self, now: i64) -> TimerEngine {
        let mut timer = self.timer();
        timer.resume_after_reload(now);
        timer
    }
}

pub fn save(store: &dyn KeyValueStore, backup: &ActiveSessionBackup) -> Result<(), StoreError> {
    save_json(store, KEY_ACTIVE_SESSION, backup)
}

/// Read the slot; a malformed entry counts as no backup
pub fn load(store: &dyn KeyValueStore) -> Option<ActiveSessionBackup> {
    load_json(store, KEY_ACTIVE_SESSION)
}

pub fn clear(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(KEY_ACTIVE_SESSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::timer::TimerAction;

    fn backup(running: bool) -> ActiveSessionBackup {
        ActiveSessionBackup {
            screen: Screen::Session,
            selected_dikr_id: "d1".into(),
            session_mode: SessionMode::Target,
            target_count: Some(33),
            is_timer_running: running,
            elapsed_ms: 4_000,
            start_time: 1_000,
            session_events: vec![TimerEvent {
                time: 1_000,
                action: TimerAction::Start,
            }],
            calibration_attempts: vec![],
            detector: None,
        }
    }

    #[test]
    fn running_backup_counts_time_away() {
        // T = 1_000, saved at T + 4_000, reopened 2_500 later
        let timer = backup(true).restore_timer(1_000 + 4_000 + 2_500);
        assert!(timer.is_running());
        assert_eq!(timer.elapsed_ms(), 4_000 + 2_500);
    }

    #[test]
    fn paused_backup_roundtrips_without_advancing() {
        let store = MemoryStore::new();
        save(&store, &backup(false)).unwrap();
        let loaded = load(&store).unwrap();
        assert_eq!(loaded, backup(false));
        let timer = loaded.restore_timer(999_999);
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_ms(), 4_000);
        assert_eq!(timer.start_ms(), 1_000);
    }

    #[test]
    fn malformed_backup_is_absent() {
        let store = MemoryStore::new();
        store.set(KEY_ACTIVE_SESSION, "{\"screen\":42").unwrap();
        assert_eq!(load(&store), None);
    }

    #[test]
    fn clear_removes_slot() {
        let store = MemoryStore::new();
        save(&store, &backup(true)).unwrap();
        clear(&store).unwrap();
        assert_eq!(load(&store), None);
    }

    #[test]
    fn uses_camel_case_keys() {
        let json = serde_json::to_value(backup(true)).unwrap();
        assert_eq!(json["elapsedMs"], 4_000);
        assert_eq!(json["isTimerRunning"], true);
        assert_eq!(json["startTime"], 1_000);
        assert_eq!(json["sessionEvents"][0]["action"], "start");
    }
}
