//! Wall-clock stopwatch for one active session.
//!
//! Elapsed time is always `now - start_ms` while running and is never
//! accumulated tick by tick, so an irregular tick cadence only changes how
//! often the display refreshes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Start,
    Pause,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEvent {
    /// Epoch milliseconds
    pub time: i64,
    pub action: TimerAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerEngine {
    elapsed_ms: u64,
    running: bool,
    /// Instant such that `elapsed = now - start_ms` while running
    start_ms: i64,
    events: Vec<TimerEvent>,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from persisted fields, verbatim
    pub fn from_parts(elapsed_ms: u64, running: bool, start_ms: i64, events: Vec<TimerEvent>) -> Self {
        Self {
            elapsed_ms,
            running,
            start_ms,
            events,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn events(&self) -> &[TimerEvent] {
        &self.events
    }

    /// Append an event without touching timing state
    pub fn seed(&mut self, now: i64, action: TimerAction) {
        self.events.push(TimerEvent { time: now, action });
    }

    pub fn start(&mut self, now: i64) {
        self.start_ms = now - self.elapsed_ms as i64;
        self.running = true;
        if self.elapsed_ms > 0 {
            self.seed(now, TimerAction::Resume);
        } else if self.events.is_empty() {
            self.seed(now, TimerAction::Start);
        }
    }

    pub fn stop(&mut self, now: i64) {
        self.tick(now);
        self.running = false;
        self.seed(now, TimerAction::Pause);
    }

    pub fn toggle(&mut self, now: i64) {
        if self.running {
            self.stop(now);
        } else {
            self.start(now);
        }
    }

    /// Resample elapsed time; no effect while stopped
    pub fn tick(&mut self, now: i64) {
        if self.running {
            self.elapsed_ms = (now - self.start_ms).max(0) as u64;
        }
    }

    /// Stop and zero the clock. The event log is left as is.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_ms = 0;
    }

    /// Run again from zero with a fresh log holding a single `start`
    pub fn restart(&mut self, now: i64) {
        self.running = true;
        self.elapsed_ms = 0;
        self.start_ms = now;
        self.events = vec![TimerEvent {
            time: now,
            action: TimerAction::Start,
        }];
    }

    /// Re-anchor after the process was away: a running timer keeps counting
    /// the time it was closed, a paused one stays frozen. Elapsed never moves
    /// backwards even if the wall clock did.
    pub fn resume_after_reload(&mut self, now: i64) {
        if self.running {
            let away = (now - self.start_ms).max(0) as u64;
            self.elapsed_ms = self.elapsed_ms.max(away);
            self.start_ms = now - self.elapsed_ms as i64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(t: &TimerEngine) -> Vec<TimerAction> {
        t.events().iter().map(|e| e.action).collect()
    }

    #[test]
    fn fresh_start_logs_start() {
        let mut t = TimerEngine::new();
        t.start(1_000);
        assert!(t.is_running());
        assert_eq!(actions(&t), vec![TimerAction::Start]);
    }

    #[test]
    fn toggle_after_seeded_start_adds_nothing() {
        let mut t = TimerEngine::new();
        t.seed(1_000, TimerAction::Start);
        t.toggle(1_000);
        assert_eq!(actions(&t), vec![TimerAction::Start]);
        t.toggle(3_000);
        t.toggle(10_000);
        assert_eq!(
            actions(&t),
            vec![TimerAction::Start, TimerAction::Pause, TimerAction::Resume]
        );
    }

    #[test]
    fn elapsed_excludes_paused_intervals() {
        let mut t = TimerEngine::new();
        t.toggle(0);
        t.toggle(1_500);
        t.toggle(60_000);
        t.toggle(62_250);
        t.toggle(100_000);
        t.tick(100_400);
        assert_eq!(t.elapsed_ms(), 1_500 + 2_250 + 400);
    }

    #[test]
    fn elapsed_does_not_depend_on_tick_cadence() {
        let mut sparse = TimerEngine::new();
        let mut dense = TimerEngine::new();
        sparse.start(0);
        dense.start(0);
        for now in (0..=5_000).step_by(7) {
            dense.tick(now);
        }
        sparse.tick(5_000);
        dense.tick(5_000);
        assert_eq!(sparse.elapsed_ms(), 5_000);
        assert_eq!(dense.elapsed_ms(), 5_000);
    }

    #[test]
    fn tick_is_ignored_while_stopped() {
        let mut t = TimerEngine::new();
        t.start(0);
        t.stop(2_000);
        t.tick(9_000);
        assert_eq!(t.elapsed_ms(), 2_000);
        assert!(!t.is_running());
    }

    #[test]
    fn reset_keeps_log() {
        let mut t = TimerEngine::new();
        t.start(0);
        t.stop(2_000);
        t.reset();
        assert_eq!(t.elapsed_ms(), 0);
        assert!(!t.is_running());
        assert_eq!(t.events().len(), 2);
    }

    #[test]
    fn restart_replaces_log() {
        let mut t = TimerEngine::new();
        t.start(0);
        t.stop(2_000);
        t.restart(5_000);
        assert!(t.is_running());
        assert_eq!(t.elapsed_ms(), 0);
        assert_eq!(t.events(), &[TimerEvent { time: 5_000, action: TimerAction::Start }]);
        t.tick(5_700);
        assert_eq!(t.elapsed_ms(), 700);
    }

    #[test]
    fn reload_counts_time_away_only_when_running() {
        // started at 0, saved at 4_000, reopened at 10_000
        let mut running = TimerEngine::from_parts(4_000, true, 0, vec![]);
        running.resume_after_reload(10_000);
        assert_eq!(running.elapsed_ms(), 10_000);
        running.tick(10_500);
        assert_eq!(running.elapsed_ms(), 10_500);

        let mut skewed = TimerEngine::from_parts(4_000, true, 9_000, vec![]);
        skewed.resume_after_reload(10_000);
        assert_eq!(skewed.elapsed_ms(), 4_000);
        assert_eq!(skewed.start_ms(), 6_000);

        let mut paused = TimerEngine::from_parts(4_000, false, 123, vec![]);
        paused.resume_after_reload(10_000);
        assert_eq!(paused.start_ms(), 123);
        paused.tick(20_000);
        assert_eq!(paused.elapsed_ms(), 4_000);
    }
}
