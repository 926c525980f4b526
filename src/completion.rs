use serde::{Deserialize, Serialize};

use crate::models::SessionMode;

pub const DEFAULT_MILESTONE_EVERY: u64 = 33;

/// One-shot and repeatable signals produced while a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Target just reached: stop the timer, give feedback, auto-save
    pub completed: bool,
    /// A new multiple of the milestone interval was crossed
    pub milestone: Option<u64>,
}

/// Per-session watcher of the derived count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionDetector {
    #[serde(skip, default = "default_every")]
    milestone_every: u64,
    last_milestone: u64,
    completion_fired: bool,
    saved: bool,
}

fn default_every() -> u64 {
    DEFAULT_MILESTONE_EVERY
}

impl Default for CompletionDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MILESTONE_EVERY)
    }
}

impl CompletionDetector {
    pub fn new(milestone_every: u64) -> Self {
        Self {
            milestone_every: milestone_every.max(1),
            last_milestone: 0,
            completion_fired: false,
            saved: false,
        }
    }

    pub fn with_milestone_every(mut self, every: u64) -> Self {
        self.milestone_every = every.max(1);
        self
    }

    pub fn evaluate(
        &mut self,
        mode: SessionMode,
        target: Option<u64>,
        count: u64,
        running: bool,
    ) -> Evaluation {
        let mut out = Evaluation::default();
        if !running {
            return out;
        }

        if count > 0 {
            let multiple = count / self.milestone_every * self.milestone_every;
            if multiple > self.last_milestone {
                self.last_milestone = multiple;
                out.milestone = Some(multiple);
            }
        }

        if !self.completion_fired && target_met(mode, target, count) {
            self.completion_fired = true;
            out.completed = true;
        }

        out
    }

    /// Claim the session's single history slot; false if already taken
    pub fn claim_save(&mut self) -> bool {
        !std::mem::replace(&mut self.saved, true)
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn last_milestone(&self) -> u64 {
        self.last_milestone
    }

    pub fn reset_milestones(&mut self) {
        self.last_milestone = 0;
    }

    /// Forget everything for a new session
    pub fn reset(&mut self) {
        *self = Self::new(self.milestone_every);
    }
}

pub fn target_met(mode: SessionMode, target: Option<u64>, count: u64) -> bool {
    mode == SessionMode::Target && target.is_some_and(|t| count >= t)
}

/// Whether the completed view applies; computed at render time, never stored
pub fn is_completed(mode: SessionMode, target: Option<u64>, count: u64, running: bool) -> bool {
    target_met(mode, target, count) && !running
}
