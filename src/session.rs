//! Single owner of everything the screens show: item registry, history,
//! preferences, and the one active session with its timer, calibration
//! attempts, and completion tracking.
//!
//! Every transition is synchronous. After any change to a timer-relevant
//! field the active-session backup is rewritten, and it is removed when the
//! session ends.

use std::rc::Rc;

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;

use crate::backup::Bundle;
use crate::calibration::Calibration;
use crate::clock::Clock;
use crate::completion::{self, CompletionDetector};
use crate::config::Config;
use crate::counting::derive_count;
use crate::feedback::{notification_body, Feedback, MILESTONE_PULSE, TARGET_PATTERN};
use crate::history::History;
use crate::models::{DikrItem, Language, Screen, SessionMode, SessionRecord};
use crate::recovery::{self, ActiveSessionBackup};
use crate::registry::Registry;
use crate::store::{load_json, persist, KeyValueStore, KEY_LANG, KEY_ONBOARDING};
use crate::timer::{TimerAction, TimerEngine, TimerEvent};

pub const REPLACE_SESSION_PROMPT: &str = "A session is in progress. Replace it?";
pub const TARGET_REACHED_TITLE: &str = "Target reached";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no item with id {0}")]
    UnknownDikr(String),

    #[error("{0} has no calibrated duration yet")]
    NotCalibrated(String),

    #[error("target count must be at least 1")]
    InvalidTarget,
}

pub struct DikrSession {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    feedback: Rc<dyn Feedback>,
    config: Config,

    registry: Registry,
    history: History,
    lang: Language,
    has_seen_onboarding: bool,

    screen: Screen,
    history_filter: Option<String>,
    selected: Option<String>,
    mode: SessionMode,
    target: Option<u64>,
    timer: TimerEngine,
    calibration: Calibration,
    detector: CompletionDetector,
}

impl std::fmt::Debug for DikrSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DikrSession")
            .field("screen", &self.screen)
            .field("selected", &self.selected)
            .field("mode", &self.mode)
            .field("target", &self.target)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl DikrSession {
    /// Load persisted state and pick up any interrupted session
    pub fn new(
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        feedback: Rc<dyn Feedback>,
        config: Config,
    ) -> Self {
        let registry = Registry::load(store.as_ref());
        let history = History::load(store.as_ref());
        let lang = load_json(store.as_ref(), KEY_LANG).unwrap_or_default();
        let has_seen_onboarding = load_json(store.as_ref(), KEY_ONBOARDING).unwrap_or(false);

        let mut session = Self {
            screen: if has_seen_onboarding {
                Screen::Home
            } else {
                Screen::Onboarding
            },
            calibration: Calibration::new(config.calibration_noise_ms),
            detector: CompletionDetector::new(config.milestone_every),
            store,
            clock,
            feedback,
            config,
            registry,
            history,
            lang,
            has_seen_onboarding,
            history_filter: None,
            selected: None,
            mode: SessionMode::Free,
            target: None,
            timer: TimerEngine::new(),
        };
        session.recover();
        session
    }

    fn recover(&mut self) {
        let Some(backup) = recovery::load(self.store.as_ref()) else {
            // drop whatever unreadable value may be sitting in the slot
            self.clear_backup();
            return;
        };
        if self.registry.get(&backup.selected_dikr_id).is_none() {
            log::warn!(
                "discarding backup for missing item {}",
                backup.selected_dikr_id
            );
            self.clear_backup();
            return;
        }

        let now = self.clock.now_ms();
        self.timer = backup.restore_timer(now);
        self.selected = Some(backup.selected_dikr_id.clone());
        self.mode = backup.session_mode;
        self.target = backup.target_count;
        self.screen = backup.screen;
        self.calibration = Calibration::new(self.config.calibration_noise_ms)
            .with_attempts(backup.calibration_attempts.clone());
        self.detector = backup
            .detector
            .clone()
            .unwrap_or_default()
            .with_milestone_every(self.config.milestone_every);
        log::info!(
            "recovered {} session at {}ms (running: {})",
            self.mode,
            self.timer.elapsed_ms(),
            self.timer.is_running()
        );
        self.sync_backup();
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current instant in local time, from the session clock
    pub fn now(&self) -> DateTime<Local> {
        Local
            .timestamp_millis_opt(self.clock.now_ms())
            .single()
            .unwrap_or_else(Local::now)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn lang(&self) -> Language {
        self.lang
    }

    pub fn has_seen_onboarding(&self) -> bool {
        self.has_seen_onboarding
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_filter(&self) -> Option<&str> {
        self.history_filter.as_deref()
    }

    pub fn selected_item(&self) -> Option<&DikrItem> {
        self.selected.as_deref().and_then(|id| self.registry.get(id))
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn target(&self) -> Option<u64> {
        self.target
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.timer.elapsed_ms()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn events(&self) -> &[TimerEvent] {
        self.timer.events()
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn detector(&self) -> &CompletionDetector {
        &self.detector
    }

    /// A session has time on the clock (or is running)
    pub fn has_active_session(&self) -> bool {
        self.selected.is_some() && (self.timer.is_running() || self.timer.elapsed_ms() > 0)
    }

    /// Derived repetition count; `None` outside a counted session
    pub fn count(&self) -> Option<u64> {
        if self.mode == SessionMode::Calibration {
            return None;
        }
        let duration = self.selected_item()?.duration_ms()?;
        Some(derive_count(self.timer.elapsed_ms(), duration))
    }

    pub fn is_completed(&self) -> bool {
        self.count().is_some_and(|c| {
            completion::is_completed(self.mode, self.target, c, self.timer.is_running())
        })
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Select an item and prepare a fresh session. Replacing a session that
    /// has time on the clock needs `confirm` to agree. Returns whether the
    /// session was started.
    pub fn start_session<F>(
        &mut self,
        dikr_id: &str,
        mode: SessionMode,
        target: Option<u64>,
        confirm: F,
    ) -> Result<bool, SessionError>
    where
        F: FnOnce(&str) -> bool,
    {
        let item = self
            .registry
            .get(dikr_id)
            .ok_or_else(|| SessionError::UnknownDikr(dikr_id.to_string()))?;
        if mode != SessionMode::Calibration && !item.is_calibrated() {
            return Err(SessionError::NotCalibrated(item.name.clone()));
        }
        let target = match mode {
            SessionMode::Target => match target {
                Some(t) if t > 0 => Some(t),
                _ => return Err(SessionError::InvalidTarget),
            },
            _ => None,
        };

        if (self.timer.is_running() || self.timer.elapsed_ms() > 0)
            && !confirm(REPLACE_SESSION_PROMPT)
        {
            return Ok(false);
        }

        let now = self.clock.now_ms();
        self.timer = TimerEngine::new();
        self.timer.seed(now, TimerAction::Start);
        self.calibration.clear();
        self.detector.reset();
        self.selected = Some(dikr_id.to_string());
        self.mode = mode;
        self.target = target;
        self.screen = match mode {
            SessionMode::Calibration => Screen::Calibration,
            _ => Screen::Session,
        };
        log::info!("started {mode} session for {dikr_id}");
        self.sync_backup();
        Ok(true)
    }

    /// Start or pause the counted session
    pub fn toggle(&mut self) {
        if self.selected.is_none() {
            return;
        }
        let now = self.clock.now_ms();
        self.timer.toggle(now);
        self.evaluate(now);
        self.sync_backup();
    }

    /// Periodic refresh; advisory only
    pub fn tick(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        let now = self.clock.now_ms();
        self.timer.tick(now);
        self.evaluate(now);
        self.sync_backup();
    }

    fn evaluate(&mut self, now: i64) {
        let Some(count) = self.count() else {
            return;
        };
        let eval = self
            .detector
            .evaluate(self.mode, self.target, count, self.timer.is_running());

        if let Some(multiple) = eval.milestone {
            log::debug!("milestone {multiple}");
            self.feedback.vibrate(MILESTONE_PULSE);
        }

        if eval.completed {
            self.timer.stop(now);
            let name = self
                .selected_item()
                .map(|d| d.name.clone())
                .unwrap_or_default();
            let target = self.target.unwrap_or(count);
            self.feedback.vibrate(TARGET_PATTERN);
            self.feedback.play_target_sound();
            self.feedback.notify(
                TARGET_REACHED_TITLE,
                &notification_body(target, &name, self.timer.elapsed_ms()),
            );
            log::info!("target {target} reached for {name}");
            self.save_current();
        }
    }

    /// Write the active session to history once per session lifetime
    fn save_current(&mut self) -> bool {
        if self.mode == SessionMode::Calibration {
            return false;
        }
        let Some(item) = self.selected_item().cloned() else {
            return false;
        };
        let Some(count) = self.count() else {
            return false;
        };
        if count == 0 || !self.detector.claim_save() {
            return false;
        }
        self.history.record(SessionRecord::new(
            &item,
            self.clock.now_ms(),
            self.timer.elapsed_ms() as f64,
            count,
            self.mode,
            self.target,
        ));
        self.history.save(self.store.as_ref());
        true
    }

    /// End the session, saving it to history when asked
    pub fn finish_session(&mut self, save: bool) {
        if self.selected.is_none() {
            return;
        }
        if self.timer.is_running() {
            self.timer.tick(self.clock.now_ms());
        }
        if save {
            self.save_current();
        }
        self.end_session();
    }

    pub fn cancel_session(&mut self) {
        self.finish_session(false);
    }

    fn end_session(&mut self) {
        self.timer = TimerEngine::new();
        self.calibration.clear();
        self.detector.reset();
        self.selected = None;
        self.target = None;
        self.mode = SessionMode::Free;
        self.screen = Screen::Home;
        self.clear_backup();
    }

    // ── Calibration ──────────────────────────────────────────────────

    /// Stop records an attempt; start after a stop begins a fresh attempt
    pub fn calibration_toggle(&mut self) {
        if self.selected.is_none() {
            return;
        }
        let now = self.clock.now_ms();
        if self.timer.is_running() {
            self.timer.tick(now);
            if self.calibration.record_stop(self.timer.elapsed_ms()) {
                log::debug!("calibration attempt {}ms", self.timer.elapsed_ms());
            }
            self.timer.stop(now);
        } else if self.timer.elapsed_ms() > 0 {
            self.timer.restart(now);
            self.detector.reset_milestones();
        } else {
            self.timer.start(now);
        }
        self.sync_backup();
    }

    pub fn can_clear_calibration(&self) -> bool {
        self.calibration
            .can_clear(self.timer.is_running(), self.timer.elapsed_ms())
    }

    pub fn calibration_clear(&mut self) -> bool {
        if !self.can_clear_calibration() {
            return false;
        }
        self.calibration.clear();
        self.timer.reset();
        self.sync_backup();
        true
    }

    pub fn calibration_average(&self) -> Option<f64> {
        self.calibration.average(self.timer.elapsed_ms())
    }

    pub fn can_commit_calibration(&self) -> bool {
        self.mode == SessionMode::Calibration
            && !self.timer.is_running()
            && self.calibration.can_commit(self.timer.elapsed_ms())
    }

    /// Store the average as the item's duration, log it, and leave the flow.
    /// Returns the committed duration, or `None` when nothing can be committed.
    pub fn calibration_commit(&mut self) -> Option<f64> {
        if !self.can_commit_calibration() {
            return None;
        }
        let avg = self.calibration_average()?;
        let id = self.selected.clone()?;
        self.registry.set_calibration(&id, avg);
        self.registry.save(self.store.as_ref());
        if let Some(item) = self.registry.get(&id).cloned() {
            self.history.record(SessionRecord::new(
                &item,
                self.clock.now_ms(),
                avg,
                1,
                SessionMode::Calibration,
                None,
            ));
            self.history.save(self.store.as_ref());
        }
        log::info!("calibrated {id} at {avg:.2}ms");
        self.finish_session(false);
        Some(avg)
    }

    // ── Navigation and preferences ───────────────────────────────────

    pub fn go_home(&mut self) {
        self.navigate(Screen::Home);
    }

    pub fn open_history(&mut self, dikr_id: Option<&str>) {
        self.history_filter = dikr_id.map(str::to_string);
        self.navigate(Screen::History);
    }

    /// Return to the screen of the active session
    pub fn resume_session(&mut self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        let screen = match self.mode {
            SessionMode::Calibration => Screen::Calibration,
            _ => Screen::Session,
        };
        self.navigate(screen);
        true
    }

    fn navigate(&mut self, screen: Screen) {
        self.screen = screen;
        self.sync_backup();
    }

    pub fn show_onboarding(&mut self) {
        self.navigate(Screen::Onboarding);
    }

    pub fn complete_onboarding(&mut self) {
        self.has_seen_onboarding = true;
        persist(self.store.as_ref(), KEY_ONBOARDING, &true);
        self.navigate(Screen::Home);
    }

    pub fn set_language(&mut self, lang: Language) {
        self.lang = lang;
        persist(self.store.as_ref(), KEY_LANG, &lang);
    }

    pub fn cycle_language(&mut self) {
        self.set_language(self.lang.next());
    }

    // ── Items and history ────────────────────────────────────────────

    pub fn add_dikr(&mut self, name: &str) -> Option<String> {
        let id = self.registry.add(name)?.id.clone();
        self.registry.save(self.store.as_ref());
        Some(id)
    }

    pub fn rename_dikr(&mut self, id: &str, name: &str) -> bool {
        if !self.registry.rename(id, name) {
            return false;
        }
        self.history.rename_dikr(id, name.trim());
        self.registry.save(self.store.as_ref());
        self.history.save(self.store.as_ref());
        true
    }

    /// Remove an item; its history stays. Deleting the item of the active
    /// session ends that session unsaved.
    pub fn delete_dikr(&mut self, id: &str) -> bool {
        if self.selected.as_deref() == Some(id) {
            self.cancel_session();
        }
        if self.history_filter.as_deref() == Some(id) {
            self.history_filter = None;
        }
        if !self.registry.delete(id) {
            return false;
        }
        self.registry.save(self.store.as_ref());
        true
    }

    pub fn delete_record(&mut self, id: &str) -> bool {
        let removed = self.history.delete(id);
        if removed {
            self.history.save(self.store.as_ref());
        }
        removed
    }

    /// Clear the history currently in view (one item's, or everything)
    pub fn clear_history(&mut self) {
        let filter = self.history_filter.clone();
        self.history.clear(filter.as_deref());
        self.history.save(self.store.as_ref());
    }

    /// Log `count` repetitions done away from the timer, dated `date` (epoch ms)
    pub fn add_manual_entry(
        &mut self,
        dikr_id: &str,
        count: u64,
        date: i64,
    ) -> Result<bool, SessionError> {
        let item = self
            .registry
            .get(dikr_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownDikr(dikr_id.to_string()))?;
        if !item.is_calibrated() {
            return Err(SessionError::NotCalibrated(item.name));
        }
        let added = self
            .history
            .add_manual(&item, count, date)
            .is_some();
        if added {
            self.history.save(self.store.as_ref());
        }
        Ok(added)
    }

    // ── Backup ───────────────────────────────────────────────────────

    pub fn export_bundle(&self) -> Bundle {
        Bundle {
            dikrs: self.registry.items().to_vec(),
            history: self.history.records().to_vec(),
            lang: Some(self.lang),
            onboarding: Some(self.has_seen_onboarding),
        }
    }

    /// Replace items and history with a backup's content
    pub fn import_bundle(&mut self, bundle: Bundle) {
        log::info!(
            "importing {} items and {} records",
            bundle.dikrs.len(),
            bundle.history.len()
        );
        self.registry.replace_all(bundle.dikrs);
        self.history.replace_all(bundle.history);
        self.registry.save(self.store.as_ref());
        self.history.save(self.store.as_ref());
        if let Some(lang) = bundle.lang {
            self.set_language(lang);
        }
        if let Some(seen) = bundle.onboarding {
            self.has_seen_onboarding = seen;
            persist(self.store.as_ref(), KEY_ONBOARDING, &seen);
        }
        if self.selected.is_some() && self.selected_item().is_none() {
            self.end_session();
        }
        self.history_filter = None;
    }

    // ── Recovery slot ────────────────────────────────────────────────

    pub fn backup(&self) -> Option<ActiveSessionBackup> {
        let id = self.selected.clone()?;
        Some(ActiveSessionBackup {
            screen: self.screen,
            selected_dikr_id: id,
            session_mode: self.mode,
            target_count: self.target,
            is_timer_running: self.timer.is_running(),
            elapsed_ms: self.timer.elapsed_ms(),
            start_time: self.timer.start_ms(),
            session_events: self.timer.events().to_vec(),
            calibration_attempts: self.calibration.attempts().to_vec(),
            detector: Some(self.detector.clone()),
        })
    }

    fn sync_backup(&self) {
        match self.backup() {
            Some(backup) => {
                if let Err(e) = recovery::save(self.store.as_ref(), &backup) {
                    log::warn!("failed to write session backup: {e}");
                }
            }
            None => self.clear_backup(),
        }
    }

    fn clear_backup(&self) {
        if let Err(e) = recovery::clear(self.store.as_ref()) {
            log::warn!("failed to remove session backup: {e}");
        }
    }
}
