use std::cell::RefCell;
use std::io::Write;

use crate::config::Config;

/// Long pattern played when a target is reached (on/off milliseconds)
pub const TARGET_PATTERN: &[u64] = &[500, 200, 500, 200, 1000];
/// Short pulse for every milestone
pub const MILESTONE_PULSE: &[u64] = &[50];

/// Best-effort device feedback. Implementations swallow their own failures.
pub trait Feedback {
    fn vibrate(&self, pattern: &[u64]);
    fn play_target_sound(&self);
    fn notify(&self, title: &str, body: &str);
}

pub fn notification_body(target: u64, name: &str, elapsed_ms: u64) -> String {
    format!("{target} × {name} in {}s", elapsed_ms / 1000)
}

/// Feedback for a terminal: bell for sound, the log for everything else.
/// The latest notification is kept for the status line.
#[derive(Debug, Default)]
pub struct TerminalFeedback {
    vibration: bool,
    sound: bool,
    notification: bool,
    last_notice: RefCell<Option<String>>,
}

impl TerminalFeedback {
    pub fn new(cfg: &Config) -> Self {
        Self {
            vibration: cfg.vibration,
            sound: cfg.sound,
            notification: cfg.notification,
            last_notice: RefCell::new(None),
        }
    }

    pub fn take_notice(&self) -> Option<String> {
        self.last_notice.borrow_mut().take()
    }
}

impl Feedback for TerminalFeedback {
    fn vibrate(&self, pattern: &[u64]) {
        if self.vibration {
            log::debug!("vibrate {pattern:?} (no device)");
        }
    }

    fn play_target_sound(&self) {
        if !self.sound {
            return;
        }
        let mut out = std::io::stdout();
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            log::warn!("bell failed: {e}");
        }
    }

    fn notify(&self, title: &str, body: &str) {
        if self.notification {
            log::info!("{title}: {body}");
            *self.last_notice.borrow_mut() = Some(format!("{title}: {body}"));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Vibrate(Vec<u64>),
    Sound,
    Notify { title: String, body: String },
}

/// Records every signal, for tests
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    pub signals: RefCell<Vec<Signal>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&Signal) -> bool) -> usize {
        self.signals.borrow().iter().filter(|s| pred(s)).count()
    }
}

impl Feedback for RecordingFeedback {
    fn vibrate(&self, pattern: &[u64]) {
        self.signals
            .borrow_mut()
            .push(Signal::Vibrate(pattern.to_vec()));
    }

    fn play_target_sound(&self) {
        self.signals.borrow_mut().push(Signal::Sound);
    }

    fn notify(&self, title: &str, body: &str) {
        self.signals.borrow_mut().push(Signal::Notify {
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}

impl<F: Feedback + ?Sized> Feedback for std::rc::Rc<F> {
    fn vibrate(&self, pattern: &[u64]) {
        (**self).vibrate(pattern)
    }

    fn play_target_sound(&self) {
        (**self).play_target_sound()
    }

    fn notify(&self, title: &str, body: &str) {
        (**self).notify(title, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_uses_whole_seconds() {
        assert_eq!(notification_body(100, "tasbih", 65_900), "100 × tasbih in 65s");
    }

    #[test]
    fn disabled_notification_keeps_no_notice() {
        let cfg = Config {
            notification: false,
            ..Config::default()
        };
        let fb = TerminalFeedback::new(&cfg);
        fb.notify("Target reached", "x");
        assert_eq!(fb.take_notice(), None);
    }

    #[test]
    fn notice_is_taken_once() {
        let fb = TerminalFeedback::new(&Config::default());
        fb.notify("Target reached", "5 × x in 5s");
        assert_eq!(
            fb.take_notice().as_deref(),
            Some("Target reached: 5 × x in 5s")
        );
        assert_eq!(fb.take_notice(), None);
    }

    #[test]
    fn recording_feedback_counts() {
        let fb = RecordingFeedback::new();
        fb.vibrate(MILESTONE_PULSE);
        fb.vibrate(TARGET_PATTERN);
        fb.play_target_sound();
        assert_eq!(fb.count(|s| matches!(s, Signal::Vibrate(_))), 2);
        assert_eq!(fb.count(|s| *s == Signal::Sound), 1);
    }
}
