use crate::util::{mean, std_dev};

/// Stops shorter than this are mis-taps, not repetitions
pub const DEFAULT_NOISE_THRESHOLD_MS: u64 = 500;

/// Measured single-repetition durations for one item
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    noise_threshold_ms: u64,
    attempts: Vec<f64>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_THRESHOLD_MS)
    }
}

impl Calibration {
    pub fn new(noise_threshold_ms: u64) -> Self {
        Self {
            noise_threshold_ms,
            attempts: Vec::new(),
        }
    }

    pub fn with_attempts(mut self, attempts: Vec<f64>) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn attempts(&self) -> &[f64] {
        &self.attempts
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Keep the duration of a stop if it clears the noise threshold
    pub fn record_stop(&mut self, elapsed_ms: u64) -> bool {
        if elapsed_ms > self.noise_threshold_ms {
            self.attempts.push(elapsed_ms as f64);
            true
        } else {
            false
        }
    }

    /// Recorded attempts, or the live elapsed time standing in for a single
    /// attempt when nothing has been recorded yet
    pub fn effective_attempts(&self, live_elapsed_ms: u64) -> Vec<f64> {
        if !self.attempts.is_empty() {
            self.attempts.clone()
        } else if live_elapsed_ms > self.noise_threshold_ms {
            vec![live_elapsed_ms as f64]
        } else {
            Vec::new()
        }
    }

    pub fn average(&self, live_elapsed_ms: u64) -> Option<f64> {
        mean(&self.effective_attempts(live_elapsed_ms))
    }

    pub fn spread(&self, live_elapsed_ms: u64) -> Option<f64> {
        std_dev(&self.effective_attempts(live_elapsed_ms))
    }

    pub fn can_commit(&self, live_elapsed_ms: u64) -> bool {
        self.average(live_elapsed_ms).is_some()
    }

    pub fn can_clear(&self, running: bool, live_elapsed_ms: u64) -> bool {
        !running && (live_elapsed_ms > 0 || !self.attempts.is_empty())
    }

    pub fn clear(&mut self) {
        self.attempts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_three_attempts() {
        let cal = Calibration::default().with_attempts(vec![1200.0, 980.0, 1050.0]);
        let avg = cal.average(0).unwrap();
        assert!((avg - 1076.67).abs() < 0.01);
    }

    #[test]
    fn short_stops_are_discarded() {
        let mut cal = Calibration::default();
        assert!(!cal.record_stop(120));
        assert!(!cal.record_stop(500));
        assert!(cal.record_stop(501));
        assert_eq!(cal.attempts(), &[501.0]);
    }

    #[test]
    fn live_elapsed_stands_in_when_empty() {
        let cal = Calibration::default();
        assert_eq!(cal.average(400), None);
        assert_eq!(cal.average(900), Some(900.0));
        assert!(cal.can_commit(900));
        assert!(!cal.can_commit(0));
    }

    #[test]
    fn recorded_attempts_win_over_live_value() {
        let cal = Calibration::default().with_attempts(vec![1000.0]);
        assert_eq!(cal.average(5000), Some(1000.0));
    }

    #[test]
    fn clear_is_gated() {
        let cal = Calibration::default();
        assert!(!cal.can_clear(false, 0));
        assert!(cal.can_clear(false, 10));
        assert!(!cal.can_clear(true, 10));
        let cal = cal.with_attempts(vec![800.0]);
        assert!(cal.can_clear(false, 0));
    }

    #[test]
    fn custom_threshold() {
        let mut cal = Calibration::new(100);
        assert!(cal.record_stop(150));
        assert_eq!(cal.spread(0), Some(0.0));
    }
}
