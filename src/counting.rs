/// Repetitions completed in `elapsed_ms` at `duration_ms` per repetition.
///
/// Callers guarantee `duration_ms > 0`; a non-positive duration yields 0.
pub fn derive_count(elapsed_ms: u64, duration_ms: f64) -> u64 {
    if duration_ms <= 0.0 || !duration_ms.is_finite() {
        return 0;
    }
    (elapsed_ms as f64 / duration_ms).floor() as u64
}

/// Percentage of the target reached, capped at 100
pub fn progress_pct(count: u64, target: Option<u64>) -> f64 {
    match target {
        Some(t) if t > 0 => ((count as f64 / t as f64) * 100.0).min(100.0),
        _ => 100.0,
    }
}
