use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, TimeZone};

use crate::models::{Language, SessionMode, SessionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    All,
}

/// Aggregates over counted sessions (calibration logs excluded)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub count: u64,
    pub time_ms: f64,
    pub targets_reached: usize,
}

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Epoch ms of local midnight at the start of `day`
pub fn day_start_ms(day: NaiveDate) -> Option<i64> {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&day.and_time(midnight))
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// `YYYY-MM-DD` in local time to the epoch ms of that day's midnight
pub fn parse_day(text: &str) -> Option<i64> {
    NaiveDate::parse_from_str(text.trim(), DAY_FORMAT)
        .ok()
        .and_then(day_start_ms)
}

/// Local calendar day of an instant, `YYYY-MM-DD`
pub fn format_day(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(dt) => dt.format(DAY_FORMAT).to_string(),
        None => "?".to_string(),
    }
}

/// Epoch ms of the start of `period` as seen from `now` in local time
pub fn period_start(period: Period, now: DateTime<Local>) -> Option<i64> {
    let today = now.date_naive();
    let day = match period {
        Period::All => return None,
        Period::Today => today,
        Period::Week => today.checked_sub_days(Days::new(
            today.weekday().num_days_from_monday() as u64,
        ))?,
    };
    day_start_ms(day)
}

pub fn stats_for<'a, I>(records: I, period: Period, now: DateTime<Local>) -> Stats
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let since = period_start(period, now);
    records
        .into_iter()
        .filter(|r| r.mode != SessionMode::Calibration)
        .filter(|r| since.map_or(true, |s| r.date >= s))
        .fold(Stats::default(), |mut acc, r| {
            acc.count += r.count;
            acc.time_ms += r.duration_ms;
            if r.reached_target() {
                acc.targets_reached += 1;
            }
            acc
        })
}

/// Coarse time spent: `"12 min"` or `"2 h 5 min"`
pub fn format_time(ms: f64, lang: Language) -> String {
    let (h_unit, m_unit) = match lang {
        Language::Ar => ("س", "د"),
        _ => ("h", "min"),
    };
    let min = (ms / 60_000.0).floor() as u64;
    if min < 60 {
        format!("{min} {m_unit}")
    } else {
        format!("{} {h_unit} {} {m_unit}", min / 60, min % 60)
    }
}

/// Session length for history rows: `"1m5s"` or `"42s"`
pub fn format_duration(ms: f64) -> String {
    let ms = ms.max(0.0) as u64;
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Running stopwatch display, `MM:SS`
pub fn format_clock(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn format_date(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(dt) => dt.format("%d %b %H:%M").to_string(),
        None => "?".to_string(),
    }
}
