use serde::{Deserialize, Serialize};

/// A user-defined repeated action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DikrItem {
    pub id: String,
    pub name: String,
    /// Average duration of one repetition, `None` until first calibrated
    #[serde(rename = "durationMs")]
    pub calibrated_duration_ms: Option<f64>,
}

impl DikrItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            calibrated_duration_ms: None,
        }
    }

    /// Calibrated duration usable for counting (strictly positive)
    pub fn duration_ms(&self) -> Option<f64> {
        self.calibrated_duration_ms.filter(|d| *d > 0.0)
    }

    pub fn is_calibrated(&self) -> bool {
        self.duration_ms().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionMode {
    Free,
    Target,
    Calibration,
}

/// A finished or committed session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub dikr_id: String,
    pub dikr_name: String,
    /// Epoch milliseconds
    pub date: i64,
    pub duration_ms: f64,
    pub count: u64,
    pub mode: SessionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u64>,
}

impl SessionRecord {
    pub fn new(
        item: &DikrItem,
        date: i64,
        duration_ms: f64,
        count: u64,
        mode: SessionMode,
        target: Option<u64>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            dikr_id: item.id.clone(),
            dikr_name: item.name.clone(),
            date,
            duration_ms,
            count,
            mode,
            target: if mode == SessionMode::Target { target } else { None },
        }
    }

    pub fn reached_target(&self) -> bool {
        self.mode == SessionMode::Target && self.target.is_some_and(|t| self.count >= t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Onboarding,
    #[default]
    Home,
    Calibration,
    Session,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
    Ar,
}

impl Language {
    pub fn next(self) -> Self {
        match self {
            Language::Fr => Language::En,
            Language::En => Language::Ar,
            Language::Ar => Language::Fr,
        }
    }
}
