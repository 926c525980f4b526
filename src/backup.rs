//! Whole-app backup as one JSON document, plus a CSV view of the history.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::history::History;
use crate::models::{DikrItem, Language, SessionRecord};

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup must contain `dikrs` and `history` lists")]
    InvalidShape,

    #[error("backup io: {0}")]
    Io(#[from] std::io::Error),

    #[error("backup json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub dikrs: Vec<DikrItem>,
    pub history: Vec<SessionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<bool>,
}

pub fn default_file_name(now: DateTime<Local>) -> String {
    format!("dikr-backup-{}.json", now.format("%Y-%m-%d"))
}

pub fn to_json(bundle: &Bundle) -> Result<String, BackupError> {
    Ok(serde_json::to_string_pretty(bundle)?)
}

/// Parse a backup document. Both lists must be present; the rest is optional.
pub fn parse(text: &str) -> Result<Bundle, BackupError> {
    let value: Value = serde_json::from_str(text)?;
    let has_list = |key: &str| value.get(key).is_some_and(Value::is_array);
    if !has_list("dikrs") || !has_list("history") {
        return Err(BackupError::InvalidShape);
    }
    Ok(serde_json::from_value(value)?)
}

pub fn write_file<P: AsRef<Path>>(path: P, bundle: &Bundle) -> Result<(), BackupError> {
    fs::write(path, to_json(bundle)?)?;
    Ok(())
}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Bundle, BackupError> {
    parse(&fs::read_to_string(path)?)
}

pub fn write_csv_file<P: AsRef<Path>>(path: P, history: &History) -> Result<(), BackupError> {
    let file = File::create(path)?;
    history.write_csv(BufWriter::new(file))?;
    Ok(())
}
