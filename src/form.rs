use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use thiserror::Error;

use crate::event::Event;

const DEFAULT_DATE: &str = "2026-02-18";
const DEFAULT_START: &str = "10:00";
const DEFAULT_END: &str = "15:00";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("イベント名を入力してください")]
    MissingName,
    #[error("日付の形式が正しくありません: {0}")]
    InvalidDate(String),
    #[error("時間の形式が正しくありません: {0}")]
    InvalidTime(String),
}

/// Raw values of the add-event form, as the browser submits them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddEventForm {
    pub name: String,
    pub date: String,
    pub venue: String,
    pub start: String,
    pub end: String,
}

impl Default for AddEventForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            date: DEFAULT_DATE.to_string(),
            venue: String::new(),
            start: DEFAULT_START.to_string(),
            end: DEFAULT_END.to_string(),
        }
    }
}

impl AddEventForm {
    pub fn parse(&self) -> Result<Event, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(self.date.clone()))?;

        Ok(Event::new(
            name,
            date,
            parse_time(&self.start)?,
            parse_time(&self.end)?,
            self.venue.trim(),
        ))
    }
}

// Browsers send `HH:MM`, or `HH:MM:SS` when the input has a step below a minute.
fn parse_time(value: &str) -> Result<NaiveTime, FormError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| FormError::InvalidTime(value.to_string()))
}
