use crate::errors::ValidationError;
use crate::history::{Entry, LogOrdering, LogPolicy};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const BLOOD_SUGAR_KEY: &str = "diabetes_blood_sugar";
pub const CARBS_KEY: &str = "diabetes_carbs";
pub const MEDICATION_KEY: &str = "diabetes_medication";
pub const WATER_KEY: &str = "diabetes_water";
pub const ACTIVITY_KEY: &str = "diabetes_activity";

pub const BOUNDED_LOG_CAPACITY: usize = 10;
pub const RECENT_LIMIT: usize = 5;

pub const LOW_GLUCOSE_MG_DL: f64 = 70.0;
pub const HIGH_GLUCOSE_MG_DL: f64 = 180.0;
pub const WATER_GOAL_ML: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseStatus {
    Low,
    Normal,
    High,
}

impl GlucoseStatus {
    pub fn classify(reading: f64) -> Self {
        if reading < LOW_GLUCOSE_MG_DL {
            Self::Low
        } else if reading > HIGH_GLUCOSE_MG_DL {
            Self::High
        } else {
            Self::Normal
        }
    }
}

pub fn water_percentage(total_ml: f64) -> f64 {
    (total_ml / WATER_GOAL_ML * 100.0).clamp(0.0, 100.0)
}

fn positive(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field })
    }
}

fn present(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Missing { field })
    } else {
        Ok(())
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodSugarEntry {
    pub reading: f64,
    pub time: String,
    pub timestamp: DateTime<Utc>,
}

impl BloodSugarEntry {
    pub fn new(reading: f64, time: &str, now: DateTime<Local>) -> Self {
        Self {
            reading,
            time: time.trim().to_string(),
            timestamp: now.with_timezone(&Utc),
        }
    }

    pub fn status(&self) -> GlucoseStatus {
        GlucoseStatus::classify(self.reading)
    }
}

impl Entry for BloodSugarEntry {
    const POLICY: LogPolicy = LogPolicy {
        key: BLOOD_SUGAR_KEY,
        ordering: LogOrdering::NewestRecordedFirst,
        capacity: Some(BOUNDED_LOG_CAPACITY),
    };

    fn validate(&self) -> Result<(), ValidationError> {
        positive(self.reading, "reading")?;
        present(&self.time, "time")
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn occurred_at(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.time)
    }

    fn day(&self) -> Option<NaiveDate> {
        ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&self.time, format).ok())
            .map(|moment| moment.date())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbEntry {
    pub amount: f64,
    pub food: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl CarbEntry {
    pub fn new(amount: f64, food: Option<&str>, now: DateTime<Local>) -> Self {
        Self {
            amount,
            food: text_or(food, "Unknown"),
            date: now.date_naive(),
            timestamp: now.with_timezone(&Utc),
        }
    }
}

impl Entry for CarbEntry {
    const POLICY: LogPolicy = LogPolicy {
        key: CARBS_KEY,
        ordering: LogOrdering::Insertion,
        capacity: None,
    };

    fn validate(&self) -> Result<(), ValidationError> {
        positive(self.amount, "amount")
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn occurred_at(&self) -> Cow<'_, str> {
        Cow::Owned(self.date.to_string())
    }

    fn day(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub name: String,
    pub time: String,
    pub dose: String,
    pub timestamp: DateTime<Utc>,
}

impl MedicationEntry {
    pub fn new(name: &str, time: &str, dose: Option<&str>, now: DateTime<Local>) -> Self {
        Self {
            name: name.trim().to_string(),
            time: time.trim().to_string(),
            dose: text_or(dose, "N/A"),
            timestamp: now.with_timezone(&Utc),
        }
    }
}

impl Entry for MedicationEntry {
    const POLICY: LogPolicy = LogPolicy {
        key: MEDICATION_KEY,
        ordering: LogOrdering::OccurredAscending,
        capacity: Some(BOUNDED_LOG_CAPACITY),
    };

    fn validate(&self) -> Result<(), ValidationError> {
        present(&self.name, "name")?;
        present(&self.time, "time")
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn occurred_at(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.time)
    }

    // A schedule time carries no date, so the day it was added stands in.
    fn day(&self) -> Option<NaiveDate> {
        Some(self.timestamp.with_timezone(&Local).date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterEntry {
    pub amount: f64,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl WaterEntry {
    pub fn new(amount: f64, now: DateTime<Local>) -> Self {
        Self {
            amount,
            date: now.date_naive(),
            timestamp: now.with_timezone(&Utc),
        }
    }
}

impl Entry for WaterEntry {
    const POLICY: LogPolicy = LogPolicy {
        key: WATER_KEY,
        ordering: LogOrdering::Insertion,
        capacity: None,
    };

    fn validate(&self) -> Result<(), ValidationError> {
        positive(self.amount, "amount")
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn occurred_at(&self) -> Cow<'_, str> {
        Cow::Owned(self.date.to_string())
    }

    fn day(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: f64,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(kind: &str, duration: f64, now: DateTime<Local>) -> Self {
        Self {
            kind: kind.trim().to_string(),
            duration,
            date: now.date_naive(),
            timestamp: now.with_timezone(&Utc),
        }
    }
}

impl Entry for ActivityEntry {
    const POLICY: LogPolicy = LogPolicy {
        key: ACTIVITY_KEY,
        ordering: LogOrdering::Insertion,
        capacity: None,
    };

    fn validate(&self) -> Result<(), ValidationError> {
        present(&self.kind, "type")?;
        positive(self.duration, "duration")
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn occurred_at(&self) -> Cow<'_, str> {
        Cow::Owned(self.date.to_string())
    }

    fn day(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}
