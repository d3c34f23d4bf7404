use crate::trackers::{BloodSugarEntry, GlucoseStatus, MedicationEntry, WaterEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BloodSugarRequest {
    pub reading: Option<f64>,
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CarbRequest {
    pub amount: Option<f64>,
    pub food: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MedicationRequest {
    pub name: Option<String>,
    pub time: Option<String>,
    pub dose: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WaterRequest {
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct BmiRequest {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct BloodSugarReading {
    #[serde(flatten)]
    pub entry: BloodSugarEntry,
    pub status: GlucoseStatus,
}

impl From<BloodSugarEntry> for BloodSugarReading {
    fn from(entry: BloodSugarEntry) -> Self {
        Self {
            status: entry.status(),
            entry,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayView<E> {
    pub date: String,
    pub total: f64,
    pub recent: Vec<E>,
}

#[derive(Debug, Serialize)]
pub struct WaterView {
    pub date: String,
    pub total: f64,
    pub goal: f64,
    pub percentage: f64,
    pub recent: Vec<WaterEntry>,
}

#[derive(Debug, Serialize)]
pub struct Appended<V> {
    pub retained: bool,
    pub evicted: usize,
    pub current: V,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: String,
    pub latest_blood_sugar: Option<BloodSugarReading>,
    pub carbs_total: f64,
    pub water_total: f64,
    pub water_percentage: f64,
    pub activity_minutes: f64,
    pub medications: Vec<MedicationEntry>,
}
