use crate::errors::ValidationError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::NormalWeight
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bmi {
    pub bmi: f64,
    pub category: BmiCategory,
}

pub fn calculate(height_cm: f64, weight_kg: f64) -> Result<Bmi, ValidationError> {
    if !(height_cm.is_finite() && height_cm > 0.0) {
        return Err(ValidationError::NotPositive { field: "height_cm" });
    }
    if !(weight_kg.is_finite() && weight_kg > 0.0) {
        return Err(ValidationError::NotPositive { field: "weight_kg" });
    }

    let height_m = height_cm / 100.0;
    let raw = weight_kg / (height_m * height_m);
    if !raw.is_finite() {
        return Err(ValidationError::NotPositive { field: "height_cm" });
    }

    Ok(Bmi {
        bmi: (raw * 10.0).round() / 10.0,
        category: BmiCategory::from_bmi(raw),
    })
}
