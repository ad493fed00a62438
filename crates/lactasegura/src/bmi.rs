//! Infant BMI calculation and interpretation.
//!
//! BMI is weight(kg) / height(m)^2, interpreted against age-gated thresholds
//! for children up to 36 months. Every successful calculation is appended to
//! the IMC history store; there is no preview-without-saving mode.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::BmiRecord;
use crate::store::RecordStore;

/// Accepted weight range in kilograms.
pub const WEIGHT_RANGE_KG: (f64, f64) = (0.5, 30.0);

/// Accepted height range in centimeters.
pub const HEIGHT_RANGE_CM: (f64, f64) = (30.0, 120.0);

/// Accepted age range in months.
pub const AGE_RANGE_MONTHS: (f64, f64) = (0.0, 36.0);

/// Interpretation category for a computed BMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    /// BMI below the low threshold for the age.
    SevereUnderweight,
    /// BMI between the low and normal thresholds.
    Underweight,
    /// BMI within the expected range.
    Expected,
    /// BMI at or above the high threshold.
    AboveExpected,
}

impl BmiCategory {
    /// The guidance text recorded and shown for this category.
    #[must_use]
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::SevereUnderweight => "severe underweight, urgent referral",
            Self::Underweight => "underweight, recommend pediatric evaluation",
            Self::Expected => "expected range, continue routine checks",
            Self::AboveExpected => "above expected range, discuss at next checkup",
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.guidance())
    }
}

/// Age-gated interpretation thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Below this the BMI indicates severe underweight.
    pub low: f64,
    /// Below this (and at or above `low`) the BMI indicates underweight.
    pub normal: f64,
    /// At or above this the BMI is above the expected range.
    pub high: f64,
}

impl Thresholds {
    /// The thresholds applicable to the given age.
    #[must_use]
    pub fn for_age(age_months: f64) -> Self {
        if age_months <= 24.0 {
            Self {
                low: 13.0,
                normal: 14.0,
                high: 17.0,
            }
        } else {
            Self {
                low: 14.0,
                normal: 15.0,
                high: 18.0,
            }
        }
    }

    /// Classify a raw BMI value. Lower bounds are inclusive: a BMI exactly
    /// on a threshold falls into the higher category.
    #[must_use]
    pub fn classify(&self, bmi: f64) -> BmiCategory {
        if bmi < self.low {
            BmiCategory::SevereUnderweight
        } else if bmi < self.normal {
            BmiCategory::Underweight
        } else if bmi < self.high {
            BmiCategory::Expected
        } else {
            BmiCategory::AboveExpected
        }
    }
}

/// The result of a BMI assessment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BmiAssessment {
    /// The computed BMI, at full precision.
    pub bmi: f64,
    /// The interpretation category.
    pub category: BmiCategory,
}

impl BmiAssessment {
    /// The BMI rounded to one decimal place, as displayed to the caregiver.
    #[must_use]
    pub fn display_bmi(&self) -> String {
        format!("{:.1}", self.bmi)
    }
}

fn check_range(field: &'static str, value: f64, range: (f64, f64)) -> Result<()> {
    if !value.is_finite() || value < range.0 || value > range.1 {
        return Err(Error::validation(field, range.0, range.1, value));
    }
    Ok(())
}

/// Compute and interpret a BMI. Pure and deterministic.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the offending field and its expected
/// range if any input is out of range or not a finite number. No BMI is
/// computed in that case.
pub fn assess(weight_kg: f64, height_cm: f64, age_months: f64) -> Result<BmiAssessment> {
    check_range("weight_kg", weight_kg, WEIGHT_RANGE_KG)?;
    check_range("height_cm", height_cm, HEIGHT_RANGE_CM)?;
    check_range("age_months", age_months, AGE_RANGE_MONTHS)?;

    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    let category = Thresholds::for_age(age_months).classify(bmi);

    Ok(BmiAssessment { bmi, category })
}

/// Compute a BMI and append the result to the IMC history store.
///
/// # Errors
///
/// Returns a validation error for out-of-range input (nothing is stored),
/// or a store error if the history rewrite fails.
pub fn assess_and_record(
    history: &mut RecordStore<BmiRecord>,
    weight_kg: f64,
    height_cm: f64,
    age_months: f64,
) -> Result<BmiAssessment> {
    let assessment = assess(weight_kg, height_cm, age_months)?;
    history.append(BmiRecord::new(
        weight_kg,
        height_cm,
        age_months,
        assessment.bmi,
        assessment.category.guidance().to_string(),
    ))?;
    Ok(assessment)
}
