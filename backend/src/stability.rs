use serde_json::Value;

use crate::error::ApiError;
use crate::models::{parse_required_float, require_object, StabilityResponse};

pub const HEAT_THRESHOLD: f64 = 40.0;
pub const ACIDIC_THRESHOLD: f64 = 7.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityLabel {
    HeatDenaturation,
    AcidicInstability,
    Stable,
}

impl StabilityLabel {
    /// Wire text. "Instabilty" is misspelled on purpose; clients match on it.
    pub fn as_str(self) -> &'static str {
        match self {
            StabilityLabel::HeatDenaturation => "Heat Denaturation",
            StabilityLabel::AcidicInstability => "Acidic Instabilty",
            StabilityLabel::Stable => "Stable",
        }
    }
}

/// Labels that apply to the given conditions, in reporting order.
pub fn classify(temperature: f64, ph: f64) -> Vec<StabilityLabel> {
    let mut labels = Vec::with_capacity(2);
    if temperature > HEAT_THRESHOLD {
        labels.push(StabilityLabel::HeatDenaturation);
    }
    if ph < ACIDIC_THRESHOLD {
        labels.push(StabilityLabel::AcidicInstability);
    }
    if temperature <= HEAT_THRESHOLD && ph >= ACIDIC_THRESHOLD {
        labels.push(StabilityLabel::Stable);
    }
    labels
}

pub fn describe(labels: &[StabilityLabel]) -> String {
    labels
        .iter()
        .map(|label| label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Handles an `/api/stability` body.
pub fn assess(data: Option<&Value>) -> Result<StabilityResponse, ApiError> {
    let data = require_object(data)?;
    let temperature = parse_required_float("temperature", data.get("temperature"))?;
    let ph = parse_required_float("pH", data.get("pH"))?;

    if !(0.0..=14.0).contains(&ph) {
        return Err(ApiError::BadRequest(
            "pH value must be between 0 and 14".to_string(),
        ));
    }

    Ok(StabilityResponse {
        result: describe(&classify(temperature, ph)),
    })
}
