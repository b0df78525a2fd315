//! Michaelis-Menten velocity and cost efficiency.

use serde_json::Value;

use crate::error::ApiError;
use crate::models::{int_field, require_object, round_to, KineticsResponse};

pub const VMAX: f64 = 100.0;
pub const KM: f64 = 5.0;

pub const SUBSTRATE_FIELD: &str = "substrate_concentration";
pub const COST_FIELD: &str = "cost";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinetics {
    pub velocity: f64,
    pub efficiency: f64,
}

/// `velocity = Vmax * s / (Km + s)`, `efficiency = velocity / cost`, unrounded.
pub fn michaelis_menten(substrate: f64, cost: f64) -> Result<Kinetics, ApiError> {
    let denominator = KM + substrate;
    if denominator == 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "division by zero: {SUBSTRATE_FIELD} must not be {}",
            -KM
        )));
    }
    if cost == 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "division by zero: {COST_FIELD} must not be 0"
        )));
    }

    let velocity = VMAX * substrate / denominator;
    Ok(Kinetics {
        velocity,
        efficiency: velocity / cost,
    })
}

/// Handles an `/api/analyze` body. Both inputs are truncated to integers
/// before the computation.
pub fn analyze(data: Option<&Value>) -> Result<KineticsResponse, ApiError> {
    let data = require_object(data)?;
    let substrate = int_field(data, SUBSTRATE_FIELD, 0)?;
    let cost = int_field(data, COST_FIELD, 1)?;

    let kinetics = michaelis_menten(substrate as f64, cost as f64)?;
    Ok(KineticsResponse {
        status: "success",
        velocity: round_to(kinetics.velocity, 2),
        efficiency: round_to(kinetics.efficiency, 4),
    })
}
