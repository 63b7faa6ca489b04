//! Emission-rate estimation
//!
//! Converts an integrated methane enhancement (IME, kg) into an hourly
//! emission rate using the fetch length and the average windspeed at
//! the lowest sampled altitude:
//!
//!   rate        = 3600 * u_mean * IME / fetch
//!   uncertainty = 3600 * u_std  * IME / fetch

use serde::{Deserialize, Serialize};

use crate::stats::WindStats;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Emission rate and its wind-driven uncertainty, both in kg/hr.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionEstimate {
    pub rate_kg_hr: f64,
    pub uncertainty_kg_hr: f64,
}

/// Estimate the emission rate for a plume.
///
/// Returns `None` when any input is absent or non-physical (non-finite
/// values, IME < 0, fetch <= 0); the caller substitutes the fill value.
pub fn compute_emission_rate(
    wind: &WindStats,
    ime_kg: f64,
    fetch_m: f64,
) -> Option<EmissionEstimate> {
    if !ime_kg.is_finite() || !fetch_m.is_finite() || ime_kg < 0.0 || fetch_m <= 0.0 {
        return None;
    }
    if !wind.mean_mps.is_finite() || wind.mean_mps < 0.0 {
        return None;
    }

    let per_meter = ime_kg / fetch_m;
    Some(EmissionEstimate {
        rate_kg_hr: SECONDS_PER_HOUR * wind.mean_mps * per_meter,
        uncertainty_kg_hr: SECONDS_PER_HOUR * wind.std_dev_mps * per_meter,
    })
}
