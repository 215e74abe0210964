//! Rate law of the lake phosphorus model and its analytic derivative.
//!
//! `dP/dt = L - s*P + r * P^q / (m^q + P^q)`
//!
//! Loading `L` enters linearly, sedimentation removes phosphorus at rate `s`,
//! and sediment recycling follows a Hill function with half-saturation `m`
//! and exponent `q`.

use crate::error::{invalid_input, invalid_parameter, Result};
use crate::traits::{RateFunction, Scalar};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Missing fields deserialize to the reference configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeParameters {
    /// Nutrient loading `L`.
    pub loading: f64,
    /// Maximum recycling rate `r`.
    pub recycling: f64,
    /// Sedimentation (loss) rate `s`.
    pub sedimentation: f64,
    /// Half-saturation constant `m` of the recycling term.
    pub half_saturation: f64,
    /// Hill exponent `q` of the recycling term.
    pub hill_exponent: f64,
}

impl Default for LakeParameters {
    fn default() -> Self {
        Self {
            loading: 0.45,
            recycling: 1.0,
            sedimentation: 0.7,
            half_saturation: 1.0,
            hill_exponent: 8.0,
        }
    }
}

impl LakeParameters {
    pub fn new(
        loading: f64,
        recycling: f64,
        sedimentation: f64,
        half_saturation: f64,
        hill_exponent: f64,
    ) -> Self {
        Self {
            loading,
            recycling,
            sedimentation,
            half_saturation,
            hill_exponent,
        }
    }

    /// Returns a copy with the loading replaced, leaving every other parameter fixed.
    pub fn with_loading(&self, loading: f64) -> Self {
        Self { loading, ..*self }
    }

    /// Rejects parameter sets the rate law is not defined for.
    ///
    /// Loading and recycling are only required to be finite; the engine
    /// analyzes any finite value, even if no equilibrium exists.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("loading", self.loading),
            ("recycling", self.recycling),
            ("sedimentation", self.sedimentation),
            ("half_saturation", self.half_saturation),
            ("hill_exponent", self.hill_exponent),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(invalid_input(format!(
                    "Parameter {name} must be finite (got {value})."
                )));
            }
        }
        if self.sedimentation <= 0.0 {
            return Err(invalid_parameter(format!(
                "Sedimentation rate s must be positive (got {}).",
                self.sedimentation
            )));
        }
        if self.half_saturation <= 0.0 {
            return Err(invalid_parameter(format!(
                "Half-saturation constant m must be positive (got {}).",
                self.half_saturation
            )));
        }
        if self.hill_exponent <= 0.0 {
            return Err(invalid_parameter(format!(
                "Hill exponent q must be positive (got {}).",
                self.hill_exponent
            )));
        }
        Ok(())
    }
}

/// Evaluates `dP/dt` at `state`.
pub fn rate<T: Scalar>(state: T, params: &LakeParameters) -> T {
    let loading = T::constant(params.loading);
    let recycling = T::constant(params.recycling);
    let sedimentation = T::constant(params.sedimentation);
    let m_q = T::constant(params.half_saturation).powf(T::constant(params.hill_exponent));
    let p_q = state.powf(T::constant(params.hill_exponent));

    loading - sedimentation * state + recycling * (p_q / (m_q + p_q))
}

/// Evaluates `d(dP/dt)/dP` at `state`. The loading does not enter.
///
/// For `0 < q < 1` the result is infinite (or NaN when `r = 0`) at `P = 0`.
pub fn rate_derivative<T: Scalar>(state: T, params: &LakeParameters) -> T {
    let recycling = T::constant(params.recycling);
    let sedimentation = T::constant(params.sedimentation);
    let q = T::constant(params.hill_exponent);
    let m_q = T::constant(params.half_saturation).powf(q);
    let p_q = state.powf(q);
    let denom = m_q + p_q;

    let recycling_slope = recycling * q * state.powf(q - T::one()) * m_q / (denom * denom);
    recycling_slope - sedimentation
}

/// Elementwise `rate` over `states`, written into `out`.
///
/// # Panics
/// Panics if `out` and `states` have different lengths.
pub fn rate_into(states: &[f64], params: &LakeParameters, out: &mut [f64]) {
    assert_eq!(
        states.len(),
        out.len(),
        "rate_into output buffer must match the input length"
    );
    for (value, &state) in out.iter_mut().zip(states) {
        *value = rate(state, params);
    }
}

/// Elementwise `rate` over a slice of states.
pub fn rate_slice(states: &[f64], params: &LakeParameters) -> Vec<f64> {
    states.iter().map(|&state| rate(state, params)).collect()
}

/// Elementwise `rate` over a state vector.
pub fn rate_vector(states: &DVector<f64>, params: &LakeParameters) -> DVector<f64> {
    states.map(|state| rate(state, params))
}

impl RateFunction for LakeParameters {
    fn rate(&self, state: f64) -> f64 {
        rate(state, self)
    }

    fn rate_derivative(&self, state: f64) -> f64 {
        rate_derivative(state, self)
    }
}
