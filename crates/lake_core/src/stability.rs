use crate::error::{invalid_input, invalid_parameter, Result};
use crate::model::{rate_derivative, LakeParameters};
use serde::{Deserialize, Serialize};

/// Local stability of an equilibrium of `dP/dt = rate(P)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stability {
    Stable,
    Unstable,
}

impl Stability {
    /// Negative slope attracts; zero slope (a fold) counts as unstable.
    pub fn from_slope(slope: f64) -> Self {
        if slope < 0.0 {
            Stability::Stable
        } else {
            Stability::Unstable
        }
    }

    pub fn is_stable(self) -> bool {
        matches!(self, Stability::Stable)
    }
}

/// A classified equilibrium. `slope` is kept so callers can spot marginal
/// (near-zero slope) points that the two-way label hides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPoint {
    pub state: f64,
    pub slope: f64,
    pub stability: Stability,
}

pub fn classify_stability(root: f64, params: &LakeParameters) -> Result<Stability> {
    classify_fixed_point(root, params).map(|point| point.stability)
}

pub fn classify_fixed_point(root: f64, params: &LakeParameters) -> Result<FixedPoint> {
    params.validate()?;
    if !root.is_finite() {
        return Err(invalid_input(format!("Root must be finite (got {root}).")));
    }
    let slope = rate_derivative(root, params);
    if !slope.is_finite() {
        return Err(invalid_parameter(format!(
            "Derivative is undefined at P = {root} for hill exponent {}; stability cannot be classified.",
            params.hill_exponent
        )));
    }
    Ok(FixedPoint {
        state: root,
        slope,
        stability: Stability::from_slope(slope),
    })
}

pub fn classify_fixed_points(roots: &[f64], params: &LakeParameters) -> Result<Vec<FixedPoint>> {
    roots
        .iter()
        .map(|&root| classify_fixed_point(root, params))
        .collect()
}
