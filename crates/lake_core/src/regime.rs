//! Domain vocabulary for classified equilibria.
//!
//! Kept apart from [`crate::stability`]: the trophic label is a coarse
//! reading of where a stable state sits relative to the half-saturation
//! constant, not part of the stability classification itself.

use crate::model::LakeParameters;
use crate::stability::FixedPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrophicRegime {
    /// Stable state below the half-saturation constant ("healthy").
    Oligotrophic,
    /// Stable state at or above the half-saturation constant ("collapsed").
    Eutrophic,
}

impl TrophicRegime {
    /// `None` for unstable points.
    pub fn of(point: &FixedPoint, params: &LakeParameters) -> Option<Self> {
        if !point.stability.is_stable() {
            return None;
        }
        if point.state < params.half_saturation {
            Some(TrophicRegime::Oligotrophic)
        } else {
            Some(TrophicRegime::Eutrophic)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrophicRegime::Oligotrophic => "Healthy (Oligotrophic)",
            TrophicRegime::Eutrophic => "Collapsed (Eutrophic)",
        }
    }
}

impl fmt::Display for TrophicRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
