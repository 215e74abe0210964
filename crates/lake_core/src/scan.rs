//! Root scanner: sign-change detection on a sampled state interval followed by
//! bracketed refinement of every detected crossing.
//!
//! Detection uses the strict product test `rate(P_i) * rate(P_{i+1}) < 0`.
//! A sample where the rate is exactly zero yields a zero product, so that
//! crossing is skipped unless a neighbouring bracket also straddles it (for
//! example `L = 0` has `rate(0) = 0` and reports nothing over `[0, 4]`).
//! [`ScanSettings::detect_exact_zeros`] opts into reporting such samples.
//! Only one root is returned per bracket, so the sample count bounds how
//! closely spaced two fixed points may be and still be told apart.

use crate::equilibrium::{refine_root, Bracket, NewtonSettings};
use crate::error::{invalid_input, Result};
use crate::model::LakeParameters;
use crate::traits::RateFunction;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Strictly increasing, finite state samples shared by every scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanInterval {
    samples: Vec<f64>,
}

impl ScanInterval {
    pub const REFERENCE_MIN: f64 = 0.0;
    pub const REFERENCE_MAX: f64 = 4.0;
    pub const REFERENCE_SAMPLES: usize = 1000;

    /// `samples` evenly spaced points from `min` to `max` inclusive.
    pub fn uniform(min: f64, max: f64, samples: usize) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(invalid_input("Scan interval bounds must be finite."));
        }
        if samples == 0 {
            return Err(invalid_input("Scan interval needs at least one sample."));
        }
        if samples < 2 || min >= max {
            return Err(invalid_input(format!(
                "Scan interval must satisfy min < max with at least 2 samples (got [{min}, {max}] with {samples})."
            )));
        }
        Ok(Self {
            samples: linspace(min, max, samples),
        })
    }

    /// Wraps an explicit sample sequence, which must be finite and strictly increasing.
    pub fn from_samples(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(invalid_input("Scan interval needs at least one sample."));
        }
        if samples.iter().any(|p| !p.is_finite()) {
            return Err(invalid_input("Scan interval samples must be finite."));
        }
        if samples[0] >= samples[samples.len() - 1] {
            return Err(invalid_input(
                "Scan interval must end strictly above where it starts.",
            ));
        }
        if samples.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(invalid_input(
                "Scan interval samples must be strictly increasing.",
            ));
        }
        Ok(Self { samples })
    }

    /// 1000 samples over `[0, 4]`.
    pub fn reference() -> Self {
        Self {
            samples: linspace(
                Self::REFERENCE_MIN,
                Self::REFERENCE_MAX,
                Self::REFERENCE_SAMPLES,
            ),
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.samples[0]
    }

    pub fn end(&self) -> f64 {
        self.samples[self.samples.len() - 1]
    }
}

pub(crate) fn linspace(min: f64, max: f64, samples: usize) -> Vec<f64> {
    if samples == 1 {
        return vec![min];
    }
    let step = (max - min) / (samples - 1) as f64;
    let mut points: Vec<f64> = (0..samples).map(|i| min + step * i as f64).collect();
    if let Some(last) = points.last_mut() {
        *last = max;
    }
    points
}

/// How refined roots from different brackets are merged into distinct fixed points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Deduplication {
    /// Roots that agree after rounding to `decimals` places are one fixed point.
    Round { decimals: u32 },
    /// Sorted roots closer than `epsilon` to their predecessor are one fixed point.
    Cluster { epsilon: f64 },
}

impl Default for Deduplication {
    fn default() -> Self {
        Deduplication::Round { decimals: 4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub deduplication: Deduplication,
    pub detect_exact_zeros: bool,
    pub newton: NewtonSettings,
}

impl ScanSettings {
    pub fn validate(&self) -> Result<()> {
        self.newton.validate()?;
        match self.deduplication {
            Deduplication::Round { decimals } if decimals > 15 => Err(invalid_input(format!(
                "Rounding precision must be at most 15 decimals (got {decimals})."
            ))),
            Deduplication::Cluster { epsilon } if !(epsilon > 0.0) || !epsilon.is_finite() => {
                Err(invalid_input("Cluster epsilon must be positive and finite."))
            }
            _ => Ok(()),
        }
    }
}

/// Outcome of a single scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPointScan {
    /// Distinct roots in strictly ascending order.
    pub roots: Vec<f64>,
    /// Number of sign-change brackets detected.
    pub brackets: usize,
    /// Brackets dropped because refinement did not converge.
    pub failed_refinements: usize,
}

/// Scans `interval` for roots of `system`.
///
/// Refinement failures are contained: the bracket is logged and dropped.
pub fn scan_fixed_points(
    system: &impl RateFunction,
    interval: &ScanInterval,
    settings: &ScanSettings,
) -> FixedPointScan {
    let samples = interval.samples();
    let values: Vec<f64> = samples.iter().map(|&p| system.rate(p)).collect();

    let mut candidates = Vec::new();
    let mut brackets = 0usize;
    let mut failed_refinements = 0usize;

    for i in 0..samples.len().saturating_sub(1) {
        let (v0, v1) = (values[i], values[i + 1]);
        if settings.detect_exact_zeros && v0 == 0.0 {
            candidates.push(Candidate {
                state: samples[i],
                residual: 0.0,
            });
        }
        if v0 * v1 < 0.0 {
            brackets += 1;
            let bracket = Bracket::new(samples[i], samples[i + 1]);
            match refine_root(system, bracket, settings.newton) {
                Ok(refined) => {
                    trace!(
                        state = refined.state,
                        residual = refined.residual,
                        iterations = refined.iterations,
                        "bracket refined"
                    );
                    candidates.push(Candidate {
                        state: refined.state,
                        residual: refined.residual,
                    });
                }
                Err(err) => {
                    failed_refinements += 1;
                    warn!(
                        lower = bracket.lower,
                        width = bracket.width(),
                        error = %err,
                        "dropping bracket that failed to refine"
                    );
                }
            }
        }
    }
    if settings.detect_exact_zeros && values.last() == Some(&0.0) {
        candidates.push(Candidate {
            state: interval.end(),
            residual: 0.0,
        });
    }

    let roots = deduplicate(candidates, settings.deduplication);
    debug!(
        samples = samples.len(),
        brackets,
        roots = roots.len(),
        failed_refinements,
        "fixed point scan finished"
    );

    FixedPointScan {
        roots,
        brackets,
        failed_refinements,
    }
}

/// Distinct fixed points of the lake model over `interval`, ascending,
/// using the default scan settings.
pub fn find_fixed_points(params: &LakeParameters, interval: &ScanInterval) -> Result<Vec<f64>> {
    Ok(find_fixed_points_with(params, interval, &ScanSettings::default())?.roots)
}

pub fn find_fixed_points_with(
    params: &LakeParameters,
    interval: &ScanInterval,
    settings: &ScanSettings,
) -> Result<FixedPointScan> {
    params.validate()?;
    settings.validate()?;
    Ok(scan_fixed_points(params, interval, settings))
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    state: f64,
    residual: f64,
}

// Groups are contiguous once candidates are sorted; each group keeps the
// member with the smallest residual.
fn deduplicate(mut candidates: Vec<Candidate>, policy: Deduplication) -> Vec<f64> {
    candidates.sort_by(|a, b| a.state.total_cmp(&b.state));

    let mut representatives: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut previous: Option<f64> = None;
    for candidate in candidates {
        let joins = match (policy, previous) {
            (_, None) => false,
            (Deduplication::Round { decimals }, Some(prev)) => {
                round_to(candidate.state, decimals) == round_to(prev, decimals)
            }
            (Deduplication::Cluster { epsilon }, Some(prev)) => candidate.state - prev < epsilon,
        };
        previous = Some(candidate.state);

        match representatives.last_mut() {
            Some(rep) if joins => {
                if candidate.residual < rep.residual {
                    *rep = candidate;
                }
            }
            _ => representatives.push(candidate),
        }
    }

    representatives.into_iter().map(|rep| rep.state).collect()
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
