use crate::error::{invalid_input, Result};
use crate::traits::RateFunction;
use anyhow::bail;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonSettings {
    pub max_steps: usize,
    /// Residual `|rate(x)|` at which an iterate is accepted.
    pub tolerance: f64,
    /// Relative bracket width at which refinement stops.
    pub step_tolerance: f64,
    /// Largest residual accepted when the bracket collapses before
    /// `tolerance` is reached. A sign change across a pole fails here.
    pub acceptance_tolerance: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_steps: 50,
            tolerance: 1e-12,
            step_tolerance: 1e-14,
            acceptance_tolerance: 1e-6,
        }
    }
}

impl NewtonSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(invalid_input("max_steps must be greater than zero."));
        }
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(invalid_input("tolerance must be positive and finite."));
        }
        if !(self.step_tolerance > 0.0) || !self.step_tolerance.is_finite() {
            return Err(invalid_input("step_tolerance must be positive and finite."));
        }
        if !(self.acceptance_tolerance > 0.0) || !self.acceptance_tolerance.is_finite() {
            return Err(invalid_input(
                "acceptance_tolerance must be positive and finite.",
            ));
        }
        Ok(())
    }
}

/// An interval across which the rate changes sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower: f64,
    pub upper: f64,
}

impl Bracket {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootRefinement {
    pub state: f64,
    pub residual: f64,
    pub iterations: usize,
}

/// Refines the root inside `bracket`, starting from its midpoint.
///
/// Newton steps use the analytic derivative. Whenever a Newton step would
/// leave the current bracket (or the slope vanishes) a secant step through
/// the bracket ends is taken instead, so iterates never escape the sign
/// change they were seeded from. The bracket shrinks around every iterate.
///
/// A bracket that collapses with a residual above
/// `settings.acceptance_tolerance` is rejected: the sign change came from a
/// pole or jump of the rate, not a root.
pub fn refine_root(
    system: &impl RateFunction,
    bracket: Bracket,
    settings: NewtonSettings,
) -> anyhow::Result<RootRefinement> {
    let mut lower = bracket.lower;
    let mut upper = bracket.upper;
    let mut f_lower = system.rate(lower);
    let mut f_upper = system.rate(upper);
    if !(f_lower * f_upper < 0.0) {
        bail!(
            "Bracket [{}, {}] does not straddle a sign change (f = {}, {}).",
            lower,
            upper,
            f_lower,
            f_upper
        );
    }

    let mut x = bracket.midpoint();
    let mut fx = system.rate(x);
    let mut iterations = 0usize;

    loop {
        if !fx.is_finite() {
            bail!("Rate is not finite at x = {}.", x);
        }
        if fx.abs() <= settings.tolerance {
            break;
        }
        if upper - lower <= settings.step_tolerance * (1.0 + x.abs()) {
            if fx.abs() > settings.acceptance_tolerance {
                bail!(
                    "Bracket collapsed at x = {} with |f(x)| = {}; the sign change is not a root.",
                    x,
                    fx.abs()
                );
            }
            break;
        }
        if iterations >= settings.max_steps {
            bail!(
                "Newton solver failed to converge in {} steps (|f(x)| = {}).",
                settings.max_steps,
                fx.abs()
            );
        }

        if (fx < 0.0) == (f_lower < 0.0) {
            lower = x;
            f_lower = fx;
        } else {
            upper = x;
            f_upper = fx;
        }

        let slope = system.rate_derivative(x);
        let newton = x - fx / slope;
        x = if slope.is_finite() && slope != 0.0 && newton > lower && newton < upper {
            newton
        } else {
            secant_step(lower, f_lower, upper, f_upper)
        };

        iterations += 1;
        fx = system.rate(x);
    }

    Ok(RootRefinement {
        state: x,
        residual: fx.abs(),
        iterations,
    })
}

// Secant through the bracket ends; bisects if the secant lands on an end.
fn secant_step(lower: f64, f_lower: f64, upper: f64, f_upper: f64) -> f64 {
    let candidate = upper - f_upper * (upper - lower) / (f_upper - f_lower);
    if candidate > lower && candidate < upper {
        candidate
    } else {
        0.5 * (lower + upper)
    }
}
