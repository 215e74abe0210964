//! The `lake_core` crate is the numerical engine behind the lake
//! eutrophication explorer. It analyzes the one-dimensional phosphorus model
//! `dP/dt = L - s*P + r * P^q / (m^q + P^q)` without integrating it in time.
//!
//! Key components:
//! - **Model**: the rate law and its analytic derivative (`model`).
//! - **Root scanner**: sign-change detection over a sampled state interval and
//!   bracketed Newton/secant refinement (`scan`, `equilibrium`).
//! - **Stability**: derivative-sign classification, with trophic labels kept
//!   in a separate layer (`stability`, `regime`).
//! - **Bifurcation**: loading sweeps producing the `(L, P*)` point cloud (`bifurcation`).

pub mod analysis;
pub mod bifurcation;
pub mod config;
pub mod equilibrium;
pub mod error;
pub mod model;
pub mod regime;
pub mod scan;
pub mod stability;
pub mod traits;

pub use analysis::{analyze, analyze_equilibria, Analysis};
pub use bifurcation::{
    sweep_bifurcation, BifurcationDiagram, BifurcationPoint, BifurcationSweeper, LoadingSweep,
};
pub use config::AnalysisConfig;
pub use error::{LakeError, Result};
pub use model::{rate as evaluate_rate, rate_derivative as evaluate_derivative, LakeParameters};
pub use scan::{find_fixed_points, ScanInterval, ScanSettings};
pub use stability::{classify_stability, FixedPoint, Stability};
