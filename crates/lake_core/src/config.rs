use crate::bifurcation::LoadingSweep;
use crate::error::Result;
use crate::model::LakeParameters;
use crate::scan::{ScanInterval, ScanSettings};
use serde::{Deserialize, Serialize};

/// Evenly spaced samples from `min` to `max` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalSpec {
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl IntervalSpec {
    pub fn new(min: f64, max: f64, samples: usize) -> Self {
        Self { min, max, samples }
    }

    pub fn scan_interval(&self) -> Result<ScanInterval> {
        ScanInterval::uniform(self.min, self.max, self.samples)
    }

    pub fn loading_sweep(&self) -> Result<LoadingSweep> {
        LoadingSweep::uniform(self.min, self.max, self.samples)
    }
}

/// Every input of a full analysis. Missing fields take the reference values:
/// the default parameter set, 1000 state samples over `[0, 4]` and 250
/// loadings over `[0, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub parameters: LakeParameters,
    pub interval: IntervalSpec,
    pub sweep: IntervalSpec,
    pub settings: ScanSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parameters: LakeParameters::default(),
            interval: IntervalSpec::new(
                ScanInterval::REFERENCE_MIN,
                ScanInterval::REFERENCE_MAX,
                ScanInterval::REFERENCE_SAMPLES,
            ),
            sweep: IntervalSpec::new(
                LoadingSweep::REFERENCE_MIN,
                LoadingSweep::REFERENCE_MAX,
                LoadingSweep::REFERENCE_SAMPLES,
            ),
            settings: ScanSettings::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.parameters.validate()?;
        self.settings.validate()?;
        self.interval.scan_interval()?;
        self.sweep.loading_sweep()?;
        Ok(())
    }
}
