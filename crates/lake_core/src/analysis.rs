//! Combined analysis: classified equilibria at the configured loading plus the
//! loading sweep, computed from one [`AnalysisConfig`].

use crate::bifurcation::{sweep_bifurcation_with, BifurcationDiagram};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::model::LakeParameters;
use crate::regime::TrophicRegime;
use crate::scan::{find_fixed_points_with, ScanInterval, ScanSettings};
use crate::stability::{classify_fixed_point, FixedPoint};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedFixedPoint {
    #[serde(flatten)]
    pub point: FixedPoint,
    pub regime: Option<TrophicRegime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumReport {
    pub parameters: LakeParameters,
    pub fixed_points: Vec<ClassifiedFixedPoint>,
    /// Roots where the derivative is undefined, so no stability can be given.
    pub unclassified: Vec<f64>,
    pub brackets: usize,
    pub failed_refinements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub equilibria: EquilibriumReport,
    pub bifurcation: BifurcationDiagram,
}

/// Finds and classifies every fixed point of `params` over `interval`.
///
/// A root that cannot be classified is listed in `unclassified` and does not
/// affect the others.
pub fn analyze_equilibria(
    params: &LakeParameters,
    interval: &ScanInterval,
    settings: &ScanSettings,
) -> Result<EquilibriumReport> {
    let scan = find_fixed_points_with(params, interval, settings)?;
    let mut fixed_points = Vec::with_capacity(scan.roots.len());
    let mut unclassified = Vec::new();
    for &root in &scan.roots {
        match classify_fixed_point(root, params) {
            Ok(point) => fixed_points.push(ClassifiedFixedPoint {
                point,
                regime: TrophicRegime::of(&point, params),
            }),
            Err(err) => {
                warn!(state = root, error = %err, "leaving fixed point unclassified");
                unclassified.push(root);
            }
        }
    }

    Ok(EquilibriumReport {
        parameters: *params,
        fixed_points,
        unclassified,
        brackets: scan.brackets,
        failed_refinements: scan.failed_refinements,
    })
}

pub fn analyze(config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;
    let interval = config.interval.scan_interval()?;
    let sweep = config.sweep.loading_sweep()?;

    let equilibria = analyze_equilibria(&config.parameters, &interval, &config.settings)?;
    let bifurcation =
        sweep_bifurcation_with(&config.parameters, &sweep, &interval, &config.settings)?;

    Ok(Analysis {
        equilibria,
        bifurcation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntervalSpec;
    use crate::error::LakeError;
    use crate::stability::Stability;

    #[test]
    fn bistable_report_labels_both_regimes() {
        let params = LakeParameters::default().with_loading(0.3);
        let report =
            analyze_equilibria(&params, &ScanInterval::reference(), &ScanSettings::default())
                .expect("analysis");

        let regimes: Vec<Option<TrophicRegime>> =
            report.fixed_points.iter().map(|p| p.regime).collect();
        assert_eq!(
            regimes,
            vec![
                Some(TrophicRegime::Oligotrophic),
                None,
                Some(TrophicRegime::Eutrophic)
            ]
        );
        assert_eq!(report.fixed_points[1].point.stability, Stability::Unstable);
        assert_eq!(report.brackets, 3);
        assert_eq!(report.failed_refinements, 0);
        assert!(report.unclassified.is_empty());
    }

    #[test]
    fn undefined_derivative_leaves_other_points_classified() {
        // q < 1 has an infinite slope at P = 0, which is an exact root at L = 0.
        let params = LakeParameters::new(0.0, 1.0, 0.7, 1.0, 0.5);
        let settings = ScanSettings {
            detect_exact_zeros: true,
            ..ScanSettings::default()
        };
        let report = analyze_equilibria(&params, &ScanInterval::reference(), &settings)
            .expect("analysis");

        assert_eq!(report.unclassified, vec![0.0]);
        assert_eq!(report.fixed_points.len(), 1);
        let point = report.fixed_points[0].point;
        assert!(point.state > 0.5 && point.state < 0.8, "state {}", point.state);
        assert_eq!(point.stability, Stability::Stable);
    }

    #[test]
    fn analyze_runs_both_views_from_config() {
        let config = AnalysisConfig {
            sweep: IntervalSpec::new(0.0, 2.0, 25),
            ..AnalysisConfig::default()
        };
        let analysis = analyze(&config).expect("analysis");

        assert_eq!(analysis.equilibria.fixed_points.len(), 1);
        assert_eq!(
            analysis.equilibria.fixed_points[0].regime,
            Some(TrophicRegime::Eutrophic)
        );
        assert_eq!(analysis.bifurcation.sweep.len(), 25);
    }

    #[test]
    fn analyze_rejects_degenerate_parameters() {
        let mut config = AnalysisConfig::default();
        config.parameters.half_saturation = 0.0;
        assert!(matches!(
            analyze(&config),
            Err(LakeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn classified_points_serialize_flat() {
        let point = ClassifiedFixedPoint {
            point: FixedPoint {
                state: 0.5,
                slope: -0.25,
                stability: Stability::Stable,
            },
            regime: Some(TrophicRegime::Oligotrophic),
        };
        let value = serde_json::to_value(point).expect("serialize");
        assert_eq!(value["state"], 0.5);
        assert_eq!(value["stability"], "Stable");
        assert_eq!(value["regime"], "Oligotrophic");
    }
}
