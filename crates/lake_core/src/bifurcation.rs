//! Loading sweeps: the root scanner repeated across a sequence of loadings,
//! accumulated into a `(loading, state)` point cloud.
//!
//! Every loading is scanned independently with the same interval and
//! settings. Nothing is merged across loadings, so nearby loadings produce
//! nearby points and the branch structure (including hysteresis) is read
//! off the density of the cloud.

use crate::error::{invalid_input, Result};
use crate::model::LakeParameters;
use crate::scan::{linspace, scan_fixed_points, FixedPointScan, ScanInterval, ScanSettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadingSweep {
    loadings: Vec<f64>,
}

impl LoadingSweep {
    pub const REFERENCE_MIN: f64 = 0.0;
    pub const REFERENCE_MAX: f64 = 2.0;
    pub const REFERENCE_SAMPLES: usize = 250;

    pub fn uniform(min: f64, max: f64, samples: usize) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(invalid_input("Loading sweep bounds must be finite."));
        }
        if samples == 0 {
            return Err(invalid_input("Loading sweep needs at least one sample."));
        }
        if min > max {
            return Err(invalid_input(format!(
                "Loading sweep must satisfy min <= max (got [{min}, {max}])."
            )));
        }
        Ok(Self {
            loadings: linspace(min, max, samples),
        })
    }

    /// Any finite, non-empty sequence; it does not have to be monotone.
    pub fn from_values(loadings: Vec<f64>) -> Result<Self> {
        if loadings.is_empty() {
            return Err(invalid_input("Loading sweep needs at least one sample."));
        }
        if let Some(bad) = loadings.iter().find(|l| !l.is_finite()) {
            return Err(invalid_input(format!(
                "Loading sweep values must be finite (got {bad})."
            )));
        }
        Ok(Self { loadings })
    }

    /// 250 loadings over `[0, 2]`.
    pub fn reference() -> Self {
        Self {
            loadings: linspace(
                Self::REFERENCE_MIN,
                Self::REFERENCE_MAX,
                Self::REFERENCE_SAMPLES,
            ),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.loadings
    }

    pub fn len(&self) -> usize {
        self.loadings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loadings.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BifurcationPoint {
    pub loading: f64,
    pub state: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BifurcationDiagram {
    /// Ordered by sweep position, then by ascending state.
    pub points: Vec<BifurcationPoint>,
    /// Loadings scanned so far, in sweep order.
    pub sweep: Vec<f64>,
    /// Number of roots found at each entry of `sweep`.
    pub root_counts: Vec<usize>,
    pub failed_refinements: usize,
}

impl BifurcationDiagram {
    fn with_capacity(loadings: usize) -> Self {
        Self {
            points: Vec::with_capacity(loadings * 3),
            sweep: Vec::with_capacity(loadings),
            root_counts: Vec::with_capacity(loadings),
            failed_refinements: 0,
        }
    }

    fn record(&mut self, loading: f64, scan: FixedPointScan) {
        self.sweep.push(loading);
        self.root_counts.push(scan.roots.len());
        self.failed_refinements += scan.failed_refinements;
        self.points.extend(
            scan.roots
                .into_iter()
                .map(|state| BifurcationPoint { loading, state }),
        );
    }

    pub fn point_loadings(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.loading).collect()
    }

    pub fn point_states(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.state).collect()
    }

    /// Maximal runs of consecutive sweep entries with at least three roots,
    /// as `(first_loading, last_loading)`. Resolution is the sweep grid.
    pub fn multistable_ranges(&self) -> Vec<(f64, f64)> {
        let mut ranges = Vec::new();
        let mut start: Option<usize> = None;
        for (idx, &count) in self.root_counts.iter().enumerate() {
            match (count >= 3, start) {
                (true, None) => start = Some(idx),
                (false, Some(first)) => {
                    ranges.push((self.sweep[first], self.sweep[idx - 1]));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = start {
            ranges.push((self.sweep[first], self.sweep[self.sweep.len() - 1]));
        }
        ranges
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepProgress {
    pub done: bool,
    pub completed: usize,
    pub total: usize,
    pub points: usize,
}

/// Stepped sweep. Each step scans one loading, so a caller can report
/// progress between batches or stop early and keep the partial diagram.
#[derive(Debug, Clone)]
pub struct BifurcationSweeper {
    template: LakeParameters,
    sweep: LoadingSweep,
    interval: ScanInterval,
    settings: ScanSettings,
    next: usize,
    diagram: BifurcationDiagram,
}

impl BifurcationSweeper {
    pub fn new(
        template: LakeParameters,
        sweep: LoadingSweep,
        interval: ScanInterval,
        settings: ScanSettings,
    ) -> Result<Self> {
        template.validate()?;
        settings.validate()?;
        let diagram = BifurcationDiagram::with_capacity(sweep.len());
        Ok(Self {
            template,
            sweep,
            interval,
            settings,
            next: 0,
            diagram,
        })
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.sweep.len()
    }

    pub fn run_steps(&mut self, batch_size: usize) -> SweepProgress {
        for _ in 0..batch_size {
            if self.is_done() {
                break;
            }
            let loading = self.sweep.values()[self.next];
            let scan = scan_loading(&self.template, loading, &self.interval, &self.settings);
            self.diagram.record(loading, scan);
            self.next += 1;
        }
        let progress = self.progress();
        debug!(
            completed = progress.completed,
            total = progress.total,
            points = progress.points,
            "bifurcation sweep progressed"
        );
        progress
    }

    pub fn progress(&self) -> SweepProgress {
        SweepProgress {
            done: self.is_done(),
            completed: self.next,
            total: self.sweep.len(),
            points: self.diagram.points.len(),
        }
    }

    pub fn diagram(&self) -> &BifurcationDiagram {
        &self.diagram
    }

    pub fn into_diagram(self) -> BifurcationDiagram {
        self.diagram
    }
}

fn scan_loading(
    template: &LakeParameters,
    loading: f64,
    interval: &ScanInterval,
    settings: &ScanSettings,
) -> FixedPointScan {
    scan_fixed_points(&template.with_loading(loading), interval, settings)
}

/// Scans every loading of `sweep` with `template`'s remaining parameters.
pub fn sweep_bifurcation(
    template: &LakeParameters,
    sweep: &LoadingSweep,
    interval: &ScanInterval,
) -> Result<BifurcationDiagram> {
    sweep_bifurcation_with(template, sweep, interval, &ScanSettings::default())
}

pub fn sweep_bifurcation_with(
    template: &LakeParameters,
    sweep: &LoadingSweep,
    interval: &ScanInterval,
    settings: &ScanSettings,
) -> Result<BifurcationDiagram> {
    template.validate()?;
    settings.validate()?;

    let mut diagram = BifurcationDiagram::with_capacity(sweep.len());
    for &loading in sweep.values() {
        diagram.record(loading, scan_loading(template, loading, interval, settings));
    }
    debug!(
        loadings = sweep.len(),
        points = diagram.points.len(),
        failed_refinements = diagram.failed_refinements,
        "bifurcation sweep finished"
    );
    Ok(diagram)
}

/// Same result as [`sweep_bifurcation_with`], one rayon task per loading.
#[cfg(feature = "parallel")]
pub fn sweep_bifurcation_parallel(
    template: &LakeParameters,
    sweep: &LoadingSweep,
    interval: &ScanInterval,
    settings: &ScanSettings,
) -> Result<BifurcationDiagram> {
    use rayon::prelude::*;

    template.validate()?;
    settings.validate()?;

    let scans: Vec<FixedPointScan> = sweep
        .values()
        .par_iter()
        .map(|&loading| scan_loading(template, loading, interval, settings))
        .collect();

    let mut diagram = BifurcationDiagram::with_capacity(sweep.len());
    for (&loading, scan) in sweep.values().iter().zip(scans) {
        diagram.record(loading, scan);
    }
    Ok(diagram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LakeError;

    fn reference_diagram() -> BifurcationDiagram {
        sweep_bifurcation(
            &LakeParameters::default(),
            &LoadingSweep::reference(),
            &ScanInterval::reference(),
        )
        .expect("reference sweep")
    }

    #[test]
    fn reference_sweep_covers_every_loading() {
        let diagram = reference_diagram();
        assert_eq!(diagram.sweep.len(), 250);
        assert_eq!(diagram.root_counts.len(), 250);
        assert_eq!(diagram.sweep[0], 0.0);
        assert_eq!(diagram.sweep[249], 2.0);
        assert_eq!(
            diagram.points.len(),
            diagram.root_counts.iter().sum::<usize>()
        );
        assert_eq!(diagram.failed_refinements, 0);
    }

    #[test]
    fn root_count_folds_from_three_to_one() {
        let diagram = reference_diagram();
        let counts = &diagram.root_counts;
        assert_eq!(counts.iter().copied().max(), Some(3));

        let last_three = counts
            .iter()
            .rposition(|&count| count == 3)
            .expect("bistable window should exist");
        assert_eq!(counts[last_three + 1], 1);
        assert!(counts[last_three + 1..].iter().all(|&count| count <= 1));

        let fold_loading = diagram.sweep[last_three + 1];
        assert!(
            fold_loading > 0.4 && fold_loading < 0.46,
            "unexpected fold loading {fold_loading}"
        );
    }

    #[test]
    fn lowest_root_rises_with_loading_inside_the_window() {
        let diagram = reference_diagram();
        let mut lowest = Vec::new();
        for (idx, &loading) in diagram.sweep.iter().enumerate() {
            if diagram.root_counts[idx] == 3 {
                let low = diagram
                    .points
                    .iter()
                    .filter(|p| p.loading == loading)
                    .map(|p| p.state)
                    .fold(f64::INFINITY, f64::min);
                lowest.push(low);
            }
        }
        assert!(lowest.len() > 10);
        for pair in lowest.windows(2) {
            assert!(pair[1] > pair[0], "lowest root did not rise: {pair:?}");
        }
    }

    #[test]
    fn multistable_ranges_report_the_hysteresis_window() {
        let ranges = reference_diagram().multistable_ranges();
        assert_eq!(ranges.len(), 1, "ranges: {ranges:?}");
        let (start, end) = ranges[0];
        assert!(start > 0.0 && start < 0.05, "window start {start}");
        assert!(end > 0.4 && end < 0.45, "window end {end}");
    }

    #[test]
    fn no_merging_across_loadings() {
        let sweep = LoadingSweep::from_values(vec![0.3, 0.3]).expect("sweep");
        let diagram =
            sweep_bifurcation(&LakeParameters::default(), &sweep, &ScanInterval::reference())
                .expect("sweep");
        assert_eq!(diagram.points.len(), 6);
        assert_eq!(diagram.points[..3], diagram.points[3..]);
    }

    #[test]
    fn stepped_runner_matches_one_shot_sweep() {
        let template = LakeParameters::default();
        let sweep = LoadingSweep::uniform(0.0, 1.0, 40).expect("sweep");
        let interval = ScanInterval::reference();
        let expected = sweep_bifurcation(&template, &sweep, &interval).expect("sweep");

        let mut runner = BifurcationSweeper::new(
            template,
            sweep,
            interval,
            ScanSettings::default(),
        )
        .expect("runner");
        let progress = runner.run_steps(15);
        assert!(!progress.done);
        assert_eq!(progress.completed, 15);
        assert_eq!(progress.total, 40);
        assert_eq!(runner.diagram().sweep.len(), 15);

        while !runner.is_done() {
            runner.run_steps(15);
        }
        let progress = runner.run_steps(15);
        assert!(progress.done);
        assert_eq!(progress.completed, 40);
        assert_eq!(runner.into_diagram(), expected);
    }

    #[test]
    fn invalid_inputs_fail_fast() {
        assert!(matches!(
            LoadingSweep::from_values(Vec::new()),
            Err(LakeError::InvalidInput(_))
        ));
        assert!(matches!(
            LoadingSweep::from_values(vec![0.1, f64::NAN]),
            Err(LakeError::InvalidInput(_))
        ));
        assert!(matches!(
            LoadingSweep::uniform(1.0, 0.0, 10),
            Err(LakeError::InvalidInput(_))
        ));

        let degenerate = LakeParameters::new(0.45, 1.0, 0.7, 1.0, -2.0);
        let result = sweep_bifurcation(
            &degenerate,
            &LoadingSweep::reference(),
            &ScanInterval::reference(),
        );
        assert!(matches!(result, Err(LakeError::InvalidParameter(_))));
    }

    #[test]
    fn multistable_ranges_close_at_sweep_end() {
        let diagram = BifurcationDiagram {
            points: Vec::new(),
            sweep: vec![0.0, 0.1, 0.2, 0.3, 0.4],
            root_counts: vec![3, 1, 3, 3, 3],
            failed_refinements: 0,
        };
        assert_eq!(diagram.multistable_ranges(), vec![(0.0, 0.0), (0.2, 0.4)]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_sweep_matches_sequential() {
        let template = LakeParameters::default();
        let sweep = LoadingSweep::reference();
        let interval = ScanInterval::reference();
        let settings = ScanSettings::default();
        let sequential =
            sweep_bifurcation_with(&template, &sweep, &interval, &settings).expect("sweep");
        let parallel =
            sweep_bifurcation_parallel(&template, &sweep, &interval, &settings).expect("sweep");
        assert_eq!(sequential, parallel);
    }
}
