#![warn(missing_docs)]
//! The search over all candidates of a lens train [`Topology`].
//!
//! Every combination of focal lengths is an independent unit of work which sweeps the full gap grid. The units are
//! distributed over a thread pool and their accepted [`Solution`]s are concatenated afterwards.
//!
//! ## Example
//!
//! ```rust
//! use efl_finder::{
//!     beam::InputBeam,
//!     distance_grid::{DistanceGrid, GapRange},
//!     millimeter, milliradian, nanometer,
//!     search::{Search, SearchConfig},
//!     topology::TwoLens,
//! };
//!
//! let gap = GapRange::new(
//!     DistanceGrid::new(millimeter!(10.0), millimeter!(60.0), millimeter!(10.0)).unwrap(),
//!     2.5,
//! )
//! .unwrap();
//! let topology = TwoLens::new(&millimeter!(-100.0, -50.0), &millimeter!(50.0, 100.0), gap).unwrap();
//! let config = SearchConfig::new(
//!     millimeter!(200.0),
//!     millimeter!(400.0),
//!     nanometer!(253.0),
//!     InputBeam::new(millimeter!(4.0), milliradian!(0.4)).unwrap(),
//!     2.0,
//! )
//! .unwrap();
//! let report = Search::new(config).unwrap().run(&topology).unwrap();
//! assert_eq!(report.solutions().len(), 1);
//! ```
use crate::{
    beam::{BeamParameter, InputBeam},
    error::{EflError, EflResult},
    filter::{evaluate, FilterContext, Rejection, RejectionTally, Verdict},
    parallel::parallel_map,
    solution::Solution,
    topology::{FocalCombination, GapGrid, Topology},
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use uom::si::{f64::Length, length::millimeter};

fn default_efl_tolerance() -> Length {
    Length::new::<millimeter>(1.0)
}
const fn default_prefilter() -> bool {
    true
}

/// Immutable configuration of a [`Search`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    target_efl: Length,
    #[serde(default = "default_efl_tolerance")]
    efl_tolerance: Length,
    enclosure_length: Length,
    wavelength: Length,
    input_beam: InputBeam,
    clipping_margin: f64,
    #[serde(default = "default_prefilter")]
    prefilter: bool,
    #[serde(default)]
    nr_of_threads: Option<usize>,
}
impl SearchConfig {
    /// Create a new [`SearchConfig`].
    ///
    /// - `target_efl`: the effective focal length to find.
    /// - `enclosure_length`: the (exclusive) upper limit of all gaps plus the back principal plane distance.
    /// - `wavelength`: the operating wavelength.
    /// - `input_beam`: the beam at the entrance of the first lens.
    /// - `clipping_margin`: the beam radius on every lens must stay below `clipping_margin` times the input beam
    ///   radius.
    ///
    /// The EFL tolerance defaults to 1 mm, the gap grid pre-filter is switched on and all available cores are used.
    ///
    /// # Errors
    ///
    /// This function returns an error if the configuration is invalid (see [`SearchConfig::validate`]).
    pub fn new(
        target_efl: Length,
        enclosure_length: Length,
        wavelength: Length,
        input_beam: InputBeam,
        clipping_margin: f64,
    ) -> EflResult<Self> {
        let config = Self {
            target_efl,
            efl_tolerance: default_efl_tolerance(),
            enclosure_length,
            wavelength,
            input_beam,
            clipping_margin,
            prefilter: default_prefilter(),
            nr_of_threads: None,
        };
        config.validate()?;
        Ok(config)
    }
    /// Set the absolute tolerance of the effective focal length.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if the tolerance is negative or not finite.
    pub fn with_efl_tolerance(mut self, efl_tolerance: Length) -> EflResult<Self> {
        self.efl_tolerance = efl_tolerance;
        self.validate()?;
        Ok(self)
    }
    /// Switch the gap grid pre-filter on or off. The pre-filter only reduces the number of evaluated candidates.
    #[must_use]
    pub fn with_prefilter(mut self, prefilter: bool) -> Self {
        self.prefilter = prefilter;
        self
    }
    /// Set the number of worker threads.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if `nr_of_threads` is zero.
    pub fn with_nr_of_threads(mut self, nr_of_threads: usize) -> EflResult<Self> {
        self.nr_of_threads = Some(nr_of_threads);
        self.validate()?;
        Ok(self)
    }
    /// Check this [`SearchConfig`].
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if
    ///   - the target EFL, the enclosure length or the wavelength is not positive and finite.
    ///   - the EFL tolerance is negative or not finite.
    ///   - the clipping margin is not larger than 1.0 or not finite.
    ///   - the number of threads is zero.
    ///   - the input beam is invalid or has no valid beam parameter at the given wavelength.
    pub fn validate(&self) -> EflResult<()> {
        for (name, value) in [
            ("target EFL", self.target_efl),
            ("enclosure length", self.enclosure_length),
            ("wavelength", self.wavelength),
        ] {
            let value = value.get::<millimeter>();
            if !value.is_normal() || value.is_sign_negative() {
                return Err(EflError::Configuration(format!(
                    "{name} must be > 0.0 and finite"
                )));
            }
        }
        let tolerance = self.efl_tolerance.get::<millimeter>();
        if !tolerance.is_finite() || tolerance.is_sign_negative() {
            return Err(EflError::Configuration(
                "EFL tolerance must be >= 0.0 and finite".into(),
            ));
        }
        if !self.clipping_margin.is_finite() || self.clipping_margin <= 1.0 {
            return Err(EflError::Configuration(
                "clipping margin must be > 1.0 and finite".into(),
            ));
        }
        if self.nr_of_threads == Some(0) {
            return Err(EflError::Configuration(
                "number of threads must be > 0".into(),
            ));
        }
        self.input_beam.validate()?;
        BeamParameter::from_input_beam(&self.input_beam, self.wavelength)
            .map_err(|e| EflError::Configuration(format!("invalid input beam: {e}")))?;
        Ok(())
    }
    /// Returns the target effective focal length.
    #[must_use]
    pub fn target_efl(&self) -> Length {
        self.target_efl
    }
    /// Returns the absolute tolerance of the effective focal length.
    #[must_use]
    pub fn efl_tolerance(&self) -> Length {
        self.efl_tolerance
    }
    /// Returns the enclosure length.
    #[must_use]
    pub fn enclosure_length(&self) -> Length {
        self.enclosure_length
    }
    /// Returns the wavelength.
    #[must_use]
    pub fn wavelength(&self) -> Length {
        self.wavelength
    }
    /// Returns the [`InputBeam`].
    #[must_use]
    pub const fn input_beam(&self) -> &InputBeam {
        &self.input_beam
    }
    /// Returns the clipping margin.
    #[must_use]
    pub const fn clipping_margin(&self) -> f64 {
        self.clipping_margin
    }
    /// Returns whether the gap grid pre-filter is used.
    #[must_use]
    pub const fn prefilter(&self) -> bool {
        self.prefilter
    }
    /// Returns the number of worker threads. `None` means one thread per core.
    #[must_use]
    pub const fn nr_of_threads(&self) -> Option<usize> {
        self.nr_of_threads
    }
}

/// Counters of a finished search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchStatistics {
    /// number of focal length combinations
    pub nr_of_units: usize,
    /// number of evaluated candidates
    pub nr_of_candidates: usize,
    /// number of accepted candidates
    pub nr_of_accepted: usize,
    /// rejected candidates per reason
    pub rejections: RejectionTally,
}

/// Result of a [`Search`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchReport {
    solutions: Vec<Solution>,
    statistics: SearchStatistics,
}
impl SearchReport {
    /// Returns the accepted solutions.
    ///
    /// The solutions of different units of work are not ordered. Use [`SearchReport::sorted_solutions`] if a
    /// defined order is needed.
    #[must_use]
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }
    /// Returns the accepted solutions sorted by `(f1, f2, f3, d1, d2)`.
    #[must_use]
    pub fn sorted_solutions(&self) -> Vec<Solution> {
        let mut solutions = self.solutions.clone();
        solutions.sort_by(Solution::cmp_by_key);
        solutions
    }
    /// Returns the [`SearchStatistics`].
    #[must_use]
    pub const fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }
}

/// Accepted solutions and counters of a single unit of work.
#[derive(Default)]
struct UnitResult {
    solutions: Vec<Solution>,
    rejections: RejectionTally,
    nr_of_candidates: usize,
}

/// A search for lens systems with a given effective focal length.
#[derive(Clone, Debug)]
pub struct Search {
    config: SearchConfig,
}
impl Search {
    /// Create a new [`Search`] using the given [`SearchConfig`].
    ///
    /// # Errors
    ///
    /// This function returns an error if the configuration is invalid.
    pub fn new(config: SearchConfig) -> EflResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }
    /// Returns the [`SearchConfig`] of this [`Search`].
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }
    /// Evaluate every candidate of the given [`Topology`].
    ///
    /// # Errors
    ///
    /// This function returns an error if
    ///   - the configuration is invalid ([`EflError::Configuration`]).
    ///   - a unit of work failed ([`EflError::Worker`]). No partial result is returned in this case.
    pub fn run<T: Topology + ?Sized>(&self, topology: &T) -> EflResult<SearchReport> {
        let context = FilterContext::new(&self.config)?;
        let grid = topology.gap_grid(self.config.prefilter());
        let units = topology.focal_combinations();
        let nr_of_units = units.len();
        info!(
            "starting {} search: {nr_of_units} focal length combinations, {} candidates",
            topology.name(),
            nr_of_units * grid.nr_of_points()
        );
        let results = parallel_map(units, self.config.nr_of_threads(), |combination| {
            evaluate_unit(topology, combination, &grid, &context)
        })?;
        let mut report = SearchReport {
            statistics: SearchStatistics {
                nr_of_units,
                ..SearchStatistics::default()
            },
            ..SearchReport::default()
        };
        for result in results {
            report.statistics.nr_of_candidates += result.nr_of_candidates;
            report.statistics.rejections.merge(&result.rejections);
            report.solutions.extend(result.solutions);
        }
        report.statistics.nr_of_accepted = report.solutions.len();
        if report.solutions.is_empty() {
            warn!("search finished without any solution");
        }
        info!(
            "search finished: {} of {} candidates accepted",
            report.statistics.nr_of_accepted, report.statistics.nr_of_candidates
        );
        for rejection in Rejection::iter() {
            debug!(
                "rejected ({rejection}): {}",
                report.statistics.rejections.count(rejection)
            );
        }
        Ok(report)
    }
}

fn evaluate_unit<T: Topology + ?Sized>(
    topology: &T,
    combination: FocalCombination,
    grid: &GapGrid,
    context: &FilterContext,
) -> UnitResult {
    let mut result = UnitResult::default();
    for candidate in topology.candidates(combination, grid) {
        result.nr_of_candidates += 1;
        match evaluate(topology, &candidate, context) {
            Verdict::Accept(solution) => result.solutions.push(solution),
            Verdict::Reject(rejection) => result.rejections.add(rejection),
        }
    }
    result
}
