#![warn(missing_docs)]
//! Lens train topologies
//!
//! A topology defines the fixed sequence of lenses and gaps of a lens system: which focal lengths may be
//! used at which position, which gap distances are swept and how the ABCD matrix of a single
//! [`Candidate`] is calculated. The search itself only works on the [`Topology`] trait.
//!
//! ## Example
//!
//! ```rust
//! use efl_finder::{millimeter, distance_grid::{DistanceGrid, GapRange}, topology::{Topology, TwoLens}};
//!
//! let gap = GapRange::new(
//!   DistanceGrid::new(millimeter!(10.0), millimeter!(60.0), millimeter!(10.0)).unwrap(),
//!   2.5).unwrap();
//! let topology = TwoLens::new(&millimeter!(-100.0, -50.0), &millimeter!(50.0, 100.0), gap).unwrap();
//! assert_eq!(topology.focal_combinations().len(), 4);
//! assert_eq!(topology.nr_of_candidates(&topology.gap_grid(false)), 20);
//! ```
use crate::{
    error::{EflError, EflResult},
    ray_transfer::LensSystem,
};
use log::warn;
use uom::si::{f64::Length, length::millimeter};

mod three_lens;
mod two_lens;

pub use three_lens::ThreeLens;
pub use two_lens::TwoLens;

/// A single lens system to be evaluated. All values in millimeters.
///
/// `f3` and `d2` are only set for three-lens systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// focal length of the first lens
    pub f1: f64,
    /// focal length of the second lens
    pub f2: f64,
    /// focal length of the third lens
    pub f3: Option<f64>,
    /// distance between the first and the second lens
    pub d1: f64,
    /// distance between the second and the third lens
    pub d2: Option<f64>,
}
impl Candidate {
    /// Returns the summed length of all gaps.
    #[must_use]
    pub fn total_gap_length(&self) -> f64 {
        self.d1 + self.d2.unwrap_or_default()
    }
}

/// One combination of focal lengths (in mm). This is the unit of work of a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocalCombination {
    /// focal length of the first lens
    pub f1: f64,
    /// focal length of the second lens
    pub f2: f64,
    /// focal length of the third lens (three-lens systems only)
    pub f3: Option<f64>,
}

/// The gap distances (in mm) swept for every [`FocalCombination`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GapGrid {
    /// distances between the first and the second lens
    pub d1: Vec<f64>,
    /// distances between the second and the third lens (three-lens systems only)
    pub d2: Option<Vec<f64>>,
}
impl GapGrid {
    /// Returns the number of gap combinations of this [`GapGrid`].
    #[must_use]
    pub fn nr_of_points(&self) -> usize {
        self.d1.len() * self.d2.as_ref().map_or(1, Vec::len)
    }
}

/// Strategy describing a fixed lens train topology.
///
/// Implementations must be free of interior mutability since a single topology is shared between all
/// worker threads of a search.
pub trait Topology: Sync {
    /// Returns a short name of this topology used for logging.
    fn name(&self) -> &'static str;
    /// Returns all combinations of focal lengths (the cartesian product of the focal length sets).
    fn focal_combinations(&self) -> Vec<FocalCombination>;
    /// Returns the gap distances to sweep.
    ///
    /// If `prefilter` is set, all distances are dropped which exceed the gap limit of the largest focal length
    /// of the lens in front of the gap. Such distances would be rejected by [`Topology::gaps_within_limits`] anyway.
    fn gap_grid(&self, prefilter: bool) -> GapGrid;
    /// Enumerate all candidates of the given focal length combination. The first gap is the outer loop.
    fn candidates<'a>(
        &'a self,
        combination: FocalCombination,
        grid: &'a GapGrid,
    ) -> Box<dyn Iterator<Item = Candidate> + 'a>;
    /// Check the geometric gap limits (`d_k <= ratio_k · |f_k|`) of the given [`Candidate`].
    fn gaps_within_limits(&self, candidate: &Candidate) -> bool;
    /// Calculate the [`LensSystem`] of the given [`Candidate`].
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if the system is undefined (zero focal length, afocal system).
    fn compute_system(&self, candidate: &Candidate) -> EflResult<LensSystem>;
    /// Returns the total number of candidates for the given [`GapGrid`].
    fn nr_of_candidates(&self, grid: &GapGrid) -> usize {
        self.focal_combinations().len() * grid.nr_of_points()
    }
}

/// Convert and check the focal length set of the lens at position `lens` (1-based).
///
/// Zero and infinite focal lengths are legal. Zero focal lengths only produce rejected candidates while
/// infinite focal lengths act as transparent placeholders.
fn focal_set(lens: usize, focal_lengths: &[Length]) -> EflResult<Vec<f64>> {
    if focal_lengths.is_empty() {
        return Err(EflError::Configuration(format!(
            "focal length set of lens {lens} must not be empty"
        )));
    }
    let focal_lengths: Vec<f64> = focal_lengths
        .iter()
        .map(|f| f.get::<millimeter>())
        .collect();
    if focal_lengths.iter().any(|f| f.is_nan()) {
        return Err(EflError::Configuration(format!(
            "focal length set of lens {lens} contains NaN"
        )));
    }
    if focal_lengths.iter().any(|f| *f == 0.0) {
        warn!("focal length set of lens {lens} contains a focal length of 0 mm. All candidates using it will be rejected.");
    }
    if focal_lengths.iter().any(|f| f.is_infinite()) {
        warn!("focal length set of lens {lens} contains an infinite focal length. This lens acts as a placeholder.");
    }
    Ok(focal_lengths)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{millimeter, utils::test_helper::test_helper::check_warnings};
    use assert_matches::assert_matches;
    #[test]
    fn total_gap_length() {
        let mut candidate = Candidate {
            f1: -100.0,
            f2: 100.0,
            f3: None,
            d1: 50.0,
            d2: None,
        };
        assert_eq!(candidate.total_gap_length(), 50.0);
        candidate.d2 = Some(20.0);
        assert_eq!(candidate.total_gap_length(), 70.0);
    }
    #[test]
    fn gap_grid_nr_of_points() {
        assert_eq!(GapGrid::default().nr_of_points(), 0);
        let grid = GapGrid {
            d1: vec![1.0, 2.0, 3.0],
            d2: None,
        };
        assert_eq!(grid.nr_of_points(), 3);
        let grid = GapGrid {
            d1: vec![1.0, 2.0, 3.0],
            d2: Some(vec![1.0, 2.0]),
        };
        assert_eq!(grid.nr_of_points(), 6);
        let grid = GapGrid {
            d1: vec![1.0, 2.0, 3.0],
            d2: Some(vec![]),
        };
        assert_eq!(grid.nr_of_points(), 0);
    }
    #[test]
    fn focal_set_ok() {
        testing_logger::setup();
        assert_eq!(
            focal_set(1, &millimeter!(-100.0, 50.0)).unwrap(),
            vec![-100.0, 50.0]
        );
        check_warnings(vec![]);
    }
    #[test]
    fn focal_set_wrong() {
        assert_matches!(focal_set(1, &[]), Err(EflError::Configuration(_)));
        assert_matches!(
            focal_set(2, &millimeter!(100.0, f64::NAN)),
            Err(EflError::Configuration(_))
        );
    }
    #[test]
    fn focal_set_warnings() {
        testing_logger::setup();
        assert!(focal_set(2, &millimeter!(0.0, f64::INFINITY)).is_ok());
        check_warnings(vec![
            "focal length set of lens 2 contains a focal length of 0 mm. All candidates using it will be rejected.",
            "focal length set of lens 2 contains an infinite focal length. This lens acts as a placeholder.",
        ]);
    }
}
