#![warn(missing_docs)]
//! Regularly spaced distance grids for the lens separations.
use crate::{
    error::{EflError, EflResult},
    utils::{f64_to_usize, usize_to_f64},
};
use log::warn;
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::millimeter};

/// Default ratio between the first gap and the magnitude of the focal length of the first lens.
pub const DEFAULT_FIRST_GAP_RATIO: f64 = 2.5;
/// Default ratio between the second gap and the magnitude of the focal length of the second lens.
pub const DEFAULT_SECOND_GAP_RATIO: f64 = 1.0;

/// Grid points closer to `stop` than this fraction of the step are treated as `stop` itself.
const STOP_TOLERANCE: f64 = 1e-9;

/// Regularly spaced grid of distances `start, start + step, ...` below `stop` (`stop` itself is excluded).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceGrid {
    start: Length,
    stop: Length,
    step: Length,
}
impl DistanceGrid {
    /// Create a new [`DistanceGrid`].
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if
    ///   - one of the values is not finite.
    ///   - `start` is not positive.
    ///   - `stop` is not larger than `start`.
    ///   - `step` is not positive.
    pub fn new(start: Length, stop: Length, step: Length) -> EflResult<Self> {
        let grid = Self { start, stop, step };
        grid.validate()?;
        Ok(grid)
    }
    /// Check the parameters of this [`DistanceGrid`].
    ///
    /// # Errors
    ///
    /// This function returns an error under the same conditions as [`DistanceGrid::new`].
    pub fn validate(&self) -> EflResult<()> {
        if !self.start.is_finite() || !self.stop.is_finite() || !self.step.is_finite() {
            return Err(EflError::Configuration(
                "distance grid values must be finite".into(),
            ));
        }
        if self.start.get::<millimeter>() <= 0.0 {
            return Err(EflError::Configuration(
                "distance grid must start at a positive distance".into(),
            ));
        }
        if self.stop <= self.start {
            return Err(EflError::Configuration(
                "distance grid stop must be larger than its start".into(),
            ));
        }
        if self.step.get::<millimeter>() <= 0.0 {
            return Err(EflError::Configuration(
                "distance grid step must be > 0.0".into(),
            ));
        }
        Ok(())
    }
    /// Returns the first distance of this [`DistanceGrid`].
    #[must_use]
    pub fn start(&self) -> Length {
        self.start
    }
    /// Returns the (excluded) upper limit of this [`DistanceGrid`].
    #[must_use]
    pub fn stop(&self) -> Length {
        self.stop
    }
    /// Returns the step size of this [`DistanceGrid`].
    #[must_use]
    pub fn step(&self) -> Length {
        self.step
    }
    /// Returns the number of grid points.
    #[must_use]
    pub fn nr_of_points(&self) -> usize {
        let start = self.start.get::<millimeter>();
        let stop = self.stop.get::<millimeter>();
        let step = self.step.get::<millimeter>();
        let mut nr_of_points = f64_to_usize(((stop - start) / step).ceil());
        // uom stores meters, so a span of exactly n steps may exceed n by a rounding error
        let last_allowed = STOP_TOLERANCE.mul_add(-step, stop);
        while nr_of_points > 0 && usize_to_f64(nr_of_points - 1).mul_add(step, start) >= last_allowed {
            nr_of_points -= 1;
        }
        nr_of_points
    }
    /// Returns all grid points in millimeters.
    ///
    /// Every point is calculated as `start + i·step` so that no rounding errors accumulate.
    #[must_use]
    pub fn points(&self) -> Vec<f64> {
        let start = self.start.get::<millimeter>();
        let step = self.step.get::<millimeter>();
        (0..self.nr_of_points())
            .map(|i| usize_to_f64(i).mul_add(step, start))
            .collect()
    }
}

/// The distance grid of one gap together with its geometric limit.
///
/// A gap `d` behind a lens with focal length `f` is only considered if `d <= max_focal_ratio · |f|`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GapRange {
    grid: DistanceGrid,
    max_focal_ratio: f64,
}
impl GapRange {
    /// Create a new [`GapRange`].
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if the grid is invalid or `max_focal_ratio` is not
    /// positive and finite.
    pub fn new(grid: DistanceGrid, max_focal_ratio: f64) -> EflResult<Self> {
        let range = Self {
            grid,
            max_focal_ratio,
        };
        range.validate()?;
        Ok(range)
    }
    /// Check the parameters of this [`GapRange`].
    ///
    /// # Errors
    ///
    /// This function returns an error under the same conditions as [`GapRange::new`].
    pub fn validate(&self) -> EflResult<()> {
        self.grid.validate()?;
        if !self.max_focal_ratio.is_normal() || self.max_focal_ratio.is_sign_negative() {
            return Err(EflError::Configuration(
                "maximum gap to focal length ratio must be > 0.0 and finite".into(),
            ));
        }
        Ok(())
    }
    /// Returns the [`DistanceGrid`] of this [`GapRange`].
    #[must_use]
    pub const fn grid(&self) -> &DistanceGrid {
        &self.grid
    }
    /// Returns the maximum ratio between the gap and the focal length of the lens in front of it.
    #[must_use]
    pub const fn max_focal_ratio(&self) -> f64 {
        self.max_focal_ratio
    }
    /// Check if a gap of the given `distance` is allowed behind a lens of the given focal length (both in mm).
    #[must_use]
    pub fn allows(&self, distance: f64, focal_length: f64) -> bool {
        distance <= self.max_focal_ratio * focal_length.abs()
    }
    /// Returns the grid points (in mm).
    ///
    /// If `focal_lengths` (the set of lenses in front of this gap) is given, all points exceeding the limit of the
    /// largest focal length are dropped since no lens of the set could ever accept them.
    #[must_use]
    pub fn points(&self, focal_lengths: Option<&[f64]>) -> Vec<f64> {
        let points = self.grid.points();
        let Some(focal_lengths) = focal_lengths else {
            return points;
        };
        let max_focal = focal_lengths
            .iter()
            .map(|f| f.abs())
            .fold(0.0, f64::max);
        let nr_of_points = points.len();
        let points: Vec<f64> = points
            .into_iter()
            .filter(|d| self.allows(*d, max_focal))
            .collect();
        if points.is_empty() && nr_of_points > 0 {
            warn!("pre-filter removed all {nr_of_points} points of a gap grid. No candidate will pass.");
        }
        points
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{millimeter, utils::test_helper::test_helper::check_warnings};
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    #[test]
    fn new() {
        let grid = DistanceGrid::new(millimeter!(1.0), millimeter!(6.0), millimeter!(1.0)).unwrap();
        assert_eq!(grid.start(), millimeter!(1.0));
        assert_eq!(grid.stop(), millimeter!(6.0));
        assert_eq!(grid.step(), millimeter!(1.0));
    }
    #[test]
    fn new_wrong() {
        assert_matches!(
            DistanceGrid::new(millimeter!(0.0), millimeter!(6.0), millimeter!(1.0)),
            Err(EflError::Configuration(_))
        );
        assert!(DistanceGrid::new(millimeter!(-1.0), millimeter!(6.0), millimeter!(1.0)).is_err());
        assert!(DistanceGrid::new(millimeter!(6.0), millimeter!(6.0), millimeter!(1.0)).is_err());
        assert!(DistanceGrid::new(millimeter!(6.0), millimeter!(1.0), millimeter!(1.0)).is_err());
        assert!(DistanceGrid::new(millimeter!(1.0), millimeter!(6.0), millimeter!(0.0)).is_err());
        assert!(DistanceGrid::new(millimeter!(1.0), millimeter!(6.0), millimeter!(-1.0)).is_err());
        assert!(
            DistanceGrid::new(millimeter!(f64::NAN), millimeter!(6.0), millimeter!(1.0)).is_err()
        );
        assert!(
            DistanceGrid::new(millimeter!(1.0), millimeter!(f64::INFINITY), millimeter!(1.0))
                .is_err()
        );
    }
    #[test]
    fn points() {
        let grid = DistanceGrid::new(millimeter!(1.0), millimeter!(6.0), millimeter!(1.0)).unwrap();
        assert_eq!(grid.nr_of_points(), 5);
        assert_eq!(grid.points(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let grid = DistanceGrid::new(millimeter!(1.0), millimeter!(6.5), millimeter!(1.0)).unwrap();
        assert_eq!(grid.nr_of_points(), 6);
        assert_eq!(grid.points().last(), Some(&6.0));
    }
    #[test]
    fn points_fine_step() {
        let grid =
            DistanceGrid::new(millimeter!(5.0), millimeter!(150.0), millimeter!(0.01)).unwrap();
        let points = grid.points();
        assert_eq!(points.len(), 14500);
        assert_relative_eq!(points[0], 5.0);
        assert_relative_eq!(points[14499], 149.99, max_relative = 1e-12);
    }
    #[test]
    fn points_exclude_stop() {
        let grid = DistanceGrid::new(millimeter!(50.0), millimeter!(51.0), millimeter!(1.0)).unwrap();
        assert_eq!(grid.nr_of_points(), 1);
        assert_relative_eq!(grid.points()[0], 50.0, max_relative = 1e-12);
        let grid =
            DistanceGrid::new(millimeter!(20.0), millimeter!(100.0), millimeter!(0.005)).unwrap();
        let points = grid.points();
        assert_eq!(points.len(), 16000);
        assert!(points.iter().all(|d| *d < 100.0));
        assert_relative_eq!(points[15999], 99.995, max_relative = 1e-12);
        let grids = [(0.1, 0.7, 0.1), (0.3, 1.2, 0.3), (5.0, 150.0, 0.01), (1.1, 2.2, 0.1)];
        for (start, stop, step) in grids {
            let grid =
                DistanceGrid::new(millimeter!(start), millimeter!(stop), millimeter!(step)).unwrap();
            let points = grid.points();
            assert_eq!(points.len(), grid.nr_of_points());
            assert!(points.iter().all(|d| *d < stop - 0.5 * step));
            assert!(*points.last().unwrap() >= stop - 1.5 * step);
        }
    }
    #[test]
    fn gap_range_new() {
        let grid = DistanceGrid::new(millimeter!(1.0), millimeter!(6.0), millimeter!(1.0)).unwrap();
        let range = GapRange::new(grid, 2.5).unwrap();
        assert_eq!(range.grid(), &grid);
        assert_eq!(range.max_focal_ratio(), 2.5);
        assert!(GapRange::new(grid, 0.0).is_err());
        assert!(GapRange::new(grid, -1.0).is_err());
        assert!(GapRange::new(grid, f64::NAN).is_err());
        assert!(GapRange::new(grid, f64::INFINITY).is_err());
    }
    #[test]
    fn allows() {
        let grid = DistanceGrid::new(millimeter!(1.0), millimeter!(6.0), millimeter!(1.0)).unwrap();
        let range = GapRange::new(grid, 2.5).unwrap();
        assert!(range.allows(250.0, 100.0));
        assert!(range.allows(250.0, -100.0));
        assert!(!range.allows(250.1, -100.0));
        assert!(!range.allows(1.0, 0.0));
        assert!(range.allows(1.0e6, f64::INFINITY));
    }
    #[test]
    fn points_prefiltered() {
        let grid =
            DistanceGrid::new(millimeter!(10.0), millimeter!(110.0), millimeter!(10.0)).unwrap();
        let range = GapRange::new(grid, 1.0).unwrap();
        assert_eq!(range.points(None).len(), 10);
        assert_eq!(
            range.points(Some(&[-20.0, 45.0])),
            vec![10.0, 20.0, 30.0, 40.0]
        );
        assert_eq!(range.points(Some(&[f64::INFINITY])).len(), 10);
    }
    #[test]
    fn points_prefiltered_empty() {
        let grid =
            DistanceGrid::new(millimeter!(10.0), millimeter!(110.0), millimeter!(10.0)).unwrap();
        let range = GapRange::new(grid, 1.0).unwrap();
        testing_logger::setup();
        assert!(range.points(Some(&[5.0])).is_empty());
        check_warnings(vec![
            "pre-filter removed all 10 points of a gap grid. No candidate will pass.",
        ]);
    }
}
