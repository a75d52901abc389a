#![warn(missing_docs)]
use super::{focal_set, Candidate, FocalCombination, GapGrid, Topology};
use crate::{distance_grid::GapRange, error::EflResult, ray_transfer::LensSystem};
use itertools::iproduct;
use uom::si::f64::Length;

/// Three lenses separated by two gaps.
///
/// The gap `d1` is limited by the focal length of the first lens, the gap `d2` by the focal length of the
/// second lens.
#[derive(Clone, Debug, PartialEq)]
pub struct ThreeLens {
    f1: Vec<f64>,
    f2: Vec<f64>,
    f3: Vec<f64>,
    gap1: GapRange,
    gap2: GapRange,
}
impl ThreeLens {
    /// Create a new [`ThreeLens`] topology.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`](crate::error::EflError::Configuration) if one of the
    /// focal length sets is empty or contains NaN or if one of the gap ranges is invalid.
    pub fn new(
        f1: &[Length],
        f2: &[Length],
        f3: &[Length],
        gap1: GapRange,
        gap2: GapRange,
    ) -> EflResult<Self> {
        gap1.validate()?;
        gap2.validate()?;
        Ok(Self {
            f1: focal_set(1, f1)?,
            f2: focal_set(2, f2)?,
            f3: focal_set(3, f3)?,
            gap1,
            gap2,
        })
    }
    /// Returns the focal lengths (in mm) of the first lens.
    #[must_use]
    pub fn f1(&self) -> &[f64] {
        &self.f1
    }
    /// Returns the focal lengths (in mm) of the second lens.
    #[must_use]
    pub fn f2(&self) -> &[f64] {
        &self.f2
    }
    /// Returns the focal lengths (in mm) of the third lens.
    #[must_use]
    pub fn f3(&self) -> &[f64] {
        &self.f3
    }
    /// Returns the [`GapRange`] between the first and the second lens.
    #[must_use]
    pub const fn gap1(&self) -> &GapRange {
        &self.gap1
    }
    /// Returns the [`GapRange`] between the second and the third lens.
    #[must_use]
    pub const fn gap2(&self) -> &GapRange {
        &self.gap2
    }
}
impl Topology for ThreeLens {
    fn name(&self) -> &'static str {
        "three-lens"
    }
    fn focal_combinations(&self) -> Vec<FocalCombination> {
        iproduct!(self.f1.iter(), self.f2.iter(), self.f3.iter())
            .map(|(f1, f2, f3)| FocalCombination {
                f1: *f1,
                f2: *f2,
                f3: Some(*f3),
            })
            .collect()
    }
    fn gap_grid(&self, prefilter: bool) -> GapGrid {
        GapGrid {
            d1: self.gap1.points(prefilter.then_some(self.f1.as_slice())),
            d2: Some(self.gap2.points(prefilter.then_some(self.f2.as_slice()))),
        }
    }
    fn candidates<'a>(
        &'a self,
        combination: FocalCombination,
        grid: &'a GapGrid,
    ) -> Box<dyn Iterator<Item = Candidate> + 'a> {
        let d2 = grid.d2.as_deref().unwrap_or_default();
        Box::new(iproduct!(grid.d1.iter(), d2.iter()).map(move |(d1, d2)| Candidate {
            f1: combination.f1,
            f2: combination.f2,
            f3: combination.f3,
            d1: *d1,
            d2: Some(*d2),
        }))
    }
    fn gaps_within_limits(&self, candidate: &Candidate) -> bool {
        self.gap1.allows(candidate.d1, candidate.f1)
            && candidate
                .d2
                .is_some_and(|d2| self.gap2.allows(d2, candidate.f2))
    }
    fn compute_system(&self, candidate: &Candidate) -> EflResult<LensSystem> {
        LensSystem::three_lens(
            candidate.f1,
            candidate.f2,
            candidate.f3.unwrap_or(f64::INFINITY),
            candidate.d1,
            candidate.d2.unwrap_or_default(),
        )
    }
}
