#![warn(missing_docs)]
use super::{focal_set, Candidate, FocalCombination, GapGrid, Topology};
use crate::{distance_grid::GapRange, error::EflResult, ray_transfer::LensSystem};
use itertools::iproduct;
use uom::si::f64::Length;

/// Two lenses separated by a single gap.
///
/// The gap `d1` is limited by the focal length of the first lens.
#[derive(Clone, Debug, PartialEq)]
pub struct TwoLens {
    f1: Vec<f64>,
    f2: Vec<f64>,
    gap: GapRange,
}
impl TwoLens {
    /// Create a new [`TwoLens`] topology from the focal length sets of both lenses and the range of the gap
    /// between them.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`](crate::error::EflError::Configuration) if one of the
    /// focal length sets is empty or contains NaN or if the gap range is invalid.
    pub fn new(f1: &[Length], f2: &[Length], gap: GapRange) -> EflResult<Self> {
        gap.validate()?;
        Ok(Self {
            f1: focal_set(1, f1)?,
            f2: focal_set(2, f2)?,
            gap,
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
    /// Returns the [`GapRange`] between both lenses.
    #[must_use]
    pub const fn gap(&self) -> &GapRange {
        &self.gap
    }
}
impl Topology for TwoLens {
    fn name(&self) -> &'static str {
        "two-lens"
    }
    fn focal_combinations(&self) -> Vec<FocalCombination> {
        iproduct!(self.f1.iter(), self.f2.iter())
            .map(|(f1, f2)| FocalCombination {
                f1: *f1,
                f2: *f2,
                f3: None,
            })
            .collect()
    }
    fn gap_grid(&self, prefilter: bool) -> GapGrid {
        GapGrid {
            d1: self.gap.points(prefilter.then_some(self.f1.as_slice())),
            d2: None,
        }
    }
    fn candidates<'a>(
        &'a self,
        combination: FocalCombination,
        grid: &'a GapGrid,
    ) -> Box<dyn Iterator<Item = Candidate> + 'a> {
        Box::new(grid.d1.iter().map(move |d1| Candidate {
            f1: combination.f1,
            f2: combination.f2,
            f3: None,
            d1: *d1,
            d2: None,
        }))
    }
    fn gaps_within_limits(&self, candidate: &Candidate) -> bool {
        self.gap.allows(candidate.d1, candidate.f1)
    }
    fn compute_system(&self, candidate: &Candidate) -> EflResult<LensSystem> {
        LensSystem::two_lens(candidate.f1, candidate.f2, candidate.d1)
    }
}
