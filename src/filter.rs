#![warn(missing_docs)]
//! Feasibility filter applied to every single candidate of a search.
//!
//! The checks are applied in the order of their cost so that most candidates are rejected early:
//!   1. geometric gap limits
//!   2. calculation of the lens system (rejects undefined systems)
//!   3. effective focal length
//!   4. enclosure length
//!   5. beam radius on every lens behind the first one
//!
//! [`evaluate`] has no side effects and can be called from any number of threads.
use crate::{
    beam::{beam_radius, BeamParameter},
    error::{EflError, EflResult},
    ray_transfer::RayTransferMatrix,
    search::SearchConfig,
    solution::Solution,
    topology::{Candidate, Topology},
};
use num::Complex;
use serde::Serialize;
use strum::{Display, EnumIter};
use uom::si::length::millimeter;

/// The reason for rejecting a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum Rejection {
    /// a gap exceeds the limit given by the focal length in front of it
    #[strum(serialize = "gap limit")]
    GapLimit,
    /// the system or the beam is undefined (zero focal length, afocal system, ...)
    #[strum(serialize = "domain error")]
    Domain,
    /// the effective focal length is outside the tolerance
    #[strum(serialize = "EFL mismatch")]
    EflMismatch,
    /// the system does not fit into the enclosure
    #[strum(serialize = "enclosure length")]
    Enclosure,
    /// the beam is too large on one of the lenses
    #[strum(serialize = "beam clipping")]
    BeamClipped,
}

/// Result of the evaluation of a single candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verdict {
    /// the candidate passed all checks
    Accept(Solution),
    /// the candidate failed the given check
    Reject(Rejection),
}

/// Number of rejected candidates per [`Rejection`] reason.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RejectionTally {
    gap_limit: usize,
    domain: usize,
    efl_mismatch: usize,
    enclosure: usize,
    beam_clipped: usize,
}
impl RejectionTally {
    /// Count a rejection.
    pub fn add(&mut self, rejection: Rejection) {
        *self.counter_mut(rejection) += 1;
    }
    /// Add the counts of another [`RejectionTally`].
    pub fn merge(&mut self, other: &Self) {
        self.gap_limit += other.gap_limit;
        self.domain += other.domain;
        self.efl_mismatch += other.efl_mismatch;
        self.enclosure += other.enclosure;
        self.beam_clipped += other.beam_clipped;
    }
    /// Returns the number of rejections for the given reason.
    #[must_use]
    pub const fn count(&self, rejection: Rejection) -> usize {
        match rejection {
            Rejection::GapLimit => self.gap_limit,
            Rejection::Domain => self.domain,
            Rejection::EflMismatch => self.efl_mismatch,
            Rejection::Enclosure => self.enclosure,
            Rejection::BeamClipped => self.beam_clipped,
        }
    }
    /// Returns the total number of rejections.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.gap_limit + self.domain + self.efl_mismatch + self.enclosure + self.beam_clipped
    }
    fn counter_mut(&mut self, rejection: Rejection) -> &mut usize {
        match rejection {
            Rejection::GapLimit => &mut self.gap_limit,
            Rejection::Domain => &mut self.domain,
            Rejection::EflMismatch => &mut self.efl_mismatch,
            Rejection::Enclosure => &mut self.enclosure,
            Rejection::BeamClipped => &mut self.beam_clipped,
        }
    }
}

/// Filter limits of a [`SearchConfig`] converted to millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterContext {
    target_efl: f64,
    efl_tolerance: f64,
    enclosure_length: f64,
    max_beam_radius: f64,
    wavelength: f64,
    q0: Complex<f64>,
}
impl FilterContext {
    /// Create a new [`FilterContext`] from the given [`SearchConfig`].
    ///
    /// The beam parameter of the input beam is calculated once here.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if the configuration is invalid or the input beam
    /// has no valid beam parameter at the configured wavelength.
    pub fn new(config: &SearchConfig) -> EflResult<Self> {
        config.validate()?;
        let q0 = BeamParameter::from_input_beam(config.input_beam(), config.wavelength())
            .map_err(|e| EflError::Configuration(format!("invalid input beam: {e}")))?;
        Ok(Self {
            target_efl: config.target_efl().get::<millimeter>(),
            efl_tolerance: config.efl_tolerance().get::<millimeter>(),
            enclosure_length: config.enclosure_length().get::<millimeter>(),
            max_beam_radius: config.clipping_margin()
                * config.input_beam().radius().get::<millimeter>(),
            wavelength: config.wavelength().get::<millimeter>(),
            q0: q0.q(),
        })
    }
    /// Returns the beam parameter (in mm) of the input beam.
    #[must_use]
    pub const fn q0(&self) -> Complex<f64> {
        self.q0
    }
    /// Returns the largest allowed beam radius (in mm) on a lens.
    #[must_use]
    pub const fn max_beam_radius(&self) -> f64 {
        self.max_beam_radius
    }
    /// Beam radius (in mm) behind the system described by the given matrix.
    fn beam_radius(&self, matrix: &RayTransferMatrix) -> EflResult<f64> {
        beam_radius(matrix.transform(self.q0)?, self.wavelength)
    }
}

/// Evaluate a single [`Candidate`] of the given [`Topology`].
pub fn evaluate<T: Topology + ?Sized>(
    topology: &T,
    candidate: &Candidate,
    context: &FilterContext,
) -> Verdict {
    if !topology.gaps_within_limits(candidate) {
        return Verdict::Reject(Rejection::GapLimit);
    }
    let Ok(system) = topology.compute_system(candidate) else {
        return Verdict::Reject(Rejection::Domain);
    };
    if (system.efl() - context.target_efl).abs() > context.efl_tolerance {
        return Verdict::Reject(Rejection::EflMismatch);
    }
    let enclosure_length = candidate.total_gap_length() + system.back_principal_plane();
    if enclosure_length >= context.enclosure_length {
        return Verdict::Reject(Rejection::Enclosure);
    }
    for matrix in system.lens_matrices() {
        match context.beam_radius(matrix) {
            Ok(radius) if radius < context.max_beam_radius => {}
            Ok(_) => return Verdict::Reject(Rejection::BeamClipped),
            Err(_) => return Verdict::Reject(Rejection::Domain),
        }
    }
    match context.beam_radius(&system.focal_plane_matrix()) {
        Ok(spot_radius) => Verdict::Accept(Solution::new(candidate, &system, spot_radius)),
        Err(_) => Verdict::Reject(Rejection::Domain),
    }
}
