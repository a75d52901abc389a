#![warn(missing_docs)]
//! Accepted lens systems.
use crate::{
    ray_transfer::{LensSystem, OpticalElement},
    topology::Candidate,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uom::si::{f64::Length, length::millimeter};

/// A lens system that passed all filters of a search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    f1: Length,
    f2: Length,
    f3: Option<Length>,
    d1: Length,
    d2: Option<Length>,
    back_principal_plane: Length,
    enclosure_length: Length,
    effective_focal_length: Length,
    back_focal_distance: Length,
    focal_spot_radius: Length,
}
impl Solution {
    /// Create a new [`Solution`] from an accepted [`Candidate`], its [`LensSystem`] and the beam radius at the
    /// back focal plane (in mm).
    #[must_use]
    pub fn new(candidate: &Candidate, system: &LensSystem, focal_spot_radius: f64) -> Self {
        Self {
            f1: Length::new::<millimeter>(candidate.f1),
            f2: Length::new::<millimeter>(candidate.f2),
            f3: candidate.f3.map(Length::new::<millimeter>),
            d1: Length::new::<millimeter>(candidate.d1),
            d2: candidate.d2.map(Length::new::<millimeter>),
            back_principal_plane: Length::new::<millimeter>(system.back_principal_plane()),
            enclosure_length: Length::new::<millimeter>(
                candidate.total_gap_length() + system.back_principal_plane(),
            ),
            effective_focal_length: Length::new::<millimeter>(system.efl()),
            back_focal_distance: Length::new::<millimeter>(system.back_focal_distance()),
            focal_spot_radius: Length::new::<millimeter>(focal_spot_radius),
        }
    }
    /// Returns the focal length of the first lens.
    #[must_use]
    pub fn f1(&self) -> Length {
        self.f1
    }
    /// Returns the focal length of the second lens.
    #[must_use]
    pub fn f2(&self) -> Length {
        self.f2
    }
    /// Returns the focal length of the third lens (three-lens systems only).
    #[must_use]
    pub fn f3(&self) -> Option<Length> {
        self.f3
    }
    /// Returns the distance between the first and the second lens.
    #[must_use]
    pub fn d1(&self) -> Length {
        self.d1
    }
    /// Returns the distance between the second and the third lens (three-lens systems only).
    #[must_use]
    pub fn d2(&self) -> Option<Length> {
        self.d2
    }
    /// Returns the distance of the back principal plane (H2) from the last lens.
    #[must_use]
    pub fn back_principal_plane(&self) -> Length {
        self.back_principal_plane
    }
    /// Returns the enclosure length (all gaps plus H2).
    #[must_use]
    pub fn enclosure_length(&self) -> Length {
        self.enclosure_length
    }
    /// Returns the effective focal length of the system.
    #[must_use]
    pub fn effective_focal_length(&self) -> Length {
        self.effective_focal_length
    }
    /// Returns the distance of the back focal plane from the last lens.
    #[must_use]
    pub fn back_focal_distance(&self) -> Length {
        self.back_focal_distance
    }
    /// Returns the beam radius at the back focal plane.
    #[must_use]
    pub fn focal_spot_radius(&self) -> Length {
        self.focal_spot_radius
    }
    /// Returns the lens train of this [`Solution`] from the first up to the last lens.
    #[must_use]
    pub fn optical_elements(&self) -> Vec<OpticalElement> {
        let mut elements = vec![
            OpticalElement::ThinLens(self.f1),
            OpticalElement::Propagation(self.d1),
            OpticalElement::ThinLens(self.f2),
        ];
        if let (Some(d2), Some(f3)) = (self.d2, self.f3) {
            elements.push(OpticalElement::Propagation(d2));
            elements.push(OpticalElement::ThinLens(f3));
        }
        elements
    }
    /// Key `(f1, f2, f3, d1, d2)` in mm. Missing values are replaced by `-∞`.
    #[must_use]
    pub fn sort_key(&self) -> [f64; 5] {
        let mm = |l: Option<Length>| l.map_or(f64::NEG_INFINITY, |l| l.get::<millimeter>());
        [
            mm(Some(self.f1)),
            mm(Some(self.f2)),
            mm(self.f3),
            mm(Some(self.d1)),
            mm(self.d2),
        ]
    }
    /// Compare two solutions by their [`Solution::sort_key`].
    #[must_use]
    pub fn cmp_by_key(&self, other: &Self) -> Ordering {
        self.sort_key()
            .iter()
            .zip(other.sort_key().iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}
