#![warn(missing_docs)]
//! Paraxial ray transfer (ABCD) matrices and the closed-form lens systems used by the search.
//!
//! All values are handled in millimeters. A thin lens with an infinite focal length is a valid
//! (transparent) element. A focal length of exactly zero is a domain error.
use crate::error::{EflError, EflResult};
use nalgebra::Matrix2;
use num::Complex;
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::millimeter};

/// A single element of a paraxial lens train.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum OpticalElement {
    /// an ideal thin lens with the given focal length
    ThinLens(Length),
    /// free-space propagation over the given distance
    Propagation(Length),
}

/// Ray transfer matrix `[[A, B], [C, D]]` (lengths in mm).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayTransferMatrix(Matrix2<f64>);

impl Default for RayTransferMatrix {
    fn default() -> Self {
        Self::identity()
    }
}
impl RayTransferMatrix {
    /// Create a new [`RayTransferMatrix`] from its four elements.
    #[must_use]
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self(Matrix2::new(a, b, c, d))
    }
    /// Returns the identity matrix (no optical element).
    #[must_use]
    pub fn identity() -> Self {
        Self(Matrix2::identity())
    }
    /// Matrix of a thin lens with the given focal length (in mm).
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if the focal length is zero or NaN.
    pub fn thin_lens(focal_length: f64) -> EflResult<Self> {
        let p = power(focal_length)?;
        Ok(Self::new(1.0, 0.0, -p, 1.0))
    }
    /// Matrix of a free-space propagation over the given distance (in mm).
    #[must_use]
    pub fn propagation(distance: f64) -> Self {
        Self::new(1.0, distance, 0.0, 1.0)
    }
    /// Compose the matrix of a sequence of elements given in the order the beam traverses them.
    ///
    /// # Errors
    ///
    /// This function returns an error if one of the lenses has a zero focal length.
    pub fn from_elements(elements: &[OpticalElement]) -> EflResult<Self> {
        let mut matrix = Self::identity();
        for element in elements {
            let next = match element {
                OpticalElement::ThinLens(f) => Self::thin_lens(f.get::<millimeter>())?,
                OpticalElement::Propagation(d) => Self::propagation(d.get::<millimeter>()),
            };
            matrix = matrix.then(&next);
        }
        Ok(matrix)
    }
    /// Returns the matrix of this system followed by the `next` system.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        Self(next.0 * self.0)
    }
    /// Returns the element `A`.
    #[must_use]
    pub fn a(&self) -> f64 {
        self.0[(0, 0)]
    }
    /// Returns the element `B`.
    #[must_use]
    pub fn b(&self) -> f64 {
        self.0[(0, 1)]
    }
    /// Returns the element `C`.
    #[must_use]
    pub fn c(&self) -> f64 {
        self.0[(1, 0)]
    }
    /// Returns the element `D`.
    #[must_use]
    pub fn d(&self) -> f64 {
        self.0[(1, 1)]
    }
    /// Returns the determinant. Systems made of lenses and gaps in a single medium always have a determinant of 1.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }
    /// Transform a complex beam parameter: `q' = (A·q + B) / (C·q + D)`.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if the denominator vanishes.
    pub fn transform(&self, q: Complex<f64>) -> EflResult<Complex<f64>> {
        let denominator = self.c() * q + self.d();
        if denominator.norm_sqr() == 0.0 {
            return Err(EflError::Domain(
                "beam parameter transformation is singular".into(),
            ));
        }
        Ok((self.a() * q + self.b()) / denominator)
    }
    /// Effective focal length `−1/C` of the system.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if `C` is zero (afocal system).
    pub fn effective_focal_length(&self) -> EflResult<f64> {
        let c = self.c();
        if c == 0.0 || !c.is_finite() {
            return Err(EflError::Domain("system is afocal (C = 0)".into()));
        }
        Ok(-1.0 / c)
    }
    /// Distance of the back principal plane from the last element `(1 − A)/C`.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if `C` is zero (afocal system).
    pub fn back_principal_plane(&self) -> EflResult<f64> {
        let c = self.c();
        if c == 0.0 || !c.is_finite() {
            return Err(EflError::Domain("system is afocal (C = 0)".into()));
        }
        Ok((1.0 - self.a()) / c)
    }
    /// Distance of the back focal plane from the last element `−A/C`.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if `C` is zero (afocal system).
    pub fn back_focal_distance(&self) -> EflResult<f64> {
        let c = self.c();
        if c == 0.0 || !c.is_finite() {
            return Err(EflError::Domain("system is afocal (C = 0)".into()));
        }
        Ok(-self.a() / c)
    }
}

/// Optical power `1/f` (in 1/mm) of a lens. Infinite focal lengths have zero power.
fn power(focal_length: f64) -> EflResult<f64> {
    if focal_length == 0.0 || focal_length.is_nan() {
        return Err(EflError::Domain(format!(
            "focal length {focal_length} mm is not allowed"
        )));
    }
    Ok(focal_length.recip())
}

/// A complete two- or three-lens system derived from its closed-form ABCD matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LensSystem {
    matrix: RayTransferMatrix,
    intermediate: Option<RayTransferMatrix>,
    efl: f64,
    back_principal_plane: f64,
    back_focal_distance: f64,
}
impl LensSystem {
    /// Closed-form system of lens `f1`, gap `d1` and lens `f2` (in mm).
    ///
    /// `A = 1 − d1/f1, B = d1, C = −(f1 + f2 − d1)/(f1·f2), D = 1 − d1/f2`
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if one of the focal lengths or `C` is zero.
    pub fn two_lens(f1: f64, f2: f64, d1: f64) -> EflResult<Self> {
        let matrix = two_lens_matrix(power(f1)?, power(f2)?, d1);
        Self::from_matrix(matrix, None, matrix.effective_focal_length()?)
    }
    /// Closed-form system of lens `f1`, gap `d1`, lens `f2`, gap `d2` and lens `f3` (in mm).
    ///
    /// The two-lens sub-system (`f1`, `d1`, `f2`) is kept as intermediate matrix. It describes the beam at the
    /// second lens.
    ///
    /// The effective focal length is `f1·f2·f3 / (f1·f2 − d2·(f1 + f2) + d1·(d2 − f3) + f1·f3 + f2·f3)`. This
    /// expression lacks the term `−d1·f2` of the composed matrix element `C`, so it equals `−1/C` only if the
    /// third lens is a placeholder (infinite focal length) or `d1` is zero. H2 and the back focal plane are always
    /// taken from the matrix.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if one of the focal lengths, `C` or the denominator of the
    /// effective focal length is zero.
    pub fn three_lens(f1: f64, f2: f64, f3: f64, d1: f64, d2: f64) -> EflResult<Self> {
        let (p1, p2, p3) = (power(f1)?, power(f2)?, power(f3)?);
        let front = two_lens_matrix(p1, p2, d1);
        let a = front.c().mul_add(d2, front.a());
        let b = front.d().mul_add(d2, front.b());
        let c = p3.mul_add(-a, front.c());
        let d = p3.mul_add(-b, front.d());
        Self::from_matrix(
            RayTransferMatrix::new(a, b, c, d),
            Some(front),
            three_lens_efl(p1, p2, p3, d1, d2)?,
        )
    }
    fn from_matrix(
        matrix: RayTransferMatrix,
        intermediate: Option<RayTransferMatrix>,
        efl: f64,
    ) -> EflResult<Self> {
        Ok(Self {
            efl,
            back_principal_plane: matrix.back_principal_plane()?,
            back_focal_distance: matrix.back_focal_distance()?,
            matrix,
            intermediate,
        })
    }
    /// Returns the matrix of the full system (entrance of the first lens to the exit of the last lens).
    #[must_use]
    pub const fn matrix(&self) -> &RayTransferMatrix {
        &self.matrix
    }
    /// Returns the effective focal length (in mm).
    #[must_use]
    pub const fn efl(&self) -> f64 {
        self.efl
    }
    /// Returns the distance of the back principal plane from the last lens (in mm).
    #[must_use]
    pub const fn back_principal_plane(&self) -> f64 {
        self.back_principal_plane
    }
    /// Matrices from the system entrance up to (and including) every lens behind the first one.
    ///
    /// Since a thin lens does not change the beam radius, transforming the input beam with these matrices
    /// yields the beam radius on every lens after the first one.
    pub fn lens_matrices(&self) -> impl Iterator<Item = &RayTransferMatrix> {
        self.intermediate.iter().chain(std::iter::once(&self.matrix))
    }
    /// Returns the distance of the back focal plane from the last lens `−A/C` (in mm).
    #[must_use]
    pub const fn back_focal_distance(&self) -> f64 {
        self.back_focal_distance
    }
    /// Matrix from the system entrance to the back focal plane.
    #[must_use]
    pub fn focal_plane_matrix(&self) -> RayTransferMatrix {
        self.matrix
            .then(&RayTransferMatrix::propagation(self.back_focal_distance))
    }
}

/// Inverse of the three-lens effective focal length with numerator and denominator divided by `f1·f2·f3`.
fn three_lens_efl(p1: f64, p2: f64, p3: f64, d1: f64, d2: f64) -> EflResult<f64> {
    let inverse = (d1 * d2).mul_add(p1 * p2 * p3, p1 + p2 + p3) - d2 * p3 * (p1 + p2) - d1 * p1 * p2;
    if inverse == 0.0 || !inverse.is_finite() {
        return Err(EflError::Domain("system is afocal (infinite EFL)".into()));
    }
    Ok(inverse.recip())
}

/// `L(p2)·P(d1)·L(p1)` written out, using lens powers instead of focal lengths.
fn two_lens_matrix(p1: f64, p2: f64, d1: f64) -> RayTransferMatrix {
    RayTransferMatrix::new(
        d1.mul_add(-p1, 1.0),
        d1,
        -(d1 * p1).mul_add(-p2, p1 + p2),
        d1.mul_add(-p2, 1.0),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::millimeter;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use assert_matches::assert_matches;

    fn assert_matrix_eq(m1: &RayTransferMatrix, m2: &RayTransferMatrix) {
        assert_relative_eq!(m1.a(), m2.a(), epsilon = 1e-12, max_relative = 1e-10);
        assert_relative_eq!(m1.b(), m2.b(), epsilon = 1e-12, max_relative = 1e-10);
        assert_relative_eq!(m1.c(), m2.c(), epsilon = 1e-12, max_relative = 1e-10);
        assert_relative_eq!(m1.d(), m2.d(), epsilon = 1e-12, max_relative = 1e-10);
    }
    #[test]
    fn thin_lens() {
        let lens = RayTransferMatrix::thin_lens(100.0).unwrap();
        assert_eq!(lens, RayTransferMatrix::new(1.0, 0.0, -0.01, 1.0));
        let lens = RayTransferMatrix::thin_lens(f64::INFINITY).unwrap();
        assert_abs_diff_eq!(lens.c(), 0.0);
        assert_matches!(
            RayTransferMatrix::thin_lens(0.0),
            Err(EflError::Domain(_))
        );
        assert!(RayTransferMatrix::thin_lens(f64::NAN).is_err());
    }
    #[test]
    fn propagation() {
        let p = RayTransferMatrix::propagation(20.0);
        assert_eq!(p, RayTransferMatrix::new(1.0, 20.0, 0.0, 1.0));
        assert_eq!(RayTransferMatrix::default(), RayTransferMatrix::identity());
    }
    #[test]
    fn then() {
        let m = RayTransferMatrix::propagation(10.0).then(&RayTransferMatrix::propagation(5.0));
        assert_eq!(m, RayTransferMatrix::propagation(15.0));
        let lens = RayTransferMatrix::thin_lens(64.0).unwrap();
        let m = RayTransferMatrix::propagation(64.0).then(&lens);
        // lens applied after the propagation
        assert_relative_eq!(m.c(), -1.0 / 64.0);
        assert_abs_diff_eq!(m.d(), 0.0);
    }
    #[test]
    fn from_elements() {
        let m = RayTransferMatrix::from_elements(&[
            OpticalElement::ThinLens(millimeter!(-100.0)),
            OpticalElement::Propagation(millimeter!(50.0)),
            OpticalElement::ThinLens(millimeter!(100.0)),
        ])
        .unwrap();
        assert_matrix_eq(&m, LensSystem::two_lens(-100.0, 100.0, 50.0).unwrap().matrix());
        assert_relative_eq!(m.determinant(), 1.0);
        assert!(RayTransferMatrix::from_elements(&[OpticalElement::ThinLens(millimeter!(0.0))])
            .is_err());
        assert_eq!(
            RayTransferMatrix::from_elements(&[]).unwrap(),
            RayTransferMatrix::identity()
        );
    }
    #[test]
    fn transform() {
        let q = Complex::new(10.0, 5.0);
        let q2 = RayTransferMatrix::propagation(7.0).transform(q).unwrap();
        assert_relative_eq!(q2.re, 17.0);
        assert_relative_eq!(q2.im, 5.0);
        let q3 = RayTransferMatrix::thin_lens(40.0)
            .unwrap()
            .transform(q)
            .unwrap();
        let expected = (q.finv() - 1.0 / 40.0).finv();
        assert_relative_eq!(q3.re, expected.re, max_relative = 1e-12);
        assert_relative_eq!(q3.im, expected.im, max_relative = 1e-12);
        let singular = RayTransferMatrix::new(1.0, 0.0, 0.0, 0.0);
        assert!(singular.transform(Complex::new(0.0, 0.0)).is_err());
    }
    #[test]
    fn efl_two_lens() {
        let system = LensSystem::two_lens(-100.0, 100.0, 50.0).unwrap();
        assert_relative_eq!(system.efl(), 200.0, max_relative = 1e-12);
        assert_relative_eq!(
            system.efl(),
            1.0 / (1.0 / -100.0 + 1.0 / 100.0 - 50.0 / (-100.0 * 100.0)),
            max_relative = 1e-12
        );
        let m = system.matrix();
        assert_relative_eq!(m.a(), 1.5, max_relative = 1e-12);
        assert_relative_eq!(m.b(), 50.0);
        assert_relative_eq!(m.c(), -0.005, max_relative = 1e-12);
        assert_relative_eq!(m.d(), 0.5, max_relative = 1e-12);
        // H2 = (1 - A) / C
        assert_relative_eq!(system.back_principal_plane(), 100.0, max_relative = 1e-12);
        assert_eq!(system.lens_matrices().count(), 1);
    }
    #[test]
    fn two_lens_domain_errors() {
        assert_matches!(LensSystem::two_lens(0.0, 100.0, 50.0), Err(EflError::Domain(_)));
        assert_matches!(LensSystem::two_lens(100.0, 0.0, 50.0), Err(EflError::Domain(_)));
        // telescope: d1 = f1 + f2 -> afocal
        assert_matches!(LensSystem::two_lens(-32.0, 64.0, 32.0), Err(EflError::Domain(_)));
    }
    #[test]
    fn two_lens_infinite_placeholder() {
        let system = LensSystem::two_lens(f64::INFINITY, 100.0, 30.0).unwrap();
        assert_relative_eq!(system.efl(), 100.0, max_relative = 1e-12);
        assert_abs_diff_eq!(system.back_principal_plane(), 0.0);
    }
    #[test]
    fn three_lens_matches_composition() {
        let (f1, f2, f3, d1, d2) = (-50.0, 100.0, 150.0, 40.0, 25.0);
        let system = LensSystem::three_lens(f1, f2, f3, d1, d2).unwrap();
        let composed = RayTransferMatrix::from_elements(&[
            OpticalElement::ThinLens(millimeter!(f1)),
            OpticalElement::Propagation(millimeter!(d1)),
            OpticalElement::ThinLens(millimeter!(f2)),
            OpticalElement::Propagation(millimeter!(d2)),
            OpticalElement::ThinLens(millimeter!(f3)),
        ])
        .unwrap();
        assert_matrix_eq(system.matrix(), &composed);
        let a = (d1 * (d2 - f2) + f1 * f2 - d2 * (f1 + f2)) / (f1 * f2);
        let c = (-f1 * f2 + d2 * (f1 + f2) - f1 * f3 - f2 * f3 + d1 * (-d2 + f2 + f3))
            / (f1 * f2 * f3);
        assert_relative_eq!(system.matrix().a(), a, max_relative = 1e-10);
        assert_relative_eq!(system.matrix().c(), c, max_relative = 1e-10);
        assert_relative_eq!(
            system.back_principal_plane(),
            (1.0 - a) / c,
            max_relative = 1e-10
        );
        assert_relative_eq!(system.back_focal_distance(), -a / c, max_relative = 1e-10);
        assert_relative_eq!(
            system.back_focal_distance(),
            composed.back_focal_distance().unwrap(),
            max_relative = 1e-10
        );
        let matrices: Vec<_> = system.lens_matrices().collect();
        assert_eq!(matrices.len(), 2);
        assert_matrix_eq(matrices[0], LensSystem::two_lens(f1, f2, d1).unwrap().matrix());
        assert_matrix_eq(matrices[1], &composed);
    }
    #[test]
    fn three_lens_efl() {
        let (f1, f2, f3, d1, d2) = (-50.0, 100.0, 150.0, 40.0, 25.0);
        let system = LensSystem::three_lens(f1, f2, f3, d1, d2).unwrap();
        let efl = f1 * f2 * f3
            / (f1 * f2 - d2 * (f1 + f2) + d1 * (d2 - f3) + f1 * f3 + f2 * f3);
        assert_relative_eq!(efl, 200.0, max_relative = 1e-12);
        assert_relative_eq!(system.efl(), efl, max_relative = 1e-10);
        // -1/C of the composed matrix additionally contains the term -d1·f2 in its denominator
        let matrix_efl = system.matrix().effective_focal_length().unwrap();
        assert_relative_eq!(matrix_efl, 96.774_193_548_387, max_relative = 1e-10);
        assert_relative_eq!(
            1.0 / efl - 1.0 / matrix_efl,
            d1 / (f1 * f3),
            max_relative = 1e-10
        );
        // both agree without the first gap
        let system = LensSystem::three_lens(f1, f2, f3, 0.0, d2).unwrap();
        assert_relative_eq!(
            system.efl(),
            system.matrix().effective_focal_length().unwrap(),
            max_relative = 1e-10
        );
    }
    #[test]
    fn three_lens_reduces_to_two_lens() {
        let three = LensSystem::three_lens(-80.0, 120.0, f64::INFINITY, 30.0, 0.0).unwrap();
        let two = LensSystem::two_lens(-80.0, 120.0, 30.0).unwrap();
        assert_relative_eq!(three.efl(), two.efl(), max_relative = 1e-12);
        assert_relative_eq!(
            three.back_principal_plane(),
            two.back_principal_plane(),
            max_relative = 1e-12
        );
    }
    #[test]
    fn three_lens_domain_errors() {
        assert!(LensSystem::three_lens(0.0, 100.0, 100.0, 10.0, 10.0).is_err());
        assert!(LensSystem::three_lens(-50.0, 0.0, 100.0, 10.0, 10.0).is_err());
        assert!(LensSystem::three_lens(-50.0, 100.0, 0.0, 10.0, 10.0).is_err());
    }
    #[test]
    fn focal_plane_matrix() {
        let system = LensSystem::two_lens(-100.0, 100.0, 50.0).unwrap();
        let m = system.focal_plane_matrix();
        // a collimated input ray is focused onto the axis in the back focal plane
        assert_abs_diff_eq!(m.a(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(m.b(), system.efl(), max_relative = 1e-12);
        assert_relative_eq!(
            system.back_focal_distance(),
            system.back_principal_plane() + system.efl(),
            max_relative = 1e-12
        );
    }
}
