#![warn(missing_docs)]
//! Gaussian beam model.
//!
//! A fundamental Gaussian beam at a given plane is fully described by its complex beam parameter
//! `q = z + i·z0` where `z` is the distance to the beam waist and `z0 = π·w0²/λ` is the Rayleigh range.
//! This module converts between the physical description of the beam entering the lens system
//! ([`InputBeam`]) and its [`BeamParameter`] and extracts the physical quantities (radius, wavefront
//! curvature) back from a (propagated) beam parameter.
//!
//! Internally all lengths are handled in millimeters.
use crate::error::{EflError, EflResult};
use num::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uom::si::{
    angle::radian,
    f64::{Angle, Length},
    length::millimeter,
};

/// The beam entering the first lens of the system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputBeam {
    radius: Length,
    half_divergence: Angle,
}
impl InputBeam {
    /// Create a new [`InputBeam`] with the given (1/e²) `radius` at the entrance of the lens system
    /// and the given half-angle divergence.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if
    ///   - the radius is not positive or not finite.
    ///   - the divergence is not positive or not finite.
    ///   - twice the divergence is not below 90°.
    pub fn new(radius: Length, half_divergence: Angle) -> EflResult<Self> {
        let beam = Self {
            radius,
            half_divergence,
        };
        beam.validate()?;
        Ok(beam)
    }
    /// Check the parameters of this [`InputBeam`].
    ///
    /// This is mainly needed for beams which were deserialized and hence did not pass [`InputBeam::new`].
    ///
    /// # Errors
    ///
    /// This function returns an error under the same conditions as [`InputBeam::new`].
    pub fn validate(&self) -> EflResult<()> {
        let radius = self.radius.get::<millimeter>();
        if !radius.is_normal() || radius.is_sign_negative() {
            return Err(EflError::Configuration(
                "input beam radius must be > 0.0 and finite".into(),
            ));
        }
        let divergence = self.half_divergence.get::<radian>();
        if !divergence.is_normal() || divergence.is_sign_negative() {
            return Err(EflError::Configuration(
                "input beam divergence must be > 0.0 and finite".into(),
            ));
        }
        if 2.0 * divergence >= PI / 2.0 {
            return Err(EflError::Configuration(
                "input beam full divergence must be < 90°".into(),
            ));
        }
        Ok(())
    }
    /// Returns the radius of this [`InputBeam`].
    #[must_use]
    pub fn radius(&self) -> Length {
        self.radius
    }
    /// Returns the half-angle divergence of this [`InputBeam`].
    #[must_use]
    pub fn half_divergence(&self) -> Angle {
        self.half_divergence
    }
}

/// Physical properties of a Gaussian beam at a given plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamProperties {
    /// beam radius (1/e² intensity)
    pub radius: Length,
    /// radius of curvature of the wavefront. `None` for a flat wavefront (e.g. directly at the waist).
    pub curvature: Option<Length>,
}

/// Complex beam parameter `q` of a Gaussian beam.
///
/// The imaginary part (the Rayleigh range) is always positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamParameter(Complex<f64>);

impl BeamParameter {
    /// Create a new [`BeamParameter`] from the complex value `q` (in millimeters).
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if the real part is not finite or the imaginary part
    /// is not positive and finite.
    pub fn new(q: Complex<f64>) -> EflResult<Self> {
        if !q.re.is_finite() || !q.im.is_finite() || q.im <= 0.0 {
            return Err(EflError::Domain(format!(
                "beam parameter {q} must have a finite, positive imaginary part"
            )));
        }
        Ok(Self(q))
    }
    /// Create the [`BeamParameter`] of a beam with the given waist radius at the given distance behind its waist.
    ///
    /// # Errors
    ///
    /// This function returns an error if the waist radius or the wavelength is not positive.
    pub fn from_waist(
        waist_radius: Length,
        distance_to_waist: Length,
        wavelength: Length,
    ) -> EflResult<Self> {
        let w0 = waist_radius.get::<millimeter>();
        let lambda = wavelength.get::<millimeter>();
        if !lambda.is_normal() || lambda.is_sign_negative() {
            return Err(EflError::Domain("wavelength must be > 0.0".into()));
        }
        Self::new(Complex::new(
            distance_to_waist.get::<millimeter>(),
            PI * w0 * w0 / lambda,
        ))
    }
    /// Derive the [`BeamParameter`] of the given [`InputBeam`] at the given wavelength.
    ///
    /// The distance to the waist is `z = w / tan(2α)`. The waist radius follows from the beam envelope
    /// `w² = w0²·(1 + (z/z0)²)` which is quadratic in `w0²`:
    ///
    /// `w0² = (w² ± sqrt(π²w⁴ − 4z²λ²)/π) / 2`
    ///
    /// The smaller root is used. It is the far-field solution (`z` >> `z0`) whose divergence `λ/(π·w0)`
    /// matches the given beam divergence. It is evaluated as `(zλ/π)² / w0²₊` in order to avoid
    /// cancellation for strongly diverging beams.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Domain`] if the discriminant `π²w⁴ − 4z²λ²` is negative, i.e. the beam radius
    /// and divergence are inconsistent at the given wavelength, or if the wavelength is not positive.
    pub fn from_input_beam(beam: &InputBeam, wavelength: Length) -> EflResult<Self> {
        let lambda = wavelength.get::<millimeter>();
        if !lambda.is_normal() || lambda.is_sign_negative() {
            return Err(EflError::Domain("wavelength must be > 0.0".into()));
        }
        let w = beam.radius().get::<millimeter>();
        let z = w / f64::tan(2.0 * beam.half_divergence().get::<radian>());
        let discriminant = PI * PI * w.powi(4) - 4.0 * z * z * lambda * lambda;
        if discriminant.is_sign_negative() || !discriminant.is_finite() {
            return Err(EflError::Domain(format!(
                "beam radius {w} mm and divergence are inconsistent at wavelength {lambda} mm (negative discriminant)"
            )));
        }
        let w0_sq_plus = 0.5 * (w * w + discriminant.sqrt() / PI);
        let w0_sq = (z * lambda / PI).powi(2) / w0_sq_plus;
        Self::new(Complex::new(z, PI * w0_sq / lambda))
    }
    /// Returns the complex value of this [`BeamParameter`] (in millimeters).
    #[must_use]
    pub const fn q(&self) -> Complex<f64> {
        self.0
    }
    /// Returns the (signed) distance from the beam waist.
    #[must_use]
    pub fn distance_to_waist(&self) -> Length {
        Length::new::<millimeter>(self.0.re)
    }
    /// Returns the Rayleigh range of this [`BeamParameter`].
    #[must_use]
    pub fn rayleigh_range(&self) -> Length {
        Length::new::<millimeter>(self.0.im)
    }
    /// Returns the waist radius of the beam at the given wavelength.
    #[must_use]
    pub fn waist_radius(&self, wavelength: Length) -> Length {
        Length::new::<millimeter>((self.0.im * wavelength.get::<millimeter>() / PI).sqrt())
    }
    /// Returns the physical [`BeamProperties`] of this [`BeamParameter`] at the given wavelength.
    ///
    /// # Errors
    ///
    /// This function returns an error if the beam radius cannot be calculated (see [`beam_radius`]).
    pub fn properties(&self, wavelength: Length) -> EflResult<BeamProperties> {
        let radius = beam_radius(self.0, wavelength.get::<millimeter>())?;
        Ok(BeamProperties {
            radius: Length::new::<millimeter>(radius),
            curvature: wavefront_curvature(self.0).map(Length::new::<millimeter>),
        })
    }
}

/// Beam radius (in mm) of the beam parameter `q` (in mm) at the given wavelength (in mm).
///
/// `w = |(−π/λ · Im(1/q))^(−1/2)|`
///
/// # Errors
///
/// This function returns an [`EflError::Domain`] if `q` is zero or if `Im(1/q)` is not negative
/// (no finite beam radius).
pub fn beam_radius(q: Complex<f64>, wavelength: f64) -> EflResult<f64> {
    if q.norm_sqr() == 0.0 {
        return Err(EflError::Domain("beam parameter must not be zero".into()));
    }
    let inv_im = q.finv().im;
    if inv_im >= 0.0 || !inv_im.is_finite() {
        return Err(EflError::Domain(
            "beam parameter has no finite beam radius".into(),
        ));
    }
    Ok((-wavelength / (PI * inv_im)).sqrt())
}

/// Wavefront radius of curvature (in mm) of the beam parameter `q` (in mm).
///
/// `R = 1 / Re(1/q)`. Returns `None` if the wavefront is flat (`Re(1/q) = 0`) or if `q` is zero.
#[must_use]
pub fn wavefront_curvature(q: Complex<f64>) -> Option<f64> {
    if q.norm_sqr() == 0.0 {
        return None;
    }
    let inv_re = q.finv().re;
    if inv_re == 0.0 || !inv_re.is_finite() {
        None
    } else {
        Some(1.0 / inv_re)
    }
}
