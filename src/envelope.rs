#![warn(missing_docs)]
//! Beam envelope along an accepted lens system.
//!
//! The envelope is sampled from the first lens up to the back focal plane of the system. It is meant as input for
//! an external visualization of a [`Solution`].
use crate::{
    beam::{beam_radius, BeamParameter, InputBeam},
    error::{EflError, EflResult},
    ray_transfer::{OpticalElement, RayTransferMatrix},
    solution::Solution,
    utils::{f64_to_usize, usize_to_f64},
};
use uom::si::{f64::Length, length::millimeter};

/// Beam radius at a given position behind the first lens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopePoint {
    /// distance from the first lens
    pub position: Length,
    /// beam radius at this position
    pub radius: Length,
    /// index of the gap this point belongs to. The last segment reaches from the last lens to the back focal plane.
    pub segment: usize,
}

/// Sample the beam radius every `sampling` along the lens system of the given [`Solution`].
///
/// The first point is located directly behind the first lens, the last point at the back focal plane.
///
/// # Errors
///
/// This function returns an error if
///   - `sampling` is not positive and finite ([`EflError::Configuration`]).
///   - the back focal plane is located in front of the last lens ([`EflError::Domain`]).
///   - the beam parameter of the input beam cannot be calculated or the beam is undefined at some position.
pub fn beam_envelope(
    solution: &Solution,
    input_beam: &InputBeam,
    wavelength: Length,
    sampling: Length,
) -> EflResult<Vec<EnvelopePoint>> {
    let step = sampling.get::<millimeter>();
    if !step.is_normal() || step.is_sign_negative() {
        return Err(EflError::Configuration(
            "envelope sampling must be > 0.0 and finite".into(),
        ));
    }
    let back_focal_distance = solution.back_focal_distance().get::<millimeter>();
    if back_focal_distance.is_sign_negative() {
        return Err(EflError::Domain(
            "back focal plane is located in front of the last lens".into(),
        ));
    }
    let lambda = wavelength.get::<millimeter>();
    let q0 = BeamParameter::from_input_beam(input_beam, wavelength)?.q();
    let mut elements = solution.optical_elements();
    elements.push(OpticalElement::Propagation(Length::new::<millimeter>(
        back_focal_distance,
    )));
    let mut points = Vec::new();
    let mut q = q0;
    let mut start = 0.0;
    let mut segment = 0;
    for element in &elements {
        match element {
            OpticalElement::ThinLens(f) => {
                q = RayTransferMatrix::thin_lens(f.get::<millimeter>())?.transform(q)?;
            }
            OpticalElement::Propagation(d) => {
                let gap = d.get::<millimeter>();
                for i in 0..f64_to_usize((gap / step).ceil()) {
                    let z = usize_to_f64(i) * step;
                    let radius =
                        beam_radius(RayTransferMatrix::propagation(z).transform(q)?, lambda)?;
                    points.push(EnvelopePoint {
                        position: Length::new::<millimeter>(start + z),
                        radius: Length::new::<millimeter>(radius),
                        segment,
                    });
                }
                q = RayTransferMatrix::propagation(gap).transform(q)?;
                start += gap;
                segment += 1;
            }
        }
    }
    let focal_plane = RayTransferMatrix::from_elements(&elements)?.transform(q0)?;
    points.push(EnvelopePoint {
        position: Length::new::<millimeter>(start),
        radius: Length::new::<millimeter>(beam_radius(focal_plane, lambda)?),
        segment: segment.saturating_sub(1),
    });
    Ok(points)
}
