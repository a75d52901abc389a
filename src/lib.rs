#![allow(clippy::module_name_repetitions)]
//! This is the documentation for the **efl_finder** package.
//!
//! **efl_finder** searches the combinations of a set of available lenses and a grid of lens distances for two- or
//! three-lens relay systems with a given effective focal length (EFL). A lens system is accepted if
//!   - its EFL matches the target EFL within a tolerance,
//!   - the lenses and the back principal plane fit into an enclosure of given length and
//!   - the Gaussian input beam does not grow beyond a given multiple of its entrance radius on any lens.
//!
//! The lenses are treated as ideal thin lenses using paraxial ray transfer (ABCD) matrices. The beam is propagated
//! using its complex beam parameter.
//!
//! ## Example
//!
//! ```rust
//! use efl_finder::{
//!     beam::InputBeam,
//!     distance_grid::{DistanceGrid, GapRange},
//!     millimeter, milliradian, nanometer,
//!     search::{Search, SearchConfig},
//!     topology::ThreeLens,
//! };
//!
//! let topology = ThreeLens::new(
//!     &millimeter!(-100.0, -75.0, -50.0),
//!     &millimeter!(50.0, 100.0),
//!     &millimeter!(150.0, 200.0, f64::INFINITY),
//!     GapRange::new(DistanceGrid::new(millimeter!(5.0), millimeter!(150.0), millimeter!(5.0)).unwrap(), 2.5).unwrap(),
//!     GapRange::new(DistanceGrid::new(millimeter!(5.0), millimeter!(100.0), millimeter!(5.0)).unwrap(), 1.0).unwrap(),
//! )
//! .unwrap();
//! let config = SearchConfig::new(
//!     millimeter!(200.0),
//!     millimeter!(300.0),
//!     nanometer!(253.0),
//!     InputBeam::new(millimeter!(4.0), milliradian!(0.4)).unwrap(),
//!     1.6,
//! )
//! .unwrap();
//! let report = Search::new(config).unwrap().run(&topology).unwrap();
//! for solution in report.sorted_solutions() {
//!     assert!(solution.enclosure_length() < millimeter!(300.0));
//! }
//! ```
pub mod beam;
pub mod console;
pub mod distance_grid;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod parallel;
pub mod ray_transfer;
pub mod search;
pub mod solution;
pub mod topology;
pub mod utils;

/// Return the version information of the `efl_finder` package.
#[must_use]
pub fn get_version() -> String {
    format!("{} ({})", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_NAME"))
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn version() {
        assert_eq!(
            get_version(),
            format!("{} (efl_finder)", env!("CARGO_PKG_VERSION"))
        );
    }
}
