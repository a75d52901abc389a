//! Helper functions for the unit tests of this crate.
//!
//! **Note**: This module is only compiled for tests, so it does not appear in the generated documentation.
