//! Test data generators for booking scenarios.
//!
//! Valid records are randomized; invalid and attack records are derived from
//! a valid one so that only the targeted field differs.

mod booking;

pub use booking::*;
