//! Assertion utilities for booking API responses.
//!
//! Each helper returns a [`AssertionError`] describing expected versus actual
//! values; step functions turn those into panics.

mod booking;
mod status;

pub use booking::*;
pub use status::*;
