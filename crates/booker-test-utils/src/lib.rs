//! Testing utilities for the booking API harness.
//!
//! This crate provides the run-wide [`HarnessSession`], randomized booking
//! data, response assertions, result aggregation and reporting, a security
//! probe, and an in-process fake of the booking API for offline runs.

pub mod assertions;
pub mod config;
pub mod data_generators;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod security;
pub mod server;
pub mod session;

pub use config::RunPaths;
pub use data_generators::{BookingFactory, InvalidField};
pub use error::TestError;
pub use fixtures::FixtureSet;
pub use report::{ResultAggregator, RunSummary, TestRecord, TestStatus};
pub use security::{AttackKind, ProbeResult, SecurityReport};
pub use server::FakeBooker;
pub use session::HarnessSession;
