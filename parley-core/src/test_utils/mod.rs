//! Test utilities for the relay
//!
//! Fixtures, live-channel test doubles, a capturing metrics recorder and
//! async helpers shared by the unit tests in this crate and the integration
//! tests of dependent crates.

pub mod assertions;
pub mod async_helpers;
pub mod fixtures;
pub mod metrics_capture;

pub use assertions::*;
pub use async_helpers::*;
pub use fixtures::*;
pub use metrics_capture::MetricsCapture;
