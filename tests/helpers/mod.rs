//! Shared test helpers.

pub mod diagnostic_helpers;
pub mod host_helpers;
pub mod source_fixtures;
