//! Cross-module tests for the simulation.
//!
//! - **Scenario tests**: whole-universe runs for gameplay rules
//! - **Property tests**: `proptest` checks of physical invariants
//! - **Helper functions**: recording canvas and setup utilities
//!
//! # Test Structure
//!
//! - `scenarios.rs`: end-to-end universe and session runs
//! - `properties.rs`: randomized invariant checks
//! - `helpers.rs`: test doubles and factory functions

pub(crate) mod helpers;
