//! Yearly projection engine for multi-sector energy systems.
//!
//! Provides:
//! - the six-stage per-year energy balance cascade (technology activity,
//!   FEC/UE, hydrogen, power, other-transform, primary energy demand)
//! - the yearly orchestrator carrying activity forward from the base year
//!   to the horizon
//! - the per-year result table consumed read-only by presentation layers
//!
//! The engine computes exactly one scenario per invocation, performs no I/O,
//! and treats the dataset as immutable for the duration of a run.

pub mod balance;
pub mod error;
pub mod result;
pub mod run;

// Re-exports for public API
pub use balance::{YearMixes, compute_balance};
pub use error::{EngineError, EngineResult};
pub use result::{Projection, YearlyResult};
pub use run::{RunOptions, run_projection, run_projection_with};
