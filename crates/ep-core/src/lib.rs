//! ep-core: stable foundation for enpath.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - lookup (name-keyed nested maps with get-or-default semantics)
//!
//! Everything here is total: the cascade's "missing data means zero
//! contribution" policy starts with these helpers. Crates that can actually
//! fail (file formats, the year loop) carry their own error types.

pub mod lookup;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use lookup::*;
pub use numeric::*;
