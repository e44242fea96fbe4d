//! sk-core: stable foundation for the reachability monitor.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - sample (timestamped trajectory samples)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod sample;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use sample::TrajectorySample;
