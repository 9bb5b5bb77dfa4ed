//! # Basin Shared Types
//!
//! Common vocabulary for the Basin pool simulator: the two pool sides, the
//! immutable pool snapshot handed out by the engine, and the numeric policy
//! constants every caller of the core must agree on.
//!
//! This crate sits at the bottom of the workspace dependency graph and pulls
//! in nothing beyond serde, so the math, engine, and validation crates can
//! all share one definition of "side A" without depending on each other.

pub mod constants;
pub mod side;
pub mod snapshot;

pub use side::Side;
pub use snapshot::{AccumulatedFees, PoolSnapshot};
