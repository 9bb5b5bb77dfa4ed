//! Pool state engine for the two-asset constant-product pool.
//!
//! Owns the reserves, the share ledger, and the fee counters behind a single
//! `parking_lot::RwLock`. Reads hand out [`PoolSnapshot`] copies; writes go
//! through a [`PoolWriteGuard`] that keeps an entire
//! snapshot-validate-quote-commit sequence under one lock acquisition.
//! Mutations commit a fully-checked candidate state or change nothing.
//!
//! [`PoolSnapshot`]: basin_types::PoolSnapshot

pub mod engine;
pub mod error;
pub mod state;

pub use engine::{PoolEngine, PoolWriteGuard, K_EPSILON_ABS, K_EPSILON_REL};
pub use error::PoolError;
pub use state::PoolSeed;
