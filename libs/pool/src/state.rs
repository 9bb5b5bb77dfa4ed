//! Pool state container and seeding.

use basin_amm::shares_for_deposit;
use basin_types::{constants, AccumulatedFees, PoolSnapshot, Side};

use crate::error::PoolError;

/// Reserves the pool starts from, and returns to on reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSeed {
    pub reserve_a: f64,
    pub reserve_b: f64,
}

impl Default for PoolSeed {
    fn default() -> Self {
        Self {
            reserve_a: constants::SEED_RESERVE_A,
            reserve_b: constants::SEED_RESERVE_B,
        }
    }
}

/// Live pool state. Only ever touched behind the engine's lock; everything
/// outside this crate sees it as a [`PoolSnapshot`].
#[derive(Debug, Clone)]
pub(crate) struct PoolState {
    pub reserve_a: f64,
    pub reserve_b: f64,
    pub total_shares: f64,
    pub fees: AccumulatedFees,
    /// Constant-product reference: ratcheted upward after swaps, recomputed
    /// exactly after liquidity changes.
    pub k: f64,
}

impl PoolState {
    /// Fresh state from a seed, with genesis shares issued against it.
    pub fn seeded(seed: &PoolSeed) -> Result<Self, PoolError> {
        let total_shares = shares_for_deposit(seed.reserve_a, seed.reserve_b, 0.0, 0.0, 0.0)?;
        Ok(Self {
            reserve_a: seed.reserve_a,
            reserve_b: seed.reserve_b,
            total_shares,
            fees: AccumulatedFees::default(),
            k: seed.reserve_a * seed.reserve_b,
        })
    }

    pub fn reserve(&self, side: Side) -> f64 {
        match side {
            Side::A => self.reserve_a,
            Side::B => self.reserve_b,
        }
    }

    pub fn set_reserve(&mut self, side: Side, value: f64) {
        match side {
            Side::A => self.reserve_a = value,
            Side::B => self.reserve_b = value,
        }
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            reserve_a: self.reserve_a,
            reserve_b: self.reserve_b,
            total_shares: self.total_shares,
            fees: self.fees,
            k: self.k,
        }
    }
}
