//! Immutable pool state snapshots.

use crate::side::Side;
use serde::{Deserialize, Serialize};

/// Fees collected so far, denominated per side.
///
/// Informational counters only: collected fees are not escrowed anywhere,
/// they stay inside the reserves and reach liquidity providers through
/// proportional withdrawal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccumulatedFees {
    pub a: f64,
    pub b: f64,
}

impl AccumulatedFees {
    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    /// Add a collected fee to one side's counter.
    pub fn credit(&mut self, side: Side, amount: f64) {
        match side {
            Side::A => self.a += amount,
            Side::B => self.b += amount,
        }
    }
}

/// A consistent copy of the full pool state, taken under the engine's lock.
///
/// Handlers validate and price against a snapshot, never against live state;
/// the engine hands one out per read or at the start of a locked mutation
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub reserve_a: f64,
    pub reserve_b: f64,
    pub total_shares: f64,
    pub fees: AccumulatedFees,
    pub k: f64,
}

impl PoolSnapshot {
    pub fn reserve(&self, side: Side) -> f64 {
        match side {
            Side::A => self.reserve_a,
            Side::B => self.reserve_b,
        }
    }

    /// Current constant product of the two reserves.
    pub fn product(&self) -> f64 {
        self.reserve_a * self.reserve_b
    }
}
