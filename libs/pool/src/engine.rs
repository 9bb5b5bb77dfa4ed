//! Pool engine: the single writer for pool state.
//!
//! All mutations run the same way: take the write lock, build a complete
//! candidate state from the caller's amounts, check the candidate (reserves
//! stay positive and finite, constant product stays at or above the tracked
//! floor), then replace the live state with the candidate in one assignment.
//! A rejected candidate is dropped, so a failed mutation cannot leave the
//! pool half-updated.
//!
//! The engine does not price anything. Callers quote with `basin-amm`
//! against a snapshot taken from the same [`PoolWriteGuard`] they later
//! commit through, which keeps the snapshot-validate-quote-commit sequence
//! serialized against concurrent writers.

use basin_types::{AccumulatedFees, PoolSnapshot, Side};
use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{info, warn};

use crate::error::PoolError;
use crate::state::{PoolSeed, PoolState};

/// Absolute slack under the tracked product floor.
pub const K_EPSILON_ABS: f64 = 1e-6;

/// Relative slack, scaled by the tracked product. Dominates for deep pools
/// where f64 rounding on the product exceeds the absolute term.
pub const K_EPSILON_REL: f64 = 1e-12;

/// Lowest product the invariant check accepts for a tracked `k`.
fn k_floor(k: f64) -> f64 {
    k - K_EPSILON_ABS.max(k * K_EPSILON_REL)
}

fn check_amount(name: &str, value: f64) -> Result<(), PoolError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PoolError::InvalidArgument {
            reason: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(())
}

fn check_fee(value: f64) -> Result<(), PoolError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PoolError::InvalidArgument {
            reason: format!("fee must be non-negative and finite, got {value}"),
        });
    }
    Ok(())
}

fn check_reserve(side: Side, resulting: f64) -> Result<(), PoolError> {
    if !resulting.is_finite() {
        return Err(PoolError::InvalidArgument {
            reason: format!("{side} reserve would become non-finite"),
        });
    }
    if resulting <= 0.0 {
        return Err(PoolError::ReserveDepleted { side, resulting });
    }
    Ok(())
}

/// Thread-safe owner of the pool state.
pub struct PoolEngine {
    state: RwLock<PoolState>,
    seed: PoolSeed,
}

impl PoolEngine {
    pub fn new(seed: PoolSeed) -> Result<Self, PoolError> {
        let state = PoolState::seeded(&seed)?;
        info!(
            reserve_a = seed.reserve_a,
            reserve_b = seed.reserve_b,
            total_shares = state.total_shares,
            "pool seeded"
        );
        Ok(Self {
            state: RwLock::new(state),
            seed,
        })
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> PoolSnapshot {
        self.state.read().snapshot()
    }

    pub fn reserve(&self, side: Side) -> f64 {
        self.state.read().reserve(side)
    }

    pub fn total_shares(&self) -> f64 {
        self.state.read().total_shares
    }

    /// Copy of the fee counters, not a live reference.
    pub fn accumulated_fees(&self) -> AccumulatedFees {
        self.state.read().fees
    }

    pub fn k(&self) -> f64 {
        self.state.read().k
    }

    /// Acquire the write lock for a snapshot-validate-commit sequence.
    ///
    /// Hold the guard across the whole sequence; quoting against a snapshot
    /// from one guard and committing under another reintroduces the race
    /// this lock exists to prevent.
    pub fn write(&self) -> PoolWriteGuard<'_> {
        PoolWriteGuard {
            state: self.state.write(),
            seed: &self.seed,
        }
    }

    /// Restore the seeded state, discarding all swaps and liquidity events.
    pub fn reset(&self) -> Result<PoolSnapshot, PoolError> {
        self.write().reset()
    }
}

/// Exclusive access to the pool state for one mutation sequence.
pub struct PoolWriteGuard<'a> {
    state: RwLockWriteGuard<'a, PoolState>,
    seed: &'a PoolSeed,
}

impl PoolWriteGuard<'_> {
    /// State as of this guard; stable until the guard commits or drops.
    pub fn snapshot(&self) -> PoolSnapshot {
        self.state.snapshot()
    }

    /// Apply a priced swap: the full input (fee included) enters the input
    /// reserve, the output leaves the other side, and the fee is credited
    /// to the input side's counter.
    ///
    /// The product after a fee-bearing swap exceeds the product before it,
    /// so the tracked `k` only ratchets upward here.
    pub fn execute_swap(
        &mut self,
        input_side: Side,
        output_side: Side,
        amount_in: f64,
        amount_out: f64,
        fee: f64,
    ) -> Result<PoolSnapshot, PoolError> {
        if input_side == output_side {
            return Err(PoolError::InvalidArgument {
                reason: format!("swap input and output are both {input_side}"),
            });
        }
        check_amount("amount_in", amount_in)?;
        check_amount("amount_out", amount_out)?;
        check_fee(fee)?;

        let mut candidate = self.state.clone();
        candidate.set_reserve(input_side, candidate.reserve(input_side) + amount_in);
        candidate.set_reserve(output_side, candidate.reserve(output_side) - amount_out);

        check_reserve(input_side, candidate.reserve(input_side))?;
        check_reserve(output_side, candidate.reserve(output_side))?;

        let product = candidate.reserve_a * candidate.reserve_b;
        let floor = k_floor(self.state.k);
        if product < floor {
            warn!(
                product,
                floor,
                amount_in,
                amount_out,
                "swap rejected: constant product below floor"
            );
            return Err(PoolError::InvariantViolation { product, floor });
        }

        candidate.fees.credit(input_side, fee);
        candidate.k = self.state.k.max(product);
        *self.state = candidate;

        info!(
            %input_side,
            amount_in,
            amount_out,
            fee,
            reserve_a = self.state.reserve_a,
            reserve_b = self.state.reserve_b,
            "swap executed"
        );
        Ok(self.state.snapshot())
    }

    /// Credit a deposit: both reserves grow, shares are minted.
    ///
    /// Liquidity changes move the product legitimately, so `k` is recomputed
    /// from the committed reserves rather than checked against the old
    /// floor.
    pub fn add_liquidity(
        &mut self,
        amount_a: f64,
        amount_b: f64,
        shares: f64,
    ) -> Result<PoolSnapshot, PoolError> {
        check_amount("amount_a", amount_a)?;
        check_amount("amount_b", amount_b)?;
        check_amount("shares", shares)?;

        let mut candidate = self.state.clone();
        candidate.reserve_a += amount_a;
        candidate.reserve_b += amount_b;
        candidate.total_shares += shares;

        check_reserve(Side::A, candidate.reserve_a)?;
        check_reserve(Side::B, candidate.reserve_b)?;
        if !candidate.total_shares.is_finite() {
            return Err(PoolError::InvalidArgument {
                reason: "total shares would become non-finite".to_string(),
            });
        }

        candidate.k = candidate.reserve_a * candidate.reserve_b;
        *self.state = candidate;

        info!(
            amount_a,
            amount_b,
            shares,
            total_shares = self.state.total_shares,
            "liquidity added"
        );
        Ok(self.state.snapshot())
    }

    /// Burn shares and release the corresponding reserves.
    ///
    /// A withdrawal that would empty either reserve is refused even when the
    /// share math allows it; the pool never goes back below one unit of
    /// liquidity on a side.
    pub fn withdraw_liquidity(
        &mut self,
        amount_a: f64,
        amount_b: f64,
        shares: f64,
    ) -> Result<PoolSnapshot, PoolError> {
        check_amount("amount_a", amount_a)?;
        check_amount("amount_b", amount_b)?;
        check_amount("shares", shares)?;

        if shares > self.state.total_shares {
            return Err(PoolError::InvalidArgument {
                reason: format!(
                    "cannot burn {shares} shares, only {} outstanding",
                    self.state.total_shares
                ),
            });
        }

        let mut candidate = self.state.clone();
        candidate.reserve_a -= amount_a;
        candidate.reserve_b -= amount_b;
        candidate.total_shares -= shares;

        check_reserve(Side::A, candidate.reserve_a)?;
        check_reserve(Side::B, candidate.reserve_b)?;

        candidate.k = candidate.reserve_a * candidate.reserve_b;
        *self.state = candidate;

        info!(
            shares,
            amount_a,
            amount_b,
            total_shares = self.state.total_shares,
            "liquidity withdrawn"
        );
        Ok(self.state.snapshot())
    }

    /// Replace the live state with a fresh seeded one.
    pub fn reset(&mut self) -> Result<PoolSnapshot, PoolError> {
        let fresh = PoolState::seeded(self.seed)?;
        *self.state = fresh;
        warn!(
            reserve_a = self.seed.reserve_a,
            reserve_b = self.seed.reserve_b,
            "pool state reset to seed"
        );
        Ok(self.state.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basin_amm::build_swap_quote;

    fn engine() -> PoolEngine {
        PoolEngine::new(PoolSeed {
            reserve_a: 1_000_000.0,
            reserve_b: 1_000_000.0,
        })
        .unwrap()
    }

    #[test]
    fn test_read_accessors_match_snapshot() {
        let engine = engine();
        let snap = engine.snapshot();
        assert_eq!(engine.reserve(Side::A), snap.reserve_a);
        assert_eq!(engine.reserve(Side::B), snap.reserve_b);
        assert_eq!(engine.total_shares(), snap.total_shares);
        assert_eq!(engine.accumulated_fees(), snap.fees);
        assert_eq!(engine.k(), snap.k);
    }

    #[test]
    fn test_swap_commits_reserves_fees_and_k() {
        let engine = engine();
        let mut guard = engine.write();
        let before = guard.snapshot();

        let quote =
            build_swap_quote(Side::A, 10.0, before.reserve_a, before.reserve_b, 0.003, 0.005)
                .unwrap();
        let after = guard
            .execute_swap(Side::A, Side::B, quote.amount_in, quote.expected_out, quote.fee)
            .unwrap();

        // Full input including the fee lands in the A reserve
        assert_eq!(after.reserve_a, 1_000_010.0);
        assert!((after.reserve_b - 999_990.0301).abs() < 1e-3);
        assert!((after.fees.a - 0.03).abs() < 1e-9);
        assert_eq!(after.fees.b, 0.0);
        // Fee retention pushes the product, and with it k, upward
        assert!(after.k > before.k);
        assert_eq!(after.total_shares, before.total_shares);
    }

    #[test]
    fn test_swap_sequence_preserves_invariant() {
        let engine = engine();
        for round in 0..50 {
            let side = if round % 2 == 0 { Side::A } else { Side::B };
            let mut guard = engine.write();
            let snap = guard.snapshot();
            let quote = build_swap_quote(
                side,
                1_000.0,
                snap.reserve(side),
                snap.reserve(side.opposite()),
                0.003,
                0.005,
            )
            .unwrap();
            let after = guard
                .execute_swap(side, side.opposite(), quote.amount_in, quote.expected_out, quote.fee)
                .unwrap();
            assert!(after.product() >= k_floor(after.k));
        }
    }

    #[test]
    fn test_swap_that_overdraws_output_is_rejected_atomically() {
        let engine = engine();
        let before = engine.snapshot();

        let mut guard = engine.write();
        let result = guard.execute_swap(Side::A, Side::B, 10.0, 2_000_000.0, 0.03);
        assert!(matches!(
            result,
            Err(PoolError::ReserveDepleted { side: Side::B, .. })
        ));
        drop(guard);

        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_swap_breaking_the_product_floor_is_rejected() {
        let engine = engine();
        let mut guard = engine.write();

        // Far more output than the formula allows for 10 in
        let result = guard.execute_swap(Side::A, Side::B, 10.0, 1_000.0, 0.03);
        assert!(matches!(result, Err(PoolError::InvariantViolation { .. })));
    }

    #[test]
    fn test_same_side_swap_rejected() {
        let engine = engine();
        let mut guard = engine.write();
        let result = guard.execute_swap(Side::A, Side::A, 10.0, 9.97, 0.03);
        assert!(matches!(result, Err(PoolError::InvalidArgument { .. })));
    }

    #[test]
    fn test_non_finite_amounts_rejected() {
        let engine = engine();
        let mut guard = engine.write();
        assert!(guard
            .execute_swap(Side::A, Side::B, f64::NAN, 9.97, 0.03)
            .is_err());
        assert!(guard
            .execute_swap(Side::A, Side::B, f64::INFINITY, 9.97, 0.03)
            .is_err());
        assert!(guard.add_liquidity(f64::NAN, 100.0, 100.0).is_err());
        assert!(guard.withdraw_liquidity(f64::INFINITY, 100.0, 100.0).is_err());
    }

    #[test]
    fn test_add_then_withdraw_round_trip() {
        let engine = engine();
        let mut guard = engine.write();
        let before = guard.snapshot();

        let added = guard.add_liquidity(100.0, 100.0, 100.0).unwrap();
        assert_eq!(added.reserve_a, 1_000_100.0);
        assert_eq!(added.total_shares, before.total_shares + 100.0);
        // k tracks the product exactly after a liquidity event
        assert_eq!(added.k, added.product());

        let after = guard.withdraw_liquidity(100.0, 100.0, 100.0).unwrap();
        assert_eq!(after.reserve_a, before.reserve_a);
        assert_eq!(after.reserve_b, before.reserve_b);
        assert_eq!(after.total_shares, before.total_shares);
        assert_eq!(after.k, after.product());
    }

    #[test]
    fn test_withdraw_cannot_deplete_a_reserve() {
        let engine = engine();
        let before = engine.snapshot();

        let mut guard = engine.write();
        let result = guard.withdraw_liquidity(
            before.reserve_a,
            before.reserve_b,
            before.total_shares,
        );
        assert!(matches!(result, Err(PoolError::ReserveDepleted { .. })));
        drop(guard);

        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_withdraw_more_shares_than_outstanding_rejected() {
        let engine = engine();
        let mut guard = engine.write();
        let total = guard.snapshot().total_shares;
        let result = guard.withdraw_liquidity(10.0, 10.0, total * 2.0);
        assert!(matches!(result, Err(PoolError::InvalidArgument { .. })));
    }

    #[test]
    fn test_reset_restores_seed() {
        let engine = engine();
        let genesis = engine.snapshot();

        {
            let mut guard = engine.write();
            guard.add_liquidity(5_000.0, 5_000.0, 5_000.0).unwrap();
            guard
                .execute_swap(Side::B, Side::A, 250.0, 248.0, 0.75)
                .unwrap();
        }
        assert_ne!(engine.snapshot(), genesis);

        engine.reset().unwrap();
        assert_eq!(engine.snapshot(), genesis);
    }

    #[test]
    fn test_guard_covers_a_multi_step_sequence() {
        let engine = engine();
        let mut guard = engine.write();

        let snap = guard.snapshot();
        let quote =
            build_swap_quote(Side::A, 500.0, snap.reserve_a, snap.reserve_b, 0.003, 0.005)
                .unwrap();
        guard
            .execute_swap(Side::A, Side::B, quote.amount_in, quote.expected_out, quote.fee)
            .unwrap();
        let mid = guard.snapshot();
        guard.add_liquidity(1_000.0, 1_000.0, 999.0).unwrap();
        let end = guard.snapshot();

        assert!(mid.reserve_a > snap.reserve_a);
        assert_eq!(end.reserve_a, mid.reserve_a + 1_000.0);
    }
}
