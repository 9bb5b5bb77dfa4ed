//! Property-based tests for the constant-product math.
//!
//! These pin down the behaviors the pool engine relies on across the whole
//! input space rather than at hand-picked points:
//!
//! 1. A swap never drains the output reserve
//! 2. Fee splitting is exact and monotonic in the fee rate
//! 3. Price impact is non-negative and grows with trade size
//! 4. Proportional deposit then withdrawal is a round trip
//! 5. Genesis share issuance never goes below the floor

use proptest::prelude::*;

use basin_amm::{
    build_swap_quote, shares_for_deposit, split_fee, swap_output, withdrawal_amounts,
    MINIMUM_INITIAL_SHARES,
};
use basin_types::Side;

prop_compose! {
    /// Reserves large enough that per-unit rounding stays far below the
    /// relative tolerances asserted here.
    fn arb_reserves()(
        reserve_in in 1_000.0..1_000_000_000.0f64,
        reserve_out in 1_000.0..1_000_000_000.0f64,
    ) -> (f64, f64) {
        (reserve_in, reserve_out)
    }
}

prop_compose! {
    /// A swap scenario with the input sized relative to its reserve, from
    /// dust (1e-6 of the pool) up to half the pool.
    fn arb_swap()(
        (reserve_in, reserve_out) in arb_reserves(),
        size_fraction in 0.000_001..0.5f64,
    ) -> (f64, f64, f64) {
        (reserve_in * size_fraction, reserve_in, reserve_out)
    }
}

proptest! {
    #[test]
    fn test_swap_output_bounded_by_reserve(
        (amount_in, reserve_in, reserve_out) in arb_swap()
    ) {
        let out = swap_output(amount_in, reserve_in, reserve_out).unwrap();
        prop_assert!(out > 0.0);
        prop_assert!(out < reserve_out);
    }

    #[test]
    fn test_fee_split_exact_and_monotonic(
        amount_in in 0.01..1_000_000.0f64,
        low_rate in 0.0..0.01f64,
        rate_bump in 0.000_1..0.01f64,
    ) {
        let low = split_fee(amount_in, low_rate).unwrap();
        let high = split_fee(amount_in, low_rate + rate_bump).unwrap();

        // Exactness: the after-fee amount is the f64 difference itself, so
        // nothing drifts before the downstream formulas see it
        prop_assert_eq!(low.amount_after_fee, amount_in - low.fee);
        prop_assert_eq!(high.amount_after_fee, amount_in - high.fee);

        // A higher rate takes a strictly larger fee
        prop_assert!(high.fee > low.fee);
        prop_assert!(high.amount_after_fee < low.amount_after_fee);
    }

    #[test]
    fn test_price_impact_non_negative_and_grows_with_size(
        (amount_in, reserve_in, reserve_out) in arb_swap()
    ) {
        let full = build_swap_quote(
            Side::A, amount_in, reserve_in, reserve_out, 0.003, 0.005,
        ).unwrap();
        let half = build_swap_quote(
            Side::A, amount_in / 2.0, reserve_in, reserve_out, 0.003, 0.005,
        ).unwrap();

        prop_assert!(full.price_impact >= 0.0);
        prop_assert!(half.price_impact >= 0.0);
        // Halving the trade strictly reduces impact at these sizes
        prop_assert!(half.price_impact < full.price_impact);
    }

    #[test]
    fn test_proportional_liquidity_round_trip(
        reserve_a in 1_000.0..1_000_000_000.0f64,
        reserve_b in 1_000.0..1_000_000_000.0f64,
        total_shares in 1_000.0..1_000_000_000.0f64,
        fraction in 0.001..1.0f64,
    ) {
        let amount_a = reserve_a * fraction;
        let amount_b = reserve_b * fraction;

        let shares = shares_for_deposit(
            amount_a, amount_b, reserve_a, reserve_b, total_shares,
        ).unwrap();

        // Withdraw the same shares from the post-deposit pool
        let (back_a, back_b) = withdrawal_amounts(
            shares,
            reserve_a + amount_a,
            reserve_b + amount_b,
            total_shares + shares,
        ).unwrap();

        prop_assert!((back_a - amount_a).abs() <= amount_a * 1e-9);
        prop_assert!((back_b - amount_b).abs() <= amount_b * 1e-9);
    }

    #[test]
    fn test_genesis_shares_respect_floor(
        amount_a in 0.000_1..10_000_000.0f64,
        amount_b in 0.000_1..10_000_000.0f64,
    ) {
        let shares = shares_for_deposit(amount_a, amount_b, 0.0, 0.0, 0.0).unwrap();
        prop_assert!(shares >= MINIMUM_INITIAL_SHARES);
        prop_assert!(shares >= (amount_a * amount_b).sqrt());
    }
}
