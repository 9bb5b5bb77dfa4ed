//! Swap quote construction.
//!
//! A quote bundles everything the pool engine and the caller need to decide
//! whether to execute: the fee split, the expected output, the spot price it
//! was computed against, the price impact, and the slippage-protected
//! minimum output. Quotes are pure values computed against a reserve
//! snapshot; they hold no locks and do not reserve liquidity.

use basin_types::Side;
use serde::{Deserialize, Serialize};

use crate::math::{self, AmmError};

/// A fully-priced swap against a specific reserve snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub input_side: Side,
    pub output_side: Side,
    /// Gross input, fee included.
    pub amount_in: f64,
    pub fee: f64,
    /// Net input entering the constant-product formula.
    pub amount_in_after_fee: f64,
    pub expected_out: f64,
    /// Spot price at quote time, output units per input unit.
    pub spot_price: f64,
    pub price_impact: f64,
    pub slippage_tolerance: f64,
    /// Smallest output the caller will accept at execution.
    pub min_amount_out: f64,
}

impl SwapQuote {
    /// Whether an executed output honors this quote's slippage bound.
    pub fn meets_minimum(&self, actual_out: f64) -> bool {
        math::meets_min_output(actual_out, self.min_amount_out)
    }
}

/// Price a swap of `amount_in` on `input_side` against the given reserves.
///
/// Pipeline: fee split, constant-product output on the after-fee amount,
/// spot price, price impact of the gross amount, slippage-adjusted minimum.
/// The reserves must be the ones a subsequent execution will run against or
/// the quote's impact and minimum are meaningless.
pub fn build_swap_quote(
    input_side: Side,
    amount_in: f64,
    reserve_in: f64,
    reserve_out: f64,
    fee_rate: f64,
    slippage_tolerance: f64,
) -> Result<SwapQuote, AmmError> {
    let split = math::split_fee(amount_in, fee_rate)?;
    let expected_out = math::swap_output(split.amount_after_fee, reserve_in, reserve_out)?;
    let spot = math::spot_price(reserve_out, reserve_in)?;
    // Impact is judged on the gross amount: the fee is part of what the
    // trader pays, so it shows up as execution shortfall.
    let impact = math::price_impact(expected_out, amount_in, spot)?;
    let min_amount_out = math::min_output(expected_out, slippage_tolerance)?;

    Ok(SwapQuote {
        input_side,
        output_side: input_side.opposite(),
        amount_in,
        fee: split.fee,
        amount_in_after_fee: split.amount_after_fee,
        expected_out,
        spot_price: spot,
        price_impact: impact,
        slippage_tolerance,
        min_amount_out,
    })
}
