//! Constant-product swap and liquidity math.
//!
//! Every function validates its own domain: non-finite values are rejected
//! everywhere, and strictly-positive inputs are required wherever the
//! formula divides by them or the result would be economically meaningless.
//! Quantities are `f64`; the engine's invariant tolerance absorbs the
//! rounding this introduces.

use thiserror::Error;

/// Floor on shares issued by the genesis deposit.
///
/// Guards the proportional share math against degenerate near-zero share
/// counts when the seed pool is tiny. Not an economic rule; the value must
/// stay exact.
pub const MINIMUM_INITIAL_SHARES: f64 = 1000.0;

/// Errors for math inputs outside a formula's domain.
///
/// These indicate a caller bug (validation skipped or bypassed), not a
/// routine rejection, and are never retried.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum AmmError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("spot price is undefined: {name} is zero")]
    ZeroReserve { name: &'static str },
}

fn ensure_finite(name: &'static str, value: f64) -> Result<(), AmmError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AmmError::NonFinite { name, value })
    }
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), AmmError> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(AmmError::NonPositive { name, value })
    }
}

/// Calculate the output amount for a swap using the x*y=k formula.
///
/// `amount_out = amount_in * reserve_out / (reserve_in + amount_in)`
///
/// Monotonically increasing in `amount_in` for fixed reserves, and strictly
/// less than `reserve_out` for any finite positive input — a swap can
/// approach the output reserve asymptotically but never drain it.
///
/// # Arguments
/// * `amount_in` - Input amount, after any fee deduction the caller applies
/// * `reserve_in` - Reserve on the input side
/// * `reserve_out` - Reserve on the output side
pub fn swap_output(amount_in: f64, reserve_in: f64, reserve_out: f64) -> Result<f64, AmmError> {
    ensure_positive("amount_in", amount_in)?;
    ensure_positive("reserve_in", reserve_in)?;
    ensure_positive("reserve_out", reserve_out)?;

    Ok(amount_in * reserve_out / (reserve_in + amount_in))
}

/// A swap input split into the pool fee and the amount actually traded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSplit {
    pub fee: f64,
    pub amount_after_fee: f64,
}

/// Split an input amount into fee and after-fee parts.
///
/// `fee = amount_in * fee_rate`; the remainder is what enters the swap
/// formula. The subtraction is exact in f64, so no drift is introduced
/// before the downstream formulas. Callers are responsible for only passing
/// economically meaningful (positive) amounts.
pub fn split_fee(amount_in: f64, fee_rate: f64) -> Result<FeeSplit, AmmError> {
    ensure_finite("amount_in", amount_in)?;
    ensure_finite("fee_rate", fee_rate)?;

    let fee = amount_in * fee_rate;
    Ok(FeeSplit {
        fee,
        amount_after_fee: amount_in - fee,
    })
}

/// Spot price of the input asset expressed in output-asset units.
///
/// `price = reserve_out / reserve_in`. Fails with a domain error when the
/// input reserve is zero.
pub fn spot_price(reserve_out: f64, reserve_in: f64) -> Result<f64, AmmError> {
    ensure_finite("reserve_in", reserve_in)?;
    ensure_positive("reserve_out", reserve_out)?;
    if reserve_in == 0.0 {
        return Err(AmmError::ZeroReserve { name: "reserve_in" });
    }
    if reserve_in < 0.0 {
        return Err(AmmError::NonPositive {
            name: "reserve_in",
            value: reserve_in,
        });
    }

    Ok(reserve_out / reserve_in)
}

/// Price impact of a trade relative to the spot price.
///
/// `impact = max(0, 1 - (amount_out / amount_in) / spot_price)`
///
/// Execution under this AMM can only be at or worse than spot, so the value
/// is clamped at zero: rounding or mis-ordered inputs must not surface as a
/// negative "impact".
pub fn price_impact(amount_out: f64, amount_in: f64, spot_price: f64) -> Result<f64, AmmError> {
    ensure_finite("amount_out", amount_out)?;
    ensure_positive("amount_in", amount_in)?;
    ensure_positive("spot_price", spot_price)?;

    let execution_rate = amount_out / amount_in;
    Ok((1.0 - execution_rate / spot_price).max(0.0))
}

/// Smallest acceptable output under a slippage tolerance.
///
/// `min_output = expected_out * (1 - slippage_tolerance)`
pub fn min_output(expected_out: f64, slippage_tolerance: f64) -> Result<f64, AmmError> {
    ensure_finite("expected_out", expected_out)?;
    ensure_finite("slippage_tolerance", slippage_tolerance)?;

    Ok(expected_out * (1.0 - slippage_tolerance))
}

/// Whether an executed output satisfies the minimum the caller demanded.
pub fn meets_min_output(actual_out: f64, min_out: f64) -> bool {
    actual_out >= min_out
}

/// Liquidity shares issued for a deposit.
///
/// Genesis deposit (`total_shares == 0`) issues
/// `max(sqrt(amount_a * amount_b), MINIMUM_INITIAL_SHARES)`. Afterwards the
/// deposit is credited at `min(amount_a/reserve_a, amount_b/reserve_b) *
/// total_shares`: a disproportionate deposit only earns shares up to its
/// more constrained side, so it cannot dilute existing holders.
pub fn shares_for_deposit(
    amount_a: f64,
    amount_b: f64,
    reserve_a: f64,
    reserve_b: f64,
    total_shares: f64,
) -> Result<f64, AmmError> {
    ensure_positive("amount_a", amount_a)?;
    ensure_positive("amount_b", amount_b)?;
    ensure_finite("total_shares", total_shares)?;
    if total_shares < 0.0 {
        return Err(AmmError::NonPositive {
            name: "total_shares",
            value: total_shares,
        });
    }

    if total_shares == 0.0 {
        return Ok((amount_a * amount_b).sqrt().max(MINIMUM_INITIAL_SHARES));
    }

    ensure_positive("reserve_a", reserve_a)?;
    ensure_positive("reserve_b", reserve_b)?;

    let fraction_a = amount_a / reserve_a;
    let fraction_b = amount_b / reserve_b;
    Ok(fraction_a.min(fraction_b) * total_shares)
}

/// Amounts returned for burning a share count.
///
/// `ownership = shares / total_shares`, applied to both reserves. Collected
/// fees live inside the reserves, so a holder who sat through fee-generating
/// swaps withdraws more than they deposited — this is the only fee
/// distribution path; there is no separate claim operation.
pub fn withdrawal_amounts(
    shares: f64,
    reserve_a: f64,
    reserve_b: f64,
    total_shares: f64,
) -> Result<(f64, f64), AmmError> {
    ensure_positive("shares", shares)?;
    ensure_positive("reserve_a", reserve_a)?;
    ensure_positive("reserve_b", reserve_b)?;
    ensure_positive("total_shares", total_shares)?;

    let ownership = shares / total_shares;
    Ok((reserve_a * ownership, reserve_b * ownership))
}
