//! Input gates run before anything reaches the pool engine.
//!
//! Every gate is stateless and works from raw request values plus, where
//! needed, a reserve snapshot the caller already holds. Gates never touch
//! the pool and never raise; the engine's own checks behind them catch
//! whatever a skipped gate would have.

use basin_types::{constants, PoolSnapshot, Side};
use tracing::debug;

use crate::result::{ImpactAssessment, Validity};

fn reject(reason: String) -> Validity {
    debug!(%reason, "validation rejected");
    Validity::rejected(reason)
}

/// Bounds check shared by swap amounts and liquidity deposit amounts.
fn amount_bounds(label: &str, amount: f64) -> Validity {
    if !amount.is_finite() {
        return reject(format!("{label} must be a finite number"));
    }
    if amount <= 0.0 {
        return reject(format!("{label} must be positive, got {amount}"));
    }
    if amount < constants::MIN_SWAP_AMOUNT {
        return reject(format!(
            "{label} {amount} is below the minimum of {}",
            constants::MIN_SWAP_AMOUNT
        ));
    }
    if amount > constants::MAX_SWAP_AMOUNT {
        return reject(format!(
            "{label} {amount} exceeds the maximum of {}",
            constants::MAX_SWAP_AMOUNT
        ));
    }
    Validity::ok()
}

/// Gate a user-supplied swap amount.
pub fn validate_swap_amount(amount: f64) -> Validity {
    amount_bounds("swap amount", amount)
}

/// Gate a user-supplied slippage tolerance.
///
/// The ceiling of 50% is not a market condition; a tolerance that loose is
/// treated as a caller mistake.
pub fn validate_slippage_tolerance(tolerance: f64) -> Validity {
    if !tolerance.is_finite() {
        return reject("slippage tolerance must be a finite number".to_string());
    }
    if tolerance < 0.0 {
        return reject(format!("slippage tolerance cannot be negative, got {tolerance}"));
    }
    if tolerance < constants::MIN_SLIPPAGE_TOLERANCE {
        return reject(format!(
            "slippage tolerance {tolerance} is below the minimum of {}",
            constants::MIN_SLIPPAGE_TOLERANCE
        ));
    }
    if tolerance > constants::MAX_SLIPPAGE_TOLERANCE {
        return reject(format!(
            "slippage tolerance {tolerance} exceeds the maximum of {}",
            constants::MAX_SLIPPAGE_TOLERANCE
        ));
    }
    Validity::ok()
}

/// Advisory on a computed price impact.
///
/// Large impact is flagged, never rejected; traders are allowed to take bad
/// prices knowingly. Impact outside `[0, 1]` cannot come out of the pricing
/// math and is reported invalid.
pub fn assess_price_impact(impact: f64, warn_threshold: f64) -> ImpactAssessment {
    if !impact.is_finite() || !(0.0..=1.0).contains(&impact) {
        return ImpactAssessment::invalid(format!(
            "price impact {impact} is outside the possible range [0, 1]"
        ));
    }
    if impact > warn_threshold {
        return ImpactAssessment::warning(format!(
            "price impact {:.2}% exceeds the {:.2}% advisory threshold",
            impact * 100.0,
            warn_threshold * 100.0
        ));
    }
    ImpactAssessment::ok()
}

/// Gate a liquidity deposit against the current reserves.
///
/// Both amounts pass the shared bounds check, and the deposit ratio must
/// track the pool ratio within a relative tolerance so a mispriced deposit
/// cannot silently donate value to existing holders.
pub fn validate_add_liquidity(
    amount_a: f64,
    amount_b: f64,
    snapshot: &PoolSnapshot,
) -> Validity {
    let checked_a = amount_bounds("side A deposit", amount_a);
    if !checked_a.is_valid() {
        return checked_a;
    }
    let checked_b = amount_bounds("side B deposit", amount_b);
    if !checked_b.is_valid() {
        return checked_b;
    }

    if snapshot.reserve_a > 0.0 && snapshot.reserve_b > 0.0 {
        let pool_ratio = snapshot.reserve_a / snapshot.reserve_b;
        let deposit_ratio = amount_a / amount_b;
        let deviation = ((deposit_ratio - pool_ratio) / pool_ratio).abs();
        if deviation > constants::LIQUIDITY_RATIO_TOLERANCE {
            return reject(format!(
                "deposit ratio {deposit_ratio:.6} deviates {:.2}% from the pool ratio {pool_ratio:.6}, more than the {:.0}% allowed",
                deviation * 100.0,
                constants::LIQUIDITY_RATIO_TOLERANCE * 100.0
            ));
        }
    }

    for (side, reserve, amount) in [
        (Side::A, snapshot.reserve_a, amount_a),
        (Side::B, snapshot.reserve_b, amount_b),
    ] {
        if reserve + amount < constants::MIN_POOL_RESERVE {
            return reject(format!(
                "{side} reserve would stay at {} after the deposit, below the pool minimum of {}",
                reserve + amount,
                constants::MIN_POOL_RESERVE
            ));
        }
    }

    Validity::ok()
}

/// Gate a withdrawal against the outstanding share total and the reserve
/// floor.
///
/// The share ledger is aggregate-only, so the count is checked against the
/// pool-wide total; per-holder checks belong to whoever tracks ownership.
pub fn validate_withdrawal(shares: f64, snapshot: &PoolSnapshot) -> Validity {
    if !shares.is_finite() {
        return reject("share count must be a finite number".to_string());
    }
    if shares <= 0.0 {
        return reject(format!("share count must be positive, got {shares}"));
    }
    if snapshot.total_shares <= 0.0 {
        return reject("pool has no outstanding shares".to_string());
    }
    if shares > snapshot.total_shares {
        return reject(format!(
            "cannot burn {shares} shares, only {} outstanding",
            snapshot.total_shares
        ));
    }

    let ownership = shares / snapshot.total_shares;
    for (side, reserve) in [(Side::A, snapshot.reserve_a), (Side::B, snapshot.reserve_b)] {
        let remaining = reserve * (1.0 - ownership);
        if remaining < constants::MIN_POOL_RESERVE {
            return reject(format!(
                "withdrawal would leave the {side} reserve at {remaining:.4}, below the pool minimum of {}",
                constants::MIN_POOL_RESERVE
            ));
        }
    }

    Validity::ok()
}

/// Gate the token identifiers on a swap request.
pub fn validate_token_pair(
    token_in: &str,
    token_out: &str,
    symbol_a: &str,
    symbol_b: &str,
) -> Validity {
    for token in [token_in, token_out] {
        if token != symbol_a && token != symbol_b {
            return reject(format!(
                "unknown token {token}, this pool trades {symbol_a} and {symbol_b}"
            ));
        }
    }
    if token_in == token_out {
        return reject(format!("cannot swap {token_in} for itself"));
    }
    Validity::ok()
}
