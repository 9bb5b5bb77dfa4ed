//! Request validation for pool operations.
//!
//! Sits between the HTTP layer and the pool engine. Gates return structured
//! [`Validity`] values with human-readable reasons instead of errors, since
//! a rejected request is a routine outcome. The price-impact check is
//! advisory only and surfaces a warning rather than blocking the trade.

pub mod gates;
pub mod result;

pub use gates::{
    assess_price_impact, validate_add_liquidity, validate_slippage_tolerance,
    validate_swap_amount, validate_token_pair, validate_withdrawal,
};
pub use result::{ImpactAssessment, Validity};
