//! # Basin AMM Library - Constant-Product Pool Mathematics
//!
//! ## Purpose
//!
//! Pure mathematical core for the Basin pool simulator. Implements the
//! constant-product (x*y=k) pricing formula together with the fee split,
//! spot price, price impact, slippage bound, and liquidity-share functions
//! that every swap and liquidity operation is computed from. All functions
//! are stateless and side-effect-free: they take plain numbers (or a reserve
//! snapshot's fields) and either return a value or fail with a typed
//! [`AmmError`].
//!
//! ## Integration Points
//!
//! - **Input Sources**: reserve snapshots from `basin-pool`, request
//!   parameters forwarded by the HTTP handlers
//! - **Output Destinations**: the pool engine (computed swap/liquidity
//!   deltas) and the API layer (assembled [`SwapQuote`]s)
//! - **Error Contract**: non-finite input, or non-positive input where the
//!   formula requires strict positivity, is a caller bug and surfaces as an
//!   [`AmmError`] — expected, routine rejections are the job of
//!   `basin-validation`, not this crate
//!
//! ## Architecture Role
//!
//! The math crate is a leaf: it depends only on `basin-types` and owns no
//! state. Both the pool engine and the request handlers call into it, which
//! is what keeps pricing consistent between quoting and execution.

pub mod math;
pub mod quote;

pub use math::{
    meets_min_output, min_output, price_impact, shares_for_deposit, spot_price, split_fee,
    swap_output, withdrawal_amounts, AmmError, FeeSplit, MINIMUM_INITIAL_SHARES,
};
pub use quote::{build_swap_quote, SwapQuote};
