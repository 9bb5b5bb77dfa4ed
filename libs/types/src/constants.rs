//! Numeric policy constants shared across the workspace.
//!
//! The core crates take these as plain parameters and never read
//! configuration themselves; centralizing the values here keeps every call
//! site supplying the same numbers (see `basin-api` for the runtime
//! overrides).

/// Swap fee retained by the pool, as a fraction of the input amount (0.30%).
pub const FEE_RATE: f64 = 0.003;

/// Slippage tolerance applied when a request does not specify one (0.5%).
pub const DEFAULT_SLIPPAGE_TOLERANCE: f64 = 0.005;

/// Tolerances tighter than this are treated as unfillable (0.01%).
pub const MIN_SLIPPAGE_TOLERANCE: f64 = 0.0001;

/// Tolerances above 50% are almost certainly a caller mistake.
pub const MAX_SLIPPAGE_TOLERANCE: f64 = 0.5;

/// Price impact above which the validation advisory attaches a warning (5%).
pub const PRICE_IMPACT_WARN_THRESHOLD: f64 = 0.05;

/// Stricter threshold used when flagging quotes at the API boundary (1%).
pub const QUOTE_IMPACT_WARN_THRESHOLD: f64 = 0.01;

/// Smallest tradeable amount; anything below is rejected as dust.
pub const MIN_SWAP_AMOUNT: f64 = 0.01;

/// Largest single-transaction amount accepted by validation.
pub const MAX_SWAP_AMOUNT: f64 = 1_000_000.0;

/// Reserves may never be left below this floor by a liquidity operation.
pub const MIN_POOL_RESERVE: f64 = 1_000.0;

/// Relative tolerance when matching a deposit ratio to the reserve ratio (1%).
pub const LIQUIDITY_RATIO_TOLERANCE: f64 = 0.01;

/// Seed reserves for the side-A balance at process start.
pub const SEED_RESERVE_A: f64 = 1_000_000.0;

/// Seed reserves for the side-B balance at process start.
pub const SEED_RESERVE_B: f64 = 1_000_000.0;
