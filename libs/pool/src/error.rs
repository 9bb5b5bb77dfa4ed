//! Pool engine errors.

use basin_amm::AmmError;
use basin_types::Side;
use thiserror::Error;

/// Errors from pool state mutations.
///
/// Any error here means the mutation was refused in full; the live state is
/// exactly what it was before the call.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A mutation would have taken a reserve to zero or below.
    #[error("{side} reserve would be depleted to {resulting}")]
    ReserveDepleted { side: Side, resulting: f64 },

    /// The candidate state's constant product fell under the tracked floor.
    /// This points at corrupt amounts from the caller, not rounding: the
    /// floor already carries the rounding tolerance.
    #[error("constant product invariant violated: product {product} below floor {floor}")]
    InvariantViolation { product: f64, floor: f64 },

    /// A caller-supplied amount the engine cannot apply, such as a
    /// non-finite delta or a swap quoted against a single side.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("math error: {0}")]
    Math(#[from] AmmError),
}
