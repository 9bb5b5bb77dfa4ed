//! Pool side identifiers.
//!
//! The pool holds exactly two balances. Everything below the HTTP boundary
//! speaks in terms of side A and side B; mapping user-facing asset symbols
//! onto sides is the service layer's job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The other side of the pair.
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        assert_eq!(Side::A.opposite(), Side::B);
        assert_eq!(Side::B.opposite(), Side::A);
        for side in [Side::A, Side::B] {
            assert_eq!(side.opposite().opposite(), side);
        }
    }

    #[test]
    fn test_side_serialization() {
        assert_eq!(serde_json::to_string(&Side::A).unwrap(), "\"A\"");
        let side: Side = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(side, Side::B);
    }
}
