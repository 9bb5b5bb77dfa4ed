//! Structured validation outcomes.
//!
//! Validation failures are routine, expected results, not errors: a gate
//! returns a [`Validity`] carrying the rejection reason, and the caller
//! turns it into a client-facing response. Domain errors stay reserved for
//! caller bugs further down the stack.

use serde::Serialize;

/// Outcome of a hard validation gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validity {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Validity {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Outcome of the price-impact advisory.
///
/// Impact inside `[0, 1]` is always accepted; a large impact only attaches a
/// warning for the caller to pass along. Impact outside that range means the
/// upstream computation is broken and is the one case reported invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactAssessment {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ImpactAssessment {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
            warning: None,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: None,
            warning: Some(text.into()),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
            warning: None,
        }
    }
}
