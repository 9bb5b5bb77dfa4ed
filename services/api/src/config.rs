//! API service configuration.
//!
//! Defaults cover local use; a JSON file named by `BASIN_CONFIG` and
//! `BASIN_*` environment variables override them, in that order. The pool
//! engine takes whatever the validated config says, so every deployment
//! knob lives here and nowhere else.

use std::net::SocketAddr;

use basin_types::constants;
use serde::{Deserialize, Serialize};

/// Complete configuration for the API service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Listen address, `host:port`.
    pub bind_addr: String,
    /// Display symbol mapped to pool side A.
    pub token_a: String,
    /// Display symbol mapped to pool side B.
    pub token_b: String,
    /// Swap fee rate, e.g. 0.003 for 0.30%.
    pub fee_rate: f64,
    /// Tolerance applied when a swap request does not carry one.
    pub default_slippage_tolerance: f64,
    pub seed_reserve_a: f64,
    pub seed_reserve_b: f64,
    /// Exposes `POST /api/admin/reset`. Leave off outside of test rigs;
    /// a disabled route answers 404 as if it did not exist.
    pub enable_reset: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            token_a: "ETH".to_string(),
            token_b: "USDC".to_string(),
            fee_rate: constants::FEE_RATE,
            default_slippage_tolerance: constants::DEFAULT_SLIPPAGE_TOLERANCE,
            seed_reserve_a: constants::SEED_RESERVE_A,
            seed_reserve_b: constants::SEED_RESERVE_B,
            enable_reset: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.overlay_env();
        config
    }

    /// File pointed to by `BASIN_CONFIG` if set, defaults otherwise, then
    /// environment overrides on top.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("BASIN_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.overlay_env();
        Ok(config)
    }

    fn overlay_env(&mut self) {
        if let Ok(bind_addr) = std::env::var("BASIN_BIND_ADDR") {
            self.bind_addr = bind_addr;
        }

        if let Ok(token_a) = std::env::var("BASIN_TOKEN_A") {
            self.token_a = token_a;
        }

        if let Ok(token_b) = std::env::var("BASIN_TOKEN_B") {
            self.token_b = token_b;
        }

        if let Ok(fee_rate) = std::env::var("BASIN_FEE_RATE") {
            if let Ok(value) = fee_rate.parse::<f64>() {
                self.fee_rate = value;
            }
        }

        if let Ok(tolerance) = std::env::var("BASIN_SLIPPAGE_TOLERANCE") {
            if let Ok(value) = tolerance.parse::<f64>() {
                self.default_slippage_tolerance = value;
            }
        }

        if let Ok(reserve) = std::env::var("BASIN_SEED_RESERVE_A") {
            if let Ok(value) = reserve.parse::<f64>() {
                self.seed_reserve_a = value;
            }
        }

        if let Ok(reserve) = std::env::var("BASIN_SEED_RESERVE_B") {
            if let Ok(value) = reserve.parse::<f64>() {
                self.seed_reserve_b = value;
            }
        }

        if let Ok(enable_reset) = std::env::var("BASIN_ENABLE_RESET") {
            self.enable_reset = enable_reset.to_lowercase() == "true";
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!("bind_addr {:?} is not a valid host:port address", self.bind_addr);
        }

        if self.token_a.is_empty() || self.token_b.is_empty() {
            anyhow::bail!("token symbols must not be empty");
        }

        if self.token_a == self.token_b {
            anyhow::bail!("token_a and token_b must differ");
        }

        if !self.fee_rate.is_finite() || !(0.0..=0.05).contains(&self.fee_rate) {
            anyhow::bail!("fee_rate must be in [0, 0.05], got {}", self.fee_rate);
        }

        if !self.default_slippage_tolerance.is_finite()
            || self.default_slippage_tolerance < constants::MIN_SLIPPAGE_TOLERANCE
            || self.default_slippage_tolerance > constants::MAX_SLIPPAGE_TOLERANCE
        {
            anyhow::bail!(
                "default_slippage_tolerance must be within [{}, {}], got {}",
                constants::MIN_SLIPPAGE_TOLERANCE,
                constants::MAX_SLIPPAGE_TOLERANCE,
                self.default_slippage_tolerance
            );
        }

        for (name, value) in [
            ("seed_reserve_a", self.seed_reserve_a),
            ("seed_reserve_b", self.seed_reserve_b),
        ] {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{name} must be positive and finite, got {value}");
            }
        }

        Ok(())
    }
}
