//! Request handlers.
//!
//! Each handler is a synchronous function from parsed request bytes to an
//! [`ApiReply`]; the server layer does the HTTP plumbing around them. The
//! executing handlers hold the engine's write guard across their whole
//! snapshot-validate-quote-commit sequence, so the numbers they commit were
//! computed against the reserves they commit into.
//!
//! Status mapping: rejected validation and malformed input answer 400 with
//! an `error` field, engine failures answer 500, and everything else is a
//! typed JSON view of the outcome.

use basin_amm::{
    build_swap_quote, meets_min_output, shares_for_deposit, spot_price, withdrawal_amounts,
    SwapQuote,
};
use basin_pool::PoolEngine;
use basin_types::{constants, PoolSnapshot, Side};
use basin_validation::{
    assess_price_impact, validate_add_liquidity, validate_slippage_tolerance,
    validate_swap_amount, validate_token_pair, validate_withdrawal, Validity,
};
use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::error;

use crate::config::ApiConfig;

/// Shared service state handed to every handler.
pub struct AppState {
    pub engine: PoolEngine,
    pub config: ApiConfig,
    started: Instant,
}

impl AppState {
    pub fn new(engine: PoolEngine, config: ApiConfig) -> Self {
        Self {
            engine,
            config,
            started: Instant::now(),
        }
    }

    fn side_for(&self, token: &str) -> Side {
        if token == self.config.token_a {
            Side::A
        } else {
            Side::B
        }
    }

    fn symbol(&self, side: Side) -> String {
        match side {
            Side::A => self.config.token_a.clone(),
            Side::B => self.config.token_b.clone(),
        }
    }
}

/// Status plus JSON body, ready for the server layer to serialize.
#[derive(Debug)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl ApiReply {
    fn ok(body: serde_json::Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn rejected(validity: Validity) -> Self {
        let reason = validity
            .reason
            .unwrap_or_else(|| "invalid request".to_string());
        Self::error(StatusCode::BAD_REQUEST, reason)
    }
}

/// Quantities in responses are display values, not ledger values; eight
/// decimals is far above the dust threshold and far below f64 noise.
fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiReply> {
    serde_json::from_slice(body).map_err(|e| {
        ApiReply::error(
            StatusCode::BAD_REQUEST,
            format!("malformed request body: {e}"),
        )
    })
}

#[derive(Debug, Deserialize)]
struct SwapRequest {
    token_in: String,
    token_out: String,
    amount_in: f64,
    #[serde(default)]
    slippage_tolerance: Option<f64>,
    /// Minimum output carried over from an earlier quote. Absent means the
    /// fresh quote's own slippage floor applies, which a same-lock execution
    /// always meets.
    #[serde(default)]
    min_amount_out: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AddLiquidityRequest {
    amount_a: f64,
    amount_b: f64,
}

#[derive(Debug, Deserialize)]
struct RemoveLiquidityRequest {
    shares: f64,
}

#[derive(Debug, Serialize)]
struct PoolView {
    token_a: String,
    token_b: String,
    reserve_a: f64,
    reserve_b: f64,
    total_shares: f64,
    fees_a: f64,
    fees_b: f64,
    fee_rate: f64,
    k: f64,
}

impl PoolView {
    fn from_snapshot(state: &AppState, snap: &PoolSnapshot) -> Self {
        Self {
            token_a: state.config.token_a.clone(),
            token_b: state.config.token_b.clone(),
            reserve_a: round8(snap.reserve_a),
            reserve_b: round8(snap.reserve_b),
            total_shares: round8(snap.total_shares),
            fees_a: round8(snap.fees.a),
            fees_b: round8(snap.fees.b),
            fee_rate: state.config.fee_rate,
            k: snap.k,
        }
    }
}

#[derive(Debug, Serialize)]
struct QuoteView {
    token_in: String,
    token_out: String,
    amount_in: f64,
    fee: f64,
    amount_in_after_fee: f64,
    expected_out: f64,
    spot_price: f64,
    price_impact: f64,
    slippage_tolerance: f64,
    min_amount_out: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl QuoteView {
    fn new(state: &AppState, quote: &SwapQuote, warning: Option<String>) -> Self {
        Self {
            token_in: state.symbol(quote.input_side),
            token_out: state.symbol(quote.output_side),
            amount_in: round8(quote.amount_in),
            fee: round8(quote.fee),
            amount_in_after_fee: round8(quote.amount_in_after_fee),
            expected_out: round8(quote.expected_out),
            spot_price: round8(quote.spot_price),
            price_impact: round8(quote.price_impact),
            slippage_tolerance: quote.slippage_tolerance,
            min_amount_out: round8(quote.min_amount_out),
            warning,
        }
    }
}

#[derive(Debug, Serialize)]
struct SwapView {
    token_in: String,
    token_out: String,
    amount_in: f64,
    fee: f64,
    amount_out: f64,
    spot_price: f64,
    price_impact: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    pool: PoolView,
}

#[derive(Debug, Serialize)]
struct LiquidityAddedView {
    shares_issued: f64,
    share_of_pool: f64,
    pool: PoolView,
}

#[derive(Debug, Serialize)]
struct LiquidityRemovedView {
    shares_burned: f64,
    amount_a: f64,
    amount_b: f64,
    pool: PoolView,
}

/// GET /health
pub fn health(state: &AppState) -> ApiReply {
    ApiReply::ok(json!({
        "status": "healthy",
        "service": "basin-api",
        "uptime_secs": state.started.elapsed().as_secs(),
    }))
}

/// GET /api/pool
pub fn pool(state: &AppState) -> ApiReply {
    let snap = state.engine.snapshot();
    let view = PoolView::from_snapshot(state, &snap);
    ApiReply::ok(json!(view))
}

/// GET /api/price
pub fn price(state: &AppState) -> ApiReply {
    let snap = state.engine.snapshot();
    let a_in_b = spot_price(snap.reserve_b, snap.reserve_a);
    let b_in_a = spot_price(snap.reserve_a, snap.reserve_b);
    match (a_in_b, b_in_a) {
        (Ok(a_in_b), Ok(b_in_a)) => ApiReply::ok(json!({
            "pair": format!("{}/{}", state.config.token_a, state.config.token_b),
            "token_a": state.config.token_a,
            "token_b": state.config.token_b,
            "price_a_in_b": round8(a_in_b),
            "price_b_in_a": round8(b_in_a),
        })),
        (Err(e), _) | (_, Err(e)) => {
            error!("spot price unavailable: {}", e);
            ApiReply::error(StatusCode::INTERNAL_SERVER_ERROR, "spot price unavailable")
        }
    }
}

/// Validate a swap request and price it against a snapshot.
fn priced_swap(
    state: &AppState,
    snap: &PoolSnapshot,
    req: &SwapRequest,
    impact_warn_threshold: f64,
) -> Result<(SwapQuote, Option<String>), ApiReply> {
    let pair = validate_token_pair(
        &req.token_in,
        &req.token_out,
        &state.config.token_a,
        &state.config.token_b,
    );
    if !pair.is_valid() {
        return Err(ApiReply::rejected(pair));
    }

    let amount = validate_swap_amount(req.amount_in);
    if !amount.is_valid() {
        return Err(ApiReply::rejected(amount));
    }

    let tolerance = req
        .slippage_tolerance
        .unwrap_or(state.config.default_slippage_tolerance);
    let tolerance_check = validate_slippage_tolerance(tolerance);
    if !tolerance_check.is_valid() {
        return Err(ApiReply::rejected(tolerance_check));
    }

    let input_side = state.side_for(&req.token_in);
    let quote = build_swap_quote(
        input_side,
        req.amount_in,
        snap.reserve(input_side),
        snap.reserve(input_side.opposite()),
        state.config.fee_rate,
        tolerance,
    )
    .map_err(|e| ApiReply::error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let impact = assess_price_impact(quote.price_impact, impact_warn_threshold);
    if !impact.valid {
        error!(
            "price impact {} failed assessment on a validated request",
            quote.price_impact
        );
        return Err(ApiReply::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal pricing error",
        ));
    }

    Ok((quote, impact.warning))
}

/// POST /api/swap/quote
pub fn quote(state: &AppState, body: &[u8]) -> ApiReply {
    let req: SwapRequest = match parse_body(body) {
        Ok(req) => req,
        Err(reply) => return reply,
    };

    let snap = state.engine.snapshot();
    match priced_swap(state, &snap, &req, constants::QUOTE_IMPACT_WARN_THRESHOLD) {
        Ok((quote, warning)) => ApiReply::ok(json!(QuoteView::new(state, &quote, warning))),
        Err(reply) => reply,
    }
}

/// POST /api/swap
pub fn swap(state: &AppState, body: &[u8]) -> ApiReply {
    let req: SwapRequest = match parse_body(body) {
        Ok(req) => req,
        Err(reply) => return reply,
    };

    let mut guard = state.engine.write();
    let snap = guard.snapshot();

    let (quote, warning) =
        match priced_swap(state, &snap, &req, constants::PRICE_IMPACT_WARN_THRESHOLD) {
            Ok(priced) => priced,
            Err(reply) => return reply,
        };

    // An explicit minimum from an earlier quote wins over the fresh one;
    // this is where a stale quote gets refused after the pool moved.
    let min_out = match req.min_amount_out {
        Some(min) if !min.is_finite() || min < 0.0 => {
            return ApiReply::error(
                StatusCode::BAD_REQUEST,
                format!("min_amount_out must be non-negative and finite, got {min}"),
            );
        }
        Some(min) => min,
        None => quote.min_amount_out,
    };
    if !meets_min_output(quote.expected_out, min_out) {
        return ApiReply::error(
            StatusCode::BAD_REQUEST,
            format!(
                "slippage exceeded: output {} is below the required minimum {}",
                round8(quote.expected_out),
                round8(min_out)
            ),
        );
    }

    match guard.execute_swap(
        quote.input_side,
        quote.output_side,
        quote.amount_in,
        quote.expected_out,
        quote.fee,
    ) {
        Ok(after) => ApiReply::ok(json!(SwapView {
            token_in: state.symbol(quote.input_side),
            token_out: state.symbol(quote.output_side),
            amount_in: round8(quote.amount_in),
            fee: round8(quote.fee),
            amount_out: round8(quote.expected_out),
            spot_price: round8(quote.spot_price),
            price_impact: round8(quote.price_impact),
            warning,
            pool: PoolView::from_snapshot(state, &after),
        })),
        Err(e) => {
            error!("swap rejected by the pool engine: {}", e);
            ApiReply::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("swap failed: {e}"),
            )
        }
    }
}

/// POST /api/liquidity/add
pub fn add_liquidity(state: &AppState, body: &[u8]) -> ApiReply {
    let req: AddLiquidityRequest = match parse_body(body) {
        Ok(req) => req,
        Err(reply) => return reply,
    };

    let mut guard = state.engine.write();
    let snap = guard.snapshot();

    let validity = validate_add_liquidity(req.amount_a, req.amount_b, &snap);
    if !validity.is_valid() {
        return ApiReply::rejected(validity);
    }

    let shares = match shares_for_deposit(
        req.amount_a,
        req.amount_b,
        snap.reserve_a,
        snap.reserve_b,
        snap.total_shares,
    ) {
        Ok(shares) => shares,
        Err(e) => return ApiReply::error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match guard.add_liquidity(req.amount_a, req.amount_b, shares) {
        Ok(after) => ApiReply::ok(json!(LiquidityAddedView {
            shares_issued: round8(shares),
            share_of_pool: round8(shares / after.total_shares),
            pool: PoolView::from_snapshot(state, &after),
        })),
        Err(e) => {
            error!("liquidity add rejected by the pool engine: {}", e);
            ApiReply::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("liquidity add failed: {e}"),
            )
        }
    }
}

/// POST /api/liquidity/remove
pub fn remove_liquidity(state: &AppState, body: &[u8]) -> ApiReply {
    let req: RemoveLiquidityRequest = match parse_body(body) {
        Ok(req) => req,
        Err(reply) => return reply,
    };

    let mut guard = state.engine.write();
    let snap = guard.snapshot();

    let validity = validate_withdrawal(req.shares, &snap);
    if !validity.is_valid() {
        return ApiReply::rejected(validity);
    }

    let (amount_a, amount_b) = match withdrawal_amounts(
        req.shares,
        snap.reserve_a,
        snap.reserve_b,
        snap.total_shares,
    ) {
        Ok(amounts) => amounts,
        Err(e) => return ApiReply::error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match guard.withdraw_liquidity(amount_a, amount_b, req.shares) {
        Ok(after) => ApiReply::ok(json!(LiquidityRemovedView {
            shares_burned: round8(req.shares),
            amount_a: round8(amount_a),
            amount_b: round8(amount_b),
            pool: PoolView::from_snapshot(state, &after),
        })),
        Err(e) => {
            error!("withdrawal rejected by the pool engine: {}", e);
            ApiReply::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("withdrawal failed: {e}"),
            )
        }
    }
}

/// POST /api/admin/reset. `None` when the route is disabled; the server
/// answers 404 so a production instance does not reveal the route exists.
pub fn reset(state: &AppState) -> Option<ApiReply> {
    if !state.config.enable_reset {
        return None;
    }
    match state.engine.reset() {
        Ok(snap) => Some(ApiReply::ok(json!({
            "message": "pool reset to seed state",
            "pool": PoolView::from_snapshot(state, &snap),
        }))),
        Err(e) => {
            error!("pool reset failed: {}", e);
            Some(ApiReply::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("reset failed: {e}"),
            ))
        }
    }
}
