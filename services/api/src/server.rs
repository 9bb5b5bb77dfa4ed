//! HTTP server and routing.
//!
//! Thin plumbing over the handlers: reads bodies, dispatches on method and
//! path, serializes [`ApiReply`] values, and stamps the response headers.
//! No pool logic lives here.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper::body::Bytes;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use tracing::{debug, info};

use crate::handlers::{self, ApiReply, AppState};

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = state
        .config
        .bind_addr
        .parse()
        .context("invalid bind address")?;

    let make_svc = make_service_fn(move |_conn| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let state = Arc::clone(&state);
                route(req, state)
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("failed to bind {addr}"))?
        .serve(make_svc);

    info!("API server listening on http://{}", addr);
    info!("Endpoints: /health, /api/pool, /api/price, /api/swap/quote, /api/swap, /api/liquidity/add, /api/liquidity/remove");

    server.await.context("server terminated")?;
    Ok(())
}

async fn body_bytes(req: Request<Body>) -> Result<Bytes, ApiReply> {
    hyper::body::to_bytes(req.into_body()).await.map_err(|e| {
        ApiReply::error(
            StatusCode::BAD_REQUEST,
            format!("failed to read request body: {e}"),
        )
    })
}

fn not_found() -> ApiReply {
    ApiReply::error(StatusCode::NOT_FOUND, "not found")
}

fn method_not_allowed() -> ApiReply {
    ApiReply::error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

pub(crate) async fn route(
    req: Request<Body>,
    state: Arc<AppState>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let reply = match (&method, path.as_str()) {
        (&Method::GET, "/health") => handlers::health(&state),
        (&Method::GET, "/api/pool") => handlers::pool(&state),
        (&Method::GET, "/api/price") => handlers::price(&state),

        (&Method::POST, "/api/swap/quote") => match body_bytes(req).await {
            Ok(body) => handlers::quote(&state, &body),
            Err(reply) => reply,
        },
        (&Method::POST, "/api/swap") => match body_bytes(req).await {
            Ok(body) => handlers::swap(&state, &body),
            Err(reply) => reply,
        },
        (&Method::POST, "/api/liquidity/add") => match body_bytes(req).await {
            Ok(body) => handlers::add_liquidity(&state, &body),
            Err(reply) => reply,
        },
        (&Method::POST, "/api/liquidity/remove") => match body_bytes(req).await {
            Ok(body) => handlers::remove_liquidity(&state, &body),
            Err(reply) => reply,
        },

        // A disabled reset route answers 404 for every method, as if it
        // were never registered.
        (&Method::POST, "/api/admin/reset") => match handlers::reset(&state) {
            Some(reply) => reply,
            None => not_found(),
        },
        (_, "/api/admin/reset") => {
            if state.config.enable_reset {
                method_not_allowed()
            } else {
                not_found()
            }
        }

        (
            _,
            "/health" | "/api/pool" | "/api/price" | "/api/swap/quote" | "/api/swap"
            | "/api/liquidity/add" | "/api/liquidity/remove",
        ) => method_not_allowed(),

        _ => not_found(),
    };

    debug!(%method, %path, status = reply.status.as_u16(), "request handled");
    Ok(json_response(reply))
}

fn json_response(reply: ApiReply) -> Response<Body> {
    Response::builder()
        .status(reply.status)
        .header("content-type", "application/json")
        .header("x-content-type-options", "nosniff")
        .header("x-frame-options", "DENY")
        .header("cache-control", "no-store")
        .header("content-security-policy", "default-src 'none'")
        .body(Body::from(reply.body.to_string()))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use basin_pool::{PoolEngine, PoolSeed};
    use serde_json::{json, Value};

    fn test_state(enable_reset: bool) -> Arc<AppState> {
        let mut config = ApiConfig::default();
        config.enable_reset = enable_reset;
        let engine = PoolEngine::new(PoolSeed {
            reserve_a: config.seed_reserve_a,
            reserve_b: config.seed_reserve_b,
        })
        .unwrap();
        Arc::new(AppState::new(engine, config))
    }

    async fn call(
        state: &Arc<AppState>,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value, hyper::HeaderMap) {
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(body)
            .unwrap();

        let response = route(req, Arc::clone(state)).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = hyper::body::to_bytes(body).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap();
        (parts.status, value, parts.headers)
    }

    #[tokio::test]
    async fn test_health_route() {
        let state = test_state(false);
        let (status, body, _) = call(&state, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "basin-api");
    }

    #[tokio::test]
    async fn test_swap_round_trip_through_router() {
        let state = test_state(false);
        let (status, body, headers) = call(
            &state,
            Method::POST,
            "/api/swap",
            Some(json!({
                "token_in": "ETH",
                "token_out": "USDC",
                "amount_in": 10.0,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_in"], "ETH");
        assert!((body["amount_out"].as_f64().unwrap() - 9.9699).abs() < 1e-4);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["cache-control"], "no-store");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let state = test_state(false);
        let (status, body, _) = call(&state, Method::GET, "/api/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found");
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let state = test_state(false);
        let (status, _, _) = call(&state, Method::DELETE, "/api/pool", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _, _) = call(&state, Method::GET, "/api/swap", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_disabled_reset_is_indistinguishable_from_missing() {
        let state = test_state(false);
        let (status, _, _) = call(&state, Method::POST, "/api/admin/reset", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = call(&state, Method::GET, "/api/admin/reset", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_enabled_reset_restores_the_pool() {
        let state = test_state(true);

        let (status, _, _) = call(
            &state,
            Method::POST,
            "/api/swap",
            Some(json!({
                "token_in": "ETH",
                "token_out": "USDC",
                "amount_in": 1000.0,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(state.engine.snapshot().reserve_a, 1_000_000.0);

        let (status, body, _) = call(&state, Method::POST, "/api/admin/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pool"]["reserve_a"].as_f64().unwrap(), 1_000_000.0);
        assert_eq!(state.engine.snapshot().reserve_a, 1_000_000.0);

        // Wrong method on an enabled route is an ordinary 405
        let (status, _, _) = call(&state, Method::GET, "/api/admin/reset", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_malformed_body_through_router() {
        let state = test_state(false);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/liquidity/add")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = route(req, Arc::clone(&state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quote_route_does_not_mutate() {
        let state = test_state(false);
        let before = state.engine.snapshot();

        let (status, body, _) = call(
            &state,
            Method::POST,
            "/api/swap/quote",
            Some(json!({
                "token_in": "USDC",
                "token_out": "ETH",
                "amount_in": 50.0,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["expected_out"].as_f64().unwrap() > 0.0);
        assert_eq!(state.engine.snapshot(), before);
    }
}
