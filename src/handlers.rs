// HTTP request handlers for the Stakehouse API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::errors::EngineError;
use crate::models::*;
use crate::settlement::engine;

/// Build the full application router
pub fn router(state: SharedState) -> Router {
    Router::new()
        // ===== MARKET ENDPOINTS =====
        .route("/markets", get(get_markets).post(create_market))
        .route("/markets/:id", get(get_market).delete(delete_market))
        // ===== SETTLEMENT ENDPOINTS =====
        .route("/positions", post(place_stake))
        .route("/positions/:address", get(get_user_positions))
        .route("/resolve", post(resolve_market))
        .route("/claim", post(claim_payout))
        // ===== USER ENDPOINTS =====
        .route("/users/:address", get(get_user))
        .route("/activity", get(get_activity))
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ===== MARKET ENDPOINTS =====

pub async fn get_markets(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().unwrap();
    Json(json!({ "markets": app_state.store.list_markets() }))
}

pub async fn get_market(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let app_state = state.lock().unwrap();
    let detail = app_state.store.market_detail(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "market": detail })))
}

pub async fn create_market(
    State(state): State<SharedState>,
    Json(payload): Json<CreateMarketRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut app_state = state.lock().unwrap();

    match app_state.store.create_market(&payload, now()) {
        Ok(detail) => {
            app_state.log_activity("MARKET_CREATED", &detail.market.question);
            Ok(Json(json!({ "success": true, "market": detail })))
        }
        Err(e) => Err(error_response(e)),
    }
}

pub async fn delete_market(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let mut app_state = state.lock().unwrap();

    if app_state.store.delete_market(&id) {
        app_state.log_activity("MARKET_DELETED", &id);
        Ok(Json(json!({ "success": true })))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

// ===== SETTLEMENT ENDPOINTS =====

pub async fn place_stake(
    State(state): State<SharedState>,
    Json(payload): Json<StakeRequest>,
) -> Result<Json<StakeResponse>, (StatusCode, Json<Value>)> {
    let mut app_state = state.lock().unwrap();

    match engine::open_position(&mut app_state.store, &payload, now()) {
        Ok((position, new_balance)) => {
            app_state.log_activity(
                "STAKE",
                &format!(
                    "{} staked {} on market {}",
                    payload.user_address, payload.amount, payload.market_id
                ),
            );
            Ok(Json(StakeResponse {
                success: true,
                position,
                new_balance,
            }))
        }
        Err(e) => Err(error_response(e)),
    }
}

pub async fn get_user_positions(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> Json<Value> {
    let mut app_state = state.lock().unwrap();
    let positions = engine::user_positions(&mut app_state.store, &address, now());
    Json(json!({ "user_address": address, "positions": positions }))
}

pub async fn resolve_market(
    State(state): State<SharedState>,
    Json(payload): Json<ResolveRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut app_state = state.lock().unwrap();

    match engine::resolve_market(
        &mut app_state.store,
        &payload.market_id,
        &payload.winning_option_id,
        now(),
    ) {
        Ok(market) => {
            app_state.log_activity(
                "MARKET_RESOLVED",
                &format!("{} won by option {}", payload.market_id, payload.winning_option_id),
            );
            Ok(Json(json!({ "success": true, "market": market })))
        }
        Err(e) => Err(error_response(e)),
    }
}

pub async fn claim_payout(
    State(state): State<SharedState>,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, (StatusCode, Json<Value>)> {
    let mut app_state = state.lock().unwrap();

    match engine::claim_payout(&mut app_state.store, &payload.market_id, &payload.user_address) {
        Ok(settlement) => {
            app_state.log_activity(
                "CLAIM",
                &format!(
                    "{} claimed {} from market {}",
                    payload.user_address, settlement.payout, payload.market_id
                ),
            );
            Ok(Json(ClaimResponse {
                success: true,
                market_id: payload.market_id,
                user_address: payload.user_address,
                payout: settlement.payout,
                positions_claimed: settlement.positions_claimed,
                new_balance: settlement.new_balance,
            }))
        }
        Err(e) => Err(error_response(e)),
    }
}

// ===== USER ENDPOINTS =====

pub async fn get_user(State(state): State<SharedState>, Path(address): Path<String>) -> Json<Value> {
    let mut app_state = state.lock().unwrap();
    let user = app_state.store.get_or_create_user(&address);
    Json(json!({ "user": user }))
}

pub async fn get_activity(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().unwrap();
    Json(json!({ "activity": app_state.activity }))
}

// ===== HEALTH CHECK =====

pub async fn health_check() -> &'static str {
    "Stakehouse Prediction Market - Online"
}

// ===== HELPERS =====

fn error_response(err: EngineError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        EngineError::MarketNotFound(_) | EngineError::OptionNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::MarketClosed(_)
        | EngineError::MarketNotResolved(_)
        | EngineError::NoUnclaimedPositions(_) => StatusCode::CONFLICT,
        EngineError::InsufficientBalance(_)
        | EngineError::InvalidStake(_)
        | EngineError::InvalidMarket(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "success": false, "error": err.to_string() })))
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
