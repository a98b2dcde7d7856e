/// Stakehouse Prediction Market
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod settlement;
pub mod store;

pub use app_state::{AppState, SharedState};
pub use errors::EngineError;
pub use models::{
    ClaimRequest, ClaimResponse, CreateMarketRequest, Market, MarketOption, MarketStatus, Position,
    PositionStatus, ResolveRequest, StakeRequest, StakeResponse, User,
};
pub use settlement::{claim_payout, fixed6, open_position, position_payout, resolve_market,
    user_positions, ClaimSettlement};
pub use store::{MarketDetail, MarketStore};
