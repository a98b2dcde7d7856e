// Data models for the Stakehouse prediction market

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Balance granted to an address the first time it is referenced
pub const STARTING_BALANCE: Decimal = dec!(1000.000000);

/// Reputation granted alongside the starting balance
pub const STARTING_REPUTATION: i32 = 100;

/// Market lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketStatus {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "resolved")]
    Resolved,
}

/// Position status: pending until the market resolves, then won or lost
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PositionStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "won")]
    Won,
    #[serde(rename = "lost")]
    Lost,
}

/// A user account, keyed by address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub address: String,

    /// Spendable balance, kept at 6 decimal places
    pub balance: Decimal,

    pub reputation: i32,

    /// Auxiliary per-asset holdings, not consulted by settlement
    #[serde(default)]
    pub holdings: HashMap<String, serde_json::Value>,
}

impl User {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            balance: STARTING_BALANCE,
            reputation: STARTING_REPUTATION,
            holdings: HashMap::new(),
        }
    }
}

/// A prediction market with an open/resolved lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: String,

    /// Market question/title
    pub question: String,

    pub description: String,

    /// Market category (cricket, politics, crypto, etc)
    pub category: String,

    pub banner_url: Option<String>,

    /// Unix timestamp after which no new stakes are accepted
    pub close_time: u64,

    /// Address of the market creator
    pub creator_id: String,

    pub status: MarketStatus,

    /// Winning option reference (None until resolved)
    pub winning_option_id: Option<String>,

    /// Sum of every stake placed on this market, across all options
    pub total_liquidity: Decimal,

    pub created_at: u64,
}

impl Market {
    pub fn new(
        question: String,
        description: String,
        category: String,
        banner_url: Option<String>,
        close_time: u64,
        creator_id: String,
        now: u64,
    ) -> Self {
        Self {
            id: format!("market_{}", Uuid::new_v4().simple()),
            question,
            description,
            category,
            banner_url,
            close_time,
            creator_id,
            status: MarketStatus::Open,
            winning_option_id: None,
            total_liquidity: Decimal::ZERO,
            created_at: now,
        }
    }

    /// A market accepts stakes only while its stored status is open AND the
    /// close time has not passed. The stored status can lag behind the clock.
    pub fn accepts_stakes_at(&self, now: u64) -> bool {
        self.status == MarketStatus::Open && now < self.close_time
    }
}

/// One outcome option of a market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOption {
    pub id: String,

    pub market_id: String,

    /// Display text (e.g. "Yes", "India")
    pub text: String,

    /// Sum of every stake placed on this option
    pub total_staked: Decimal,

    /// Creation index, preserves the creator's option ordering
    pub sort_order: u32,
}

impl MarketOption {
    pub fn new(market_id: &str, text: &str, sort_order: u32) -> Self {
        Self {
            id: format!("opt_{}", Uuid::new_v4().simple()),
            market_id: market_id.to_string(),
            text: text.to_string(),
            total_staked: Decimal::ZERO,
            sort_order,
        }
    }
}

/// A user's stake on one option of one market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: String,

    pub market_id: String,

    pub option_id: String,

    pub user_address: String,

    /// Amount staked
    pub amount: Decimal,

    pub status: PositionStatus,

    /// Flips false -> true exactly once, at claim time
    pub claimed: bool,

    pub created_at: u64,

    /// Set when the position is classified won/lost
    pub settled_at: Option<u64>,
}

impl Position {
    pub fn new(market_id: &str, option_id: &str, user_address: &str, amount: Decimal, now: u64) -> Self {
        Self {
            id: format!("pos_{}", Uuid::new_v4().simple()),
            market_id: market_id.to_string(),
            option_id: option_id.to_string(),
            user_address: user_address.to_string(),
            amount,
            status: PositionStatus::Pending,
            claimed: false,
            created_at: now,
            settled_at: None,
        }
    }
}

// Request/Response structs

/// POST /markets request body
#[derive(Debug, Deserialize)]
pub struct CreateMarketRequest {
    pub question: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub banner_url: Option<String>,

    /// Unix timestamp when the market stops accepting stakes
    pub close_time: u64,

    pub creator_id: String,

    /// Ordered option labels, one MarketOption each
    pub options: Vec<String>,
}

fn default_category() -> String {
    "Cricket".to_string()
}

/// POST /positions request body
#[derive(Debug, Deserialize)]
pub struct StakeRequest {
    pub market_id: String,
    pub option_id: String,
    pub user_address: String,
    pub amount: Decimal,
}

/// POST /resolve request body
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub market_id: String,
    pub winning_option_id: String,
}

/// POST /claim request body
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub market_id: String,
    pub user_address: String,
}

#[derive(Debug, Serialize)]
pub struct StakeResponse {
    pub success: bool,
    pub position: Position,
    pub new_balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub success: bool,
    pub market_id: String,
    pub user_address: String,
    /// Total payout credited, as a 6-decimal string ("0" when no winners)
    pub payout: String,
    pub positions_claimed: usize,
    pub new_balance: Decimal,
}
