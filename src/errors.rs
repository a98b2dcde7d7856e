// Settlement engine errors
//
// Every variant is a synchronous business-rule rejection surfaced to the
// caller. None of them are transient faults, so there is no retry path.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EngineError {
    MarketNotFound(String),
    OptionNotFound(String),
    MarketClosed(String),
    MarketNotResolved(String),
    InsufficientBalance(String),
    NoUnclaimedPositions(String),
    InvalidStake(String),
    InvalidMarket(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MarketNotFound(msg) => write!(f, "Market not found: {}", msg),
            EngineError::OptionNotFound(msg) => write!(f, "Option not found: {}", msg),
            EngineError::MarketClosed(msg) => write!(f, "Market is closed: {}", msg),
            EngineError::MarketNotResolved(msg) => write!(f, "Market not resolved: {}", msg),
            EngineError::InsufficientBalance(msg) => write!(f, "Insufficient balance: {}", msg),
            EngineError::NoUnclaimedPositions(msg) => write!(f, "No unclaimed positions: {}", msg),
            EngineError::InvalidStake(msg) => write!(f, "Invalid stake: {}", msg),
            EngineError::InvalidMarket(msg) => write!(f, "Invalid market: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
