// In-memory relational store for the prediction market
//
// Four relations keyed by id: users, markets, market options, positions.
// The store is the single shared mutable resource in the system. It is
// passed explicitly into the settlement engine, and the HTTP layer holds it
// behind one lock so every engine call runs as an indivisible unit.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::EngineError;
use crate::models::{CreateMarketRequest, Market, MarketOption, Position, User};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketStore {
    /// User accounts (address -> User)
    pub users: HashMap<String, User>,

    /// All markets keyed by market id
    pub markets: HashMap<String, Market>,

    /// All market options keyed by option id
    pub options: HashMap<String, MarketOption>,

    /// All positions keyed by position id
    pub positions: HashMap<String, Position>,
}

/// A market enriched with its ordered options and position count,
/// the shape returned by the listing and detail reads
#[derive(Debug, Clone, Serialize)]
pub struct MarketDetail {
    #[serde(flatten)]
    pub market: Market,
    pub options: Vec<MarketOption>,
    pub total_positions: usize,
}

impl MarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== USERS =====

    /// Fetch a user, provisioning the account with the starting balance and
    /// reputation the first time the address is referenced
    pub fn get_or_create_user(&mut self, address: &str) -> User {
        self.users
            .entry(address.to_string())
            .or_insert_with(|| User::new(address))
            .clone()
    }

    pub fn user(&self, address: &str) -> Option<&User> {
        self.users.get(address)
    }

    // ===== MARKETS =====

    pub fn create_market(&mut self, req: &CreateMarketRequest, now: u64) -> Result<MarketDetail, EngineError> {
        if req.options.is_empty() {
            return Err(EngineError::InvalidMarket(
                "market needs at least one option".to_string(),
            ));
        }

        let market = Market::new(
            req.question.clone(),
            req.description.clone(),
            req.category.clone(),
            req.banner_url.clone(),
            req.close_time,
            req.creator_id.clone(),
            now,
        );

        let mut options = Vec::with_capacity(req.options.len());
        for (idx, text) in req.options.iter().enumerate() {
            let option = MarketOption::new(&market.id, text, idx as u32);
            self.options.insert(option.id.clone(), option.clone());
            options.push(option);
        }

        self.markets.insert(market.id.clone(), market.clone());
        info!("created market {} with {} options", market.id, options.len());

        Ok(MarketDetail {
            market,
            options,
            total_positions: 0,
        })
    }

    pub fn market(&self, id: &str) -> Option<&Market> {
        self.markets.get(id)
    }

    pub fn market_detail(&self, id: &str) -> Option<MarketDetail> {
        let market = self.markets.get(id)?.clone();
        let options = self.options_for_market(id);
        let total_positions = self.positions.values().filter(|p| p.market_id == id).count();
        Some(MarketDetail {
            market,
            options,
            total_positions,
        })
    }

    /// All markets, newest first, with option and position-count enrichment
    pub fn list_markets(&self) -> Vec<MarketDetail> {
        let mut details: Vec<MarketDetail> = self
            .markets
            .keys()
            .filter_map(|id| self.market_detail(id))
            .collect();
        details.sort_by(|a, b| {
            b.market
                .created_at
                .cmp(&a.market.created_at)
                .then(a.market.id.cmp(&b.market.id))
        });
        details
    }

    /// Cascade delete: positions first, then options, then the market row
    pub fn delete_market(&mut self, id: &str) -> bool {
        if !self.markets.contains_key(id) {
            return false;
        }
        self.positions.retain(|_, p| p.market_id != id);
        self.options.retain(|_, o| o.market_id != id);
        let deleted = self.markets.remove(id).is_some();
        if deleted {
            info!("deleted market {} and its children", id);
        }
        deleted
    }

    // ===== OPTIONS =====

    pub fn options_for_market(&self, market_id: &str) -> Vec<MarketOption> {
        let mut options: Vec<MarketOption> = self
            .options
            .values()
            .filter(|o| o.market_id == market_id)
            .cloned()
            .collect();
        options.sort_by_key(|o| o.sort_order);
        options
    }

    // ===== PERSISTENCE =====

    pub fn save_to_disk(&self, path: &str) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize state: {}", e))?;

        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create data directory: {}", e))?;
        }

        fs::write(path, json).map_err(|e| format!("Failed to write state file: {}", e))?;
        info!("state saved to {}", path);
        Ok(())
    }

    pub fn load_from_disk(path: &str) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|_| "No state file found".to_string())?;
        serde_json::from_str(&json).map_err(|e| format!("Failed to deserialize state: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use crate::models::PositionStatus;

    fn market_request(options: Vec<&str>) -> CreateMarketRequest {
        CreateMarketRequest {
            question: "Who wins the final?".to_string(),
            description: "Test market".to_string(),
            category: "Cricket".to_string(),
            banner_url: None,
            close_time: 2_000_000_000,
            creator_id: "creator_1".to_string(),
            options: options.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_get_or_create_user_is_idempotent() {
        let mut store = MarketStore::new();

        let first = store.get_or_create_user("wallet_1");
        assert_eq!(first.balance, dec!(1000.000000));
        assert_eq!(first.reputation, 100);

        // Second call returns the same account, no re-provisioning
        if let Some(user) = store.users.get_mut("wallet_1") {
            user.balance = dec!(500.000000);
        }
        let second = store.get_or_create_user("wallet_1");
        assert_eq!(second.balance, dec!(500.000000));
        assert_eq!(store.users.len(), 1);
    }

    #[test]
    fn test_create_market_preserves_option_order() {
        let mut store = MarketStore::new();
        let detail = store
            .create_market(&market_request(vec!["India", "Australia", "Draw"]), 100)
            .unwrap();

        let labels: Vec<&str> = detail.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(labels, vec!["India", "Australia", "Draw"]);
        assert!(detail.options.iter().all(|o| o.total_staked.is_zero()));

        // Re-reading from the store keeps the same order
        let reread = store.options_for_market(&detail.market.id);
        let labels: Vec<&str> = reread.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(labels, vec!["India", "Australia", "Draw"]);
    }

    #[test]
    fn test_create_market_rejects_empty_options() {
        let mut store = MarketStore::new();
        let result = store.create_market(&market_request(vec![]), 100);
        assert!(matches!(result, Err(EngineError::InvalidMarket(_))));
        assert!(store.markets.is_empty());
        assert!(store.options.is_empty());
    }

    #[test]
    fn test_list_markets_newest_first() {
        let mut store = MarketStore::new();
        let older = store.create_market(&market_request(vec!["Yes", "No"]), 100).unwrap();
        let newer = store.create_market(&market_request(vec!["Yes", "No"]), 200).unwrap();

        let listed = store.list_markets();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].market.id, newer.market.id);
        assert_eq!(listed[1].market.id, older.market.id);
    }

    #[test]
    fn test_delete_market_cascades() {
        let mut store = MarketStore::new();
        let detail = store.create_market(&market_request(vec!["Yes", "No"]), 100).unwrap();
        let market_id = detail.market.id.clone();
        let option_id = detail.options[0].id.clone();

        let position = Position::new(&market_id, &option_id, "wallet_1", dec!(25), 150);
        store.positions.insert(position.id.clone(), position);

        assert!(store.delete_market(&market_id));
        assert!(store.markets.is_empty());
        assert!(store.options.is_empty());
        assert!(store.positions.is_empty());

        // Deleting again reports false
        assert!(!store.delete_market(&market_id));
    }

    #[test]
    fn test_market_detail_counts_positions() {
        let mut store = MarketStore::new();
        let detail = store.create_market(&market_request(vec!["Yes", "No"]), 100).unwrap();
        let market_id = detail.market.id.clone();
        let option_id = detail.options[0].id.clone();

        for i in 0..3 {
            let mut position = Position::new(&market_id, &option_id, "wallet_1", dec!(10), 150 + i);
            position.status = PositionStatus::Pending;
            store.positions.insert(position.id.clone(), position);
        }

        let reread = store.market_detail(&market_id).unwrap();
        assert_eq!(reread.total_positions, 3);
    }
}
