// Settlement engine scenarios against the store, without the HTTP layer

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use stakehouse_prediction_market::models::{CreateMarketRequest, Position, PositionStatus, StakeRequest};
use stakehouse_prediction_market::settlement::{claim_payout, open_position, resolve_market, user_positions};
use stakehouse_prediction_market::store::MarketStore;

const NOW: u64 = 1_700_000_000;

fn create_market(store: &mut MarketStore, options: Vec<&str>) -> (String, Vec<String>) {
    let detail = store
        .create_market(
            &CreateMarketRequest {
                question: "Who takes the series?".to_string(),
                description: String::new(),
                category: "Cricket".to_string(),
                banner_url: None,
                close_time: NOW + 3600,
                creator_id: "wallet_creator".to_string(),
                options: options.into_iter().map(String::from).collect(),
            },
            NOW - 100,
        )
        .unwrap();
    let option_ids = detail.options.iter().map(|o| o.id.clone()).collect();
    (detail.market.id, option_ids)
}

fn stake(store: &mut MarketStore, market_id: &str, option_id: &str, user: &str, amount: Decimal) {
    open_position(
        store,
        &StakeRequest {
            market_id: market_id.to_string(),
            option_id: option_id.to_string(),
            user_address: user.to_string(),
            amount,
        },
        NOW,
    )
    .unwrap();
}

#[test]
fn test_payouts_are_proportional_within_winning_pool() {
    let mut store = MarketStore::new();
    let (market_id, options) = create_market(&mut store, vec!["India", "Australia"]);

    stake(&mut store, &market_id, &options[0], "wallet_alice", dec!(25));
    stake(&mut store, &market_id, &options[0], "wallet_carol", dec!(25));
    stake(&mut store, &market_id, &options[1], "wallet_bob", dec!(50));

    resolve_market(&mut store, &market_id, &options[0], NOW + 10).unwrap();

    // Each winner holds half the 50 winning pool, so each takes half the 100 total
    let alice = claim_payout(&mut store, &market_id, "wallet_alice").unwrap();
    assert_eq!(alice.payout, "50.000000");
    assert_eq!(alice.new_balance.to_string(), "1025.000000");

    let carol = claim_payout(&mut store, &market_id, "wallet_carol").unwrap();
    assert_eq!(carol.payout, "50.000000");

    let bob = claim_payout(&mut store, &market_id, "wallet_bob").unwrap();
    assert_eq!(bob.payout, "0");
    assert_eq!(bob.new_balance.to_string(), "950.000000");
}

#[test]
fn test_pool_invariants_hold_across_markets() {
    let mut store = MarketStore::new();
    let (first_market, first_options) = create_market(&mut store, vec!["Yes", "No"]);
    let (second_market, second_options) = create_market(&mut store, vec!["Yes", "No", "Draw"]);

    stake(&mut store, &first_market, &first_options[0], "wallet_alice", dec!(10));
    stake(&mut store, &second_market, &second_options[2], "wallet_alice", dec!(40));
    stake(&mut store, &first_market, &first_options[1], "wallet_bob", dec!(15.5));
    stake(&mut store, &second_market, &second_options[0], "wallet_bob", dec!(4.5));

    for (market_id, expected) in [(&first_market, dec!(25.5)), (&second_market, dec!(44.5))] {
        let position_sum: Decimal = store
            .positions
            .values()
            .filter(|p| &p.market_id == market_id)
            .map(|p| p.amount)
            .sum();
        let option_sum: Decimal = store
            .options
            .values()
            .filter(|o| &o.market_id == market_id)
            .map(|o| o.total_staked)
            .sum();

        assert_eq!(position_sum, expected);
        assert_eq!(option_sum, expected);
        assert_eq!(store.markets[market_id].total_liquidity, expected);
    }

    // Staking debited both users across both markets
    assert_eq!(store.users["wallet_alice"].balance.to_string(), "950.000000");
    assert_eq!(store.users["wallet_bob"].balance.to_string(), "980.000000");
}

#[test]
fn test_straggler_position_settles_on_listing() {
    let mut store = MarketStore::new();
    let (market_id, options) = create_market(&mut store, vec!["Yes", "No"]);
    stake(&mut store, &market_id, &options[0], "wallet_alice", dec!(30));
    resolve_market(&mut store, &market_id, &options[0], NOW + 10).unwrap();

    // Positions the resolution pass never saw, one per outcome
    let winner = Position::new(&market_id, &options[0], "wallet_dave", dec!(5), NOW + 20);
    let loser = Position::new(&market_id, &options[1], "wallet_dave", dec!(6), NOW + 21);
    store.positions.insert(winner.id.clone(), winner.clone());
    store.positions.insert(loser.id.clone(), loser.clone());

    let listed = user_positions(&mut store, "wallet_dave", NOW + 30);

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|p| p.status != PositionStatus::Pending));
    assert_eq!(store.positions[&winner.id].status, PositionStatus::Won);
    assert_eq!(store.positions[&loser.id].status, PositionStatus::Lost);
    assert_eq!(store.positions[&winner.id].settled_at, Some(NOW + 30));
}

#[test]
fn test_zero_winning_pool_falls_back_to_unit_divisor() {
    let mut store = MarketStore::new();
    let (market_id, options) = create_market(&mut store, vec!["Yes", "No"]);
    stake(&mut store, &market_id, &options[1], "wallet_bob", dec!(40));
    resolve_market(&mut store, &market_id, &options[0], NOW + 10).unwrap();

    // A winning position that never went through staking, so the winning
    // option's pool is still zero
    let orphan = Position::new(&market_id, &options[0], "wallet_eve", dec!(2), NOW + 20);
    store.positions.insert(orphan.id.clone(), orphan);

    let settlement = claim_payout(&mut store, &market_id, "wallet_eve").unwrap();

    // stake / 1 x total pool
    assert_eq!(settlement.payout, "80.000000");
}

#[test]
fn test_store_roundtrips_through_disk() {
    let mut store = MarketStore::new();
    let (market_id, options) = create_market(&mut store, vec!["Yes", "No"]);
    stake(&mut store, &market_id, &options[0], "wallet_alice", dec!(12.5));

    let path = std::env::temp_dir().join(format!("stakehouse_state_{}.json", std::process::id()));
    let path = path.to_string_lossy().to_string();

    store.save_to_disk(&path).unwrap();
    let restored = MarketStore::load_from_disk(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.markets.len(), 1);
    assert_eq!(restored.options.len(), 2);
    assert_eq!(restored.positions.len(), 1);
    assert_eq!(restored.users["wallet_alice"].balance.to_string(), "987.500000");
    assert_eq!(restored.markets[&market_id].total_liquidity.to_string(), "12.500000");
}
