// Settlement engine for the prediction market
//
// Four stateless procedures over an injected store: open a position, resolve
// a market, reconcile a user's positions lazily, and claim payout. Each
// routine checks every precondition before its first write, so a rejected
// call leaves no mutations behind. Callers serialize access to the store,
// which makes each call an all-or-nothing unit.

use rust_decimal::Decimal;
use tracing::info;

use super::payout::{fixed6, position_payout};
use crate::errors::EngineError;
use crate::models::{Market, MarketStatus, Position, PositionStatus, StakeRequest, User};
use crate::store::MarketStore;

/// Outcome of a successful claim call
#[derive(Debug, Clone)]
pub struct ClaimSettlement {
    /// Total payout credited, as a 6-decimal string ("0" when no winners)
    pub payout: String,
    pub positions_claimed: usize,
    pub new_balance: Decimal,
}

/// Open a position: debit the stake from the user and record it against the
/// chosen option.
///
/// The user account is provisioned on first reference. The market must be
/// open both by stored status and by clock, and the option must belong to
/// the market. Returns the new position and the user's remaining balance.
pub fn open_position(
    store: &mut MarketStore,
    req: &StakeRequest,
    now: u64,
) -> Result<(Position, Decimal), EngineError> {
    if req.amount <= Decimal::ZERO {
        return Err(EngineError::InvalidStake(format!(
            "stake amount must be positive, got {}",
            req.amount
        )));
    }

    let market = store
        .market(&req.market_id)
        .ok_or_else(|| EngineError::MarketNotFound(req.market_id.clone()))?;
    if !market.accepts_stakes_at(now) {
        return Err(EngineError::MarketClosed(req.market_id.clone()));
    }

    let option_belongs = store
        .options
        .get(&req.option_id)
        .map(|o| o.market_id == req.market_id)
        .unwrap_or(false);
    if !option_belongs {
        return Err(EngineError::OptionNotFound(format!(
            "option {} does not belong to market {}",
            req.option_id, req.market_id
        )));
    }

    let balance = store.get_or_create_user(&req.user_address).balance;
    if balance < req.amount {
        return Err(EngineError::InsufficientBalance(format!(
            "balance {} is less than stake {}",
            balance, req.amount
        )));
    }

    // All preconditions hold; mutations start here.

    if let Some(user) = store.users.get_mut(&req.user_address) {
        user.balance = fixed6(user.balance - req.amount);
    }

    let position = Position::new(&req.market_id, &req.option_id, &req.user_address, req.amount, now);
    store.positions.insert(position.id.clone(), position.clone());

    if let Some(option) = store.options.get_mut(&req.option_id) {
        option.total_staked = fixed6(option.total_staked + req.amount);
    }

    if let Some(market) = store.markets.get_mut(&req.market_id) {
        market.total_liquidity = fixed6(market.total_liquidity + req.amount);
    }

    let new_balance = store
        .user(&req.user_address)
        .map(|u| u.balance)
        .unwrap_or(Decimal::ZERO);

    info!(
        "stake: {} staked {} on option {} in market {}",
        req.user_address, req.amount, req.option_id, req.market_id
    );

    Ok((position, new_balance))
}

/// Resolve a market: record the winning option, then classify every
/// position on the market as won or lost.
///
/// No balance moves here; payouts are deferred to claim. Re-running with
/// the same winner reproduces the same classification and re-stamps the
/// settled timestamps.
pub fn resolve_market(
    store: &mut MarketStore,
    market_id: &str,
    winning_option_id: &str,
    now: u64,
) -> Result<Market, EngineError> {
    if !store.markets.contains_key(market_id) {
        return Err(EngineError::MarketNotFound(market_id.to_string()));
    }

    let option_belongs = store
        .options
        .get(winning_option_id)
        .map(|o| o.market_id == market_id)
        .unwrap_or(false);
    if !option_belongs {
        return Err(EngineError::OptionNotFound(format!(
            "option {} does not belong to market {}",
            winning_option_id, market_id
        )));
    }

    let mut snapshot = None;
    if let Some(market) = store.markets.get_mut(market_id) {
        market.status = MarketStatus::Resolved;
        market.winning_option_id = Some(winning_option_id.to_string());
        snapshot = Some(market.clone());
    }

    let mut settled = 0;
    for position in store.positions.values_mut().filter(|p| p.market_id == market_id) {
        position.status = if position.option_id == winning_option_id {
            PositionStatus::Won
        } else {
            PositionStatus::Lost
        };
        position.settled_at = Some(now);
        settled += 1;
    }
    info!("settled {} positions for market {}", settled, market_id);

    snapshot.ok_or_else(|| EngineError::MarketNotFound(market_id.to_string()))
}

/// List a user's positions, newest first, reconciling stragglers.
///
/// A position still pending while its market has meanwhile resolved is
/// classified against the winning option and persisted before it is
/// returned, so callers never observe a pending position on a resolved
/// market.
pub fn user_positions(store: &mut MarketStore, address: &str, now: u64) -> Vec<Position> {
    let mut index: Vec<(u64, String)> = store
        .positions
        .values()
        .filter(|p| p.user_address == address)
        .map(|p| (p.created_at, p.id.clone()))
        .collect();
    index.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut out = Vec::with_capacity(index.len());
    for (_, id) in index {
        let verdict = match store.positions.get(&id) {
            Some(p) if p.status == PositionStatus::Pending => match store.markets.get(&p.market_id) {
                Some(m) if m.status == MarketStatus::Resolved => {
                    m.winning_option_id.clone().map(|w| w == p.option_id)
                }
                _ => None,
            },
            _ => None,
        };

        if let Some(is_winner) = verdict {
            if let Some(position) = store.positions.get_mut(&id) {
                position.status = if is_winner {
                    PositionStatus::Won
                } else {
                    PositionStatus::Lost
                };
                position.settled_at = Some(now);
                info!("reconciled straggler position {} to {:?}", id, position.status);
            }
        }

        if let Some(position) = store.positions.get(&id) {
            out.push(position.clone());
        }
    }
    out
}

/// Claim payout for a user's unclaimed positions on a resolved market.
///
/// Every selected position is closed out in this pass, winner or not. With
/// no winners among them the payout is "0"; otherwise each winning position
/// is paid its share of the whole market pool and the sum is credited to
/// the user's balance.
pub fn claim_payout(
    store: &mut MarketStore,
    market_id: &str,
    user_address: &str,
) -> Result<ClaimSettlement, EngineError> {
    let market = store
        .market(market_id)
        .cloned()
        .ok_or_else(|| EngineError::MarketNotFound(market_id.to_string()))?;
    if market.status != MarketStatus::Resolved {
        return Err(EngineError::MarketNotResolved(market_id.to_string()));
    }

    let selected: Vec<Position> = store
        .positions
        .values()
        .filter(|p| p.market_id == market_id && p.user_address == user_address && !p.claimed)
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(EngineError::NoUnclaimedPositions(format!(
            "{} has nothing to claim on market {}",
            user_address, market_id
        )));
    }

    let winning_option_id = market.winning_option_id.clone().unwrap_or_default();
    let winners: Vec<&Position> = selected
        .iter()
        .filter(|p| p.option_id == winning_option_id)
        .collect();

    for position in &selected {
        if let Some(stored) = store.positions.get_mut(&position.id) {
            stored.claimed = true;
        }
    }

    if winners.is_empty() {
        // Losing positions are closed out without any credit
        let new_balance = store.get_or_create_user(user_address).balance;
        info!(
            "claim: {} closed {} losing positions on market {}",
            user_address,
            selected.len(),
            market_id
        );
        return Ok(ClaimSettlement {
            payout: "0".to_string(),
            positions_claimed: selected.len(),
            new_balance,
        });
    }

    let total_pool = market.total_liquidity;
    let winning_pool = store
        .options
        .get(&winning_option_id)
        .map(|o| o.total_staked)
        .unwrap_or(Decimal::ZERO);

    let mut total_payout = Decimal::ZERO;
    for position in &winners {
        total_payout += position_payout(position.amount, winning_pool, total_pool);
    }
    let total_payout = fixed6(total_payout);

    let user = store
        .users
        .entry(user_address.to_string())
        .or_insert_with(|| User::new(user_address));
    user.balance = fixed6(user.balance + total_payout);
    let new_balance = user.balance;

    info!(
        "claim: {} credited {} from market {}",
        user_address, total_payout, market_id
    );

    Ok(ClaimSettlement {
        payout: total_payout.to_string(),
        positions_claimed: selected.len(),
        new_balance,
    })
}
