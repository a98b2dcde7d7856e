// Market settlement: staking, resolution, lazy reconciliation, claims

pub mod engine;
pub mod payout;

pub use engine::{claim_payout, open_position, resolve_market, user_positions, ClaimSettlement};
pub use payout::{fixed6, position_payout};
