use borsh::{BorshDeserialize, BorshSerialize};

use crate::instructions::round::current_round;

/// Unix time in seconds, as supplied by the surrounding system (block time).
pub type Timestamp = i64;

/// Lifecycle of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LbpStatus {
    /// Rounds are still being distributed; subscriptions accepted.
    Open,
    /// Every round has elapsed; waiting for `finalize_lbp`.
    Closing,
    /// Dust swept, subscriptions rejected. Exits remain possible.
    Finalized,
}

// ─── Lbp ───────────────────────────────────────────────────────────────────
// One liquidity bootstrapping pool. `token_out` supply is released into
// `out_per_share` round by round; stakers of `token_in` collect it by diffing
// their snapshot against the accumulator.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Lbp {
    pub id: u64,
    /// Receives unsold output when nobody is staked at the end
    pub treasury: String,
    pub token_in: String,
    pub token_out: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Output not yet released into the accumulator
    pub out_remaining: u64,
    /// Output released so far; `out_sold + out_remaining` is the sale total
    pub out_sold: u64,
    /// Cumulative output earned per share, Q64.64 fixed-point
    pub out_per_share: u128,
    /// `token_in` currently staked by all participants
    pub staked: u64,
    /// Cumulative `token_in` ever staked (withdrawals do not reduce it)
    pub income: u64,
    pub shares: u64,
    /// Last round folded into `out_per_share`
    pub round: u64,
    pub end_round: u64,
    pub finalized: bool,
}

impl Lbp {
    pub fn new(
        id: u64,
        treasury: String,
        token_in: String,
        token_out: String,
        start_time: Timestamp,
        end_time: Timestamp,
        total_out: u64,
    ) -> Self {
        Self {
            id,
            treasury,
            token_in,
            token_out,
            start_time,
            end_time,
            out_remaining: total_out,
            out_sold: 0,
            out_per_share: 0,
            staked: 0,
            income: 0,
            shares: 0,
            round: 0,
            end_round: current_round(start_time, end_time, end_time),
            finalized: false,
        }
    }

    /// Output fixed at creation.
    pub fn total_out(&self) -> u64 {
        self.out_sold.saturating_add(self.out_remaining)
    }

    /// Status according to the last folded round.
    pub fn status(&self) -> LbpStatus {
        if self.finalized {
            LbpStatus::Finalized
        } else if self.round >= self.end_round {
            LbpStatus::Closing
        } else {
            LbpStatus::Open
        }
    }
}

// ─── UserPosition ──────────────────────────────────────────────────────────
// Tracks one participant's stake in a single pool.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserPosition {
    pub lbp_id: u64,
    pub owner: String,
    pub shares: u64,
    pub staked: u64,
    /// Accumulator snapshot at last reconcile
    pub out_per_share: u128,
    /// Cumulative `token_in` committed
    pub spent: u64,
    /// Cumulative `token_out` credited
    pub purchased: u64,
    /// Cumulative `token_out` paid out (by withdraw or exit)
    pub claimed: u64,
}

impl UserPosition {
    pub fn new(lbp_id: u64, owner: String) -> Self {
        Self {
            lbp_id,
            owner,
            shares: 0,
            staked: 0,
            out_per_share: 0,
            spent: 0,
            purchased: 0,
            claimed: 0,
        }
    }

    /// Credited output not yet paid out.
    pub fn unclaimed(&self) -> u64 {
        self.purchased.saturating_sub(self.claimed)
    }
}
