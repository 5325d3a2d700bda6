//! LBP: round-quantized proportional distribution for liquidity bootstrapping pools.
//!
//! A pool sells a fixed `token_out` supply over `[start_time, end_time]`.
//! Stakers of `token_in` receive shares 1:1; each elapsed round releases an
//! even slice of the remaining supply into an out-per-share accumulator, and a
//! participant's entitlement is their shares times the accumulator growth
//! since their last interaction. Only integer math is used, so every replica
//! that applies the same operations at the same times ends in the same state.
//!
//! 5 operations:
//!   create_lbp    : open a pool; creator deposits the full `token_out` supply
//!   subscribe     : stake `token_in` for shares (while rounds remain)
//!   withdraw      : unstake part of a position; pays credited output
//!   finalize_lbp  : after the last round, sweep leftovers and close the pool
//!   exit_lbp      : collect credited output and the remaining stake
//!
//! ```rust
//! use lbp::{bank::MemLedger, store::MemStore, Config, CreateLbpParams, Keeper, ROUND_SECONDS};
//!
//! let mut keeper = Keeper::new(MemStore::new(), MemLedger::new(), Config::default()).unwrap();
//! keeper.ledger_mut().mint("creator", "uout", 100);
//! keeper.ledger_mut().mint("alice", "uin", 10);
//!
//! let t0 = 1_700_000_000;
//! let id = keeper
//!     .create_lbp("creator", CreateLbpParams {
//!         treasury:   "treasury".into(),
//!         token_in:   "uin".into(),
//!         token_out:  "uout".into(),
//!         start_time: t0,
//!         end_time:   t0 + 2 * ROUND_SECONDS,
//!         total_out:  100,
//!     })
//!     .unwrap();
//!
//! keeper.subscribe(id, "alice", 10, t0).unwrap();
//! let out = keeper.exit_lbp(id, "alice", t0 + 2 * ROUND_SECONDS).unwrap();
//! assert_eq!((out.purchased, out.refunded), (100, 10));
//! ```

pub mod bank;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;
pub mod store;

pub use config::Config;
pub use constants::*;
pub use error::{LbpError, Result};
pub use instructions::*;
pub use state::*;

use bank::Ledger;
use store::Store;

/// Owns the collaborators and dispatches each operation to its handler.
///
/// Operations on one keeper are applied strictly in call order; the caller
/// supplies `now` for every time-dependent call.
pub struct Keeper<S: Store, L: Ledger> {
    store: S,
    ledger: L,
    config: Config,
}

impl<S: Store, L: Ledger> Keeper<S, L> {
    pub fn new(store: S, ledger: L, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, ledger, config })
    }

    fn ctx(&mut self) -> Context<'_, S, L> {
        Context {
            store: &mut self.store,
            ledger: &mut self.ledger,
            config: &self.config,
        }
    }

    /// Open a pool. The creator's `total_out` moves into module custody.
    pub fn create_lbp(&mut self, creator: &str, params: CreateLbpParams) -> Result<u64> {
        create_lbp::handler(self.ctx(), creator, params)
    }

    /// Stake `amount` of `token_in` for shares.
    pub fn subscribe(&mut self, lbp_id: u64, participant: &str, amount: u64, now: Timestamp) -> Result<()> {
        subscribe::handler(self.ctx(), lbp_id, participant, amount, now)
    }

    /// Unstake `amount`; returns the `token_out` paid alongside.
    pub fn withdraw(&mut self, lbp_id: u64, participant: &str, amount: u64, now: Timestamp) -> Result<u64> {
        withdraw::handler(self.ctx(), lbp_id, participant, amount, now)
    }

    /// Close a pool once its last round has elapsed.
    pub fn finalize_lbp(&mut self, lbp_id: u64, now: Timestamp) -> Result<FinalizeOutcome> {
        finalize_lbp::handler(self.ctx(), lbp_id, now)
    }

    /// Collect credited output and the remaining stake.
    pub fn exit_lbp(&mut self, lbp_id: u64, participant: &str, now: Timestamp) -> Result<ExitOutcome> {
        exit_lbp::handler(self.ctx(), lbp_id, participant, now)
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub fn lbp(&self, lbp_id: u64) -> Result<Lbp> {
        instructions::load_lbp(&self.store, lbp_id)
    }

    pub fn position(&self, lbp_id: u64, owner: &str) -> Result<Option<UserPosition>> {
        instructions::find_position(&self.store, lbp_id, owner)
    }

    /// `token_out` that `owner` could collect at `now` without changing state.
    pub fn pending_purchase(&self, lbp_id: u64, owner: &str, now: Timestamp) -> Result<u64> {
        let lbp = self.lbp(lbp_id)?;
        match instructions::find_position(&self.store, lbp_id, owner)? {
            Some(position) => distribution::pending_purchase(&lbp, &position, now),
            None => Ok(0),
        }
    }

    pub fn module_address(&self) -> &str {
        &self.config.module_address
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }
}
