use tracing::info;

use crate::{
    bank::{ensure_funds, Ledger},
    error::{LbpError, Result},
    state::Timestamp,
    store::Store,
};
use super::{distribution::*, load_lbp, Context, Staged};

/// What finalization did with the supply left in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// `token_out` swept into the accumulator for current stakers
    pub swept: u64,
    /// Unsold `token_out` sent back to the treasury (nobody staked at the end)
    pub returned: u64,
}

/// Close a pool whose last round has elapsed.
///
/// Remaining output is swept into `out_per_share` when there are stakers,
/// otherwise it goes back to the treasury and stays recorded as unsold.
///
/// A fold that reaches `end_round` with stakers has already released all of
/// `out_remaining`, so `swept` is zero for pools driven only by these
/// handlers. What stays in custody after the last exit is the sub-unit
/// truncation of `shares * delta >> 64`.
pub fn handler<S: Store + ?Sized, L: Ledger + ?Sized>(
    ctx: Context<'_, S, L>,
    lbp_id: u64,
    now: Timestamp,
) -> Result<FinalizeOutcome> {
    let mut lbp = load_lbp(&*ctx.store, lbp_id)?;
    if lbp.finalized {
        return Err(LbpError::PoolAlreadyFinalized(lbp_id));
    }

    fold_rounds(&mut lbp, now)?;
    if lbp.round < lbp.end_round {
        return Err(LbpError::PoolNotClosed {
            id: lbp_id,
            round: lbp.round,
            end_round: lbp.end_round,
        });
    }

    let swept = sweep_remaining(&mut lbp)?;
    let returned = if lbp.shares == 0 { lbp.out_remaining } else { 0 };
    lbp.finalized = true;
    let staged = Staged::new(&lbp, None)?;
    if returned > 0 {
        let module = ctx.config.module_address.as_str();
        ensure_funds(&*ctx.ledger, module, &[(lbp.token_out.as_str(), returned)])?;
        ctx.ledger
            .transfer(module, &lbp.treasury, &lbp.token_out, returned)?;
    }
    staged.commit(&mut *ctx.store);

    info!(
        lbp_id,
        swept,
        returned,
        out_sold = lbp.out_sold,
        total_out = lbp.total_out(),
        income = lbp.income,
        "LBP finalized"
    );
    Ok(FinalizeOutcome { swept, returned })
}
