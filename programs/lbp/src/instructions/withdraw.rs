use tracing::info;

use crate::{
    bank::{ensure_funds, Ledger},
    error::{LbpError, Result},
    state::Timestamp,
    store::Store,
};
use super::{distribution::*, load_active_position, load_lbp, Context, Staged};

/// Unstake `amount` of `token_in`, burning the same number of shares.
///
/// Output credited up to `now` is paid out in the same call; the return value
/// is that `token_out` amount (zero if nothing was owed).
pub fn handler<S: Store + ?Sized, L: Ledger + ?Sized>(
    ctx: Context<'_, S, L>,
    lbp_id: u64,
    participant: &str,
    amount: u64,
    now: Timestamp,
) -> Result<u64> {
    if amount == 0 {
        return Err(LbpError::NonPositiveAmount);
    }
    ctx.config.ensure_external(participant)?;

    let mut lbp = load_lbp(&*ctx.store, lbp_id)?;
    if lbp.finalized {
        return Err(LbpError::PoolAlreadyFinalized(lbp_id));
    }
    let mut position = load_active_position(&*ctx.store, lbp_id, participant)?;
    if amount > position.staked {
        return Err(LbpError::InsufficientStake {
            requested: amount,
            staked: position.staked,
        });
    }

    fold_rounds(&mut lbp, now)?;
    reconcile(&mut position, &lbp)?;
    unstake(&mut lbp, &mut position, amount)?;

    let payout = position.unclaimed();
    position.claimed = position.purchased;

    let staged = Staged::new(&lbp, Some(&position))?;
    let module = ctx.config.module_address.as_str();
    ensure_funds(
        &*ctx.ledger,
        module,
        &[(lbp.token_in.as_str(), amount), (lbp.token_out.as_str(), payout)],
    )?;
    ctx.ledger
        .transfer(module, participant, &lbp.token_in, amount)?;
    if payout > 0 {
        ctx.ledger
            .transfer(module, participant, &lbp.token_out, payout)?;
    }

    staged.commit(&mut *ctx.store);

    info!(
        lbp_id,
        participant,
        amount,
        payout,
        round = lbp.round,
        "Withdrawn"
    );
    Ok(payout)
}
