use tracing::info;

use crate::{
    bank::{ensure_funds, Ledger},
    error::{LbpError, Result},
    state::{LbpStatus, Timestamp, UserPosition},
    store::Store,
};
use super::{distribution::*, find_position, load_lbp, Context, Staged};

/// Stake `amount` of `token_in` and receive shares 1:1.
/// Only accepted while rounds remain to be distributed.
pub fn handler<S: Store + ?Sized, L: Ledger + ?Sized>(
    ctx: Context<'_, S, L>,
    lbp_id: u64,
    participant: &str,
    amount: u64,
    now: Timestamp,
) -> Result<()> {
    if amount == 0 {
        return Err(LbpError::NonPositiveAmount);
    }
    ctx.config.ensure_external(participant)?;

    let mut lbp = load_lbp(&*ctx.store, lbp_id)?;
    if lbp.finalized {
        return Err(LbpError::PoolAlreadyFinalized(lbp_id));
    }
    fold_rounds(&mut lbp, now)?;
    if lbp.status() != LbpStatus::Open {
        return Err(LbpError::SubscriptionClosed(lbp_id));
    }

    let mut position = find_position(&*ctx.store, lbp_id, participant)?
        .unwrap_or_else(|| UserPosition::new(lbp_id, participant.to_string()));

    // Sync against the accumulator before shares change
    reconcile(&mut position, &lbp)?;
    stake(&mut lbp, &mut position, amount)?;

    let staged = Staged::new(&lbp, Some(&position))?;
    let module = ctx.config.module_address.as_str();
    ensure_funds(&*ctx.ledger, participant, &[(lbp.token_in.as_str(), amount)])?;
    ctx.ledger
        .transfer(participant, module, &lbp.token_in, amount)?;

    staged.commit(&mut *ctx.store);

    info!(
        lbp_id,
        participant,
        amount,
        round = lbp.round,
        shares = position.shares,
        "Subscribed"
    );
    Ok(())
}
