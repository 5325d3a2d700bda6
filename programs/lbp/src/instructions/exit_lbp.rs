use tracing::info;

use crate::{
    bank::{ensure_funds, Ledger},
    error::Result,
    state::Timestamp,
    store::Store,
};
use super::{distribution::*, load_active_position, load_lbp, Context, Staged};

/// Amounts paid to a participant on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `token_out` paid now (credited output not yet claimed)
    pub purchased: u64,
    /// `token_in` returned (the whole remaining stake)
    pub refunded: u64,
}

/// Leave the pool: collect credited output and the remaining stake.
/// Accepted in every state, including after finalization.
pub fn handler<S: Store + ?Sized, L: Ledger + ?Sized>(
    ctx: Context<'_, S, L>,
    lbp_id: u64,
    participant: &str,
    now: Timestamp,
) -> Result<ExitOutcome> {
    ctx.config.ensure_external(participant)?;
    let mut lbp = load_lbp(&*ctx.store, lbp_id)?;
    let mut position = load_active_position(&*ctx.store, lbp_id, participant)?;

    fold_rounds(&mut lbp, now)?;
    reconcile(&mut position, &lbp)?;

    let refunded = position.staked;
    unstake(&mut lbp, &mut position, refunded)?;

    let purchased = position.unclaimed();
    position.claimed = position.purchased;

    let staged = Staged::new(&lbp, Some(&position))?;
    let module = ctx.config.module_address.as_str();
    ensure_funds(
        &*ctx.ledger,
        module,
        &[(lbp.token_out.as_str(), purchased), (lbp.token_in.as_str(), refunded)],
    )?;
    if purchased > 0 {
        ctx.ledger
            .transfer(module, participant, &lbp.token_out, purchased)?;
    }
    if refunded > 0 {
        ctx.ledger
            .transfer(module, participant, &lbp.token_in, refunded)?;
    }

    staged.commit(&mut *ctx.store);

    info!(
        lbp_id,
        participant,
        purchased,
        refunded,
        round = lbp.round,
        "Exited"
    );
    Ok(ExitOutcome { purchased, refunded })
}
