use tracing::info;

use crate::{
    bank::{ensure_funds, Ledger},
    error::{LbpError, Result},
    state::{Lbp, Timestamp},
    store::Store,
};
use super::{Context, Staged};

/// Parameters for a new pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLbpParams {
    pub treasury: String,
    pub token_in: String,
    pub token_out: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// `token_out` offered over the whole window
    pub total_out: u64,
}

/// Create a pool and move its `total_out` supply from `creator` into the
/// module account. Returns the new pool id.
pub fn handler<S: Store + ?Sized, L: Ledger + ?Sized>(
    ctx: Context<'_, S, L>,
    creator: &str,
    params: CreateLbpParams,
) -> Result<u64> {
    if params.start_time >= params.end_time {
        return Err(LbpError::InvalidWindow(format!(
            "start {} must be before end {}",
            params.start_time, params.end_time
        )));
    }
    if params.total_out == 0 {
        return Err(LbpError::InvalidWindow("total_out must be positive".into()));
    }
    for (name, value) in [
        ("treasury", &params.treasury),
        ("token_in", &params.token_in),
        ("token_out", &params.token_out),
    ] {
        if value.trim().is_empty() {
            return Err(LbpError::InvalidDenom(format!("{name} must not be empty")));
        }
    }
    if params.token_in == params.token_out {
        return Err(LbpError::InvalidDenom(format!(
            "token_in and token_out are both {}",
            params.token_in
        )));
    }

    ctx.config.ensure_external(creator)?;
    ctx.config.ensure_external(&params.treasury)?;

    let id = ctx.store.next_lbp_id();
    let lbp = Lbp::new(
        id,
        params.treasury,
        params.token_in,
        params.token_out,
        params.start_time,
        params.end_time,
        params.total_out,
    );
    if lbp.end_round == 0 {
        return Err(LbpError::InvalidWindow(
            "window is shorter than one round".into(),
        ));
    }

    // Creator funds the sale
    let staged = Staged::new(&lbp, None)?;
    let module = ctx.config.module_address.as_str();
    ensure_funds(&*ctx.ledger, creator, &[(lbp.token_out.as_str(), params.total_out)])?;
    ctx.ledger
        .transfer(creator, module, &lbp.token_out, params.total_out)?;

    staged.commit(&mut *ctx.store);

    info!(
        lbp_id = id,
        creator,
        token_in = %lbp.token_in,
        token_out = %lbp.token_out,
        total_out = params.total_out,
        end_round = lbp.end_round,
        "LBP created"
    );
    Ok(id)
}
