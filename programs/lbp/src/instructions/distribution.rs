use tracing::debug;

use crate::{
    constants::*,
    error::{LbpError, Result},
    instructions::round::current_round,
    state::{Lbp, Timestamp, UserPosition},
};

/// Q64.64 amount to add to `out_per_share` when `released` output is spread
/// over `shares`.
///
/// Divide-first to avoid u128 overflow: q * ACC_SCALE + r * ACC_SCALE / shares
pub fn per_share_delta(released: u64, shares: u64) -> Result<u128> {
    if released == 0 || shares == 0 {
        return Ok(0);
    }
    let released = released as u128;
    let shares = shares as u128;
    let q = released / shares;
    let r = released % shares;
    q.checked_mul(ACC_SCALE)
        .ok_or(LbpError::MathOverflow)?
        .checked_add(r * ACC_SCALE / shares)
        .ok_or(LbpError::MathOverflow)
}

// ─── Round folding ─────────────────────────────────────────────────────────
// Advances `lbp.round` to the round of `now` (capped at `end_round`) and
// releases the supply owed to the folded rounds.
//
// The remaining supply is split evenly over the rounds still to come, so a
// fold over `k` of them releases `out_remaining * k / (end_round - round)`.
// Shares cannot change between two folds, which makes one accumulator bump
// for the whole span equal to one bump per round. When nobody is staked the
// rounds pass without releasing anything and their supply is spread over the
// rounds that remain; reaching `end_round` with stakers releases everything.
//
// Returns the amount released.
pub fn fold_rounds(lbp: &mut Lbp, now: Timestamp) -> Result<u64> {
    let target = current_round(lbp.start_time, lbp.end_time, now).min(lbp.end_round);
    if target <= lbp.round {
        return Ok(0);
    }

    let mut released = 0u64;
    if lbp.shares > 0 && lbp.out_remaining > 0 {
        let elapsed = (target - lbp.round) as u128;
        let rounds_left = (lbp.end_round - lbp.round) as u128;
        released = ((lbp.out_remaining as u128)
            .checked_mul(elapsed)
            .ok_or(LbpError::MathOverflow)?
            / rounds_left) as u64;

        let delta = per_share_delta(released, lbp.shares)?;
        lbp.out_per_share = lbp
            .out_per_share
            .checked_add(delta)
            .ok_or(LbpError::MathOverflow)?;
        lbp.out_remaining -= released; // released <= out_remaining since elapsed <= rounds_left
        lbp.out_sold = lbp
            .out_sold
            .checked_add(released)
            .ok_or(LbpError::MathOverflow)?;
    }

    debug!(
        lbp_id = lbp.id,
        from = lbp.round,
        to = target,
        released,
        shares = lbp.shares,
        "rounds folded"
    );
    lbp.round = target;
    Ok(released)
}

/// Release whatever `out_remaining` is left into the accumulator in one bump.
/// No-op without stakers. Returns the amount swept.
pub fn sweep_remaining(lbp: &mut Lbp) -> Result<u64> {
    if lbp.shares == 0 || lbp.out_remaining == 0 {
        return Ok(0);
    }
    let swept = lbp.out_remaining;
    let delta = per_share_delta(swept, lbp.shares)?;
    lbp.out_per_share = lbp
        .out_per_share
        .checked_add(delta)
        .ok_or(LbpError::MathOverflow)?;
    lbp.out_sold = lbp
        .out_sold
        .checked_add(swept)
        .ok_or(LbpError::MathOverflow)?;
    lbp.out_remaining = 0;
    Ok(swept)
}

// ─── Reconcile ─────────────────────────────────────────────────────────────
// Call after `fold_rounds` and before any change to `position.shares`.
// Returns the output newly credited to `position.purchased`.
pub fn reconcile(position: &mut UserPosition, lbp: &Lbp) -> Result<u64> {
    let delta = lbp.out_per_share.saturating_sub(position.out_per_share);

    // owed = shares * delta >> 64  (Q64.64 → integer, truncating)
    let owed = (position.shares as u128)
        .checked_mul(delta)
        .ok_or(LbpError::MathOverflow)?
        >> ACC_SHIFT;
    let owed = u64::try_from(owed).map_err(|_| LbpError::MathOverflow)?;

    position.purchased = position
        .purchased
        .checked_add(owed)
        .ok_or(LbpError::MathOverflow)?;
    position.out_per_share = lbp.out_per_share;
    Ok(owed)
}

// ─── Share issuance / retirement ───────────────────────────────────────────
// Shares are issued 1:1 with staked `token_in`.

pub fn stake(lbp: &mut Lbp, position: &mut UserPosition, amount: u64) -> Result<()> {
    let shares = amount;
    let pool_shares = lbp.shares.checked_add(shares).ok_or(LbpError::MathOverflow)?;
    let pool_staked = lbp.staked.checked_add(amount).ok_or(LbpError::MathOverflow)?;
    let income = lbp.income.checked_add(amount).ok_or(LbpError::MathOverflow)?;
    let pos_shares = position.shares.checked_add(shares).ok_or(LbpError::MathOverflow)?;
    let pos_staked = position.staked.checked_add(amount).ok_or(LbpError::MathOverflow)?;
    let spent = position.spent.checked_add(amount).ok_or(LbpError::MathOverflow)?;

    lbp.shares = pool_shares;
    lbp.staked = pool_staked;
    lbp.income = income;
    position.shares = pos_shares;
    position.staked = pos_staked;
    position.spent = spent;
    Ok(())
}

pub fn unstake(lbp: &mut Lbp, position: &mut UserPosition, amount: u64) -> Result<()> {
    if amount > position.staked {
        return Err(LbpError::InsufficientStake {
            requested: amount,
            staked: position.staked,
        });
    }
    let shares = amount;
    let pool_shares = lbp.shares.checked_sub(shares).ok_or(LbpError::MathOverflow)?;
    let pool_staked = lbp.staked.checked_sub(amount).ok_or(LbpError::MathOverflow)?;
    let pos_shares = position.shares.checked_sub(shares).ok_or(LbpError::MathOverflow)?;

    lbp.shares = pool_shares;
    lbp.staked = pool_staked;
    position.shares = pos_shares;
    position.staked -= amount;
    Ok(())
}

// ─── Preview ───────────────────────────────────────────────────────────────

/// Output `position` could collect at `now`: unpaid credit plus what folding
/// the pool forward would add. Mirrors the handlers exactly; mutates nothing.
pub fn pending_purchase(lbp: &Lbp, position: &UserPosition, now: Timestamp) -> Result<u64> {
    let mut lbp = lbp.clone();
    let mut position = position.clone();
    fold_rounds(&mut lbp, now)?;
    reconcile(&mut position, &lbp)?;
    Ok(position.unclaimed())
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Timestamp = 1_000_000;
    const R: Timestamp = ROUND_SECONDS;

    fn two_round_lbp(total_out: u64) -> Lbp {
        Lbp::new(
            1,
            "treasury".into(),
            "uin".into(),
            "uout".into(),
            T0,
            T0 + 2 * R,
            total_out,
        )
    }

    #[test]
    fn test_per_share_delta_keeps_remainder() {
        assert_eq!(per_share_delta(50, 10).unwrap(), 5 * ACC_SCALE);
        assert_eq!(per_share_delta(1, 2).unwrap(), ACC_SCALE / 2);
        assert_eq!(per_share_delta(10, 3).unwrap(), 3 * ACC_SCALE + ACC_SCALE / 3);
        assert_eq!(per_share_delta(0, 3).unwrap(), 0);
        assert_eq!(per_share_delta(7, 0).unwrap(), 0);
        assert!(per_share_delta(u64::MAX, 1).is_ok());
    }

    #[test]
    fn test_single_staker_receives_everything() {
        let mut lbp = two_round_lbp(100);
        let mut pos = UserPosition::new(1, "alice".into());
        fold_rounds(&mut lbp, T0).unwrap();
        reconcile(&mut pos, &lbp).unwrap();
        stake(&mut lbp, &mut pos, 10).unwrap();

        assert_eq!(fold_rounds(&mut lbp, T0 + R).unwrap(), 50);
        assert_eq!(lbp.out_remaining, 50);
        assert_eq!(lbp.out_per_share, 5 * ACC_SCALE);

        assert_eq!(fold_rounds(&mut lbp, T0 + 2 * R).unwrap(), 50);
        assert_eq!(lbp.out_per_share, 10 * ACC_SCALE);
        assert_eq!(lbp.round, lbp.end_round);

        assert_eq!(reconcile(&mut pos, &lbp).unwrap(), 100);
        assert_eq!(pos.purchased, 100);
        assert_eq!(lbp.out_remaining, 0);
        assert_eq!(lbp.out_sold, 100);
    }

    #[test]
    fn test_reconcile_twice_is_noop() {
        let mut lbp = two_round_lbp(100);
        let mut pos = UserPosition::new(1, "alice".into());
        stake(&mut lbp, &mut pos, 10).unwrap();
        fold_rounds(&mut lbp, T0 + R).unwrap();
        assert_eq!(reconcile(&mut pos, &lbp).unwrap(), 50);
        assert_eq!(reconcile(&mut pos, &lbp).unwrap(), 0);
        assert_eq!(pos.purchased, 50);
    }

    #[test]
    fn test_empty_rounds_defer_supply() {
        let mut lbp = Lbp::new(1, "t".into(), "uin".into(), "uout".into(), T0, T0 + 4 * R, 100);
        // Rounds 0 and 1 pass with nobody staked
        assert_eq!(fold_rounds(&mut lbp, T0 + 2 * R).unwrap(), 0);
        assert_eq!(lbp.round, 2);
        assert_eq!(lbp.out_remaining, 100);

        let mut pos = UserPosition::new(1, "bob".into());
        reconcile(&mut pos, &lbp).unwrap();
        stake(&mut lbp, &mut pos, 4).unwrap();

        assert_eq!(fold_rounds(&mut lbp, T0 + 3 * R).unwrap(), 50);
        assert_eq!(fold_rounds(&mut lbp, T0 + 10 * R).unwrap(), 50);
        assert_eq!(lbp.out_remaining, 0);
        reconcile(&mut pos, &lbp).unwrap();
        assert_eq!(pos.purchased, 100);
    }

    #[test]
    fn test_fold_is_idempotent_within_round() {
        let mut lbp = two_round_lbp(100);
        let mut pos = UserPosition::new(1, "alice".into());
        stake(&mut lbp, &mut pos, 10).unwrap();
        fold_rounds(&mut lbp, T0 + R).unwrap();
        let snapshot = lbp.clone();
        assert_eq!(fold_rounds(&mut lbp, T0 + R + R / 2).unwrap(), 0);
        assert_eq!(lbp, snapshot);
        // Time moving backwards never rewinds the round
        assert_eq!(fold_rounds(&mut lbp, T0).unwrap(), 0);
        assert_eq!(lbp, snapshot);
    }

    #[test]
    fn test_unstake_rejects_more_than_staked() {
        let mut lbp = two_round_lbp(100);
        let mut pos = UserPosition::new(1, "alice".into());
        stake(&mut lbp, &mut pos, 10).unwrap();
        let err = unstake(&mut lbp, &mut pos, 11).unwrap_err();
        assert_eq!(err, LbpError::InsufficientStake { requested: 11, staked: 10 });
        assert_eq!(pos.staked, 10);
        assert_eq!(lbp.shares, 10);

        unstake(&mut lbp, &mut pos, 4).unwrap();
        assert_eq!((pos.shares, pos.staked, pos.spent), (6, 6, 10));
        assert_eq!((lbp.shares, lbp.staked, lbp.income), (6, 6, 10));
    }

    #[test]
    fn test_sweep_releases_remaining() {
        let mut lbp = two_round_lbp(100);
        let mut pos = UserPosition::new(1, "alice".into());
        assert_eq!(sweep_remaining(&mut lbp).unwrap(), 0);
        stake(&mut lbp, &mut pos, 3).unwrap();
        assert_eq!(sweep_remaining(&mut lbp).unwrap(), 100);
        assert_eq!(lbp.out_remaining, 0);
        assert_eq!(lbp.out_sold, 100);
        reconcile(&mut pos, &lbp).unwrap();
        // 100 / 3 per share truncates below one unit
        assert_eq!(pos.purchased, 99);
    }

    #[test]
    fn test_pending_purchase_does_not_mutate() {
        let mut lbp = two_round_lbp(100);
        let mut pos = UserPosition::new(1, "alice".into());
        stake(&mut lbp, &mut pos, 10).unwrap();
        let (lbp_before, pos_before) = (lbp.clone(), pos.clone());
        assert_eq!(pending_purchase(&lbp, &pos, T0 + R).unwrap(), 50);
        assert_eq!(pending_purchase(&lbp, &pos, T0 + 5 * R).unwrap(), 100);
        assert_eq!(lbp, lbp_before);
        assert_eq!(pos, pos_before);
    }
}
