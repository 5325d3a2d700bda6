use crate::{constants::ROUND_SECONDS, state::Timestamp};

/// Index of the round containing `now` for a sale over `[start, end]`.
///
/// Rounds count whole `ROUND_SECONDS` elapsed since `start`, so a timestamp
/// exactly on a boundary belongs to the round it completes. Anything before
/// `start` is round 0 and anything after `end` is pinned to the round of `end`.
pub fn current_round(start: Timestamp, end: Timestamp, now: Timestamp) -> u64 {
    let now = now.min(end);
    if now <= start {
        return 0;
    }
    // i128 keeps `now - start` exact for any pair of i64 timestamps
    let elapsed = now as i128 - start as i128;
    (elapsed / ROUND_SECONDS as i128) as u64
}
