//! Engine error type.

/// All errors returned by the LBP engine.
///
/// Every error is raised before any entity is persisted, so a failing call
/// leaves the pool and the position exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LbpError {
    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid sale window: {0}")]
    InvalidWindow(String),

    #[error("Invalid denomination or address: {0}")]
    InvalidDenom(String),

    #[error("Address {0} is the module custody account")]
    ReservedAddress(String),

    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    // ── Pool lifecycle ───────────────────────────────────────────────────────
    #[error("LBP {0} not found")]
    PoolNotFound(u64),

    #[error("LBP {id} is still distributing: round {round} of {end_round}")]
    PoolNotClosed { id: u64, round: u64, end_round: u64 },

    #[error("LBP {0} is already finalized")]
    PoolAlreadyFinalized(u64),

    #[error("LBP {0} no longer accepts subscriptions")]
    SubscriptionClosed(u64),

    // ── Positions ────────────────────────────────────────────────────────────
    #[error("Position has no shares in LBP {0}")]
    ZeroSharePosition(u64),

    #[error("Insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: u64, staked: u64 },

    // ── Ledger ───────────────────────────────────────────────────────────────
    #[error("Insufficient funds: {address} holds {available}{denom}, needs {required}{denom}")]
    InsufficientFunds {
        address: String,
        denom: String,
        available: u128,
        required: u128,
    },

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("Math overflow")]
    MathOverflow,

    // ── Persistence / configuration ──────────────────────────────────────────
    #[error("Record codec error at offset {offset}: {reason}")]
    Codec { offset: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, LbpError>;
