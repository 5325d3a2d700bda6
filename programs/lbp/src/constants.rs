/// Module name; the module custody address is derived from it
pub const MODULE_NAME: &str = "lbp";

/// Length of one distribution round, in seconds
pub const ROUND_SECONDS: i64 = 3_600;

/// Q64.64 fixed-point scale (out-per-share accumulators)
pub const ACC_SCALE: u128 = 1u128 << 64;

/// Bits to shift a Q64.64 product back to whole token units
pub const ACC_SHIFT: u32 = 64;

/// Record discriminator preimages, hashed into the first 8 bytes of each record
pub const LBP_RECORD: &str = "account:Lbp";
pub const POSITION_RECORD: &str = "account:UserPosition";

/// First id handed out by a fresh store
pub const FIRST_LBP_ID: u64 = 1;
