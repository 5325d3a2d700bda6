//! Engine configuration.
//!
//! The module custody address holds every staked `token_in` and the unsold
//! `token_out` of all pools. It is derived once from the module name and
//! threaded into the [`Keeper`](crate::Keeper); nothing looks it up globally.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{
    constants::MODULE_NAME,
    error::{LbpError, Result},
};

/// Length of a derived module address before base-58 encoding.
const MODULE_ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Account that takes custody of pool funds
    pub module_address: String,
}

impl Config {
    /// Config whose custody account is derived from `module_name`.
    pub fn for_module(module_name: &str) -> Self {
        Self {
            module_address: derive_module_address(module_name),
        }
    }

    /// Parse a JSON config. A missing `module_address` falls back to the
    /// address derived from [`MODULE_NAME`].
    ///
    /// ```json
    /// { "module_address": "3tMZ2z…" }
    /// ```
    pub fn from_json(raw: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct RawConfig {
            module_address: Option<String>,
        }

        let parsed: RawConfig =
            serde_json::from_str(raw).map_err(|e| LbpError::Config(e.to_string()))?;
        let config = match parsed.module_address {
            Some(module_address) => Self { module_address },
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.module_address.trim().is_empty() {
            return Err(LbpError::Config("module_address must not be empty".into()));
        }
        Ok(())
    }

    /// Fail if `address` is the custody account. Moving funds between the
    /// module and itself is a no-op, so it may not act as a party.
    pub fn ensure_external(&self, address: &str) -> Result<()> {
        if address == self.module_address {
            return Err(LbpError::ReservedAddress(address.to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_module(MODULE_NAME)
    }
}

/// Deterministic module account address: `bs58(sha256(name)[..20])`.
pub fn derive_module_address(module_name: &str) -> String {
    let digest = Sha256::digest(module_name.as_bytes());
    bs58::encode(&digest[..MODULE_ADDRESS_LEN]).into_string()
}
