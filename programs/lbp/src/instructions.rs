#![allow(ambiguous_glob_reexports)]

pub mod round;
pub mod distribution;
pub mod create_lbp;
pub mod subscribe;
pub mod withdraw;
pub mod finalize_lbp;
pub mod exit_lbp;

pub use round::*;
pub use distribution::*;
pub use create_lbp::*;
pub use subscribe::*;
pub use withdraw::*;
pub use finalize_lbp::*;
pub use exit_lbp::*;

use crate::{
    bank::Ledger,
    codec,
    config::Config,
    error::{LbpError, Result},
    state::{Lbp, UserPosition},
    store::Store,
};

/// Collaborators a handler runs against.
///
/// Handlers load entities into locals, fold and mutate the locals, encode
/// them, check and run transfers, and write the records back last. Any error
/// leaves the store untouched.
pub struct Context<'a, S: Store + ?Sized, L: Ledger + ?Sized> {
    pub store: &'a mut S,
    pub ledger: &'a mut L,
    pub config: &'a Config,
}

pub(crate) fn load_lbp<S: Store + ?Sized>(store: &S, id: u64) -> Result<Lbp> {
    let raw = store.lbp_record(id).ok_or(LbpError::PoolNotFound(id))?;
    codec::decode_lbp(&raw)
}

pub(crate) fn find_position<S: Store + ?Sized>(
    store: &S,
    lbp_id: u64,
    owner: &str,
) -> Result<Option<UserPosition>> {
    store
        .position_record(lbp_id, owner)
        .map(|raw| codec::decode_position(&raw))
        .transpose()
}

/// Position that currently holds shares.
pub(crate) fn load_active_position<S: Store + ?Sized>(
    store: &S,
    lbp_id: u64,
    owner: &str,
) -> Result<UserPosition> {
    find_position(store, lbp_id, owner)?
        .filter(|p| p.shares > 0)
        .ok_or(LbpError::ZeroSharePosition(lbp_id))
}

/// Records an operation writes, encoded before any token moves.
pub(crate) struct Staged {
    lbp_id: u64,
    lbp: Vec<u8>,
    position: Option<(String, Vec<u8>)>,
}

impl Staged {
    pub(crate) fn new(lbp: &Lbp, position: Option<&UserPosition>) -> Result<Self> {
        let position = match position {
            Some(p) => Some((p.owner.clone(), codec::encode_position(p)?)),
            None => None,
        };
        Ok(Self {
            lbp_id: lbp.id,
            lbp: codec::encode_lbp(lbp)?,
            position,
        })
    }

    pub(crate) fn commit<S: Store + ?Sized>(self, store: &mut S) {
        store.set_lbp_record(self.lbp_id, self.lbp);
        if let Some((owner, record)) = self.position {
            store.set_position_record(self.lbp_id, &owner, record);
        }
    }
}
