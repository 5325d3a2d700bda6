//! Pool and position persistence.

use std::collections::BTreeMap;

use crate::{codec, constants::FIRST_LBP_ID, error::Result, state::UserPosition};

/// Keyed record store the engine persists entities through.
///
/// Records are opaque bytes produced by [`codec`]. Handlers encode every
/// record before moving any tokens and write them last, so writes cannot
/// fail. A backend that commits to durable storage does so outside an
/// operation (at block end, for instance), never from `set_*`.
pub trait Store {
    fn lbp_record(&self, id: u64) -> Option<Vec<u8>>;

    /// Writing a pool whose id is `>=` the current sequence advances it.
    fn set_lbp_record(&mut self, id: u64, record: Vec<u8>);

    /// Id the next created pool will receive. Does not consume it.
    fn next_lbp_id(&self) -> u64;

    fn position_record(&self, lbp_id: u64, owner: &str) -> Option<Vec<u8>>;

    fn set_position_record(&mut self, lbp_id: u64, owner: &str, record: Vec<u8>);
}

/// In-memory [`Store`].
#[derive(Debug, Clone)]
pub struct MemStore {
    lbps: BTreeMap<u64, Vec<u8>>,
    positions: BTreeMap<(u64, String), Vec<u8>>,
    next_id: u64,
}

impl Default for MemStore {
    fn default() -> Self {
        Self {
            lbps: BTreeMap::new(),
            positions: BTreeMap::new(),
            next_id: FIRST_LBP_ID,
        }
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every position recorded for `lbp_id`, ordered by owner.
    pub fn positions(&self, lbp_id: u64) -> Result<Vec<UserPosition>> {
        self.positions
            .range((lbp_id, String::new())..)
            .take_while(|((id, _), _)| *id == lbp_id)
            .map(|(_, raw)| codec::decode_position(raw))
            .collect()
    }
}

impl Store for MemStore {
    fn lbp_record(&self, id: u64) -> Option<Vec<u8>> {
        self.lbps.get(&id).cloned()
    }

    fn set_lbp_record(&mut self, id: u64, record: Vec<u8>) {
        self.lbps.insert(id, record);
        self.next_id = self.next_id.max(id.saturating_add(1));
    }

    fn next_lbp_id(&self) -> u64 {
        self.next_id
    }

    fn position_record(&self, lbp_id: u64, owner: &str) -> Option<Vec<u8>> {
        self.positions.get(&(lbp_id, owner.to_string())).cloned()
    }

    fn set_position_record(&mut self, lbp_id: u64, owner: &str, record: Vec<u8>) {
        self.positions.insert((lbp_id, owner.to_string()), record);
    }
}
