//! Record encoding for [`Store`](crate::store::Store) backends.
//!
//! A record is an 8-byte discriminator, `sha256("account:<Type>")[..8]`,
//! followed by the borsh encoding of the entity. The accumulator fields are
//! plain `u128`, so a round trip is exact.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::{
    constants::{LBP_RECORD, POSITION_RECORD},
    error::{LbpError, Result},
    state::{Lbp, UserPosition},
};

pub const DISC_LEN: usize = 8;

pub fn encode_lbp(lbp: &Lbp) -> Result<Vec<u8>> {
    encode(LBP_RECORD, lbp)
}

pub fn decode_lbp(data: &[u8]) -> Result<Lbp> {
    decode(LBP_RECORD, data)
}

pub fn encode_position(position: &UserPosition) -> Result<Vec<u8>> {
    encode(POSITION_RECORD, position)
}

pub fn decode_position(data: &[u8]) -> Result<UserPosition> {
    decode(POSITION_RECORD, data)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn disc(preimage: &str) -> [u8; DISC_LEN] {
    let h = Sha256::digest(preimage.as_bytes());
    let mut d = [0u8; DISC_LEN];
    d.copy_from_slice(&h[..DISC_LEN]);
    d
}

fn encode<T: BorshSerialize>(preimage: &str, value: &T) -> Result<Vec<u8>> {
    let mut out = disc(preimage).to_vec();
    value.serialize(&mut out).map_err(|e| LbpError::Codec {
        offset: DISC_LEN,
        reason: e.to_string(),
    })?;
    Ok(out)
}

fn decode<T: BorshDeserialize>(preimage: &str, data: &[u8]) -> Result<T> {
    if data.len() < DISC_LEN {
        return Err(LbpError::Codec {
            offset: 0,
            reason: format!("record too short for discriminator ({} bytes)", data.len()),
        });
    }
    let (found, body) = data.split_at(DISC_LEN);
    if found != disc(preimage) {
        return Err(LbpError::Codec {
            offset: 0,
            reason: format!("discriminator does not match {preimage}"),
        });
    }
    // try_from_slice rejects trailing bytes
    T::try_from_slice(body).map_err(|e| LbpError::Codec {
        offset: DISC_LEN,
        reason: e.to_string(),
    })
}
