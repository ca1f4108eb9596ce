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

//! Vertex: a block plus post-validation metadata.
//!
//! Cross-references to a [`crate::milestone::Milestone`] are arena indices rather
//! than shared pointers.

use crate::block::Block;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Validity {
    Unknown = 0,
    Valid = 1,
    Invalid = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum RedemptionStatus {
    NotRedemption = 0,
    NotYetRedeemed = 1,
    Redeemed = 2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub block: Block,
    /// Height on the milestone chain; `None` until this block's level set is
    /// anchored by a milestone.
    pub height: Option<u64>,
    pub cumulative_reward: u64,
    pub fee: u64,
    pub miner_chain_height: u64,
    pub validity: Vec<Validity>,
    pub redemption_status: RedemptionStatus,
    /// Index into the owning [`crate::chain::Chain`]'s milestone arena, set only
    /// when this vertex is itself a milestone.
    pub milestone_index: Option<usize>,
}

impl Vertex {
    pub fn new(block: Block) -> Vertex {
        Vertex {
            block,
            height: None,
            cumulative_reward: 0,
            fee: 0,
            miner_chain_height: 0,
            validity: Vec::new(),
            redemption_status: RedemptionStatus::NotRedemption,
            milestone_index: None,
        }
    }

    pub fn is_milestone(&self) -> bool {
        self.milestone_index.is_some()
    }

    pub fn num_valid_txns(&self) -> usize {
        self.validity.iter().filter(|v| **v == Validity::Valid).count()
    }
}

/// Compact serialized layout: `redeem_status | height | cumulative_reward |
/// miner_chain_height | validity | ms_flag`. Used by [`crate::store`] when reading
/// and writing the `vtx` file family; kept separate from `serde`/`borsh` derives so
/// the on-disk format stays stable regardless of how the in-memory struct evolves.
pub mod codec {
    use super::*;

    pub fn encode_vertex_meta(v: &Vertex) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(v.redemption_status as u8);
        write_varint(&mut buf, v.height.unwrap_or(0));
        write_varint(&mut buf, v.cumulative_reward);
        write_varint(&mut buf, v.miner_chain_height);
        write_varint(&mut buf, v.validity.len() as u64);
        for val in &v.validity {
            buf.push(*val as u8);
        }
        buf.push(if v.is_milestone() { 1 } else { 0 });
        buf
    }

    pub fn decode_redemption_byte(byte: u8) -> RedemptionStatus {
        match byte {
            1 => RedemptionStatus::NotYetRedeemed,
            2 => RedemptionStatus::Redeemed,
            _ => RedemptionStatus::NotRedemption,
        }
    }

    /// Metadata half of a [`Vertex`], as stored in the `vtx` file family; the
    /// block itself lives in `blk` and is stitched back on by the caller.
    pub struct VertexMeta {
        pub redemption_status: RedemptionStatus,
        pub height: u64,
        pub cumulative_reward: u64,
        pub miner_chain_height: u64,
        pub validity: Vec<Validity>,
        pub is_milestone: bool,
    }

    /// Inverse of [`encode_vertex_meta`]. Returns the decoded fields and the
    /// number of bytes consumed, so a caller reading from a buffer with
    /// trailing data (e.g. the rest of an append-only file) can ignore it.
    pub fn decode_vertex_meta(bytes: &[u8]) -> Option<(VertexMeta, usize)> {
        let mut offset = 0usize;
        let redemption_status = decode_redemption_byte(*bytes.get(offset)?);
        offset += 1;
        let height = read_varint(bytes, &mut offset)?;
        let cumulative_reward = read_varint(bytes, &mut offset)?;
        let miner_chain_height = read_varint(bytes, &mut offset)?;
        let validity_len = read_varint(bytes, &mut offset)? as usize;
        let mut validity = Vec::with_capacity(validity_len);
        for _ in 0..validity_len {
            let byte = *bytes.get(offset)?;
            offset += 1;
            validity.push(match byte {
                1 => Validity::Valid,
                2 => Validity::Invalid,
                _ => Validity::Unknown,
            });
        }
        let is_milestone = *bytes.get(offset)? == 1;
        offset += 1;
        Some((
            VertexMeta {
                redemption_status,
                height,
                cumulative_reward,
                miner_chain_height,
                validity,
                is_milestone,
            },
            offset,
        ))
    }

    fn read_varint(bytes: &[u8], offset: &mut usize) -> Option<u64> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = *bytes.get(*offset)?;
            *offset += 1;
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Some(result)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;

    #[test]
    fn fresh_vertex_is_not_milestone() {
        let v = Vertex::new(Block::genesis(0));
        assert!(!v.is_milestone());
        assert_eq!(v.num_valid_txns(), 0);
    }

    #[test]
    fn vertex_meta_roundtrips_through_encode_decode() {
        let mut v = Vertex::new(Block::genesis(0));
        v.height = Some(7);
        v.cumulative_reward = 1_000_000;
        v.miner_chain_height = 3;
        v.validity = vec![Validity::Valid, Validity::Unknown];
        v.redemption_status = RedemptionStatus::NotYetRedeemed;

        let bytes = codec::encode_vertex_meta(&v);
        let (meta, consumed) = codec::decode_vertex_meta(&bytes).expect("valid metadata should decode");
        assert_eq!(consumed, bytes.len());
        assert_eq!(meta.height, 7);
        assert_eq!(meta.cumulative_reward, 1_000_000);
        assert_eq!(meta.miner_chain_height, 3);
        assert_eq!(meta.validity.len(), 2);
        assert!(!meta.is_milestone);
    }
}
