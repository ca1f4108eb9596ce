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

//! Message pairs for the locator/inv/getdata/bundle sync protocol. Wire
//! framing is out of scope; these are the plain structs a transport layer
//! serializes.

use crate::block::Block;
use crate::hash::Hash256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetInv {
    /// Sparse list of milestone hashes, typically walking backwards from the
    /// requester's head by doubling steps.
    pub locator: Vec<Hash256>,
    pub nonce: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inv {
    pub hashes: Vec<Hash256>,
    pub nonce: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GetDataKind {
    /// One bundle containing the current pending blocks of the best chain.
    PendingSet,
    /// One bundle per requested hash: every block anchored at that
    /// milestone.
    LevelSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetData {
    pub kind: GetDataKind,
    pub hashes: Vec<Hash256>,
    pub nonces: Vec<u64>,
}

/// A bundle's blocks are milestone-last on the wire (matching on-disk level
/// set order) and swapped back to milestone-first once received; see
/// [`Bundle::into_milestone_first`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub blocks: Vec<Block>,
    pub nonce: u64,
}

impl Bundle {
    pub fn from_level_set(milestone_first: Vec<Block>, nonce: u64) -> Bundle {
        let mut blocks = milestone_first;
        if !blocks.is_empty() {
            blocks.rotate_left(1);
        }
        Bundle { blocks, nonce }
    }

    pub fn into_milestone_first(mut self) -> Vec<Block> {
        if !self.blocks.is_empty() {
            self.blocks.rotate_right(1);
        }
        self.blocks
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NotFound {
    pub hash: Hash256,
    pub nonce: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;

    #[test]
    fn bundle_roundtrips_milestone_position() {
        let milestone = Block::genesis(1);
        let other = Block::genesis(2);
        let bundle = Bundle::from_level_set(vec![milestone.clone(), other.clone()], 42);
        assert_eq!(bundle.blocks[0].header.time, other.header.time);
        assert_eq!(bundle.blocks[1].header.time, milestone.header.time);
        let restored = bundle.into_milestone_first();
        assert_eq!(restored[0].header.time, milestone.header.time);
    }
}
