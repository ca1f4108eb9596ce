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

//! TXOC and RegChange: the two incremental deltas a milestone's level set produces.

use crate::hash::{Hash256, UtxoKey};
use std::collections::HashSet;

/// A UTXO-set increment: `{created, spent}`.
#[derive(Debug, Clone, Default)]
pub struct Txoc {
    pub created: HashSet<UtxoKey>,
    pub spent: HashSet<UtxoKey>,
}

impl Txoc {
    pub fn new() -> Txoc {
        Txoc::default()
    }

    pub fn add_created(&mut self, key: UtxoKey) {
        self.created.insert(key);
    }

    pub fn add_spent(&mut self, key: UtxoKey) {
        self.spent.insert(key);
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.spent.is_empty()
    }

    pub fn merge(&mut self, other: Txoc) {
        self.created.extend(other.created);
        self.spent.extend(other.spent);
    }

    /// The inverse delta, used to roll a chain's ledger back on reorg.
    pub fn inverted(&self) -> Txoc {
        Txoc {
            created: self.spent.clone(),
            spent: self.created.clone(),
        }
    }
}

/// Increment of `(peer-chain-head-hash -> last-registration-hash)`.
#[derive(Debug, Clone, Default)]
pub struct RegChange {
    pub created: Vec<(Hash256, Hash256)>,
    pub removed: Vec<(Hash256, Hash256)>,
}

impl RegChange {
    pub fn new() -> RegChange {
        RegChange::default()
    }

    pub fn create(&mut self, head: Hash256, last_registration: Hash256) {
        self.created.push((head, last_registration));
    }

    pub fn remove(&mut self, head: Hash256, last_registration: Hash256) {
        self.removed.push((head, last_registration));
    }

    pub fn merge(&mut self, other: RegChange) {
        self.created.extend(other.created);
        self.removed.extend(other.removed);
    }

    pub fn inverted(&self) -> RegChange {
        RegChange {
            created: self.removed.clone(),
            removed: self.created.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hash256;

    #[test]
    fn txoc_inversion_swaps_created_and_spent() {
        let mut txoc = Txoc::new();
        let key = UtxoKey::new(&Hash256::from_bytes(b"blk"), 0, 0);
        txoc.add_created(key);
        let inv = txoc.inverted();
        assert!(inv.spent.contains(&key));
        assert!(inv.created.is_empty());
    }
}
