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

//! Per-chain UTXO ledger.

use crate::hash::UtxoKey;
use crate::transaction::TxOutput;
use crate::txoc::Txoc;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Utxo {
    pub output: TxOutput,
    pub tx_index: u32,
    pub out_index: u32,
}

/// Looks up a UTXO key in the persisted store; implemented by
/// [`crate::store::BlockStore`] and by test doubles.
pub trait PersistedUtxoLookup {
    fn lookup(&self, key: &UtxoKey) -> Option<Utxo>;
}

impl PersistedUtxoLookup for () {
    fn lookup(&self, _key: &UtxoKey) -> Option<Utxo> {
        None
    }
}

/// Three maps — pending / confirmed / removed — pairwise disjoint by construction.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pending: HashMap<UtxoKey, Utxo>,
    confirmed: HashMap<UtxoKey, Utxo>,
    removed: HashMap<UtxoKey, Utxo>,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger::default()
    }

    pub fn add_to_pending(&mut self, key: UtxoKey, utxo: Utxo) {
        self.pending.insert(key, utxo);
    }

    pub fn get_from_pending(&self, key: &UtxoKey) -> Option<&Utxo> {
        self.pending.get(key)
    }

    pub fn is_pending(&self, key: &UtxoKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn is_confirmed(&self, key: &UtxoKey) -> bool {
        self.confirmed.contains_key(key)
    }

    pub fn is_removed(&self, key: &UtxoKey) -> bool {
        self.removed.contains_key(key)
    }

    /// `Some` iff `key ∈ confirmed`; `None` if `key ∈ removed`; otherwise
    /// delegates to the persisted table.
    pub fn find_spendable<P: PersistedUtxoLookup>(&self, key: &UtxoKey, persisted: &P) -> Option<Utxo> {
        if let Some(u) = self.confirmed.get(key) {
            return Some(u.clone());
        }
        if self.removed.contains_key(key) {
            return None;
        }
        persisted.lookup(key)
    }

    /// Moves created keys `pending -> confirmed` and spent keys `confirmed ->
    /// removed`.
    pub fn update(&mut self, txoc: &Txoc) {
        for key in &txoc.created {
            if let Some(u) = self.pending.remove(key) {
                self.confirmed.insert(*key, u);
            }
        }
        for key in &txoc.spent {
            if let Some(u) = self.confirmed.remove(key) {
                self.removed.insert(*key, u);
            }
        }
    }

    /// Drops outputs that were accepted syntactically but failed milestone-time
    /// validation: `pending -> removed`.
    pub fn invalidate(&mut self, txoc: &Txoc) {
        for key in &txoc.spent {
            if let Some(u) = self.pending.remove(key) {
                self.removed.insert(*key, u);
            }
        }
    }

    /// Inverse of [`Ledger::update`], used on reorg.
    pub fn rollback(&mut self, txoc: &Txoc) {
        for key in &txoc.created {
            if let Some(u) = self.confirmed.remove(key) {
                self.pending.insert(*key, u);
            }
        }
        for key in &txoc.spent {
            if let Some(u) = self.removed.remove(key) {
                self.confirmed.insert(*key, u);
            }
        }
    }

    /// Drops entries entirely once the level set containing `txoc` is flushed to
    /// the persistent store.
    pub fn remove(&mut self, txoc: &Txoc) {
        for key in &txoc.created {
            self.confirmed.remove(key);
        }
        for key in &txoc.spent {
            self.removed.remove(key);
        }
    }

    pub fn confirmed_len(&self) -> usize {
        self.confirmed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hash256;
    use crate::transaction::Listing;

    fn utxo() -> Utxo {
        Utxo {
            output: TxOutput {
                amount: 10,
                locking_listing: Listing(vec![1]),
            },
            tx_index: 0,
            out_index: 0,
        }
    }

    #[test]
    fn update_moves_pending_to_confirmed_and_confirmed_to_removed() {
        let mut ledger = Ledger::new();
        let created_key = UtxoKey::new(&Hash256::from_bytes(b"a"), 0, 0);
        let spent_key = UtxoKey::new(&Hash256::from_bytes(b"b"), 0, 0);
        ledger.add_to_pending(created_key, utxo());
        ledger.add_to_pending(spent_key, utxo());

        let mut first = Txoc::new();
        first.add_created(spent_key);
        ledger.update(&first);
        assert!(ledger.is_confirmed(&spent_key));

        let mut second = Txoc::new();
        second.add_created(created_key);
        second.add_spent(spent_key);
        ledger.update(&second);

        assert!(ledger.is_confirmed(&created_key));
        assert!(ledger.is_removed(&spent_key));
        assert!(!ledger.is_confirmed(&spent_key));
    }

    #[test]
    fn find_spendable_respects_removed_over_persisted() {
        let mut ledger = Ledger::new();
        let key = UtxoKey::new(&Hash256::from_bytes(b"c"), 0, 0);
        ledger.add_to_pending(key, utxo());
        let mut txoc = Txoc::new();
        txoc.add_created(key);
        ledger.update(&txoc);
        let mut spend = Txoc::new();
        spend.add_spent(key);
        ledger.update(&spend);
        assert_eq!(ledger.find_spendable(&key, &()), None);
    }
}
