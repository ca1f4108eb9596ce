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

//! The mempool collaborator contract and a minimal in-memory implementation,
//! sufficient for the DAG Manager's ingress pipeline and
//! [`crate::chain::Chain::verify`]'s eviction calls to exercise a real mempool
//! rather than a no-op stub. Wallet and miner RPC surfaces stay external.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::hash::{Hash256, UtxoKey};
use crate::ledger::{Ledger, PersistedUtxoLookup};
use crate::transaction::{Transaction, TxClass};

/// Concurrent set of candidate transactions, keyed by tx hash, with a
/// sortition-query method miners use to pick a transaction whose hash XORs
/// close to the block hash under construction.
pub trait Mempool: Send + Sync {
    /// Rejects duplicates, registrations, and transactions whose inputs are
    /// unspendable on the best chain. Returns `true` if accepted.
    fn receive_tx(&self, tx: Transaction) -> bool;

    /// Called from [`crate::chain::Chain::verify`] once a transaction's
    /// validity is known; if `valid`, also evicts every other pending
    /// transaction that double-spends one of its inputs.
    fn release_tx_from_confirmed(&self, tx_hash: &Hash256, valid: bool);

    /// Miner-side sortition: transactions whose hash XORed with `block_hash`
    /// falls under `threshold`, most attractive first.
    fn extract_transactions(&self, block_hash: &Hash256, threshold: usize) -> Vec<Transaction>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Entry {
    tx: Transaction,
    spent_keys: Vec<UtxoKey>,
}

#[derive(Default)]
struct Inner {
    by_hash: HashMap<Hash256, Entry>,
    spender_of: HashMap<UtxoKey, Hash256>,
}

/// In-memory [`Mempool`], checking spendability against a snapshot ledger
/// plus a persisted-lookup fallback, matching how [`crate::chain::Chain`]
/// checks `find_spendable` during verification.
pub struct InMemoryMempool {
    inner: RwLock<Inner>,
}

impl InMemoryMempool {
    pub fn new() -> InMemoryMempool {
        InMemoryMempool {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Checks spendability against `ledger`/`persisted` and, if the whole
    /// transaction is spendable, indexes it by each input's outpoint key so a
    /// later double-spend can be found and evicted.
    pub fn receive_tx_against<P: PersistedUtxoLookup>(&self, tx: Transaction, ledger: &Ledger, persisted: &P) -> bool {
        if matches!(tx.classify(), TxClass::FirstRegistration | TxClass::Registration) {
            return false;
        }
        let hash = tx.hash();
        let mut inner = self.inner.write();
        if inner.by_hash.contains_key(&hash) {
            return false;
        }

        let mut keys = Vec::with_capacity(tx.inputs.len());
        for input in &tx.inputs {
            let key = UtxoKey::new(&input.outpoint.block_hash, input.outpoint.tx_index, input.outpoint.out_index);
            if ledger.find_spendable(&key, persisted).is_none() {
                return false;
            }
            if inner.spender_of.contains_key(&key) {
                return false;
            }
            keys.push(key);
        }

        for key in &keys {
            inner.spender_of.insert(*key, hash);
        }
        inner.by_hash.insert(hash, Entry { tx, spent_keys: keys });
        true
    }
}

impl Default for InMemoryMempool {
    fn default() -> Self {
        Self::new()
    }
}

impl Mempool for InMemoryMempool {
    fn receive_tx(&self, tx: Transaction) -> bool {
        self.receive_tx_against(tx, &Ledger::new(), &())
    }

    fn release_tx_from_confirmed(&self, tx_hash: &Hash256, valid: bool) {
        let mut inner = self.inner.write();
        let Some(entry) = inner.by_hash.remove(tx_hash) else {
            return;
        };
        for key in &entry.spent_keys {
            inner.spender_of.remove(key);
        }
        if !valid {
            return;
        }
        let conflicting: Vec<Hash256> = entry
            .spent_keys
            .iter()
            .filter_map(|key| inner.spender_of.get(key).copied())
            .collect();
        for conflict_hash in conflicting {
            if let Some(conflict) = inner.by_hash.remove(&conflict_hash) {
                for key in &conflict.spent_keys {
                    inner.spender_of.remove(key);
                }
            }
        }
    }

    fn extract_transactions(&self, block_hash: &Hash256, threshold: usize) -> Vec<Transaction> {
        let inner = self.inner.read();
        let mut scored: Vec<(usize, Transaction)> = inner
            .by_hash
            .values()
            .map(|entry| {
                let distance = sortition_distance(&entry.tx.hash(), block_hash);
                (distance, entry.tx.clone())
            })
            .filter(|(distance, _)| *distance >= threshold)
            .collect();
        scored.sort_by_key(|(distance, _)| std::cmp::Reverse(*distance));
        scored.into_iter().map(|(_, tx)| tx).collect()
    }

    fn len(&self) -> usize {
        self.inner.read().by_hash.len()
    }
}

/// Number of leading zero bits in `H(tx) XOR H(block)`; a higher count means
/// the two hashes agree on more of their high bits, i.e. a closer sortition
/// match. `extract_transactions` keeps transactions at or above `threshold`.
fn sortition_distance(tx_hash: &Hash256, block_hash: &Hash256) -> usize {
    let xored = tx_hash.xor(block_hash);
    let mut zeros = 0usize;
    for byte in xored.as_bytes() {
        if *byte == 0 {
            zeros += 8;
            continue;
        }
        zeros += byte.leading_zeros() as usize;
        break;
    }
    zeros
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Listing, Outpoint, PublicKey, TxInput, TxOutput};

    fn spendable_tx() -> Transaction {
        Transaction {
            inputs: vec![TxInput {
                outpoint: Outpoint {
                    block_hash: Hash256::from_bytes(b"parent"),
                    tx_index: 0,
                    out_index: 0,
                },
                listing: Listing(vec![1]),
                pubkey: PublicKey(vec![2]),
            }],
            outputs: vec![TxOutput {
                amount: 10,
                locking_listing: Listing(vec![3]),
            }],
        }
    }

    struct AlwaysSpendable;
    impl PersistedUtxoLookup for AlwaysSpendable {
        fn lookup(&self, key: &UtxoKey) -> Option<crate::ledger::Utxo> {
            Some(crate::ledger::Utxo {
                output: TxOutput {
                    amount: 10,
                    locking_listing: Listing(vec![3]),
                },
                tx_index: 0,
                out_index: 0,
            })
            .filter(|_| !key.0.is_zero() || true)
        }
    }

    #[test]
    fn rejects_registration_shaped_transactions() {
        let pool = InMemoryMempool::new();
        let tx = Transaction {
            inputs: vec![TxInput {
                outpoint: Outpoint::null(),
                listing: Listing(vec![1]),
                pubkey: PublicKey(vec![2]),
            }],
            outputs: vec![TxOutput {
                amount: 0,
                locking_listing: Listing(vec![3]),
            }],
        };
        assert!(!pool.receive_tx_against(tx, &Ledger::new(), &AlwaysSpendable));
    }

    #[test]
    fn second_spender_of_same_input_is_rejected() {
        let pool = InMemoryMempool::new();
        let tx_a = spendable_tx();
        let tx_b = spendable_tx();
        assert!(pool.receive_tx_against(tx_a, &Ledger::new(), &AlwaysSpendable));
        assert!(!pool.receive_tx_against(tx_b, &Ledger::new(), &AlwaysSpendable));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn releasing_as_valid_evicts_double_spend_conflicts() {
        let pool = InMemoryMempool::new();
        let tx_a = spendable_tx();
        let hash_a = tx_a.hash();
        pool.receive_tx_against(tx_a, &Ledger::new(), &AlwaysSpendable);
        pool.release_tx_from_confirmed(&hash_a, true);
        assert!(pool.is_empty());
    }
}
