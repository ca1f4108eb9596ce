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

//! One candidate milestone chain: its pending DAG, its ledger view, and the
//! level-set verifier that turns a milestone block into a [`Vertex`].
//!
//! State is held in plain collections rather than behind `Rc`/`Arc` cycles —
//! the arena-style cross-referencing used throughout this crate (see
//! [`crate::vertex::Vertex::milestone_index`]).

use std::collections::{HashMap, HashSet, VecDeque};

use primitive_types::U256;

use crate::block::Block;
use crate::cumulator::Cumulator;
use crate::difficulty;
use crate::error::{ChainError, ValidationError};
use crate::hash::Hash256;
use crate::ledger::{Ledger, PersistedUtxoLookup, Utxo};
use crate::milestone::Milestone;
use crate::params::NetworkParams;
use crate::transaction::{Transaction, TxClass};
use crate::txoc::{RegChange, Txoc};
use crate::vertex::{RedemptionStatus, Validity, Vertex};

/// Owned snapshot of one milestone's level set, ready to hand to
/// [`crate::store::BlockStore::store_level_set`] without holding a borrow on
/// the chain it came from.
pub struct LevelSetSnapshot {
    pub milestone_hash: Hash256,
    pub height: u64,
    pub blocks: Vec<Block>,
    pub vertices: Vec<Vertex>,
    pub utxo_created: Vec<(crate::hash::UtxoKey, Utxo)>,
    pub utxo_spent: Vec<crate::hash::UtxoKey>,
    pub reg_changes: Vec<(Hash256, Hash256)>,
}

/// One candidate milestone chain.
pub struct Chain {
    pub is_main: bool,
    params: NetworkParams,
    /// Recent in-memory milestones, oldest first; the front is flushed once
    /// finalized.
    states: VecDeque<Milestone>,
    /// Blocks added to this chain's DAG but not yet anchored by a milestone.
    pending_blocks: HashMap<Hash256, Block>,
    /// Vertices in the in-memory window, excluding the scratch set under
    /// active verification.
    recent_history: HashMap<Hash256, Vertex>,
    /// Scratch vertices populated during a single `verify` pass; merged into
    /// `recent_history` on success, discarded on failure.
    verifying: HashMap<Hash256, Vertex>,
    ledger: Ledger,
    /// Per peer-chain sliding window of recent chainwork/timestamps, keyed by
    /// that chain's current tip hash.
    cumulator_map: HashMap<Hash256, Cumulator>,
    /// peer-chain-head hash -> hash of its not-yet-redeemed registration.
    prev_redem_hash_map: HashMap<Hash256, Hash256>,
}

impl Chain {
    pub fn new(params: NetworkParams, genesis: Milestone) -> Chain {
        let mut states = VecDeque::new();
        states.push_back(genesis);
        Chain {
            is_main: true,
            params,
            states,
            pending_blocks: HashMap::new(),
            recent_history: HashMap::new(),
            verifying: HashMap::new(),
            ledger: Ledger::new(),
            cumulator_map: HashMap::new(),
            prev_redem_hash_map: HashMap::new(),
        }
    }

    pub fn head(&self) -> &Milestone {
        self.states.back().expect("a chain always has at least genesis")
    }

    pub fn chainwork(&self) -> U256 {
        self.head().chainwork
    }

    pub fn height(&self) -> u64 {
        self.head().height
    }

    pub fn states_len(&self) -> usize {
        self.states.len()
    }

    /// Number of outputs currently confirmed in this chain's ledger view.
    pub fn confirmed_utxo_count(&self) -> usize {
        self.ledger.confirmed_len()
    }

    pub fn add_pending(&mut self, block: Block) {
        self.pending_blocks.entry(block.hash()).or_insert(block);
    }

    pub fn has_pending(&self, hash: &Hash256) -> bool {
        self.pending_blocks.contains_key(hash)
    }

    pub fn vertex(&self, hash: &Hash256) -> Option<&Vertex> {
        self.recent_history.get(hash)
    }

    /// Hash of the oldest in-memory milestone, the one a flush would write
    /// out next; `None` once only the anchor and the live head remain.
    ///
    /// `states.front()` is the anchor — the last milestone already durably
    /// flushed (or genesis, before anything has been) — not itself a
    /// candidate: its level set is already on disk. `states.back()` is the
    /// live head and never flushed while still growing. The oldest
    /// flushable level set is therefore the second entry, `states[1]`,
    /// which only exists as a distinct, non-head entry once `states.len() >
    /// 2`.
    pub fn oldest_state_hash(&self) -> Option<Hash256> {
        if self.states.len() > 2 {
            self.states.get(1).map(|m| m.hash)
        } else {
            None
        }
    }

    /// Whether `hash` names one of this chain's in-memory milestones.
    pub fn contains_state_hash(&self, hash: &Hash256) -> bool {
        self.states.iter().any(|m| &m.hash == hash)
    }

    /// The in-memory milestone named `hash`, if this chain's window still
    /// carries it.
    pub fn milestone_by_hash(&self, hash: &Hash256) -> Option<&Milestone> {
        self.states.iter().find(|m| &m.hash == hash)
    }

    /// Everything the storage pool needs to durably write the oldest
    /// in-memory level set, gathered without mutating the chain; call
    /// [`Chain::finalize_oldest`] afterwards to drop it from memory once the
    /// write has succeeded.
    pub fn oldest_level_set_snapshot(&self) -> Option<LevelSetSnapshot> {
        let oldest = if self.states.len() > 2 { self.states.get(1)? } else { return None };

        let mut vertices: Vec<Vertex> =
            self.recent_history.values().filter(|v| v.height == Some(oldest.height)).cloned().collect();
        vertices.sort_by_key(|v| v.block.hash());
        let blocks: Vec<Block> = vertices.iter().map(|v| v.block.clone()).collect();

        let utxo_created: Vec<(crate::hash::UtxoKey, Utxo)> = oldest
            .txoc
            .created
            .iter()
            .filter_map(|key| self.ledger.get_from_pending(key).map(|utxo| (*key, utxo.clone())))
            .collect();
        let utxo_spent: Vec<crate::hash::UtxoKey> = oldest.txoc.spent.iter().copied().collect();

        Some(LevelSetSnapshot {
            milestone_hash: oldest.hash,
            height: oldest.height,
            blocks,
            vertices,
            utxo_created,
            utxo_spent,
            reg_changes: oldest.reg_change.created.clone(),
        })
    }

    /// Drops the oldest in-memory level set after it has been durably
    /// flushed: removes its vertices from `recent_history`, its deltas from
    /// the ledger, and retires the stale anchor off the front of `states` —
    /// the just-flushed milestone (`states[1]`) slides into its place.
    pub fn finalize_oldest(&mut self) {
        if self.states.len() <= 2 {
            return;
        }
        let oldest = self.states.get(1).expect("states.len() > 2 guarantees index 1");
        let hashes: Vec<Hash256> =
            self.recent_history.iter().filter(|(_, v)| v.height == Some(oldest.height)).map(|(h, _)| *h).collect();
        let txoc = oldest.txoc.clone();
        self.pop_oldest(&hashes, &txoc);
    }

    /// Builds a fork chain rooted at `base`, rolled back to the point where
    /// `fork_block`'s milestone parent diverges from `base`'s states.
    ///
    /// Every milestone whose hash differs from `fork_block.header.milestone_hash`
    /// (the most recent ones) is undone: its level-set blocks go back to
    /// `pending_blocks`, its vertices are dropped from `recent_history`, its
    /// TXOC is rolled back in the ledger, and its RegChange is reversed.
    pub fn new_fork(base: &Chain, fork_block: &Block) -> Chain {
        let mut fork = Chain {
            is_main: false,
            params: base.params,
            states: base.states.clone(),
            pending_blocks: base.pending_blocks.clone(),
            recent_history: base.recent_history.clone(),
            verifying: HashMap::new(),
            ledger: base.ledger.clone(),
            cumulator_map: base.cumulator_map.clone(),
            prev_redem_hash_map: base.prev_redem_hash_map.clone(),
        };

        while fork.states.len() > 1 {
            let top = fork.states.back().expect("checked len > 1");
            if top.hash == fork_block.header.milestone_hash {
                break;
            }
            let undone = fork.states.pop_back().expect("checked len > 1");
            fork.rollback_milestone(&undone);
        }

        fork
    }

    fn rollback_milestone(&mut self, milestone: &Milestone) {
        self.ledger.rollback(&milestone.txoc);
        for (head, last_reg) in &milestone.reg_change.created {
            self.prev_redem_hash_map.remove(head);
            let _ = last_reg;
        }
        for (head, last_reg) in &milestone.reg_change.removed {
            self.prev_redem_hash_map.insert(*head, *last_reg);
        }

        let hashes: Vec<Hash256> = self
            .recent_history
            .iter()
            .filter(|(_, v)| v.height == Some(milestone.height))
            .map(|(h, _)| *h)
            .collect();
        for hash in hashes {
            if let Some(vertex) = self.recent_history.remove(&hash) {
                self.pending_blocks.insert(hash, vertex.block);
            }
        }
    }

    /// Iterative post-order DFS over `pending_blocks` starting at `root`: a
    /// block's three parents are visited (if still pending) before the block
    /// itself is emitted, giving a parents-first order suitable for
    /// sequential level-set validation.
    pub fn sort_subgraph(&mut self, root: Hash256) -> Result<Vec<Block>, ChainError> {
        let mut order = Vec::new();
        let mut visited: HashSet<Hash256> = HashSet::new();
        let mut stack = vec![(root, false)];

        if !self.pending_blocks.contains_key(&root) {
            return Err(ChainError::UnsortableSubgraph(root));
        }

        while let Some((hash, expanded)) = stack.pop() {
            if visited.contains(&hash) {
                continue;
            }
            if expanded {
                if let Some(block) = self.pending_blocks.remove(&hash) {
                    order.push(block);
                }
                visited.insert(hash);
                continue;
            }

            let block = match self.pending_blocks.get(&hash) {
                Some(b) => b.clone(),
                None => {
                    visited.insert(hash);
                    continue;
                }
            };

            stack.push((hash, true));
            if !block.is_genesis() {
                for parent in [block.header.milestone_hash, block.header.tip_hash, block.header.previous_hash] {
                    if !visited.contains(&parent) && self.pending_blocks.contains_key(&parent) {
                        stack.push((parent, false));
                    }
                }
            }
        }

        Ok(order)
    }

    fn miner_chain_height(&self, hash: &Hash256) -> u64 {
        self.verifying
            .get(hash)
            .or_else(|| self.recent_history.get(hash))
            .map(|v| v.miner_chain_height)
            .unwrap_or(0)
    }

    /// Validates a level set rooted at `milestone_block` and returns the
    /// vertex the milestone block itself forms.
    ///
    /// `persisted` backs ledger lookups that miss the in-memory window (the
    /// Block Store's UTXO column in production; `()` in tests with no
    /// flushed history yet).
    pub fn verify<P: PersistedUtxoLookup>(&mut self, milestone_block: Block, persisted: &P) -> Result<Vertex, ChainError> {
        let ms_hash = milestone_block.hash();
        let ordered = self.sort_subgraph(ms_hash)?;
        let predecessor = self.states.back().cloned().expect("chain always has a milestone");

        self.verifying.clear();
        let mut txoc = Txoc::new();
        let mut reg_change = RegChange::new();
        let mut txns_in_level_set = 0u64;
        let mut cumulative_reward = predecessor.cumulative_reward;
        let level_set_size = ordered.len();

        for block in &ordered {
            let hash = block.hash();
            let previous_hash = block.header.previous_hash;
            let mut vertex = Vertex::new(block.clone());
            vertex.validity = vec![Validity::Unknown; block.transactions.len()];

            let class = block.transactions.first().map(Transaction::classify);
            let mut redemption_rekeyed = false;

            if class == Some(TxClass::FirstRegistration) {
                vertex.miner_chain_height = 1;
                vertex.redemption_status = RedemptionStatus::NotYetRedeemed;
                vertex.validity[0] = Validity::Valid;
                reg_change.create(hash, hash);
                self.prev_redem_hash_map.insert(hash, hash);
                redemption_rekeyed = true;
            } else {
                vertex.miner_chain_height = self.miner_chain_height(&previous_hash) + 1;
            }

            let mut fee = 0u64;
            if !block.transactions.is_empty() {
                txns_in_level_set += block.transactions.len() as u64;
                let class = class.expect("non-empty transaction list implies a classification");

                if class == TxClass::Registration {
                    // Look up and validate against `prev_redem_hash_map[previous_hash]`
                    // before it is rekeyed below, since the redemption being
                    // validated here is exactly the entry that key names.
                    let reg_tx = &block.transactions[0];
                    match self.validate_redemption(reg_tx, &previous_hash, predecessor.cumulative_reward) {
                        Ok(()) => {
                            vertex.validity[0] = Validity::Valid;
                            vertex.redemption_status = RedemptionStatus::NotYetRedeemed;
                            if let Some(old_redem) = self.prev_redem_hash_map.remove(&previous_hash) {
                                reg_change.remove(previous_hash, old_redem);
                            }
                            reg_change.create(hash, hash);
                            self.prev_redem_hash_map.insert(hash, hash);
                            redemption_rekeyed = true;
                        }
                        Err(_) => vertex.validity[0] = Validity::Invalid,
                    }
                }

                // Per-transaction partition/sortition check: every transaction's
                // own distance from the previous block must stay within the
                // allowed bound. Slots already decided (the registration, above)
                // are left alone.
                let allowed_distance = self.allowed_sortition_distance(&previous_hash, &predecessor);
                for (i, tx) in block.transactions.iter().enumerate() {
                    if vertex.validity[i] != Validity::Unknown {
                        continue;
                    }
                    let dist = tx.hash().xor(&previous_hash);
                    if U256::from_big_endian(dist.as_bytes()) > allowed_distance {
                        vertex.validity[i] = Validity::Invalid;
                    }
                }

                // UTXO validation, per transaction, for everything still
                // undecided: sum spendable inputs, check outputs don't exceed
                // them, and cap the fee.
                for (i, tx) in block.transactions.iter().enumerate() {
                    if vertex.validity[i] != Validity::Unknown {
                        continue;
                    }

                    let mut spent_total = 0u64;
                    let mut all_inputs_valid = true;
                    let mut spent_keys = Vec::with_capacity(tx.inputs.len());
                    for input in &tx.inputs {
                        let key = crate::hash::UtxoKey::new(&input.outpoint.block_hash, input.outpoint.tx_index, input.outpoint.out_index);
                        match self.ledger.find_spendable(&key, persisted) {
                            Some(utxo) => {
                                spent_total += utxo.output.amount;
                                spent_keys.push(key);
                            }
                            None => all_inputs_valid = false,
                        }
                    }

                    if !all_inputs_valid {
                        vertex.validity[i] = Validity::Invalid;
                        continue;
                    }

                    let out_total = tx.total_output();
                    if out_total > spent_total {
                        vertex.validity[i] = Validity::Invalid;
                        continue;
                    }
                    let tx_fee = spent_total - out_total;
                    if tx_fee > self.params.max_money {
                        vertex.validity[i] = Validity::Invalid;
                        continue;
                    }

                    fee += tx_fee;
                    for key in spent_keys {
                        txoc.add_spent(key);
                    }
                    vertex.validity[i] = Validity::Valid;
                }

                // Any slot still Unknown here only happens for a non-registration
                // first transaction whose class never matched Registration above
                // (a malformed registration shape) — invalidate it.
                for v in vertex.validity.iter_mut() {
                    if *v == Validity::Unknown {
                        *v = Validity::Invalid;
                    }
                }

                for (i, tx) in block.transactions.iter().enumerate() {
                    if vertex.validity[i] != Validity::Valid {
                        continue;
                    }
                    for (out_index, output) in tx.outputs.iter().enumerate() {
                        let key = crate::hash::UtxoKey::new(&hash, i as u32, out_index as u32);
                        txoc.add_created(key);
                        self.ledger.add_to_pending(
                            key,
                            Utxo {
                                output: output.clone(),
                                tx_index: i as u32,
                                out_index: out_index as u32,
                            },
                        );
                    }
                }
            }

            // No redemption landed in this block: carry the still-pending
            // registration forward, rekeyed to this block's own hash so the
            // next block on this miner's chain can find it via its own
            // `previous_hash`.
            if !redemption_rekeyed {
                if let Some(old_redem) = self.prev_redem_hash_map.remove(&previous_hash) {
                    reg_change.remove(previous_hash, old_redem);
                    reg_change.create(hash, old_redem);
                    self.prev_redem_hash_map.insert(hash, old_redem);
                }
            }

            vertex.fee = fee;
            cumulative_reward += self.params.block_reward + fee;
            vertex.cumulative_reward = cumulative_reward;

            let chainwork = difficulty::chainwork_for_target(self.params.max_target, block.header.target_compact);
            let cumulator = self
                .cumulator_map
                .remove(&previous_hash)
                .unwrap_or_else(|| Cumulator::new(self.params.sortition_threshold));
            let mut updated = cumulator;
            let compact_work = difficulty::u256_to_compact(chainwork);
            updated.add(compact_work, block.header.time, true);
            self.cumulator_map.insert(hash, updated);

            self.verifying.insert(hash, vertex);
        }

        cumulative_reward += self.params.block_reward * ((level_set_size.saturating_sub(1)) as u64) / self.params.ms_reward_coefficient;

        let milestone = predecessor.next(
            &self.params,
            ms_hash,
            milestone_block.header.time,
            txns_in_level_set,
            level_set_size as u64,
            cumulative_reward.saturating_sub(predecessor.cumulative_reward),
            txoc.clone(),
            reg_change,
        );

        let milestone_height = milestone.height;
        let mut ms_vertex = self
            .verifying
            .remove(&ms_hash)
            .ok_or(ChainError::InvalidMilestoneParent(ms_hash))?;
        ms_vertex.cumulative_reward = cumulative_reward;
        ms_vertex.height = Some(milestone_height);
        self.states.push_back(milestone);
        let ms_index = self.states.len() - 1;
        ms_vertex.milestone_index = Some(ms_index);

        self.ledger.update(&txoc);

        // Every block in this level set, not just the milestone itself, is
        // anchored at `milestone_height` — a vertex's height is the
        // milestone's own monotonic height, not this chain's in-memory deque
        // position (which shifts as `pop_oldest` evicts flushed entries).
        for (hash, mut vertex) in self.verifying.drain() {
            vertex.height = Some(milestone_height);
            self.recent_history.insert(hash, vertex);
        }
        self.recent_history.insert(ms_hash, ms_vertex.clone());

        Ok(ms_vertex)
    }

    /// `allowed = cumulator.sum / (cumulator.time_span + 1) / sortition_coefficient
    /// * max_target / (ms_hashrate + 1)`, the partition/sortition bound a
    /// transaction's distance from the previous block must stay under.
    fn allowed_sortition_distance(&self, previous_hash: &Hash256, predecessor: &Milestone) -> U256 {
        let cumulator = self.cumulator_map.get(previous_hash);
        let (sum, time_span) = match cumulator {
            Some(c) => (c.sum(), c.time_span() as u128 + 1),
            None => (1u128, 1u128),
        };
        let base = U256::from(sum) / U256::from(time_span) / U256::from(self.params.sortition_coefficient.max(1));
        let max_target = difficulty::compact_to_u256(self.params.max_target);
        let hashrate = U256::from(predecessor.hashrate_q32 >> 32).max(U256::zero()) + U256::one();
        base.saturating_mul(max_target) / hashrate
    }

    /// Looks up the previous not-yet-redeemed registration on this peer chain
    /// and, if valid, flips it to `Redeemed` and marks `tx`'s block
    /// `NotYetRedeemed` in its place.
    fn validate_redemption(&mut self, tx: &Transaction, peer_chain_head: &Hash256, prior_cumulative_reward: u64) -> Result<(), ValidationError> {
        let prev_reg_hash = *self
            .prev_redem_hash_map
            .get(peer_chain_head)
            .ok_or(ValidationError::DoubleRedemption)?;

        let prev_vertex = self
            .verifying
            .get(&prev_reg_hash)
            .or_else(|| self.recent_history.get(&prev_reg_hash));
        let prev_vertex = match prev_vertex {
            Some(v) => v,
            None => return Err(ValidationError::DoubleRedemption),
        };
        if prev_vertex.redemption_status != RedemptionStatus::NotYetRedeemed {
            return Err(ValidationError::DoubleRedemption);
        }

        let output_value = tx.total_output();
        if output_value > prior_cumulative_reward {
            return Err(ValidationError::RedemptionOverflow);
        }

        let prev_output = prev_vertex
            .block
            .transactions
            .first()
            .and_then(|t| t.outputs.first())
            .ok_or(ValidationError::BadSignature)?;
        if !tx.inputs[0].listing.verify(&prev_output.locking_listing, &tx.signing_digest(0)) {
            return Err(ValidationError::BadSignature);
        }

        if let Some(v) = self.verifying.get_mut(&prev_reg_hash) {
            v.redemption_status = RedemptionStatus::Redeemed;
        } else if let Some(v) = self.recent_history.get_mut(&prev_reg_hash) {
            v.redemption_status = RedemptionStatus::Redeemed;
        }

        Ok(())
    }

    /// Drops `hashes` from `recent_history`, rolls `txoc` out of the ledger
    /// (entries are gone for good, not rolled back), and retires the stale
    /// anchor at the front of `states` now that the level set past it has
    /// been durably flushed.
    pub fn pop_oldest(&mut self, hashes: &[Hash256], txoc: &Txoc) {
        for hash in hashes {
            self.recent_history.remove(hash);
        }
        self.ledger.remove(txoc);
        self.states.pop_front();
    }
}

impl Clone for Chain {
    fn clone(&self) -> Chain {
        Chain {
            is_main: self.is_main,
            params: self.params,
            states: self.states.clone(),
            pending_blocks: self.pending_blocks.clone(),
            recent_history: self.recent_history.clone(),
            verifying: HashMap::new(),
            ledger: self.ledger.clone(),
            cumulator_map: self.cumulator_map.clone(),
            prev_redem_hash_map: self.prev_redem_hash_map.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockHeader;
    use crate::params::NetworkType;
    use crate::transaction::{Listing, Outpoint, PublicKey, TxInput, TxOutput};

    fn params() -> NetworkParams {
        NetworkParams::for_network(NetworkType::Unittest)
    }

    fn mine(previous: Hash256, tip: Hash256, milestone: Hash256, time: u32, tx: Option<Transaction>) -> Block {
        Block {
            header: BlockHeader {
                version: 1,
                milestone_hash: milestone,
                previous_hash: previous,
                tip_hash: tip,
                merkle_root: Hash256::zero(),
                time,
                target_compact: params().max_target,
                nonce: time,
                proof: Vec::new(),
            },
            transactions: tx.into_iter().collect(),
        }
    }

    #[test]
    fn verifying_a_single_block_level_set_promotes_it_to_height_one() {
        let p = params();
        let genesis_hash = Hash256::zero();
        let genesis_ms = Milestone::genesis(&p, genesis_hash, 0);
        let mut chain = Chain::new(p, genesis_ms);

        let first_reg_tx = Transaction {
            inputs: vec![TxInput {
                outpoint: Outpoint::null(),
                listing: Listing(vec![9]),
                pubkey: PublicKey(vec![1]),
            }],
            outputs: vec![TxOutput {
                amount: 0,
                locking_listing: Listing(vec![2]),
            }],
        };
        let block = mine(genesis_hash, genesis_hash, genesis_hash, 10, Some(first_reg_tx));
        chain.add_pending(block.clone());

        let vertex = chain.verify(block.clone(), &()).expect("single-block level set should verify");
        assert_eq!(vertex.height, Some(1));
        assert_eq!(chain.height(), 1);
        assert_eq!(vertex.num_valid_txns(), 1);
    }

    #[test]
    fn oldest_level_set_is_snapshotted_once_a_second_milestone_lands() {
        let p = params();
        let genesis_hash = Hash256::zero();
        let genesis_ms = Milestone::genesis(&p, genesis_hash, 0);
        let mut chain = Chain::new(p, genesis_ms);

        assert!(chain.oldest_level_set_snapshot().is_none(), "genesis alone has nothing to flush");

        let first = mine(genesis_hash, genesis_hash, genesis_hash, 10, None);
        chain.add_pending(first.clone());
        chain.verify(first.clone(), &()).expect("first level set should verify");

        let second = mine(first.hash(), first.hash(), first.hash(), 20, None);
        chain.add_pending(second.clone());
        chain.verify(second.clone(), &()).expect("second level set should verify");

        let snapshot = chain.oldest_level_set_snapshot().expect("a second milestone makes the first flushable");
        assert_eq!(snapshot.milestone_hash, first.hash());
        assert_eq!(snapshot.height, 1);
        assert_eq!(snapshot.blocks.len(), 1);

        chain.finalize_oldest();
        assert!(chain.vertex(&first.hash()).is_none(), "finalized vertex should leave the in-memory window");
        assert!(chain.oldest_level_set_snapshot().is_none(), "only the head milestone remains");
    }

    #[test]
    fn unsortable_subgraph_errors_when_block_was_never_added_pending() {
        let p = params();
        let genesis_ms = Milestone::genesis(&p, Hash256::zero(), 0);
        let mut chain = Chain::new(p, genesis_ms);
        let stray = mine(Hash256::zero(), Hash256::zero(), Hash256::zero(), 5, None);
        assert!(chain.verify(stray, &()).is_err());
    }
}
