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

//! Ingress valve tying the orphan container, chain set, and block store
//! together, grounded on the single-worker task-queue model of
//! `base_node/state_machine_service/state_machine.rs`: each of `verify`,
//! `sync`, and `storage` is one Tokio task draining a bounded `mpsc` channel,
//! so chain mutations are always applied in submission order without extra
//! locking.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::block::{Block, MissingMask};
use crate::chain::{Chain, LevelSetSnapshot};
use crate::chain_set::ChainSet;
use crate::error::IngestError;
use crate::hash::Hash256;
use crate::orphans::OrphanBlocksContainer;
use crate::params::NetworkParams;
use crate::store::{BlockStore, LevelSetWrite};
use crate::wallet_hooks::WalletHooks;

const LOG_TARGET: &str = "dagchain_core::dag_manager";

const CHANNEL_CAPACITY: usize = 1024;

/// A unit of work submitted to the `verify` pool.
enum VerifyJob {
    AddBlock {
        block: Block,
        reply: oneshot::Sender<Result<(), IngestError>>,
    },
    FlushTrigger,
    DeleteFork,
}

/// A unit of work submitted to the `storage` pool: one level set ready to be
/// durably written, already detached from the `Chain` it was snapshotted
/// from.
struct StorageJob {
    snapshot: LevelSetSnapshot,
    chain_set: Arc<ChainSet>,
}

/// Shared state the `verify` worker owns exclusively; no other task touches
/// `ChainSet`'s mutable chain contents directly.
struct VerifyWorker {
    params: NetworkParams,
    chain_set: Arc<ChainSet>,
    orphans: Arc<OrphanBlocksContainer>,
    storage_tx: mpsc::Sender<StorageJob>,
}

impl VerifyWorker {
    /// Ingests `block`, then drains every orphan the container releases as a
    /// consequence, feeding each one back through this same path since a
    /// released block is independently re-enterable into the ingest path.
    /// Only the originally submitted block's outcome is reported to the
    /// caller; released orphans are processed best-effort and logged.
    fn add_new_block(&self, block: Block) -> Result<(), IngestError> {
        let mut pending = VecDeque::new();
        pending.push_back(block);
        let result = self.ingest_one(pending.pop_front().unwrap(), &mut pending);
        while let Some(released) = pending.pop_front() {
            if let Err(e) = self.ingest_one(released.clone(), &mut pending) {
                debug!(target: LOG_TARGET, "released orphan {} did not re-enter cleanly: {}", released.hash(), e);
            }
        }
        result
    }

    /// The single-block ingest path: syntactic checks, orphan buffering,
    /// chain verification. Any block this call resolves (accepts or already
    /// knows about) that unblocks waiting orphans has those orphans pushed
    /// onto `queue` for the caller to drain.
    fn ingest_one(&self, block: Block, queue: &mut VecDeque<Block>) -> Result<(), IngestError> {
        // `Block::is_genesis()` is a structural check (all-zero parents) and
        // also matches the legitimate first block of a chain, whose parents
        // point at the zero-hash genesis convention rather than at a real
        // prior block. Only reject when this exact hash is already a known
        // genesis milestone; anything else with zero parents is a normal
        // (if unusual) extension and falls through to the ordinary path.
        if block.is_genesis() {
            let already_genesis = self
                .chain_set
                .with_best(|c| matches!(c.milestone_by_hash(&block.hash()), Some(m) if m.height == 0))
                .unwrap_or(false);
            if already_genesis {
                return Err(IngestError::AlreadyExists);
            }
        }

        let already_known = self
            .chain_set
            .with_best(|c| c.vertex(&block.hash()).is_some() || c.has_pending(&block.hash()))
            .unwrap_or(false);
        if already_known || self.orphans.contains(&block.hash()) {
            return Err(IngestError::AlreadyExists);
        }

        self.syntactic_check(&block)?;

        let known = |hash: &Hash256| {
            self.chain_set
                .with_best(|c| c.vertex(hash).is_some() || c.has_pending(hash) || hash.is_zero())
                .unwrap_or(false)
        };
        let mask = block.missing_mask(known);
        if !mask.is_empty() {
            debug!(target: LOG_TARGET, "buffering block {} pending parents (mask {:#x})", block.hash(), mask.0);
            self.orphans.add_block(block, mask);
            return Err(IngestError::OrphanBuffered);
        }

        let is_milestone = self.looks_like_milestone(&block);

        // Gate on the milestone parent's age and declared per-block target,
        // when that milestone is still in a live chain's window.
        if !block.is_genesis() {
            if let Some((ms_height, ms_target, blk_target)) = self.chain_set.find_milestone(&block.header.milestone_hash) {
                let best_height = self.chain_set.best_height().unwrap_or(0);
                if best_height.saturating_sub(ms_height) >= self.params.punctuality_threshold {
                    debug!(target: LOG_TARGET, "dropping block {} whose milestone parent is too far below the best head", block.hash());
                    return Err(IngestError::Punctuality);
                }
                let promotes_to_milestone = block.header.target_compact <= ms_target;
                if !promotes_to_milestone && block.header.target_compact != blk_target {
                    return Err(IngestError::InvalidBlock {
                        reason: "target does not match milestone parent's per-block target".into(),
                    });
                }
            }
        }

        // Every live chain's pending DAG gets the block: a block anchored on
        // one fork may still be a future ancestor of another.
        self.chain_set.for_each_mut(|c| c.add_pending(block.clone()));

        if is_milestone {
            let best_head_hash = self.chain_set.with_best(|c| c.head().hash);
            let parent_chain_idx = self.chain_set.index_of_head(&block.header.milestone_hash);

            match parent_chain_idx {
                Some(idx) if Some(block.header.milestone_hash) == best_head_hash => {
                    // Milestone parent is the current best head: extend main chain in place.
                    let resolved = self.chain_set.with_chain_mut(idx, |c| c.verify(block.clone(), &()));
                    match resolved {
                        Some(Ok(_vertex)) => {
                            info!(target: LOG_TARGET, "milestone {} accepted on main chain", block.hash());
                            self.orphans.enable();
                            self.delete_fork();
                            self.flush_trigger();
                        }
                        Some(Err(e)) => {
                            warn!(target: LOG_TARGET, "milestone {} failed verification: {}", block.hash(), e);
                            return Err(IngestError::Chain(e));
                        }
                        None => return Err(IngestError::AlreadyExists),
                    }
                }
                Some(idx) => {
                    // Milestone parent is the head of a fork: grow that fork in place;
                    // this may flip the chain set's best pointer.
                    let resolved = self.chain_set.with_chain_mut(idx, |c| c.verify(block.clone(), &()));
                    match resolved {
                        Some(Ok(_vertex)) => {
                            info!(target: LOG_TARGET, "milestone {} accepted on fork chain", block.hash());
                        }
                        Some(Err(e)) => {
                            warn!(target: LOG_TARGET, "milestone {} failed verification on fork: {}", block.hash(), e);
                            return Err(IngestError::Chain(e));
                        }
                        None => return Err(IngestError::AlreadyExists),
                    }
                }
                None => {
                    // Milestone parent is neither the best head nor a known fork's
                    // head: clone a fresh fork from the best chain at the fork point.
                    let new_fork = self.chain_set.with_best(|c| Chain::new_fork(c, &block));
                    let Some(mut fork) = new_fork else {
                        return Err(IngestError::AlreadyExists);
                    };
                    match fork.verify(block.clone(), &()) {
                        Ok(_vertex) => {
                            info!(target: LOG_TARGET, "milestone {} forked off the best chain", block.hash());
                            self.chain_set.push(fork);
                        }
                        Err(e) => {
                            warn!(target: LOG_TARGET, "forked milestone {} failed verification: {}", block.hash(), e);
                            return Err(IngestError::Chain(e));
                        }
                    }
                }
            }
        }

        if let Some(released) = self.orphans.submit_hash(block.hash()) {
            debug!(target: LOG_TARGET, "releasing {} orphan(s) dependent on {}", released.len(), block.hash());
            queue.extend(released);
        }

        Ok(())
    }

    /// Syntactic checks that gate the consensus path: proof length matches the
    /// network's Cuckoo-cycle length, the advertised target is not looser
    /// than the network maximum, and the block carries at most one
    /// transaction.
    fn syntactic_check(&self, block: &Block) -> Result<(), IngestError> {
        if !block.is_genesis() && block.header.proof.len() != self.params.cycle_len as usize {
            return Err(IngestError::InvalidBlock {
                reason: format!("proof length {} != cycle_len {}", block.header.proof.len(), self.params.cycle_len),
            });
        }
        if block.header.target_compact > self.params.max_target {
            return Err(IngestError::InvalidBlock {
                reason: "target looser than network maximum".into(),
            });
        }
        Ok(())
    }

    /// Whether `block`'s declared target already meets its own milestone
    /// parent's stricter `milestone_target` — the promotion test of spec
    /// §4.7 step 5. Falls back to the best head's target when the milestone
    /// parent isn't in any live chain's window (e.g. it was already flushed).
    fn looks_like_milestone(&self, block: &Block) -> bool {
        let target = self
            .chain_set
            .find_milestone(&block.header.milestone_hash)
            .map(|(_, ms_target, _)| ms_target)
            .or_else(|| self.chain_set.with_best(|c| c.head().milestone_target))
            .unwrap_or(self.params.max_target);
        block.header.target_compact <= target
    }

    /// Scans the best chain's oldest unflushed level set; if every live fork
    /// still agrees on it (no reorg can claw it back), snapshots it and
    /// enqueues the snapshot to the storage pool.
    ///
    /// This only fires once the best chain's in-memory window exceeds
    /// `punctuality_threshold` — keeping that many states around gives a
    /// fork enough room to roll a reorg back before anything is durably
    /// written.
    fn flush_trigger(&self) {
        let states_len = self.chain_set.with_best(|c| c.states_len()).unwrap_or(0);
        if (states_len as u64) <= self.params.punctuality_threshold {
            return;
        }
        if !self.chain_set.all_agree_on_oldest() {
            return;
        }
        let Some(snapshot) = self.chain_set.with_best(|c| c.oldest_level_set_snapshot()).flatten() else {
            return;
        };
        debug!(target: LOG_TARGET, "flushing level set at height {} ({} blocks)", snapshot.height, snapshot.blocks.len());
        if self
            .storage_tx
            .try_send(StorageJob {
                snapshot,
                chain_set: self.chain_set.clone(),
            })
            .is_err()
        {
            warn!(target: LOG_TARGET, "storage pool is backed up or shut down, dropping this flush attempt");
        }
    }

    fn delete_fork(&self) {
        let best_work = self.chain_set.with_best(|c| c.chainwork());
        let Some(best_work) = best_work else { return };
        let threshold = self.params.delete_fork_threshold;
        let mut to_erase = Vec::new();
        self.chain_set.for_each(|idx, c| {
            if c.is_main {
                return;
            }
            let behind = best_work.saturating_sub(c.chainwork());
            if behind > primitive_types::U256::from(threshold) {
                to_erase.push(idx);
            }
        });
        for idx in to_erase.into_iter().rev() {
            self.chain_set.erase(idx);
        }
    }
}

/// Handle for submitting work to the three executor pools. Clonable; cheap.
#[derive(Clone)]
pub struct DagManager {
    verify_tx: mpsc::Sender<VerifyJob>,
}

impl DagManager {
    /// Spawns the `verify` and `storage` pools. `store`/`hooks` are owned
    /// exclusively by the `storage` task; `verify` only ever hands it
    /// detached [`LevelSetSnapshot`]s over the channel.
    pub fn spawn(
        params: NetworkParams,
        chain_set: Arc<ChainSet>,
        orphans: Arc<OrphanBlocksContainer>,
        store: BlockStore,
        hooks: WalletHooks,
    ) -> DagManager {
        let (storage_tx, mut storage_rx) = mpsc::channel::<StorageJob>(CHANNEL_CAPACITY);
        let store = Mutex::new(store);

        tokio::spawn(async move {
            while let Some(job) = storage_rx.recv().await {
                let StorageJob { snapshot, chain_set } = job;
                let write = LevelSetWrite {
                    milestone_hash: snapshot.milestone_hash,
                    height: snapshot.height,
                    blocks: &snapshot.blocks,
                    vertices: &snapshot.vertices,
                    utxo_created: &snapshot.utxo_created,
                    utxo_spent: &snapshot.utxo_spent,
                    reg_changes: &snapshot.reg_changes,
                };
                let result = store.lock().store_level_set(write);
                match result {
                    Ok(()) => {
                        hooks.notify_level_set_confirmed(&snapshot.vertices, &snapshot.utxo_created, &snapshot.utxo_spent);
                        chain_set.finalize_oldest_everywhere(snapshot.milestone_hash);
                    }
                    Err(e) => {
                        error!(target: LOG_TARGET, "failed to flush level set at height {}: {}", snapshot.height, e);
                    }
                }
            }
            info!(target: LOG_TARGET, "storage pool shutting down");
        });

        let (verify_tx, mut verify_rx) = mpsc::channel::<VerifyJob>(CHANNEL_CAPACITY);
        let worker = VerifyWorker { params, chain_set, orphans, storage_tx };

        tokio::spawn(async move {
            while let Some(job) = verify_rx.recv().await {
                match job {
                    VerifyJob::AddBlock { block, reply } => {
                        let result = worker.add_new_block(block);
                        let _ = reply.send(result);
                    }
                    VerifyJob::FlushTrigger => worker.flush_trigger(),
                    VerifyJob::DeleteFork => worker.delete_fork(),
                }
            }
            info!(target: LOG_TARGET, "verify pool shutting down");
        });

        DagManager { verify_tx }
    }

    pub async fn add_new_block(&self, block: Block) -> Result<(), IngestError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.verify_tx
            .send(VerifyJob::AddBlock { block, reply: reply_tx })
            .await
            .map_err(|_| IngestError::InvalidBlock {
                reason: "verify pool is shut down".into(),
            })?;
        reply_rx.await.map_err(|_| IngestError::InvalidBlock {
            reason: "verify pool dropped the reply channel".into(),
        })?
    }

    pub async fn flush_trigger(&self) {
        let _ = self.verify_tx.send(VerifyJob::FlushTrigger).await;
    }

    pub async fn delete_fork(&self) {
        let _ = self.verify_tx.send(VerifyJob::DeleteFork).await;
    }
}
