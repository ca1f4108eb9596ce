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

//! Orphan Block Container: buffers blocks whose parents aren't yet known and
//! releases them in topological order once the missing parent arrives.
//!
//! Dependency nodes are held in an arena `Vec` and refer to each other by
//! index rather than by `Rc`/`shared_ptr`, the same approach [`crate::chain`]
//! uses for its vertex storage.

use crate::block::{Block, MissingMask};
use crate::hash::Hash256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::collections::HashSet;

use parking_lot::RwLock;

struct Node {
    ndeps: u8,
    waiters: Vec<usize>,
    block: Block,
}

#[derive(Default)]
struct Inner {
    arena: Vec<Option<Node>>,
    /// Orphan block hash -> arena index.
    block_dep_map: HashMap<Hash256, usize>,
    /// Missing parent hash -> set of arena indices waiting on it.
    lose_ends: HashMap<Hash256, HashSet<usize>>,
}

/// Dependency graph of blocks buffered pending an as-yet-unseen parent, spec
/// §4.2. Can be disabled atomically, e.g. while the DAG Manager is mid-flush,
/// to stop accepting further orphans without tearing the structure down.
pub struct OrphanBlocksContainer {
    inner: RwLock<Inner>,
    enabled: AtomicBool,
}

impl Default for OrphanBlocksContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl OrphanBlocksContainer {
    pub fn new() -> OrphanBlocksContainer {
        OrphanBlocksContainer {
            inner: RwLock::new(Inner::default()),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Number of missing hashes the OBC is waiting on.
    pub fn size(&self) -> usize {
        self.inner.read().lose_ends.len()
    }

    /// Number of orphan blocks currently buffered.
    pub fn dependency_size(&self) -> usize {
        self.inner.read().block_dep_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependency_size() == 0
    }

    pub fn contains(&self, hash: &Hash256) -> bool {
        self.inner.read().block_dep_map.contains_key(hash)
    }

    /// Buffers `block` behind `missing_mask`'s absent parents. No-op while
    /// disabled.
    pub fn add_block(&self, block: Block, missing_mask: MissingMask) {
        if !self.is_enabled() {
            return;
        }
        let hash = block.hash();
        let mut inner = self.inner.write();
        if inner.block_dep_map.contains_key(&hash) {
            return;
        }

        let mut missing: Vec<Hash256> = Vec::with_capacity(3);
        if missing_mask.has(MissingMask::MILESTONE) {
            missing.push(block.header.milestone_hash);
        }
        if missing_mask.has(MissingMask::TIP) {
            missing.push(block.header.tip_hash);
        }
        if missing_mask.has(MissingMask::PREVIOUS) {
            missing.push(block.header.previous_hash);
        }
        // Two or three parent fields can name the same hash (a single miner's
        // own previous block is often also the milestone parent); `lose_ends`
        // only ever holds one entry per distinct hash, so `ndeps` must count
        // distinct hashes too or `submit_hash` could never fully drain it.
        missing.sort_unstable();
        missing.dedup();

        let ndeps = missing.len() as u8;
        let idx = inner.arena.len();
        inner.arena.push(Some(Node {
            ndeps,
            waiters: Vec::new(),
            block,
        }));
        inner.block_dep_map.insert(hash, idx);
        for parent in missing {
            inner.lose_ends.entry(parent).or_default().insert(idx);
        }
    }

    /// Announces that `hash` is now available (e.g. just accepted into the
    /// DAG). Resolves as many orphans as this unblocks, returned in an order
    /// where each block's own dependents follow it. `None` if nothing was
    /// unblocked.
    pub fn submit_hash(&self, hash: Hash256) -> Option<Vec<Block>> {
        let mut inner = self.inner.write();
        let mut ready = Vec::new();
        let mut frontier = vec![hash];

        while let Some(h) = frontier.pop() {
            let waiters = match inner.lose_ends.remove(&h) {
                Some(w) => w,
                None => continue,
            };
            for idx in waiters {
                let done = {
                    let node = match inner.arena[idx].as_mut() {
                        Some(n) => n,
                        None => continue,
                    };
                    node.ndeps = node.ndeps.saturating_sub(1);
                    node.ndeps == 0
                };
                if done {
                    if let Some(node) = inner.arena[idx].take() {
                        inner.block_dep_map.remove(&node.block.hash());
                        let resolved_hash = node.block.hash();
                        ready.push(node.block);
                        frontier.push(resolved_hash);
                    }
                }
            }
        }

        if ready.is_empty() {
            None
        } else {
            Some(ready)
        }
    }

    /// Drops every orphan still waiting on hashes in `stale`, e.g. hashes from
    /// a chain that was pruned past `delete_fork_threshold`.
    pub fn prune(&self, stale: &[Hash256]) {
        let mut inner = self.inner.write();
        for hash in stale {
            if let Some(waiters) = inner.lose_ends.remove(hash) {
                for idx in waiters {
                    if let Some(node) = inner.arena[idx].take() {
                        inner.block_dep_map.remove(&node.block.hash());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockHeader;

    fn block_with(previous: Hash256, tip: Hash256, milestone: Hash256, nonce: u32) -> Block {
        Block {
            header: BlockHeader {
                version: 1,
                milestone_hash: milestone,
                previous_hash: previous,
                tip_hash: tip,
                merkle_root: Hash256::zero(),
                time: 1,
                target_compact: 0x1f00_ffff,
                nonce,
                proof: Vec::new(),
            },
            transactions: Vec::new(),
        }
    }

    #[test]
    fn block_resolves_once_all_three_parents_arrive() {
        let obc = OrphanBlocksContainer::new();
        let ms = Hash256::from_bytes(b"ms");
        let prev = Hash256::from_bytes(b"prev");
        let tip = Hash256::from_bytes(b"tip");
        let orphan = block_with(prev, tip, ms, 7);
        let mut mask = MissingMask::default();
        mask.set(MissingMask::MILESTONE);
        mask.set(MissingMask::PREVIOUS);
        mask.set(MissingMask::TIP);
        obc.add_block(orphan.clone(), mask);
        assert!(obc.contains(&orphan.hash()));

        assert!(obc.submit_hash(ms).is_none());
        assert!(obc.submit_hash(prev).is_none());
        let resolved = obc.submit_hash(tip).expect("last parent should release the orphan");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].hash(), orphan.hash());
        assert!(!obc.contains(&orphan.hash()));
    }

    #[test]
    fn disabled_container_drops_new_blocks() {
        let obc = OrphanBlocksContainer::new();
        obc.disable();
        let mut mask = MissingMask::default();
        mask.set(MissingMask::PREVIOUS);
        obc.add_block(block_with(Hash256::from_bytes(b"p"), Hash256::zero(), Hash256::zero(), 1), mask);
        assert!(obc.is_empty());
    }

    #[test]
    fn coincident_milestone_and_previous_parent_release_on_one_submit() {
        // A single miner extending a chain of single-block level sets has its
        // own previous block double as its milestone parent: both fields name
        // the same hash, so this must not need two separate `submit_hash`
        // calls to release.
        let obc = OrphanBlocksContainer::new();
        let prior = Hash256::from_bytes(b"prior");
        let orphan = block_with(prior, Hash256::zero(), prior, 1);
        let mut mask = MissingMask::default();
        mask.set(MissingMask::MILESTONE);
        mask.set(MissingMask::PREVIOUS);
        obc.add_block(orphan.clone(), mask);

        let resolved = obc.submit_hash(prior).expect("one submit should fully release a coincident-parent orphan");
        assert_eq!(resolved[0].hash(), orphan.hash());
    }

    #[test]
    fn chained_resolution_releases_a_grandchild_transitively() {
        let obc = OrphanBlocksContainer::new();
        let parent_hash = Hash256::from_bytes(b"parent");
        let child = block_with(parent_hash, Hash256::zero(), Hash256::zero(), 2);
        let child_hash = child.hash();
        let mut mask = MissingMask::default();
        mask.set(MissingMask::PREVIOUS);
        obc.add_block(child, mask);

        let grandchild = block_with(child_hash, Hash256::zero(), Hash256::zero(), 3);
        obc.add_block(grandchild.clone(), mask);

        let resolved = obc.submit_hash(parent_hash).expect("releasing parent should cascade");
        assert_eq!(resolved.len(), 2);
    }
}
