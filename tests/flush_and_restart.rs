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

//! Build a chain of milestones, flush a prefix of them to disk, seal, and
//! reopen. The reopened store should report the flushed head height and a
//! clean `init` pass, with the flushed heights no longer needing
//! re-verification.

mod common;

use common::{mine, scenario_params};

use dagchain_core::chain::Chain;
use dagchain_core::hash::Hash256;
use dagchain_core::milestone::Milestone;
use dagchain_core::store::{BlockStore, LevelSetWrite};

/// Mines one milestone directly on top of `ms_hash` (no intervening blocks)
/// and verifies it, returning the new milestone's hash.
fn mine_one_milestone(chain: &mut Chain, ms_hash: Hash256, clock: &mut u32) -> Hash256 {
    *clock += 10;
    let block = mine(ms_hash, ms_hash, ms_hash, *clock, None);
    chain.add_pending(block.clone());
    chain.verify(block.clone(), &()).expect("level set should verify cleanly");
    block.hash()
}

#[test]
fn flushed_heights_survive_a_restart() {
    let p = scenario_params();
    let genesis_hash = Hash256::zero();
    let genesis = Milestone::genesis(&p, genesis_hash, 0);
    let mut chain = Chain::new(p, genesis);

    let dir = tempfile::tempdir().unwrap();
    let mut store = BlockStore::open(dir.path(), 8).unwrap();

    let mut ms_hash = genesis_hash;
    let mut clock = 0u32;
    let flush_count = 10u64;

    // Ten milestones beyond genesis; flush every one as soon as it becomes
    // the oldest non-head state.
    for _ in 0..flush_count {
        ms_hash = mine_one_milestone(&mut chain, ms_hash, &mut clock);
        if let Some(snapshot) = chain.oldest_level_set_snapshot() {
            store
                .store_level_set(LevelSetWrite {
                    milestone_hash: snapshot.milestone_hash,
                    height: snapshot.height,
                    blocks: &snapshot.blocks,
                    vertices: &snapshot.vertices,
                    utxo_created: &snapshot.utxo_created,
                    utxo_spent: &snapshot.utxo_spent,
                    reg_changes: &snapshot.reg_changes,
                })
                .expect("flush should succeed");
            chain.finalize_oldest();
        }
    }

    let live_head_height = chain.height();
    let flushed_head = store.get_head_height().unwrap().expect("at least one flush happened");
    assert!(flushed_head >= 1 && flushed_head < flush_count, "only a prefix of milestones should be flushed");
    assert!(flushed_head < live_head_height, "the live, still-growing head must never itself be flushed");

    store.seal().unwrap();
    drop(store);

    let mut reopened = BlockStore::open(dir.path(), 8).unwrap();
    let sane_height = reopened.check_file_sanity(false).expect("a cleanly sealed store passes sanity");
    assert_eq!(sane_height, flushed_head);
    assert_eq!(reopened.get_head_height().unwrap(), Some(flushed_head));

    // Every flushed height is retrievable bit-identically; the still-pending
    // tail remains solely in the in-memory chain, which the restart doesn't
    // touch.
    for h in 1..=flushed_head {
        let vertex = reopened.get_milestone_at(h).unwrap().expect("flushed height should be recorded");
        assert_eq!(vertex.height, Some(h));
    }

    // `check_file_sanity` is idempotent: running it again mutates nothing further.
    let second_pass = reopened.check_file_sanity(false).unwrap();
    assert_eq!(second_pass, flushed_head);
}
