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

//! 20 blocks submitted in reverse topological order, each buffered by the
//! Orphan Block Container until its parent arrives. Once the oldest block
//! finally lands, the whole chain cascades in behind it.

mod common;

use std::sync::Arc;

use common::{mine, scenario_params};

use dagchain_core::chain::Chain;
use dagchain_core::chain_set::ChainSet;
use dagchain_core::dag_manager::DagManager;
use dagchain_core::error::IngestError;
use dagchain_core::hash::Hash256;
use dagchain_core::milestone::Milestone;
use dagchain_core::orphans::OrphanBlocksContainer;
use dagchain_core::store::BlockStore;
use dagchain_core::wallet_hooks::WalletHooks;

#[tokio::test]
async fn twenty_blocks_submitted_backwards_all_land_once_the_root_arrives() {
    let p = scenario_params();
    let genesis_hash = Hash256::zero();

    let chain_set = Arc::new(ChainSet::new());
    chain_set.push(Chain::new(p, Milestone::genesis(&p, genesis_hash, 0)));
    let orphans = Arc::new(OrphanBlocksContainer::new());
    let dir = tempfile::tempdir().unwrap();
    let store = BlockStore::open(dir.path(), 8).unwrap();
    let manager = DagManager::spawn(p, chain_set.clone(), orphans.clone(), store, WalletHooks::new());

    // Build a 20-deep single-miner chain: each block's previous parent
    // doubles as its milestone parent (single-block level sets), and the tip
    // parent is pinned to genesis so it's always already known.
    let mut blocks = Vec::with_capacity(20);
    let mut previous = genesis_hash;
    for i in 0..20u32 {
        let block = mine(previous, genesis_hash, previous, 10 + i * 10, None);
        previous = block.hash();
        blocks.push(block);
    }

    for block in blocks.iter().rev().take(19) {
        let result = manager.add_new_block(block.clone()).await;
        assert!(matches!(result, Err(IngestError::OrphanBuffered)), "block missing its parent should buffer, not reject");
    }
    assert_eq!(orphans.dependency_size(), 19);

    manager.add_new_block(blocks[0].clone()).await.expect("the root of the chain should ingest cleanly");

    assert!(orphans.is_empty(), "every buffered block should have cascaded in behind the root");
    assert_eq!(chain_set.best_height(), Some(20));
    for block in &blocks {
        assert!(chain_set.with_best(|c| c.vertex(&block.hash()).is_some()).unwrap(), "block {} should be part of the best chain", block.hash());
    }
}
