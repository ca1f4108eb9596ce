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

//! Shared block-building helpers for the end-to-end scenarios, mirroring the
//! `mine()` fixture each module under `src/` already keeps in its own
//! `#[cfg(test)]` block.
#![allow(dead_code)]

use dagchain_core::block::{Block, BlockHeader};
use dagchain_core::hash::Hash256;
use dagchain_core::params::{NetworkParams, NetworkType};
use dagchain_core::transaction::{Listing, Outpoint, PublicKey, Transaction, TxInput, TxOutput};

pub fn params() -> NetworkParams {
    NetworkParams::for_network(NetworkType::Unittest)
}

/// A params value safe to drive through many single-block level sets without
/// tripping the milestone-interval retarget (`interval() == 33` for the stock
/// unittest network): stretches `target_timespan` so the boundary never
/// lands inside a scenario's milestone count.
pub fn scenario_params() -> NetworkParams {
    let mut p = params();
    p.target_timespan = 10_000;
    p
}

pub fn mine(previous: Hash256, tip: Hash256, milestone: Hash256, time: u32, tx: Option<Transaction>) -> Block {
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

/// A block whose target is strictly harder than `mine`'s, for tests that need
/// one fork to accumulate more chainwork than another.
pub fn mine_with_target(previous: Hash256, tip: Hash256, milestone: Hash256, time: u32, target_compact: u32, tx: Option<Transaction>) -> Block {
    Block {
        header: BlockHeader {
            version: 1,
            milestone_hash: milestone,
            previous_hash: previous,
            tip_hash: tip,
            merkle_root: Hash256::zero(),
            time,
            target_compact,
            nonce: time,
            proof: Vec::new(),
        },
        transactions: tx.into_iter().collect(),
    }
}

pub fn first_registration_tx() -> Transaction {
    Transaction {
        inputs: vec![TxInput {
            outpoint: Outpoint::null(),
            listing: Listing(vec![9]),
            pubkey: PublicKey(vec![1]),
        }],
        outputs: vec![TxOutput {
            amount: 0,
            locking_listing: Listing(vec![3]),
        }],
    }
}

/// A registration (redemption) transaction spending `prior_hash`'s single
/// output, its listing crafted so [`dagchain_core::transaction::Listing::verify`]
/// accepts it against `prior_locking`.
pub fn redemption_tx(prior_hash: Hash256, prior_locking: &Listing, amount: u64) -> Transaction {
    let mut tx = Transaction {
        inputs: vec![TxInput {
            outpoint: Outpoint {
                block_hash: prior_hash,
                tx_index: 0,
                out_index: 0,
            },
            listing: Listing(Vec::new()),
            pubkey: PublicKey(vec![1]),
        }],
        outputs: vec![TxOutput {
            amount,
            locking_listing: Listing(vec![4]),
        }],
    };
    let digest = tx.signing_digest(0);
    tx.inputs[0].listing = Listing::for_locking(prior_locking, &digest);
    tx
}
