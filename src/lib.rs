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

//! `dagchain-core`: the consensus and storage engine of a DAG proof-of-work
//! node. Blocks carry three parents (milestone, previous, tip); a block that
//! meets a stricter target promotes itself to a milestone and the milestone
//! chain is the node's totally-ordered backbone over the DAG.
//!
//! This crate covers block ingress, orphan buffering, milestone-chain
//! verification against a UTXO ledger and peer-chain redemption registry,
//! append-only persistence, and peer sync request handling. The wire
//! protocol, wallet, PoW solver, CLI, and RPC surface are external
//! collaborators reached only through the traits in [`mempool`],
//! [`wallet_hooks`], and [`solver`].

pub mod block;
pub mod chain;
pub mod chain_set;
pub mod config;
pub mod cumulator;
pub mod dag_manager;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod ledger;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod mempool;
pub mod milestone;
pub mod orphans;
pub mod params;
pub mod solver;
pub mod store;
pub mod sync;
pub mod transaction;
pub mod txoc;
pub mod vertex;
pub mod wallet_hooks;

pub use block::{Block, BlockHeader};
pub use chain::Chain;
pub use chain_set::ChainSet;
pub use config::CoreConfig;
pub use dag_manager::DagManager;
pub use error::{ChainError, IngestError, StoreError, SyncError, ValidationError};
pub use hash::{Hash256, UtxoKey};
pub use milestone::Milestone;
pub use params::{NetworkParams, NetworkType};
pub use store::BlockStore;
pub use transaction::Transaction;
pub use vertex::Vertex;
