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

use crate::hash::Hash256;
use thiserror::Error;

/// Errors from the Block Store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("checksum mismatch in file {file}")]
    Checksum { file: String },
    #[error("corrupt data: {reason}")]
    Corrupt { reason: String },
    #[error("key/value backend error: {0}")]
    Kv(String),
    #[error("not found")]
    NotFound,
}

/// Per-transaction validation verdicts. These never propagate out of
/// [`crate::chain::Chain::verify`]; they are folded into a vertex's validity vector.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("double spend")]
    DoubleSpend,
    #[error("bad signature")]
    BadSignature,
    #[error("fee out of range")]
    BadFeeRange,
    #[error("transaction distance exceeds sortition bound")]
    BadDistance,
    #[error("double redemption")]
    DoubleRedemption,
    #[error("redemption output exceeds cumulative reward")]
    RedemptionOverflow,
}

/// Errors raised while verifying a milestone's level set against the ledger.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("milestone parent of {0} is not height-1 below it")]
    InvalidMilestoneParent(Hash256),
    #[error("subgraph rooted at {0} could not be fully sorted (missing pending ancestor)")]
    UnsortableSubgraph(Hash256),
}

/// Errors raised while ingesting a block into the DAG Manager.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid block: {reason}")]
    InvalidBlock { reason: String },
    #[error("block buffered pending parents")]
    OrphanBuffered,
    #[error("block already known")]
    AlreadyExists,
    #[error("milestone parent is too far below the best head")]
    Punctuality,
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Errors raised by the Sync Service.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("peer missed its response deadline")]
    Timeout,
    #[error("requested hash {0} is unknown")]
    UnknownHash(Hash256),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
