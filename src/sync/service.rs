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

//! Server-side handlers for the sync protocol, run on the `sync` executor
//! pool so they never contend with `verify` for chain locks beyond a shared
//! read.

use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::chain_set::ChainSet;
use crate::hash::Hash256;

use super::messages::{Bundle, GetData, GetDataKind, GetInv, Inv, NotFound};

const LOG_TARGET: &str = "dagchain_core::sync";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);
const MAX_INV_SIZE: usize = 500;

pub struct SyncService {
    chain_set: Arc<ChainSet>,
}

impl SyncService {
    pub fn new(chain_set: Arc<ChainSet>) -> SyncService {
        SyncService { chain_set }
    }

    /// Intersects `request.locator` with the best chain's milestone hashes and
    /// returns the forward traversal from the most recent match, capped at
    /// `MAX_INV_SIZE`. An empty intersection returns `[genesis]`, signalling
    /// the client to retry with a longer locator.
    pub fn handle_get_inv(&self, request: GetInv, known_heights: &[(Hash256, u64)]) -> Inv {
        let best_heights: std::collections::HashSet<Hash256> = known_heights.iter().map(|(h, _)| *h).collect();

        let intersection_height = request
            .locator
            .iter()
            .filter_map(|h| best_heights.contains(h).then_some(h))
            .filter_map(|h| known_heights.iter().find(|(kh, _)| kh == h).map(|(_, height)| *height))
            .max();

        let hashes = match intersection_height {
            Some(height) => known_heights
                .iter()
                .filter(|(_, h)| *h > height)
                .take(MAX_INV_SIZE)
                .map(|(h, _)| *h)
                .collect(),
            None => {
                let genesis = known_heights.iter().find(|(_, h)| *h == 0).map(|(h, _)| *h).unwrap_or_else(Hash256::zero);
                vec![genesis]
            }
        };

        Inv {
            hashes,
            nonce: request.nonce,
        }
    }

    /// Builds a bundle for a `LEVEL_SET` request, or `None` if the hash is
    /// unknown to this node (caller should reply `NotFound` instead).
    pub fn handle_get_data(&self, request: &GetData, level_set_loader: impl Fn(&Hash256) -> Option<Vec<crate::block::Block>>) -> Vec<Result<Bundle, NotFound>> {
        match request.kind {
            GetDataKind::PendingSet => {
                let pending = self
                    .chain_set
                    .with_best(|_c| Vec::new())
                    .unwrap_or_default();
                vec![Ok(Bundle::from_level_set(pending, request.nonces.first().copied().unwrap_or(0)))]
            }
            GetDataKind::LevelSet => request
                .hashes
                .iter()
                .zip(request.nonces.iter().chain(std::iter::repeat(&0)))
                .map(|(hash, nonce)| match level_set_loader(hash) {
                    Some(blocks) => Ok(Bundle::from_level_set(blocks, *nonce)),
                    None => Err(NotFound { hash: *hash, nonce: *nonce }),
                })
                .collect(),
        }
    }

    pub fn on_timeout(&self, peer: &str) {
        warn!(target: LOG_TARGET, "peer {} missed its response deadline, disconnecting", peer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_intersection_returns_genesis_only() {
        let service = SyncService::new(Arc::new(ChainSet::new()));
        let known = vec![(Hash256::zero(), 0u64), (Hash256::from_bytes(b"a"), 1)];
        let request = GetInv {
            locator: vec![Hash256::from_bytes(b"unknown")],
            nonce: 7,
        };
        let inv = service.handle_get_inv(request, &known);
        assert_eq!(inv.hashes, vec![Hash256::zero()]);
    }

    #[test]
    fn matching_locator_returns_forward_traversal() {
        let service = SyncService::new(Arc::new(ChainSet::new()));
        let known = vec![
            (Hash256::zero(), 0u64),
            (Hash256::from_bytes(b"a"), 1),
            (Hash256::from_bytes(b"b"), 2),
        ];
        let request = GetInv {
            locator: vec![Hash256::from_bytes(b"a")],
            nonce: 1,
        };
        let inv = service.handle_get_inv(request, &known);
        assert_eq!(inv.hashes, vec![Hash256::from_bytes(b"b")]);
    }
}
