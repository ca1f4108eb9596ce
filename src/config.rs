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

//! Typed configuration for the core: a plain `Clone` struct with a `Default`
//! impl, built by an out-of-scope CLI/config loader and handed in whole.
//!
//! `--root`, `--db`, `--new-db`, `--network`, `--bind-addr`, `--port`, and
//! `--rpc-port` are parsed upstream; this crate only owns the fields those
//! flags ultimately populate.

use std::path::PathBuf;
use std::time::Duration;

use crate::params::{NetworkParams, NetworkType};

/// Default append-only file size before rolling to the next file in its
/// epoch.
pub const DEFAULT_FILE_CAPACITY: u64 = 256 * 1024 * 1024;
pub const DEFAULT_EPOCH_CAPACITY: u32 = 256;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// `--root`: base directory for `data/blk`, `data/vtx`, and the KV index.
    pub root: PathBuf,
    pub network: NetworkType,
    pub file_capacity: u64,
    pub epoch_capacity: u32,
    /// A milestone is eligible to flush once it is this many milestones
    /// behind the best head, and a block whose milestone parent falls this
    /// many milestones behind the best head is rejected outright.
    pub punctuality_threshold: u64,
    pub delete_fork_threshold: u64,
    /// Milestones this many heights below the best head are eligible for
    /// flush once every live fork agrees on their hash.
    pub finalization_depth: u64,
    /// How long an orphan may sit in the OBC before [`crate::orphans::OrphanBlocksContainer::prune`]
    /// evicts it.
    pub obc_prune_age_secs: u64,
    /// Deadline a sync peer has to answer `GetInv`/`GetData`.
    pub sync_timeout: Duration,
    /// LMDB environment map size in MiB for the KV index.
    pub kv_environment_size_mb: usize,
}

impl CoreConfig {
    pub fn for_network(root: PathBuf, network: NetworkType) -> CoreConfig {
        CoreConfig {
            root,
            network,
            file_capacity: DEFAULT_FILE_CAPACITY,
            epoch_capacity: DEFAULT_EPOCH_CAPACITY,
            punctuality_threshold: NetworkParams::for_network(network).punctuality_threshold,
            delete_fork_threshold: NetworkParams::for_network(network).delete_fork_threshold,
            finalization_depth: NetworkParams::for_network(network).delete_fork_threshold,
            obc_prune_age_secs: 300,
            sync_timeout: Duration::from_secs(180),
            kv_environment_size_mb: 512,
        }
    }

    pub fn params(&self) -> NetworkParams {
        NetworkParams::for_network(self.network)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig::for_network(PathBuf::from("./data"), NetworkType::Mainnet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_params_drive_the_defaulted_thresholds() {
        let config = CoreConfig::for_network(PathBuf::from("/tmp/dagchain"), NetworkType::Unittest);
        assert_eq!(config.delete_fork_threshold, 10);
        assert_eq!(config.sync_timeout, Duration::from_secs(180));
    }
}
