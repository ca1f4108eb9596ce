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

//! Network selection parameters: mainnet, testnet, and unittest tunables.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Unittest,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
            NetworkType::Unittest => "unittest",
        };
        write!(f, "{}", s)
    }
}

/// Consensus-critical tunables for one network.
#[derive(Debug, Clone, Copy)]
pub struct NetworkParams {
    pub target_timespan: u32,
    pub time_interval: u32,
    pub target_tps: u32,
    pub punctuality_threshold: u64,
    pub sortition_coefficient: u64,
    pub sortition_threshold: usize,
    pub ms_reward_coefficient: u64,
    pub block_capacity: u32,
    /// Length (number of u32 edge indices) of a proof-of-work proof, the Cuckoo
    /// cycle length the solver targets. `0` (unittest) means the solver emits
    /// an empty proof and PoW checks are bypassed.
    pub cycle_len: u32,
    pub delete_fork_threshold: u64,
    pub max_target: u32,
    pub address_version: u8,
    pub allowed_time_drift: u32,
    pub max_money: u64,
    pub block_reward: u64,
}

impl NetworkParams {
    pub const fn for_network(network: NetworkType) -> NetworkParams {
        match network {
            NetworkType::Mainnet => NetworkParams {
                target_timespan: 86_400,
                time_interval: 10,
                target_tps: 1_000,
                punctuality_threshold: 7_200,
                sortition_coefficient: 100,
                sortition_threshold: 1_000,
                ms_reward_coefficient: 50,
                block_capacity: 128,
                cycle_len: 42,
                delete_fork_threshold: 5,
                max_target: 0x1d00_ffff,
                address_version: 0,
                allowed_time_drift: 7_200,
                max_money: 9_999_999_999,
                block_reward: 100,
            },
            NetworkType::Testnet => NetworkParams {
                target_timespan: 100,
                time_interval: 10,
                target_tps: 100,
                punctuality_threshold: 7_200,
                sortition_coefficient: 100,
                sortition_threshold: 100,
                ms_reward_coefficient: 50,
                block_capacity: 128,
                cycle_len: 4,
                delete_fork_threshold: 5,
                max_target: 0x1d00_ffff,
                address_version: 0,
                allowed_time_drift: 7_200,
                max_money: 9_999_999_999,
                block_reward: 100,
            },
            NetworkType::Unittest => NetworkParams {
                target_timespan: 99,
                time_interval: 3,
                target_tps: 100,
                punctuality_threshold: 7_200,
                sortition_coefficient: 1,
                sortition_threshold: 2,
                ms_reward_coefficient: 1,
                block_capacity: 10,
                cycle_len: 0,
                delete_fork_threshold: 10,
                max_target: 0x1f00_ffff,
                address_version: 1,
                allowed_time_drift: 7_200,
                max_money: 9_999_999_999,
                block_reward: 100,
            },
        }
    }

    /// Number of milestones between difficulty transitions:
    /// `target_timespan / time_interval`.
    pub fn interval(&self) -> u64 {
        (self.target_timespan / self.time_interval).max(1) as u64
    }
}
