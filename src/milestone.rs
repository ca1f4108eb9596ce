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

//! Milestone: one row of the total-ordered backbone formed whenever a block meets
//! the stricter milestone proof-of-work target.

use crate::difficulty;
use crate::hash::Hash256;
use crate::params::NetworkParams;
use crate::txoc::{RegChange, Txoc};
use primitive_types::U256;

/// Exponential-smoothing weight on the *previous* hashrate estimate; the
/// remainder (`HASHRATE_ALPHA_DEN - HASHRATE_ALPHA_NUM`) weights the
/// instantaneous rate observed this round. alpha = 0.8.
const HASHRATE_ALPHA_NUM: u64 = 4;
const HASHRATE_ALPHA_DEN: u64 = 5;

/// One milestone: a named checkpoint on the backbone carrying the cumulative
/// chainwork, the two difficulty targets, and the UTXO/registration deltas
/// produced by the level set it closes off.
#[derive(Debug, Clone)]
pub struct Milestone {
    pub height: u64,
    pub hash: Hash256,
    pub time: u32,
    /// Cumulative chainwork up to and including this milestone.
    pub chainwork: U256,
    /// Difficulty target the *next* milestone block itself must satisfy.
    pub milestone_target: u32,
    /// Difficulty target ordinary (non-milestone) blocks in the next level set
    /// must satisfy.
    pub block_target: u32,
    /// EMA-smoothed observed hashrate, blocks per second, fixed-point Q32.
    pub hashrate_q32: u64,
    pub last_update_time: u32,
    txn_counter: u64,
    blk_counter: u64,
    pub level_set_size: usize,
    pub txoc: Txoc,
    pub reg_change: RegChange,
    pub cumulative_reward: u64,
    pub stored: bool,
}

impl Milestone {
    /// The genesis milestone: height 0, zero chainwork, network's starting
    /// targets.
    pub fn genesis(params: &NetworkParams, genesis_hash: Hash256, genesis_time: u32) -> Milestone {
        Milestone {
            height: 0,
            hash: genesis_hash,
            time: genesis_time,
            chainwork: difficulty::chainwork_for_target(params.max_target, params.max_target),
            milestone_target: params.max_target,
            block_target: params.max_target,
            hashrate_q32: 0,
            last_update_time: genesis_time,
            txn_counter: 0,
            blk_counter: 0,
            level_set_size: 1,
            txoc: Txoc::new(),
            reg_change: RegChange::new(),
            cumulative_reward: 0,
            stored: false,
        }
    }

    /// Builds the next milestone from this one, given the closing level set's
    /// observed block/transaction counts, hash and timestamp.
    ///
    /// `txns_in_level_set` and `blocks_in_level_set` drive the per-block target
    /// derivation: more transactions arriving than `target_tps` allows
    /// tightens the next block target.
    #[allow(clippy::too_many_arguments)]
    pub fn next(
        &self,
        params: &NetworkParams,
        new_hash: Hash256,
        new_time: u32,
        txns_in_level_set: u64,
        blocks_in_level_set: u64,
        reward_this_round: u64,
        txoc: Txoc,
        reg_change: RegChange,
    ) -> Milestone {
        let height = self.height + 1;
        let interval = params.interval();

        let mut timespan = difficulty::clamp_timespan(
            new_time.saturating_sub(self.last_update_time) as i64,
            params.target_timespan,
        ) as u64;
        if height == 1 {
            timespan = params.time_interval as u64;
        }
        let timespan = timespan.max(1);

        // Transaction/block counters accumulate every round; they are only
        // consumed and reset at an interval boundary.
        let txn_counter = self.txn_counter + txns_in_level_set;
        let blk_counter = self.blk_counter + blocks_in_level_set;

        // EMA hashrate toward the instantaneous rate observed over the current
        // position in the interval: alpha = 0.8 on the running estimate, 0.2 on
        // the instantaneous one. `ms_difficulty` reads *this* milestone's own
        // (pre-retarget) target, matching the predecessor's chainwork below.
        let position_in_interval = (height - 1) % interval + 1;
        let instantaneous_q32 = {
            let numerator = (position_in_interval as u128) * (self.ms_difficulty(params) as u128);
            ((numerator << 32) / timespan as u128) as u64
        };
        let hashrate_q32 = if self.hashrate_q32 == 0 {
            instantaneous_q32
        } else {
            (self.hashrate_q32 * HASHRATE_ALPHA_NUM + instantaneous_q32 * (HASHRATE_ALPHA_DEN - HASHRATE_ALPHA_NUM))
                / HASHRATE_ALPHA_DEN
        };

        // Chainwork accrues using the predecessor's own milestone target, not
        // whatever this round retargets it to, so that cumulative chainwork
        // stays `sum(max_target / parent.milestone_target)`.
        let added_work = difficulty::chainwork_for_target(params.max_target, self.milestone_target);
        let chainwork = self.chainwork + added_work;

        if height % interval != 0 {
            return Milestone {
                height,
                hash: new_hash,
                time: new_time,
                chainwork,
                milestone_target: self.milestone_target,
                block_target: self.block_target,
                hashrate_q32,
                last_update_time: self.last_update_time,
                txn_counter,
                blk_counter,
                level_set_size: blocks_in_level_set as usize,
                txoc,
                reg_change,
                cumulative_reward: self.cumulative_reward + reward_this_round,
                stored: false,
            };
        }

        let (milestone_target, block_target) = self.retarget(params, timespan, txn_counter, blk_counter);

        Milestone {
            height,
            hash: new_hash,
            time: new_time,
            chainwork,
            milestone_target,
            block_target,
            hashrate_q32,
            last_update_time: new_time,
            txn_counter: 0,
            blk_counter: 0,
            level_set_size: blocks_in_level_set as usize,
            txoc,
            reg_change,
            cumulative_reward: self.cumulative_reward + reward_this_round,
            stored: false,
        }
    }

    /// `max_target / (milestone_target + 1)`, truncated to 64 bits. Zero while
    /// this milestone's target is still `max_target`, growing as the target
    /// tightens.
    fn ms_difficulty(&self, params: &NetworkParams) -> u64 {
        let max_target = difficulty::compact_to_u256(params.max_target);
        let target = difficulty::compact_to_u256(self.milestone_target);
        (max_target / (target + U256::one())).low_u64()
    }

    /// Retargets both difficulty targets at an `interval` boundary, given the
    /// clamped observed timespan and the transaction/block counters accumulated
    /// since the previous transition.
    ///
    /// The milestone target scales by `observed_timespan / target_timespan`. If
    /// that pushes it past `max_target`, both targets are pinned to
    /// `max_target`. Otherwise the block target is derived from how many
    /// transactions arrived relative to `block_capacity`: below capacity the
    /// block target equals the milestone target; above it, the milestone target
    /// is divided by `block_capacity` and scaled back up by the (capped)
    /// transaction count, clamped so the multiplication can't overflow the
    /// target's own leading zero bits. An average above 95% of capacity bumps
    /// the transaction count by 1.1x first, to account for arrivals the block
    /// capacity itself dropped. The block target is always floored at the
    /// milestone target and capped at `max_target`.
    fn retarget(&self, params: &NetworkParams, timespan: u64, txn_counter: u64, blk_counter: u64) -> (u32, u32) {
        let max_target = difficulty::compact_to_u256(params.max_target);
        let current_ms = difficulty::compact_to_u256(self.milestone_target);
        let scaled = current_ms / U256::from(params.target_timespan) * U256::from(timespan);
        let milestone_compact = difficulty::u256_to_compact(scaled);
        let milestone_target = difficulty::compact_to_u256(milestone_compact);

        if milestone_target > max_target {
            return (params.max_target, params.max_target);
        }

        let ntxns_cap = (params.target_tps as u64).saturating_mul(params.target_timespan as u64);
        let mut txn_counter = txn_counter.min(ntxns_cap);

        let block_capacity = (params.block_capacity as u64).max(1);
        if blk_counter > 0 && txn_counter / blk_counter > block_capacity * 95 / 100 {
            txn_counter = txn_counter * 11 / 10;
        }

        let block_target = if txn_counter <= block_capacity {
            milestone_target
        } else {
            let per_block = milestone_target / U256::from(block_capacity);
            let leading_zeros = 256u32.saturating_sub(per_block.bits() as u32);
            let limit = if leading_zeros >= 64 { u64::MAX } else { 1u64 << leading_zeros };
            let capped = txn_counter.min(limit).max(1);
            per_block * U256::from(capped)
        };
        let block_target = block_target.min(max_target).max(milestone_target);

        (milestone_compact, difficulty::u256_to_compact(block_target))
    }

    pub fn txn_counter(&self) -> u64 {
        self.txn_counter
    }

    pub fn blk_counter(&self) -> u64 {
        self.blk_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NetworkType;

    #[test]
    fn genesis_has_zero_height_and_full_target() {
        let params = NetworkParams::for_network(NetworkType::Unittest);
        let ms = Milestone::genesis(&params, Hash256::zero(), 1_700_000_000);
        assert_eq!(ms.height, 0);
        assert_eq!(ms.milestone_target, params.max_target);
    }

    #[test]
    fn chainwork_is_monotonically_increasing() {
        let params = NetworkParams::for_network(NetworkType::Unittest);
        let genesis = Milestone::genesis(&params, Hash256::zero(), 1_700_000_000);
        let next = genesis.next(
            &params,
            Hash256::from_bytes(b"ms1"),
            1_700_000_099,
            5,
            3,
            300,
            Txoc::new(),
            RegChange::new(),
        );
        assert!(next.chainwork > genesis.chainwork);
        assert_eq!(next.height, 1);
        assert_eq!(next.cumulative_reward, 300);
    }

    #[test]
    fn slower_than_target_timespan_tightens_milestone_target_at_interval() {
        let params = NetworkParams::for_network(NetworkType::Unittest);
        let mut ms = Milestone::genesis(&params, Hash256::zero(), 0);
        // Unittest interval() == 99/3 == 33, so height 33 is a retarget boundary.
        for h in 1..=33u64 {
            let time = ms.time + 1;
            ms = ms.next(&params, Hash256::from_bytes(&h.to_le_bytes()), time, 1, 1, 0, Txoc::new(), RegChange::new());
        }
        // Observed timespan (33s) << target_timespan (99s): next target should
        // tighten (shrink) relative to genesis's max target.
        assert!(difficulty::compact_to_u256(ms.milestone_target) <= difficulty::compact_to_u256(params.max_target));
    }
}
