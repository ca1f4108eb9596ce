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

//! A chain of 30 blocks anchored by 10 milestones (3 blocks per level set)
//! reaches `best_height == 10` with every block accounted for.

mod common;

use common::{first_registration_tx, mine, params};

use dagchain_core::chain::Chain;
use dagchain_core::hash::Hash256;
use dagchain_core::milestone::Milestone;

#[test]
fn thirty_blocks_in_ten_milestones_reaches_height_ten() {
    let p = params();
    let genesis_hash = Hash256::zero();
    let genesis = Milestone::genesis(&p, genesis_hash, 0);
    let mut chain = Chain::new(p, genesis);

    let mut ms_hash = genesis_hash;
    let mut total_blocks = 0usize;
    let mut first_registration_outputs = 0usize;
    let mut clock = 0u32;

    for ms_idx in 0..10u32 {
        let mut previous = ms_hash;
        let tip = ms_hash;
        for b in 0..2u32 {
            clock += 10;
            let tx = if ms_idx == 0 && b == 0 { Some(first_registration_tx()) } else { None };
            if tx.is_some() {
                first_registration_outputs += 1;
            }
            let block = mine(previous, tip, ms_hash, clock, tx);
            chain.add_pending(block.clone());
            previous = block.hash();
            total_blocks += 1;
        }

        clock += 10;
        let ms_block = mine(previous, previous, ms_hash, clock, None);
        chain.add_pending(ms_block.clone());
        let vertex = chain.verify(ms_block.clone(), &()).expect("level set should verify cleanly");
        assert_eq!(vertex.height, Some((ms_idx + 1) as u64));
        ms_hash = ms_block.hash();
        total_blocks += 1;
    }

    assert_eq!(chain.height(), 10);
    assert_eq!(total_blocks, 30);
    assert_eq!(chain.confirmed_utxo_count(), first_registration_outputs);
}
