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

//! Two blocks in the same level set both attempt to redeem the same prior
//! registration. Exactly one succeeds; the other's transaction is marked
//! invalid rather than the whole block being rejected.

mod common;

use common::{first_registration_tx, mine, params, redemption_tx};

use dagchain_core::chain::Chain;
use dagchain_core::hash::Hash256;
use dagchain_core::milestone::Milestone;
use dagchain_core::vertex::Validity;

#[test]
fn only_one_of_two_competing_redemptions_validates() {
    let p = params();
    let genesis_hash = Hash256::zero();
    let genesis = Milestone::genesis(&p, genesis_hash, 0);
    let mut chain = Chain::new(p, genesis);

    let registration = mine(genesis_hash, genesis_hash, genesis_hash, 10, Some(first_registration_tx()));
    chain.add_pending(registration.clone());
    chain.verify(registration.clone(), &()).expect("first registration should verify on its own");
    let reg_hash = registration.hash();
    let reg_locking = &registration.transactions[0].outputs[0].locking_listing;

    let redeem_a = mine(reg_hash, reg_hash, reg_hash, 20, Some(redemption_tx(reg_hash, reg_locking, 0)));
    let redeem_b = mine(reg_hash, reg_hash, reg_hash, 20, Some(redemption_tx(reg_hash, reg_locking, 0)));
    let milestone_block = mine(redeem_b.hash(), redeem_a.hash(), reg_hash, 30, None);

    chain.add_pending(redeem_a.clone());
    chain.add_pending(redeem_b.clone());
    chain.add_pending(milestone_block.clone());

    let ms_vertex = chain.verify(milestone_block.clone(), &()).expect("level set should verify despite the conflict");
    assert_eq!(ms_vertex.height, Some(2));

    let vertex_a = chain.vertex(&redeem_a.hash()).expect("redeem_a should have a vertex");
    let vertex_b = chain.vertex(&redeem_b.hash()).expect("redeem_b should have a vertex");

    let outcomes = [vertex_a.validity[0], vertex_b.validity[0]];
    assert_eq!(outcomes.iter().filter(|v| **v == Validity::Valid).count(), 1, "exactly one redemption should validate");
    assert_eq!(outcomes.iter().filter(|v| **v == Validity::Invalid).count(), 1, "the other should be marked invalid, not rejected wholesale");
}
