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

//! The wallet collaborator's two hook points: a level-set-confirmed subscription
//! fired after every flush, and a tx-conflict notification fired when one of the
//! wallet's pending outputs is invalidated at milestone verification time. The
//! wallet itself — key management, transaction construction — lives elsewhere.

use std::sync::Arc;

use crate::hash::UtxoKey;
use crate::ledger::Utxo;
use crate::vertex::Vertex;

/// Fired once per flush with the newly-persisted level set's vertices and the
/// UTXO deltas it produced: `f(vertices, created_utxo_map, removed_utxo_keys)`.
pub trait LvsConfirmedHook: Send + Sync {
    fn on_level_set_confirmed(&self, vertices: &[Vertex], created: &[(UtxoKey, Utxo)], removed: &[UtxoKey]);
}

/// Fired when a registration previously thought `NotYetRedeemed` is spent by
/// a confirmed redemption, letting a wallet that was tracking it as spendable
/// learn it no longer is.
pub trait TxConflictHook: Send + Sync {
    fn on_tx_conflict(&self, invalidated: UtxoKey);
}

/// Registry of subscribed hooks, held by the [`crate::dag_manager::DagManager`]
/// and invoked from the storage pool once `flush_to_store` has committed a
/// level set, notifying any registered level-set-confirmed listener.
#[derive(Default, Clone)]
pub struct WalletHooks {
    lvs_confirmed: Vec<Arc<dyn LvsConfirmedHook>>,
    tx_conflict: Vec<Arc<dyn TxConflictHook>>,
}

impl WalletHooks {
    pub fn new() -> WalletHooks {
        WalletHooks::default()
    }

    pub fn register_lvs_confirmed(&mut self, hook: Arc<dyn LvsConfirmedHook>) {
        self.lvs_confirmed.push(hook);
    }

    pub fn register_tx_conflict(&mut self, hook: Arc<dyn TxConflictHook>) {
        self.tx_conflict.push(hook);
    }

    pub fn notify_level_set_confirmed(&self, vertices: &[Vertex], created: &[(UtxoKey, Utxo)], removed: &[UtxoKey]) {
        for hook in &self.lvs_confirmed {
            hook.on_level_set_confirmed(vertices, created, removed);
        }
    }

    pub fn notify_tx_conflict(&self, invalidated: UtxoKey) {
        for hook in &self.tx_conflict {
            hook.on_tx_conflict(invalidated);
        }
    }
}
