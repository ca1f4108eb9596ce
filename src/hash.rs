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

//! Hashing primitives shared by every component: the block identity hash and the
//! UTXO-key XOR scheme.

use blake2::{digest::consts::U32, Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Blake2b256 = Blake2b<U32>;

/// A 32-byte block/transaction identity hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const fn zero() -> Self {
        Hash256([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn from_bytes(bytes: &[u8]) -> Hash256 {
        let mut hasher = Blake2b256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Hash256(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn xor(&self, other: &Hash256) -> Hash256 {
        let mut out = [0u8; 32];
        for i in 0..32 {
            out[i] = self.0[i] ^ other.0[i];
        }
        Hash256(out)
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Key used to index a UTXO in the ledger maps and in the persisted `utxo` column.
///
/// The key is `containing-block-hash XOR (tx-index << 128) XOR (out-index << 224)`.
/// The shift amounts exceed 32 bits so we fold them onto the hash's high byte
/// lanes instead of doing real >128-bit arithmetic: `tx_index` is XORed into
/// bytes 16..20 and `out_index` into bytes 28..32, matching the bit positions
/// those shifts would land on in a 256-bit XOR.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoKey(pub Hash256);

impl UtxoKey {
    pub fn new(block_hash: &Hash256, tx_index: u32, out_index: u32) -> UtxoKey {
        let mut bytes = block_hash.0;
        for (i, b) in tx_index.to_le_bytes().iter().enumerate() {
            bytes[16 + i] ^= b;
        }
        for (i, b) in out_index.to_le_bytes().iter().enumerate() {
            bytes[28 + i] ^= b;
        }
        UtxoKey(Hash256(bytes))
    }

    /// Inverse of [`UtxoKey::new`] given the same `tx_index`/`out_index`, used by
    /// debugging tools to recover the containing block from a bare key.
    pub fn recover_block_hash(&self, tx_index: u32, out_index: u32) -> Hash256 {
        let mut bytes = self.0 .0;
        for (i, b) in tx_index.to_le_bytes().iter().enumerate() {
            bytes[16 + i] ^= b;
        }
        for (i, b) in out_index.to_le_bytes().iter().enumerate() {
            bytes[28 + i] ^= b;
        }
        Hash256(bytes)
    }
}

impl fmt::Debug for UtxoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UtxoKey({:?})", self.0)
    }
}
