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

//! On-disk byte layouts for the `blk` and `vtx` file families, matching
//! [`crate::block::BlockHeader::serialize_for_hash`] and
//! [`crate::vertex::codec`].

use integer_encoding::VarInt;

use crate::block::Block;
use crate::hash::Hash256;
use crate::transaction::{Outpoint, PublicKey, Transaction, TxInput, TxOutput};
use crate::vertex::Vertex;

/// Full on-disk block encoding: header fields in wire order (distinct from
/// `serialize_for_hash`'s proof-before-tail ordering) followed by the
/// transaction count and body.
pub fn encode_block(block: &Block) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&block.header.version.to_le_bytes());
    buf.extend_from_slice(block.header.milestone_hash.as_bytes());
    buf.extend_from_slice(block.header.previous_hash.as_bytes());
    buf.extend_from_slice(block.header.tip_hash.as_bytes());
    buf.extend_from_slice(block.header.merkle_root.as_bytes());
    buf.extend_from_slice(&block.header.time.to_le_bytes());
    buf.extend_from_slice(&block.header.target_compact.to_le_bytes());
    buf.extend_from_slice(&block.header.nonce.to_le_bytes());
    write_varint(&mut buf, block.header.proof.len() as u64);
    for p in &block.header.proof {
        buf.extend_from_slice(&p.to_le_bytes());
    }
    write_varint(&mut buf, block.transactions.len() as u64);
    for tx in &block.transactions {
        encode_transaction(&mut buf, tx);
    }
    buf
}

pub fn decode_block(bytes: &[u8]) -> Option<(Block, usize)> {
    let mut offset = 0usize;
    let version = read_u16(bytes, &mut offset)?;
    let milestone_hash = read_hash(bytes, &mut offset)?;
    let previous_hash = read_hash(bytes, &mut offset)?;
    let tip_hash = read_hash(bytes, &mut offset)?;
    let merkle_root = read_hash(bytes, &mut offset)?;
    let time = read_u32(bytes, &mut offset)?;
    let target_compact = read_u32(bytes, &mut offset)?;
    let nonce = read_u32(bytes, &mut offset)?;
    let proof_len = read_varint(bytes, &mut offset)?;
    let mut proof = Vec::with_capacity(proof_len as usize);
    for _ in 0..proof_len {
        proof.push(read_u32(bytes, &mut offset)?);
    }
    let tx_count = read_varint(bytes, &mut offset)?;
    let mut transactions = Vec::with_capacity(tx_count as usize);
    for _ in 0..tx_count {
        transactions.push(decode_transaction(bytes, &mut offset)?);
    }

    Some((
        Block {
            header: crate::block::BlockHeader {
                version,
                milestone_hash,
                previous_hash,
                tip_hash,
                merkle_root,
                time,
                target_compact,
                nonce,
                proof,
            },
            transactions,
        },
        offset,
    ))
}

fn encode_transaction(buf: &mut Vec<u8>, tx: &Transaction) {
    write_varint(buf, tx.inputs.len() as u64);
    for input in &tx.inputs {
        buf.extend_from_slice(input.outpoint.block_hash.as_bytes());
        buf.extend_from_slice(&input.outpoint.tx_index.to_le_bytes());
        buf.extend_from_slice(&input.outpoint.out_index.to_le_bytes());
        write_varint(buf, input.listing.0.len() as u64);
        buf.extend_from_slice(&input.listing.0);
        write_varint(buf, input.pubkey.0.len() as u64);
        buf.extend_from_slice(&input.pubkey.0);
    }
    write_varint(buf, tx.outputs.len() as u64);
    for output in &tx.outputs {
        buf.extend_from_slice(&output.amount.to_le_bytes());
        write_varint(buf, output.locking_listing.0.len() as u64);
        buf.extend_from_slice(&output.locking_listing.0);
    }
}

fn decode_transaction(bytes: &[u8], offset: &mut usize) -> Option<Transaction> {
    let n_in = read_varint(bytes, offset)?;
    let mut inputs = Vec::with_capacity(n_in as usize);
    for _ in 0..n_in {
        let block_hash = read_hash(bytes, offset)?;
        let tx_index = read_u32(bytes, offset)?;
        let out_index = read_u32(bytes, offset)?;
        let listing_len = read_varint(bytes, offset)?;
        let listing = read_bytes(bytes, offset, listing_len as usize)?;
        let pubkey_len = read_varint(bytes, offset)?;
        let pubkey = read_bytes(bytes, offset, pubkey_len as usize)?;
        inputs.push(TxInput {
            outpoint: Outpoint { block_hash, tx_index, out_index },
            listing: crate::transaction::Listing(listing),
            pubkey: PublicKey(pubkey),
        });
    }
    let n_out = read_varint(bytes, offset)?;
    let mut outputs = Vec::with_capacity(n_out as usize);
    for _ in 0..n_out {
        let mut amount_buf = [0u8; 8];
        amount_buf.copy_from_slice(bytes.get(*offset..*offset + 8)?);
        *offset += 8;
        let amount = u64::from_le_bytes(amount_buf);
        let listing_len = read_varint(bytes, offset)?;
        let listing = read_bytes(bytes, offset, listing_len as usize)?;
        outputs.push(TxOutput {
            amount,
            locking_listing: crate::transaction::Listing(listing),
        });
    }
    Some(Transaction { inputs, outputs })
}

pub fn encode_vertex(vertex: &Vertex) -> Vec<u8> {
    crate::vertex::codec::encode_vertex_meta(vertex)
}

fn write_varint(buf: &mut Vec<u8>, value: u64) {
    let mut tmp = [0u8; 10];
    let n = value.encode_var(&mut tmp);
    buf.extend_from_slice(&tmp[..n]);
}

fn read_varint(bytes: &[u8], offset: &mut usize) -> Option<u64> {
    let (value, n) = u64::decode_var(bytes.get(*offset..)?)?;
    *offset += n;
    Some(value)
}

fn read_bytes(bytes: &[u8], offset: &mut usize, len: usize) -> Option<Vec<u8>> {
    let slice = bytes.get(*offset..*offset + len)?;
    *offset += len;
    Some(slice.to_vec())
}

fn read_u16(bytes: &[u8], offset: &mut usize) -> Option<u16> {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(bytes.get(*offset..*offset + 2)?);
    *offset += 2;
    Some(u16::from_le_bytes(buf))
}

fn read_u32(bytes: &[u8], offset: &mut usize) -> Option<u32> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes.get(*offset..*offset + 4)?);
    *offset += 4;
    Some(u32::from_le_bytes(buf))
}

fn read_hash(bytes: &[u8], offset: &mut usize) -> Option<Hash256> {
    let slice = bytes.get(*offset..*offset + 32)?;
    *offset += 32;
    let mut arr = [0u8; 32];
    arr.copy_from_slice(slice);
    Some(Hash256(arr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;

    #[test]
    fn block_roundtrips_through_encode_decode() {
        let block = Block::genesis(1_700_000_000);
        let bytes = encode_block(&block);
        let (decoded, consumed) = decode_block(&bytes).expect("genesis block should decode");
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.header.time, block.header.time);
        assert_eq!(decoded.transactions, block.transactions);
    }
}
