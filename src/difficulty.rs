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

//! Compact ("Bitcoin nBits") 256-bit difficulty target arithmetic, shared by
//! [`crate::milestone`] (difficulty adjustment, chainwork) and [`crate::chain`]
//! (transaction-distance sortition).

use primitive_types::U256;

/// Expands a compact 32-bit target into a [`U256`].
pub fn compact_to_u256(compact: u32) -> U256 {
    let exponent = (compact >> 24) as u32;
    let mantissa = U256::from(compact & 0x007f_ffff);
    if exponent <= 3 {
        mantissa >> (8 * (3 - exponent))
    } else {
        mantissa << (8 * (exponent - 3))
    }
}

/// Rounds a [`U256`] target back down to 32-bit compact form.
pub fn u256_to_compact(value: U256) -> u32 {
    if value.is_zero() {
        return 0;
    }
    let mut size = (value.bits() + 7) / 8;
    let mut compact: u64;
    if size <= 3 {
        compact = value.low_u64() << (8 * (3 - size));
    } else {
        let shifted = value >> (8 * (size - 3));
        compact = shifted.low_u64();
    }
    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }
    compact |= (size as u64) << 24;
    compact as u32
}

/// Chainwork contributed by one milestone with target `target_compact`:
/// `max_target / target`, summed over milestone parents back to genesis to get
/// a chain's total cumulative chainwork. Guards against a zero target (never produced
/// by [`compact_to_u256`] for any target this crate constructs, but a corrupt or
/// adversarial compact value could decode to zero) by falling back to `max_target`
/// itself rather than dividing by zero.
pub fn chainwork_for_target(max_target_compact: u32, target_compact: u32) -> U256 {
    let max_target = compact_to_u256(max_target_compact);
    let target = compact_to_u256(target_compact);
    if target.is_zero() {
        return max_target;
    }
    max_target / target
}

pub fn clamp_timespan(timespan: i64, target_timespan: u32) -> u32 {
    let min = (target_timespan / 4) as i64;
    let max = (target_timespan as i64) * 4;
    timespan.clamp(min, max) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_roundtrips_through_u256() {
        for compact in [0x1d00_ffffu32, 0x1b04_4454, 0x0400_0080] {
            let expanded = compact_to_u256(compact);
            let recompacted = u256_to_compact(expanded);
            assert_eq!(compact_to_u256(recompacted), expanded);
        }
    }

    #[test]
    fn lower_target_yields_more_chainwork() {
        let easy = chainwork_for_target(0x1d00_ffff, 0x1d00_ffff);
        let hard = chainwork_for_target(0x1d00_ffff, 0x1c00_ffff);
        assert!(hard > easy);
    }

    #[test]
    fn timespan_clamped_to_quarter_and_quadruple() {
        assert_eq!(clamp_timespan(1, 100), 25);
        assert_eq!(clamp_timespan(10_000, 100), 400);
        assert_eq!(clamp_timespan(100, 100), 100);
    }
}
