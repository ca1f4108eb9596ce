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

//! Sliding-window chainwork/timestamp aggregator used by the partition/sortition
//! rule: a ring buffer of `(u32 compact, u16 run)` chainwork pairs plus a ring
//! buffer of `u32` timestamps.

use std::collections::VecDeque;

/// Run-length-encoded sliding window over the last `capacity` blocks' compact
/// chainwork and timestamps of one peer chain.
#[derive(Debug, Clone)]
pub struct Cumulator {
    /// `(compact_chainwork, run_length)` pairs; consecutive equal chainworks are
    /// folded into one run.
    chainworks: VecDeque<(u32, u16)>,
    timestamps: VecDeque<u32>,
    sum: u128,
    capacity: usize,
}

impl Cumulator {
    pub fn new(capacity: usize) -> Cumulator {
        Cumulator {
            chainworks: VecDeque::new(),
            timestamps: VecDeque::new(),
            sum: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn sum(&self) -> u128 {
        self.sum
    }

    pub fn time_span(&self) -> u32 {
        match (self.timestamps.front(), self.timestamps.back()) {
            (Some(first), Some(last)) => last.saturating_sub(*first),
            _ => 0,
        }
    }

    /// Pushes one block's chainwork/timestamp. `ascending` selects which end of the
    /// deque to push onto: `true` appends at the tail (normal forward growth),
    /// `false` prepends at the head (used by [`crate::chain::Chain::new_fork`] when
    /// rebuilding a cumulator while walking backwards). Pops from the opposite end
    /// once `capacity` is exceeded.
    pub fn add(&mut self, chainwork: u32, timestamp: u32, ascending: bool) {
        if ascending {
            match self.chainworks.back_mut() {
                Some((work, run)) if *work == chainwork => *run += 1,
                _ => self.chainworks.push_back((chainwork, 1)),
            }
            self.timestamps.push_back(timestamp);
            self.sum += chainwork as u128;
            while self.len() > self.capacity {
                self.pop_front();
            }
        } else {
            match self.chainworks.front_mut() {
                Some((work, run)) if *work == chainwork => *run += 1,
                _ => self.chainworks.push_front((chainwork, 1)),
            }
            self.timestamps.push_front(timestamp);
            self.sum += chainwork as u128;
            while self.len() > self.capacity {
                self.pop_back();
            }
        }
    }

    fn pop_front(&mut self) {
        if self.timestamps.pop_front().is_none() {
            return;
        }
        if let Some((work, run)) = self.chainworks.front_mut() {
            self.sum = self.sum.saturating_sub(*work as u128);
            *run -= 1;
            if *run == 0 {
                self.chainworks.pop_front();
            }
        }
    }

    fn pop_back(&mut self) {
        if self.timestamps.pop_back().is_none() {
            return;
        }
        if let Some((work, run)) = self.chainworks.back_mut() {
            self.sum = self.sum.saturating_sub(*work as u128);
            *run -= 1;
            if *run == 0 {
                self.chainworks.pop_back();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length_folds_equal_consecutive_chainworks() {
        let mut c = Cumulator::new(10);
        c.add(5, 100, true);
        c.add(5, 101, true);
        c.add(5, 102, true);
        assert_eq!(c.chainworks.len(), 1);
        assert_eq!(c.sum(), 15);
        assert_eq!(c.time_span(), 2);
    }

    #[test]
    fn capacity_evicts_oldest_on_ascending_push() {
        let mut c = Cumulator::new(2);
        c.add(1, 1, true);
        c.add(2, 2, true);
        c.add(3, 3, true);
        assert_eq!(c.len(), 2);
        assert_eq!(c.sum(), 5);
    }

    #[test]
    fn descending_push_evicts_from_the_tail() {
        let mut c = Cumulator::new(2);
        c.add(3, 3, false);
        c.add(2, 2, false);
        c.add(1, 1, false);
        assert_eq!(c.len(), 2);
        assert_eq!(c.sum(), 3);
    }
}
