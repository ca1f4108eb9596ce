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

//! The proof-of-work solver, treated as an opaque black box: the core only
//! cares whether it returns a block with a valid nonce, or that the attempt
//! was aborted.

use async_trait::async_trait;

use crate::block::Block;

#[derive(Debug)]
pub struct Aborted;

/// A solved block, guaranteed by the solver to carry a nonce and proof that
/// satisfy `block.header.target_compact`; the core re-checks this bound
/// itself rather than trusting the solver blindly.
#[derive(Debug, Clone)]
pub struct SolvedBlock(pub Block);

/// CPU solver or remote RPC server; the core interacts with it only to
/// submit a block template and accept or reject the proof it returns.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(&self, template: Block) -> Result<SolvedBlock, Aborted>;
}

/// A solver that always aborts without attempting work, useful as a
/// placeholder when mining is disabled or not yet wired to a real miner.
pub struct NullSolver;

#[async_trait]
impl Solver for NullSolver {
    async fn solve(&self, _template: Block) -> Result<SolvedBlock, Aborted> {
        Err(Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_solver_always_aborts() {
        let solver = NullSolver;
        let result = solver.solve(Block::genesis(0)).await;
        assert!(result.is_err());
    }
}
