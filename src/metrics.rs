//  Copyright 2026, The Dagchain Core Contributors
//
//  Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
//  following conditions are met:
//
//  1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
//  disclaimer.
//
//  2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
//  following disclaimer in the documentation and/or other materials provided with the distribution.
//
//  3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
//  products derived from this software without specific prior written permission.
//
//  THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
//  INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
//  DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
//  SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
//  SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
//  WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
//  USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Lazily-registered counters/gauges, gated behind the `metrics` feature and
//! following `base_node/metrics.rs`'s pattern of one `Lazy<...>` static per
//! named series, registered against the process-global `prometheus` default
//! registry the first time it is read.

use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge};

pub fn best_height() -> &'static IntGauge {
    static METER: Lazy<IntGauge> =
        Lazy::new(|| register_int_gauge!("dagchain_core_best_height", "Height of the best milestone chain").unwrap());
    &METER
}

pub fn milestones_verified() -> &'static IntCounter {
    static METER: Lazy<IntCounter> = Lazy::new(|| {
        register_int_counter!(
            "dagchain_core_milestones_verified_total",
            "Milestones accepted by Chain::verify across all live chains"
        )
        .unwrap()
    });
    &METER
}

pub fn orphan_container_size() -> &'static IntGauge {
    static METER: Lazy<IntGauge> =
        Lazy::new(|| register_int_gauge!("dagchain_core_obc_size", "Number of blocks buffered in the orphan container").unwrap());
    &METER
}

pub fn live_fork_count() -> &'static IntGauge {
    static METER: Lazy<IntGauge> =
        Lazy::new(|| register_int_gauge!("dagchain_core_live_forks", "Number of chains tracked by the chain set").unwrap());
    &METER
}

pub fn flush_latency_seconds() -> &'static Histogram {
    static METER: Lazy<Histogram> = Lazy::new(|| {
        register_histogram!(
            "dagchain_core_flush_latency_seconds",
            "Wall-clock time to write one level set to the block store"
        )
        .unwrap()
    });
    &METER
}
