//! Timing model over a validated hardware profile
//!
//! [`HardwareModel`] turns analytic work (FLOPs, bytes) into milliseconds.
//! The recorded compute and memory times are always raw; the overlap discount
//! is a separate combinator applied after the dominant-latency max, so that
//! recorded fields never depend on the overlap knob.

use std::fmt;

use crate::error::ConfigError;
use crate::hardware::HardwareSpec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side of the roofline a layer sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Bottleneck {
    /// Compute time strictly exceeds memory time
    ComputeBound,
    /// Memory time strictly exceeds compute time
    MemoryBound,
    /// Compute and memory time are exactly equal (including both zero)
    Balanced,
}

impl Bottleneck {
    /// Classify a (compute, memory) time pair.
    pub fn from_times(compute_time_ms: f64, memory_time_ms: f64) -> Self {
        if compute_time_ms > memory_time_ms {
            Bottleneck::ComputeBound
        } else if memory_time_ms > compute_time_ms {
            Bottleneck::MemoryBound
        } else {
            Bottleneck::Balanced
        }
    }
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bottleneck::ComputeBound => "compute",
            Bottleneck::MemoryBound => "memory",
            Bottleneck::Balanced => "balanced",
        })
    }
}

/// Converts analytic work into time for one validated [`HardwareSpec`]
#[derive(Debug, Clone)]
pub struct HardwareModel {
    spec: HardwareSpec,
}

impl HardwareModel {
    /// Build a model, validating the spec. Invalid profiles are rejected
    /// here so every downstream formula can assume sane ranges.
    pub fn new(spec: HardwareSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self { spec })
    }

    /// The validated profile this model times against.
    pub fn spec(&self) -> &HardwareSpec {
        &self.spec
    }

    /// Compute and memory time in milliseconds for summed work.
    ///
    /// The concurrency hint is capped by the profile's `max_concurrency` and
    /// floors at 1, so a zero hint behaves like a single stream.
    pub fn time_for(
        &self,
        flops: f64,
        bytes_read: f64,
        bytes_written: f64,
        concurrency_hint: u32,
    ) -> (f64, f64) {
        let compute = self.compute_time_ms(flops, concurrency_hint);
        let memory = self.memory_time_ms(bytes_read + bytes_written);
        (compute, memory)
    }

    /// Time to execute `flops` at peak throughput, spread across the
    /// effective concurrency.
    pub fn compute_time_ms(&self, flops: f64, concurrency_hint: u32) -> f64 {
        let effective = concurrency_hint.min(self.spec.max_concurrency).max(1);
        let seconds = flops / self.spec.compute_throughput_flops() / effective as f64;
        seconds * 1e3
    }

    /// Time to move `bytes` through HBM.
    pub fn memory_time_ms(&self, bytes: f64) -> f64 {
        let seconds = bytes / self.spec.memory_bandwidth_bytes_per_sec();
        seconds * 1e3
    }

    /// Time to move `bytes` across the interconnect. A zero-bandwidth
    /// interconnect means a single-device target, so the transfer costs
    /// nothing rather than diverging.
    pub fn interconnect_time_ms(&self, bytes: f64) -> f64 {
        let bandwidth = self.spec.interconnect_bytes_per_sec();
        if bandwidth <= 0.0 {
            return 0.0;
        }
        bytes / bandwidth * 1e3
    }

    /// Dominant latency: the slower of the two sides wins outright.
    pub fn dominant_latency_ms(compute_time_ms: f64, memory_time_ms: f64) -> f64 {
        compute_time_ms.max(memory_time_ms)
    }

    /// Overlap-aware latency: the dominant side plus the fraction of the
    /// smaller side that the device could not hide. An efficiency of 1
    /// degenerates to the pure max, 0 to full serialization.
    pub fn overlap_adjusted_latency_ms(&self, compute_time_ms: f64, memory_time_ms: f64) -> f64 {
        let max = compute_time_ms.max(memory_time_ms);
        let min = compute_time_ms.min(memory_time_ms);
        max + (1.0 - self.spec.overlap_efficiency) * min
    }
}
