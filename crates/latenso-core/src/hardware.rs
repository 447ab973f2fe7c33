//! Hardware profiles for latency estimation
//!
//! A [`HardwareSpec`] describes the accelerator an estimate targets: peak
//! dense compute, HBM bandwidth and capacity, interconnect bandwidth, and the
//! concurrency/overlap knobs. Specs are validated once and never mutated; the
//! timing formulas live in [`crate::model::HardwareModel`].

use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hardware capabilities used to convert analytic work into timing
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareSpec {
    /// Human-readable device name, echoed in reports
    pub name: String,
    /// Peak dense throughput in TFLOPs (10^12 FLOPs per second)
    pub peak_tflops: f64,
    /// HBM bandwidth in GB/s (10^9 bytes per second)
    pub memory_bandwidth_gbps: f64,
    /// HBM capacity in GB
    pub hbm_gb: f64,
    /// Device-to-device interconnect bandwidth in GB/s; zero means a
    /// single-device target with no cross-device traffic
    pub interconnect_gbps: f64,
    /// Number of independent compute streams a layer may spread across
    #[cfg_attr(feature = "serde", serde(default = "default_max_concurrency"))]
    pub max_concurrency: u32,
    /// Fraction of memory traffic hidden behind compute, in [0, 1]
    #[cfg_attr(feature = "serde", serde(default = "default_overlap_efficiency"))]
    pub overlap_efficiency: f64,
}

#[cfg(feature = "serde")]
fn default_max_concurrency() -> u32 {
    1
}

#[cfg(feature = "serde")]
fn default_overlap_efficiency() -> f64 {
    1.0
}

impl HardwareSpec {
    /// NVIDIA A100 SXM4 80GB
    ///
    /// - Compute: 312 TFLOPs (BF16 dense)
    /// - Memory: 80 GB HBM2e (2039 GB/s)
    /// - Interconnect: NVLink 3 (600 GB/s)
    pub fn a100_sxm() -> Self {
        Self {
            name: "a100_sxm".to_string(),
            peak_tflops: 312.0,
            memory_bandwidth_gbps: 2039.0,
            hbm_gb: 80.0,
            interconnect_gbps: 600.0,
            max_concurrency: 1,
            overlap_efficiency: 1.0,
        }
    }

    /// NVIDIA H100 SXM5
    ///
    /// - Compute: 989 TFLOPs (BF16 dense)
    /// - Memory: 80 GB HBM3 (3350 GB/s)
    /// - Interconnect: NVLink 4 (900 GB/s)
    pub fn h100_sxm() -> Self {
        Self {
            name: "h100_sxm".to_string(),
            peak_tflops: 989.0,
            memory_bandwidth_gbps: 3350.0,
            hbm_gb: 80.0,
            interconnect_gbps: 900.0,
            max_concurrency: 1,
            overlap_efficiency: 1.0,
        }
    }

    /// AMD Instinct MI300X
    ///
    /// - Compute: 1307 TFLOPs (BF16 dense)
    /// - Memory: 192 GB HBM3 (5300 GB/s)
    /// - Interconnect: Infinity Fabric (1024 GB/s aggregate)
    pub fn mi300x() -> Self {
        Self {
            name: "mi300x".to_string(),
            peak_tflops: 1307.0,
            memory_bandwidth_gbps: 5300.0,
            hbm_gb: 192.0,
            interconnect_gbps: 1024.0,
            max_concurrency: 1,
            overlap_efficiency: 1.0,
        }
    }

    /// Peak compute throughput in FLOPs per second.
    pub fn compute_throughput_flops(&self) -> f64 {
        self.peak_tflops * 1e12
    }

    /// HBM bandwidth in bytes per second.
    pub fn memory_bandwidth_bytes_per_sec(&self) -> f64 {
        self.memory_bandwidth_gbps * 1e9
    }

    /// Interconnect bandwidth in bytes per second.
    pub fn interconnect_bytes_per_sec(&self) -> f64 {
        self.interconnect_gbps * 1e9
    }

    /// Arithmetic intensity (FLOPs per byte) at which compute time and
    /// memory time balance. Below this a workload is memory bound, above it
    /// compute bound.
    pub fn ridge_point(&self) -> f64 {
        let bandwidth = self.memory_bandwidth_bytes_per_sec();
        if bandwidth == 0.0 {
            return 0.0;
        }
        self.compute_throughput_flops() / bandwidth
    }

    /// Check every field for range and finiteness. Out-of-range values are
    /// rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("peak_tflops", self.peak_tflops)?;
        require_positive("memory_bandwidth_gbps", self.memory_bandwidth_gbps)?;
        require_positive("hbm_gb", self.hbm_gb)?;
        if !self.interconnect_gbps.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "interconnect_gbps",
                value: self.interconnect_gbps,
            });
        }
        if self.interconnect_gbps < 0.0 {
            return Err(ConfigError::Negative {
                field: "interconnect_gbps",
                value: self.interconnect_gbps,
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if !self.overlap_efficiency.is_finite()
            || !(0.0..=1.0).contains(&self.overlap_efficiency)
        {
            return Err(ConfigError::OverlapOutOfRange {
                value: self.overlap_efficiency,
            });
        }
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}
