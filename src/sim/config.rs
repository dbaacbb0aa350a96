use std::path::PathBuf;

use anyhow::ensure;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::*;

use crate::sched::types::{Ns, Resource};
use crate::trace::record::{Channel, ComputeOp, TraceRecord};

pub trait Config: DeserializeOwned + Default {
    fn from_section(section: Option<&Value>) -> Self {
        match section {
            Some(value) => value.clone().try_into().expect("cannot deserialize config"),
            None => {
                warn!("config section not found");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConfig {
    /// Trace file to replay.
    pub trace: PathBuf,
    /// Write the machine-readable summary here as JSON.
    pub report_json: Option<PathBuf>,
    /// Print each timeline's surviving free intervals after the replay.
    pub dump_gaps: bool,
}

impl Config for SimConfig {}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            report_json: None,
            dump_gaps: false,
        }
    }
}

/// Compute fabric clock. Per-op cycle counts below divide by this to land
/// in nanoseconds.
const CLOCK_GHZ: f64 = 0.45;

/// Per-op compute latencies in nanoseconds, one polynomial per op.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ComputeLatency {
    pub ntt: Ns,
    pub intt: Ns,
    pub auto: Ns,
    pub add: Ns,
    pub mult: Ns,
    pub sub: Ns,
    pub bconv_up: Ns,
    pub bconv_down: Ns,
}

impl Default for ComputeLatency {
    fn default() -> Self {
        Self {
            ntt: 3454.0 / CLOCK_GHZ,
            intt: 3343.0 / CLOCK_GHZ,
            auto: 2578.0 / CLOCK_GHZ,
            add: 149.0 / CLOCK_GHZ,
            mult: 233.0 / CLOCK_GHZ,
            sub: 146.0 / CLOCK_GHZ,
            bconv_up: 275.0 / CLOCK_GHZ,
            bconv_down: 359.0 / CLOCK_GHZ,
        }
    }
}

/// Per-channel transfer latencies in nanoseconds for one 512 KiB
/// polynomial (64K coefficients of 8 bytes).
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct TransferLatency {
    pub pcie: Ns,
    pub hbm: Ns,
    pub sram: Ns,
}

impl Default for TransferLatency {
    fn default() -> Self {
        Self {
            // PCIe 5.0 x16, ~63 GB/s effective per direction
            pcie: 7934.49,
            // HBM window at 460 GB/s
            hbm: 1086.95,
            // on-chip SRAM at ~1.8 TB/s
            sram: 271.22,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct LatencyConfig {
    pub compute: ComputeLatency,
    pub transfer: TransferLatency,
}

impl Config for LatencyConfig {}

impl LatencyConfig {
    pub fn compute_ns(&self, op: ComputeOp) -> Ns {
        match op {
            ComputeOp::Ntt => self.compute.ntt,
            ComputeOp::Intt => self.compute.intt,
            ComputeOp::Auto => self.compute.auto,
            ComputeOp::Add => self.compute.add,
            ComputeOp::Mult => self.compute.mult,
            ComputeOp::Sub => self.compute.sub,
            ComputeOp::BconvUp => self.compute.bconv_up,
            ComputeOp::BconvDown => self.compute.bconv_down,
        }
    }

    pub fn transfer_ns(&self, channel: Channel) -> Ns {
        match channel {
            Channel::Pcie => self.transfer.pcie,
            Channel::Hbm => self.transfer.hbm,
            Channel::Sram => self.transfer.sram,
        }
    }

    /// How long `record` occupies its resource.
    pub fn duration_of(&self, record: &TraceRecord) -> Ns {
        match record {
            TraceRecord::Transfer { channel, .. } => self.transfer_ns(*channel),
            TraceRecord::Compute { op, .. } => self.compute_ns(*op),
        }
    }

    /// Shortest latency ever scheduled on `resource`; split fragments below
    /// it can never host anything. Fixed per resource: the cheapest compute
    /// op (Sub), the lone PCIE transfer, and the SRAM transfer on the
    /// shared HBM/SRAM port.
    pub fn reuse_floor(&self, resource: Resource) -> Ns {
        match resource {
            Resource::Compute => self.compute.sub,
            Resource::Pcie => self.transfer.pcie,
            Resource::Hbm => self.transfer.sram,
        }
    }

    /// Every latency must be a positive finite number. A zero-duration slot
    /// would fit into any gap and break the timeline arithmetic.
    pub fn validate(&self) -> anyhow::Result<()> {
        let entries = [
            ("compute.ntt", self.compute.ntt),
            ("compute.intt", self.compute.intt),
            ("compute.auto", self.compute.auto),
            ("compute.add", self.compute.add),
            ("compute.mult", self.compute.mult),
            ("compute.sub", self.compute.sub),
            ("compute.bconv_up", self.compute.bconv_up),
            ("compute.bconv_down", self.compute.bconv_down),
            ("transfer.pcie", self.transfer.pcie),
            ("transfer.hbm", self.transfer.hbm),
            ("transfer.sram", self.transfer.sram),
        ];
        for (name, value) in entries {
            ensure!(
                value > 0.0 && value.is_finite(),
                "latency {} must be positive and finite, got {}",
                name,
                value
            );
        }
        Ok(())
    }
}
