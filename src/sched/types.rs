use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Wall-clock time in nanoseconds. Latencies are fractional (cycle counts
/// divided by a sub-GHz clock), so this is a float rather than an integer
/// cycle count.
pub type Ns = f64;

/// The three shared physical resources operations compete for. HBM and SRAM
/// transfers share one channel window (SRAM is the fast sub-channel), so they
/// schedule on the same timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Compute,
    Pcie,
    Hbm,
}

pub const RESOURCES: [Resource; 3] = [Resource::Compute, Resource::Pcie, Resource::Hbm];

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Resource::Compute => "compute",
            Resource::Pcie => "pcie",
            Resource::Hbm => "hbm",
        })
    }
}

/// Span of time an operation occupies once placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub start: Ns,
    pub end: Ns,
}

/// One placed trace record: which resource hosted it and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub resource: Resource,
    /// Earliest start the record's operands allowed.
    pub ready: Ns,
    pub slot: Slot,
}

/// Per-resource record counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceCounts {
    pub compute: u64,
    pub pcie: u64,
    pub hbm: u64,
}

impl ResourceCounts {
    pub fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Compute => self.compute,
            Resource::Pcie => self.pcie,
            Resource::Hbm => self.hbm,
        }
    }

    pub fn total(&self) -> u64 {
        self.compute + self.pcie + self.hbm
    }
}

/// Per-resource time totals; used both for scheduled makespans and for the
/// serial baseline sums.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceTotals {
    pub compute: Ns,
    pub pcie: Ns,
    pub hbm: Ns,
}

impl ResourceTotals {
    pub fn get(&self, resource: Resource) -> Ns {
        match resource {
            Resource::Compute => self.compute,
            Resource::Pcie => self.pcie,
            Resource::Hbm => self.hbm,
        }
    }

    pub fn get_mut(&mut self, resource: Resource) -> &mut Ns {
        match resource {
            Resource::Compute => &mut self.compute,
            Resource::Pcie => &mut self.pcie,
            Resource::Hbm => &mut self.hbm,
        }
    }
}
