use std::fmt;

use smallvec::SmallVec;

use crate::sched::types::Resource;

/// Addresses in a trace are opaque tokens (the recording tool emits raw
/// pointer values). The scheduler only ever compares them for identity.
pub type Addr = String;

/// Arithmetic transforms the compute fabric executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputeOp {
    Ntt,
    Intt,
    Auto,
    Add,
    Mult,
    Sub,
    BconvUp,
    BconvDown,
}

impl ComputeOp {
    pub const ALL: [ComputeOp; 8] = [
        ComputeOp::Ntt,
        ComputeOp::Intt,
        ComputeOp::Auto,
        ComputeOp::Add,
        ComputeOp::Mult,
        ComputeOp::Sub,
        ComputeOp::BconvUp,
        ComputeOp::BconvDown,
    ];

    /// Mnemonic as it appears in trace files.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ComputeOp::Ntt => "NTT",
            ComputeOp::Intt => "INTT",
            ComputeOp::Auto => "Auto",
            ComputeOp::Add => "Add",
            ComputeOp::Mult => "Mult",
            ComputeOp::Sub => "Sub",
            ComputeOp::BconvUp => "Bconvup",
            ComputeOp::BconvDown => "Bconvdown",
        }
    }
}

/// Data channels a transfer can occupy. HBM and SRAM traffic moves through
/// the same on-card port and shares one timeline; only PCIE is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Pcie,
    Hbm,
    Sram,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Pcie, Channel::Hbm, Channel::Sram];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Channel::Pcie => "PCIE",
            Channel::Hbm => "HBM",
            Channel::Sram => "SRAM",
        }
    }
}

/// One line of the recorded command stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceRecord {
    /// Move one polynomial across a channel.
    Transfer { channel: Channel, src: Addr, dst: Addr },
    /// Run one arithmetic transform. Inputs may be absent: unary and
    /// in-place operations record the `0` sentinel in their place.
    Compute {
        op: ComputeOp,
        out: Addr,
        in1: Option<Addr>,
        in2: Option<Addr>,
    },
}

impl TraceRecord {
    /// The timed resource this record occupies while it runs.
    pub fn resource(&self) -> Resource {
        match self {
            TraceRecord::Transfer { channel: Channel::Pcie, .. } => Resource::Pcie,
            TraceRecord::Transfer { .. } => Resource::Hbm,
            TraceRecord::Compute { .. } => Resource::Compute,
        }
    }

    /// Every address this record touches, reads included. At most three.
    pub fn addrs(&self) -> SmallVec<[&str; 3]> {
        let mut addrs = SmallVec::new();
        match self {
            TraceRecord::Transfer { src, dst, .. } => {
                addrs.push(src.as_str());
                addrs.push(dst.as_str());
            }
            TraceRecord::Compute { out, in1, in2, .. } => {
                addrs.push(out.as_str());
                if let Some(addr) = in1 {
                    addrs.push(addr.as_str());
                }
                if let Some(addr) = in2 {
                    addrs.push(addr.as_str());
                }
            }
        }
        addrs
    }
}

/// Renders the on-disk line format, absent inputs as `0`.
impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceRecord::Transfer { channel, src, dst } => {
                write!(f, "D, {}, {}, {}", channel.mnemonic(), src, dst)
            }
            TraceRecord::Compute { op, out, in1, in2 } => write!(
                f,
                "C, {}, {}, {}, {}",
                op.mnemonic(),
                out,
                in1.as_deref().unwrap_or("0"),
                in2.as_deref().unwrap_or("0"),
            ),
        }
    }
}
