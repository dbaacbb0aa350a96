use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::sim::config::Config;
use crate::trace::record::{Channel, ComputeOp, TraceRecord};

/// Synthetic-trace generation knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub records: usize,
    pub seed: u64,
    /// Distinct addresses the generated records draw from. Smaller pools
    /// produce denser dependency chains.
    pub addr_pool: usize,
    /// Fraction of records that are transfers rather than computes.
    pub transfer_share: f64,
}

impl Config for SynthConfig {}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            records: 10000,
            seed: 0,
            addr_pool: 256,
            transfer_share: 0.5,
        }
    }
}

/// Generate a deterministic pseudo-random trace: same config, same records.
pub fn generate(config: &SynthConfig) -> Vec<TraceRecord> {
    assert!(config.addr_pool > 0, "address pool must not be empty");
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut records = Vec::with_capacity(config.records);
    for _ in 0..config.records {
        records.push(random_record(&mut rng, config));
    }
    records
}

fn random_record(rng: &mut StdRng, config: &SynthConfig) -> TraceRecord {
    if rng.gen_bool(config.transfer_share.clamp(0.0, 1.0)) {
        TraceRecord::Transfer {
            channel: Channel::ALL[rng.gen_range(0..Channel::ALL.len())],
            src: addr(rng, config),
            dst: addr(rng, config),
        }
    } else {
        let op = ComputeOp::ALL[rng.gen_range(0..ComputeOp::ALL.len())];
        let in1 = rng.gen_bool(0.75).then(|| addr(rng, config));
        let in2 = (in1.is_some() && rng.gen_bool(0.5)).then(|| addr(rng, config));
        TraceRecord::Compute { op, out: addr(rng, config), in1, in2 }
    }
}

fn addr(rng: &mut StdRng, config: &SynthConfig) -> String {
    format!("p{:04x}", rng.gen_range(0..config.addr_pool))
}
