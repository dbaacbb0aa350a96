use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::sched::replay::Replay;
use crate::sched::types::{Ns, ResourceCounts, ResourceTotals, RESOURCES};

/// Per-resource makespans against the serial reference, plus the allocator
/// counters accumulated over one replay.
#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    pub placed: ResourceCounts,
    pub scheduled: ResourceTotals,
    pub serial: ResourceTotals,
    /// Finite idle time still open below each horizon.
    pub idle: ResourceTotals,
    pub reclaimed_slots: u64,
    pub dropped_fragments: u64,
}

impl ReplaySummary {
    pub fn new(replay: &Replay, serial: ResourceTotals) -> Self {
        let mut idle = ResourceTotals::default();
        let mut reclaimed_slots = 0;
        let mut dropped_fragments = 0;
        for resource in RESOURCES {
            let timeline = replay.timeline(resource);
            *idle.get_mut(resource) = timeline.idle_total();
            reclaimed_slots += timeline.reclaimed();
            dropped_fragments += timeline.dropped();
        }
        ReplaySummary {
            placed: replay.placed(),
            scheduled: replay.makespans(),
            serial,
            idle,
            reclaimed_slots,
            dropped_fragments,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)
            .context("cannot serialize replay summary")?;
        fs::write(path, payload)
            .with_context(|| format!("cannot write report to {}", path.display()))
    }
}

fn speedup(serial: Ns, scheduled: Ns) -> Option<f64> {
    (scheduled > 0.0).then(|| serial / scheduled)
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "replayed {} records", self.placed.total())?;
        writeln!(
            f,
            "{:<8} {:>8} {:>18} {:>18} {:>9}",
            "resource", "placed", "scheduled (ns)", "serial (ns)", "speedup"
        )?;
        for resource in RESOURCES {
            let scheduled = self.scheduled.get(resource);
            let serial = self.serial.get(resource);
            let ratio = match speedup(serial, scheduled) {
                Some(value) => format!("{:.2}", value),
                None => "-".to_string(),
            };
            writeln!(
                f,
                "{:<8} {:>8} {:>18.2} {:>18.2} {:>9}",
                resource.to_string(),
                self.placed.get(resource),
                scheduled,
                serial,
                ratio
            )?;
        }
        writeln!(
            f,
            "idle below horizon: compute {:.2} ns, pcie {:.2} ns, hbm {:.2} ns",
            self.idle.compute, self.idle.pcie, self.idle.hbm
        )?;
        write!(
            f,
            "reused idle slots: {}, dropped fragments: {}",
            self.reclaimed_slots, self.dropped_fragments
        )
    }
}

/// Render every timeline's surviving free intervals, tail included.
pub fn render_gaps(replay: &Replay) -> String {
    use fmt::Write;

    let mut out = String::new();
    for resource in RESOURCES {
        let timeline = replay.timeline(resource);
        let _ = writeln!(out, "{} free intervals:", timeline.name());
        for gap in timeline.gaps() {
            let _ = writeln!(out, "  {}", gap);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::replay::Replay;
    use crate::sim::config::LatencyConfig;
    use crate::trace::reader::parse_record;

    fn run_summary(lines: &[&str]) -> (Replay, ReplaySummary) {
        let latency = LatencyConfig::default();
        let records: Vec<_> = lines
            .iter()
            .map(|line| parse_record(line).expect("record"))
            .collect();
        let mut replay = Replay::new(&latency);
        replay.run(&records).expect("replay");
        let serial = crate::sched::baseline::serial_totals(&records, &latency);
        let summary = ReplaySummary::new(&replay, serial);
        (replay, summary)
    }

    #[test]
    fn summary_carries_counts_and_totals() {
        let (_, summary) = run_summary(&["C, Add, a, b, 0", "C, Add, a, c, 0"]);
        assert_eq!(2, summary.placed.total());
        assert_eq!(2, summary.placed.compute);
        assert_eq!(summary.serial.compute, summary.scheduled.compute);
        assert_eq!(0.0, summary.scheduled.pcie);
    }

    #[test]
    fn display_lists_every_resource() {
        let (_, summary) = run_summary(&["D, PCIE, a, b"]);
        let text = summary.to_string();
        assert!(text.contains("compute"));
        assert!(text.contains("pcie"));
        assert!(text.contains("hbm"));
        assert!(text.contains("speedup"));
    }

    #[test]
    fn zero_horizon_renders_a_dash() {
        let (_, summary) = run_summary(&["D, PCIE, a, b"]);
        assert_eq!(None, speedup(summary.serial.compute, summary.scheduled.compute));
        assert!(summary.to_string().contains('-'));
    }

    #[test]
    fn gap_dump_names_each_timeline() {
        let (replay, _) = run_summary(&["D, HBM, a, b", "C, Add, c, a, 0"]);
        let dump = render_gaps(&replay);
        assert!(dump.contains("compute free intervals:"));
        assert!(dump.contains("pcie free intervals:"));
        assert!(dump.contains("hbm free intervals:"));
        assert!(dump.contains("inf"));
    }
}
