use anyhow::Result;
use log::debug;

use crate::sched::scoreboard::Scoreboard;
use crate::sched::timeline::Timeline;
use crate::sched::types::{Placement, Resource, ResourceCounts, ResourceTotals};
use crate::sim::config::LatencyConfig;
use crate::trace::record::TraceRecord;

/// Replays a trace against one compute timeline and two transfer timelines,
/// placing each record at the earliest slot its operands and its resource
/// allow. Placements are final; there is no rollback or reordering of the
/// input stream itself, only backfilling into earlier idle gaps.
pub struct Replay {
    latency: LatencyConfig,
    scoreboard: Scoreboard,
    compute: Timeline,
    pcie: Timeline,
    hbm: Timeline,
}

impl Replay {
    pub fn new(latency: &LatencyConfig) -> Self {
        Replay {
            latency: *latency,
            scoreboard: Scoreboard::new(),
            compute: Timeline::new("compute", latency.reuse_floor(Resource::Compute)),
            pcie: Timeline::new("pcie", latency.reuse_floor(Resource::Pcie)),
            hbm: Timeline::new("hbm", latency.reuse_floor(Resource::Hbm)),
        }
    }

    /// Schedule one record and mark its addresses busy until it finishes.
    pub fn step(&mut self, record: &TraceRecord) -> Result<Placement> {
        let resource = record.resource();
        let ready = self.scoreboard.ready_time(record);
        let duration = self.latency.duration_of(record);
        let slot = self.timeline_mut(resource).place(ready, duration)?;
        self.scoreboard.commit(record, slot.end);
        debug!(
            "{} -> {} [{:.2}, {:.2}) ready {:.2}",
            record, resource, slot.start, slot.end, ready
        );
        Ok(Placement { resource, ready, slot })
    }

    /// Replay the whole trace in recorded order.
    pub fn run(&mut self, records: &[TraceRecord]) -> Result<()> {
        for record in records {
            self.step(record)?;
        }
        Ok(())
    }

    /// Per-resource end of the last placed slot: the scheduled makespans.
    pub fn makespans(&self) -> ResourceTotals {
        ResourceTotals {
            compute: self.compute.horizon(),
            pcie: self.pcie.horizon(),
            hbm: self.hbm.horizon(),
        }
    }

    pub fn timeline(&self, resource: Resource) -> &Timeline {
        match resource {
            Resource::Compute => &self.compute,
            Resource::Pcie => &self.pcie,
            Resource::Hbm => &self.hbm,
        }
    }

    fn timeline_mut(&mut self, resource: Resource) -> &mut Timeline {
        match resource {
            Resource::Compute => &mut self.compute,
            Resource::Pcie => &mut self.pcie,
            Resource::Hbm => &mut self.hbm,
        }
    }

    /// Records placed so far, per resource.
    pub fn placed(&self) -> ResourceCounts {
        ResourceCounts {
            compute: self.compute.placements(),
            pcie: self.pcie.placements(),
            hbm: self.hbm.placements(),
        }
    }
}
