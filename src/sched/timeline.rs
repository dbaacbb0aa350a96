/*
Free-interval timeline for one shared resource.

The replay scheduler models each resource (compute engine, PCIE channel, the
combined HBM/SRAM channel) as an ordered list of disjoint idle intervals.
Placing an operation claims the earliest interval that can host it and splits
that interval around the claimed span. One open-ended tail interval always
covers everything after the last placement; its start is the resource horizon.

Split remainders shorter than the timeline's floor are dropped instead of
kept: the floor is the shortest latency schedulable on the resource, so no
later operation could fit in them, and dropping them keeps the free list
bounded by the number of placements.
*/

use std::fmt::{Display, Formatter};

use anyhow::{bail, Result};

use crate::sched::types::{Ns, Slot};

/// A maximal idle span on one resource's timeline. The single tail interval
/// is open-ended (`end` is +inf) and carries an explicit flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    start: Ns,
    end: Ns,
    tail: bool,
}

impl Gap {
    fn finite(start: Ns, end: Ns) -> Self {
        debug_assert!(start < end, "finite gap must have positive length");
        Gap { start, end, tail: false }
    }

    fn open_from(start: Ns) -> Self {
        Gap { start, end: f64::INFINITY, tail: true }
    }

    pub fn start(&self) -> Ns {
        self.start
    }

    pub fn end(&self) -> Ns {
        self.end
    }

    /// Idle length; +inf for the tail.
    pub fn len(&self) -> Ns {
        self.end - self.start
    }

    pub fn is_tail(&self) -> bool {
        self.tail
    }
}

impl Display for Gap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.2}, {:.2})", self.start, self.end)
    }
}

/// Free-interval registry for one resource.
pub struct Timeline {
    name: &'static str,
    /// Disjoint, ascending by `end`; the last element is always the tail.
    gaps: Vec<Gap>,
    /// Shortest latency schedulable on this resource.
    floor: Ns,
    placements: u64,
    reclaimed: u64,
    dropped: u64,
}

impl Timeline {
    pub fn new(name: &'static str, floor: Ns) -> Self {
        assert!(floor > 0.0, "fragmentation floor must be > 0");
        Timeline {
            name,
            gaps: vec![Gap::open_from(0.0)],
            floor,
            placements: 0,
            reclaimed: 0,
            dropped: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Time immediately after the last placed operation: the tail's start.
    pub fn horizon(&self) -> Ns {
        self.gaps.last().expect("timeline lost its tail").start
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    /// Total reusable idle time below the horizon.
    pub fn idle_total(&self) -> Ns {
        self.gaps.iter().filter(|gap| !gap.tail).map(Gap::len).sum()
    }

    /// Operations placed on this timeline so far.
    pub fn placements(&self) -> u64 {
        self.placements
    }

    /// Placements that landed in a finite gap below the horizon.
    pub fn reclaimed(&self) -> u64 {
        self.reclaimed
    }

    /// Split remainders dropped for being shorter than the floor.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Place one operation that becomes ready at `ready` and runs for
    /// `duration`, at the earliest feasible time. Scans candidate intervals
    /// in ascending end order, starting from the first interval still open
    /// at the ready time; too-short candidates are skipped, never fatal.
    /// The tail interval hosts anything, so running off the end of the scan
    /// means the free list lost its tail.
    pub fn place(&mut self, ready: Ns, duration: Ns) -> Result<Slot> {
        assert!(duration > 0.0, "operation duration must be > 0");
        assert!(ready >= 0.0, "ready time must be >= 0");

        let from = self.gaps.partition_point(|gap| gap.end < ready);
        for idx in from..self.gaps.len() {
            let gap = self.gaps[idx];
            let start = ready.max(gap.start);
            // The whole run must fit between the effective start and the
            // gap's end; the tail's infinite end always fits.
            if gap.end - start < duration {
                continue;
            }
            let slot = Slot { start, end: start + duration };
            if gap.tail {
                self.gaps[idx] = Gap::open_from(slot.end);
                self.keep_remainder(idx, gap.start, slot.start);
            } else {
                self.gaps.remove(idx);
                self.keep_remainder(idx, slot.end, gap.end);
                self.keep_remainder(idx, gap.start, slot.start);
                self.reclaimed += 1;
            }
            self.placements += 1;
            return Ok(slot);
        }
        bail!(
            "{} timeline has no interval for ready={} duration={}; tail invariant broken",
            self.name,
            ready,
            duration
        );
    }

    // Reinsert [start, end) at `idx`, unless it is shorter than the floor
    // and therefore unusable by any future operation on this resource.
    fn keep_remainder(&mut self, idx: usize, start: Ns, end: Ns) {
        if end - start >= self.floor {
            self.gaps.insert(idx, Gap::finite(start, end));
        } else if end > start {
            self.dropped += 1;
        }
    }
}
