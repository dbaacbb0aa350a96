use std::collections::HashMap;

use crate::sched::types::Ns;
use crate::trace::record::TraceRecord;

/// Tracks, per memory address, the time its contents settle. An address
/// never seen before is ready at time 0: it holds an initial input with no
/// producer in the trace. Entries are overwritten on every placement that
/// references the address and never removed. Reads overwrite too: access to
/// a polynomial is serialized, not shared.
#[derive(Debug, Default)]
pub struct Scoreboard {
    ready: HashMap<String, Ns>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Scoreboard::default()
    }

    /// Earliest time every address `record` references is available.
    pub fn ready_time(&self, record: &TraceRecord) -> Ns {
        record
            .addrs()
            .iter()
            .map(|addr| self.addr_ready(addr))
            .fold(0.0, Ns::max)
    }

    /// Availability of a single address.
    pub fn addr_ready(&self, addr: &str) -> Ns {
        self.ready.get(addr).copied().unwrap_or(0.0)
    }

    /// Mark every address `record` references busy until `finish`.
    pub fn commit(&mut self, record: &TraceRecord, finish: Ns) {
        for addr in record.addrs() {
            self.ready.insert(addr.to_string(), finish);
        }
    }

    /// Number of addresses seen so far.
    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }
}
