use crate::sched::types::ResourceTotals;
use crate::sim::config::LatencyConfig;
use crate::trace::record::TraceRecord;

/// Sum every record's latency onto its resource, in trace order, ignoring
/// dependencies and idle gaps entirely. This is the fully serial reference
/// the scheduled makespans are measured against.
pub fn serial_totals(records: &[TraceRecord], latency: &LatencyConfig) -> ResourceTotals {
    let mut totals = ResourceTotals::default();
    for record in records {
        *totals.get_mut(record.resource()) += latency.duration_of(record);
    }
    totals
}
