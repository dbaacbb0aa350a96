use crate::sched::replay::Replay;
use crate::sched::scoreboard::Scoreboard;
use crate::sched::types::{Resource, ResourceCounts, ResourceTotals, Slot, RESOURCES};
use crate::sim::config::{ComputeLatency, LatencyConfig, TransferLatency};
use crate::trace::reader::parse_record;
use crate::trace::record::TraceRecord;
use crate::trace::synth::{self, SynthConfig};

fn test_latency() -> LatencyConfig {
    LatencyConfig {
        compute: ComputeLatency {
            ntt: 100.0,
            intt: 90.0,
            auto: 80.0,
            add: 10.0,
            mult: 20.0,
            sub: 5.0,
            bconv_up: 30.0,
            bconv_down: 40.0,
        },
        transfer: TransferLatency { pcie: 50.0, hbm: 20.0, sram: 5.0 },
    }
}

fn trace(lines: &[&str]) -> Vec<TraceRecord> {
    lines.iter().map(|line| parse_record(line).expect("record")).collect()
}

#[test]
fn dependent_adds_serialize_on_the_shared_output() {
    let records = trace(&["C, Add, a, b, 0", "C, Add, a, c, 0"]);
    let mut replay = Replay::new(&test_latency());

    let first = replay.step(&records[0]).unwrap();
    assert_eq!(Slot { start: 0.0, end: 10.0 }, first.slot);

    let second = replay.step(&records[1]).unwrap();
    assert_eq!(10.0, second.ready);
    assert_eq!(Slot { start: 10.0, end: 20.0 }, second.slot);
    assert_eq!(20.0, replay.makespans().compute);
}

#[test]
fn independent_transfers_overlap_across_resources() {
    let records = trace(&["D, PCIE, a, b", "D, HBM, c, d"]);
    let mut replay = Replay::new(&test_latency());

    let pcie = replay.step(&records[0]).unwrap();
    let hbm = replay.step(&records[1]).unwrap();
    assert_eq!(0.0, pcie.slot.start);
    assert_eq!(0.0, hbm.slot.start);
    assert_eq!(
        ResourceTotals { compute: 0.0, pcie: 50.0, hbm: 20.0 },
        replay.makespans()
    );
    assert_eq!(
        ResourceCounts { compute: 0, pcie: 1, hbm: 1 },
        replay.placed()
    );
}

#[test]
fn independent_compute_backfills_an_idle_gap() {
    // the Mult waits for the transfer, opening compute idle [0, 20); the
    // unrelated Add then lands at time 0 ahead of its recorded position
    let records = trace(&[
        "D, HBM, x, y",
        "C, Mult, z, y, 0",
        "C, Add, w, v, 0",
    ]);
    let mut replay = Replay::new(&test_latency());

    replay.step(&records[0]).unwrap();
    let mult = replay.step(&records[1]).unwrap();
    assert_eq!(Slot { start: 20.0, end: 40.0 }, mult.slot);

    let add = replay.step(&records[2]).unwrap();
    assert_eq!(Slot { start: 0.0, end: 10.0 }, add.slot);
    assert_eq!(40.0, replay.makespans().compute);

    let compute = replay.timeline(Resource::Compute);
    assert_eq!(1, compute.reclaimed());
    assert_eq!(2, compute.gaps().len());
    assert_eq!((10.0, 20.0), (compute.gaps()[0].start(), compute.gaps()[0].end()));
}

#[test]
fn dependencies_chain_across_resources() {
    let records = trace(&[
        "D, PCIE, a, b",
        "C, Add, c, a, 0",
        "D, SRAM, c, d",
    ]);
    let mut replay = Replay::new(&test_latency());
    replay.run(&records).unwrap();

    assert_eq!(
        ResourceTotals { compute: 60.0, pcie: 50.0, hbm: 65.0 },
        replay.makespans()
    );
    // the sram move could not start before the Add finished at 60
    let hbm = replay.timeline(Resource::Hbm);
    assert_eq!((0.0, 60.0), (hbm.gaps()[0].start(), hbm.gaps()[0].end()));
}

#[test]
fn hbm_and_sram_contend_for_one_port() {
    let records = trace(&["D, HBM, a, b", "D, SRAM, c, d"]);
    let mut replay = Replay::new(&test_latency());

    replay.step(&records[0]).unwrap();
    let sram = replay.step(&records[1]).unwrap();
    // independent data, but the port is busy until 20
    assert_eq!(Slot { start: 20.0, end: 25.0 }, sram.slot);
}

#[test]
fn empty_trace_leaves_all_horizons_at_zero() {
    let mut replay = Replay::new(&test_latency());
    replay.run(&[]).unwrap();
    assert_eq!(ResourceTotals::default(), replay.makespans());
    assert_eq!(0, replay.placed().total());
}

#[test]
fn synthetic_run_respects_dependencies_and_floors() {
    let latency = test_latency();
    let config = SynthConfig {
        records: 500,
        seed: 7,
        addr_pool: 32,
        transfer_share: 0.4,
    };
    let records = synth::generate(&config);

    let mut replay = Replay::new(&latency);
    let mut shadow = Scoreboard::new();
    let mut horizons = ResourceTotals::default();
    for record in &records {
        let expected_ready = shadow.ready_time(record);
        let placement = replay.step(record).expect("place");

        assert_eq!(expected_ready, placement.ready);
        assert!(placement.slot.start >= placement.ready);
        assert_eq!(
            placement.slot.start + latency.duration_of(record),
            placement.slot.end
        );

        let horizon = replay.timeline(placement.resource).horizon();
        assert!(horizon >= horizons.get(placement.resource));
        *horizons.get_mut(placement.resource) = horizon;

        shadow.commit(record, placement.slot.end);
    }

    for resource in RESOURCES {
        let timeline = replay.timeline(resource);
        let floor = latency.reuse_floor(resource);
        for gap in timeline.gaps() {
            if !gap.is_tail() {
                assert!(gap.len() >= floor, "kept fragment {} below floor {}", gap, floor);
            }
        }
    }
}

#[test]
fn synthetic_run_tiles_every_timeline() {
    // integer latencies with unit floors: no fragment is ever discarded, so
    // placed time plus idle time must account for each horizon exactly
    let latency = LatencyConfig {
        compute: ComputeLatency {
            ntt: 9.0,
            intt: 8.0,
            auto: 7.0,
            add: 3.0,
            mult: 4.0,
            sub: 1.0,
            bconv_up: 5.0,
            bconv_down: 6.0,
        },
        transfer: TransferLatency { pcie: 1.0, hbm: 2.0, sram: 1.0 },
    };
    let config = SynthConfig {
        records: 400,
        seed: 11,
        addr_pool: 16,
        transfer_share: 0.5,
    };

    let mut replay = Replay::new(&latency);
    let mut busy = ResourceTotals::default();
    for record in synth::generate(&config) {
        let placement = replay.step(&record).unwrap();
        *busy.get_mut(placement.resource) += placement.slot.end - placement.slot.start;
    }

    for resource in RESOURCES {
        let timeline = replay.timeline(resource);
        assert_eq!(0, timeline.dropped());
        assert_eq!(timeline.horizon(), busy.get(resource) + timeline.idle_total());
        for pair in timeline.gaps().windows(2) {
            assert!(pair[0].end() <= pair[1].start());
        }
        assert!(timeline.gaps().last().unwrap().is_tail());
    }
}
