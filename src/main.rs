use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use toml::Table;

use polyflow::sched::baseline::serial_totals;
use polyflow::sched::replay::Replay;
use polyflow::sim::config::{Config, LatencyConfig, SimConfig};
use polyflow::sim::report::{render_gaps, ReplaySummary};
use polyflow::trace::reader::{read_trace, write_trace};
use polyflow::trace::synth::{self, SynthConfig};

#[derive(Parser)]
#[command(version, about)]
struct PolyflowArgs {
    #[arg(help = "Path to config.toml")]
    config_path: Option<PathBuf>,
    #[arg(long, help = "Override trace file path")]
    trace: Option<PathBuf>,
    #[arg(long, help = "Write the summary as JSON to this path")]
    report_json: Option<PathBuf>,
    #[arg(long, help = "Print surviving free intervals after the replay")]
    dump_gaps: bool,
    #[arg(long, help = "Replay a synthetic trace with this many records")]
    synth: Option<usize>,
    #[arg(long, help = "Override the synthetic trace seed")]
    seed: Option<u64>,
    #[arg(long, help = "Also write the synthetic trace to this path")]
    synth_out: Option<PathBuf>,
}

// --seed and --synth-out shape synthetic generation only
fn synth_flags_ignored(argv: &PolyflowArgs) -> bool {
    argv.synth.is_none() && (argv.seed.is_some() || argv.synth_out.is_some())
}

pub fn main() -> Result<()> {
    env_logger::init();

    let argv = PolyflowArgs::parse();
    let (mut sim_config, latency, mut synth_config) = match &argv.config_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let table: Table = toml::from_str(&text).context("cannot parse config toml")?;
            (
                SimConfig::from_section(table.get("sim")),
                LatencyConfig::from_section(table.get("latency")),
                SynthConfig::from_section(table.get("synth")),
            )
        }
        None => (
            SimConfig::default(),
            LatencyConfig::default(),
            SynthConfig::default(),
        ),
    };
    latency.validate()?;

    if synth_flags_ignored(&argv) {
        warn!("--seed and --synth-out have no effect without --synth");
    }

    // override toml configs with argv
    sim_config.trace = argv.trace.unwrap_or(sim_config.trace);
    sim_config.report_json = argv.report_json.or(sim_config.report_json);
    sim_config.dump_gaps = argv.dump_gaps || sim_config.dump_gaps;
    synth_config.records = argv.synth.unwrap_or(synth_config.records);
    synth_config.seed = argv.seed.unwrap_or(synth_config.seed);

    let records = if argv.synth.is_some() {
        let records = synth::generate(&synth_config);
        info!(
            "generated {} synthetic records (seed {})",
            records.len(),
            synth_config.seed
        );
        if let Some(path) = &argv.synth_out {
            write_trace(path, &records)?;
            info!("synthetic trace written to {}", path.display());
        }
        records
    } else {
        if sim_config.trace.as_os_str().is_empty() {
            bail!("no trace to replay: pass --trace, set [sim] trace in the config, or use --synth");
        }
        read_trace(&sim_config.trace)?
    };
    info!("replaying {} records", records.len());

    let mut replay = Replay::new(&latency);
    replay.run(&records)?;
    let serial = serial_totals(&records, &latency);
    let summary = ReplaySummary::new(&replay, serial);

    println!("{}", summary);
    if sim_config.dump_gaps {
        print!("{}", render_gaps(&replay));
    }
    if let Some(path) = &sim_config.report_json {
        summary.write_json(path)?;
        info!("summary written to {}", path.display());
    }
    Ok(())
}
