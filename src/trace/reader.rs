use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use phf::phf_map;

use crate::trace::record::{Addr, Channel, ComputeOp, TraceRecord};

static COMPUTE_OPS: phf::Map<&'static str, ComputeOp> = phf_map! {
    "NTT" => ComputeOp::Ntt,
    "INTT" => ComputeOp::Intt,
    "Auto" => ComputeOp::Auto,
    "Add" => ComputeOp::Add,
    "Mult" => ComputeOp::Mult,
    "Sub" => ComputeOp::Sub,
    "Bconvup" => ComputeOp::BconvUp,
    "Bconvdown" => ComputeOp::BconvDown,
};

static CHANNELS: phf::Map<&'static str, Channel> = phf_map! {
    "PCIE" => Channel::Pcie,
    "HBM" => Channel::Hbm,
    "SRAM" => Channel::Sram,
};

/// Read a whole trace file into memory. Blank lines are skipped. Any
/// malformed line aborts the read with its location: a silently dropped
/// record would leave every later ready time wrong.
pub fn read_trace(path: &Path) -> Result<Vec<TraceRecord>> {
    let file = File::open(path)
        .with_context(|| format!("cannot open trace file {}", path.display()))?;
    read_records(BufReader::new(file))
        .with_context(|| format!("in trace file {}", path.display()))
}

pub fn read_records(reader: impl BufRead) -> Result<Vec<TraceRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record =
            parse_record(&line).with_context(|| format!("line {}", idx + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Parse one record line, either `D, <channel>, <src>, <dst>` or
/// `C, <op>, <out>, <in1>, <in2>` with `0` marking an absent input.
/// Whitespace around fields is ignored, extra trailing fields too.
pub fn parse_record(line: &str) -> Result<TraceRecord> {
    let mut fields = line.split(',').map(str::trim);
    let tag = fields.next().unwrap_or_default();
    match tag {
        "D" => {
            let name = field(&mut fields, "channel")?;
            let channel = *CHANNELS
                .get(name)
                .ok_or_else(|| anyhow!("unknown channel '{}'", name))?;
            let src = field(&mut fields, "src address")?.to_string();
            let dst = field(&mut fields, "dst address")?.to_string();
            Ok(TraceRecord::Transfer { channel, src, dst })
        }
        "C" => {
            let name = field(&mut fields, "op")?;
            let op = *COMPUTE_OPS
                .get(name)
                .ok_or_else(|| anyhow!("unknown compute op '{}'", name))?;
            let out = field(&mut fields, "out address")?.to_string();
            let in1 = operand(field(&mut fields, "first input")?);
            let in2 = operand(field(&mut fields, "second input")?);
            Ok(TraceRecord::Compute { op, out, in1, in2 })
        }
        other => bail!("unknown record tag '{}'", other),
    }
}

fn field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<&'a str> {
    match fields.next() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => bail!("missing {} field", name),
    }
}

// `0` is the absent-operand sentinel, never a real address.
fn operand(token: &str) -> Option<Addr> {
    (token != "0").then(|| token.to_string())
}

/// Write records back out in the line format `read_trace` accepts.
pub fn write_trace(path: &Path, records: &[TraceRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create trace file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    // a dropped BufWriter swallows flush errors
    writer
        .flush()
        .with_context(|| format!("cannot write trace file {}", path.display()))
}
