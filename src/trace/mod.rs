pub mod reader;
pub mod record;
pub mod synth;

pub use reader::{parse_record, read_trace, write_trace};
pub use record::{Addr, Channel, ComputeOp, TraceRecord};
