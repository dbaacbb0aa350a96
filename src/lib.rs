pub mod sched;
pub mod sim;
pub mod trace;
