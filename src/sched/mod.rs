pub mod baseline;
pub mod replay;
pub mod scoreboard;
pub mod timeline;
pub mod types;

mod unit_tests;

pub use replay::Replay;
pub use scoreboard::Scoreboard;
pub use timeline::{Gap, Timeline};
pub use types::{Ns, Placement, Resource, ResourceCounts, ResourceTotals, Slot, RESOURCES};
