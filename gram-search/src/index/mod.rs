pub mod bwt;
pub mod fm;
pub mod monitor;
pub mod ranks;
pub mod sa;

pub use fm::{FmIndex, IndexMeta, MarkerHit, SaInterval, FIRST_MARKER};
pub use monitor::{ConstructionMonitor, MemoryLog, NullMonitor};
pub use ranks::DnaRank;

/// Occ 采样块大小
pub const DEFAULT_OCC_BLOCK: usize = 64;
