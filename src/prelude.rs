//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use colindar::prelude::*;
//! ```

pub use crate::config::MinerConfig;
pub use crate::error::{MinerError, MinerResult};
pub use crate::feature::{Colocation, FeatureId, FeatureSpace};
pub use crate::grid::GridIndex;
pub use crate::instance::{SpatialDataset, SpatialInstance};
pub use crate::miner::{
    CancelToken, ColocationMiner, InstanceTable, MiningOutcome, MiningStats,
};
pub use crate::neighborhood::NeighborhoodMap;
pub use crate::nrtree::NRTree;
pub use crate::report::MiningReport;
