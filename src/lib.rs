//! Colindar: rarity-weighted spatial co-location pattern mining.
//!
//! Given georeferenced instances labeled with feature types, colindar
//! discovers sets of feature types whose instances repeatedly appear
//! within a neighbor distance, reporting the sets whose weighted
//! participation index clears a prevalence threshold. Rarity weighting
//! keeps patterns anchored on scarce features from being drowned out by
//! the participation ratios of common ones.
//!
//! # Pipeline
//!
//! 1. [`grid::GridIndex`] joins instances into cross-type neighbor pairs;
//! 2. [`neighborhood::NeighborhoodMap`] groups each instance's neighbors
//!    into rarity-directed ordered stars;
//! 3. [`nrtree::NRTree`] indexes the stars for bounded-step neighbor
//!    lookup;
//! 4. [`miner::ColocationMiner`] runs the level-wise search: Apriori join,
//!    lemma pruning, joinless row extension, WPI selection.
//!
//! # Quick Start
//!
//! ```
//! use colindar::prelude::*;
//!
//! let instances = vec![
//!     SpatialInstance { id: "A1".into(), feature: "A".into(), x: 0.0, y: 0.0 },
//!     SpatialInstance { id: "B1".into(), feature: "B".into(), x: 1.0, y: 0.0 },
//!     SpatialInstance { id: "A2".into(), feature: "A".into(), x: 10.0, y: 10.0 },
//!     SpatialInstance { id: "B2".into(), feature: "B".into(), x: 10.0, y: 11.0 },
//! ];
//! let dataset = SpatialDataset::new(instances).unwrap();
//! let space = FeatureSpace::build(&dataset);
//! let pairs = GridIndex::new(2.0).unwrap().neighbor_pairs(&dataset, &space);
//! let map = NeighborhoodMap::from_pairs(&pairs, &dataset, &space);
//! let tree = NRTree::build(&map, &dataset, &space);
//!
//! let outcome = ColocationMiner::new(0.5).mine(&dataset, &space, &tree).unwrap();
//! assert_eq!(outcome.patterns[0].resolve(&space), vec!["A", "B"]);
//! ```

pub mod config;
pub mod error;
pub mod feature;
pub mod grid;
pub mod instance;
pub mod metrics;
pub mod miner;
pub mod neighborhood;
pub mod nrtree;
pub mod prelude;
pub mod report;

pub use config::MinerConfig;
pub use error::{MinerError, MinerResult};
pub use feature::{Colocation, FeatureId, FeatureSpace};
pub use instance::{SpatialDataset, SpatialInstance};
pub use miner::{CancelToken, ColocationMiner, MiningOutcome};
