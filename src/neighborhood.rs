//! Ordered star neighborhoods.
//!
//! Each undirected cross-type neighbor pair is attached to exactly one star:
//! the one centered at the endpoint whose feature type comes first in the
//! rarity order. A center therefore only ever lists neighbors of types that
//! strictly follow its own, which halves the structure and lets row
//! extension consult only the "upward" half of each star.

use crate::feature::{FeatureId, FeatureSpace};
use crate::grid::NeighborPair;
use crate::instance::SpatialDataset;
use std::collections::{BTreeMap, HashMap};

/// The ordered star of one center instance: neighbors grouped by feature
/// type, restricted to types after the center's in rarity order.
#[derive(Debug, Clone)]
pub struct OrderedStar {
    /// Index of the center instance.
    pub center: usize,
    /// Neighbor instance indices per feature type, each list sorted by
    /// instance id and deduplicated.
    neighbors: BTreeMap<FeatureId, Vec<usize>>,
}

impl OrderedStar {
    fn new(center: usize) -> Self {
        Self {
            center,
            neighbors: BTreeMap::new(),
        }
    }

    /// Neighbor feature types present in this star, in rarity order.
    pub fn neighbor_features(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.neighbors.keys().copied()
    }

    /// Neighbors of the given feature type, or an empty slice.
    #[must_use]
    pub fn neighbors_of(&self, feature: FeatureId) -> &[usize] {
        self.neighbors.get(&feature).map_or(&[], Vec::as_slice)
    }
}

/// All ordered stars, grouped by center feature type.
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodMap {
    stars: BTreeMap<FeatureId, Vec<OrderedStar>>,
}

impl NeighborhoodMap {
    /// Builds the ordered stars from the grid join output.
    ///
    /// For each pair the neighbor is appended to the star of the
    /// rarer-typed endpoint only. Same-type pairs cannot occur in the grid
    /// output and are skipped defensively.
    #[must_use]
    pub fn from_pairs(
        pairs: &[NeighborPair],
        dataset: &SpatialDataset,
        space: &FeatureSpace,
    ) -> Self {
        let mut by_center: HashMap<usize, OrderedStar> = HashMap::new();

        for &(a, b) in pairs {
            let fa = space.feature_of(a);
            let fb = space.feature_of(b);
            let (center, neighbor, neighbor_feature) = if fa < fb {
                (a, b, fb)
            } else if fb < fa {
                (b, a, fa)
            } else {
                continue;
            };

            by_center
                .entry(center)
                .or_insert_with(|| OrderedStar::new(center))
                .neighbors
                .entry(neighbor_feature)
                .or_default()
                .push(neighbor);
        }

        let mut stars: BTreeMap<FeatureId, Vec<OrderedStar>> = BTreeMap::new();
        for (center, mut star) in by_center {
            for list in star.neighbors.values_mut() {
                list.sort_by(|&a, &b| dataset.get(a).id.cmp(&dataset.get(b).id));
                list.dedup();
            }
            stars
                .entry(space.feature_of(center))
                .or_default()
                .push(star);
        }
        for bucket in stars.values_mut() {
            bucket.sort_by(|a, b| dataset.get(a.center).id.cmp(&dataset.get(b.center).id));
        }

        Self { stars }
    }

    /// Center feature types that have at least one star, in rarity order.
    pub fn features(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.stars.keys().copied()
    }

    /// Stars centered on instances of the given feature type, sorted by
    /// center instance id.
    #[must_use]
    pub fn stars_of(&self, feature: FeatureId) -> &[OrderedStar] {
        self.stars.get(&feature).map_or(&[], Vec::as_slice)
    }

    /// Total number of stars.
    #[must_use]
    pub fn star_count(&self) -> usize {
        self.stars.values().map(Vec::len).sum()
    }
}
