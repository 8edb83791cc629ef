//! The ordered neighborhood-relation tree.
//!
//! A four-level index over the ordered stars:
//!
//! - level 1: one node per center feature type, in rarity order;
//! - level 2: one node per center instance of that type, sorted by id;
//! - level 3: one bucket per neighbor feature type in the center's star,
//!   in rarity order;
//! - level 4: the leaf list of neighbor instances of that type.
//!
//! Each level is its own struct, so a malformed shape cannot be
//! represented. Leaf lists are copied out of the [`NeighborhoodMap`] during
//! build; the tree is self-contained and read-only afterwards, safe to
//! share across threads.

use crate::feature::{FeatureId, FeatureSpace};
use crate::instance::SpatialDataset;
use crate::neighborhood::NeighborhoodMap;
use std::collections::HashMap;

/// Level-3/4 node: the neighbors of one feature type within one star.
#[derive(Debug, Clone)]
struct NeighborBucket {
    feature: FeatureId,
    /// Leaf list, sorted by instance id.
    instances: Vec<usize>,
}

/// Level-2 node: one center instance and its per-type neighbor buckets.
#[derive(Debug, Clone)]
struct CenterNode {
    /// Buckets in rarity order of their feature.
    buckets: Vec<NeighborBucket>,
}

/// Level-1 node: one center feature type and its centers.
#[derive(Debug, Clone)]
struct FeatureLevel {
    centers: Vec<CenterNode>,
    /// Center instance index -> position in `centers`.
    center_slots: HashMap<usize, usize>,
}

/// The frozen four-level tree.
#[derive(Debug, Clone)]
pub struct NRTree {
    /// Level-1 nodes indexed by feature rank; `None` for feature types with
    /// no stars.
    levels: Vec<Option<FeatureLevel>>,
    /// Feature id of every instance, copied from the feature space so that
    /// lookups are self-contained.
    instance_features: Vec<FeatureId>,
}

impl NRTree {
    /// Builds the tree by walking the map's features in rarity order, each
    /// feature's centers in id order, and each star's neighbor types in
    /// rarity order.
    #[must_use]
    pub fn build(
        map: &NeighborhoodMap,
        dataset: &SpatialDataset,
        space: &FeatureSpace,
    ) -> Self {
        let mut levels: Vec<Option<FeatureLevel>> = vec![None; space.len()];

        for feature in map.features() {
            let stars = map.stars_of(feature);
            let mut centers = Vec::with_capacity(stars.len());
            let mut center_slots = HashMap::with_capacity(stars.len());

            for star in stars {
                let buckets = star
                    .neighbor_features()
                    .map(|f| NeighborBucket {
                        feature: f,
                        instances: star.neighbors_of(f).to_vec(),
                    })
                    .collect();
                center_slots.insert(star.center, centers.len());
                centers.push(CenterNode { buckets });
            }

            levels[feature.0] = Some(FeatureLevel {
                centers,
                center_slots,
            });
        }

        Self {
            levels,
            instance_features: (0..dataset.len()).map(|i| space.feature_of(i)).collect(),
        }
    }

    /// Looks up `Neigh(instance, feature)`: the neighbors of `instance`
    /// bearing `feature`, or an empty slice when any level misses.
    ///
    /// Descends level 1 (the instance's feature) -> level 2 (the instance's
    /// center node) -> level 3 (the queried feature's bucket) -> level 4
    /// (the leaf list). Read-only; callable concurrently.
    #[must_use]
    pub fn neighbors(&self, instance: usize, feature: FeatureId) -> &[usize] {
        let Some(Some(level)) = self.levels.get(self.instance_features[instance].0) else {
            return &[];
        };
        let Some(&slot) = level.center_slots.get(&instance) else {
            return &[];
        };
        let center = &level.centers[slot];
        match center
            .buckets
            .binary_search_by_key(&feature, |bucket| bucket.feature)
        {
            Ok(pos) => &center.buckets[pos].instances,
            Err(_) => &[],
        }
    }

    /// Total number of center nodes across all features.
    #[must_use]
    pub fn center_count(&self) -> usize {
        self.levels
            .iter()
            .flatten()
            .map(|level| level.centers.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridIndex;
    use crate::instance::SpatialInstance;

    fn build_pipeline(
        specs: &[(&str, &str, f64, f64)],
        distance: f64,
    ) -> (SpatialDataset, FeatureSpace, NRTree) {
        let instances = specs
            .iter()
            .map(|(id, feature, x, y)| SpatialInstance {
                id: (*id).to_string(),
                feature: (*feature).to_string(),
                x: *x,
                y: *y,
            })
            .collect();
        let ds = SpatialDataset::new(instances).expect("valid dataset");
        let space = FeatureSpace::build(&ds);
        let pairs = GridIndex::new(distance)
            .expect("valid distance")
            .neighbor_pairs(&ds, &space);
        let map = NeighborhoodMap::from_pairs(&pairs, &ds, &space);
        let tree = NRTree::build(&map, &ds, &space);
        (ds, space, tree)
    }

    #[test]
    fn test_lookup_returns_upward_neighbors() {
        // Counts C:1, A:2, B:2; rarity order is C, A, B.
        let (_, space, tree) = build_pipeline(
            &[
                ("A1", "A", 0.0, 0.0),
                ("A2", "A", 5.0, 5.0),
                ("B1", "B", 0.5, 0.0),
                ("B2", "B", 5.0, 5.5),
                ("C1", "C", 0.0, 0.5),
            ],
            1.0,
        );
        let a = space.rank("A").unwrap();
        let b = space.rank("B").unwrap();

        // C1 (index 4) neighbors: A1 and B1.
        assert_eq!(tree.neighbors(4, a), &[0]);
        assert_eq!(tree.neighbors(4, b), &[2]);
    }

    #[test]
    fn test_lookup_misses_return_empty() {
        let (_, space, tree) = build_pipeline(
            &[
                ("A1", "A", 0.0, 0.0),
                ("A2", "A", 9.0, 9.0),
                ("B1", "B", 0.5, 0.0),
            ],
            1.0,
        );
        let a = space.rank("A").unwrap();
        let b = space.rank("B").unwrap();

        // A2 is isolated: no star at all.
        assert!(tree.neighbors(1, b).is_empty());
        // B:1 < A:2, so B1 centers A1 and A1 centers nothing.
        assert_eq!(tree.neighbors(2, a), &[0]);
        assert!(tree.neighbors(0, b).is_empty());
        // Queried feature absent from an existing star.
        assert!(tree.neighbors(2, b).is_empty());
    }

    #[test]
    fn test_leaf_lists_sorted_by_id() {
        let (_, space, tree) = build_pipeline(
            &[
                ("B1", "B", 0.0, 0.0),
                ("A3", "A", 0.1, 0.0),
                ("A1", "A", 0.2, 0.0),
                ("A2", "A", 0.3, 0.0),
            ],
            1.0,
        );
        let a = space.rank("A").unwrap();

        // B1 centers all three A's; leaf order follows ids A1, A2, A3.
        assert_eq!(tree.neighbors(0, a), &[2, 3, 1]);
    }

    #[test]
    fn test_center_count_matches_star_count() {
        let (_, _, tree) = build_pipeline(
            &[
                ("A1", "A", 0.0, 0.0),
                ("B1", "B", 0.5, 0.0),
                ("A2", "A", 10.0, 0.0),
                ("B2", "B", 10.5, 0.0),
            ],
            1.0,
        );
        // Counts tie at 2; A precedes B lexicographically, so A1 and A2
        // are the centers.
        assert_eq!(tree.center_count(), 2);
    }

    #[test]
    fn test_empty_tree() {
        let (_, space, tree) = build_pipeline(&[("A1", "A", 0.0, 0.0)], 1.0);
        assert_eq!(tree.center_count(), 0);
        assert_eq!(space.len(), 1);
        assert!(tree.neighbors(0, FeatureId(0)).is_empty());
    }
}
