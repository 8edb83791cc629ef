//! Grid-partitioned spatial join.
//!
//! Partitions the bounding box into square cells with side equal to the
//! neighbor distance, so any two instances within distance `d` of each other
//! sit in the same cell or in adjacent cells. Each unordered cell pair is
//! visited exactly once: a cell is compared against itself and against its
//! four forward neighbors `(+1,−1), (+1,0), (+1,+1), (0,+1)`.

use crate::error::{MinerError, MinerResult};
use crate::feature::FeatureSpace;
use crate::instance::SpatialDataset;

/// An unordered pair of instance indices with distinct feature types within
/// the neighbor distance. Each pair is emitted once, in either order.
pub type NeighborPair = (usize, usize);

/// Grid index over the dataset's bounding box.
#[derive(Debug, Clone)]
pub struct GridIndex {
    distance: f64,
}

impl GridIndex {
    /// Creates a grid index with the given neighbor distance.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::ConfigInvalid`] for a non-finite or
    /// non-positive distance.
    pub fn new(distance: f64) -> MinerResult<Self> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(MinerError::ConfigInvalid {
                field: "neighborDistance".to_string(),
                value: distance.to_string(),
                constraint: "must be a finite number > 0".to_string(),
            });
        }
        Ok(Self { distance })
    }

    /// The neighbor distance threshold.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Enumerates every cross-type neighbor pair in the dataset.
    ///
    /// Output order is not part of the contract; downstream construction
    /// canonicalizes. No duplicates, no self pairs, no same-type pairs.
    #[must_use]
    pub fn neighbor_pairs(
        &self,
        dataset: &SpatialDataset,
        space: &FeatureSpace,
    ) -> Vec<NeighborPair> {
        let mut pairs = Vec::new();
        if dataset.is_empty() {
            return pairs;
        }

        let d = self.distance;
        let instances = dataset.instances();
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for inst in instances {
            min_x = min_x.min(inst.x);
            min_y = min_y.min(inst.y);
            max_x = max_x.max(inst.x);
            max_y = max_y.max(inst.y);
        }

        let cells_x = (((max_x - min_x) / d).ceil() as usize).max(1);
        let cells_y = (((max_y - min_y) / d).ceil() as usize).max(1);

        let mut cells: Vec<Vec<usize>> = vec![Vec::new(); cells_x * cells_y];
        for (idx, inst) in instances.iter().enumerate() {
            let cx = (((inst.x - min_x) / d) as usize).min(cells_x - 1);
            let cy = (((inst.y - min_y) / d) as usize).min(cells_y - 1);
            cells[cx * cells_y + cy].push(idx);
        }

        // Forward neighbor cells; together with the intra-cell pass this
        // visits each unordered cell pair exactly once.
        const FORWARD: [(isize, isize); 4] = [(1, -1), (1, 0), (1, 1), (0, 1)];

        for cx in 0..cells_x {
            for cy in 0..cells_y {
                let cell = &cells[cx * cells_y + cy];

                for (i, &a) in cell.iter().enumerate() {
                    for &b in &cell[i + 1..] {
                        self.try_emit(dataset, space, a, b, &mut pairs);
                    }
                }

                for (dx, dy) in FORWARD {
                    let nx = cx as isize + dx;
                    let ny = cy as isize + dy;
                    if nx < 0 || ny < 0 || nx as usize >= cells_x || ny as usize >= cells_y {
                        continue;
                    }
                    let neighbor_cell = &cells[nx as usize * cells_y + ny as usize];
                    for &a in cell {
                        for &b in neighbor_cell {
                            self.try_emit(dataset, space, a, b, &mut pairs);
                        }
                    }
                }
            }
        }

        pairs
    }

    fn try_emit(
        &self,
        dataset: &SpatialDataset,
        space: &FeatureSpace,
        a: usize,
        b: usize,
        pairs: &mut Vec<NeighborPair>,
    ) {
        if space.feature_of(a) == space.feature_of(b) {
            return;
        }
        if euclidean_distance(dataset, a, b) <= self.distance {
            pairs.push((a, b));
        }
    }
}

/// Euclidean distance between two instances of the dataset.
#[must_use]
pub fn euclidean_distance(dataset: &SpatialDataset, a: usize, b: usize) -> f64 {
    let ia = dataset.get(a);
    let ib = dataset.get(b);
    let dx = ia.x - ib.x;
    let dy = ia.y - ib.y;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::SpatialInstance;
    use std::collections::BTreeSet;

    fn dataset(specs: &[(&str, &str, f64, f64)]) -> (SpatialDataset, FeatureSpace) {
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
        (ds, space)
    }

    /// Canonicalizes pairs to id strings for order-insensitive comparison.
    fn canonical(pairs: &[NeighborPair], ds: &SpatialDataset) -> BTreeSet<(String, String)> {
        pairs
            .iter()
            .map(|&(a, b)| {
                let ia = ds.get(a).id.clone();
                let ib = ds.get(b).id.clone();
                if ia <= ib {
                    (ia, ib)
                } else {
                    (ib, ia)
                }
            })
            .collect()
    }

    #[test]
    fn test_rejects_non_positive_distance() {
        assert!(GridIndex::new(0.0).is_err());
        assert!(GridIndex::new(-1.0).is_err());
        assert!(GridIndex::new(f64::NAN).is_err());
        assert!(GridIndex::new(2.0).is_ok());
    }

    #[test]
    fn test_empty_dataset_yields_no_pairs() {
        let (ds, space) = dataset(&[]);
        let grid = GridIndex::new(1.0).expect("valid distance");
        assert!(grid.neighbor_pairs(&ds, &space).is_empty());
    }

    #[test]
    fn test_two_clusters() {
        // Two A-B pairs far apart; no cross-cluster pairs.
        let (ds, space) = dataset(&[
            ("A1", "A", 0.0, 0.0),
            ("B1", "B", 1.0, 0.0),
            ("A2", "A", 10.0, 10.0),
            ("B2", "B", 10.0, 11.0),
        ]);
        let grid = GridIndex::new(2.0).expect("valid distance");

        let found = canonical(&grid.neighbor_pairs(&ds, &space), &ds);
        let expected: BTreeSet<_> = [
            ("A1".to_string(), "B1".to_string()),
            ("A2".to_string(), "B2".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_same_type_pairs_are_excluded() {
        let (ds, space) = dataset(&[
            ("A1", "A", 0.0, 0.0),
            ("A2", "A", 0.1, 0.0),
            ("B1", "B", 0.2, 0.0),
        ]);
        let grid = GridIndex::new(1.0).expect("valid distance");

        let found = canonical(&grid.neighbor_pairs(&ds, &space), &ds);
        let expected: BTreeSet<_> = [
            ("A1".to_string(), "B1".to_string()),
            ("A2".to_string(), "B1".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_distance_boundary_is_inclusive() {
        let (ds, space) = dataset(&[("A1", "A", 0.0, 0.0), ("B1", "B", 2.0, 0.0)]);
        let grid = GridIndex::new(2.0).expect("valid distance");
        assert_eq!(grid.neighbor_pairs(&ds, &space).len(), 1);

        let (ds, space) = dataset(&[("A1", "A", 0.0, 0.0), ("B1", "B", 2.0001, 0.0)]);
        assert!(grid.neighbor_pairs(&ds, &space).is_empty());
    }

    #[test]
    fn test_all_instances_colocated() {
        // Degenerate bounding box: single cell, quadratic intra-cell scan.
        let (ds, space) = dataset(&[
            ("A1", "A", 5.0, 5.0),
            ("B1", "B", 5.0, 5.0),
            ("C1", "C", 5.0, 5.0),
        ]);
        let grid = GridIndex::new(1.0).expect("valid distance");
        assert_eq!(grid.neighbor_pairs(&ds, &space).len(), 3);
    }

    #[test]
    fn test_no_duplicate_pairs_across_cell_boundaries() {
        // E and F stretch the bounding box to [0,2]², so the grid has 2x2
        // cells with boundaries at 1.0 and the four center instances
        // straddle all four cells around the corner (1.0, 1.0).
        let (ds, space) = dataset(&[
            ("A1", "A", 0.95, 0.95),
            ("B1", "B", 1.05, 1.05),
            ("C1", "C", 1.05, 0.95),
            ("D1", "D", 0.95, 1.05),
            ("E1", "E", 0.0, 0.0),
            ("F1", "F", 2.0, 2.0),
        ]);
        let grid = GridIndex::new(1.0).expect("valid distance");

        let pairs = grid.neighbor_pairs(&ds, &space);
        let found = canonical(&pairs, &ds);
        // A, B, C, D are mutually within distance 1; E and F reach nothing.
        assert_eq!(pairs.len(), 6);
        assert_eq!(found.len(), 6);
    }

    #[test]
    fn test_pairs_independent_of_instance_order() {
        let forward = &[
            ("A1", "A", 0.0, 0.0),
            ("B1", "B", 0.5, 0.5),
            ("C1", "C", 3.0, 3.0),
            ("B2", "B", 3.4, 3.0),
        ];
        let mut reversed = forward.to_vec();
        reversed.reverse();

        let (ds1, space1) = dataset(forward);
        let (ds2, space2) = dataset(&reversed);
        let grid = GridIndex::new(1.0).expect("valid distance");

        assert_eq!(
            canonical(&grid.neighbor_pairs(&ds1, &space1), &ds1),
            canonical(&grid.neighbor_pairs(&ds2, &space2), &ds2)
        );
    }
}
