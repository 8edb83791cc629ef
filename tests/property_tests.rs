//! Property-based tests for the mining pipeline.
//!
//! Uses proptest to verify order-independence, determinism, and the
//! structural invariants of reported patterns across many random inputs.

use colindar::grid::GridIndex;
use colindar::miner::ColocationMiner;
use colindar::neighborhood::NeighborhoodMap;
use colindar::nrtree::NRTree;
use colindar::{FeatureSpace, SpatialDataset, SpatialInstance};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Random instances over a compact area with up to four feature types.
/// Ids are unique by construction.
fn random_instances() -> impl Strategy<Value = Vec<SpatialInstance>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["A", "B", "C", "D"]),
            0.0..10.0f64,
            0.0..10.0f64,
        ),
        0..40,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (feature, x, y))| SpatialInstance {
                id: format!("{feature}{i}"),
                feature: feature.to_string(),
                x,
                y,
            })
            .collect()
    })
}

/// An instance vector together with a shuffled copy of itself.
fn instances_with_permutation(
) -> impl Strategy<Value = (Vec<SpatialInstance>, Vec<SpatialInstance>)> {
    random_instances().prop_flat_map(|original| {
        let shuffled = Just(original.clone()).prop_shuffle();
        (Just(original), shuffled)
    })
}

fn pipeline(instances: Vec<SpatialInstance>, distance: f64) -> (SpatialDataset, FeatureSpace, NRTree) {
    let dataset = SpatialDataset::new(instances).expect("generated ids are unique");
    let space = FeatureSpace::build(&dataset);
    let pairs = GridIndex::new(distance)
        .expect("distance is positive")
        .neighbor_pairs(&dataset, &space);
    let map = NeighborhoodMap::from_pairs(&pairs, &dataset, &space);
    let tree = NRTree::build(&map, &dataset, &space);
    (dataset, space, tree)
}

fn canonical_pairs(instances: &[SpatialInstance], distance: f64) -> BTreeSet<(String, String)> {
    let dataset = SpatialDataset::new(instances.to_vec()).expect("unique ids");
    let space = FeatureSpace::build(&dataset);
    let pairs = GridIndex::new(distance)
        .expect("distance is positive")
        .neighbor_pairs(&dataset, &space);
    pairs
        .into_iter()
        .map(|(a, b)| {
            let ia = dataset.get(a).id.clone();
            let ib = dataset.get(b).id.clone();
            if ia <= ib {
                (ia, ib)
            } else {
                (ib, ia)
            }
        })
        .collect()
}

fn mined_patterns(instances: Vec<SpatialInstance>, distance: f64, min_prev: f64) -> Vec<Vec<String>> {
    let (dataset, space, tree) = pipeline(instances, distance);
    let outcome = ColocationMiner::new(min_prev)
        .mine(&dataset, &space, &tree)
        .expect("mining succeeds");
    outcome
        .patterns
        .iter()
        .map(|p| p.resolve(&space))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_grid_join_is_order_independent(
        (original, shuffled) in instances_with_permutation()
    ) {
        prop_assert_eq!(
            canonical_pairs(&original, 1.5),
            canonical_pairs(&shuffled, 1.5)
        );
    }

    #[test]
    fn prop_grid_join_emits_each_pair_once(instances in random_instances()) {
        let dataset = SpatialDataset::new(instances).expect("unique ids");
        let space = FeatureSpace::build(&dataset);
        let pairs = GridIndex::new(1.5)
            .expect("distance is positive")
            .neighbor_pairs(&dataset, &space);

        let mut seen = BTreeSet::new();
        for &(a, b) in &pairs {
            prop_assert_ne!(a, b);
            prop_assert_ne!(space.feature_of(a), space.feature_of(b));
            let key = (a.min(b), a.max(b));
            prop_assert!(seen.insert(key), "pair {:?} emitted twice", key);
        }
    }

    #[test]
    fn prop_every_pair_lands_in_exactly_one_star(instances in random_instances()) {
        let dataset = SpatialDataset::new(instances).expect("unique ids");
        let space = FeatureSpace::build(&dataset);
        let pairs = GridIndex::new(1.5)
            .expect("distance is positive")
            .neighbor_pairs(&dataset, &space);
        let map = NeighborhoodMap::from_pairs(&pairs, &dataset, &space);

        let star_edges: usize = map
            .features()
            .map(|f| {
                map.stars_of(f)
                    .iter()
                    .map(|star| {
                        star.neighbor_features()
                            .map(|nf| star.neighbors_of(nf).len())
                            .sum::<usize>()
                    })
                    .sum::<usize>()
            })
            .sum();
        prop_assert_eq!(star_edges, pairs.len());
    }

    #[test]
    fn prop_mining_is_order_independent(
        (original, shuffled) in instances_with_permutation()
    ) {
        prop_assert_eq!(
            mined_patterns(original, 1.5, 0.3),
            mined_patterns(shuffled, 1.5, 0.3)
        );
    }

    #[test]
    fn prop_mining_is_deterministic(instances in random_instances()) {
        prop_assert_eq!(
            mined_patterns(instances.clone(), 1.5, 0.3),
            mined_patterns(instances, 1.5, 0.3)
        );
    }

    #[test]
    fn prop_reported_patterns_are_canonical(instances in random_instances()) {
        let (dataset, space, tree) = pipeline(instances, 1.5);
        let outcome = ColocationMiner::new(0.3)
            .mine(&dataset, &space, &tree)
            .expect("mining succeeds");

        for pattern in &outcome.patterns {
            prop_assert!(pattern.len() >= 2);
            prop_assert!(pattern.is_canonical());
            let counts: Vec<usize> = pattern
                .members()
                .iter()
                .map(|&f| space.count(f))
                .collect();
            prop_assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn prop_min_retaining_subsets_of_reported_patterns_are_reported(
        instances in random_instances()
    ) {
        let (dataset, space, tree) = pipeline(instances, 1.5);
        let outcome = ColocationMiner::new(0.3)
            .mine(&dataset, &space, &tree)
            .expect("mining succeeds");

        let reported: BTreeSet<_> = outcome.patterns.iter().cloned().collect();
        for pattern in &outcome.patterns {
            if pattern.len() < 3 {
                continue;
            }
            for i in 1..pattern.len() {
                let subset = pattern.without(i);
                prop_assert!(
                    reported.contains(&subset),
                    "pattern {:?} reported without subset {:?}",
                    pattern.resolve(&space),
                    subset.resolve(&space)
                );
            }
        }
    }

    #[test]
    fn prop_tighter_threshold_reports_subset_of_patterns(
        instances in random_instances()
    ) {
        let loose: BTreeSet<_> = mined_patterns(instances.clone(), 1.5, 0.2).into_iter().collect();
        let tight: BTreeSet<_> = mined_patterns(instances, 1.5, 0.8).into_iter().collect();
        prop_assert!(tight.is_subset(&loose));
    }
}
