//! Table instances and joinless row extension.
//!
//! A table `T(C)` holds every row instance of a pattern `C`: tuples of
//! instance indices positionally aligned with the pattern's rarity-ordered
//! members. Level k rows are built by extending level k−1 rows with the
//! extended set `S(r, f)`, the intersection of the NR-tree neighbor lists
//! of every member of the row. Because both the row and the new feature are
//! in rarity order, only the upward half of each star is ever consulted.

use crate::feature::{Colocation, FeatureId, FeatureSpace};
use crate::instance::SpatialDataset;
use crate::nrtree::NRTree;
use std::collections::{BTreeMap, HashSet};

/// One row instance: instance indices aligned with the pattern members.
pub type RowInstance = Vec<usize>;

/// The tables of one mining level, keyed by pattern in canonical order.
#[derive(Debug, Clone, Default)]
pub struct InstanceTable {
    tables: BTreeMap<Colocation, Vec<RowInstance>>,
}

impl InstanceTable {
    /// The level-1 tables: one single-column row per instance, grouped by
    /// feature in rarity order.
    #[must_use]
    pub fn singletons(dataset: &SpatialDataset, space: &FeatureSpace) -> Self {
        let mut tables: BTreeMap<Colocation, Vec<RowInstance>> = BTreeMap::new();
        for index in 0..dataset.len() {
            tables
                .entry(Colocation::singleton(space.feature_of(index)))
                .or_default()
                .push(vec![index]);
        }
        Self { tables }
    }

    /// Rows of a pattern, or an empty slice when the pattern has no table.
    #[must_use]
    pub fn rows(&self, pattern: &Colocation) -> &[RowInstance] {
        self.tables.get(pattern).map_or(&[], Vec::as_slice)
    }

    /// Stores the rows of a pattern.
    pub fn insert(&mut self, pattern: Colocation, rows: Vec<RowInstance>) {
        self.tables.insert(pattern, rows);
    }

    /// Number of patterns with a table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True when no pattern has a table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterates tables in canonical pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&Colocation, &[RowInstance])> {
        self.tables.iter().map(|(c, rows)| (c, rows.as_slice()))
    }
}

/// Computes the extended set `S(r, f)`: the intersection of
/// `neighbors(r[i], f)` over every member of the row, terminating early
/// when the running intersection empties.
///
/// Instance ids are unique, so index identity is id identity; the result
/// keeps the id-sorted order of the first neighbor list.
#[must_use]
pub fn extended_set(row: &[usize], feature: FeatureId, tree: &NRTree) -> Vec<usize> {
    let Some((&first, rest)) = row.split_first() else {
        return Vec::new();
    };

    let mut running: Vec<usize> = tree.neighbors(first, feature).to_vec();
    for &member in rest {
        if running.is_empty() {
            return running;
        }
        let allowed: HashSet<usize> = tree.neighbors(member, feature).iter().copied().collect();
        running.retain(|candidate| allowed.contains(candidate));
    }
    running
}

/// Builds `T(C)` for one filtered candidate by extending the rows of its
/// prefix table with every member of the extended set.
#[must_use]
pub fn build_rows(
    candidate: &Colocation,
    prev_table: &InstanceTable,
    tree: &NRTree,
) -> Vec<RowInstance> {
    let prefix = candidate.without(candidate.len() - 1);
    let new_feature = candidate.f_max();

    let mut rows = Vec::new();
    for row in prev_table.rows(&prefix) {
        for extension in extended_set(row, new_feature, tree) {
            let mut extended = Vec::with_capacity(row.len() + 1);
            extended.extend_from_slice(row);
            extended.push(extension);
            rows.push(extended);
        }
    }
    rows
}
