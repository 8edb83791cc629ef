//! Feature interning, the rarity order, and co-location patterns.
//!
//! Feature symbols are interned as dense ranks assigned in rarity order:
//! ascending instance count, ties broken lexicographically. Ascending
//! [`FeatureId`] therefore *is* the rarity order, which makes the canonical
//! pattern representation (strictly ascending id vector) and canonical
//! pattern comparison (lexicographic on ids) fall out of plain `Ord`.

use crate::error::{MinerError, MinerResult};
use crate::instance::SpatialDataset;
use crate::metrics;
use std::collections::{BTreeMap, HashMap};

/// Rarity rank of a feature type. Rank 0 is the rarest feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub usize);

/// Interned feature domain: symbols, counts, and per-instance feature ids,
/// frozen after construction.
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    /// Feature symbols indexed by rarity rank.
    symbols: Vec<String>,
    /// Instance counts, parallel to `symbols`.
    counts: Vec<usize>,
    /// Symbol -> rank.
    ranks: HashMap<String, FeatureId>,
    /// Feature id of each instance, parallel to the dataset.
    instance_features: Vec<FeatureId>,
}

impl FeatureSpace {
    /// Builds the feature domain from a dataset: counts instances per
    /// feature, sorts features into rarity order, and interns every symbol.
    #[must_use]
    pub fn build(dataset: &SpatialDataset) -> Self {
        let mut count_map: BTreeMap<String, usize> = BTreeMap::new();
        for inst in dataset.instances() {
            *count_map.entry(inst.feature.clone()).or_insert(0) += 1;
        }

        let features: Vec<String> = count_map.keys().cloned().collect();
        let symbols = metrics::feature_sort(&features, &count_map);
        let counts: Vec<usize> = symbols.iter().map(|s| count_map[s]).collect();
        let ranks: HashMap<String, FeatureId> = symbols
            .iter()
            .enumerate()
            .map(|(rank, s)| (s.clone(), FeatureId(rank)))
            .collect();
        let instance_features = dataset
            .instances()
            .iter()
            .map(|inst| ranks[&inst.feature])
            .collect();

        Self {
            symbols,
            counts,
            ranks,
            instance_features,
        }
    }

    /// Number of distinct feature types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when the dataset had no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All feature ids in rarity order.
    pub fn features(&self) -> impl Iterator<Item = FeatureId> {
        (0..self.symbols.len()).map(FeatureId)
    }

    /// Symbol of a feature id.
    #[must_use]
    pub fn symbol(&self, feature: FeatureId) -> &str {
        &self.symbols[feature.0]
    }

    /// Instance count of a feature.
    #[must_use]
    pub fn count(&self, feature: FeatureId) -> usize {
        self.counts[feature.0]
    }

    /// Instance counts in rarity order.
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Rank of a feature symbol, if present in the dataset.
    #[must_use]
    pub fn rank(&self, symbol: &str) -> Option<FeatureId> {
        self.ranks.get(symbol).copied()
    }

    /// Feature id of the instance at `index`.
    #[must_use]
    pub fn feature_of(&self, index: usize) -> FeatureId {
        self.instance_features[index]
    }
}

/// A co-location pattern: distinct feature types, strictly ascending in
/// rarity order. The first member is `f_min` (rarest), the last `f_max`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Colocation(Vec<FeatureId>);

impl Colocation {
    /// Canonicalizes a feature set into a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::InternalInvariant`] when the set contains a
    /// duplicate feature; patterns are sets and a duplicate means a bug in
    /// the caller.
    pub fn from_features(mut features: Vec<FeatureId>) -> MinerResult<Self> {
        features.sort_unstable();
        if features.windows(2).any(|w| w[0] == w[1]) {
            return Err(MinerError::InternalInvariant {
                context: "colocation construction".to_string(),
                details: format!("duplicate feature in {features:?}"),
            });
        }
        Ok(Self(features))
    }

    /// Single-feature pattern.
    #[must_use]
    pub fn singleton(feature: FeatureId) -> Self {
        Self(vec![feature])
    }

    /// Pattern size k.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the (never constructed) empty pattern.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in rarity order.
    #[must_use]
    pub fn members(&self) -> &[FeatureId] {
        &self.0
    }

    /// The rarest member.
    #[must_use]
    pub fn f_min(&self) -> FeatureId {
        self.0[0]
    }

    /// The most common member.
    #[must_use]
    pub fn f_max(&self) -> FeatureId {
        self.0[self.0.len() - 1]
    }

    /// Position of a feature within the pattern, if present.
    #[must_use]
    pub fn position(&self, feature: FeatureId) -> Option<usize> {
        self.0.binary_search(&feature).ok()
    }

    /// True when the pattern contains `feature`.
    #[must_use]
    pub fn contains(&self, feature: FeatureId) -> bool {
        self.position(feature).is_some()
    }

    /// The (k−1)-subset obtained by removing the member at `index`.
    /// Removal preserves the ascending order.
    #[must_use]
    pub fn without(&self, index: usize) -> Self {
        let mut members = self.0.clone();
        members.remove(index);
        Self(members)
    }

    /// All members except the last; the join prefix.
    #[must_use]
    pub fn prefix(&self) -> &[FeatureId] {
        &self.0[..self.0.len() - 1]
    }

    /// A new pattern extending `prefix` members with one more feature.
    /// Caller guarantees `feature` follows every prefix member in rarity
    /// order; debug builds assert it.
    #[must_use]
    pub fn extend(prefix: &[FeatureId], feature: FeatureId) -> Self {
        debug_assert!(prefix.last().map_or(true, |&last| last < feature));
        let mut members = Vec::with_capacity(prefix.len() + 1);
        members.extend_from_slice(prefix);
        members.push(feature);
        Self(members)
    }

    /// True when members are strictly ascending with no duplicates.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        !self.0.is_empty() && self.0.windows(2).all(|w| w[0] < w[1])
    }

    /// Resolves the pattern back to feature symbols.
    #[must_use]
    pub fn resolve(&self, space: &FeatureSpace) -> Vec<String> {
        self.0.iter().map(|&f| space.symbol(f).to_string()).collect()
    }
}
