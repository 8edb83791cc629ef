//! Rarity-aware prevalence metrics.
//!
//! Pure functions over feature counts and table instances: the rarity sort,
//! global dispersion δ, rare intensity RI, participation ratio PR, and the
//! participation indices PI / WPI. No hidden state; every value is a
//! deterministic function of its inputs.

use crate::feature::{Colocation, FeatureId, FeatureSpace};
use std::collections::{BTreeMap, HashSet};

/// Division guard and δ short-circuit threshold.
pub const EPSILON: f64 = 1e-9;

/// Sorts feature symbols into rarity order: ascending instance count,
/// ties broken lexicographically.
#[must_use]
pub fn feature_sort(features: &[String], counts: &BTreeMap<String, usize>) -> Vec<String> {
    let mut sorted = features.to_vec();
    sorted.sort_by(|a, b| {
        let count_a = counts.get(a).copied().unwrap_or(0);
        let count_b = counts.get(b).copied().unwrap_or(0);
        count_a.cmp(&count_b).then_with(|| a.cmp(b))
    });
    sorted
}

/// Global dispersion δ: the mean pairwise count ratio over features in
/// rarity order,
/// `δ = (2 / (m(m−1))) · Σ_{i<j} count(f_j) / count(f_i)`.
///
/// `counts` must already be in rarity order, so every ratio is ≥ 1.
/// Zero denominators are replaced by a small epsilon; fewer than two
/// features yield δ = 0.
#[must_use]
pub fn delta(counts: &[usize]) -> f64 {
    let m = counts.len();
    if m < 2 {
        return 0.0;
    }

    let mut sum_ratios = 0.0;
    for i in 0..m {
        let mut denominator = counts[i] as f64;
        if denominator == 0.0 {
            denominator = EPSILON;
        }
        for j in (i + 1)..m {
            sum_ratios += counts[j] as f64 / denominator;
        }
    }

    let m = m as f64;
    (2.0 / (m * (m - 1.0))) * sum_ratios
}

/// Rare intensity of `feature` within `pattern`:
/// `RI = exp(−(v−1)² / (2δ²))` with `v = count(feature) / count(f_min)`.
///
/// Returns 0 when the feature is not a member, when the rarest member has
/// no instances, or when δ ≤ ε. `RI(f_min) = 1` by construction.
#[must_use]
pub fn rare_intensity(
    feature: FeatureId,
    pattern: &Colocation,
    space: &FeatureSpace,
    delta: f64,
) -> f64 {
    if delta <= EPSILON || !pattern.contains(feature) {
        return 0.0;
    }

    let min_count = space.count(pattern.f_min());
    if min_count == 0 {
        return 0.0;
    }

    let v = space.count(feature) as f64 / min_count as f64;
    let exponent = -(v - 1.0).powi(2) / (2.0 * delta * delta);
    exponent.exp()
}

/// Prevalence weight of `feature` within `pattern`: `1 / RI` when RI is
/// meaningful, else a sentinel 0 that forces the weighted participation
/// ratio of the feature to 0 (non-prevalent).
#[must_use]
pub fn weight(feature: FeatureId, pattern: &Colocation, space: &FeatureSpace, delta: f64) -> f64 {
    let ri = rare_intensity(feature, pattern, space, delta);
    if ri > EPSILON {
        1.0 / ri
    } else {
        0.0
    }
}

/// Participation ratio: distinct instances of `feature` appearing at its
/// pattern position across `rows`, divided by the feature's global count.
#[must_use]
pub fn participation_ratio(
    feature: FeatureId,
    pattern: &Colocation,
    rows: &[Vec<usize>],
    space: &FeatureSpace,
) -> f64 {
    let Some(position) = pattern.position(feature) else {
        return 0.0;
    };
    let total = space.count(feature);
    if total == 0 {
        return 0.0;
    }

    let distinct: HashSet<usize> = rows
        .iter()
        .filter_map(|row| row.get(position).copied())
        .collect();
    distinct.len() as f64 / total as f64
}

/// Participation index: the minimum participation ratio over the pattern's
/// members.
#[must_use]
pub fn participation_index(
    pattern: &Colocation,
    rows: &[Vec<usize>],
    space: &FeatureSpace,
) -> f64 {
    pattern
        .members()
        .iter()
        .map(|&f| participation_ratio(f, pattern, rows, space))
        .fold(f64::INFINITY, f64::min)
        .min(1.0)
}

/// Weighted participation index: the minimum of `PR(f) · weight(f)` over
/// the pattern's members. The acceptance metric of the miner.
#[must_use]
pub fn weighted_participation_index(
    pattern: &Colocation,
    rows: &[Vec<usize>],
    space: &FeatureSpace,
    delta: f64,
) -> f64 {
    pattern
        .members()
        .iter()
        .map(|&f| {
            participation_ratio(f, pattern, rows, space) * weight(f, pattern, space, delta)
        })
        .fold(f64::INFINITY, f64::min)
}
