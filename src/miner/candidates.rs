//! Candidate generation and pruning.
//!
//! Generation is the classic Apriori join: two (k−1)-prevalent patterns
//! sharing their first k−2 members produce one k-candidate. Pruning applies
//! the two lemmas of rarity-weighted prevalence before any row instances
//! are materialized: subset prevalence for the subsets that keep `f_min`,
//! and the weighted upper bound for the one subset that drops it.

use crate::feature::{Colocation, FeatureSpace};
use crate::metrics;
use crate::miner::table::InstanceTable;
use std::collections::BTreeSet;

/// Joins (k−1)-prevalent patterns into k-candidates.
///
/// `prev_prevalent` must be in canonical colocation order. Each emitted
/// candidate is strictly ascending in rarity order, deduplicated, and the
/// result is sorted canonically.
#[must_use]
pub fn generate_candidates(prev_prevalent: &[Colocation]) -> Vec<Colocation> {
    let mut candidates = BTreeSet::new();

    for (i, left) in prev_prevalent.iter().enumerate() {
        for right in &prev_prevalent[i + 1..] {
            if left.prefix() != right.prefix() {
                continue;
            }
            // Shared prefix makes the two last members the only difference;
            // append the larger onto the smaller to stay in rarity order.
            let (lo, hi) = if left.f_max() < right.f_max() {
                (left, right)
            } else {
                (right, left)
            };
            candidates.insert(Colocation::extend(lo.members(), hi.f_max()));
        }
    }

    candidates.into_iter().collect()
}

/// Outcome of the pre-materialization filter, with the counters that make
/// the pruning observable.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Candidates that survived both lemmas.
    pub kept: Vec<Colocation>,
    /// Candidates dropped because a subset retaining `f_min` was not
    /// prevalent.
    pub lemma2_pruned: usize,
    /// Candidates dropped by the weighted upper bound on the `f_min`-free
    /// subset.
    pub lemma3_pruned: usize,
}

/// Applies Lemma 2 and Lemma 3 to `candidates`. Only meaningful for k ≥ 3;
/// the driver skips the filter at k = 2.
///
/// For a candidate `C = [f₁, …, f_k]` in rarity order:
///
/// - every subset `C \ {fᵢ}` with i ≥ 1 still contains f_min, so its
///   prevalence is authoritative: if it is not in `P_{k-1}`, prune (Lemma 2);
/// - the subset `S₀ = C \ {f₁}` is f_min-free, so instead the bound
///   `PI(S₀) · w(f_max) < min_prev` prunes (Lemma 3), with `T(S₀)` taken
///   from the previous level (absent table means an empty one).
#[must_use]
pub fn filter_candidates(
    candidates: Vec<Colocation>,
    prev_prevalent: &BTreeSet<Colocation>,
    prev_table: &InstanceTable,
    min_prev: f64,
    space: &FeatureSpace,
    delta: f64,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    'next_candidate: for candidate in candidates {
        for i in 1..candidate.len() {
            if !prev_prevalent.contains(&candidate.without(i)) {
                outcome.lemma2_pruned += 1;
                continue 'next_candidate;
            }
        }

        let min_free = candidate.without(0);
        let upper_bound = metrics::participation_index(
            &min_free,
            prev_table.rows(&min_free),
            space,
        ) * metrics::weight(candidate.f_max(), &candidate, space, delta);
        if upper_bound < min_prev {
            outcome.lemma3_pruned += 1;
            continue;
        }

        outcome.kept.push(candidate);
    }

    outcome
}
