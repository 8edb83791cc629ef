//! The mining driver.
//!
//! Owns the level loop: initialize the singleton patterns and tables, then
//! per level generate candidates, prune them, materialize their row
//! instances, and keep the ones whose weighted participation index clears
//! the threshold. Tables live for exactly two levels: `T_{k-1}` is dropped
//! once `T_k` is complete.

mod candidates;
mod table;

pub use candidates::{filter_candidates, generate_candidates, FilterOutcome};
pub use table::{build_rows, extended_set, InstanceTable, RowInstance};

use crate::error::{MinerError, MinerResult};
use crate::feature::{Colocation, FeatureSpace};
use crate::instance::SpatialDataset;
use crate::metrics;
use crate::nrtree::NRTree;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress percentage is capped here until the run actually finishes.
const MAX_PROGRESS_PERCENT: f64 = 95.0;

/// Progress callback: `(current level, max level, message, percent)`.
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str, f64) + Send + Sync>;

/// Cooperative cancellation handle, checked between stages and between
/// candidates during table construction, never mid-intersection.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Counters and timings for one level of the search.
#[derive(Debug, Clone, Default)]
pub struct LevelStats {
    /// Pattern size of this level.
    pub k: usize,
    /// Candidates emitted by the Apriori join.
    pub candidates_generated: usize,
    /// Candidates dropped by subset-prevalence pruning.
    pub lemma2_pruned: usize,
    /// Candidates dropped by the weighted upper bound.
    pub lemma3_pruned: usize,
    /// Tables actually materialized.
    pub tables_built: usize,
    /// Patterns accepted at this level.
    pub prevalent: usize,
    /// Wall-clock time spent on this level.
    pub elapsed: Duration,
}

/// Aggregate statistics for a mining run.
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Per-level statistics, in level order starting at k = 2.
    pub levels: Vec<LevelStats>,
}

impl MiningStats {
    /// Total number of tables materialized across all levels.
    #[must_use]
    pub fn tables_built(&self) -> usize {
        self.levels.iter().map(|l| l.tables_built).sum()
    }
}

/// Result of a mining run.
#[derive(Debug, Clone)]
pub struct MiningOutcome {
    /// All prevalent patterns of size ≥ 2, in canonical order per level.
    pub patterns: Vec<Colocation>,
    /// Global dispersion δ used for the rarity weights.
    pub delta: f64,
    /// True when the run was cancelled and `patterns` is a prefix of the
    /// full result.
    pub cancelled: bool,
    /// Per-level counters and timings.
    pub stats: MiningStats,
}

/// The joinless co-location miner.
pub struct ColocationMiner {
    min_prev: f64,
    progress: Option<ProgressCallback>,
    cancel: Option<CancelToken>,
}

impl ColocationMiner {
    /// Creates a miner with the given prevalence threshold.
    #[must_use]
    pub fn new(min_prev: f64) -> Self {
        Self {
            min_prev,
            progress: None,
            cancel: None,
        }
    }

    /// Installs a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Installs a cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Mines all prevalent co-location patterns of size ≥ 2.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::ConfigInvalid`] for a threshold outside (0, 1]
    /// and [`MinerError::InternalInvariant`] when a structural contract is
    /// violated mid-run (a bug, not an input condition).
    pub fn mine(
        &self,
        dataset: &SpatialDataset,
        space: &FeatureSpace,
        tree: &NRTree,
    ) -> MinerResult<MiningOutcome> {
        if !self.min_prev.is_finite() || self.min_prev <= 0.0 || self.min_prev > 1.0 {
            return Err(MinerError::ConfigInvalid {
                field: "minPrev".to_string(),
                value: self.min_prev.to_string(),
                constraint: "must be in (0, 1]".to_string(),
            });
        }

        let delta = metrics::delta(space.counts());
        let max_k = space.len();
        let mut stats = MiningStats::default();
        let mut all_prevalent: Vec<Colocation> = Vec::new();

        self.report(0, max_k, "Initializing mining process...", 0.0);

        let mut prevalent: Vec<Colocation> =
            space.features().map(Colocation::singleton).collect();
        let mut prev_table = InstanceTable::singletons(dataset, space);
        let mut k = 1;

        while !prevalent.is_empty() && k < max_k {
            k += 1;
            let level_start = Instant::now();
            let percent = level_percent(k - 1, max_k);
            self.report(k - 1, max_k, &format!("Processing k={k} patterns..."), percent);

            if self.cancelled() {
                return Ok(self.partial(all_prevalent, delta, stats));
            }

            let mut level = LevelStats {
                k,
                ..LevelStats::default()
            };

            let candidates = generate_candidates(&prevalent);
            level.candidates_generated = candidates.len();
            if candidates.is_empty() {
                stats.levels.push(level);
                break;
            }

            let candidates = if k >= 3 {
                let prevalent_set: BTreeSet<Colocation> =
                    prevalent.iter().cloned().collect();
                let outcome = filter_candidates(
                    candidates,
                    &prevalent_set,
                    &prev_table,
                    self.min_prev,
                    space,
                    delta,
                );
                level.lemma2_pruned = outcome.lemma2_pruned;
                level.lemma3_pruned = outcome.lemma3_pruned;
                outcome.kept
            } else {
                candidates
            };

            if self.cancelled() {
                stats.levels.push(level);
                return Ok(self.partial(all_prevalent, delta, stats));
            }

            self.report(
                k - 1,
                max_k,
                &format!("Materializing tables for {} candidates...", candidates.len()),
                percent,
            );

            let mut next_table = InstanceTable::default();
            for candidate in &candidates {
                if self.cancelled() {
                    stats.levels.push(level);
                    return Ok(self.partial(all_prevalent, delta, stats));
                }
                validate_candidate(candidate, k)?;
                next_table.insert(candidate.clone(), build_rows(candidate, &prev_table, tree));
                level.tables_built += 1;
            }

            let mut next_prevalent = Vec::new();
            for candidate in candidates {
                let wpi = metrics::weighted_participation_index(
                    &candidate,
                    next_table.rows(&candidate),
                    space,
                    delta,
                );
                if !wpi.is_finite() {
                    return Err(MinerError::InternalInvariant {
                        context: "prevalence selection".to_string(),
                        details: format!(
                            "non-finite WPI {wpi} for pattern {:?}",
                            candidate.resolve(space)
                        ),
                    });
                }
                if wpi >= self.min_prev - metrics::EPSILON {
                    next_prevalent.push(candidate);
                }
            }

            level.prevalent = next_prevalent.len();
            level.elapsed = level_start.elapsed();
            self.report(
                k - 1,
                max_k,
                &format!("Found {} prevalent k={k} colocations", next_prevalent.len()),
                percent,
            );

            all_prevalent.extend(next_prevalent.iter().cloned());
            stats.levels.push(level);
            prev_table = next_table;
            prevalent = next_prevalent;
        }

        self.report(
            max_k,
            max_k,
            &format!(
                "Mining completed! Total prevalent colocations: {}",
                all_prevalent.len()
            ),
            100.0,
        );

        Ok(MiningOutcome {
            patterns: all_prevalent,
            delta,
            cancelled: false,
            stats,
        })
    }

    fn report(&self, current: usize, total: usize, message: &str, percent: f64) {
        if let Some(callback) = &self.progress {
            callback(current, total, message, percent);
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn partial(
        &self,
        patterns: Vec<Colocation>,
        delta: f64,
        stats: MiningStats,
    ) -> MiningOutcome {
        MiningOutcome {
            patterns,
            delta,
            cancelled: true,
            stats,
        }
    }
}

fn level_percent(iteration: usize, max_k: usize) -> f64 {
    if max_k == 0 {
        return MAX_PROGRESS_PERCENT;
    }
    (iteration as f64 / max_k as f64 * MAX_PROGRESS_PERCENT).min(MAX_PROGRESS_PERCENT)
}

fn validate_candidate(candidate: &Colocation, k: usize) -> MinerResult<()> {
    if candidate.len() != k || !candidate.is_canonical() {
        return Err(MinerError::InternalInvariant {
            context: "table construction".to_string(),
            details: format!(
                "candidate {:?} is not a canonical {k}-pattern",
                candidate.members()
            ),
        });
    }
    Ok(())
}
