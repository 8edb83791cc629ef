//! Run reports: the result file, a JSON dump, and the peak-memory probe.

use crate::error::{MinerError, MinerResult};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Summary of one mining run, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    /// Dataset path as configured.
    pub dataset_path: String,
    /// Number of instances loaded.
    pub total_instances: usize,
    /// Neighbor distance threshold used.
    pub neighbor_distance: f64,
    /// Prevalence threshold used.
    pub min_prev: f64,
    /// Total wall-clock seconds.
    pub elapsed_secs: f64,
    /// Peak resident memory in MB, when the platform exposes it.
    pub peak_memory_mb: Option<u64>,
    /// Prevalent patterns as feature symbols, in discovery order.
    pub patterns: Vec<Vec<String>>,
}

impl MiningReport {
    /// Renders the plain-text result block.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== FINAL REPORT ===");
        let _ = writeln!(out, "Dataset Path:      {}", self.dataset_path);
        let _ = writeln!(out, "Total Instances:   {}", self.total_instances);
        let _ = writeln!(out, "Neighbor Distance: {}", self.neighbor_distance);
        let _ = writeln!(out, "Min Prevalence:    {}", self.min_prev);
        let _ = writeln!(out, "----------------------------------------");
        let _ = writeln!(out, "Execution Time: {:.3} s", self.elapsed_secs);
        match self.peak_memory_mb {
            Some(mb) => {
                let _ = writeln!(out, "Peak Memory Usage: {mb} MB");
            }
            None => {
                let _ = writeln!(out, "Peak Memory Usage: unavailable");
            }
        }
        let _ = writeln!(out, "Patterns Found: {}", self.patterns.len());
        let _ = writeln!(out, "----------------------------------------");

        if self.patterns.is_empty() {
            let _ = writeln!(out, "No patterns found.");
        } else {
            for (idx, pattern) in self.patterns.iter().enumerate() {
                let _ = writeln!(out, "[{}] {{{}}}", idx + 1, pattern.join(", "));
            }
        }
        out
    }

    /// Serializes the report as pretty JSON.
    pub fn to_json(&self) -> MinerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MinerError::Io {
            path: "<json>".into(),
            message: e.to_string(),
        })
    }

    /// Writes the plain-text report to a file.
    pub fn write_text(&self, path: &Path) -> MinerResult<()> {
        std::fs::write(path, self.render_text()).map_err(|e| MinerError::io(path, &e))
    }

    /// Writes the JSON report to a file.
    pub fn write_json(&self, path: &Path) -> MinerResult<()> {
        std::fs::write(path, self.to_json()?).map_err(|e| MinerError::io(path, &e))
    }
}

/// Peak resident set size of this process in megabytes.
///
/// Reads `VmHWM` from `/proc/self/status`; returns `None` on platforms
/// without procfs or when the field is missing.
#[must_use]
pub fn peak_memory_mb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmHWM:") {
            let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kb / 1024);
        }
    }
    None
}
