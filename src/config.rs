//! Mining configuration: the three recognized options and their file format.
//!
//! The configuration file is plain `key = value` text with `#` comments:
//!
//! ```text
//! # paths are resolved relative to the working directory
//! datasetPath = ./data/points.csv
//! neighborDistance = 5.0
//! minPrev = 0.6
//! ```
//!
//! Exactly three keys are recognized; anything else is a configuration error.

use crate::error::{MinerError, MinerResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Default minimum prevalence threshold.
pub const DEFAULT_MIN_PREVALENCE: f64 = 0.6;
/// Default neighbor distance threshold.
pub const DEFAULT_NEIGHBOR_DISTANCE: f64 = 5.0;

/// The three numeric/path options consumed by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct MinerConfig {
    /// Dataset CSV path, forwarded to the loader.
    pub dataset_path: PathBuf,
    /// Euclidean neighborhood threshold `d` (> 0).
    pub neighbor_distance: f64,
    /// WPI acceptance threshold in (0, 1].
    pub min_prev: f64,
}

impl MinerConfig {
    /// Creates a validated configuration.
    pub fn new(
        dataset_path: impl Into<PathBuf>,
        neighbor_distance: f64,
        min_prev: f64,
    ) -> MinerResult<Self> {
        let config = Self {
            dataset_path: dataset_path.into(),
            neighbor_distance,
            min_prev,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::ConfigInvalid`] for unknown keys, unparsable
    /// numbers, out-of-range values, or a missing `datasetPath`, and
    /// [`MinerError::Io`] when the file cannot be read.
    pub fn load(path: &Path) -> MinerResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| MinerError::io(path, &e))?;
        Self::parse(&content)
    }

    /// Parses configuration text.
    pub fn parse(content: &str) -> MinerResult<Self> {
        let mut dataset_path: Option<PathBuf> = None;
        let mut neighbor_distance = DEFAULT_NEIGHBOR_DISTANCE;
        let mut min_prev = DEFAULT_MIN_PREVALENCE;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                MinerError::ConfigInvalid {
                    field: line.to_string(),
                    value: String::new(),
                    constraint: "expected `key = value`".to_string(),
                }
            })?;
            let key = key.trim();
            let value = value.trim();

            match key {
                "datasetPath" => dataset_path = Some(PathBuf::from(value)),
                "neighborDistance" => neighbor_distance = parse_number(key, value)?,
                "minPrev" => min_prev = parse_number(key, value)?,
                _ => {
                    return Err(MinerError::ConfigInvalid {
                        field: key.to_string(),
                        value: value.to_string(),
                        constraint: "unrecognized option".to_string(),
                    })
                }
            }
        }

        let dataset_path = dataset_path.ok_or_else(|| MinerError::ConfigInvalid {
            field: "datasetPath".to_string(),
            value: String::new(),
            constraint: "option is required".to_string(),
        })?;

        Self::new(dataset_path, neighbor_distance, min_prev)
    }

    fn validate(&self) -> MinerResult<()> {
        if !self.neighbor_distance.is_finite() || self.neighbor_distance <= 0.0 {
            return Err(MinerError::ConfigInvalid {
                field: "neighborDistance".to_string(),
                value: self.neighbor_distance.to_string(),
                constraint: "must be a finite number > 0".to_string(),
            });
        }
        if !self.min_prev.is_finite() || self.min_prev <= 0.0 || self.min_prev > 1.0 {
            return Err(MinerError::ConfigInvalid {
                field: "minPrev".to_string(),
                value: self.min_prev.to_string(),
                constraint: "must be in (0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> MinerResult<f64> {
    value.parse().map_err(|_| MinerError::ConfigInvalid {
        field: key.to_string(),
        value: value.to_string(),
        constraint: "expected a number".to_string(),
    })
}
