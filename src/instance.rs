//! Spatial instances and the dataset that owns them.
//!
//! All instances live in one flat, append-only vector created at load time.
//! Every later structure (stars, tree nodes, table rows) refers back to it
//! with plain `usize` indices, so the dataset must outlive the pipeline.

use crate::error::{MinerError, MinerResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A georeferenced instance of one feature type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialInstance {
    /// Globally unique identifier (e.g. `A1`).
    pub id: String,
    /// Feature type symbol (e.g. `A`). Authoritative, even when the id's
    /// first character happens to agree with it.
    pub feature: String,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// The flat owning collection of all spatial instances.
#[derive(Debug, Clone, Default)]
pub struct SpatialDataset {
    instances: Vec<SpatialInstance>,
}

impl SpatialDataset {
    /// Wraps a validated instance collection.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::InputMalformed`] for empty ids or feature
    /// symbols, non-finite coordinates, or duplicate ids.
    pub fn new(instances: Vec<SpatialInstance>) -> MinerResult<Self> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(instances.len());
        for inst in &instances {
            validate_instance(inst, None)?;
            if !seen.insert(inst.id.as_str()) {
                return Err(MinerError::InputMalformed {
                    path: "<memory>".into(),
                    line: None,
                    reason: format!("duplicate instance id {:?}", inst.id),
                });
            }
        }
        Ok(Self { instances })
    }

    /// Loads instances from a CSV file with `id,feature,x,y` rows.
    ///
    /// Blank lines and `#` comments are skipped. A header row is detected by
    /// a non-numeric third column and skipped.
    pub fn load_csv(path: &Path) -> MinerResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| MinerError::io(path, &e))?;

        let mut instances = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut first_record = true;

        for (line_idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = line_idx + 1;

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 4 {
                return Err(MinerError::InputMalformed {
                    path: path.to_path_buf(),
                    line: Some(line_no),
                    reason: format!(
                        "expected 4 columns (id,feature,x,y), found {}",
                        fields.len()
                    ),
                });
            }

            // Header detection: first record with a non-numeric x column.
            if first_record && fields[2].parse::<f64>().is_err() {
                first_record = false;
                continue;
            }
            first_record = false;

            let x = parse_coord(path, line_no, "x", fields[2])?;
            let y = parse_coord(path, line_no, "y", fields[3])?;
            let inst = SpatialInstance {
                id: fields[0].to_string(),
                feature: fields[1].to_string(),
                x,
                y,
            };
            validate_instance(&inst, Some((path, line_no)))?;
            if !seen.insert(inst.id.clone()) {
                return Err(MinerError::InputMalformed {
                    path: path.to_path_buf(),
                    line: Some(line_no),
                    reason: format!("duplicate instance id {:?}", inst.id),
                });
            }
            instances.push(inst);
        }

        Ok(Self { instances })
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True when the dataset holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The instance at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> &SpatialInstance {
        &self.instances[index]
    }

    /// All instances in load order.
    #[must_use]
    pub fn instances(&self) -> &[SpatialInstance] {
        &self.instances
    }
}

fn validate_instance(
    inst: &SpatialInstance,
    origin: Option<(&Path, usize)>,
) -> MinerResult<()> {
    let fail = |reason: String| match origin {
        Some((path, line)) => MinerError::InputMalformed {
            path: path.to_path_buf(),
            line: Some(line),
            reason,
        },
        None => MinerError::InputMalformed {
            path: "<memory>".into(),
            line: None,
            reason,
        },
    };

    if inst.id.is_empty() {
        return Err(fail("empty instance id".to_string()));
    }
    if inst.feature.is_empty() {
        return Err(fail(format!("instance {:?} has an empty feature type", inst.id)));
    }
    if !inst.x.is_finite() || !inst.y.is_finite() {
        return Err(fail(format!(
            "instance {:?} has non-finite coordinates ({}, {})",
            inst.id, inst.x, inst.y
        )));
    }
    Ok(())
}

fn parse_coord(path: &Path, line: usize, name: &str, value: &str) -> MinerResult<f64> {
    value.parse().map_err(|_| MinerError::InputMalformed {
        path: path.to_path_buf(),
        line: Some(line),
        reason: format!("invalid {name} coordinate: {value:?}"),
    })
}
