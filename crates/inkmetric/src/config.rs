//! Tunable parameters for tone reproduction and match ranking.
//!
//! Configuration is plain data. It can be constructed programmatically,
//! starting from the defaults, or loaded from JSON:
//!
//! ```no_run
//! use inkmetric::config::EngineConfig;
//! use std::path::Path;
//!
//! let config = EngineConfig::from_json_file(Path::new("inkmetric.json"))?;
//! assert!(0 < config.ranking.display_limit);
//! # Ok::<(), inkmetric::error::Error>(())
//! ```
//!
//! Every field has a default, so that a JSON document only needs to list the
//! parameters it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::Float;

/// The complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tone reproduction parameters
    pub tone: ToneConfig,

    /// Match ranking parameters
    pub ranking: RankingConfig,
}

impl EngineConfig {
    /// Parse a configuration from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Serialize this configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Tone reproduction parameters.
///
/// These parameters control how the substrate and solid references of a tint
/// ladder are located.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Tolerance when matching nominal tint percentages, in percentage points
    pub percentage_tolerance: Float,

    /// Lowest nominal percentage that may stand in for a missing solid
    pub solid_min_percentage: Float,

    /// Nominal percentage of the solid
    pub solid_percentage: Float,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            percentage_tolerance: 0.1,
            solid_min_percentage: 90.0,
            solid_percentage: 100.0,
        }
    }
}

/// Match ranking parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Maximum number of results returned by a ranking pass
    pub display_limit: usize,

    /// Maximum number of eligible candidates scanned by a ranking pass
    pub max_candidates: usize,

    /// Scanning stops early once `display_limit * quota_factor` candidates
    /// have been compared
    pub quota_factor: usize,
}

impl RankingConfig {
    /// Get the number of results after which scanning stops early.
    pub const fn quota(&self) -> usize {
        self.display_limit.saturating_mul(self.quota_factor)
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            display_limit: 50,
            max_candidates: 500,
            quota_factor: 2,
        }
    }
}
