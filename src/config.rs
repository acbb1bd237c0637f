//! Quality-check thresholds and run settings.
//!
//! Defaults reproduce the documented GLOBE checks; a TOML file and
//! `GLOBE_QA_*` environment variables may override individual values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

use crate::error::{QaError, Result};
use crate::models::MidpointTable;
use crate::utils::constants::{
    CONTRAIL_LIMIT, DEFAULT_CHUNK_SIZE, DEFAULT_PROGRESS_INTERVAL, DEFAULT_TIME_MARGIN_MINUTES, EARLIEST_VALID_YEAR,
    MAX_LARVAE_COUNT, MAX_TREE_HEIGHT, MAX_VALID_ELEVATION, MIN_LARVAE_COUNT, MIN_TREE_HEIGHT,
    MIN_VALID_ELEVATION, TREE_HEIGHT_MISSING,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QaConfig {
    pub min_elevation: f64,
    pub max_elevation: f64,

    #[validate(range(min = 1900, max = 2100))]
    pub earliest_year: i32,

    pub min_tree_height: f64,
    pub max_tree_height: f64,
    /// Tree height value meaning "reported as missing"; skips the range check.
    pub tree_height_missing: f64,

    pub min_larvae_count: f64,
    pub max_larvae_count: f64,

    /// Total contrail count at or above which `NR` is raised.
    #[validate(range(min = 0.0))]
    pub contrail_limit: f64,

    pub midpoint_table: MidpointTable,

    /// Margin added on both sides of a gridded field's time extent when
    /// selecting coincident observations.
    #[validate(range(min = 0))]
    pub time_margin_minutes: i64,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    /// Records handed to one worker at a time during batch checking.
    #[validate(range(min = 1))]
    pub chunk_size: usize,

    /// Records checked between progress updates.
    #[validate(range(min = 1))]
    pub progress_interval: u64,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            min_elevation: MIN_VALID_ELEVATION,
            max_elevation: MAX_VALID_ELEVATION,
            earliest_year: EARLIEST_VALID_YEAR,
            min_tree_height: MIN_TREE_HEIGHT,
            max_tree_height: MAX_TREE_HEIGHT,
            tree_height_missing: TREE_HEIGHT_MISSING,
            min_larvae_count: MIN_LARVAE_COUNT,
            max_larvae_count: MAX_LARVAE_COUNT,
            contrail_limit: CONTRAIL_LIMIT,
            midpoint_table: MidpointTable::default(),
            time_margin_minutes: DEFAULT_TIME_MARGIN_MINUTES,
            max_workers: num_cpus::get(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl QaConfig {
    /// Load from an optional TOML file, then apply `GLOBE_QA_*` environment
    /// overrides (e.g. `GLOBE_QA_EARLIEST_YEAR=2000`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(config::Environment::with_prefix("GLOBE_QA").try_parsing(true));

        let config: QaConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Field validation plus ordering of each min/max pair.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        for (name, min, max) in [
            ("elevation", self.min_elevation, self.max_elevation),
            ("tree height", self.min_tree_height, self.max_tree_height),
            ("larvae count", self.min_larvae_count, self.max_larvae_count),
        ] {
            if min > max {
                return Err(QaError::Config(format!(
                    "{} range is inverted: [{}, {}]",
                    name, min, max
                )));
            }
        }
        Ok(())
    }
}
