//! Rule-based quality checks for GLOBE observations.
//!
//! Every rule only ever raises flags on the record it inspects: bad field
//! values degrade to a flag, never to an error, and running the rules twice
//! leaves the same flag set as running them once.

use chrono::{Datelike, NaiveDateTime, Timelike, Utc};
use tracing::trace;

use crate::config::QaConfig;
use crate::models::{CloudCover, FlagCode, ObservationRecord, Protocol, RawValue};
use crate::utils::constants::{
    KEY_CONTRAILS, KEY_HAZE, KEY_LARVAE_COUNT, KEY_SKY_CLARITY, KEY_SPRAY, KEY_TREE_HEIGHT,
    LARVAE_COUNT_BUCKETS, SKY_CLARITY_EXTREMELY_HAZY,
};

/// Read-only land/water predicate, typically a prepared union of coastline
/// polygons. Implementations must be safe to share across worker threads.
pub trait LandClassifier: Sync {
    /// Whether the point lies over land.
    fn contains(&self, lon: f64, lat: f64) -> bool;
}

impl<F> LandClassifier for F
where
    F: Fn(f64, f64) -> bool + Sync,
{
    fn contains(&self, lon: f64, lat: f64) -> bool {
        self(lon, lat)
    }
}

/// Axis-aligned lat/lon box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLonBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl LatLonBox {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Coarse land mask made of boxes. Useful for regional runs and tests where
/// full coastline geometry is unavailable.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxLand {
    boxes: Vec<LatLonBox>,
}

impl BoundingBoxLand {
    pub fn new(boxes: Vec<LatLonBox>) -> Self {
        Self { boxes }
    }
}

impl LandClassifier for BoundingBoxLand {
    fn contains(&self, lon: f64, lat: f64) -> bool {
        self.boxes.iter().any(|b| b.contains(lon, lat))
    }
}

pub struct QualityRules {
    config: QaConfig,
    reference_time: Option<NaiveDateTime>,
}

impl QualityRules {
    pub fn new() -> Self {
        Self::with_config(QaConfig::default())
    }

    pub fn with_config(config: QaConfig) -> Self {
        Self {
            config,
            reference_time: None,
        }
    }

    /// Fix "now" for the future-date check. Defaults to the current UTC time.
    pub fn with_reference_time(mut self, now: NaiveDateTime) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Run every rule against `record`. Land/water checks only happen when a
    /// classifier is supplied. Returns the number of newly raised flags.
    pub fn check(&self, record: &mut ObservationRecord, land: Option<&dyn LandClassifier>) -> usize {
        let before = record.flags().len();

        record.elevation_within(self.config.min_elevation, self.config.max_elevation);
        self.check_datetime(record);
        self.check_location(record, land);
        self.check_obscurations(record);
        self.check_tree_height(record);
        self.check_larvae_count(record);
        self.check_contrails(record);

        let raised = record.flags().len() - before;
        if raised > 0 {
            trace!(
                "Observation {:?} raised {} flag(s): {}",
                record.observation_id(),
                raised,
                record.flags().joined(",")
            );
        }
        raised
    }

    /// `DF` future-dated, `DO` before the earliest valid year, `DZ` exactly
    /// midnight. The accessor itself raises `DX`/`DI`.
    pub fn check_datetime(&self, record: &mut ObservationRecord) {
        let Some(dt) = record.measured_datetime() else {
            return;
        };

        let now = self
            .reference_time
            .unwrap_or_else(|| Utc::now().naive_utc());
        if dt > now {
            record.flag(FlagCode::DF);
        }
        if dt.year() < self.config.earliest_year {
            record.flag(FlagCode::DO);
        }
        if dt.hour() == 0 && dt.minute() == 0 {
            record.flag(FlagCode::DZ);
        }
    }

    /// `LI` unusable coordinates, `LZ` exactly (0, 0). Otherwise, with a
    /// classifier, a point off land raises `LW`, or `OP` when spray is reported.
    pub fn check_location(&self, record: &mut ObservationRecord, land: Option<&dyn LandClassifier>) {
        let Some((lat, lon)) = record.coordinates() else {
            record.flag(FlagCode::LI);
            return;
        };

        if lat == 0.0 && lon == 0.0 {
            record.flag(FlagCode::LZ);
        } else if let Some(land) = land {
            if !land.contains(lon, lat) {
                if record.is_true(KEY_SPRAY) {
                    record.flag(FlagCode::OP);
                } else {
                    record.flag(FlagCode::LW);
                }
            }
        }
    }

    /// Sky conditions only: obscuration count versus total cloud cover and
    /// cloud types, and haze versus sky clarity.
    pub fn check_obscurations(&self, record: &mut ObservationRecord) {
        if record.protocol() != Protocol::SkyConditions {
            return;
        }

        let count = record.obscurations().len();
        if count == 2 {
            record.flag(FlagCode::OD);
        } else if count > 2 {
            record.flag(FlagCode::OR);
        }

        let obscured = record.total_cloud_cover() == Some(CloudCover::Obscured);
        if count > 0 && !obscured {
            record.flag(FlagCode::OO);
        } else if count == 0 && obscured {
            record.flag(FlagCode::OX);
        } else if (count > 0 || obscured) && !record.cloud_types().is_empty() {
            record.flag(FlagCode::OC);
        }

        // Missing sky clarity is tolerated.
        let Ok(clarity) = record.get(KEY_SKY_CLARITY) else {
            return;
        };
        let extremely_hazy = clarity.is_literal(SKY_CLARITY_EXTREMELY_HAZY);
        let haze = record.is_true(KEY_HAZE);
        if haze && !extremely_hazy {
            record.flag(FlagCode::HO);
        } else if !haze && extremely_hazy {
            record.flag(FlagCode::HC);
        }
    }

    /// Tree heights only: `TX` missing, `TI` not numeric, `TM` the missing
    /// sentinel, `TR` outside the valid range.
    pub fn check_tree_height(&self, record: &mut ObservationRecord) {
        if record.protocol() != Protocol::TreeHeights {
            return;
        }

        let Some(value) = record.soft_get(KEY_TREE_HEIGHT).map(numeric) else {
            record.flag(FlagCode::TX);
            return;
        };

        match value {
            Some(height) if height == self.config.tree_height_missing => {
                record.flag(FlagCode::TM);
            }
            Some(height)
                if !(self.config.min_tree_height..=self.config.max_tree_height)
                    .contains(&height) =>
            {
                record.flag(FlagCode::TR);
            }
            Some(_) => {}
            None => {
                record.flag(FlagCode::TI);
            }
        }
    }

    /// Mosquito habitat mapper only. The larvae count is either a number in
    /// range or one of the app's bucket labels. An absent count is accepted.
    pub fn check_larvae_count(&self, record: &mut ObservationRecord) {
        if record.protocol() != Protocol::MosquitoHabitatMapper {
            return;
        }

        let Some(raw) = record.soft_get(KEY_LARVAE_COUNT) else {
            return;
        };

        match numeric(raw) {
            Some(count) => {
                if !(self.config.min_larvae_count..=self.config.max_larvae_count).contains(&count)
                {
                    record.flag(FlagCode::MR);
                }
            }
            None => {
                let bucket = raw
                    .as_text()
                    .is_some_and(|text| LARVAE_COUNT_BUCKETS.contains(&text));
                if !bucket {
                    record.flag(FlagCode::MI);
                }
            }
        }
    }

    /// All protocols: sum of the contrail counts. Absent or blank counts are
    /// zero; a non-numeric count raises `NI`; a total at or above the limit
    /// raises `NR`.
    pub fn check_contrails(&self, record: &mut ObservationRecord) {
        let mut total = 0.0;
        let mut invalid = false;

        for key in KEY_CONTRAILS {
            let Ok(raw) = record.get(key) else {
                continue;
            };
            let blank = match raw {
                RawValue::Null => true,
                RawValue::Text(text) => text.trim().is_empty(),
                _ => false,
            };
            if blank {
                continue;
            }
            match numeric(raw) {
                Some(count) => total += count,
                None => invalid = true,
            }
        }

        if invalid {
            record.flag(FlagCode::NI);
        }
        if total >= self.config.contrail_limit {
            record.flag(FlagCode::NR);
        }
    }
}

impl Default for QualityRules {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}
