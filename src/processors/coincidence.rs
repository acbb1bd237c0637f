//! Matching point observations to the nearest gridbox of a gridded dataset.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};

use crate::config::QaConfig;
use crate::error::{QaError, Result};
use crate::models::{bin_cloud_fraction, GridDescriptor, GridIndex, GriddedField};
use crate::models::{ObservationRecord, RawValue};
use crate::utils::constants::DEFAULT_TIME_MARGIN_MINUTES;
use crate::utils::progress::ProgressSink;

/// Nearest-gridbox lookup on a strictly regular grid.
pub struct GridCoincidenceResolver;

impl GridCoincidenceResolver {
    /// Nearest indices for `(t, lat, lon)`. Each axis is resolved on its own
    /// as `round((value - first) / step)`, ties to even. The result is not
    /// bounds checked.
    pub fn locate(descriptor: &GridDescriptor, t: NaiveDateTime, lat: f64, lon: f64) -> GridIndex {
        let elapsed_minutes = (t - descriptor.epoch).num_milliseconds() as f64 / 60_000.0;
        GridIndex::new(
            nearest(elapsed_minutes, 0.0, descriptor.time_step_minutes),
            nearest(lat, descriptor.first_lat, descriptor.lat_step),
            nearest(lon, descriptor.first_lon, descriptor.lon_step),
        )
    }
}

fn nearest(value: f64, first: f64, step: f64) -> i64 {
    ((value - first) / step).round_ties_even() as i64
}

/// Outcome of a batch coincidence run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoincidenceSummary {
    pub matched: usize,
    pub skipped: usize,
    /// Position of the first record past the end of the field, if the scan
    /// stopped early.
    pub stopped_at: Option<usize>,
}

/// Attaches the coincident value of one gridded field to each record as a
/// derived attribute.
///
/// Records must be in chronological order of measurement. This is checked up
/// front; once a record falls after the field's last time step, every later
/// record would too, so the scan stops there.
pub struct CoincidenceMatcher<'a> {
    field: &'a GriddedField,
    attribute: String,
    categorized: bool,
    time_margin_minutes: i64,
}

impl<'a> CoincidenceMatcher<'a> {
    pub fn new(field: &'a GriddedField, attribute: impl Into<String>) -> Self {
        Self {
            field,
            attribute: attribute.into(),
            categorized: false,
            time_margin_minutes: DEFAULT_TIME_MARGIN_MINUTES,
        }
    }

    /// Matcher using the configured time margin.
    pub fn from_config(
        field: &'a GriddedField,
        attribute: impl Into<String>,
        config: &QaConfig,
    ) -> Self {
        Self::new(field, attribute).with_time_margin(config.time_margin_minutes)
    }

    pub fn with_time_margin(mut self, minutes: i64) -> Self {
        self.time_margin_minutes = minutes.max(0);
        self
    }

    /// Records measured within this matcher's field extent, widened by its
    /// time margin.
    pub fn select_in_time_range(&self, records: Vec<ObservationRecord>) -> Vec<ObservationRecord> {
        filter_within_time_range(records, self.field, self.time_margin_minutes)
    }

    /// Store the binned cloud cover category instead of the raw fraction.
    pub fn categorized(mut self) -> Self {
        self.categorized = true;
        self
    }

    pub fn match_records(
        &self,
        records: &mut [ObservationRecord],
        progress: &dyn ProgressSink,
    ) -> Result<CoincidenceSummary> {
        let times: Vec<Option<NaiveDateTime>> =
            records.iter().map(ObservationRecord::parse_measured_datetime).collect();
        ensure_chronological(&times)?;

        progress.set_message(&format!("Matching {} records to {}", records.len(), self.field.name));
        let descriptor = &self.field.descriptor;
        let (time_steps, _, _) = self.field.shape();
        let mut summary = CoincidenceSummary::default();

        for (position, (record, time)) in records.iter_mut().zip(times).enumerate() {
            progress.increment(1);

            let (Some(time), Some((lat, lon))) = (time, record.parse_coordinates()) else {
                summary.skipped += 1;
                continue;
            };

            let index = GridCoincidenceResolver::locate(descriptor, time, lat, lon);
            if index.time >= time_steps as i64 {
                info!(
                    "Record {} at {} is past the end of {}; stopping",
                    position, time, self.field.name
                );
                summary.stopped_at = Some(position);
                break;
            }

            match self.field.get(index) {
                Ok(value) => {
                    record.set_derived(&self.attribute, self.derived_value(value)?);
                    summary.matched += 1;
                }
                Err(e) => {
                    debug!("Skipping record {}: {}", position, e);
                    summary.skipped += 1;
                }
            }
        }

        progress.finish(&format!(
            "Matched {} records, skipped {}",
            summary.matched, summary.skipped
        ));
        Ok(summary)
    }

    fn derived_value(&self, value: f32) -> Result<RawValue> {
        let value = f64::from(value);
        if self.categorized {
            Ok(RawValue::Text(bin_cloud_fraction(value, true)?.to_string()))
        } else {
            Ok(RawValue::Number(value))
        }
    }
}

fn ensure_chronological(times: &[Option<NaiveDateTime>]) -> Result<()> {
    let mut previous: Option<NaiveDateTime> = None;
    for (position, time) in times.iter().enumerate() {
        let Some(time) = *time else { continue };
        if previous.is_some_and(|p| time < p) {
            return Err(QaError::NotChronological { position });
        }
        previous = Some(time);
    }
    Ok(())
}

/// Keep records measured within the field's time extent widened by
/// `margin_minutes` on both sides. Records without a usable datetime are
/// dropped.
pub fn filter_within_time_range(
    records: Vec<ObservationRecord>,
    field: &GriddedField,
    margin_minutes: i64,
) -> Vec<ObservationRecord> {
    let Some((start, end)) = field.time_extent() else {
        return Vec::new();
    };
    let margin = Duration::minutes(margin_minutes);
    let (start, end) = (start - margin, end + margin);

    let total = records.len();
    let kept: Vec<ObservationRecord> = records
        .into_iter()
        .filter_map(|record| {
            let time = record.parse_measured_datetime()?;
            (start <= time && time <= end).then_some(record)
        })
        .collect();

    debug!(
        "{} of {} records fall within {} to {}",
        kept.len(),
        total,
        start,
        end
    );
    kept
}
