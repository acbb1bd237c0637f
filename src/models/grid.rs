use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{QaError, Result};

/// Axis description of a regularly spaced time/lat/lon dataset.
///
/// Every axis is assumed strictly uniform: value(i) = first + i * step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GridDescriptor {
    #[validate(range(min = -90.0, max = 90.0))]
    pub first_lat: f64,

    pub lat_step: f64,

    #[validate(range(min = -360.0, max = 360.0))]
    pub first_lon: f64,

    pub lon_step: f64,

    /// Datetime of time index 0.
    pub epoch: NaiveDateTime,

    pub time_step_minutes: f64,
}

impl GridDescriptor {
    pub fn new(
        first_lat: f64,
        lat_step: f64,
        first_lon: f64,
        lon_step: f64,
        epoch: NaiveDateTime,
        time_step_minutes: f64,
    ) -> Result<Self> {
        let descriptor = Self {
            first_lat,
            lat_step,
            first_lon,
            lon_step,
            epoch,
            time_step_minutes,
        };
        descriptor.validate()?;
        descriptor.validate_steps()?;
        Ok(descriptor)
    }

    /// Build a descriptor from coordinate axes. Steps are taken from the first
    /// two values of each axis; `time_minutes` are minutes since `begin`.
    pub fn from_axes(
        lats: &[f64],
        lons: &[f64],
        begin: NaiveDateTime,
        time_minutes: &[f64],
    ) -> Result<Self> {
        if lats.len() < 2 || lons.len() < 2 || time_minutes.len() < 2 {
            return Err(QaError::InvalidGrid(
                "each axis needs at least two values to infer a step".into(),
            ));
        }

        let epoch = begin + minutes(time_minutes[0]);
        Self::new(
            lats[0],
            lats[1] - lats[0],
            lons[0],
            lons[1] - lons[0],
            epoch,
            time_minutes[1] - time_minutes[0],
        )
    }

    /// Epoch from CF-style `begin_date` (YYYYMMDD) and `begin_time` (HHMMSS,
    /// leading zeros dropped).
    pub fn epoch_from_begin(begin_date: u32, begin_time: u32) -> Result<NaiveDateTime> {
        let text = format!("{}{:0>6}", begin_date, begin_time);
        Ok(NaiveDateTime::parse_from_str(&text, "%Y%m%d%H%M%S")?)
    }

    /// Datetime at a time index.
    pub fn time_at(&self, index: i64) -> NaiveDateTime {
        self.epoch + minutes(index as f64 * self.time_step_minutes)
    }

    pub fn lat_at(&self, index: i64) -> f64 {
        self.first_lat + index as f64 * self.lat_step
    }

    pub fn lon_at(&self, index: i64) -> f64 {
        self.first_lon + index as f64 * self.lon_step
    }

    fn validate_steps(&self) -> Result<()> {
        for (name, step) in [
            ("lat_step", self.lat_step),
            ("lon_step", self.lon_step),
            ("time_step_minutes", self.time_step_minutes),
        ] {
            if !step.is_finite() || step == 0.0 {
                return Err(QaError::InvalidGrid(format!(
                    "{} must be finite and non-zero, got {}",
                    name, step
                )));
            }
        }
        if self.time_step_minutes < 0.0 {
            return Err(QaError::InvalidGrid(format!(
                "time_step_minutes must be positive, got {}",
                self.time_step_minutes
            )));
        }
        Ok(())
    }
}

fn minutes(value: f64) -> Duration {
    Duration::milliseconds((value * 60_000.0).round() as i64)
}

/// Nearest-gridbox indices. May lie outside the dataset; check with
/// [`GriddedField::get`] before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridIndex {
    pub time: i64,
    pub lat: i64,
    pub lon: i64,
}

impl GridIndex {
    pub fn new(time: i64, lat: i64, lon: i64) -> Self {
        Self { time, lat, lon }
    }

    pub fn as_tuple(&self) -> (i64, i64, i64) {
        (self.time, self.lat, self.lon)
    }
}

/// One variable of a gridded dataset held in memory, row-major
/// `[time][lat][lon]`.
#[derive(Debug, Clone)]
pub struct GriddedField {
    pub name: String,
    pub descriptor: GridDescriptor,
    shape: (usize, usize, usize),
    values: Vec<f32>,
}

impl GriddedField {
    pub fn new(
        name: impl Into<String>,
        descriptor: GridDescriptor,
        shape: (usize, usize, usize),
        values: Vec<f32>,
    ) -> Result<Self> {
        let expected = shape.0 * shape.1 * shape.2;
        if values.len() != expected {
            return Err(QaError::InvalidGrid(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            descriptor,
            shape,
            values,
        })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    pub fn contains(&self, index: GridIndex) -> bool {
        in_axis(index.time, self.shape.0)
            && in_axis(index.lat, self.shape.1)
            && in_axis(index.lon, self.shape.2)
    }

    /// Value at `index`, or `GridIndexOutOfRange` when any axis falls outside
    /// the dataset.
    pub fn get(&self, index: GridIndex) -> Result<f32> {
        if !self.contains(index) {
            return Err(QaError::GridIndexOutOfRange {
                index: index.as_tuple(),
                shape: self.shape,
            });
        }
        let (_, nlat, nlon) = self.shape;
        let offset =
            (index.time as usize * nlat + index.lat as usize) * nlon + index.lon as usize;
        Ok(self.values[offset])
    }

    /// First and last time steps covered by the field.
    pub fn time_extent(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if self.shape.0 == 0 {
            return None;
        }
        Some((
            self.descriptor.time_at(0),
            self.descriptor.time_at(self.shape.0 as i64 - 1),
        ))
    }
}

fn in_axis(index: i64, len: usize) -> bool {
    index >= 0 && (index as u64) < len as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn epoch() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 12, 1)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_descriptor_rejects_zero_step() {
        assert!(GridDescriptor::new(-90.0, 0.0, -180.0, 0.625, epoch(), 60.0).is_err());
        assert!(GridDescriptor::new(-90.0, 0.5, -180.0, 0.625, epoch(), f64::NAN).is_err());
        assert!(GridDescriptor::new(-91.0, 0.5, -180.0, 0.625, epoch(), 60.0).is_err());
        assert!(GridDescriptor::new(-90.0, 0.5, -180.0, 0.625, epoch(), 60.0).is_ok());
    }

    #[test]
    fn test_descriptor_rejects_backwards_time() {
        let result = GridDescriptor::new(-90.0, 0.5, -180.0, 0.625, epoch(), -60.0);
        assert!(matches!(result, Err(QaError::InvalidGrid(_))));
        assert!(GridDescriptor::from_axes(&[0.0, 1.0], &[0.0, 1.0], epoch(), &[60.0, 0.0]).is_err());

        // Descending latitude axes are common and stay valid.
        assert!(GridDescriptor::new(90.0, -0.5, -180.0, 0.625, epoch(), 60.0).is_ok());
    }

    #[test]
    fn test_from_axes() {
        let descriptor = GridDescriptor::from_axes(
            &[-90.0, -89.5, -89.0],
            &[-180.0, -179.375],
            epoch(),
            &[0.0, 60.0, 120.0],
        )
        .unwrap();
        assert_eq!(descriptor.lat_step, 0.5);
        assert_eq!(descriptor.lon_step, 0.625);
        assert_eq!(descriptor.time_step_minutes, 60.0);
        assert_eq!(descriptor.epoch, epoch());
        assert_eq!(descriptor.time_at(2), epoch() + Duration::hours(2));

        assert!(GridDescriptor::from_axes(&[0.0], &[0.0, 1.0], epoch(), &[0.0, 1.0]).is_err());
    }

    #[test]
    fn test_epoch_from_begin_pads_time() {
        let dt = GridDescriptor::epoch_from_begin(20171201, 3000).unwrap();
        assert_eq!(dt, epoch());
        assert!(GridDescriptor::epoch_from_begin(20171301, 0).is_err());
    }

    #[test]
    fn test_field_lookup_and_bounds() {
        let descriptor = GridDescriptor::new(0.0, 1.0, 0.0, 1.0, epoch(), 60.0).unwrap();
        let values: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let field = GriddedField::new("CLDTOT", descriptor, (2, 2, 3), values).unwrap();

        assert_eq!(field.get(GridIndex::new(0, 0, 0)).unwrap(), 0.0);
        assert_eq!(field.get(GridIndex::new(1, 1, 2)).unwrap(), 11.0);
        assert_eq!(field.get(GridIndex::new(0, 1, 0)).unwrap(), 3.0);
        assert!(matches!(
            field.get(GridIndex::new(2, 0, 0)),
            Err(QaError::GridIndexOutOfRange { .. })
        ));
        assert!(field.get(GridIndex::new(0, -1, 0)).is_err());

        let (start, end) = field.time_extent().unwrap();
        assert_eq!(start, epoch());
        assert_eq!(end, epoch() + Duration::hours(1));
    }

    #[test]
    fn test_field_rejects_wrong_value_count() {
        let descriptor = GridDescriptor::new(0.0, 1.0, 0.0, 1.0, epoch(), 60.0).unwrap();
        assert!(GriddedField::new("CLDTOT", descriptor, (2, 2, 2), vec![0.0; 7]).is_err());
    }
}
