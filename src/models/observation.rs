//! A single GLOBE observation: raw heterogeneous fields plus the typed
//! accessors and flag set the quality rules work against.
//!
//! Records come from one of two places. A CSV export row has literal column
//! names and its protocol supplied by the caller. A GLOBE API GeoJSON feature
//! prefixes protocol-specific property names with the protocol name minus
//! underscores (`skyconditionsCloudCover`). [`ObservationRecord::get`]
//! hides the difference: it tries the literal key first and, for API
//! records only, the prefixed key second.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{QaError, Result};
use crate::models::cloud_cover::CloudCover;
use crate::models::flags::{FlagCode, FlagSet};
use crate::models::protocol::Protocol;
use crate::utils::constants::{
    CLOUD_TYPES, CLOUD_COVER_MISSING, DATETIME_FORMATS, KEY_CLOUD_COVER, KEY_DATA_SOURCE,
    KEY_ELEVATION, KEY_IS_CITIZEN_SCIENCE, KEY_IS_GLOBE_TRAINED, KEY_LATITUDE, KEY_LONGITUDE,
    KEY_MEASURED_AT, KEY_MEASURED_DATE, KEY_MEASURED_TIME, KEY_OBSERVATION_ID, KEY_PROTOCOL,
    MAX_VALID_ELEVATION, MIN_VALID_ELEVATION, OBSCURATIONS, TRUE_LITERAL,
};

/// A raw field value as it arrived from the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl RawValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Literal string comparison; only text values can match.
    pub fn is_literal(&self, literal: &str) -> bool {
        self.as_text() == Some(literal)
    }

    /// Numeric interpretation. `Err(())` means the value is present but not a
    /// number; null values are never passed here.
    fn parse_f64(&self) -> std::result::Result<f64, ()> {
        match self {
            RawValue::Number(n) => Ok(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| ()),
            RawValue::Bool(_) | RawValue::Null => Err(()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Null => Ok(()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(RawValue::Null, RawValue::Number),
            Value::String(s) => RawValue::Text(s.clone()),
            other => RawValue::Text(other.to_string()),
        }
    }
}

/// Which construction path produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Csv,
    Api,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationRecord {
    protocol: Protocol,
    origin: Origin,
    raw: HashMap<String, RawValue>,
    derived: BTreeMap<String, RawValue>,
    flags: FlagSet,
}

impl ObservationRecord {
    /// Build a record from a CSV header and one data row. Cells missing from a
    /// short row are stored as null.
    pub fn from_csv_row<H, R>(header: &[H], row: &[R], protocol: Protocol) -> Self
    where
        H: AsRef<str>,
        R: AsRef<str>,
    {
        let mut raw = HashMap::with_capacity(header.len() + 1);
        raw.insert(
            KEY_PROTOCOL.to_string(),
            RawValue::Text(protocol.as_str().to_string()),
        );

        for (i, column) in header.iter().enumerate() {
            let value = row
                .get(i)
                .map_or(RawValue::Null, |cell| RawValue::Text(cell.as_ref().trim().to_string()));
            raw.insert(column.as_ref().trim().to_string(), value);
        }

        Self {
            protocol,
            origin: Origin::Csv,
            raw,
            derived: BTreeMap::new(),
            flags: FlagSet::new(),
        }
    }

    /// Build a record from one GeoJSON feature of a GLOBE API response.
    ///
    /// The feature must carry a `properties` object with a `protocol` string
    /// and a `geometry.coordinates` array of `[lon, lat]`; the coordinates are
    /// materialized as literal `Observation Latitude` / `Observation Longitude`.
    pub fn from_feature(feature: &Value) -> Result<Self> {
        let properties = feature
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| QaError::IncompleteInput("feature has no 'properties' object".into()))?;

        let protocol = properties
            .get(KEY_PROTOCOL)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                QaError::IncompleteInput("feature properties have no 'protocol' string".into())
            })?
            .parse::<Protocol>()?;

        let coordinates = feature
            .get("geometry")
            .and_then(|g| g.get("coordinates"))
            .and_then(Value::as_array)
            .filter(|c| c.len() >= 2)
            .ok_or_else(|| {
                QaError::IncompleteInput("feature geometry has no [lon, lat] coordinates".into())
            })?;

        let mut raw: HashMap<String, RawValue> = properties
            .iter()
            .map(|(k, v)| (k.clone(), RawValue::from(v)))
            .collect();
        raw.insert(KEY_LATITUDE.to_string(), RawValue::from(&coordinates[1]));
        raw.insert(KEY_LONGITUDE.to_string(), RawValue::from(&coordinates[0]));

        Ok(Self {
            protocol,
            origin: Origin::Api,
            raw,
            derived: BTreeMap::new(),
            flags: FlagSet::new(),
        })
    }

    pub fn builder() -> ObservationRecordBuilder {
        ObservationRecordBuilder::new()
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Raise a flag on this record. Returns `true` if it was newly raised.
    pub fn flag(&mut self, code: FlagCode) -> bool {
        self.flags.raise(code)
    }

    pub fn has_flag(&self, code: FlagCode) -> bool {
        self.flags.has(code)
    }

    pub fn is_flagged(&self) -> bool {
        self.flags.any()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    /// Resolve `key`: literal first, then (API records only) protocol-prefixed.
    pub fn get(&self, key: &str) -> Result<&RawValue> {
        if let Some(value) = self.raw.get(key) {
            return Ok(value);
        }
        if self.origin == Origin::Api {
            let prefixed = format!("{}{}", self.protocol.key_prefix(), key);
            if let Some(value) = self.raw.get(&prefixed) {
                return Ok(value);
            }
        }
        Err(QaError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Like [`get`](Self::get) but never fails; null values read as absent.
    pub fn soft_get(&self, key: &str) -> Option<&RawValue> {
        self.get(key).ok().filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.soft_get(key).is_some()
    }

    /// Text value of `key`, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.soft_get(key).and_then(RawValue::as_text)
    }

    /// Whether `key` holds exactly the literal `"true"`.
    pub fn is_true(&self, key: &str) -> bool {
        self.soft_get(key).is_some_and(|v| v.is_literal(TRUE_LITERAL))
    }

    /// Value of the first key in `keys` that resolves. A key that resolves to
    /// null stops the search and yields `None`.
    pub fn try_keys(&self, keys: &[&str]) -> Option<&RawValue> {
        keys.iter()
            .find_map(|key| self.get(key).ok())
            .filter(|v| !v.is_null())
    }

    /// Numeric value of the first resolvable key, raising `missing` when no key
    /// resolves and `invalid` when the value is not a number.
    pub fn get_float(
        &mut self,
        keys: &[&str],
        missing: Option<FlagCode>,
        invalid: Option<FlagCode>,
    ) -> Option<f64> {
        let parsed = self.try_keys(keys).map(RawValue::parse_f64);
        match parsed {
            Some(Ok(value)) => Some(value),
            Some(Err(())) => {
                if let Some(code) = invalid {
                    self.flag(code);
                }
                None
            }
            None => {
                if let Some(code) = missing {
                    self.flag(code);
                }
                None
            }
        }
    }

    pub fn latitude(&mut self) -> Option<f64> {
        self.get_float(&[KEY_LATITUDE], Some(FlagCode::LI), Some(FlagCode::LI))
    }

    pub fn longitude(&mut self) -> Option<f64> {
        self.get_float(&[KEY_LONGITUDE], Some(FlagCode::LI), Some(FlagCode::LI))
    }

    /// `(lat, lon)` when both parse.
    pub fn coordinates(&mut self) -> Option<(f64, f64)> {
        let lat = self.latitude();
        let lon = self.longitude();
        lat.zip(lon)
    }

    /// Numeric value of the first resolvable key. Never raises a flag.
    pub fn parse_float(&self, keys: &[&str]) -> Option<f64> {
        self.try_keys(keys)
            .map(RawValue::parse_f64)
            .and_then(|parsed| parsed.ok())
    }

    /// `(lat, lon)` without raising flags; used by batch lookups that must
    /// leave the flag set alone.
    pub fn parse_coordinates(&self) -> Option<(f64, f64)> {
        self.parse_float(&[KEY_LATITUDE])
            .zip(self.parse_float(&[KEY_LONGITUDE]))
    }

    /// Measurement datetime (UTC). Raises `DX` when no datetime field exists
    /// and `DI` when the text does not parse.
    pub fn measured_datetime(&mut self) -> Option<NaiveDateTime> {
        if self.measured_datetime_text().is_none() {
            self.flag(FlagCode::DX);
            return None;
        }

        let parsed = self.parse_measured_datetime();
        if parsed.is_none() {
            self.flag(FlagCode::DI);
        }
        parsed
    }

    /// Measurement datetime without raising flags.
    pub fn parse_measured_datetime(&self) -> Option<NaiveDateTime> {
        let text = self.measured_datetime_text()?;
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok())
    }

    // Date + time columns (CSV export, "Measurment" sic) before the single API timestamp.
    fn measured_datetime_text(&self) -> Option<String> {
        match (self.get(KEY_MEASURED_DATE), self.get(KEY_MEASURED_TIME)) {
            (Ok(date), Ok(time)) => Some(format!("{}T{}", date, time)),
            _ => self.get(KEY_MEASURED_AT).ok().map(ToString::to_string),
        }
    }

    /// Elevation in meters, checked against the default expected range.
    pub fn elevation(&mut self) -> Option<f64> {
        self.elevation_within(MIN_VALID_ELEVATION, MAX_VALID_ELEVATION)
    }

    /// Elevation in meters. Raises `EX` when missing and `EI` when not a
    /// number. A value outside `[min, max]` raises `ER` but is still returned.
    pub fn elevation_within(&mut self, min: f64, max: f64) -> Option<f64> {
        let value = self.get_float(&KEY_ELEVATION, Some(FlagCode::EX), Some(FlagCode::EI));
        if let Some(v) = value {
            if !(min..=max).contains(&v) {
                self.flag(FlagCode::ER);
            }
        }
        value
    }

    /// Total cloud cover. Only sky conditions records carry one; every other
    /// protocol returns `None` without flagging.
    ///
    /// Raises `CM` for the `-99` missing code, `CI` for any other unknown
    /// category and `CX` when the field is absent.
    pub fn total_cloud_cover(&mut self) -> Option<CloudCover> {
        if self.protocol != Protocol::SkyConditions {
            return None;
        }

        let Some(value) = self.try_keys(&KEY_CLOUD_COVER).map(ToString::to_string) else {
            self.flag(FlagCode::CX);
            return None;
        };

        if let Ok(category) = value.parse::<CloudCover>() {
            return Some(category);
        }
        if value == CLOUD_COVER_MISSING {
            self.flag(FlagCode::CM);
        } else {
            self.flag(FlagCode::CI);
        }
        None
    }

    /// Cloud types whose boolean field is `"true"`.
    pub fn cloud_types(&self) -> Vec<&'static str> {
        CLOUD_TYPES
            .iter()
            .copied()
            .filter(|key| self.is_true(key))
            .collect()
    }

    /// Obscurations whose boolean field is `"true"`.
    pub fn obscurations(&self) -> Vec<&'static str> {
        OBSCURATIONS
            .iter()
            .copied()
            .filter(|key| self.is_true(key))
            .collect()
    }

    pub fn observation_id(&self) -> Option<String> {
        self.try_keys(&KEY_OBSERVATION_ID).map(ToString::to_string)
    }

    /// Data source, or a description built from the trained / citizen science
    /// markers when no `DataSource` field exists.
    pub fn source(&self) -> Option<String> {
        if let Ok(value) = self.get(KEY_DATA_SOURCE) {
            return Some(value.to_string());
        }

        let trained = self.soft_get(KEY_IS_GLOBE_TRAINED)?.to_string() == "1";
        let citizen = self.soft_get(KEY_IS_CITIZEN_SCIENCE)?.to_string() == "1";
        let mut source = String::new();
        if trained {
            source.push_str("GLOBE-trained ");
        }
        if citizen {
            source.push_str("citizen science");
        }
        Some(source.trim().to_string())
    }

    /// Attach a derived attribute such as a coincident model value.
    pub fn set_derived(&mut self, name: &str, value: RawValue) {
        self.derived.insert(name.to_string(), value);
    }

    pub fn derived(&self, name: &str) -> Option<&RawValue> {
        self.derived.get(name)
    }

    pub fn derived_attributes(&self) -> &BTreeMap<String, RawValue> {
        &self.derived
    }
}

/// Collects the inputs of exactly one construction path.
///
/// Either `header` + `row` + `protocol` (CSV) or `feature` (API) must be
/// supplied in full; anything partial or mixed fails in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct ObservationRecordBuilder {
    header: Option<Vec<String>>,
    row: Option<Vec<String>>,
    protocol: Option<Protocol>,
    feature: Option<Value>,
}

impl ObservationRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, header: Vec<String>) -> Self {
        self.header = Some(header);
        self
    }

    pub fn row(mut self, row: Vec<String>) -> Self {
        self.row = Some(row);
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn feature(mut self, feature: Value) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn build(self) -> Result<ObservationRecord> {
        let csv_parts = [
            self.header.is_some(),
            self.row.is_some(),
            self.protocol.is_some(),
        ];
        let any_csv = csv_parts.iter().any(|p| *p);

        match (self.header, self.row, self.protocol, self.feature) {
            (Some(header), Some(row), Some(protocol), None) => {
                Ok(ObservationRecord::from_csv_row(&header, &row, protocol))
            }
            (None, None, None, Some(feature)) => ObservationRecord::from_feature(&feature),
            (_, _, _, Some(_)) if any_csv => Err(QaError::IncompleteInput(
                "both CSV fields and an API feature were supplied".into(),
            )),
            _ => Err(QaError::IncompleteInput(
                "either 'feature' or all of ('header', 'row', 'protocol') must be provided".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use serde_json::json;

    fn csv_record(pairs: &[(&str, &str)], protocol: Protocol) -> ObservationRecord {
        let header: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        let row: Vec<&str> = pairs.iter().map(|(_, v)| *v).collect();
        ObservationRecord::from_csv_row(&header, &row, protocol)
    }

    fn sky_feature(properties: Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [-77.03, 38.89] },
            "properties": properties,
        })
    }

    #[test]
    fn test_csv_keys_are_literal() {
        let record = csv_record(&[("CloudCover", "few")], Protocol::SkyConditions);
        assert_eq!(record.get("CloudCover").unwrap(), &RawValue::from("few"));
        assert_eq!(record.text("protocol"), Some("sky_conditions"));
        assert!(matches!(
            record.get("skyconditionsCloudCover"),
            Err(QaError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_api_keys_fall_back_to_prefix() {
        let feature = sky_feature(json!({
            "protocol": "sky_conditions",
            "skyconditionsCloudCover": "broken",
            "elevation": 12.5,
        }));
        let record = ObservationRecord::from_feature(&feature).unwrap();

        assert_eq!(record.origin(), Origin::Api);
        assert_eq!(record.text("CloudCover"), Some("broken"));
        assert_eq!(record.get("elevation").unwrap(), &RawValue::Number(12.5));
        assert!(record.get("Haze").is_err());
        assert!(record.soft_get("Haze").is_none());
    }

    #[test]
    fn test_feature_coordinates_materialized() {
        let feature = sky_feature(json!({ "protocol": "sky_conditions" }));
        let mut record = ObservationRecord::from_feature(&feature).unwrap();
        assert_eq!(record.coordinates(), Some((38.89, -77.03)));
        assert!(!record.is_flagged());
    }

    #[test]
    fn test_feature_without_geometry_is_fatal() {
        let feature = json!({ "properties": { "protocol": "tree_heights" } });
        assert!(matches!(
            ObservationRecord::from_feature(&feature),
            Err(QaError::IncompleteInput(_))
        ));
    }

    #[test]
    fn test_builder_rejects_partial_input() {
        let partial = ObservationRecord::builder()
            .header(vec!["a".into()])
            .protocol(Protocol::TreeHeights)
            .build();
        assert!(matches!(partial, Err(QaError::IncompleteInput(_))));

        let mixed = ObservationRecord::builder()
            .header(vec!["a".into()])
            .row(vec!["1".into()])
            .protocol(Protocol::TreeHeights)
            .feature(sky_feature(json!({ "protocol": "sky_conditions" })))
            .build();
        assert!(matches!(mixed, Err(QaError::IncompleteInput(_))));

        assert!(ObservationRecord::builder().build().is_err());

        let complete = ObservationRecord::builder()
            .header(vec!["a".into()])
            .row(vec!["1".into()])
            .protocol(Protocol::TreeHeights)
            .build()
            .unwrap();
        assert_eq!(complete.origin(), Origin::Csv);
    }

    #[test]
    fn test_short_row_reads_as_missing() {
        let mut record = ObservationRecord::from_csv_row(
            &["Observation Latitude", "Observation Longitude"],
            &["10.0"],
            Protocol::LandCovers,
        );
        assert_eq!(record.latitude(), Some(10.0));
        assert_eq!(record.longitude(), None);
        assert!(record.has_flag(FlagCode::LI));
    }

    #[test]
    fn test_invalid_latitude_flags_li() {
        let mut record = csv_record(&[("Observation Latitude", "north")], Protocol::LandCovers);
        assert_eq!(record.latitude(), None);
        assert!(record.has_flag(FlagCode::LI));
    }

    #[test]
    fn test_measured_datetime_from_date_time_pair() {
        let mut record = csv_record(
            &[
                ("Measurment Date (UTC)", "2018-06-01"),
                ("Measurment Time (UTC)", "13:45:00"),
            ],
            Protocol::SkyConditions,
        );
        let expected = NaiveDate::from_ymd_opt(2018, 6, 1)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        assert_eq!(record.measured_datetime(), Some(expected));
        assert!(!record.is_flagged());
    }

    #[test]
    fn test_measured_datetime_with_fraction() {
        let mut record = csv_record(
            &[("MeasuredAt", "2018-06-01T13:45:00.250")],
            Protocol::SkyConditions,
        );
        let dt = record.measured_datetime().unwrap();
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_measured_datetime_missing_and_invalid() {
        let mut missing = csv_record(&[("Other", "x")], Protocol::SkyConditions);
        assert_eq!(missing.measured_datetime(), None);
        assert!(missing.has_flag(FlagCode::DX));

        let mut invalid = csv_record(&[("MeasuredAt", "yesterday")], Protocol::SkyConditions);
        assert_eq!(invalid.measured_datetime(), None);
        assert!(invalid.has_flag(FlagCode::DI));
        assert!(!invalid.has_flag(FlagCode::DX));
    }

    #[test]
    fn test_parse_accessors_never_flag() {
        let record = csv_record(
            &[("Observation Latitude", "nope"), ("Observation Longitude", "12.5")],
            Protocol::SkyConditions,
        );
        assert_eq!(record.parse_coordinates(), None);
        assert_eq!(record.parse_measured_datetime(), None);
        assert_eq!(record.parse_float(&["Observation Longitude"]), Some(12.5));
        assert!(!record.is_flagged());

        let mut flagged = record.clone();
        flagged.coordinates();
        flagged.measured_datetime();
        assert!(flagged.has_flag(FlagCode::LI));
        assert!(flagged.has_flag(FlagCode::DX));
    }

    #[test]
    fn test_api_literal_key_wins_over_prefixed() {
        let feature = sky_feature(json!({
            "protocol": "sky_conditions",
            "CloudCover": "few",
            "skyconditionsCloudCover": "overcast",
        }));
        let record = ObservationRecord::from_feature(&feature).unwrap();
        assert_eq!(record.text("CloudCover"), Some("few"));
        assert_eq!(record.text("skyconditionsCloudCover"), Some("overcast"));
    }

    #[test]
    fn test_elevation_out_of_range_still_returned() {
        let mut record = csv_record(&[("elevation", "7000")], Protocol::TreeHeights);
        assert_eq!(record.elevation(), Some(7000.0));
        assert!(record.has_flag(FlagCode::ER));
    }

    #[test]
    fn test_elevation_missing_and_invalid() {
        let mut missing = csv_record(&[], Protocol::TreeHeights);
        assert_eq!(missing.elevation(), None);
        assert!(missing.has_flag(FlagCode::EX));
        assert!(!missing.has_flag(FlagCode::ER));

        let mut invalid = csv_record(&[("Observation Elevation", "high")], Protocol::TreeHeights);
        assert_eq!(invalid.elevation(), None);
        assert!(invalid.has_flag(FlagCode::EI));
    }

    #[test]
    fn test_tcc_missing_code() {
        let mut record = csv_record(&[("Total Cloud Cover", "-99")], Protocol::SkyConditions);
        assert_eq!(record.total_cloud_cover(), None);
        assert!(record.has_flag(FlagCode::CM));
    }

    #[test]
    fn test_tcc_invalid_and_absent() {
        let mut invalid = csv_record(&[("CloudCover", "cloudy")], Protocol::SkyConditions);
        assert_eq!(invalid.total_cloud_cover(), None);
        assert!(invalid.has_flag(FlagCode::CI));

        let mut absent = csv_record(&[], Protocol::SkyConditions);
        assert_eq!(absent.total_cloud_cover(), None);
        assert!(absent.has_flag(FlagCode::CX));
    }

    #[test]
    fn test_tcc_ignored_for_other_protocols() {
        let mut record = csv_record(&[("CloudCover", "garbage")], Protocol::TreeHeights);
        assert_eq!(record.total_cloud_cover(), None);
        assert!(!record.is_flagged());
    }

    #[test]
    fn test_cloud_types_and_obscurations() {
        let record = csv_record(
            &[
                ("Cirrus", "true"),
                ("Stratus", "false"),
                ("Cumulus", "TRUE"),
                ("Fog", "true"),
                ("Dust", "true"),
            ],
            Protocol::SkyConditions,
        );
        assert_eq!(record.cloud_types(), vec!["Cirrus"]);
        assert_eq!(record.obscurations(), vec!["Fog", "Dust"]);
    }

    #[test]
    fn test_observation_id_and_source() {
        let feature = sky_feature(json!({
            "protocol": "sky_conditions",
            "skyconditionsObservationId": 88123,
            "skyconditionsDataSource": "GLOBE Observer App",
        }));
        let record = ObservationRecord::from_feature(&feature).unwrap();
        assert_eq!(record.observation_id().as_deref(), Some("88123"));
        assert_eq!(record.source().as_deref(), Some("GLOBE Observer App"));

        let record = csv_record(
            &[("Is GLOBE Trained", "1"), ("is Citizen Science", "0")],
            Protocol::SkyConditions,
        );
        assert_eq!(record.source().as_deref(), Some("GLOBE-trained"));
    }

    #[test]
    fn test_derived_attributes() {
        let mut record = csv_record(&[], Protocol::SkyConditions);
        record.set_derived("tcc_geos", RawValue::Number(0.42));
        assert_eq!(record.derived("tcc_geos"), Some(&RawValue::Number(0.42)));
        assert_eq!(record.derived("tcc_geos_cat"), None);
    }
}
