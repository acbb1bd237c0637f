/// Field names (literal; API records may carry them protocol-prefixed)
pub const KEY_PROTOCOL: &str = "protocol";
pub const KEY_LATITUDE: &str = "Observation Latitude";
pub const KEY_LONGITUDE: &str = "Observation Longitude";
pub const KEY_ELEVATION: [&str; 2] = ["elevation", "Observation Elevation"];
// sic: "Measurment" is misspelled in the CSV export.
pub const KEY_MEASURED_DATE: &str = "Measurment Date (UTC)";
pub const KEY_MEASURED_TIME: &str = "Measurment Time (UTC)";
pub const KEY_MEASURED_AT: &str = "MeasuredAt";
pub const KEY_CLOUD_COVER: [&str; 2] = ["Total Cloud Cover", "CloudCover"];
pub const KEY_OBSERVATION_ID: [&str; 2] = ["ObservationId", "Observation Id"];
pub const KEY_DATA_SOURCE: &str = "DataSource";
pub const KEY_IS_GLOBE_TRAINED: &str = "Is GLOBE Trained";
pub const KEY_IS_CITIZEN_SCIENCE: &str = "is Citizen Science";
pub const KEY_HAZE: &str = "Haze";
pub const KEY_SPRAY: &str = "Spray";
pub const KEY_SKY_CLARITY: &str = "SkyClarity";
pub const KEY_TREE_HEIGHT: &str = "TreeHeightAvgM";
pub const KEY_LARVAE_COUNT: &str = "LarvaeCount";
pub const KEY_CONTRAILS: [&str; 3] = [
    "ShortLivedContrails",
    "SpreadingContrails",
    "NonSpreadingContrails",
];

/// Boolean field catalogs
pub const CLOUD_TYPES: [&str; 10] = [
    "Cirrus",
    "Cirrocumulus",
    "Cumulus",
    "Altocumulus",
    "Stratus",
    "Nimbostratus",
    "Altostratus",
    "Stratocumulus",
    "Cumulonimbus",
    "Cirrostratus",
];
pub const OBSCURATIONS: [&str; 10] = [
    "Fog",
    "Smoke",
    "Haze",
    "VolcanicAsh",
    "Dust",
    "Sand",
    "Spray",
    "HeavyRain",
    "HeavySnow",
    "BlowingSnow",
];

/// Literal values
pub const TRUE_LITERAL: &str = "true";
pub const CLOUD_COVER_MISSING: &str = "-99";
pub const SKY_CLARITY_EXTREMELY_HAZY: &str = "extremely hazy";
pub const LARVAE_COUNT_BUCKETS: [&str; 4] = ["1-25", "26-50", "51-100", "more than 100"];

/// Accepted measurement datetime layouts
pub const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Range checks
pub const MIN_VALID_ELEVATION: f64 = -300.0;
pub const MAX_VALID_ELEVATION: f64 = 6000.0;
pub const EARLIEST_VALID_YEAR: i32 = 1995;
pub const MIN_TREE_HEIGHT: f64 = 0.0;
pub const MAX_TREE_HEIGHT: f64 = 99.0;
pub const TREE_HEIGHT_MISSING: f64 = -99.0;
pub const MIN_LARVAE_COUNT: f64 = 0.0;
pub const MAX_LARVAE_COUNT: f64 = 199.0;
pub const CONTRAIL_LIMIT: f64 = 20.0;

/// Processing defaults
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;
pub const DEFAULT_CHUNK_SIZE: usize = 256;
pub const DEFAULT_TIME_MARGIN_MINUTES: i64 = 30;

