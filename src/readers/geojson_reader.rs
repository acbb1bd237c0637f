use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::models::ObservationRecord;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Value>,
}

/// Reader for GLOBE API responses (GeoJSON feature collections).
pub struct GeoJsonReader;

impl GeoJsonReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_observations(&self, path: &Path) -> Result<Vec<ObservationRecord>> {
        let file = File::open(path)?;
        let records = self.read_from(BufReader::new(file))?;
        info!("Read {} API observations from {}", records.len(), path.display());
        Ok(records)
    }

    /// Any malformed feature fails the whole collection.
    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<ObservationRecord>> {
        let collection: FeatureCollection = serde_json::from_reader(reader)?;
        collection
            .features
            .iter()
            .map(ObservationRecord::from_feature)
            .collect()
    }
}

impl Default for GeoJsonReader {
    fn default() -> Self {
        Self::new()
    }
}
