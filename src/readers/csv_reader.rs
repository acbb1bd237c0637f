use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{ObservationRecord, Protocol};

/// Reader for GLOBE tabular exports: one header row, then one observation per
/// row. Header names are literal and the protocol is supplied per file.
pub struct CsvReader {
    protocol: Protocol,
    limit: Option<usize>,
}

impl CsvReader {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            limit: None,
        }
    }

    /// Stop after `limit` observations.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn read_observations(&self, path: &Path) -> Result<Vec<ObservationRecord>> {
        let file = File::open(path)?;
        let records = self.read_from(file)?;
        info!(
            "Read {} {} observations from {}",
            records.len(),
            self.protocol,
            path.display()
        );
        Ok(records)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<ObservationRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        debug!("CSV header has {} columns", header.len());

        let mut records = Vec::new();
        for row in csv_reader.records() {
            if self.limit.is_some_and(|limit| records.len() >= limit) {
                break;
            }
            let row = row?;
            let cells: Vec<&str> = row.iter().collect();
            records.push(ObservationRecord::from_csv_row(&header, &cells, self.protocol));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SKY_CSV: &str = "\
ObservationId , Observation Latitude,Observation Longitude,MeasuredAt,CloudCover,Fog
101,38.9,-77.0,2018-06-01T13:45:00,few,false
102,51.5,-0.1,2018-06-01T14:00:00,obscured
103,\"48.8\",2.3,2018-06-01T15:00:00, scattered ,true
";

    #[test]
    fn test_read_observations_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", SKY_CSV)?;

        let records = CsvReader::new(Protocol::SkyConditions).read_observations(file.path())?;
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.protocol(), Protocol::SkyConditions);
        assert_eq!(first.observation_id().as_deref(), Some("101"));
        assert_eq!(first.text("protocol"), Some("sky_conditions"));

        // Short row: missing trailing cell reads as null.
        assert_eq!(records[1].get("Fog")?, &RawValue::Null);
        assert_eq!(records[2].text("CloudCover"), Some("scattered"));
        assert!(records[2].is_true("Fog"));
        Ok(())
    }

    #[test]
    fn test_limit() -> Result<()> {
        let records = CsvReader::new(Protocol::SkyConditions)
            .with_limit(2)
            .read_from(SKY_CSV.as_bytes())?;
        assert_eq!(records.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = CsvReader::new(Protocol::TreeHeights).read_observations(Path::new("/no/such/file.csv"));
        assert!(result.is_err());
    }
}
