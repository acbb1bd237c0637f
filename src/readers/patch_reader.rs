use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{ObservationRecord, RawValue};

/// How patch values are stored on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchValueKind {
    Numeric,
    Text,
}

/// Reader for `observationId,value` patch files (no header). Each row
/// backfills one derived attribute onto the record with that id.
pub struct PatchReader {
    attribute: String,
    kind: PatchValueKind,
}

/// Counts from applying a patch file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    pub rows: usize,
    pub applied: usize,
    pub unmatched: usize,
}

impl PatchReader {
    pub fn new(attribute: impl Into<String>, kind: PatchValueKind) -> Self {
        Self {
            attribute: attribute.into(),
            kind,
        }
    }

    pub fn apply_file(&self, path: &Path, records: &mut [ObservationRecord]) -> Result<PatchOutcome> {
        let file = File::open(path)?;
        let outcome = self.apply_from(file, records)?;
        info!(
            "Patched '{}' onto {} records from {} ({} unmatched ids)",
            self.attribute,
            outcome.applied,
            path.display(),
            outcome.unmatched
        );
        Ok(outcome)
    }

    pub fn apply_from<R: Read>(
        &self,
        reader: R,
        records: &mut [ObservationRecord],
    ) -> Result<PatchOutcome> {
        let values = self.read_values(reader)?;
        let mut outcome = PatchOutcome {
            rows: values.len(),
            ..PatchOutcome::default()
        };

        let mut matched = HashSet::new();
        for record in records.iter_mut() {
            let Some(id) = record.observation_id() else {
                continue;
            };
            if let Some((key, value)) = values.get_key_value(&id) {
                record.set_derived(&self.attribute, value.clone());
                matched.insert(key.as_str());
                outcome.applied += 1;
            }
        }
        outcome.unmatched = values.len() - matched.len();
        debug!("{} patch rows had no matching record", outcome.unmatched);

        Ok(outcome)
    }

    fn read_values<R: Read>(&self, reader: R) -> Result<HashMap<String, RawValue>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut values = HashMap::new();
        for (line, row) in csv_reader.records().enumerate() {
            let row = row?;
            let (Some(id), Some(value)) = (row.get(0), row.get(1)) else {
                warn!("Skipping patch line {}: expected two columns", line + 1);
                continue;
            };

            let value = match self.kind {
                PatchValueKind::Text => RawValue::Text(value.to_string()),
                PatchValueKind::Numeric => match value.parse::<f64>() {
                    Ok(number) => RawValue::Number(number),
                    Err(_) => {
                        warn!("Skipping patch line {}: '{}' is not a number", line + 1, value);
                        continue;
                    }
                },
            };
            values.insert(id.to_string(), value);
        }
        Ok(values)
    }
}
