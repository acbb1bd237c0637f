use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{bin_cloud_fraction, ObservationRecord, RawValue};

/// Writes one derived attribute out as an `observationId,value` patch file,
/// the interchange format read back by
/// [`PatchReader`](crate::readers::PatchReader).
pub struct PatchWriter {
    attribute: String,
    categorize: bool,
    clip: bool,
}

impl PatchWriter {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            categorize: false,
            clip: true,
        }
    }

    /// Write the binned cloud cover category of numeric values instead of the
    /// values themselves. With `clip`, fractions are clamped into [0, 1].
    pub fn with_categories(mut self, clip: bool) -> Self {
        self.categorize = true;
        self.clip = clip;
        self
    }

    pub fn write_file(&self, records: &[ObservationRecord], path: &Path) -> Result<usize> {
        let file = File::create(path)?;
        let written = self.write_to(records, file)?;
        info!(
            "Wrote {} '{}' rows to {}",
            written,
            self.attribute,
            path.display()
        );
        Ok(written)
    }

    /// Records lacking an id or the attribute are skipped. Returns the number
    /// of rows written.
    pub fn write_to<W: Write>(&self, records: &[ObservationRecord], writer: W) -> Result<usize> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        let mut written = 0;
        for record in records {
            let (Some(id), Some(value)) = (record.observation_id(), record.derived(&self.attribute))
            else {
                continue;
            };
            let value = self.render(value)?;
            csv_writer.write_record([id.as_str(), value.as_str()])?;
            written += 1;
        }
        csv_writer.flush()?;

        debug!("Skipped {} records without '{}'", records.len() - written, self.attribute);
        Ok(written)
    }

    fn render(&self, value: &RawValue) -> Result<String> {
        match value {
            RawValue::Number(fraction) if self.categorize => {
                Ok(bin_cloud_fraction(*fraction, self.clip)?.to_string())
            }
            other => Ok(other.to_string()),
        }
    }
}
