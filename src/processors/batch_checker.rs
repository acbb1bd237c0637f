use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::QaConfig;
use crate::error::{QaError, Result};
use crate::models::ObservationRecord;
use crate::processors::flag_summary::FlagSummary;
use crate::processors::quality_rules::{LandClassifier, QualityRules};
use crate::utils::progress::ProgressSink;

/// Applies [`QualityRules`] to a whole batch. Records share no mutable state,
/// so the batch is split across a dedicated rayon pool.
pub struct BatchChecker {
    rules: QualityRules,
    max_workers: usize,
    chunk_size: usize,
    progress_interval: u64,
}

impl BatchChecker {
    pub fn new(rules: QualityRules) -> Self {
        let config = rules.config();
        let (max_workers, chunk_size, progress_interval) =
            (config.max_workers, config.chunk_size, config.progress_interval);
        Self {
            rules,
            max_workers,
            chunk_size,
            progress_interval,
        }
    }

    pub fn from_config(config: QaConfig) -> Self {
        Self::new(QualityRules::with_config(config))
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Records handed to a worker at a time.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Records checked between progress updates, counted per chunk.
    pub fn with_progress_interval(mut self, progress_interval: u64) -> Self {
        self.progress_interval = progress_interval.max(1);
        self
    }

    pub fn rules(&self) -> &QualityRules {
        &self.rules
    }

    /// Check every record in place and summarize the raised flags.
    pub fn check_all(
        &self,
        records: &mut [ObservationRecord],
        land: Option<&dyn LandClassifier>,
        progress: &dyn ProgressSink,
    ) -> Result<FlagSummary> {
        let total = records.len();
        progress.set_message(&format!("Quality checking {} observations...", total));
        debug!(
            "Checking {} records with {} workers (land check: {})",
            total,
            self.max_workers,
            land.is_some()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| QaError::Config(e.to_string()))?;

        let chunk_size = self.chunk_size.max(1);
        let interval = self.progress_interval.max(1);
        pool.install(|| {
            records.par_chunks_mut(chunk_size).for_each(|chunk| {
                let mut pending = 0u64;
                for record in chunk.iter_mut() {
                    self.rules.check(record, land);
                    pending += 1;
                    if pending == interval {
                        progress.increment(pending);
                        pending = 0;
                    }
                }
                if pending > 0 {
                    progress.increment(pending);
                }
            })
        });

        let summary = FlagSummary::from_records(records);
        info!(
            "Checked {} observations: {} flagged",
            summary.total_records, summary.flagged_records
        );
        progress.finish(&format!(
            "Checked {} observations ({} flagged)",
            summary.total_records, summary.flagged_records
        ));

        Ok(summary)
    }
}

impl Default for BatchChecker {
    fn default() -> Self {
        Self::new(QualityRules::new())
    }
}
