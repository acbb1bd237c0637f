use std::collections::{BTreeMap, BTreeSet};

use crate::models::{FlagCode, ObservationRecord};

/// Per-code flag counts over a batch of checked records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSummary {
    pub total_records: usize,
    pub flagged_records: usize,
    pub counts: BTreeMap<FlagCode, usize>,
}

impl FlagSummary {
    pub fn from_records(records: &[ObservationRecord]) -> Self {
        let mut summary = Self {
            total_records: records.len(),
            ..Self::default()
        };

        for record in records {
            if record.is_flagged() {
                summary.flagged_records += 1;
            }
            for code in record.flags() {
                *summary.counts.entry(*code).or_insert(0) += 1;
            }
        }
        summary
    }

    pub fn count(&self, code: FlagCode) -> usize {
        self.counts.get(&code).copied().unwrap_or(0)
    }

    pub fn clean_records(&self) -> usize {
        self.total_records - self.flagged_records
    }

    /// Plain-text report: totals, then one line per raised code with its
    /// share of all records, most frequent first.
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Flag Summary ===\n");
        summary.push_str(&format!("Total Records: {}\n", self.total_records));
        summary.push_str(&format!(
            "Flagged Records: {} ({:.1}%)\n",
            self.flagged_records,
            percent(self.flagged_records, self.total_records)
        ));
        summary.push_str(&format!(
            "Clean Records: {} ({:.1}%)\n",
            self.clean_records(),
            percent(self.clean_records(), self.total_records)
        ));

        if !self.counts.is_empty() {
            let mut rows: Vec<(&FlagCode, &usize)> = self.counts.iter().collect();
            rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            summary.push_str("\nFlags:\n");
            for (code, count) in rows {
                summary.push_str(&format!(
                    "  {} {:>8} ({:>5.1}%)  {}\n",
                    code,
                    count,
                    percent(*count, self.total_records),
                    code.description()
                ));
            }
        }

        summary
    }
}

/// How often each value of `key` occurs. Records without the key (or with a
/// null value) contribute nothing. Numbers are keyed by their display form.
pub fn value_counts(records: &[ObservationRecord], key: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in records.iter().filter_map(|record| record.soft_get(key)) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Every raw key present in at least one record, sorted.
pub fn all_attributes(records: &[ObservationRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(ObservationRecord::keys)
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Protocol;

    fn record(flags: &[FlagCode]) -> ObservationRecord {
        let mut record =
            ObservationRecord::from_csv_row::<&str, &str>(&[], &[], Protocol::LandCovers);
        for code in flags {
            record.flag(*code);
        }
        record
    }

    #[test]
    fn test_counts() {
        let records = vec![
            record(&[FlagCode::DX, FlagCode::ER]),
            record(&[FlagCode::DX]),
            record(&[]),
        ];
        let summary = FlagSummary::from_records(&records);

        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.flagged_records, 2);
        assert_eq!(summary.clean_records(), 1);
        assert_eq!(summary.count(FlagCode::DX), 2);
        assert_eq!(summary.count(FlagCode::ER), 1);
        assert_eq!(summary.count(FlagCode::LW), 0);
    }

    #[test]
    fn test_generate_summary_orders_by_frequency() {
        let records = vec![
            record(&[FlagCode::ER, FlagCode::DX]),
            record(&[FlagCode::DX]),
            record(&[]),
            record(&[]),
        ];
        let text = FlagSummary::from_records(&records).generate_summary();

        assert!(text.contains("Total Records: 4"));
        assert!(text.contains("Flagged Records: 2 (50.0%)"));
        let dx = text.find("  DX").unwrap();
        let er = text.find("  ER").unwrap();
        assert!(dx < er);
        assert!(text.contains(FlagCode::ER.description()));
    }

    #[test]
    fn test_empty_batch() {
        let summary = FlagSummary::from_records(&[]);
        assert!(summary.generate_summary().contains("Flagged Records: 0 (0.0%)"));
    }

    fn row(pairs: &[(&str, &str)]) -> ObservationRecord {
        let header: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        let values: Vec<&str> = pairs.iter().map(|(_, v)| *v).collect();
        ObservationRecord::from_csv_row(&header, &values, Protocol::SkyConditions)
    }

    #[test]
    fn test_value_counts() {
        let records = vec![
            row(&[("CloudCover", "few"), ("Haze", "true")]),
            row(&[("CloudCover", "few")]),
            row(&[("CloudCover", "overcast")]),
            row(&[("Haze", "false")]),
        ];

        let counts = value_counts(&records, "CloudCover");
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["few"], 2);
        assert_eq!(counts["overcast"], 1);
        assert!(value_counts(&records, "Fog").is_empty());
    }

    #[test]
    fn test_value_counts_resolves_prefixed_api_keys() {
        let feature = serde_json::json!({
            "geometry": { "coordinates": [10.0, 20.0] },
            "properties": { "protocol": "sky_conditions", "skyconditionsElevation": 120 },
        });
        let records = vec![ObservationRecord::from_feature(&feature).unwrap()];
        let counts = value_counts(&records, "Elevation");
        assert_eq!(counts.get("120"), Some(&1));
    }

    #[test]
    fn test_all_attributes_sorted_and_deduplicated() {
        let records = vec![
            row(&[("Haze", "true"), ("CloudCover", "few")]),
            row(&[("CloudCover", "few"), ("Fog", "false")]),
        ];
        let attributes = all_attributes(&records);

        let mut sorted = attributes.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(attributes, sorted);
        for key in ["CloudCover", "Fog", "Haze"] {
            assert_eq!(attributes.iter().filter(|a| *a == key).count(), 1);
        }
        assert!(all_attributes(&[]).is_empty());
    }
}
