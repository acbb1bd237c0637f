//! Record selection by flag presence and by measurement time.

use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use crate::error::{QaError, Result};
use crate::models::{FlagCode, ObservationRecord};

/// Keep records meeting every `(code, must_be_present)` specification.
pub fn filter_by_flags(
    records: Vec<ObservationRecord>,
    specs: &[(FlagCode, bool)],
) -> Vec<ObservationRecord> {
    records
        .into_iter()
        .filter(|record| {
            specs
                .iter()
                .all(|(code, present)| record.has_flag(*code) == *present)
        })
        .collect()
}

/// Keep records with at least one flag (`true`) or with none (`false`).
pub fn filter_flagged(records: Vec<ObservationRecord>, flagged: bool) -> Vec<ObservationRecord> {
    records
        .into_iter()
        .filter(|record| record.is_flagged() == flagged)
        .collect()
}

/// Keep records measured within `[earliest, latest]`; either bound may be
/// open. Records without a usable datetime never pass.
///
/// With `assume_chronological` the scan skips the leading records before
/// `earliest` and stops at the first one after `latest`. Unsorted input then
/// gives an arbitrary subset, so only use it on sorted batches.
pub fn filter_by_datetime(
    records: Vec<ObservationRecord>,
    earliest: Option<NaiveDateTime>,
    latest: Option<NaiveDateTime>,
    assume_chronological: bool,
) -> Result<Vec<ObservationRecord>> {
    if let (Some(earliest), Some(latest)) = (earliest, latest) {
        if earliest > latest {
            return Err(QaError::InvalidRange(format!(
                "earliest {} is after latest {}",
                earliest, latest
            )));
        }
    }
    if earliest.is_none() && latest.is_none() {
        return Ok(records);
    }

    let before = |t: NaiveDateTime| earliest.is_some_and(|e| t < e);
    let after = |t: NaiveDateTime| latest.is_some_and(|l| t > l);

    let timed = records.into_iter().map(|record| {
        let time = record.parse_measured_datetime();
        (record, time)
    });

    let kept: Vec<ObservationRecord> = if assume_chronological {
        timed
            .skip_while(|(_, time)| time.map_or(true, before))
            .take_while(|(_, time)| !time.is_some_and(after))
            .filter_map(|(record, time)| time.map(|_| record))
            .collect()
    } else {
        timed
            .filter_map(|(record, time)| {
                let time = time?;
                (!before(time) && !after(time)).then_some(record)
            })
            .collect()
    };

    debug!("{} records within datetime range", kept.len());
    Ok(kept)
}

/// Keep records measured during one of the given hours (UTC).
pub fn filter_by_hour(records: Vec<ObservationRecord>, hours: &[u32]) -> Vec<ObservationRecord> {
    records
        .into_iter()
        .filter_map(|record| {
            let hour = record.parse_measured_datetime()?.hour();
            hours.contains(&hour).then_some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Protocol;
    use chrono::NaiveDate;

    fn at(at: &str) -> ObservationRecord {
        ObservationRecord::from_csv_row(&["MeasuredAt", "ObservationId"], &[at, at], Protocol::SkyConditions)
    }

    fn ids(records: &[ObservationRecord]) -> Vec<String> {
        records.iter().filter_map(|r| r.observation_id()).collect()
    }

    fn dt(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn batch() -> Vec<ObservationRecord> {
        vec![
            at("2019-03-01T10:00:00"),
            at("2019-03-02T14:30:00"),
            at("2019-03-03T10:15:00"),
            at("2019-03-04T09:00:00"),
        ]
    }

    #[test]
    fn test_filter_by_flags_requires_every_spec() {
        let mut records = batch();
        records[0].flag(FlagCode::DX);
        records[1].flag(FlagCode::DX);
        records[1].flag(FlagCode::ER);
        records[2].flag(FlagCode::ER);

        let kept = filter_by_flags(records, &[(FlagCode::DX, true), (FlagCode::ER, false)]);
        assert_eq!(ids(&kept), vec!["2019-03-01T10:00:00"]);
    }

    #[test]
    fn test_filter_flagged() {
        let mut records = batch();
        records[3].flag(FlagCode::LW);
        assert_eq!(filter_flagged(records.clone(), true).len(), 1);
        assert_eq!(filter_flagged(records, false).len(), 3);
    }

    #[test]
    fn test_filter_by_datetime_both_modes() {
        for chronological in [true, false] {
            let kept =
                filter_by_datetime(batch(), Some(dt(2, 0)), Some(dt(3, 12)), chronological).unwrap();
            assert_eq!(
                ids(&kept),
                vec!["2019-03-02T14:30:00", "2019-03-03T10:15:00"],
                "chronological = {}",
                chronological
            );
        }
    }

    #[test]
    fn test_filter_by_datetime_open_bounds() {
        let kept = filter_by_datetime(batch(), None, Some(dt(2, 0)), true).unwrap();
        assert_eq!(ids(&kept), vec!["2019-03-01T10:00:00"]);

        let kept = filter_by_datetime(batch(), Some(dt(4, 0)), None, false).unwrap();
        assert_eq!(ids(&kept), vec!["2019-03-04T09:00:00"]);

        assert_eq!(filter_by_datetime(batch(), None, None, true).unwrap().len(), 4);
    }

    #[test]
    fn test_filter_by_datetime_rejects_inverted_range() {
        let result = filter_by_datetime(batch(), Some(dt(3, 0)), Some(dt(1, 0)), false);
        assert!(matches!(result, Err(QaError::InvalidRange(_))));
    }

    #[test]
    fn test_filter_by_hour() {
        let mut records = batch();
        records.push(at("garbage"));
        let kept = filter_by_hour(records, &[10]);
        assert_eq!(ids(&kept), vec!["2019-03-01T10:00:00", "2019-03-03T10:15:00"]);
    }

    #[test]
    fn test_time_filters_leave_flags_alone() {
        let mut records = batch();
        records.push(at("garbage"));
        records.push(ObservationRecord::from_csv_row(
            &["Observation Latitude", "ObservationId"],
            &["nope", "undated"],
            Protocol::SkyConditions,
        ));

        let kept = filter_by_datetime(records.clone(), Some(dt(1, 0)), None, true).unwrap();
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|r| !r.is_flagged()));

        let kept = filter_by_hour(records, &[10, 14]);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| !r.is_flagged()));
    }
}
