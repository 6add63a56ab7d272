//! Historical ridership records, checked once and shared read-only.

use std::collections::BTreeMap;

use ts_core::{Real, TsError, TsResult};
use ts_records::{RidershipKind, RidershipRecord, Snapshot};

/// Validated ridership records.
///
/// Construct once per snapshot and share behind an `Arc`; nothing here
/// changes after `new` returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidershipSource {
    records: Vec<RidershipRecord>,
}

impl RidershipSource {
    /// Check every record: a non-empty target and a finite, non-negative count.
    pub fn new(records: Vec<RidershipRecord>) -> TsResult<Self> {
        for (i, record) in records.iter().enumerate() {
            let label = || format!("ridership #{i} ({})", record.target);
            if record.target.is_empty() {
                return Err(TsError::malformed(label(), "empty target"));
            }
            if !record.count.is_finite() {
                return Err(TsError::malformed(label(), "count is not finite"));
            }
            if record.count < 0.0 {
                return Err(TsError::malformed(
                    label(),
                    format!("count {} is negative", record.count),
                ));
            }
        }
        Ok(Self { records })
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> TsResult<Self> {
        Self::new(snapshot.ridership.clone())
    }

    /// Records in load order.
    pub fn records(&self) -> &[RidershipRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of the counts recorded against `target`, any kind.
    pub fn total(&self, target: &str) -> Real {
        self.records
            .iter()
            .filter(|r| r.target == target)
            .map(|r| r.count)
            .sum()
    }

    /// Per-target sums of station-level records (line totals excluded), keyed by target.
    pub fn station_totals(&self) -> BTreeMap<&str, Real> {
        let mut totals = BTreeMap::new();
        for record in &self.records {
            if record.kind != RidershipKind::LineTotal {
                *totals.entry(record.target.as_str()).or_insert(0.0) += record.count;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_counts() {
        for count in [f64::NAN, f64::INFINITY, -1.0] {
            let err = RidershipSource::new(vec![RidershipRecord::new("A", count)]).unwrap_err();
            assert!(matches!(err, TsError::MalformedRecord { .. }), "{count}");
        }
        assert!(RidershipSource::new(vec![RidershipRecord::new("", 1.0)]).is_err());
    }

    #[test]
    fn totals_sum_every_kind() {
        let source = RidershipSource::new(vec![
            RidershipRecord::new("A", 10.0),
            RidershipRecord::new("A", 4.0).with_kind(RidershipKind::Alightings),
            RidershipRecord::new("7000", 3.0).with_kind(RidershipKind::TripStarts),
            RidershipRecord::new("1", 100.0).with_kind(RidershipKind::LineTotal),
        ])
        .unwrap();

        assert_eq!(source.len(), 4);
        assert_eq!(source.total("A"), 14.0);
        assert_eq!(source.total("B"), 0.0);
        let totals = source.station_totals();
        assert_eq!(totals.get("A"), Some(&14.0));
        assert_eq!(totals.get("7000"), Some(&3.0));
        assert!(!totals.contains_key("1"));
    }
}
