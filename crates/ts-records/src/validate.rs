//! Field-level snapshot validation.
//!
//! Cross-record consistency (line references, conflicting kinds) is the graph
//! builder's job; this pass catches values that are wrong on their own.

use std::collections::HashSet;

use crate::config::AnalysisConfig;
use crate::schema::{BikeStationRecord, LineRecord, RidershipRecord, Snapshot, StopRecord};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Empty ID in {context}")]
    EmptyId { context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_snapshot(snapshot: &Snapshot) -> Result<(), ValidationError> {
    if snapshot.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: snapshot.version,
        });
    }

    for stop in &snapshot.stops {
        validate_stop(stop)?;
    }
    for station in &snapshot.bike_stations {
        validate_bike_station(station)?;
    }

    let mut line_ids = HashSet::new();
    for line in &snapshot.lines {
        if !line_ids.insert(&line.id) {
            return Err(ValidationError::DuplicateId {
                id: line.id.clone(),
                context: "lines".to_string(),
            });
        }
        validate_line(line)?;
    }

    for (i, record) in snapshot.ridership.iter().enumerate() {
        validate_ridership(i, record)?;
    }

    validate_config(&snapshot.config)
}

fn validate_stop(stop: &StopRecord) -> Result<(), ValidationError> {
    if stop.id.trim().is_empty() {
        return Err(ValidationError::EmptyId {
            context: format!("stop '{}'", stop.name),
        });
    }
    if !stop.location.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: format!("stop '{}' location", stop.id),
            value: format!("({}, {})", stop.location.x_m, stop.location.y_m),
            reason: "coordinates must be finite".to_string(),
        });
    }
    Ok(())
}

fn validate_bike_station(station: &BikeStationRecord) -> Result<(), ValidationError> {
    if station.id.trim().is_empty() {
        return Err(ValidationError::EmptyId {
            context: format!("bike station '{}'", station.name),
        });
    }
    if !station.location.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: format!("bike station '{}' location", station.id),
            value: format!("({}, {})", station.location.x_m, station.location.y_m),
            reason: "coordinates must be finite".to_string(),
        });
    }
    Ok(())
}

fn validate_line(line: &LineRecord) -> Result<(), ValidationError> {
    if line.id.trim().is_empty() {
        return Err(ValidationError::EmptyId {
            context: format!("line '{}'", line.name),
        });
    }
    if line.stops.iter().any(|s| s.trim().is_empty()) {
        return Err(ValidationError::EmptyId {
            context: format!("line '{}' stops", line.id),
        });
    }
    Ok(())
}

fn validate_ridership(index: usize, record: &RidershipRecord) -> Result<(), ValidationError> {
    if record.target.trim().is_empty() {
        return Err(ValidationError::EmptyId {
            context: format!("ridership record #{index}"),
        });
    }
    if !record.count.is_finite() || record.count < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("ridership '{}' count", record.target),
            value: record.count.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}

fn validate_config(config: &AnalysisConfig) -> Result<(), ValidationError> {
    let radii = [
        ("build.transfer_radius_m", config.build.transfer_radius_m),
        ("build.proximity_radius_m", config.build.proximity_radius_m),
    ];
    for (field, value) in radii {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be non-negative and finite".to_string(),
            });
        }
    }

    let shares = [
        (
            "estimator.new_station_capture",
            config.estimator.new_station_capture,
        ),
        ("estimator.transfer_share", config.estimator.transfer_share),
    ];
    for (field, value) in shares {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be within [0, 1]".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_core::{Location, VertexKind};

    fn stop(id: &str) -> StopRecord {
        StopRecord {
            id: id.to_string(),
            name: id.to_string(),
            location: Location::new(0.0, 0.0),
            mode: VertexKind::SubwayStop,
        }
    }

    #[test]
    fn empty_snapshot_is_valid() {
        assert!(validate_snapshot(&Snapshot::new("empty")).is_ok());
    }

    #[test]
    fn negative_count_rejected() {
        let mut snapshot = Snapshot::new("s");
        snapshot.stops.push(stop("A"));
        snapshot.ridership.push(RidershipRecord::new("A", -3.0));
        let err = validate_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn duplicate_line_id_rejected() {
        let mut snapshot = Snapshot::new("s");
        for _ in 0..2 {
            snapshot.lines.push(LineRecord {
                id: "L1".to_string(),
                name: String::new(),
                stops: vec![],
            });
        }
        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn non_finite_location_rejected() {
        let mut snapshot = Snapshot::new("s");
        let mut bad = stop("A");
        bad.location = Location::new(f64::NAN, 0.0);
        snapshot.stops.push(bad);
        assert!(validate_snapshot(&snapshot).is_err());
    }

    #[test]
    fn out_of_range_share_rejected() {
        let mut snapshot = Snapshot::new("s");
        snapshot.config.estimator.transfer_share = 1.5;
        assert!(validate_snapshot(&snapshot).is_err());
    }

    #[test]
    fn future_version_rejected() {
        let mut snapshot = Snapshot::new("s");
        snapshot.version = crate::LATEST_VERSION + 1;
        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }
}
