//! Point-by-point classification of a time series against its reference ranges.

use curvelab_core::{
    Measurement, MissingRangePolicy, PointStatus, RangeTable, RefRange, SeriesRow, Status,
};
use tracing::{debug, warn};

/// Rows of one series plus the severity they imply on their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluatedSeries {
    pub rows: Vec<SeriesRow>,
    pub severity: Status,
}

/// Evaluate parallel `times`/`values` against `ranges`, one row per time label.
///
/// A value slot that is absent, `null` or not numeric yields a `missing` row and
/// leaves severity alone. `low` lifts severity to `warning` at most; `high` lifts it
/// to `danger`.
pub fn evaluate_series(
    times: &[u32],
    values: &[Option<Measurement>],
    ranges: &RangeTable,
    policy: MissingRangePolicy,
) -> EvaluatedSeries {
    let mut severity = Status::Normal;
    let mut rows = Vec::with_capacity(times.len());

    for (index, &time) in times.iter().enumerate() {
        let value = values
            .get(index)
            .and_then(Option::as_ref)
            .and_then(Measurement::as_f64);

        let (range, status) = match ranges.get(time) {
            Some(range) => (range, classify(value, range)),
            None => {
                let status = match (policy, value) {
                    (_, None) => PointStatus::Missing,
                    (MissingRangePolicy::ZeroRange, value) => classify(value, RefRange::ZERO),
                    (MissingRangePolicy::Unranged, Some(_)) => PointStatus::Unranged,
                };
                if value.is_some() {
                    warn!(time, ?policy, "no reference range for time point");
                }
                (RefRange::ZERO, status)
            }
        };

        match status {
            PointStatus::Low => severity.raise(Status::Warning),
            PointStatus::High => severity.raise(Status::Danger),
            _ => {}
        }
        debug!(time, status = ?status, "classified time point");

        rows.push(SeriesRow {
            time,
            value,
            range,
            status,
        });
    }

    EvaluatedSeries { rows, severity }
}

fn classify(value: Option<f64>, range: RefRange) -> PointStatus {
    match value {
        None => PointStatus::Missing,
        Some(v) if v < range.min => PointStatus::Low,
        Some(v) if v > range.max => PointStatus::High,
        Some(_) => PointStatus::Normal,
    }
}

/// Numeric value at the first row carrying `time`.
pub fn value_at(rows: &[SeriesRow], time: u32) -> Option<f64> {
    rows.iter().find(|row| row.time == time).and_then(|row| row.value)
}
