//! Diagnostic criteria layered on top of the evaluated series.

use curvelab_core::{GlycemicThresholds, InsulinThresholds, SeriesRow, Status};

use crate::series::value_at;

/// Outcome of the glycemic criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlycemicDiagnosis {
    GestationalPositive,
    GestationalNegative,
    NormalTolerance,
    ImpairedTolerance,
    DiabetesSuggestive,
}

impl GlycemicDiagnosis {
    /// Minimum overall severity this finding imposes.
    pub fn floor(self) -> Status {
        match self {
            GlycemicDiagnosis::GestationalPositive | GlycemicDiagnosis::DiabetesSuggestive => {
                Status::Danger
            }
            GlycemicDiagnosis::ImpairedTolerance => Status::Warning,
            GlycemicDiagnosis::GestationalNegative | GlycemicDiagnosis::NormalTolerance => {
                Status::Normal
            }
        }
    }
}

/// Insulin secretion pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsulinPattern {
    Expected,
    DelayedPeak { peak_time: u32 },
    SlowReturn,
}

impl InsulinPattern {
    pub fn floor(self) -> Status {
        match self {
            InsulinPattern::Expected => Status::Normal,
            InsulinPattern::DelayedPeak { .. } | InsulinPattern::SlowReturn => Status::Warning,
        }
    }
}

/// Apply IADPSG (pregnant) or IGT/diabetes (non-pregnant) criteria.
///
/// The 120' value is the anchor: without it no diagnosis is made.
pub fn diagnose_glycemia(
    rows: &[SeriesRow],
    pregnant: bool,
    thresholds: &GlycemicThresholds,
) -> Option<GlycemicDiagnosis> {
    let v120 = value_at(rows, 120)?;

    if pregnant {
        let checks = [
            (value_at(rows, 0), thresholds.gdm_fasting),
            (value_at(rows, 60), thresholds.gdm_60),
            (Some(v120), thresholds.gdm_120),
        ];
        let over_cutoff = checks
            .iter()
            .any(|(value, cutoff)| value.is_some_and(|v| v >= *cutoff));
        return Some(if over_cutoff {
            GlycemicDiagnosis::GestationalPositive
        } else {
            GlycemicDiagnosis::GestationalNegative
        });
    }

    Some(if v120 < thresholds.igt_120 {
        GlycemicDiagnosis::NormalTolerance
    } else if v120 < thresholds.diabetes_120 {
        GlycemicDiagnosis::ImpairedTolerance
    } else {
        GlycemicDiagnosis::DiabetesSuggestive
    })
}

/// Classify the insulin curve by the timing of its peak and its return to baseline.
///
/// Returns `None` when the series holds no numeric value.
pub fn classify_insulin(
    rows: &[SeriesRow],
    thresholds: &InsulinThresholds,
) -> Option<InsulinPattern> {
    let (peak_time, _) = rows
        .iter()
        .filter_map(|row| row.value.map(|value| (row.time, value)))
        .fold(None, |best: Option<(u32, f64)>, (time, value)| match best {
            Some((_, peak)) if value <= peak => best,
            _ => Some((time, value)),
        })?;

    let slow_return = match (value_at(rows, 0), value_at(rows, 120)) {
        (Some(baseline), Some(late)) => late > baseline * thresholds.return_ratio,
        _ => false,
    };

    if peak_time <= thresholds.peak_time_limit && !slow_return {
        Some(InsulinPattern::Expected)
    } else if peak_time > thresholds.peak_time_limit {
        Some(InsulinPattern::DelayedPeak { peak_time })
    } else {
        Some(InsulinPattern::SlowReturn)
    }
}
