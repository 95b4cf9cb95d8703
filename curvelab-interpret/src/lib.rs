//! Rule-based interpretation of OGTT curves and antibiograms.
//!
//! Both interpreters are pure: the same payload and configuration always produce the
//! same result, and malformed clinical values degrade to `missing`/absent instead of
//! failing. Only the JSON entry points can return an error, for payloads that do not
//! have the expected shape.

use std::collections::BTreeMap;

use curvelab_core::{
    AntibiogramEntry, AntibiogramInterpretation, AntibiogramPayload, CurveInterpretation,
    CurvePayload, GrowthResult, InterpretationConfig, LabError, RangeTable, RefRange, Status,
    Susceptibility,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

pub mod antibiogram;
pub mod diagnostics;
pub mod narrative;
pub mod series;

use antibiogram::{
    detect_resistance_patterns, growth_result, is_stool_specimen, normalize_entry,
    rank_recommended,
};
use diagnostics::{classify_insulin, diagnose_glycemia};
use series::{evaluate_series, EvaluatedSeries};

/// Interpret a curve payload given as a JSON string.
pub fn interpret_curve_str(
    payload_json: &str,
    config: &InterpretationConfig,
) -> Result<CurveInterpretation, LabError> {
    let payload: CurvePayload =
        serde_json::from_str(payload_json).map_err(|err| LabError::Parse(err.to_string()))?;
    Ok(interpret_curve(&payload, config))
}

/// Interpret a curve payload given as a `serde_json::Value`.
pub fn interpret_curve_value(
    payload: &Value,
    config: &InterpretationConfig,
) -> Result<CurveInterpretation, LabError> {
    let payload =
        CurvePayload::deserialize(payload).map_err(|err| LabError::Parse(err.to_string()))?;
    Ok(interpret_curve(&payload, config))
}

/// Interpret an antibiogram payload given as a JSON string.
pub fn interpret_antibiogram_str(
    payload_json: &str,
    config: &InterpretationConfig,
) -> Result<AntibiogramInterpretation, LabError> {
    let payload: AntibiogramPayload =
        serde_json::from_str(payload_json).map_err(|err| LabError::Parse(err.to_string()))?;
    Ok(interpret_antibiogram(&payload, config))
}

/// Interpret an antibiogram payload given as a `serde_json::Value`.
pub fn interpret_antibiogram_value(
    payload: &Value,
    config: &InterpretationConfig,
) -> Result<AntibiogramInterpretation, LabError> {
    let payload = AntibiogramPayload::deserialize(payload)
        .map_err(|err| LabError::Parse(err.to_string()))?;
    Ok(interpret_antibiogram(&payload, config))
}

/// Evaluate both series, apply the diagnostic criteria and fold everything into one
/// severity. The overall status only ever moves up while rules are applied.
pub fn interpret_curve(
    payload: &CurvePayload,
    config: &InterpretationConfig,
) -> CurveInterpretation {
    let glyc_ranges = resolve_ranges(
        "glycemic",
        &payload.glyc_refs,
        config.references.glycemic_table(payload.pregnant_mode),
    );
    let glycemic = evaluate_series(
        &payload.glyc_times,
        &payload.glyc_values,
        &glyc_ranges,
        config.missing_range,
    );

    let with_insulin = payload.curve_mode.includes_insulin();
    let insulin = if with_insulin {
        let ins_ranges = resolve_ranges("insulin", &payload.ins_refs, &config.references.insulin);
        evaluate_series(
            &payload.ins_times,
            &payload.ins_values,
            &ins_ranges,
            config.missing_range,
        )
    } else {
        EvaluatedSeries::default()
    };

    let mut overall = Status::Normal;
    overall.raise(glycemic.severity);
    overall.raise(insulin.severity);
    debug!(
        glycemic = glycemic.severity.as_str(),
        insulin = insulin.severity.as_str(),
        "series evaluated"
    );

    let glycemic_diagnosis =
        diagnose_glycemia(&glycemic.rows, payload.pregnant_mode, &config.glycemic);
    if let Some(diagnosis) = glycemic_diagnosis {
        overall.raise(diagnosis.floor());
        debug!(?diagnosis, overall = overall.as_str(), "glycemic criteria applied");
    }

    let insulin_pattern = if with_insulin {
        classify_insulin(&insulin.rows, &config.insulin)
    } else {
        None
    };
    if let Some(pattern) = insulin_pattern {
        overall.raise(pattern.floor());
        debug!(?pattern, overall = overall.as_str(), "insulin pattern applied");
    }

    CurveInterpretation {
        overall_status: overall,
        summary: narrative::curve_summary(overall).to_string(),
        glycemic_rows: glycemic.rows,
        insulin_rows: insulin.rows,
        glycemic_interpretation: glycemic_diagnosis
            .map(|diagnosis| narrative::glycemic_text(diagnosis).to_string()),
        insulin_interpretation: insulin_pattern.map(narrative::insulin_text),
    }
}

/// Ranges supplied with the exam win; an empty map falls back to the profile table.
fn resolve_ranges(
    series: &str,
    supplied: &BTreeMap<String, RefRange>,
    profile: &RangeTable,
) -> RangeTable {
    if supplied.is_empty() {
        debug!(series, "using reference profile ranges");
        return profile.clone();
    }

    let (table, rejected) = RangeTable::from_labels(supplied);
    if !rejected.is_empty() {
        warn!(series, ?rejected, "ignoring reference ranges with non-numeric time labels");
    }
    table
}

/// Categorize, rank and annotate an antibiogram.
pub fn interpret_antibiogram(
    payload: &AntibiogramPayload,
    config: &InterpretationConfig,
) -> AntibiogramInterpretation {
    let specimen = payload.specimen_type.as_deref().unwrap_or_default();
    let growth = growth_result(payload.growth_result.as_deref());
    let entries: Vec<AntibiogramEntry> = payload.antibiogram.iter().map(normalize_entry).collect();

    let by_category = |category: Susceptibility| -> Vec<AntibiogramEntry> {
        entries
            .iter()
            .filter(|entry| entry.interpretation == category)
            .cloned()
            .collect()
    };
    let sensitive = by_category(Susceptibility::Sensitive);
    let intermediate = by_category(Susceptibility::Intermediate);
    let resistant = by_category(Susceptibility::Resistant);

    let recommended = match growth {
        GrowthResult::Negative => Vec::new(),
        GrowthResult::Positive => rank_recommended(&sensitive, &config.stewardship),
    };
    let first_choice = recommended.first().cloned();

    let resistance_patterns: Vec<String> =
        detect_resistance_patterns(specimen, &resistant, &config.markers)
            .into_iter()
            .map(narrative::pattern_text)
            .collect();

    debug!(
        sensitive = sensitive.len(),
        intermediate = intermediate.len(),
        resistant = resistant.len(),
        patterns = resistance_patterns.len(),
        "antibiogram categorized"
    );

    let summary = narrative::antibiogram_summary(
        growth,
        payload.microorganism.as_deref(),
        &recommended,
        config.stewardship.max_listed,
    );
    let warnings =
        narrative::antibiogram_warnings(is_stool_specimen(specimen, &config.markers), growth);

    AntibiogramInterpretation {
        sensitive,
        intermediate,
        resistant,
        recommended,
        first_choice,
        resistance_patterns,
        summary,
        warnings,
    }
}
