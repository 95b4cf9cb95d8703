//! Core data model shared by the curve and antibiogram interpreters.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{
    GlycemicThresholds, InsulinThresholds, InterpretationConfig, Methodologies,
    MissingRangePolicy, ProfileOverrides, ReferenceProfile, ResistanceMarkers, StewardshipPolicy,
};

/// Overall severity of an interpretation.
///
/// Variants are declared in escalation order, so `Ord` gives
/// `Normal < Warning < Danger`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Normal,
    Warning,
    Danger,
}

impl Status {
    /// The higher of the two levels.
    pub fn escalate(self, other: Status) -> Status {
        self.max(other)
    }

    /// Raise `self` to at least `floor`. Never lowers an already reached level.
    pub fn raise(&mut self, floor: Status) {
        *self = self.escalate(floor);
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Warning => "warning",
            Status::Danger => "danger",
        }
    }
}

/// Classification of a single time point against its reference range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PointStatus {
    Normal,
    Low,
    High,
    Missing,
    /// No reference range was available and the config asked not to default one.
    Unranged,
}

/// Inclusive reference interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RefRange {
    pub min: f64,
    pub max: f64,
}

impl RefRange {
    pub const ZERO: RefRange = RefRange { min: 0.0, max: 0.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Reference ranges keyed by time label in minutes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RangeTable(BTreeMap<u32, RefRange>);

impl RangeTable {
    pub fn from_pairs(pairs: &[(u32, f64, f64)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|&(time, min, max)| (time, RefRange::new(min, max)))
                .collect(),
        )
    }

    /// Canonicalize text-keyed ranges (as they arrive on the wire) to minute keys.
    ///
    /// Returns the table together with the labels that were not unsigned integers.
    pub fn from_labels(labels: &BTreeMap<String, RefRange>) -> (Self, Vec<String>) {
        let mut table = BTreeMap::new();
        let mut rejected = Vec::new();
        for (label, range) in labels {
            match label.trim().parse::<u32>() {
                Ok(time) => {
                    table.insert(time, *range);
                }
                Err(_) => rejected.push(label.clone()),
            }
        }
        (Self(table), rejected)
    }

    pub fn get(&self, time: u32) -> Option<RefRange> {
        self.0.get(&time).copied()
    }

    pub fn insert(&mut self, time: u32, range: RefRange) {
        self.0.insert(time, range);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, RefRange)> + '_ {
        self.0.iter().map(|(time, range)| (*time, *range))
    }
}

/// Raw measured value as supplied by the caller: a JSON number or numeric-like text.
///
/// Any other JSON shape (booleans, objects, arrays) lands in `Other` so one bad cell
/// never rejects the whole payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Measurement {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Measurement {
    /// Numeric reading, or `None` when the value is not a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Measurement::Number(value) => value.is_finite().then_some(*value),
            Measurement::Text(raw) => parse_decimal(raw),
            Measurement::Other(_) => None,
        }
    }

    /// Text form, as it would be printed on a report. `None` for unsupported shapes.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Measurement::Number(value) => Some(value.to_string()),
            Measurement::Text(raw) => Some(raw.clone()),
            Measurement::Other(_) => None,
        }
    }
}

/// Parse a decimal written with either `.` or `,` as separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Which series an OGTT exam measures.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CurveMode {
    #[default]
    Glyc,
    Ins,
    Combined,
}

impl CurveMode {
    pub fn includes_insulin(self) -> bool {
        matches!(self, CurveMode::Ins | CurveMode::Combined)
    }
}

/// OGTT exam as handed over by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurvePayload {
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub requester_doctor: Option<String>,
    #[serde(default)]
    pub acceptance_number: Option<String>,
    #[serde(default)]
    pub curve_mode: CurveMode,
    #[serde(default)]
    pub pregnant_mode: bool,
    #[serde(default = "default_glucose_load")]
    pub glucose_load_g: u32,
    #[serde(default = "default_glyc_unit")]
    pub glyc_unit: String,
    #[serde(default = "default_ins_unit")]
    pub ins_unit: String,
    #[serde(default)]
    pub glyc_times: Vec<u32>,
    #[serde(default)]
    pub glyc_values: Vec<Option<Measurement>>,
    #[serde(default)]
    pub ins_times: Vec<u32>,
    #[serde(default)]
    pub ins_values: Vec<Option<Measurement>>,
    #[serde(default)]
    pub glyc_refs: BTreeMap<String, RefRange>,
    #[serde(default)]
    pub ins_refs: BTreeMap<String, RefRange>,
    #[serde(default)]
    pub methodology: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for CurvePayload {
    fn default() -> Self {
        Self {
            patient_id: None,
            exam_date: None,
            requester_doctor: None,
            acceptance_number: None,
            curve_mode: CurveMode::Glyc,
            pregnant_mode: false,
            glucose_load_g: default_glucose_load(),
            glyc_unit: default_glyc_unit(),
            ins_unit: default_ins_unit(),
            glyc_times: Vec::new(),
            glyc_values: Vec::new(),
            ins_times: Vec::new(),
            ins_values: Vec::new(),
            glyc_refs: BTreeMap::new(),
            ins_refs: BTreeMap::new(),
            methodology: None,
            notes: None,
        }
    }
}

fn default_glucose_load() -> u32 {
    75
}

fn default_glyc_unit() -> String {
    "mg/dL".to_string()
}

fn default_ins_unit() -> String {
    "µUI/mL".to_string()
}

/// One evaluated time point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesRow {
    pub time: u32,
    pub value: Option<f64>,
    pub range: RefRange,
    pub status: PointStatus,
}

/// Result of interpreting an OGTT curve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurveInterpretation {
    pub overall_status: Status,
    pub summary: String,
    pub glycemic_rows: Vec<SeriesRow>,
    pub insulin_rows: Vec<SeriesRow>,
    pub glycemic_interpretation: Option<String>,
    pub insulin_interpretation: Option<String>,
}

/// Normalized susceptibility category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Susceptibility {
    #[serde(rename = "S")]
    Sensitive,
    #[serde(rename = "I")]
    Intermediate,
    #[serde(rename = "R")]
    Resistant,
    #[serde(rename = "-")]
    NotReported,
}

/// WHO AWaRe stewardship classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StewardshipGroup {
    Access,
    Watch,
    Reserve,
    Other,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Culture growth outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrowthResult {
    Positive,
    Negative,
}

/// Antibiogram row as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AntibiogramEntryInput {
    pub antibiotic_name: String,
    #[serde(default, alias = "class")]
    pub antibiotic_class: Option<String>,
    #[serde(default)]
    pub active_ingredient: Option<String>,
    #[serde(default)]
    pub breakpoint_ref: Option<String>,
    #[serde(default)]
    pub mic: Option<Measurement>,
    #[serde(default)]
    pub interpretation: Option<String>,
    #[serde(default, alias = "aware_group")]
    pub stewardship_group: Option<String>,
    #[serde(default)]
    pub commercial_names: Option<Vec<String>>,
}

/// Antibiogram row after normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AntibiogramEntry {
    pub antibiotic_name: String,
    pub antibiotic_class: Option<String>,
    pub active_ingredient: Option<String>,
    pub breakpoint_ref: Option<String>,
    pub mic: Option<String>,
    pub mic_numeric: Option<f64>,
    pub interpretation: Susceptibility,
    pub stewardship_group: StewardshipGroup,
    pub commercial_names: Vec<String>,
}

/// Microbiology exam as handed over by the persistence layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AntibiogramPayload {
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub requester_doctor: Option<String>,
    #[serde(default)]
    pub acceptance_number: Option<String>,
    #[serde(default)]
    pub specimen_type: Option<String>,
    #[serde(default)]
    pub growth_result: Option<String>,
    #[serde(default, alias = "organism")]
    pub microorganism: Option<String>,
    #[serde(default)]
    pub methodology: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub antibiogram: Vec<AntibiogramEntryInput>,
}

/// Result of interpreting an antibiogram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AntibiogramInterpretation {
    pub sensitive: Vec<AntibiogramEntry>,
    pub intermediate: Vec<AntibiogramEntry>,
    pub resistant: Vec<AntibiogramEntry>,
    pub recommended: Vec<AntibiogramEntry>,
    pub first_choice: Option<AntibiogramEntry>,
    pub resistance_patterns: Vec<String>,
    pub summary: String,
    pub warnings: Vec<String>,
}

/// Errors raised at the JSON boundaries. The engine itself never fails on clinical data.
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("Could not read payload: {0}")]
    Parse(String),
    #[error("Unusable reference profile: {0}")]
    Profile(String),
}
