//! Read-only tables the engine is parameterized with.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{LabError, RangeTable};

/// Everything the interpreters need besides the payload itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterpretationConfig {
    #[serde(default)]
    pub references: ReferenceProfile,
    #[serde(default)]
    pub glycemic: GlycemicThresholds,
    #[serde(default)]
    pub insulin: InsulinThresholds,
    #[serde(default)]
    pub stewardship: StewardshipPolicy,
    #[serde(default)]
    pub markers: ResistanceMarkers,
    #[serde(default)]
    pub missing_range: MissingRangePolicy,
}

/// What to do when a time point has no reference range.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingRangePolicy {
    /// Substitute `(0, 0)`: any positive value then reads as `high`.
    #[default]
    ZeroRange,
    /// Report the point as `unranged` and leave severity untouched.
    Unranged,
}

/// Glycemic cut-offs in mg/dL (IADPSG for pregnancy, ADA/WHO otherwise).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlycemicThresholds {
    pub gdm_fasting: f64,
    pub gdm_60: f64,
    pub gdm_120: f64,
    pub igt_120: f64,
    pub diabetes_120: f64,
}

impl Default for GlycemicThresholds {
    fn default() -> Self {
        Self {
            gdm_fasting: 92.0,
            gdm_60: 180.0,
            gdm_120: 153.0,
            igt_120: 140.0,
            diabetes_120: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsulinThresholds {
    /// Latest peak time (minutes) still considered an expected response.
    pub peak_time_limit: u32,
    /// Maximum 120'/0' ratio before the return to baseline counts as slow.
    pub return_ratio: f64,
}

impl Default for InsulinThresholds {
    fn default() -> Self {
        Self {
            peak_time_limit: 60,
            return_ratio: 3.0,
        }
    }
}

/// Ranking weights for AWaRe groups; lower sorts first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StewardshipPolicy {
    pub access: u8,
    pub watch: u8,
    pub reserve: u8,
    pub other: u8,
    pub unknown: u8,
    /// How many ranked agents the summary sentence names.
    pub max_listed: usize,
}

impl Default for StewardshipPolicy {
    fn default() -> Self {
        Self {
            access: 0,
            watch: 1,
            reserve: 2,
            other: 3,
            unknown: 4,
            max_listed: 6,
        }
    }
}

/// Lower-case name fragments used to spot resistance syndromes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResistanceMarkers {
    pub fluoroquinolones: Vec<String>,
    pub third_gen_cephalosporins: Vec<String>,
    pub carbapenems: Vec<String>,
    pub stool_specimens: Vec<String>,
    pub mdr_threshold: usize,
    pub enteric_threshold: usize,
}

impl Default for ResistanceMarkers {
    fn default() -> Self {
        Self {
            fluoroquinolones: strings(&["cipro", "levoflox"]),
            third_gen_cephalosporins: strings(&["ceftriax", "cefotax", "ceftaz"]),
            carbapenems: strings(&["meropen", "imipenem", "ertapen"]),
            stool_specimens: strings(&["feci", "stool"]),
            mdr_threshold: 3,
            enteric_threshold: 2,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Analytical methods printed alongside each series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Methodologies {
    pub glyc: String,
    pub ins: String,
}

impl Default for Methodologies {
    fn default() -> Self {
        Self {
            glyc: "Metodo enzimatico (Esochinasi/G6PDH) - Fotometria UV".to_string(),
            ins: "Immunodosaggio in Chemiluminescenza (CLIA / ECLIA)".to_string(),
        }
    }
}

/// Laboratory reference profile: per-timepoint ranges plus provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceProfile {
    pub profile_id: String,
    pub profile_name: String,
    pub dataset_name: String,
    pub dataset_version: String,
    pub updated_at: Option<NaiveDate>,
    pub sources: Vec<String>,
    pub notes: Option<String>,
    pub methods: Methodologies,
    pub glycemic: RangeTable,
    pub glycemic_pregnant: RangeTable,
    pub insulin: RangeTable,
}

impl Default for ReferenceProfile {
    fn default() -> Self {
        Self {
            profile_id: "global-endocrine-consensus-v2".to_string(),
            profile_name: "Global Endocrine Consensus DB (profilo locale)".to_string(),
            dataset_name: "Global Endocrine Guideline Profile".to_string(),
            dataset_version: "2026.02.10".to_string(),
            updated_at: NaiveDate::from_ymd_opt(2026, 2, 10),
            sources: strings(&[
                "ADA Standards of Care in Diabetes 2026 (Diagnosis and Classification of Diabetes)",
                "ADA Diabetes Diagnosis & Tests (criteri OGTT/FPG/A1C)",
                "IDF Global Clinical Practice Recommendations 2025",
                "WHO guideline: Hyperglycaemia first detected in pregnancy",
                "IADPSG Consensus (75 g OGTT gravidanza: 92/180/153 mg/dL)",
                "Clinical Chemistry / ADA insulin standardization",
            ]),
            notes: Some(
                "Le soglie diagnostiche principali OGTT sono allineate alle linee guida \
                 internazionali. I punti intermedi (30/90/180) e la curva insulinemica sono \
                 configurabili dal laboratorio."
                    .to_string(),
            ),
            methods: Methodologies::default(),
            glycemic: RangeTable::from_pairs(&[
                (0, 60.0, 100.0),
                (30, 110.0, 160.0),
                (60, 120.0, 180.0),
                (90, 90.0, 150.0),
                (120, 60.0, 140.0),
                (180, 60.0, 110.0),
            ]),
            glycemic_pregnant: RangeTable::from_pairs(&[
                (0, 60.0, 92.0),
                (30, 100.0, 170.0),
                (60, 100.0, 180.0),
                (90, 80.0, 165.0),
                (120, 60.0, 153.0),
                (180, 60.0, 110.0),
            ]),
            // No single insulin standard exists; laboratories tune these to their assay.
            insulin: RangeTable::from_pairs(&[
                (0, 2.0, 25.0),
                (30, 20.0, 100.0),
                (60, 20.0, 120.0),
                (90, 20.0, 100.0),
                (120, 6.0, 60.0),
                (180, 2.0, 30.0),
            ]),
        }
    }
}

impl ReferenceProfile {
    /// Build a profile from a JSON overrides document. Absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, LabError> {
        let overrides: ProfileOverrides =
            serde_json::from_str(json).map_err(|err| LabError::Profile(err.to_string()))?;
        Ok(Self::from(overrides))
    }

    /// Glycemic table for the requested population.
    pub fn glycemic_table(&self, pregnant: bool) -> &RangeTable {
        if pregnant {
            &self.glycemic_pregnant
        } else {
            &self.glycemic
        }
    }
}

/// Partial profile, e.g. a laboratory's local adjustments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileOverrides {
    #[serde(default, alias = "profile_key")]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub dataset_name: Option<String>,
    #[serde(default)]
    pub dataset_version: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub methods: Option<Methodologies>,
    #[serde(default, alias = "default_glyc_refs")]
    pub glycemic: Option<RangeTable>,
    #[serde(default, alias = "pregnant_glyc_refs")]
    pub glycemic_pregnant: Option<RangeTable>,
    #[serde(default, alias = "default_ins_refs")]
    pub insulin: Option<RangeTable>,
}

impl From<ProfileOverrides> for ReferenceProfile {
    fn from(overrides: ProfileOverrides) -> Self {
        let mut base = ReferenceProfile::default();
        if let Some(id) = overrides.profile_id {
            base.profile_id = id;
        }
        if let Some(name) = overrides.profile_name {
            base.profile_name = name;
        }
        if let Some(dataset) = overrides.dataset_name {
            base.dataset_name = dataset;
        }
        if let Some(version) = overrides.dataset_version {
            base.dataset_version = version;
        }
        if overrides.updated_at.is_some() {
            base.updated_at = overrides.updated_at;
        }
        if let Some(sources) = overrides.sources {
            base.sources = sources;
        }
        if overrides.notes.is_some() {
            base.notes = overrides.notes;
        }
        if let Some(methods) = overrides.methods {
            base.methods = methods;
        }
        // An empty table would turn every point into a defaulted range.
        if let Some(table) = overrides.glycemic.filter(|t| !t.is_empty()) {
            base.glycemic = table;
        }
        if let Some(table) = overrides.glycemic_pregnant.filter(|t| !t.is_empty()) {
            base.glycemic_pregnant = table;
        }
        if let Some(table) = overrides.insulin.filter(|t| !t.is_empty()) {
            base.insulin = table;
        }
        base
    }
}
