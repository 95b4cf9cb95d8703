//! Report wording for both interpreters.

use curvelab_core::{AntibiogramEntry, GrowthResult, Status};

use crate::antibiogram::ResistancePattern;
use crate::diagnostics::{GlycemicDiagnosis, InsulinPattern};

pub const NO_GROWTH_SUMMARY: &str = "Nessuna crescita significativa nel campione inviato.";
pub const GENERIC_ORGANISM: &str = "microrganismo isolato";
pub const ENTERIC_WARNING: &str = "Nei quadri enterici molte infezioni sono autolimitanti: \
     l'antibiotico si valuta solo se clinicamente indicato.";
pub const THERAPY_WARNING: &str = "La scelta terapeutica finale deve considerare sede infezione, \
     dosaggio, allergie, gravidanza, funzione renale ed epidemiologia locale.";

pub fn curve_summary(status: Status) -> &'static str {
    match status {
        Status::Normal => "Referto complessivamente nei limiti di riferimento.",
        Status::Warning => "Referto con alterazioni borderline/moderate da correlare clinicamente.",
        Status::Danger => "Referto con alterazioni: necessaria valutazione medica.",
    }
}

pub fn glycemic_text(diagnosis: GlycemicDiagnosis) -> &'static str {
    match diagnosis {
        GlycemicDiagnosis::GestationalPositive => {
            "Criteri IADPSG compatibili con diabete gestazionale (almeno un valore sopra soglia)."
        }
        GlycemicDiagnosis::GestationalNegative => "Criteri IADPSG nei limiti.",
        GlycemicDiagnosis::NormalTolerance => "Tolleranza glucidica normale.",
        GlycemicDiagnosis::ImpairedTolerance => "Ridotta tolleranza al glucosio (IGT).",
        GlycemicDiagnosis::DiabetesSuggestive => {
            "Valore suggestivo di diabete mellito (da confermare clinicamente)."
        }
    }
}

pub fn insulin_text(pattern: InsulinPattern) -> String {
    match pattern {
        InsulinPattern::Expected => "Pattern insulinemico nel range atteso.".to_string(),
        InsulinPattern::DelayedPeak { peak_time } => format!(
            "Picco insulinemico ritardato (picco a {peak_time}'). Possibile insulino-resistenza."
        ),
        InsulinPattern::SlowReturn => "Ritorno lento verso il basale a 120'.".to_string(),
    }
}

pub fn pattern_text(pattern: ResistancePattern) -> String {
    match pattern {
        ResistancePattern::MultiDrug { threshold } => format!(
            "Multi-resistenza (MDR) sospetta: almeno {threshold} antibiotici classificati R."
        ),
        ResistancePattern::EsblSuspected => "Pattern compatibile con possibile ESBL: resistenza a \
             fluorochinoloni e cefalosporine di III generazione."
            .to_string(),
        ResistancePattern::CarbapenemResistance => {
            "Attenzione: resistenza ai carbapenemi nel pannello testato.".to_string()
        }
        ResistancePattern::EntericCaution => {
            "Nelle infezioni enteriche valutare terapia antibiotica solo se clinicamente indicata."
                .to_string()
        }
    }
}

/// Summary sentence naming the organism and the first `max_listed` ranked agents.
pub fn antibiogram_summary(
    growth: GrowthResult,
    organism: Option<&str>,
    recommended: &[AntibiogramEntry],
    max_listed: usize,
) -> String {
    if growth == GrowthResult::Negative {
        return NO_GROWTH_SUMMARY.to_string();
    }

    let target = organism
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(GENERIC_ORGANISM);

    if recommended.is_empty() {
        return format!(
            "{target}: nessun antibiotico classificato come sensibile (S) nel pannello inserito. \
             Valutare consulto infettivologico e ulteriore AST."
        );
    }

    let listed: Vec<String> = recommended
        .iter()
        .take(max_listed)
        .map(describe_agent)
        .collect();
    format!(
        "{target}: antibiotici risultati sensibili nel pannello testato -> {}.",
        listed.join("; ")
    )
}

fn describe_agent(entry: &AntibiogramEntry) -> String {
    if entry.commercial_names.is_empty() {
        entry.antibiotic_name.clone()
    } else {
        format!(
            "{} (esempi: {})",
            entry.antibiotic_name,
            entry.commercial_names.join(", ")
        )
    }
}

pub fn antibiogram_warnings(stool_specimen: bool, growth: GrowthResult) -> Vec<String> {
    let mut warnings = Vec::new();
    if stool_specimen {
        warnings.push(ENTERIC_WARNING.to_string());
    }
    if growth != GrowthResult::Negative {
        warnings.push(THERAPY_WARNING.to_string());
    }
    warnings
}
