//! Antibiogram normalization, stewardship ranking and resistance pattern heuristics.

use std::cmp::Ordering;

use curvelab_core::{
    AntibiogramEntry, AntibiogramEntryInput, GrowthResult, Measurement, ResistanceMarkers,
    StewardshipGroup, StewardshipPolicy, Susceptibility,
};

/// Map an S/I/R code or one of its spelled-out synonyms. Anything else is `-`.
pub fn normalize_interpretation(raw: Option<&str>) -> Susceptibility {
    let code = raw.unwrap_or_default().trim().to_uppercase();
    match code.as_str() {
        "S" | "SUSCETTIBILE" | "SENSIBILE" | "SENSITIVE" | "SUSCEPTIBLE" => {
            Susceptibility::Sensitive
        }
        "I" | "INTERMEDIO" | "INTERMEDIATE" | "INCREASED EXPOSURE" => {
            Susceptibility::Intermediate
        }
        "R" | "RESISTENTE" | "RESISTANT" => Susceptibility::Resistant,
        _ => Susceptibility::NotReported,
    }
}

pub fn normalize_group(raw: Option<&str>) -> StewardshipGroup {
    match raw.unwrap_or_default().trim().to_lowercase().as_str() {
        "access" => StewardshipGroup::Access,
        "watch" => StewardshipGroup::Watch,
        "reserve" => StewardshipGroup::Reserve,
        "other" => StewardshipGroup::Other,
        _ => StewardshipGroup::Unknown,
    }
}

/// Numeric MIC from strings like `<=0,5`, `>32` or `0.25 mg/L`.
///
/// Everything but digits and `.` is stripped (a `,` separator counts as `.`).
pub fn parse_mic(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .map(|c| if c == ',' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn normalize_entry(input: &AntibiogramEntryInput) -> AntibiogramEntry {
    let mic = input.mic.as_ref().and_then(Measurement::to_text);
    let mic_numeric = mic.as_deref().and_then(parse_mic);
    let commercial_names = input
        .commercial_names
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    AntibiogramEntry {
        antibiotic_name: input.antibiotic_name.trim().to_string(),
        antibiotic_class: input.antibiotic_class.clone(),
        active_ingredient: input.active_ingredient.clone(),
        breakpoint_ref: input.breakpoint_ref.clone(),
        mic,
        mic_numeric,
        interpretation: normalize_interpretation(input.interpretation.as_deref()),
        stewardship_group: normalize_group(input.stewardship_group.as_deref()),
        commercial_names,
    }
}

pub fn growth_result(raw: Option<&str>) -> GrowthResult {
    match raw.unwrap_or_default().trim().to_lowercase().as_str() {
        "negative" | "negativo" => GrowthResult::Negative,
        _ => GrowthResult::Positive,
    }
}

fn group_priority(group: StewardshipGroup, policy: &StewardshipPolicy) -> u8 {
    match group {
        StewardshipGroup::Access => policy.access,
        StewardshipGroup::Watch => policy.watch,
        StewardshipGroup::Reserve => policy.reserve,
        StewardshipGroup::Other => policy.other,
        StewardshipGroup::Unknown => policy.unknown,
    }
}

struct RankKey {
    priority: u8,
    mic: Option<f64>,
    name: String,
    position: usize,
}

impl RankKey {
    fn compare(&self, other: &RankKey) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| compare_mic(self.mic, other.mic))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.position.cmp(&other.position))
    }
}

// Missing MIC sorts after every measured one.
fn compare_mic(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Susceptible agents ordered by stewardship group, then MIC, then name.
///
/// Equal keys keep their input order.
pub fn rank_recommended(
    entries: &[AntibiogramEntry],
    policy: &StewardshipPolicy,
) -> Vec<AntibiogramEntry> {
    let mut keyed: Vec<(RankKey, &AntibiogramEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.interpretation == Susceptibility::Sensitive)
        .map(|(position, entry)| {
            let key = RankKey {
                priority: group_priority(entry.stewardship_group, policy),
                mic: entry.mic_numeric,
                name: entry.antibiotic_name.to_lowercase(),
                position,
            };
            (key, entry)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| a.compare(b));
    keyed.into_iter().map(|(_, entry)| entry.clone()).collect()
}

/// Heuristic resistance findings, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResistancePattern {
    MultiDrug { threshold: usize },
    EsblSuspected,
    CarbapenemResistance,
    EntericCaution,
}

pub fn is_stool_specimen(specimen: &str, markers: &ResistanceMarkers) -> bool {
    let specimen = specimen.trim();
    markers
        .stool_specimens
        .iter()
        .any(|stool| stool.eq_ignore_ascii_case(specimen))
}

pub fn detect_resistance_patterns(
    specimen: &str,
    resistant: &[AntibiogramEntry],
    markers: &ResistanceMarkers,
) -> Vec<ResistancePattern> {
    let names: Vec<String> = resistant
        .iter()
        .map(|entry| {
            let mut haystack = entry.antibiotic_name.to_lowercase();
            if let Some(ingredient) = &entry.active_ingredient {
                haystack.push(' ');
                haystack.push_str(&ingredient.to_lowercase());
            }
            haystack
        })
        .collect();
    let any_marker = |list: &[String]| {
        names.iter().any(|name| {
            list.iter()
                .any(|marker| name.contains(marker.to_lowercase().as_str()))
        })
    };

    let mut patterns = Vec::new();
    if resistant.len() >= markers.mdr_threshold {
        patterns.push(ResistancePattern::MultiDrug {
            threshold: markers.mdr_threshold,
        });
    }
    if any_marker(&markers.fluoroquinolones) && any_marker(&markers.third_gen_cephalosporins) {
        patterns.push(ResistancePattern::EsblSuspected);
    }
    if any_marker(&markers.carbapenems) {
        patterns.push(ResistancePattern::CarbapenemResistance);
    }
    if is_stool_specimen(specimen, markers) && resistant.len() >= markers.enteric_threshold {
        patterns.push(ResistancePattern::EntericCaution);
    }
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mic_strips_qualifiers_and_units() {
        assert_eq!(parse_mic("<=0,5"), Some(0.5));
        assert_eq!(parse_mic(">32"), Some(32.0));
        assert_eq!(parse_mic("0.25 mg/L"), Some(0.25));
        assert_eq!(parse_mic("n.d."), None);
        assert_eq!(parse_mic(""), None);
        assert_eq!(parse_mic("abc"), None);
    }

    #[test]
    fn interpretation_synonyms_are_case_insensitive() {
        assert_eq!(normalize_interpretation(Some("s")), Susceptibility::Sensitive);
        assert_eq!(
            normalize_interpretation(Some(" Resistente ")),
            Susceptibility::Resistant
        );
        assert_eq!(
            normalize_interpretation(Some("increased exposure")),
            Susceptibility::Intermediate
        );
        assert_eq!(normalize_interpretation(Some("SDD")), Susceptibility::NotReported);
        assert_eq!(normalize_interpretation(None), Susceptibility::NotReported);
    }

    #[test]
    fn unrecognized_group_is_unknown() {
        assert_eq!(normalize_group(Some("WATCH")), StewardshipGroup::Watch);
        assert_eq!(normalize_group(Some("")), StewardshipGroup::Unknown);
        assert_eq!(normalize_group(None), StewardshipGroup::Unknown);
    }
}
