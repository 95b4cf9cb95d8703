use curvelab_core::{
    AntibiogramInterpretation, InterpretationConfig, StewardshipGroup, StewardshipPolicy,
    Susceptibility,
};
use curvelab_interpret::interpret_antibiogram_value;
use curvelab_interpret::narrative::{ENTERIC_WARNING, NO_GROWTH_SUMMARY, THERAPY_WARNING};
use serde_json::{json, Value};

const MDR_NOTE: &str = "Multi-resistenza (MDR) sospetta: almeno 3 antibiotici classificati R.";
const ESBL_NOTE: &str = "Pattern compatibile con possibile ESBL: resistenza a fluorochinoloni e \
     cefalosporine di III generazione.";
const CARBAPENEM_NOTE: &str = "Attenzione: resistenza ai carbapenemi nel pannello testato.";
const ENTERIC_NOTE: &str =
    "Nelle infezioni enteriche valutare terapia antibiotica solo se clinicamente indicata.";

fn interpret(payload: Value) -> AntibiogramInterpretation {
    interpret_antibiogram_value(&payload, &InterpretationConfig::default())
        .expect("Could not interpret antibiogram")
}

fn names(entries: &[curvelab_core::AntibiogramEntry]) -> Vec<&str> {
    entries
        .iter()
        .map(|entry| entry.antibiotic_name.as_str())
        .collect()
}

fn entry(name: &str, group: &str, mic: Value, interpretation: &str) -> Value {
    json!({
        "antibiotic_name": name,
        "aware_group": group,
        "mic": mic,
        "interpretation": interpretation
    })
}

#[test]
fn access_outranks_watch_despite_higher_mic() {
    let result = interpret(json!({
        "specimen_type": "urine",
        "microorganism": "Escherichia coli",
        "antibiogram": [
            entry("Ciprofloxacin", "Watch", json!("0.5"), "S"),
            entry("Amoxicillin", "Access", json!("2"), "S")
        ]
    }));

    assert_eq!(names(&result.recommended), vec!["Amoxicillin", "Ciprofloxacin"]);
    assert_eq!(
        result.first_choice.map(|e| e.antibiotic_name),
        Some("Amoxicillin".to_string())
    );
    assert_eq!(
        result.summary,
        "Escherichia coli: antibiotici risultati sensibili nel pannello testato -> \
         Amoxicillin; Ciprofloxacin."
    );
}

#[test]
fn classic_resistance_patterns_fire_in_order() {
    let result = interpret(json!({
        "specimen_type": "sangue",
        "antibiogram": [
            entry("Ciprofloxacin", "Watch", json!(">4"), "R"),
            entry("Ceftriaxone", "Watch", json!(">8"), "R"),
            entry("Meropenem", "Watch", json!(">16"), "R")
        ]
    }));

    assert_eq!(
        result.resistance_patterns,
        vec![
            MDR_NOTE.to_string(),
            ESBL_NOTE.to_string(),
            CARBAPENEM_NOTE.to_string()
        ]
    );
    assert!(result.recommended.is_empty());
    assert_eq!(result.first_choice, None);
    assert_eq!(
        result.summary,
        "microrganismo isolato: nessun antibiotico classificato come sensibile (S) nel \
         pannello inserito. Valutare consulto infettivologico e ulteriore AST."
    );
}

#[test]
fn negative_growth_skips_recommendations() {
    let result = interpret(json!({
        "specimen_type": "urine",
        "growth_result": "Negative",
        "antibiogram": [entry("Fosfomicina", "Access", json!("8"), "S")]
    }));

    assert_eq!(result.summary, NO_GROWTH_SUMMARY);
    assert!(result.recommended.is_empty());
    assert_eq!(result.first_choice, None);
    assert_eq!(names(&result.sensitive), vec!["Fosfomicina"]);
    assert!(result.warnings.is_empty());
}

#[test]
fn missing_mic_sorts_last_and_names_break_ties_case_insensitively() {
    let result = interpret(json!({
        "antibiogram": [
            entry("Gentamicina", "Access", Value::Null, "S"),
            entry("ampicillina", "Access", json!(1), "S"),
            entry("Amikacina", "Access", json!("1"), "S"),
            entry("Linezolid", "Reserve", json!("0.25"), "S"),
            entry("Colistina", "", json!("0.125"), "S"),
            entry("Fosfomicina", "Other", json!("0.125"), "S")
        ]
    }));

    assert_eq!(
        names(&result.recommended),
        vec![
            "Amikacina",
            "ampicillina",
            "Gentamicina",
            "Linezolid",
            "Fosfomicina",
            "Colistina"
        ]
    );
    assert_eq!(
        result.recommended[5].stewardship_group,
        StewardshipGroup::Unknown
    );
}

#[test]
fn equal_keys_keep_input_order() {
    let result = interpret(json!({
        "antibiogram": [
            { "antibiotic_name": "Cefazolina", "antibiotic_class": "first", "aware_group": "Access", "mic": "2", "interpretation": "S" },
            { "antibiotic_name": "cefazolina", "antibiotic_class": "second", "aware_group": "Access", "mic": "2", "interpretation": "S" }
        ]
    }));

    let classes: Vec<_> = result
        .recommended
        .iter()
        .map(|entry| entry.antibiotic_class.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(classes, vec!["first", "second"]);
}

#[test]
fn permuting_the_panel_does_not_change_the_ranking() {
    let panel = vec![
        entry("Nitrofurantoina", "Access", json!("16"), "S"),
        entry("Ciprofloxacina", "Watch", json!("0.25"), "S"),
        entry("Fosfomicina", "Access", json!("<=4"), "S"),
        entry("Ceftriaxone", "Watch", json!("1"), "R"),
        entry("Meropenem", "Watch", Value::Null, "S"),
        entry("Linezolid", "Reserve", json!("2"), "I"),
        entry("Gentamicina", "Access", json!("0,5"), "S"),
    ];
    let baseline = interpret(json!({ "antibiogram": panel.clone() }));
    let expected = names(&baseline.recommended);
    assert_eq!(
        expected,
        vec![
            "Gentamicina",
            "Fosfomicina",
            "Nitrofurantoina",
            "Ciprofloxacina",
            "Meropenem"
        ]
    );

    for shift in 1..panel.len() {
        let mut permuted = panel.clone();
        permuted.rotate_left(shift);
        let result = interpret(json!({ "antibiogram": permuted.clone() }));
        assert_eq!(names(&result.recommended), expected, "rotation {shift}");

        permuted.reverse();
        let result = interpret(json!({ "antibiogram": permuted }));
        assert_eq!(names(&result.recommended), expected, "reversed rotation {shift}");
    }
}

#[test]
fn stool_specimens_get_enteric_notes() {
    let result = interpret(json!({
        "specimen_type": "Feci",
        "microorganism": "Campylobacter jejuni",
        "antibiogram": [
            entry("Ciprofloxacina", "Watch", json!(">4"), "R"),
            entry("Trimetoprim/Sulfametossazolo", "Access", json!(">8"), "R"),
            entry("Azitromicina", "Watch", json!("0.125"), "S")
        ]
    }));

    assert_eq!(result.resistance_patterns, vec![ENTERIC_NOTE.to_string()]);
    assert_eq!(
        result.warnings,
        vec![ENTERIC_WARNING.to_string(), THERAPY_WARNING.to_string()]
    );
}

#[test]
fn markers_also_match_active_ingredients() {
    let result = interpret(json!({
        "antibiogram": [
            { "antibiotic_name": "Tavanic", "active_ingredient": "levofloxacin", "interpretation": "R" },
            { "antibiotic_name": "Rocephin", "active_ingredient": "ceftriaxone", "interpretation": "R" }
        ]
    }));

    assert_eq!(result.resistance_patterns, vec![ESBL_NOTE.to_string()]);
}

#[test]
fn summary_lists_at_most_six_agents_with_brand_examples() {
    let panel: Vec<Value> = (1..=8)
        .map(|n| {
            let brands = if n == 1 {
                json!(["Brand A", " ", "Brand B"])
            } else {
                json!([])
            };
            json!({
                "antibiotic_name": format!("Agent{n}"),
                "aware_group": "Access",
                "mic": n.to_string(),
                "interpretation": "S",
                "commercial_names": brands
            })
        })
        .collect();
    let result = interpret(json!({ "microorganism": "Klebsiella pneumoniae", "antibiogram": panel }));

    assert_eq!(result.recommended.len(), 8);
    assert_eq!(
        result.summary,
        "Klebsiella pneumoniae: antibiotici risultati sensibili nel pannello testato -> \
         Agent1 (esempi: Brand A, Brand B); Agent2; Agent3; Agent4; Agent5; Agent6."
    );
    assert_eq!(result.recommended[0].commercial_names, vec!["Brand A", "Brand B"]);
}

#[test]
fn interpretation_codes_and_mic_are_normalized() {
    let result = interpret(json!({
        "antibiogram": [
            { "antibiotic_name": "A", "interpretation": "suscettibile", "mic": "<=0,25" },
            { "antibiotic_name": "B", "interpretation": "Intermedio", "mic": 4 },
            { "antibiotic_name": "C", "interpretation": "resistant", "mic": "n.d." },
            { "antibiotic_name": "D", "interpretation": "?" }
        ]
    }));

    assert_eq!(result.sensitive[0].interpretation, Susceptibility::Sensitive);
    assert_eq!(result.sensitive[0].mic_numeric, Some(0.25));
    assert_eq!(result.intermediate[0].mic.as_deref(), Some("4"));
    assert_eq!(result.intermediate[0].mic_numeric, Some(4.0));
    assert_eq!(result.resistant[0].mic_numeric, None);
    assert_eq!(
        result.sensitive.len() + result.intermediate.len() + result.resistant.len(),
        3
    );
}

#[test]
fn stewardship_policy_can_be_overridden() {
    let config = InterpretationConfig {
        stewardship: StewardshipPolicy {
            watch: 0,
            access: 1,
            ..StewardshipPolicy::default()
        },
        ..InterpretationConfig::default()
    };
    let payload = json!({
        "antibiogram": [
            entry("Amoxicillin", "Access", json!("2"), "S"),
            entry("Ciprofloxacin", "Watch", json!("0.5"), "S")
        ]
    });

    let result =
        interpret_antibiogram_value(&payload, &config).expect("Could not interpret antibiogram");
    assert_eq!(names(&result.recommended), vec!["Ciprofloxacin", "Amoxicillin"]);
}

#[test]
fn unsupported_mic_shapes_are_treated_as_absent() {
    let result = interpret(json!({
        "antibiogram": [
            entry("Gentamicina", "Access", json!({ "value": "2" }), "S"),
            entry("Amikacina", "Access", json!(true), "S"),
            entry("Fosfomicina", "Access", json!("8"), "S")
        ]
    }));

    assert_eq!(result.sensitive[0].mic, None);
    assert_eq!(result.sensitive[0].mic_numeric, None);
    assert_eq!(result.sensitive[1].mic, None);
    assert_eq!(
        names(&result.recommended),
        vec!["Fosfomicina", "Amikacina", "Gentamicina"]
    );
}

#[test]
fn italian_negative_growth_and_stool_id_are_recognized() {
    let result = interpret(json!({
        "specimen_type": " STOOL ",
        "growth_result": "Negativo",
        "antibiogram": [entry("Azitromicina", "Watch", json!("0.125"), "S")]
    }));

    assert_eq!(result.summary, NO_GROWTH_SUMMARY);
    assert!(result.recommended.is_empty());
    assert_eq!(result.warnings, vec![ENTERIC_WARNING.to_string()]);
}
