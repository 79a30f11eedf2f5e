//! Keyword classifier: free text to a carbon estimate, category and advice.
//!
//! Both tables are ordered and the first matching entry wins. The estimate
//! table checks `flight` before `car`; the suggestion table checks `car`
//! first, so "car to flight gate" is priced as a flight but advised as a car
//! trip.

use crate::model::Category;
use serde::Serialize;

struct Rule {
    keywords: &'static [&'static str],
    carbon: f64,
    category: Category,
}

const fn rule(keywords: &'static [&'static str], carbon: f64, category: Category) -> Rule {
    Rule {
        keywords,
        carbon,
        category,
    }
}

const ESTIMATE_RULES: &[Rule] = &[
    rule(&["flight"], 90.0, Category::Travel),
    rule(&["car"], 15.0, Category::Travel),
    rule(&["train"], 6.0, Category::Travel),
    rule(&["bike", "cycle"], 0.5, Category::Travel),
    rule(&["bus"], 8.0, Category::Travel),
    rule(&["meat"], 20.0, Category::Food),
    rule(&["chicken"], 6.0, Category::Food),
    rule(&["vegan", "vegetable"], 2.0, Category::Food),
    rule(&["printing", "paper"], 3.0, Category::Office),
    rule(&["server", "cloud"], 25.0, Category::Office),
];

const FALLBACK_CARBON: f64 = 5.0;
const FALLBACK_CATEGORY: Category = Category::Other;

const SUGGESTION_RULES: &[(&str, &str)] = &[
    ("car", "Use public transport or carpool."),
    ("flight", "Try a train or video call instead of flying."),
    ("meat", "Choose plant-based meals."),
    ("printing", "Use digital docs to save paper."),
    ("server", "Use renewable energy data centers."),
];

pub const FALLBACK_SUGGESTION: &str = "Try an eco-friendly alternative.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub carbon: f64,
    pub category: Category,
    pub suggestion: String,
}

/// Classifies `text`, letting a caller-supplied carbon figure win over the
/// rule table. An override always files the task under `Custom`.
///
/// The override is trusted: rejecting negative or non-numeric values is the
/// caller's job.
pub fn classify(text: &str, override_carbon: Option<f64>) -> Estimate {
    let (carbon, category) = match override_carbon {
        Some(carbon) => (carbon, Category::Custom),
        None => estimate(text),
    };

    Estimate {
        carbon,
        category,
        suggestion: suggest(text).to_string(),
    }
}

/// Rule-table lookup with no override.
pub fn estimate(text: &str) -> (f64, Category) {
    let lowered = text.to_lowercase();
    ESTIMATE_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|rule| (rule.carbon, rule.category))
        .unwrap_or((FALLBACK_CARBON, FALLBACK_CATEGORY))
}

pub fn suggest(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    SUGGESTION_RULES
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, suggestion)| *suggestion)
        .unwrap_or(FALLBACK_SUGGESTION)
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_SUGGESTION, classify, estimate, suggest};
    use crate::model::Category;
    use rstest::rstest;

    #[rstest]
    #[case::flight("Flight to Berlin", 90.0, Category::Travel)]
    #[case::car("drove the car", 15.0, Category::Travel)]
    #[case::train("Train commute", 6.0, Category::Travel)]
    #[case::bike("bike ride", 0.5, Category::Travel)]
    #[case::cycle("cycle to work", 0.5, Category::Travel)]
    #[case::bus("bus downtown", 8.0, Category::Travel)]
    #[case::meat("meat lasagne", 20.0, Category::Food)]
    #[case::chicken("Chicken wrap", 6.0, Category::Food)]
    #[case::vegan("vegan lunch", 2.0, Category::Food)]
    #[case::vegetable("vegetable soup", 2.0, Category::Food)]
    #[case::printing("printing reports", 3.0, Category::Office)]
    #[case::paper("paper notes", 3.0, Category::Office)]
    #[case::server("server upgrade", 25.0, Category::Office)]
    #[case::cloud("CLOUD backup", 25.0, Category::Office)]
    fn single_keyword_maps_to_table_entry(
        #[case] text: &str,
        #[case] carbon: f64,
        #[case] category: Category,
    ) {
        assert_eq!(estimate(text), (carbon, category));
        let classified = classify(text, None);
        assert_eq!(classified.carbon, carbon);
        assert_eq!(classified.category, category);
    }

    #[rstest]
    #[case::unmatched("Misc shopping")]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn unmatched_text_falls_back_to_other(#[case] text: &str) {
        let classified = classify(text, None);
        assert_eq!(classified.carbon, 5.0);
        assert_eq!(classified.category, Category::Other);
        assert_eq!(classified.suggestion, FALLBACK_SUGGESTION);
    }

    #[test]
    fn flight_wins_over_car_in_estimates() {
        let classified = classify("car to flight gate", None);
        assert_eq!(classified.carbon, 90.0);
        assert_eq!(classified.category, Category::Travel);
    }

    #[test]
    fn car_wins_over_flight_in_suggestions() {
        // The two tables disagree on precedence; the suggestion follows its own order.
        assert_eq!(suggest("car to flight gate"), "Use public transport or carpool.");
        assert_eq!(
            classify("car to flight gate", None).suggestion,
            "Use public transport or carpool."
        );
    }

    #[test]
    fn keywords_match_inside_words() {
        // "scarf" contains "car".
        assert_eq!(estimate("Bought a scarf"), (15.0, Category::Travel));
        assert_eq!(estimate("Recycle bottles"), (0.5, Category::Travel));
    }

    #[test]
    fn override_forces_custom_category() {
        let classified = classify("car trip", Some(3.3));
        assert_eq!(classified.carbon, 3.3);
        assert_eq!(classified.category, Category::Custom);
    }

    #[test]
    fn override_keeps_keyword_suggestion() {
        let classified = classify("meat feast", Some(0.0));
        assert_eq!(classified.carbon, 0.0);
        assert_eq!(classified.category, Category::Custom);
        assert_eq!(classified.suggestion, "Choose plant-based meals.");
    }

    #[test]
    fn estimates_are_never_negative() {
        let inputs = [
            "", "flight", "car", "train", "bike", "bus", "meat", "chicken", "vegan",
            "paper", "cloud", "nothing at all", "ÜNICODE ✈",
        ];
        for input in inputs {
            assert!(classify(input, None).carbon >= 0.0, "negative carbon for {input:?}");
        }
    }

    #[test]
    fn suggestion_table_entries() {
        assert_eq!(suggest("Flight home"), "Try a train or video call instead of flying.");
        assert_eq!(suggest("printing flyers"), "Use digital docs to save paper.");
        assert_eq!(suggest("server rack"), "Use renewable energy data centers.");
        assert_eq!(suggest("train"), FALLBACK_SUGGESTION);
    }
}
