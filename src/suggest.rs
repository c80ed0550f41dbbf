use crate::matcher::MatchResult;
use crate::profile::MotherProfile;
use std::collections::HashSet;

/// Fallback summary used when no respondent shares the profile's age
/// group and region.
pub const NO_MATCH_SUMMARY: &str = "No exact match was found in the survey \
data, so here is some general guidance.";

/// One entry of the static suggestion table: a tip and the tags that
/// activate it.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRule {
    pub trigger_tags: &'static [&'static str],
    pub tip: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SuggestError {
    InvalidMaxSuggestions,
}

impl std::fmt::Display for SuggestError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SuggestError::InvalidMaxSuggestions => {
                write!(f, "max_suggestions must be at least 1")
            }
        }
    }
}

impl std::error::Error for SuggestError {}

// Exactly one summary sentence always occupies position 0 of the
// composed output: evidence from the matched respondents, or the
// generic fallback.
fn evidence_summary(match_result: &MatchResult) -> String {
    let count = match_result.matched.len();
    let noun = if count == 1 { "mother" } else { "mothers" };
    if match_result.top_challenges.is_empty() {
        return format!(
            "Your profile matched {} {} in the survey who share your age \
             group and region.",
            count, noun
        );
    }

    let challenges = match_result
        .top_challenges
        .iter()
        .map(|entry| format!("{} ({})", entry.tag, entry.count))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Your profile matched {} {} in the survey who share your age group \
         and region; their most common challenges were: {}.",
        count, noun, challenges
    )
}

/// Compose the bounded suggestion list for one submission.
///
/// Rules are evaluated in table order and a tip is emitted when its
/// trigger tags intersect the profile's combined tag set. Duplicate
/// tip text is emitted once. The summary sentence always holds
/// position 0 and truncation to `max_suggestions` drops from the end,
/// so output is deterministic for identical inputs.
pub fn compose(
    profile: &MotherProfile,
    match_result: &MatchResult,
    rules: &[SuggestionRule],
    max_suggestions: usize,
) -> Result<Vec<String>, SuggestError> {
    if max_suggestions == 0 {
        return Err(SuggestError::InvalidMaxSuggestions);
    }

    let profile_tags = profile.combined_tag_keys();

    let summary = if match_result.is_empty() {
        NO_MATCH_SUMMARY.to_string()
    } else {
        evidence_summary(match_result)
    };

    let mut output = vec![summary];
    let mut seen: HashSet<&str> = HashSet::new();
    for rule in rules {
        if output.len() >= max_suggestions {
            break;
        }
        let triggered = rule
            .trigger_tags
            .iter()
            .any(|tag| profile_tags.contains(&crate::dataset::norm_key(tag)));
        if triggered && seen.insert(rule.tip) {
            output.push(rule.tip.to_string());
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_similar;
    use crate::rules::SUGGESTION_RULES;
    use crate::test_utils::respondent;
    use pretty_assertions::assert_eq;

    const TEST_RULES: &[SuggestionRule] = &[
        SuggestionRule {
            trigger_tags: &["Finding clean baby rooms"],
            tip: "Check facility ratings from other parents before you go.",
        },
        SuggestionRule {
            trigger_tags: &["Anxious"],
            tip: "Plan a short first outing close to home.",
        },
        SuggestionRule {
            trigger_tags: &["Stressed"],
            tip: "Plan a short first outing close to home.",
        },
        SuggestionRule {
            trigger_tags: &["Quiet times to visit"],
            tip: "Mid-morning on weekdays is usually the quietest window.",
        },
    ];

    fn profile_with_tags(challenges: &[&str], emotions: &[&str]) -> MotherProfile {
        MotherProfile {
            age_group: "25-34".to_string(),
            region: "Auckland".to_string(),
            challenges: challenges.iter().map(|s| s.to_string()).collect(),
            emotions: emotions.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn two_record_match() -> MatchResult {
        let dataset = crate::dataset::SurveyDataset {
            records: vec![
                respondent("25-34", "Auckland", &["Finding clean baby rooms"]),
                respondent("25-34", "Auckland", &[]),
            ],
        };
        find_similar(&profile_with_tags(&[], &[]), &dataset)
    }

    #[test]
    fn test_summary_names_match_count_and_top_challenges() {
        let profile =
            profile_with_tags(&["Finding clean baby rooms"], &[]);
        let output =
            compose(&profile, &two_record_match(), TEST_RULES, 5).unwrap();

        assert!(output[0].contains("2 mothers"), "got: {}", output[0]);
        assert!(
            output[0].contains("Finding clean baby rooms (1)"),
            "got: {}",
            output[0]
        );
        assert_eq!(
            output[1],
            "Check facility ratings from other parents before you go."
        );
    }

    #[test]
    fn test_no_match_uses_generic_summary() {
        let profile = profile_with_tags(&[], &["Anxious"]);
        let output =
            compose(&profile, &MatchResult::default(), TEST_RULES, 5).unwrap();

        assert_eq!(output[0], NO_MATCH_SUMMARY);
        // Remaining entries come only from rule intersections with the
        // profile's own tags
        assert_eq!(output[1], "Plan a short first outing close to home.");
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn test_duplicate_tip_text_collapses() {
        // Anxious and Stressed trigger different rules with the same
        // tip text; it must be emitted once
        let profile = profile_with_tags(&[], &["Anxious", "Stressed"]);
        let output =
            compose(&profile, &MatchResult::default(), TEST_RULES, 5).unwrap();

        let tip_count = output
            .iter()
            .filter(|s| *s == "Plan a short first outing close to home.")
            .count();
        assert_eq!(tip_count, 1);

        let unique: std::collections::HashSet<&String> = output.iter().collect();
        assert_eq!(unique.len(), output.len());
    }

    #[test]
    fn test_truncation_never_drops_the_summary() {
        let profile = profile_with_tags(
            &["Finding clean baby rooms"],
            &["Anxious"],
        );
        let output =
            compose(&profile, &two_record_match(), TEST_RULES, 1).unwrap();

        assert_eq!(output.len(), 1);
        assert!(output[0].contains("2 mothers"));
    }

    #[test]
    fn test_truncation_bounds_output_length() {
        let profile = profile_with_tags(
            &["Finding clean baby rooms"],
            &["Anxious"],
        );
        for max in 1..=4 {
            let output = compose(
                &profile,
                &MatchResult::default(),
                TEST_RULES,
                max,
            )
            .unwrap();
            assert!(!output.is_empty());
            assert!(output.len() <= max);
        }
    }

    #[test]
    fn test_zero_max_suggestions_is_invalid() {
        let profile = profile_with_tags(&[], &[]);
        let result =
            compose(&profile, &MatchResult::default(), TEST_RULES, 0);
        assert_eq!(result, Err(SuggestError::InvalidMaxSuggestions));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let profile = profile_with_tags(
            &["Finding clean baby rooms"],
            &["Anxious", "Stressed"],
        );
        let match_result = two_record_match();
        let first =
            compose(&profile, &match_result, TEST_RULES, 5).unwrap();
        let second =
            compose(&profile, &match_result, TEST_RULES, 5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_rule_table_yields_summary_only() {
        let profile = profile_with_tags(&["Finding clean baby rooms"], &[]);
        let output =
            compose(&profile, &MatchResult::default(), &[], 5).unwrap();
        assert_eq!(output, vec![NO_MATCH_SUMMARY.to_string()]);
    }

    #[test]
    fn test_rule_trigger_matching_is_case_insensitive() {
        let profile = profile_with_tags(&["finding CLEAN baby rooms"], &[]);
        let output =
            compose(&profile, &MatchResult::default(), TEST_RULES, 5).unwrap();
        assert_eq!(
            output[1],
            "Check facility ratings from other parents before you go."
        );
    }

    #[test]
    fn test_production_rule_table_composes() {
        let profile = profile_with_tags(
            &["Finding clean baby rooms"],
            &["Anxious"],
        );
        let output = compose(
            &profile,
            &MatchResult::default(),
            SUGGESTION_RULES,
            5,
        )
        .unwrap();

        assert_eq!(output[0], NO_MATCH_SUMMARY);
        assert!(output.len() > 1);
        assert!(output.len() <= 5);
    }
}
