use crate::dataset::{RespondentRecord, SurveyDataset};
use crate::plos::{load_plos_csv, PlosDataset};

pub fn respondent(
    age_group: &str,
    region: &str,
    challenges: &[&str],
) -> RespondentRecord {
    RespondentRecord {
        age_group: age_group.to_string(),
        region: region.to_string(),
        challenges: challenges.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// A small survey with two respondents matching the 25-34/Auckland
/// profile and near-misses that differ in exactly one field.
pub fn sample_survey() -> SurveyDataset {
    SurveyDataset {
        records: vec![
            RespondentRecord {
                age_group: "25-34".to_string(),
                region: "Auckland".to_string(),
                youngest_child_age: "0-6 months".to_string(),
                breastfeeding_status: "Yes".to_string(),
                outing_frequency: "Weekly".to_string(),
                confidence_level: "Somewhat confident".to_string(),
                challenges: vec![
                    "Finding clean baby rooms".to_string(),
                    "Crowded or noisy spaces".to_string(),
                ],
                emotions: vec!["Anxious".to_string()],
                information_preferences: vec![
                    "Locations of baby facilities".to_string(),
                ],
            },
            respondent("25-34", "Auckland", &["Finding clean baby rooms"]),
            respondent("25-34", "Wellington", &["Lack of breastfeeding areas"]),
            respondent("35-44", "Auckland", &["No parking or difficult access"]),
            respondent("45+", "Canterbury", &[]),
        ],
    }
}

const SAMPLE_PLOS_CSV: &str = "\
Breastfeeding status,Timepoint,EPDS score
Yes,3 months,7.0
Yes,6 months,9.0
No,3 months,11.0
";

pub fn sample_plos() -> PlosDataset {
    load_plos_csv(SAMPLE_PLOS_CSV.as_bytes())
        .expect("sample study CSV parses")
}
