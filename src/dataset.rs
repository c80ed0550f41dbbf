use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{info, instrument};

// Survey exports rename their question headers between revisions, so
// columns are located by stable question prefix rather than exact text.
const COL_AGE_GROUP: &str = "What is your age group";
const COL_REGION: &str = "Which region of New Zealand do you live in";
const COL_CHILD_AGE: &str = "How old is your youngest child";
const COL_BREASTFEEDING: &str = "Are you currently breastfeeding";
const COL_OUTING_FREQUENCY: &str = "How often do you visit public places";
const COL_CONFIDENCE: &str = "How confident do you feel about finding";
const COL_CHALLENGES: &str = "Which of the following challenges";
const COL_EMOTIONS: &str = "What emotions do you most often experience";
const COL_INFO_PREFS: &str = "What type of information would make";

/// One anonymized survey respondent. Categorical fields hold the
/// normalized display form and may be empty; tag-set fields are never
/// null-ambiguous, an absent answer is an empty set.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RespondentRecord {
    pub age_group: String,
    pub region: String,
    pub youngest_child_age: String,
    pub breastfeeding_status: String,
    pub outing_frequency: String,
    pub confidence_level: String,
    pub challenges: Vec<String>,
    pub emotions: Vec<String>,
    pub information_preferences: Vec<String>,
}

/// The survey reference dataset, loaded once at startup and shared
/// read-only for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct SurveyDataset {
    pub records: Vec<RespondentRecord>,
}

/// Distinct values per form field, in dataset order. Drives the
/// select widgets on the profile form.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FormOptions {
    pub age_groups: Vec<String>,
    pub regions: Vec<String>,
    pub child_ages: Vec<String>,
    pub breastfeeding_statuses: Vec<String>,
    pub outing_frequencies: Vec<String>,
    pub confidence_levels: Vec<String>,
    pub challenges: Vec<String>,
    pub emotions: Vec<String>,
    pub information_preferences: Vec<String>,
}

/// Collapse runs of whitespace and trim, keeping the original casing
/// for display.
pub fn normalize_display(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical comparison key: normalized display form, lowercased.
/// All equality in the matcher and composer goes through this, which
/// makes case-insensitive matching a fixed policy rather than an
/// accident of the data.
pub fn norm_key(raw: &str) -> String {
    normalize_display(raw).to_lowercase()
}

// The source CSVs come out of a spreadsheet export that mangles "é"
// (as in "cafés") into "√©".
fn clean_header(raw: &str) -> String {
    normalize_display(&raw.replace("√©", "é"))
}

/// Split a multi-select answer cell into normalized tags. Answers are
/// semicolon-delimited; older exports used commas.
pub fn split_tags(raw: &str) -> Vec<String> {
    let delimiter = if raw.contains(';') { ';' } else { ',' };
    raw.split(delimiter)
        .map(normalize_display)
        .filter(|tag| !tag.is_empty())
        .collect()
}

struct ColumnIndexes {
    age_group: usize,
    region: usize,
    youngest_child_age: usize,
    breastfeeding_status: usize,
    outing_frequency: usize,
    confidence_level: usize,
    challenges: usize,
    emotions: usize,
    information_preferences: usize,
}

fn find_column(headers: &[String], prefix: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.starts_with(prefix))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Survey CSV is missing the '{}...' column",
                prefix
            )
        })
}

fn resolve_columns(headers: &[String]) -> Result<ColumnIndexes> {
    Ok(ColumnIndexes {
        age_group: find_column(headers, COL_AGE_GROUP)?,
        region: find_column(headers, COL_REGION)?,
        youngest_child_age: find_column(headers, COL_CHILD_AGE)?,
        breastfeeding_status: find_column(headers, COL_BREASTFEEDING)?,
        outing_frequency: find_column(headers, COL_OUTING_FREQUENCY)?,
        confidence_level: find_column(headers, COL_CONFIDENCE)?,
        challenges: find_column(headers, COL_CHALLENGES)?,
        emotions: find_column(headers, COL_EMOTIONS)?,
        information_preferences: find_column(headers, COL_INFO_PREFS)?,
    })
}

fn field(row: &csv::StringRecord, index: usize) -> String {
    normalize_display(row.get(index).unwrap_or(""))
}

fn tag_field(row: &csv::StringRecord, index: usize) -> Vec<String> {
    split_tags(row.get(index).unwrap_or(""))
}

/// Parse the survey CSV. A missing expected column is an ingestion
/// error and is surfaced here, before the matching core ever runs.
#[instrument(skip(reader), err)]
pub fn load_survey_csv<R: Read>(reader: R) -> Result<SurveyDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| anyhow::anyhow!("Failed to read CSV headers: {}", e))?
        .iter()
        .map(clean_header)
        .collect();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row
            .map_err(|e| anyhow::anyhow!("Failed to read CSV row: {}", e))?;
        records.push(RespondentRecord {
            age_group: field(&row, columns.age_group),
            region: field(&row, columns.region),
            youngest_child_age: field(&row, columns.youngest_child_age),
            breastfeeding_status: field(&row, columns.breastfeeding_status),
            outing_frequency: field(&row, columns.outing_frequency),
            confidence_level: field(&row, columns.confidence_level),
            challenges: tag_field(&row, columns.challenges),
            emotions: tag_field(&row, columns.emotions),
            information_preferences: tag_field(
                &row,
                columns.information_preferences,
            ),
        });
    }

    info!("Loaded {} survey respondents", records.len());
    Ok(SurveyDataset { records })
}

/// Fetch a dataset from a local path or an http(s) URL. The published
/// copies of the survey live as raw files on GitHub.
pub async fn fetch_dataset(source: &str) -> Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::get(source).await.map_err(|e| {
            anyhow::anyhow!("Failed to fetch dataset from {}: {}", source, e)
        })?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Dataset fetch from {} returned status {}",
                source,
                response.status()
            ));
        }
        response.text().await.map_err(|e| {
            anyhow::anyhow!("Failed to read dataset body: {}", e)
        })
    } else {
        std::fs::read_to_string(source).map_err(|e| {
            anyhow::anyhow!("Failed to read dataset file {}: {}", source, e)
        })
    }
}

fn push_distinct(values: &mut Vec<String>, candidate: &str) {
    if candidate.is_empty() {
        return;
    }
    if !values.iter().any(|v| norm_key(v) == norm_key(candidate)) {
        values.push(candidate.to_string());
    }
}

impl SurveyDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct answer values per field, preserving dataset order.
    pub fn distinct_options(&self) -> FormOptions {
        let mut options = FormOptions::default();
        for record in &self.records {
            push_distinct(&mut options.age_groups, &record.age_group);
            push_distinct(&mut options.regions, &record.region);
            push_distinct(&mut options.child_ages, &record.youngest_child_age);
            push_distinct(
                &mut options.breastfeeding_statuses,
                &record.breastfeeding_status,
            );
            push_distinct(
                &mut options.outing_frequencies,
                &record.outing_frequency,
            );
            push_distinct(
                &mut options.confidence_levels,
                &record.confidence_level,
            );
            for tag in &record.challenges {
                push_distinct(&mut options.challenges, tag);
            }
            for tag in &record.emotions {
                push_distinct(&mut options.emotions, tag);
            }
            for tag in &record.information_preferences {
                push_distinct(&mut options.information_preferences, tag);
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_CSV: &str = "\
What is your age group?,Which region of New Zealand do you live in?,How old is your youngest child?,Are you currently breastfeeding?,\"How often do you visit public places (caf\u{221a}\u{a9}s, malls, parks, libraries, etc.) with your baby?\",\"How confident do you feel about finding suitable spaces for feeding, changing, or resting your baby?\",Which of the following challenges do you face most often when you go out?,What emotions do you most often experience before or during outings with your baby?,What type of information would make your outings easier or less stressful? (Select up to 3)
25-34,Auckland,0-6 months,Yes,Weekly,Somewhat confident,Finding clean baby rooms; Crowded or noisy spaces,Anxious; Stressed,Locations of baby facilities
35-44,Wellington,7-12 months,No,Monthly,Not confident,Lack of breastfeeding areas,Overwhelmed,Parent reviews and ratings; Quiet times to visit
25-34,Auckland,0-6 months,Yes,Daily,Very confident,,,
";

    #[test]
    fn test_load_survey_csv() {
        let dataset = load_survey_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);

        let first = &dataset.records[0];
        assert_eq!(first.age_group, "25-34");
        assert_eq!(first.region, "Auckland");
        assert_eq!(
            first.challenges,
            vec!["Finding clean baby rooms", "Crowded or noisy spaces"]
        );
        assert_eq!(first.emotions, vec!["Anxious", "Stressed"]);

        // Absent multi-select answers normalize to empty sets
        let third = &dataset.records[2];
        assert!(third.challenges.is_empty());
        assert!(third.emotions.is_empty());
        assert!(third.information_preferences.is_empty());
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "What is your age group?,Some unrelated column\n25-34,x\n";
        let result = load_survey_csv(csv.as_bytes());
        assert!(result.is_err());
        let message = result.err().unwrap().to_string();
        assert!(
            message.contains("Which region of New Zealand"),
            "Error message: {}",
            message
        );
    }

    #[test]
    fn test_normalization_policy() {
        assert_eq!(
            normalize_display("  Finding   clean\tbaby rooms  "),
            "Finding clean baby rooms"
        );
        assert_eq!(
            norm_key("  Finding CLEAN baby rooms "),
            "finding clean baby rooms"
        );
    }

    #[test]
    fn test_split_tags_prefers_semicolons() {
        assert_eq!(
            split_tags("Finding clean baby rooms; Crowded, noisy spaces"),
            vec!["Finding clean baby rooms", "Crowded, noisy spaces"]
        );
        assert_eq!(
            split_tags("Anxious, Stressed"),
            vec!["Anxious", "Stressed"]
        );
        assert!(split_tags("  ").is_empty());
        assert!(split_tags("; ;").is_empty());
    }

    #[test]
    fn test_distinct_options_preserve_dataset_order() {
        let dataset = load_survey_csv(SAMPLE_CSV.as_bytes()).unwrap();
        let options = dataset.distinct_options();
        assert_eq!(options.age_groups, vec!["25-34", "35-44"]);
        assert_eq!(options.regions, vec!["Auckland", "Wellington"]);
        assert_eq!(
            options.challenges,
            vec![
                "Finding clean baby rooms",
                "Crowded or noisy spaces",
                "Lack of breastfeeding areas"
            ]
        );
    }

    #[test]
    fn test_mojibake_header_repair() {
        // Header containing the mangled é must still resolve by prefix
        let dataset = load_survey_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(dataset.records[0].outing_frequency, "Weekly");
    }

    #[tokio::test]
    async fn test_fetch_dataset_from_local_path() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE_CSV).unwrap();

        let text = fetch_dataset(file.path().to_str().unwrap())
            .await
            .unwrap();
        let dataset = load_survey_csv(text.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_dataset_missing_file() {
        let result = fetch_dataset("/no/such/file.csv").await;
        assert!(result.is_err());
    }
}
