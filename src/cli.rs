use clap::Parser;

/// Command-line arguments shared by the server and any future
/// one-shot tools
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// Path or URL of the maternal wellbeing survey CSV
    #[arg(
        long,
        env = "SURVEY_CSV",
        default_value = "data/maternal_wellbeing_survey.csv"
    )]
    pub survey_csv: String,

    /// Path or URL of the published breastfeeding study CSV
    #[arg(
        long,
        env = "PLOS_CSV",
        default_value = "data/plos_breastfeeding_mental_health.csv"
    )]
    pub plos_csv: String,

    /// OpenAI API key for curated suggestions
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    pub openai_api_base: Option<String>,

    /// Default model for curated suggestions
    #[arg(long, default_value = "gpt-4o-mini")]
    pub default_curation_model: String,

    /// Maximum suggestions returned per request, summary included
    #[arg(long, default_value_t = 5)]
    pub max_suggestions: usize,

    /// Grouping column in the study CSV
    #[arg(long, default_value = "Breastfeeding status")]
    pub plos_group_column: String,

    /// Numeric column in the study CSV to average
    #[arg(long, default_value = "EPDS score")]
    pub plos_score_column: String,
}
