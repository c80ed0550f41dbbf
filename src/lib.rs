use crate::dataset::SurveyDataset;
use crate::openai::real::maybe_create_openai_client;
use crate::openai::OpenAIClientTrait;
use crate::plos::PlosDataset;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tracing::warn;

pub mod app;
pub mod cli;
pub mod curation;
pub mod dataset;
pub mod matcher;
pub mod openai;
pub mod plos;
pub mod profile;
pub mod prompts;
pub mod rules;
pub mod suggest;

pub mod test_utils;

// Request counters exposed on /api/status
#[derive(Debug, Default)]
pub struct ServiceStats {
    pub suggest_requests: AtomicU64,
    pub curate_requests: AtomicU64,
    pub curate_errors: AtomicU64,
}

impl ServiceStats {
    pub fn new() -> Self {
        Self::default()
    }
}

// Shared application state. The datasets are loaded once at startup
// and never mutated afterwards, so request handlers read them without
// locking.
pub struct AppState {
    pub survey: Arc<SurveyDataset>,
    pub plos: Arc<PlosDataset>,
    pub openai_client: Option<Arc<dyn OpenAIClientTrait>>,
    pub default_curation_model: String,
    pub max_suggestions: usize,
    pub plos_group_column: String,
    pub plos_score_column: String,
    pub stats: ServiceStats,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new_for_testing() -> Self {
        Self {
            survey: Arc::new(test_utils::sample_survey()),
            plos: Arc::new(test_utils::sample_plos()),
            openai_client: None,
            default_curation_model: "gpt-4o-mini".to_string(),
            max_suggestions: 5,
            plos_group_column: "Breastfeeding status".to_string(),
            plos_score_column: "EPDS score".to_string(),
            stats: ServiceStats::new(),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn new_for_testing_with_openai_client(
        openai_client: Arc<dyn OpenAIClientTrait>,
    ) -> Self {
        Self {
            openai_client: Some(openai_client),
            ..Self::new_for_testing()
        }
    }
}

// Config struct holding everything AppState is built from
pub struct AppConfig {
    pub survey: SurveyDataset,
    pub plos: PlosDataset,
    pub openai_api_key: Option<String>,
    pub openai_api_base: Option<String>,
    pub default_curation_model: String,
    pub max_suggestions: usize,
    pub plos_group_column: String,
    pub plos_score_column: String,
}

pub fn create_app_state(config: AppConfig) -> Arc<AppState> {
    let openai_client = match maybe_create_openai_client(
        config.openai_api_key,
        config.openai_api_base,
    ) {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to create OpenAI client: {}", e);
            None
        }
    };

    Arc::new(AppState {
        survey: Arc::new(config.survey),
        plos: Arc::new(config.plos),
        openai_client,
        default_curation_model: config.default_curation_model,
        max_suggestions: config.max_suggestions,
        plos_group_column: config.plos_group_column,
        plos_score_column: config.plos_score_column,
        stats: ServiceStats::new(),
        started_at: chrono::Utc::now(),
    })
}
