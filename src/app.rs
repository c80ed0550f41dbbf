use crate::cli::CommonArgs;
use crate::curation;
use crate::dataset::{fetch_dataset, load_survey_csv, FormOptions};
use crate::matcher::{find_similar, ChallengeCount};
use crate::plos::load_plos_csv;
use crate::profile::MotherProfile;
use crate::rules::SUGGESTION_RULES;
use crate::suggest::{compose, SuggestError};
use crate::AppState;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::OnceLock;
use tera::{Context as TeraContext, Tera};
use tower_http::compression::predicate::{
    NotForContentType, Predicate, SizeAbove,
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{prelude::*, Registry};
use tracing_tree::HierarchicalLayer;

#[derive(Parser, Debug)]
#[command(name = "pukeko_server", about = "Maternal outings curator service")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Port to listen on
    #[arg(long, default_value_t = 3020)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

static TEMPLATES: OnceLock<Tera> = OnceLock::new();

fn init_templates() -> Tera {
    let mut tera = Tera::default();
    tera.add_raw_template("base.html", include_str!("templates/base.html"))
        .unwrap();
    tera.add_raw_template("form.html", include_str!("templates/form.html"))
        .unwrap();
    tera.add_raw_template("status.html", include_str!("templates/status.html"))
        .unwrap();
    tera
}

pub fn ensure_templates() {
    TEMPLATES.get_or_init(init_templates);
}

// Health check endpoint
#[instrument]
pub async fn health_check() -> &'static str {
    debug!("Health check requested");
    "OK"
}

#[axum::debug_handler]
async fn form_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut context = TeraContext::new();
    context.insert("request_path", &"/");
    context.insert("survey_records", &state.survey.len());
    context.insert("curation_enabled", &state.openai_client.is_some());

    let rendered = TEMPLATES
        .get()
        .unwrap()
        .render("form.html", &context)
        .unwrap_or_else(|e| format!("Template error: {}", e));

    Html(rendered)
}

#[axum::debug_handler]
async fn status_page(State(_state): State<Arc<AppState>>) -> Html<String> {
    let mut context = TeraContext::new();
    context.insert("request_path", &"/status");

    let rendered = TEMPLATES
        .get()
        .unwrap()
        .render("status.html", &context)
        .unwrap_or_else(|e| format!("Template error: {}", e));

    Html(rendered)
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    uptime_seconds: i64,
    survey_records: usize,
    study_rows: usize,
    curation_enabled: bool,
    stats: StatusStats,
}

#[derive(Debug, Serialize)]
struct StatusStats {
    suggest_requests: u64,
    curate_requests: u64,
    curate_errors: u64,
}

#[axum::debug_handler]
async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime_seconds: (chrono::Utc::now() - state.started_at).num_seconds(),
        survey_records: state.survey.len(),
        study_rows: state.plos.len(),
        curation_enabled: state.openai_client.is_some(),
        stats: StatusStats {
            suggest_requests: state
                .stats
                .suggest_requests
                .load(Ordering::Relaxed),
            curate_requests: state
                .stats
                .curate_requests
                .load(Ordering::Relaxed),
            curate_errors: state.stats.curate_errors.load(Ordering::Relaxed),
        },
    })
}

#[axum::debug_handler]
async fn get_options(
    State(state): State<Arc<AppState>>,
) -> Json<FormOptions> {
    Json(state.survey.distinct_options())
}

#[derive(Debug, Deserialize)]
struct BreastfeedingStatQuery {
    status: String,
}

#[derive(Debug, Serialize)]
struct BreastfeedingStatResponse {
    status: String,
    score_column: String,
    mean: Option<f64>,
}

#[axum::debug_handler]
async fn get_breastfeeding_stat(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BreastfeedingStatQuery>,
) -> Json<BreastfeedingStatResponse> {
    let mean = state.plos.mean_where(
        &state.plos_score_column,
        &[(state.plos_group_column.as_str(), query.status.as_str())],
    );
    Json(BreastfeedingStatResponse {
        status: query.status,
        score_column: state.plos_score_column.clone(),
        mean,
    })
}

#[derive(Debug, Deserialize)]
struct SuggestRequest {
    #[serde(flatten)]
    profile: MotherProfile,
    #[serde(default)]
    max_suggestions: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SuggestResponse {
    suggestions: Vec<String>,
    matched_count: usize,
    top_challenges: Vec<ChallengeCount>,
}

#[axum::debug_handler]
async fn post_suggest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, (StatusCode, String)> {
    state.stats.suggest_requests.fetch_add(1, Ordering::Relaxed);

    let profile = request.profile.normalized();
    let max_suggestions =
        request.max_suggestions.unwrap_or(state.max_suggestions);

    let match_result = find_similar(&profile, &state.survey);
    let suggestions = compose(
        &profile,
        &match_result,
        SUGGESTION_RULES,
        max_suggestions,
    )
    .map_err(|e| match e {
        SuggestError::InvalidMaxSuggestions => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
    })?;

    Ok(Json(SuggestResponse {
        suggestions,
        matched_count: match_result.matched.len(),
        top_challenges: match_result.top_challenges,
    }))
}

#[derive(Debug, Deserialize)]
struct CurateRequest {
    #[serde(flatten)]
    profile: MotherProfile,
    #[serde(default)]
    model: Option<String>,
}

#[axum::debug_handler]
async fn post_curate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CurateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.stats.curate_requests.fetch_add(1, Ordering::Relaxed);

    if state.openai_client.is_none() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Curated suggestions are unavailable: no API key is configured"
                .to_string(),
        ));
    }

    let profile = request.profile.normalized();
    let curated = curation::generate_curated_suggestions(
        &state,
        &profile,
        request.model.as_deref(),
    )
    .await
    .map_err(|e| {
        state.stats.curate_errors.fetch_add(1, Ordering::Relaxed);
        error!("Failed to generate curated suggestions: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(curated))
}

#[axum::debug_handler]
async fn get_models(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Some(client) = state.openai_client.clone() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "No API key is configured".to_string(),
        ));
    };

    let models = curation::available_models(client)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(models))
}

pub fn routes(state: Arc<AppState>) -> Router {
    let predicate = SizeAbove::new(32)
        // still don't compress images
        .and(NotForContentType::IMAGES);

    let compression_layer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true)
        .compress_when(predicate);

    Router::new()
        .route("/", get(form_page))
        .route("/health", get(health_check))
        .route("/status", get(status_page))
        .route("/api/status", get(get_status))
        .route("/api/options", get(get_options))
        .route("/api/stats/breastfeeding", get(get_breastfeeding_stat))
        .route("/api/suggest", post(post_suggest))
        .route("/api/curate", post(post_curate))
        .route("/api/models", get(get_models))
        .layer(compression_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve() -> Result<()> {
    // Initialize logging with tracing
    let subscriber = Registry::default()
        .with(
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        );

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let args = Args::parse();

    info!("Starting pukeko service");

    info!("Loading survey dataset from {}", args.common.survey_csv);
    let survey_text = fetch_dataset(&args.common.survey_csv).await?;
    let survey = load_survey_csv(survey_text.as_bytes())?;

    info!("Loading study dataset from {}", args.common.plos_csv);
    let plos_text = fetch_dataset(&args.common.plos_csv).await?;
    let plos = load_plos_csv(plos_text.as_bytes())?;

    let state = crate::create_app_state(crate::AppConfig {
        survey,
        plos,
        openai_api_key: args.common.openai_api_key,
        openai_api_base: args.common.openai_api_base,
        default_curation_model: args.common.default_curation_model,
        max_suggestions: args.common.max_suggestions,
        plos_group_column: args.common.plos_group_column,
        plos_score_column: args.common.plos_score_column,
    });

    // Initialize templates
    ensure_templates();

    // Start web server
    let app = routes(state);
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received CTRL-C, shutting down");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
