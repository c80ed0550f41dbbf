use crate::matcher::{find_similar, MatchResult};
use crate::openai::OpenAIClientTrait;
use crate::profile::MotherProfile;
use crate::prompts::{CURATION_SYSTEM_PROMPT, CURATION_USER_PROMPT};
use crate::rules::SUGGESTION_RULES;
use crate::suggest::compose;
use crate::AppState;
use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct CuratedSuggestions {
    pub model: String,
    pub content: String,
    pub duration_ms: i64,
}

fn profile_line(label: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(format!("{}: {}", label, value))
    }
}

fn render_profile(profile: &MotherProfile) -> String {
    let mut lines = Vec::new();
    if let Some(name) = &profile.name {
        lines.push(format!("Name: {}", name));
    }
    if let Some(suburb) = &profile.suburb {
        lines.push(format!("Suburb: {}", suburb));
    }
    lines.extend(profile_line("Age group", &profile.age_group));
    lines.extend(profile_line("Region", &profile.region));
    lines.extend(profile_line(
        "Youngest child",
        &profile.youngest_child_age,
    ));
    lines.extend(profile_line(
        "Currently breastfeeding",
        &profile.breastfeeding_status,
    ));
    lines.extend(profile_line("Outing frequency", &profile.outing_frequency));
    lines.extend(profile_line("Confidence", &profile.confidence_level));
    lines.extend(profile_line("Challenges", &profile.challenges.join(", ")));
    lines.extend(profile_line("Emotions", &profile.emotions.join(", ")));
    lines.extend(profile_line(
        "Information needs",
        &profile.information_preferences.join(", "),
    ));
    lines.join("\n")
}

fn render_evidence(match_result: &MatchResult) -> String {
    if match_result.is_empty() {
        return "No survey respondents share this profile's age group and \
                region."
            .to_string();
    }
    let mut evidence = format!(
        "{} survey respondents share this profile's age group and region.",
        match_result.matched.len()
    );
    if !match_result.top_challenges.is_empty() {
        let challenges = match_result
            .top_challenges
            .iter()
            .map(|entry| format!("{} ({})", entry.tag, entry.count))
            .collect::<Vec<_>>()
            .join(", ");
        evidence.push_str(&format!(
            " Their most common challenges: {}.",
            challenges
        ));
    }
    evidence
}

fn render_study_context(state: &AppState, profile: &MotherProfile) -> String {
    if profile.breastfeeding_status.is_empty() {
        return "No study statistics apply.".to_string();
    }
    match state.plos.mean_where(
        &state.plos_score_column,
        &[(
            state.plos_group_column.as_str(),
            profile.breastfeeding_status.as_str(),
        )],
    ) {
        Some(mean) => format!(
            "Mean {} for breastfeeding status '{}' in the published study: \
             {:.1}.",
            state.plos_score_column, profile.breastfeeding_status, mean
        ),
        None => "No study statistics apply.".to_string(),
    }
}

/// Generate curated suggestions for a profile via the configured
/// chat-completion endpoint. The reply is passed through verbatim;
/// this layer never parses model output.
#[instrument(skip(state, profile), err)]
pub async fn generate_curated_suggestions(
    state: &AppState,
    profile: &MotherProfile,
    model: Option<&str>,
) -> Result<CuratedSuggestions, anyhow::Error> {
    let client = state.openai_client.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenAI client configured; an API key is required for \
             curated suggestions"
        )
    })?;

    let model = model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(&state.default_curation_model)
        .to_string();

    let match_result = find_similar(profile, &state.survey);
    let tips = compose(
        profile,
        &match_result,
        SUGGESTION_RULES,
        state.max_suggestions,
    )
    .map_err(|e| anyhow::anyhow!("Failed to compose tips: {}", e))?;

    generate_with_client(
        client,
        &model,
        &render_profile(profile),
        &render_evidence(&match_result),
        &render_study_context(state, profile),
        &tips,
    )
    .await
}

pub async fn generate_with_client(
    client: Arc<dyn OpenAIClientTrait>,
    model: &str,
    profile_text: &str,
    evidence_text: &str,
    study_context: &str,
    tips: &[String],
) -> Result<CuratedSuggestions, anyhow::Error> {
    let start_time = std::time::Instant::now();

    let system_message = ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(CURATION_SYSTEM_PROMPT)
            .build()
            .map_err(|e| {
                anyhow::anyhow!("Failed to build system message: {}", e)
            })?,
    );

    let user_message = ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(
                CURATION_USER_PROMPT
                    .replace("{profile}", profile_text)
                    .replace("{evidence}", evidence_text)
                    .replace("{study_context}", study_context)
                    .replace("{tips}", &tips.join("\n")),
            )
            .build()
            .map_err(|e| {
                anyhow::anyhow!("Failed to build user message: {}", e)
            })?,
    );

    let response = client
        .chat_completion(
            model.to_string(),
            vec![system_message, user_message],
        )
        .await
        .map_err(|e| {
            anyhow::anyhow!("Failed to create chat completion: {}", e)
        })?;

    let content = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_ref())
        .map(String::from)
        .unwrap_or_else(|| "No suggestions generated".to_string());

    info!("Curated suggestions received from {}", model);

    Ok(CuratedSuggestions {
        model: model.to_string(),
        content,
        duration_ms: start_time.elapsed().as_millis() as i64,
    })
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
}

#[instrument(skip(client), err)]
pub async fn available_models(
    client: Arc<dyn OpenAIClientTrait>,
) -> Result<Vec<ModelInfo>, anyhow::Error> {
    let mut models = Vec::new();

    let response = client
        .list_models()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch models: {}", e))?;

    for model in response {
        models.push(ModelInfo {
            id: model.id.clone(),
            name: model.id.clone(),
            provider: model.owned_by.clone(),
        });
    }

    models.sort_by(|a, b| {
        if a.provider == b.provider {
            a.name.cmp(&b.name)
        } else {
            a.provider.cmp(&b.provider)
        }
    });

    Ok(models)
}
