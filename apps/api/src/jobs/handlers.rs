//! Axum route handlers for the job-offer endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assistant::ask_structured;
use crate::errors::{AppError, AppJson};
use crate::jobs::prompts::{
    match_skills_prompt, salary_prompt, synthesize_prompt, DEFAULT_CV_CONTENT, DEFAULT_LOCATION,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchSkillsRequest {
    #[serde(default)]
    pub job_description: String,
    pub cv_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SalaryRequest {
    #[serde(default)]
    pub job_description: String,
    pub location: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /prompt
///
/// Sends the caller's prompt verbatim and returns the assistant's text.
pub async fn handle_prompt(
    State(state): State<AppState>,
    AppJson(request): AppJson<PromptRequest>,
) -> Result<Json<PromptResponse>, AppError> {
    require("prompt", &request.prompt)?;

    let response = state
        .assistant
        .run(&request.prompt, state.config.assistant_timeout())
        .await?;

    Ok(Json(PromptResponse { response }))
}

/// POST /synthesize
///
/// Job offer → `{title, company, location, contract_type, key_requirements, ...}`,
/// or `{rawText}` when the reply holds no JSON object.
pub async fn handle_synthesize(
    State(state): State<AppState>,
    AppJson(request): AppJson<SynthesizeRequest>,
) -> Result<Json<Value>, AppError> {
    require("job_description", &request.job_description)?;

    let prompt = synthesize_prompt(&request.job_description);
    let normalized = ask_structured(
        state.assistant.as_ref(),
        &prompt,
        state.config.assistant_timeout(),
    )
    .await?;

    Ok(Json(normalized.into_value()))
}

/// POST /match-skills
pub async fn handle_match_skills(
    State(state): State<AppState>,
    AppJson(request): AppJson<MatchSkillsRequest>,
) -> Result<Json<Value>, AppError> {
    require("job_description", &request.job_description)?;

    let cv_content = non_empty_or(request.cv_content.as_deref(), DEFAULT_CV_CONTENT);
    let prompt = match_skills_prompt(cv_content, &request.job_description);
    let normalized = ask_structured(
        state.assistant.as_ref(),
        &prompt,
        state.config.assistant_timeout(),
    )
    .await?;

    Ok(Json(normalized.into_value()))
}

/// POST /salary-analysis
pub async fn handle_salary_analysis(
    State(state): State<AppState>,
    AppJson(request): AppJson<SalaryRequest>,
) -> Result<Json<Value>, AppError> {
    require("job_description", &request.job_description)?;

    let location = non_empty_or(request.location.as_deref(), DEFAULT_LOCATION);
    let prompt = salary_prompt(&request.job_description, location);
    let normalized = ask_structured(
        state.assistant.as_ref(),
        &prompt,
        state.config.assistant_timeout(),
    )
    .await?;

    Ok(Json(normalized.into_value()))
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("Missing '{field}' field")));
    }
    Ok(())
}

fn non_empty_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(default)
}
