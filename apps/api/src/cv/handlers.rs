//! Axum route handlers for CV generation, composition, rendering and extraction.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::assistant::{ask_structured, normalize, Normalized};
use crate::cv::compose::{compose_normalized, compose_text, sections_from_record};
use crate::cv::extract::{decode_pdf_base64, extract_pdf_text};
use crate::cv::prompts::generate_cv_prompt;
use crate::cv::tagged::parse_tagged_text;
use crate::cv::{Composition, CvSections};
use crate::errors::{AppError, AppJson};
use crate::jobs::handlers::require;
use crate::state::AppState;

/// Shown as the only adaptation when the assistant reply could not be structured.
pub const RAW_FORMAT_ADAPTATION: &str = "CV généré (format brut)";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateCvRequest {
    #[serde(default)]
    pub cv_content: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ComposeCvRequest {
    pub cv_data: Option<Value>,
    pub cv_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePdfRequest {
    pub cv_content: Option<String>,
    pub cv_data: Option<Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractPdfRequest {
    #[serde(default)]
    pub pdf_base64: String,
}

#[derive(Debug, Serialize)]
pub struct CvResponse {
    /// The structured record the CV was composed from, if any.
    pub cv_data: Option<Value>,
    pub latex_content: String,
    pub cv_text: String,
    pub adaptations: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CvResponse {
    fn new(composition: Composition, record: Option<&Map<String, Value>>) -> Self {
        let (reason, message) = match composition.degraded {
            Some(d) => (Some(d.reason), Some(d.message)),
            None => (None, None),
        };
        Self {
            cv_data: record.map(|r| Value::Object(r.clone())),
            latex_content: composition.latex_content,
            cv_text: composition.cv_text,
            adaptations: Vec::new(),
            summary: String::new(),
            reason,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GeneratePdfResponse {
    pub success: bool,
    pub pdf_base64: String,
    pub renderer: &'static str,
    pub size_bytes: usize,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractPdfResponse {
    pub success: bool,
    pub text: String,
    pub chars: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generate-cv
///
/// Asks the assistant for a tailored CV record and composes it. A reply that is
/// not structured still returns 200 with the raw text and a `reason`.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateCvRequest>,
) -> Result<Json<CvResponse>, AppError> {
    require("cv_content", &request.cv_content)?;

    let prompt = generate_cv_prompt(
        &request.cv_content,
        &request.job_title,
        &request.company,
        &request.requirements,
        &request.highlights,
    );
    let normalized =
        ask_structured(state.assistant.as_ref(), &prompt, state.config.cv_timeout()).await?;

    let composition = compose_normalized(&normalized, state.config.cv_language);
    let degraded = composition.is_degraded();
    let record = normalized.as_record();
    let mut response = CvResponse::new(composition, record);

    if degraded {
        response.adaptations = vec![RAW_FORMAT_ADAPTATION.to_string()];
    } else if let Some(record) = record {
        response.adaptations = string_list(record.get("adaptations"));
        response.summary = record
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
    }

    info!(
        "Generated CV for '{}' ({} chars, degraded: {degraded})",
        request.job_title,
        response.cv_text.len()
    );
    Ok(Json(response))
}

/// POST /compose-cv
///
/// Composes a caller-supplied CV without calling the assistant.
/// `cv_data` wins over `cv_content` when both are given.
pub async fn handle_compose_cv(
    State(state): State<AppState>,
    AppJson(request): AppJson<ComposeCvRequest>,
) -> Result<Json<CvResponse>, AppError> {
    let language = state.config.cv_language;

    if let Some(data) = request.cv_data.filter(|v| !v.is_null()) {
        let Value::Object(record) = data else {
            return Err(AppError::Validation(
                "'cv_data' must be a JSON object".to_string(),
            ));
        };
        let composition = compose_normalized(&Normalized::Record(record.clone()), language);
        return Ok(Json(CvResponse::new(composition, Some(&record))));
    }

    let content = request.cv_content.unwrap_or_default();
    require("cv_content", &content)?;

    let response = match normalize(&content) {
        Normalized::Record(record) => {
            let composition = compose_normalized(&Normalized::Record(record.clone()), language);
            CvResponse::new(composition, Some(&record))
        }
        Normalized::ParseFailed(_) => CvResponse::new(compose_text(&content, language), None),
    };
    Ok(Json(response))
}

/// POST /generate-pdf
///
/// Composes the CV and renders it through the configured renderer chain.
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    AppJson(request): AppJson<GeneratePdfRequest>,
) -> Result<Json<GeneratePdfResponse>, AppError> {
    let mut sections = pdf_sections(request.cv_data.as_ref(), request.cv_content.as_deref())?;
    sections.fill_header(&request.name, &request.job_title);

    let rendered = state.renderers.render(&sections).await?;
    let size_bytes = rendered.bytes.len();
    let filename = pdf_filename(&request.name, &request.job_title);

    info!(
        "PDF {filename} rendered by {} ({size_bytes} bytes, company '{}')",
        rendered.renderer, request.company
    );

    Ok(Json(GeneratePdfResponse {
        success: true,
        pdf_base64: STANDARD.encode(&rendered.bytes),
        renderer: rendered.renderer,
        size_bytes,
        filename,
    }))
}

/// POST /extract-pdf
pub async fn handle_extract_pdf(
    AppJson(request): AppJson<ExtractPdfRequest>,
) -> Result<Json<ExtractPdfResponse>, AppError> {
    require("pdf_base64", &request.pdf_base64)?;

    let bytes = decode_pdf_base64(&request.pdf_base64)?;
    let text = extract_pdf_text(bytes).await?;
    let chars = text.chars().count();

    Ok(Json(ExtractPdfResponse {
        success: true,
        text,
        chars,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Resolves the sections to render. Order: composable `cv_data`, then
/// `cv_content` as JSON, then `cv_content` as tagged text. Text with no
/// recognised section goes to the profile.
fn pdf_sections(cv_data: Option<&Value>, cv_content: Option<&str>) -> Result<CvSections, AppError> {
    if let Some(Value::Object(record)) = cv_data {
        if let Ok(sections) = sections_from_record(record) {
            return Ok(sections);
        }
    }

    let content = cv_content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(AppError::Validation(
            "Missing 'cv_content' or composable 'cv_data'".to_string(),
        ));
    }

    if let Normalized::Record(record) = normalize(content) {
        if let Ok(sections) = sections_from_record(&record) {
            return Ok(sections);
        }
    }

    let mut sections = parse_tagged_text(content);
    if sections.has_no_body() {
        sections.profile = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
    }
    Ok(sections)
}

/// `CV_<name>_<title>.pdf`, keeping letters, digits and dashes.
fn pdf_filename(name: &str, job_title: &str) -> String {
    let parts: Vec<String> = [name, job_title]
        .iter()
        .map(|part| {
            part.chars()
                .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
        })
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        "CV.pdf".to_string()
    } else {
        format!("CV_{}.pdf", parts.join("_"))
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pdf_filename() {
        assert_eq!(pdf_filename("Jeanne Martin", "Dev Rust/Go"), "CV_Jeanne_Martin_Dev_RustGo.pdf");
        assert_eq!(pdf_filename("", "  "), "CV.pdf");
        assert_eq!(pdf_filename("Zoé", ""), "CV_Zoé.pdf");
    }

    #[test]
    fn test_pdf_sections_prefer_cv_data() {
        let data = json!({"personal": {"name": "A"}, "skills": ["Rust"]});
        let sections = pdf_sections(Some(&data), Some("[SKILLS]\nGo")).unwrap();
        assert_eq!(sections.name, "A");
        assert_eq!(sections.skills[0].items, "Rust");
    }

    #[test]
    fn test_pdf_sections_fall_back_to_content() {
        let data = json!({"nothing": true});
        let sections = pdf_sections(Some(&data), Some("[SKILLS]\nGo")).unwrap();
        assert_eq!(sections.skills[0].items, "Go");
    }

    #[test]
    fn test_pdf_sections_detect_json_content() {
        let content = "Voici:\n```json\n{\"profile\": \"Backend\"}\n```";
        let sections = pdf_sections(None, Some(content)).unwrap();
        assert_eq!(sections.profile, vec!["Backend"]);
    }

    #[test]
    fn test_untagged_text_goes_to_profile() {
        let sections = pdf_sections(None, Some("Jeanne\n\nDéveloppeuse depuis 2015")).unwrap();
        assert_eq!(sections.profile, vec!["Jeanne", "Développeuse depuis 2015"]);
    }

    #[test]
    fn test_pdf_sections_require_some_input() {
        assert!(matches!(
            pdf_sections(None, Some("  ")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_string_list() {
        assert_eq!(string_list(Some(&json!(["a", null, 3]))), vec!["a", "3"]);
        assert_eq!(string_list(Some(&json!("seule"))), vec!["seule"]);
        assert!(string_list(None).is_empty());
    }
}
