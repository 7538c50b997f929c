pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cv::handlers as cv;
use crate::errors::not_found;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assistant passthrough and job-offer analysis
        .route("/prompt", post(jobs::handle_prompt))
        .route("/synthesize", post(jobs::handle_synthesize))
        .route("/match-skills", post(jobs::handle_match_skills))
        .route("/salary-analysis", post(jobs::handle_salary_analysis))
        // CV composition and rendering
        .route("/generate-cv", post(cv::handle_generate_cv))
        .route("/compose-cv", post(cv::handle_compose_cv))
        .route("/generate-pdf", post(cv::handle_generate_pdf))
        .route("/extract-pdf", post(cv::handle_extract_pdf))
        .fallback(not_found)
        .with_state(state)
}
