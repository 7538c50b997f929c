use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::cv::Language;
use crate::render::RendererKind;

/// Application configuration loaded from environment variables.
/// Every value has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Assistant CLI, invoked as `<assistant_bin> -p <prompt>`.
    pub assistant_bin: String,
    pub assistant_timeout_secs: u64,
    /// Longer budget for CV generation prompts.
    pub cv_timeout_secs: u64,
    pub latex_bin: String,
    /// Per compiler pass. The compiler runs twice.
    pub latex_timeout_secs: u64,
    /// Renderers in priority order. Empty disables PDF generation.
    pub pdf_renderers: Vec<RendererKind>,
    /// Output below this size is treated as a failed render.
    pub min_pdf_bytes: usize,
    pub cv_language: Language,
    pub max_concurrent_requests: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            port: var("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            assistant_bin: var("ASSISTANT_BIN", "claude"),
            assistant_timeout_secs: parse_secs("ASSISTANT_TIMEOUT_SECS", &var("ASSISTANT_TIMEOUT_SECS", "120"))?,
            cv_timeout_secs: parse_secs("CV_TIMEOUT_SECS", &var("CV_TIMEOUT_SECS", "180"))?,
            latex_bin: var("LATEX_BIN", "pdflatex"),
            latex_timeout_secs: parse_secs("LATEX_TIMEOUT_SECS", &var("LATEX_TIMEOUT_SECS", "60"))?,
            pdf_renderers: parse_renderers(&var("PDF_RENDERERS", "latex,layout"))?,
            min_pdf_bytes: var("MIN_PDF_BYTES", "1000")
                .parse::<usize>()
                .context("MIN_PDF_BYTES must be a non-negative integer")?,
            cv_language: var("CV_LANGUAGE", "fr")
                .parse::<Language>()
                .context("CV_LANGUAGE must be 'fr' or 'en'")?,
            max_concurrent_requests: var("MAX_CONCURRENT_REQUESTS", "1")
                .parse::<usize>()
                .context("MAX_CONCURRENT_REQUESTS must be a positive integer")?,
        };

        if config.max_concurrent_requests == 0 {
            bail!("MAX_CONCURRENT_REQUESTS must be at least 1");
        }

        Ok(config)
    }

    pub fn assistant_timeout(&self) -> Duration {
        Duration::from_secs(self.assistant_timeout_secs)
    }

    pub fn cv_timeout(&self) -> Duration {
        Duration::from_secs(self.cv_timeout_secs)
    }

    pub fn latex_timeout(&self) -> Duration {
        Duration::from_secs(self.latex_timeout_secs)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    let secs = value
        .parse::<u64>()
        .with_context(|| format!("{key} must be a number of seconds"))?;
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(secs)
}

fn parse_renderers(value: &str) -> Result<Vec<RendererKind>> {
    let mut kinds = Vec::new();
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = name
            .parse::<RendererKind>()
            .with_context(|| format!("PDF_RENDERERS contains unknown renderer '{name}'"))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
