//! PDF rendering: pluggable, trait-based renderers tried in priority order.
//!
//! Backends:
//! - `LatexRenderer`: typesetting compiler on the moderncv source (`pdflatex` by default).
//! - `LayoutRenderer`: declarative page layout with `printpdf`, no external binary.
//!
//! `AppState` holds one `RenderChain` built from `PDF_RENDERERS`. The chain
//! falls through to the next renderer on any failure and reports every
//! underlying error when all of them fail.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::cv::CvSections;
use crate::errors::AppError;

pub mod latex;
pub mod layout;

pub use latex::LatexRenderer;
pub use layout::LayoutRenderer;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RenderError {
    /// The backend cannot run here (binary missing, disabled).
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("output too small ({bytes} bytes, minimum {min})")]
    TooSmall { bytes: usize, min: usize },
}

/// A PDF backend. Implement this to add a renderer without touching handlers.
#[async_trait]
pub trait Renderer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn render(&self, sections: &CvSections) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    Latex,
    Layout,
}

#[derive(Debug, Error)]
#[error("unknown renderer '{0}'")]
pub struct UnknownRenderer(String);

impl FromStr for RendererKind {
    type Err = UnknownRenderer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latex" | "pdflatex" => Ok(RendererKind::Latex),
            "layout" | "printpdf" => Ok(RendererKind::Layout),
            other => Err(UnknownRenderer(other.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Chain
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub renderer: &'static str,
}

pub struct RenderChain {
    renderers: Vec<Arc<dyn Renderer>>,
    min_bytes: usize,
}

impl RenderChain {
    pub fn new(renderers: Vec<Arc<dyn Renderer>>, min_bytes: usize) -> Self {
        Self {
            renderers,
            min_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let renderers = config
            .pdf_renderers
            .iter()
            .map(|kind| -> Arc<dyn Renderer> {
                match kind {
                    RendererKind::Latex => Arc::new(LatexRenderer::new(
                        config.latex_bin.clone(),
                        config.latex_timeout(),
                        config.cv_language,
                    )),
                    RendererKind::Layout => Arc::new(LayoutRenderer::new(config.cv_language)),
                }
            })
            .collect();
        Self::new(renderers, config.min_pdf_bytes)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|r| r.name()).collect()
    }

    /// Tries each renderer in order; the first output of at least `min_bytes` wins.
    pub async fn render(&self, sections: &CvSections) -> Result<Rendered, AppError> {
        if self.renderers.is_empty() {
            return Err(AppError::RendererUnavailable(
                "PDF generation is disabled (no renderer configured)".to_string(),
            ));
        }

        let mut failures: Vec<(&'static str, RenderError)> = Vec::new();

        for renderer in &self.renderers {
            let name = renderer.name();
            let outcome = match renderer.render(sections).await {
                Ok(bytes) if bytes.len() >= self.min_bytes => Ok(bytes),
                Ok(bytes) => Err(RenderError::TooSmall {
                    bytes: bytes.len(),
                    min: self.min_bytes,
                }),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(bytes) => {
                    info!("PDF rendered by {name}: {} bytes", bytes.len());
                    return Ok(Rendered {
                        bytes,
                        renderer: name,
                    });
                }
                Err(e) => {
                    warn!("Renderer {name} failed: {e}");
                    failures.push((name, e));
                }
            }
        }

        let combined = failures
            .iter()
            .map(|(name, e)| format!("{name}: {e}"))
            .collect::<Vec<_>>()
            .join("; ");

        if failures
            .iter()
            .all(|(_, e)| matches!(e, RenderError::Unavailable(_)))
        {
            Err(AppError::RendererUnavailable(combined))
        } else {
            Err(AppError::RenderFailed(combined))
        }
    }
}
