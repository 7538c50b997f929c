use std::sync::Arc;

use crate::assistant::AssistantRunner;
use crate::config::Config;
use crate::render::RenderChain;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable assistant runner. Default: `CliAssistant` on `ASSISTANT_BIN`.
    pub assistant: Arc<dyn AssistantRunner>,
    /// Renderers in `PDF_RENDERERS` order.
    pub renderers: Arc<RenderChain>,
}
