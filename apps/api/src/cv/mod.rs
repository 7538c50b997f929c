// CV composition: structured records and tagged text → CvSections →
// typeset source + plain text. Also hosts the CV endpoints and PDF extraction.
// Everything here except `handlers` and `extract` is pure and synchronous.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod compose;
pub mod escape;
pub mod extract;
pub mod handlers;
pub mod latex;
pub mod plain;
pub mod prompts;
pub mod record;
pub mod sections;
pub mod tagged;

pub use compose::Composition;
pub use sections::CvSections;

/// Language of rendered section headings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

#[derive(Debug, Error)]
#[error("unsupported language '{0}'")]
pub struct UnknownLanguage(String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" | "french" | "français" => Ok(Language::Fr),
            "en" | "english" => Ok(Language::En),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}
