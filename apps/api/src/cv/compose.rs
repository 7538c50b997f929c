//! Document Composer entry points.
//!
//! Both paths end in `compose_sections`, which produces the typeset source and
//! the plain text from the same `CvSections`. Composition never fails outward:
//! input that cannot be turned into sections yields a degraded `Composition`
//! with empty typeset source and the unprocessed text as diagnostic output.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::assistant::Normalized;
use crate::cv::latex::build_document;
use crate::cv::plain::build_plain_text;
use crate::cv::sections::CvSections;
use crate::cv::tagged::parse_tagged_text;
use crate::cv::Language;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("record contains no CV sections")]
    NoSections,
}

impl ComposeError {
    pub fn reason(&self) -> &'static str {
        match self {
            ComposeError::NoSections => "no_cv_sections",
        }
    }
}

/// Why a composition fell back to raw output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Degradation {
    /// Machine-oriented reason, e.g. `structured_parse_failed`.
    pub reason: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    pub sections: Option<CvSections>,
    pub latex_content: String,
    pub cv_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
}

impl Composition {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

pub fn compose_sections(sections: CvSections, language: Language) -> Composition {
    Composition {
        latex_content: build_document(&sections, language),
        cv_text: build_plain_text(&sections),
        sections: Some(sections),
        degraded: None,
    }
}

/// Tagged-text path.
pub fn compose_text(text: &str, language: Language) -> Composition {
    compose_sections(parse_tagged_text(text), language)
}

/// Structured-record path, with a `cv_text` field in the record as second chance.
pub fn sections_from_record(record: &Map<String, Value>) -> Result<CvSections, ComposeError> {
    match CvSections::from_record(record) {
        Ok(sections) => Ok(sections),
        Err(err) => match record.get("cv_text").and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => Ok(parse_tagged_text(text)),
            _ => Err(err),
        },
    }
}

/// Composes assistant output that went through the normalizer.
pub fn compose_normalized(normalized: &Normalized, language: Language) -> Composition {
    match normalized {
        Normalized::Record(record) => match sections_from_record(record) {
            Ok(sections) => compose_sections(sections, language),
            Err(err) => {
                warn!("CV record could not be composed: {err}");
                let raw = serde_json::to_string_pretty(record).unwrap_or_default();
                degraded(raw, err.reason(), err.to_string())
            }
        },
        Normalized::ParseFailed(text) => {
            warn!("CV reply was not JSON, returning raw text");
            degraded(
                text.clone(),
                "structured_parse_failed",
                "Le CV a été généré mais le parsing a échoué.".to_string(),
            )
        }
    }
}

fn degraded(raw: String, reason: &'static str, message: String) -> Composition {
    Composition {
        sections: None,
        latex_content: String::new(),
        cv_text: raw,
        degraded: Some(Degradation { reason, message }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::escape::strip_bold;
    use crate::cv::sections::{EducationEntry, ExperienceEntry, SkillLine};
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn sample_record() -> Map<String, Value> {
        record(json!({
            "personal": {"name": "Jeanne Martin", "title": "Ingénieure **Rust**", "email": "j@m.fr"},
            "profile": "Dix ans de **backend** & cloud",
            "skills": [
                {"category": "Langages", "items": ["Rust", "C#"]},
                {"category": "", "items": "Docker"}
            ],
            "experience": [
                {
                    "dates": "2023--2025",
                    "title": "Dev & QA",
                    "company": "Acme",
                    "location": "Paris",
                    "description": "Équipe **paiement**",
                    "bullets": ["50% gain", "Migré **tout** vers Rust"]
                },
                {"dates": "2019--2022", "title": "Stagiaire", "company": "Beta", "bullets": []}
            ],
            "education": [
                {"dates": "2015--2018", "degree": "Master", "school": "INSA", "details": "Mention TB"},
                {"degree": "Bac S"}
            ],
            "interests": ["Escalade", "Échecs"]
        }))
    }

    fn strip_skill(s: &SkillLine) -> SkillLine {
        SkillLine {
            category: strip_bold(&s.category),
            items: strip_bold(&s.items),
        }
    }

    fn strip_experience(e: &ExperienceEntry) -> ExperienceEntry {
        ExperienceEntry {
            dates: strip_bold(&e.dates),
            title: strip_bold(&e.title),
            company: strip_bold(&e.company),
            location: strip_bold(&e.location),
            description: strip_bold(&e.description),
            bullets: e.bullets.iter().map(|b| strip_bold(b)).collect(),
        }
    }

    fn strip_education(e: &EducationEntry) -> EducationEntry {
        EducationEntry {
            dates: strip_bold(&e.dates),
            degree: strip_bold(&e.degree),
            school: strip_bold(&e.school),
            details: strip_bold(&e.details),
            bullets: e.bullets.iter().map(|b| strip_bold(b)).collect(),
        }
    }

    #[test]
    fn test_plain_text_round_trips_through_tagged_parser() {
        let original = CvSections::from_record(&sample_record()).unwrap();
        let composition = compose_sections(original.clone(), Language::Fr);
        let reparsed = parse_tagged_text(&composition.cv_text);

        let skills: Vec<_> = original.skills.iter().map(strip_skill).collect();
        let experience: Vec<_> = original.experience.iter().map(strip_experience).collect();
        let education: Vec<_> = original.education.iter().map(strip_education).collect();

        assert_eq!(reparsed.skills, skills);
        assert_eq!(reparsed.experience, experience);
        assert_eq!(reparsed.education, education);
        assert_eq!(reparsed.name, "Jeanne Martin");
        assert_eq!(reparsed.title, "Ingénieure Rust");
        assert_eq!(reparsed.contact, vec!["j@m.fr"]);
        assert_eq!(reparsed.profile, vec!["Dix ans de backend & cloud"]);
        assert_eq!(reparsed.interests, vec!["Escalade", "Échecs"]);
    }

    #[test]
    fn test_round_trip_survives_free_form_entry_text() {
        let original = CvSections::from_record(&record(json!({
            "skills": ["Langues : anglais courant", {"category": "Outils", "items": ["Git"]}],
            "experience": [{
                "dates": "2023--2025",
                "title": "Lead\nDev",
                "company": "Acme | Paris",
                "description": "Missions :\n- API paiement\n-Refonte **CI**\nStack | Rust",
                "bullets": ["Shipped X"]
            }],
            "education": [{
                "dates": "2015--2018",
                "degree": "Master",
                "school": "INSA",
                "details": "Mention TB\nSpécialité IA"
            }]
        })))
        .unwrap();

        let reparsed = parse_tagged_text(&compose_sections(original.clone(), Language::Fr).cv_text);

        let skills: Vec<_> = original.skills.iter().map(strip_skill).collect();
        let experience: Vec<_> = original.experience.iter().map(strip_experience).collect();
        let education: Vec<_> = original.education.iter().map(strip_education).collect();
        assert_eq!(reparsed.skills, skills);
        assert_eq!(reparsed.experience, experience);
        assert_eq!(reparsed.education, education);

        assert_eq!(reparsed.skills[0].category, "Langues");
        assert_eq!(reparsed.experience[0].description, "Missions :\nStack / Rust");
        assert_eq!(
            reparsed.experience[0].bullets,
            vec!["API paiement", "Refonte CI", "Shipped X"]
        );
        assert_eq!(reparsed.education[0].details, "Mention TB; Spécialité IA");
    }

    #[test]
    fn test_both_projections_come_from_the_same_sections() {
        let composition = compose_normalized(&Normalized::Record(sample_record()), Language::Fr);
        assert!(!composition.is_degraded());
        assert!(composition.latex_content.contains(r"Dev \& QA"));
        assert!(composition.latex_content.contains(r"\textbf{tout}"));
        assert!(composition.cv_text.contains("Dev & QA"));
        assert!(composition.cv_text.contains("Migré tout vers Rust"));
        assert!(!composition.cv_text.contains("**"));
    }

    #[test]
    fn test_parse_failure_degrades_to_raw_text() {
        let raw = "Désolé, voici le CV en texte libre.";
        let composition =
            compose_normalized(&Normalized::ParseFailed(raw.to_string()), Language::Fr);
        assert_eq!(composition.latex_content, "");
        assert_eq!(composition.cv_text, raw);
        assert!(composition.sections.is_none());
        assert_eq!(
            composition.degraded.as_ref().map(|d| d.reason),
            Some("structured_parse_failed")
        );
    }

    #[test]
    fn test_record_without_sections_degrades() {
        let composition = compose_normalized(
            &Normalized::Record(record(json!({"summary": "rien"}))),
            Language::Fr,
        );
        assert_eq!(composition.latex_content, "");
        assert!(composition.cv_text.contains("\"summary\""));
        assert_eq!(
            composition.degraded.map(|d| d.reason),
            Some("no_cv_sections")
        );
    }

    #[test]
    fn test_cv_text_field_uses_tagged_path() {
        let composition = compose_normalized(
            &Normalized::Record(record(json!({
                "cv_text": "[NAME] Jeanne\n[SKILLS]\nRust",
                "adaptations": []
            }))),
            Language::En,
        );
        assert!(!composition.is_degraded());
        let sections = composition.sections.unwrap();
        assert_eq!(sections.name, "Jeanne");
        assert_eq!(sections.skills[0].items, "Rust");
    }
}
