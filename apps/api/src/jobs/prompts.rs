// Prompt templates for the job-offer endpoints.
// Placeholders are filled with `assistant::prompts::fill`.

use crate::assistant::prompts::{fill, JSON_ONLY_INSTRUCTION};

/// Job offer synthesis. Placeholders: `{json_only}`, `{job_description}`.
pub const SYNTHESIZE_PROMPT_TEMPLATE: &str = r#"Analyse cette offre d'emploi. {json_only}:
{
    "title": "titre du poste",
    "company": "nom de l'entreprise ou Non spécifié",
    "location": "lieu ou Non spécifié",
    "contract_type": "CDI/CDD/etc ou Non spécifié",
    "key_requirements": ["compétence1", "compétence2"],
    "responsibilities": ["responsabilité1"],
    "benefits": ["avantage1"],
    "salary_range": null,
    "summary": "résumé en 2-3 phrases"
}

Offre:
{job_description}"#;

/// CV / offer skill matching. Placeholders: `{json_only}`, `{cv_content}`, `{job_description}`.
pub const MATCH_SKILLS_PROMPT_TEMPLATE: &str = r#"Compare ce CV avec cette offre. {json_only}:
{
    "match_score": 75,
    "matched_skills": [{"skill": "Python", "cv_level": "3 ans", "required": "2 ans", "match": true}],
    "missing_skills": [{"skill": "Kubernetes", "importance": "nice-to-have"}],
    "highlights": ["point fort 1"],
    "recommendations": ["recommandation 1"]
}

CV:
{cv_content}

Offre:
{job_description}"#;

/// Salary estimation. Placeholders: `{json_only}`, `{job_description}`, `{location}`.
pub const SALARY_PROMPT_TEMPLATE: &str = r#"Analyse le salaire pour cette offre. {json_only}:
{
    "offered_min": null,
    "offered_max": null,
    "market_low": 45000,
    "market_median": 55000,
    "market_high": 70000,
    "currency": "EUR",
    "analysis": "Analyse du positionnement salarial",
    "negotiation_tips": ["conseil 1"]
}

Offre:
{job_description}

Localisation: {location}"#;

pub const DEFAULT_CV_CONTENT: &str = "CV non fourni";
pub const DEFAULT_LOCATION: &str = "France";

pub fn synthesize_prompt(job_description: &str) -> String {
    fill(
        SYNTHESIZE_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("job_description", job_description),
        ],
    )
}

pub fn match_skills_prompt(cv_content: &str, job_description: &str) -> String {
    fill(
        MATCH_SKILLS_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("cv_content", cv_content),
            ("job_description", job_description),
        ],
    )
}

pub fn salary_prompt(job_description: &str, location: &str) -> String {
    fill(
        SALARY_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("job_description", job_description),
            ("location", location),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_prompt_embeds_offer_and_schema() {
        let prompt = synthesize_prompt("Développeur Rust à Lyon");
        assert!(prompt.starts_with("Analyse cette offre d'emploi. Retourne UNIQUEMENT"));
        assert!(prompt.contains("\"key_requirements\""));
        assert!(prompt.ends_with("Offre:\nDéveloppeur Rust à Lyon"));
    }

    #[test]
    fn test_match_prompt_orders_cv_before_offer() {
        let prompt = match_skills_prompt("MON CV", "MON OFFRE");
        let cv = prompt.find("MON CV").unwrap();
        let offer = prompt.find("MON OFFRE").unwrap();
        assert!(cv < offer);
        assert!(prompt.contains("\"match_score\": 75"));
    }

    #[test]
    fn test_salary_prompt_includes_location() {
        let prompt = salary_prompt("Data engineer", "Nantes");
        assert!(prompt.ends_with("Localisation: Nantes"));
    }
}
