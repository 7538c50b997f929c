// Prompt template for tailored CV generation.
// The reply is composed into typeset source and plain text server-side, so the
// model is asked for content only, never for markup.

use crate::assistant::prompts::{fill, JSON_ONLY_INSTRUCTION};

/// Placeholders: `{json_only}`, `{cv_content}`, `{job_title}`, `{company}`,
/// `{requirements}`, `{highlights}`.
pub const GENERATE_CV_PROMPT_TEMPLATE: &str = r#"Réécris ce CV pour le poste visé, en français, sans inventer d'expérience.
Mets en avant les compétences demandées. Tu peux entourer les mots-clés importants de **doubles astérisques**.
N'utilise aucune commande LaTeX. {json_only}:
{
    "personal": {
        "name": "Prénom Nom",
        "title": "Titre professionnel adapté au poste",
        "address": "Ville, Pays",
        "email": "email@exemple.fr",
        "phone": "+33 6 00 00 00 00",
        "linkedin": "linkedin.com/in/identifiant"
    },
    "profile": "Paragraphe de présentation de 3-4 lignes avec des **mots-clés**",
    "skills": [
        {"category": "Langages", "items": ["Python", "SQL"]}
    ],
    "experience": [
        {
            "dates": "2021 -- 2024",
            "title": "Intitulé du poste",
            "company": "Entreprise",
            "location": "Ville",
            "description": "Contexte en une phrase",
            "bullets": ["Réalisation chiffrée 1", "Réalisation chiffrée 2"]
        }
    ],
    "education": [
        {"dates": "2016 -- 2018", "degree": "Diplôme", "school": "École", "details": "Mention, spécialité"}
    ],
    "interests": "Centres d'intérêt",
    "adaptations": ["adaptation 1"],
    "summary": "résumé des modifications"
}

CV original:
{cv_content}

Poste: {job_title} chez {company}
Compétences requises: {requirements}
Points forts: {highlights}"#;

pub fn generate_cv_prompt(
    cv_content: &str,
    job_title: &str,
    company: &str,
    requirements: &[String],
    highlights: &[String],
) -> String {
    fill(
        GENERATE_CV_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("cv_content", cv_content),
            ("job_title", job_title),
            ("company", company),
            ("requirements", &requirements.join(", ")),
            ("highlights", &highlights.join(", ")),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_cv_prompt() {
        let prompt = generate_cv_prompt(
            "Mon CV",
            "Dev Rust",
            "Acme",
            &["Rust".to_string(), "Tokio".to_string()],
            &[],
        );
        assert!(prompt.contains("\"experience\": ["));
        assert!(prompt.contains("CV original:\nMon CV"));
        assert!(prompt.contains("Poste: Dev Rust chez Acme"));
        assert!(prompt.contains("Compétences requises: Rust, Tokio"));
        assert!(prompt.ends_with("Points forts: "));
    }
}
