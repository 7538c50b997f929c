//! `CvSections`, the intermediate representation shared by both composer paths,
//! and the `SectionKind` synonym table used to recognise section headers.

use serde::{Deserialize, Serialize};

use crate::cv::Language;

/// Logical CV slots, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Name,
    Title,
    Contact,
    Profile,
    Skills,
    Experience,
    Education,
    Interests,
}

/// Every recognised header label. Compared after `fold_label`, so case,
/// punctuation and spacing in this table do not matter.
const SYNONYMS: &[(&str, SectionKind)] = &[
    ("name", SectionKind::Name),
    ("full name", SectionKind::Name),
    ("nom", SectionKind::Name),
    ("nom complet", SectionKind::Name),
    ("prénom nom", SectionKind::Name),
    ("title", SectionKind::Title),
    ("job title", SectionKind::Title),
    ("headline", SectionKind::Title),
    ("titre", SectionKind::Title),
    ("poste", SectionKind::Title),
    ("intitulé", SectionKind::Title),
    ("intitulé du poste", SectionKind::Title),
    ("contact", SectionKind::Contact),
    ("contacts", SectionKind::Contact),
    ("coordonnées", SectionKind::Contact),
    ("coordonnees", SectionKind::Contact),
    ("informations personnelles", SectionKind::Contact),
    ("personal details", SectionKind::Contact),
    ("profile", SectionKind::Profile),
    ("profil", SectionKind::Profile),
    ("profil professionnel", SectionKind::Profile),
    ("résumé", SectionKind::Profile),
    ("resume", SectionKind::Profile),
    ("summary", SectionKind::Profile),
    ("professional summary", SectionKind::Profile),
    ("about", SectionKind::Profile),
    ("about me", SectionKind::Profile),
    ("à propos", SectionKind::Profile),
    ("objectif", SectionKind::Profile),
    ("skills", SectionKind::Skills),
    ("technical skills", SectionKind::Skills),
    ("compétences", SectionKind::Skills),
    ("competences", SectionKind::Skills),
    ("compétences techniques", SectionKind::Skills),
    ("competences techniques", SectionKind::Skills),
    ("experience", SectionKind::Experience),
    ("experiences", SectionKind::Experience),
    ("work experience", SectionKind::Experience),
    ("professional experience", SectionKind::Experience),
    ("expérience", SectionKind::Experience),
    ("expériences", SectionKind::Experience),
    ("expérience professionnelle", SectionKind::Experience),
    ("expériences professionnelles", SectionKind::Experience),
    ("experience professionnelle", SectionKind::Experience),
    ("experiences professionnelles", SectionKind::Experience),
    ("parcours professionnel", SectionKind::Experience),
    ("education", SectionKind::Education),
    ("éducation", SectionKind::Education),
    ("formation", SectionKind::Education),
    ("formations", SectionKind::Education),
    ("diplômes", SectionKind::Education),
    ("diplomes", SectionKind::Education),
    ("études", SectionKind::Education),
    ("etudes", SectionKind::Education),
    ("interests", SectionKind::Interests),
    ("hobbies", SectionKind::Interests),
    ("intérêts", SectionKind::Interests),
    ("interets", SectionKind::Interests),
    ("centres d'intérêt", SectionKind::Interests),
    ("centres d'intérêts", SectionKind::Interests),
    ("centres d'interet", SectionKind::Interests),
    ("loisirs", SectionKind::Interests),
];

impl SectionKind {
    /// Resolves a header label through the synonym table.
    pub fn from_label(label: &str) -> Option<Self> {
        let folded = fold_label(label);
        if folded.is_empty() {
            return None;
        }
        SYNONYMS
            .iter()
            .find(|(synonym, _)| fold_label(synonym) == folded)
            .map(|(_, kind)| *kind)
    }

    /// Canonical tag used by the plain-text form, e.g. `EXPERIENCE`.
    pub fn tag(self) -> &'static str {
        match self {
            SectionKind::Name => "NAME",
            SectionKind::Title => "TITLE",
            SectionKind::Contact => "CONTACT",
            SectionKind::Profile => "PROFILE",
            SectionKind::Skills => "SKILLS",
            SectionKind::Experience => "EXPERIENCE",
            SectionKind::Education => "EDUCATION",
            SectionKind::Interests => "INTERESTS",
        }
    }

    /// Heading printed in rendered documents.
    pub fn heading(self, language: Language) -> &'static str {
        match (self, language) {
            (SectionKind::Name, Language::Fr) => "Nom",
            (SectionKind::Name, Language::En) => "Name",
            (SectionKind::Title, Language::Fr) => "Titre",
            (SectionKind::Title, Language::En) => "Title",
            (SectionKind::Contact, _) => "Contact",
            (SectionKind::Profile, Language::Fr) => "Profil",
            (SectionKind::Profile, Language::En) => "Profile",
            (SectionKind::Skills, Language::Fr) => "Compétences",
            (SectionKind::Skills, Language::En) => "Skills",
            (SectionKind::Experience, Language::Fr) => "Expérience professionnelle",
            (SectionKind::Experience, Language::En) => "Professional Experience",
            (SectionKind::Education, Language::Fr) => "Formation",
            (SectionKind::Education, Language::En) => "Education",
            (SectionKind::Interests, Language::Fr) => "Centres d'intérêt",
            (SectionKind::Interests, Language::En) => "Interests",
        }
    }

    /// Name and title keep only their first content line.
    pub fn is_singular(self) -> bool {
        matches!(self, SectionKind::Name | SectionKind::Title)
    }
}

/// Lower-cases, turns every non-alphanumeric character into a space and
/// collapses whitespace: `"Centres d'Intérêt :"` → `"centres d intérêt"`.
pub fn fold_label(label: &str) -> String {
    let spaced: String = label
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One line of the skills section: `category: items`, category optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLine {
    pub category: String,
    pub items: String,
}

impl SkillLine {
    /// Splits on the first `:`. A line without one is all items.
    pub fn parse(line: &str) -> Self {
        match line.split_once(':') {
            Some((category, items)) => SkillLine {
                category: category.trim().to_string(),
                items: items.trim().to_string(),
            },
            None => SkillLine {
                category: String::new(),
                items: line.trim().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub dates: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub dates: String,
    pub degree: String,
    pub school: String,
    pub details: String,
    pub bullets: Vec<String>,
}

/// Résumé content, created per request and discarded with the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSections {
    pub name: String,
    pub title: String,
    /// Address and contact lines shown in the document header.
    pub contact: Vec<String>,
    pub profile: Vec<String>,
    pub skills: Vec<SkillLine>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub interests: Vec<String>,
}

impl CvSections {
    /// True when no body section (profile through interests) has content.
    pub fn has_no_body(&self) -> bool {
        self.profile.is_empty()
            && self.skills.is_empty()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.interests.is_empty()
    }

    /// Fills name and title from request metadata when the CV itself lacks them.
    pub fn fill_header(&mut self, name: &str, title: &str) {
        if self.name.trim().is_empty() {
            self.name = name.trim().to_string();
        }
        if self.title.trim().is_empty() {
            self.title = title.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_label() {
        assert_eq!(fold_label("  Centres d'Intérêt : "), "centres d intérêt");
        assert_eq!(fold_label("## SKILLS ##"), "skills");
        assert_eq!(fold_label("---"), "");
    }

    #[test]
    fn test_synonyms_map_to_profile() {
        for label in ["profile", "PROFIL", "Résumé", "RÉSUMÉ:", "summary"] {
            assert_eq!(SectionKind::from_label(label), Some(SectionKind::Profile), "{label}");
        }
    }

    #[test]
    fn test_french_labels() {
        assert_eq!(
            SectionKind::from_label("EXPÉRIENCES PROFESSIONNELLES"),
            Some(SectionKind::Experience)
        );
        assert_eq!(SectionKind::from_label("Formation"), Some(SectionKind::Education));
        assert_eq!(SectionKind::from_label("COMPÉTENCES"), Some(SectionKind::Skills));
        assert_eq!(
            SectionKind::from_label("Centres d’intérêt"),
            Some(SectionKind::Interests)
        );
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(SectionKind::from_label("References"), None);
        assert_eq!(SectionKind::from_label(""), None);
    }

    #[test]
    fn test_every_tag_resolves_to_itself() {
        for kind in [
            SectionKind::Name,
            SectionKind::Title,
            SectionKind::Contact,
            SectionKind::Profile,
            SectionKind::Skills,
            SectionKind::Experience,
            SectionKind::Education,
            SectionKind::Interests,
        ] {
            assert_eq!(SectionKind::from_label(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn test_skill_line_parse() {
        assert_eq!(
            SkillLine::parse("Langages : Rust, Go"),
            SkillLine {
                category: "Langages".into(),
                items: "Rust, Go".into()
            }
        );
        assert_eq!(SkillLine::parse("Docker").category, "");
    }

    #[test]
    fn test_fill_header_keeps_existing_values() {
        let mut sections = CvSections {
            name: "Jeanne Martin".into(),
            ..Default::default()
        };
        sections.fill_header("Someone Else", "Data Engineer");
        assert_eq!(sections.name, "Jeanne Martin");
        assert_eq!(sections.title, "Data Engineer");
    }
}
