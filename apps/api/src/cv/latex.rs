//! Typeset-source builders for the moderncv document class.
//!
//! Every piece of CV text goes through `escape_typeset` exactly once, here.
//! Absent fields render as empty arguments; nothing in this module fails.

use crate::cv::escape::escape_typeset;
use crate::cv::sections::{CvSections, EducationEntry, ExperienceEntry, SectionKind, SkillLine};
use crate::cv::Language;

const PREAMBLE: &str = r"\documentclass[11pt,a4paper,sans]{moderncv}
\moderncvstyle{classic}
\moderncvcolor{blue}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage[scale=0.85]{geometry}
";

/// `\cvitem{category}{items}`
pub fn build_skill_line(skill: &SkillLine) -> String {
    format!(
        "\\cvitem{{{}}}{{{}}}\n",
        escape_typeset(&skill.category),
        escape_typeset(&skill.items)
    )
}

/// `\cventry{dates}{title}{company}{location}{}{description + bullets}`
pub fn build_experience_entry(entry: &ExperienceEntry) -> String {
    let mut body = String::new();
    if !entry.description.trim().is_empty() {
        body.push_str(&escape_lines(&entry.description));
    }
    push_itemize(&mut body, &entry.bullets);

    format!(
        "\\cventry{{{}}}{{{}}}{{{}}}{{{}}}{{}}{{{}}}\n",
        escape_typeset(&entry.dates),
        escape_typeset(&entry.title),
        escape_typeset(&entry.company),
        escape_typeset(&entry.location),
        body
    )
}

/// `\cventry{dates}{degree}{school}{details}{}{bullets}`
pub fn build_education_entry(entry: &EducationEntry) -> String {
    let mut body = String::new();
    push_itemize(&mut body, &entry.bullets);

    format!(
        "\\cventry{{{}}}{{{}}}{{{}}}{{{}}}{{}}{{{}}}\n",
        escape_typeset(&entry.dates),
        escape_typeset(&entry.degree),
        escape_typeset(&entry.school),
        escape_typeset(&entry.details),
        body
    )
}

/// Full document: preamble, four-field header, then profile, skills,
/// experience, education and interests in that order.
pub fn build_document(sections: &CvSections, language: Language) -> String {
    let mut doc = String::from(PREAMBLE);
    doc.push('\n');
    doc.push_str(&build_header(sections));
    doc.push_str("\n\\begin{document}\n\\makecvtitle\n");

    push_section(&mut doc, SectionKind::Profile, language);
    if !sections.profile.is_empty() {
        doc.push_str(&escape_lines(&sections.profile.join("\n")));
        doc.push('\n');
    }

    push_section(&mut doc, SectionKind::Skills, language);
    for skill in &sections.skills {
        doc.push_str(&build_skill_line(skill));
    }

    push_section(&mut doc, SectionKind::Experience, language);
    for entry in &sections.experience {
        doc.push_str(&build_experience_entry(entry));
        doc.push_str("\\vspace{0.5em}\n");
    }

    push_section(&mut doc, SectionKind::Education, language);
    for entry in &sections.education {
        doc.push_str(&build_education_entry(entry));
    }

    push_section(&mut doc, SectionKind::Interests, language);
    if !sections.interests.is_empty() {
        doc.push_str(&format!(
            "\\cvitem{{}}{{{}}}\n",
            escape_lines(&sections.interests.join("\n"))
        ));
    }

    doc.push_str("\n\\end{document}\n");
    doc
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

/// What a free-form contact line most likely holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    Phone,
    Linkedin,
    Homepage,
    Address,
}

pub fn classify_contact_line(line: &str) -> ContactField {
    let lower = line.to_lowercase();
    if lower.contains("linkedin") {
        return ContactField::Linkedin;
    }
    if line.contains('@') {
        return ContactField::Email;
    }
    if lower.starts_with("http") || lower.starts_with("www.") {
        return ContactField::Homepage;
    }
    let digits = line.chars().filter(char::is_ascii_digit).count();
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    if digits >= 8 && letters == 0 {
        return ContactField::Phone;
    }
    ContactField::Address
}

fn build_header(sections: &CvSections) -> String {
    let (first, last) = split_name(&sections.name);
    let mut header = format!(
        "\\name{{{}}}{{{}}}\n\\title{{{}}}\n",
        escape_typeset(first),
        escape_typeset(last),
        escape_typeset(&sections.title)
    );

    let mut address = Vec::new();
    for line in sections.contact.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        match classify_contact_line(line) {
            ContactField::Email => {
                header.push_str(&format!("\\email{{{}}}\n", escape_typeset(line)))
            }
            ContactField::Phone => {
                header.push_str(&format!("\\phone[mobile]{{{}}}\n", escape_typeset(line)))
            }
            ContactField::Linkedin => header.push_str(&format!(
                "\\social[linkedin]{{{}}}\n",
                escape_typeset(strip_linkedin_prefix(line))
            )),
            ContactField::Homepage => {
                header.push_str(&format!("\\homepage{{{}}}\n", escape_typeset(line)))
            }
            ContactField::Address => address.push(escape_typeset(line)),
        }
    }

    let street = address.first().cloned().unwrap_or_default();
    let city = address.get(1..).map(|rest| rest.join(", ")).unwrap_or_default();
    header.push_str(&format!("\\address{{{street}}}{{{city}}}{{}}\n"));
    header
}

/// moderncv wants `\name{first}{last}`: the first word is the first name.
fn split_name(name: &str) -> (&str, &str) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, last)) => (first, last.trim()),
        None => (name, ""),
    }
}

/// `\social[linkedin]` expects the profile handle, not the full URL.
fn strip_linkedin_prefix(line: &str) -> &str {
    let lower = line.to_ascii_lowercase();
    match lower.find("linkedin.com/in/") {
        Some(pos) => line[pos + "linkedin.com/in/".len()..].trim_end_matches('/'),
        None => line,
    }
}

fn push_section(doc: &mut String, kind: SectionKind, language: Language) {
    doc.push_str(&format!(
        "\n\\section{{{}}}\n",
        escape_typeset(kind.heading(language))
    ));
}

fn push_itemize(body: &mut String, bullets: &[String]) {
    let items: Vec<&String> = bullets.iter().filter(|b| !b.trim().is_empty()).collect();
    if items.is_empty() {
        return;
    }
    body.push_str("\\begin{itemize}");
    for item in items {
        body.push_str("\\item ");
        body.push_str(&escape_typeset(item.trim()));
        body.push(' ');
    }
    body.push_str("\\end{itemize}");
}

/// Escapes each line and joins them with a typeset line break.
fn escape_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(escape_typeset)
        .collect::<Vec<_>>()
        .join(" \\\\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CvSections {
        CvSections {
            name: "Jeanne Martin".into(),
            title: "Ingénieure R&D".into(),
            contact: vec![
                "12 rue des Lilas".into(),
                "69001 Lyon".into(),
                "jeanne@example.fr".into(),
                "+33 6 12 34 56 78".into(),
                "linkedin.com/in/jmartin/".into(),
            ],
            profile: vec!["**10 ans** d'expérience en C#".into()],
            skills: vec![SkillLine {
                category: "Langages".into(),
                items: "Rust, C#, SQL".into(),
            }],
            experience: vec![ExperienceEntry {
                dates: "2023--2025".into(),
                title: "Dev & QA".into(),
                company: "Acme".into(),
                location: "Paris".into(),
                description: String::new(),
                bullets: vec!["50% gain".into()],
            }],
            education: vec![EducationEntry {
                dates: "2015--2018".into(),
                degree: "Master".into(),
                school: "INSA".into(),
                details: "Mention TB".into(),
                bullets: vec![],
            }],
            interests: vec!["Escalade".into()],
        }
    }

    #[test]
    fn test_experience_entry_escapes_fields_and_bullets() {
        let entry = &sample().experience[0];
        let out = build_experience_entry(entry);
        assert!(out.contains(r"Dev \& QA"));
        assert!(out.contains(r"50\% gain"));
        assert!(out.starts_with(r"\cventry{2023--2025}{Dev \& QA}{Acme}{Paris}{}"));
        let without_escapes = out.replace(r"\&", "").replace(r"\%", "");
        assert!(!without_escapes.contains('&'));
        assert!(!without_escapes.contains('%'));
    }

    #[test]
    fn test_missing_fields_render_as_empty_segments() {
        let out = build_experience_entry(&ExperienceEntry::default());
        assert_eq!(out, "\\cventry{}{}{}{}{}{}\n");
        let out = build_education_entry(&EducationEntry::default());
        assert_eq!(out, "\\cventry{}{}{}{}{}{}\n");
        let out = build_skill_line(&SkillLine::default());
        assert_eq!(out, "\\cvitem{}{}\n");
    }

    #[test]
    fn test_skill_line() {
        let out = build_skill_line(&sample().skills[0]);
        assert_eq!(out, "\\cvitem{Langages}{Rust, C\\#, SQL}\n");
    }

    #[test]
    fn test_document_structure() {
        let doc = build_document(&sample(), Language::Fr);
        assert!(doc.starts_with(r"\documentclass[11pt,a4paper,sans]{moderncv}"));
        assert!(doc.contains(r"\moderncvcolor{blue}"));
        assert!(doc.contains(r"\name{Jeanne}{Martin}"));
        assert!(doc.contains(r"\title{Ingénieure R\&D}"));
        assert!(doc.contains(r"\address{12 rue des Lilas}{69001 Lyon}{}"));
        assert!(doc.contains(r"\email{jeanne@example.fr}"));
        assert!(doc.contains(r"\phone[mobile]{+33 6 12 34 56 78}"));
        assert!(doc.contains(r"\social[linkedin]{jmartin}"));
        assert!(doc.contains(r"\textbf{10 ans} d'expérience en C\#"));
        assert!(doc.trim_end().ends_with(r"\end{document}"));

        let order = [
            r"\section{Profil}",
            r"\section{Compétences}",
            r"\section{Expérience professionnelle}",
            r"\section{Formation}",
            r"\section{Centres d'intérêt}",
        ];
        let positions: Vec<usize> = order.iter().map(|s| doc.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_english_headings() {
        let doc = build_document(&sample(), Language::En);
        assert!(doc.contains(r"\section{Professional Experience}"));
        assert!(doc.contains(r"\section{Interests}"));
    }

    #[test]
    fn test_empty_sections_still_render_all_headings() {
        let doc = build_document(&CvSections::default(), Language::Fr);
        assert_eq!(doc.matches(r"\section{").count(), 5);
        assert!(doc.contains(r"\name{}{}"));
    }

    #[test]
    fn test_classify_contact_line() {
        assert_eq!(classify_contact_line("a@b.fr"), ContactField::Email);
        assert_eq!(classify_contact_line("06 12 34 56 78"), ContactField::Phone);
        assert_eq!(
            classify_contact_line("https://linkedin.com/in/x"),
            ContactField::Linkedin
        );
        assert_eq!(classify_contact_line("https://jm.dev"), ContactField::Homepage);
        assert_eq!(classify_contact_line("69001 Lyon"), ContactField::Address);
    }
}
