//! Plain-text projection of `CvSections`.
//!
//! Same traversal as the typeset builders, without escaping; `**` markers are
//! deleted. The output uses `[TAG]` headers so the tagged-text parser can read
//! it back.

use crate::cv::escape::strip_bold;
use crate::cv::sections::{CvSections, EducationEntry, ExperienceEntry, SectionKind, SkillLine};

/// Separator between positional entry fields.
pub const FIELD_SEPARATOR: &str = " | ";

pub fn build_plain_text(sections: &CvSections) -> String {
    let mut blocks: Vec<Vec<String>> = Vec::new();

    let mut header = Vec::new();
    if !sections.name.trim().is_empty() {
        header.push(labelled(SectionKind::Name, &sections.name));
    }
    if !sections.title.trim().is_empty() {
        header.push(labelled(SectionKind::Title, &sections.title));
    }
    blocks.push(header);

    blocks.push(section_block(SectionKind::Contact, plain_lines(&sections.contact)));
    blocks.push(section_block(SectionKind::Profile, plain_lines(&sections.profile)));
    blocks.push(section_block(
        SectionKind::Skills,
        sections.skills.iter().map(skill_line).collect(),
    ));
    blocks.push(section_block(
        SectionKind::Experience,
        sections.experience.iter().flat_map(experience_lines).collect(),
    ));
    blocks.push(section_block(
        SectionKind::Education,
        sections.education.iter().flat_map(education_lines).collect(),
    ));
    blocks.push(section_block(SectionKind::Interests, plain_lines(&sections.interests)));

    blocks
        .into_iter()
        .filter(|block| !block.is_empty())
        .map(|block| block.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn skill_line(skill: &SkillLine) -> String {
    let items = strip_bold(skill.items.trim());
    if skill.category.trim().is_empty() {
        items
    } else {
        format!("{}: {}", strip_bold(skill.category.trim()), items)
    }
}

pub fn experience_lines(entry: &ExperienceEntry) -> Vec<String> {
    let mut lines = vec![entry_line(&[
        &entry.dates,
        &entry.title,
        &entry.company,
        &entry.location,
    ])];
    lines.extend(
        entry
            .description
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(strip_bold),
    );
    lines.extend(bullet_lines(&entry.bullets));
    lines
}

pub fn education_lines(entry: &EducationEntry) -> Vec<String> {
    let mut lines = vec![entry_line(&[
        &entry.dates,
        &entry.degree,
        &entry.school,
        &entry.details,
    ])];
    lines.extend(bullet_lines(&entry.bullets));
    lines
}

fn labelled(kind: SectionKind, value: &str) -> String {
    format!("[{}] {}", kind.tag(), strip_bold(value.trim()))
}

fn section_block(kind: SectionKind, lines: Vec<String>) -> Vec<String> {
    if lines.is_empty() {
        return lines;
    }
    let mut block = Vec::with_capacity(lines.len() + 1);
    block.push(format!("[{}]", kind.tag()));
    block.extend(lines);
    block
}

fn plain_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(strip_bold)
        .collect()
}

/// Fields are flattened to one line so the entry cannot split on re-read.
fn entry_line(fields: &[&String]) -> String {
    fields
        .iter()
        .map(|f| strip_bold(&f.split_whitespace().collect::<Vec<_>>().join(" ")))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
        .trim()
        .to_string()
}

fn bullet_lines(bullets: &[String]) -> Vec<String> {
    bullets
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .map(|b| format!("- {}", strip_bold(b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_layout() {
        let sections = CvSections {
            name: "Jeanne Martin".into(),
            title: "Ingénieure".into(),
            profile: vec!["**Dix ans** d'expérience & plus".into()],
            skills: vec![
                SkillLine {
                    category: "Langages".into(),
                    items: "Rust, C#".into(),
                },
                SkillLine {
                    category: String::new(),
                    items: "Docker".into(),
                },
            ],
            experience: vec![ExperienceEntry {
                dates: "2020-2022".into(),
                title: "Dev".into(),
                company: "Acme".into(),
                location: "Paris".into(),
                description: "Équipe plateforme".into(),
                bullets: vec!["Livré **X**".into()],
            }],
            ..Default::default()
        };

        let expected = "\
[NAME] Jeanne Martin
[TITLE] Ingénieure

[PROFILE]
Dix ans d'expérience & plus

[SKILLS]
Langages: Rust, C#
Docker

[EXPERIENCE]
2020-2022 | Dev | Acme | Paris
Équipe plateforme
- Livré X";
        assert_eq!(build_plain_text(&sections), expected);
    }

    #[test]
    fn test_empty_fields_keep_their_positions() {
        let lines = education_lines(&EducationEntry {
            dates: "2018".into(),
            school: "INSA".into(),
            ..Default::default()
        });
        assert_eq!(lines, vec!["2018 |  | INSA |".to_string()]);
    }

    #[test]
    fn test_multiline_field_stays_on_entry_line() {
        let lines = experience_lines(&ExperienceEntry {
            dates: "2021".into(),
            title: "Lead\nDev".into(),
            company: "Acme".into(),
            ..Default::default()
        });
        assert_eq!(lines, vec!["2021 | Lead Dev | Acme |".to_string()]);
    }

    #[test]
    fn test_empty_sections_produce_empty_text() {
        assert_eq!(build_plain_text(&CvSections::default()), "");
    }
}
