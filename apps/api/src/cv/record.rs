//! Structured-record path: builds `CvSections` from a normalized JSON object.
//!
//! Every field is optional. Wrong shapes degrade to empty values instead of
//! failing: a string where a list was expected becomes its lines, a list where
//! a string was expected is joined, scalars are stringified.
//!
//! Entries are stored in the shape the tagged-text path reads back from the
//! plain-text projection: positional fields on one line without `|`, education
//! details joined with `"; "`, marker-led text lines moved into `bullets`.

use serde_json::{Map, Value};

use crate::cv::compose::ComposeError;
use crate::cv::plain::FIELD_SEPARATOR;
use crate::cv::sections::{CvSections, EducationEntry, ExperienceEntry, SkillLine};
use crate::cv::tagged::strip_bullet;

/// Top-level keys that mark a record as a CV.
const CV_KEYS: &[&str] = &[
    "personal",
    "name",
    "title",
    "profile",
    "skills",
    "experience",
    "experiences",
    "education",
    "interests",
];

impl CvSections {
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, ComposeError> {
        if !CV_KEYS.iter().any(|key| record.contains_key(*key)) {
            return Err(ComposeError::NoSections);
        }

        let personal = record.get("personal").and_then(Value::as_object);
        let personal_field = |key: &str| {
            personal
                .and_then(|p| p.get(key))
                .or_else(|| record.get(key))
                .map(text)
                .unwrap_or_default()
        };

        let contact = ["address", "email", "phone", "linkedin", "website"]
            .iter()
            .map(|key| personal_field(*key))
            .filter(|v| !v.trim().is_empty())
            .collect();

        let experience = first_of(record, &["experience", "experiences"])
            .map(|v| items(v).map(experience_entry).collect())
            .unwrap_or_default();

        Ok(CvSections {
            name: personal_field("name"),
            title: personal_field("title"),
            contact,
            profile: record.get("profile").map(lines).unwrap_or_default(),
            skills: record.get("skills").map(skill_lines).unwrap_or_default(),
            experience,
            education: record
                .get("education")
                .map(|v| items(v).map(education_entry).collect())
                .unwrap_or_default(),
            interests: record.get("interests").map(lines).unwrap_or_default(),
        })
    }
}

fn first_of<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(*key))
}

/// A single value as display text.
fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(values) => values
            .iter()
            .map(text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .values()
            .map(text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// A value as a list of non-empty lines.
fn lines(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values
            .iter()
            .flat_map(lines)
            .collect(),
        other => text(other)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
    }
}

/// Elements of a list; a lone object counts as a one-element list.
fn items(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(values) => Box::new(values.iter()),
        Value::Null => Box::new(std::iter::empty()),
        other => Box::new(std::iter::once(other)),
    }
}

fn field(value: &Value, key: &str) -> String {
    value.get(key).map(text).unwrap_or_default()
}

fn skill_lines(value: &Value) -> Vec<SkillLine> {
    match value {
        // {"Langages": ["Rust", "Go"], "Outils": "Docker"}
        Value::Object(map) if !map.contains_key("category") && !map.contains_key("items") => map
            .iter()
            .map(|(category, items)| SkillLine {
                category: category.trim().to_string(),
                items: text(items),
            })
            .collect(),
        other => items(other)
            .filter_map(|item| {
                let line = match item {
                    Value::Object(_) if field(item, "category").is_empty() => {
                        skill_from_text(&field(item, "items"))
                    }
                    Value::Object(_) => SkillLine {
                        category: field(item, "category"),
                        items: field(item, "items"),
                    },
                    scalar => skill_from_text(&text(scalar)),
                };
                (!line.category.is_empty() || !line.items.is_empty()).then_some(line)
            })
            .collect(),
    }
}

/// Same reading as a skills line in tagged text.
fn skill_from_text(line: &str) -> SkillLine {
    SkillLine::parse(strip_bullet(line).unwrap_or(line))
}

/// A positional entry field: one line, no field separator.
fn entry_field(value: &Value, key: &str) -> String {
    one_line(&field(value, key))
}

fn one_line(text: &str) -> String {
    text.replace(FIELD_SEPARATOR.trim(), "/")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits free text into plain lines and marker-led bullet lines.
fn text_and_bullets(value: Option<&Value>) -> (Vec<String>, Vec<String>) {
    let mut plain = Vec::new();
    let mut bullets = Vec::new();
    for line in value.map(lines).unwrap_or_default() {
        match strip_bullet(&line) {
            Some(bullet) => bullets.push(bullet.to_string()),
            None => plain.push(one_line(&line)),
        }
    }
    (plain, bullets)
}

fn listed_bullets(item: &Value) -> Vec<String> {
    item.get("bullets").map(lines).unwrap_or_default()
}

fn experience_entry(item: &Value) -> ExperienceEntry {
    if !item.is_object() {
        return ExperienceEntry {
            title: one_line(&text(item)),
            ..Default::default()
        };
    }
    let (description, mut bullets) = text_and_bullets(item.get("description"));
    bullets.extend(listed_bullets(item));
    ExperienceEntry {
        dates: entry_field(item, "dates"),
        title: entry_field(item, "title"),
        company: entry_field(item, "company"),
        location: entry_field(item, "location"),
        description: description.join("\n"),
        bullets,
    }
}

fn education_entry(item: &Value) -> EducationEntry {
    if !item.is_object() {
        return EducationEntry {
            degree: one_line(&text(item)),
            ..Default::default()
        };
    }
    let (details, mut bullets) = text_and_bullets(item.get("details"));
    bullets.extend(listed_bullets(item));
    EducationEntry {
        dates: entry_field(item, "dates"),
        degree: entry_field(item, "degree"),
        school: entry_field(item, "school"),
        details: details.join("; "),
        bullets,
    }
}
