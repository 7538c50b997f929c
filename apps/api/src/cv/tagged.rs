//! Tagged-text path: builds `CvSections` from a flat, loosely labelled text blob.
//!
//! A line switches section when it is
//! - a bracketed tag, `[EXPERIENCE]` (text after `]` is the section's first line),
//! - a markdown heading, `## Formation`,
//! - a bare upper-case line of at most `MAX_BARE_HEADER_CHARS`, `COMPÉTENCES :`,
//!
//! and its label resolves through the `SectionKind` synonym table. Lines before
//! the first header are dropped, blank lines are skipped.

use crate::cv::plain::FIELD_SEPARATOR;
use crate::cv::sections::{
    fold_label, CvSections, EducationEntry, ExperienceEntry, SectionKind, SkillLine,
};

const MAX_BARE_HEADER_CHARS: usize = 40;
const BULLET_MARKERS: &[char] = &['-', '•', '*'];

/// Entry currently being filled inside the experience or education section.
enum OpenEntry {
    Experience(ExperienceEntry),
    Education(EducationEntry),
}

struct Parser {
    sections: CvSections,
    active: Option<SectionKind>,
    open: Option<OpenEntry>,
}

pub fn parse_tagged_text(text: &str) -> CvSections {
    let mut parser = Parser {
        sections: CvSections::default(),
        active: None,
        open: None,
    };

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match detect_header(line) {
            Some((kind, inline)) => {
                parser.flush();
                parser.active = Some(kind);
                if let Some(first) = inline {
                    parser.content(first);
                }
            }
            None => parser.content(line),
        }
    }

    parser.flush();
    parser.sections
}

impl Parser {
    fn content(&mut self, line: &str) {
        let Some(kind) = self.active else {
            return;
        };
        match kind {
            kind if kind.is_singular() => {
                let slot = if kind == SectionKind::Name {
                    &mut self.sections.name
                } else {
                    &mut self.sections.title
                };
                if slot.is_empty() {
                    *slot = line.to_string();
                }
                // Singular slots take one line; what follows belongs to no section.
                self.active = None;
            }
            SectionKind::Contact => self.sections.contact.push(line.to_string()),
            SectionKind::Profile => self.sections.profile.push(line.to_string()),
            SectionKind::Interests => self.sections.interests.push(line.to_string()),
            SectionKind::Skills => {
                let item = strip_bullet(line).unwrap_or(line);
                self.sections.skills.push(SkillLine::parse(item));
            }
            SectionKind::Experience | SectionKind::Education => self.entry_line(kind, line),
            SectionKind::Name | SectionKind::Title => {}
        }
    }

    fn entry_line(&mut self, kind: SectionKind, line: &str) {
        if let Some(bullet) = strip_bullet(line) {
            self.open_entry(kind).push_bullet(bullet);
            return;
        }

        if line.contains(FIELD_SEPARATOR.trim()) {
            self.flush();
            let fields: Vec<String> = line
                .split(FIELD_SEPARATOR.trim())
                .map(|f| f.trim().to_string())
                .collect();
            let field = |i: usize| fields.get(i).cloned().unwrap_or_default();
            self.open = Some(match kind {
                SectionKind::Education => OpenEntry::Education(EducationEntry {
                    dates: field(0),
                    degree: field(1),
                    school: field(2),
                    details: field(3),
                    bullets: Vec::new(),
                }),
                _ => OpenEntry::Experience(ExperienceEntry {
                    dates: field(0),
                    title: field(1),
                    company: field(2),
                    location: field(3),
                    ..Default::default()
                }),
            });
            return;
        }

        match self.open.as_mut() {
            Some(entry) => entry.push_text(line),
            None => {
                self.open = Some(match kind {
                    SectionKind::Education => OpenEntry::Education(EducationEntry {
                        degree: line.to_string(),
                        ..Default::default()
                    }),
                    _ => OpenEntry::Experience(ExperienceEntry {
                        title: line.to_string(),
                        ..Default::default()
                    }),
                });
            }
        }
    }

    fn open_entry(&mut self, kind: SectionKind) -> &mut OpenEntry {
        self.open.get_or_insert_with(|| match kind {
            SectionKind::Education => OpenEntry::Education(EducationEntry::default()),
            _ => OpenEntry::Experience(ExperienceEntry::default()),
        })
    }

    fn flush(&mut self) {
        match self.open.take() {
            Some(OpenEntry::Experience(entry)) => self.sections.experience.push(entry),
            Some(OpenEntry::Education(entry)) => self.sections.education.push(entry),
            None => {}
        }
    }
}

impl OpenEntry {
    fn push_bullet(&mut self, bullet: &str) {
        match self {
            OpenEntry::Experience(e) => e.bullets.push(bullet.to_string()),
            OpenEntry::Education(e) => e.bullets.push(bullet.to_string()),
        }
    }

    fn push_text(&mut self, line: &str) {
        let target = match self {
            OpenEntry::Experience(e) => (&mut e.description, "\n"),
            OpenEntry::Education(e) => (&mut e.details, "; "),
        };
        let (field, joiner) = target;
        if !field.is_empty() {
            field.push_str(joiner);
        }
        field.push_str(line);
    }
}

/// Returns the section a header line opens and any text following a bracketed tag.
fn detect_header(line: &str) -> Option<(SectionKind, Option<&str>)> {
    if let Some(rest) = line.strip_prefix('[') {
        let (label, after) = rest.split_once(']')?;
        let kind = SectionKind::from_label(label)?;
        let after = after.trim();
        return Some((kind, (!after.is_empty()).then_some(after)));
    }

    if line.starts_with('#') {
        let label = line.trim_start_matches('#');
        return SectionKind::from_label(label).map(|kind| (kind, None));
    }

    if is_bare_header(line) {
        return SectionKind::from_label(line).map(|kind| (kind, None));
    }

    None
}

/// Upper-case once punctuation is stripped, and short.
fn is_bare_header(line: &str) -> bool {
    let folded = fold_label(line);
    if folded.is_empty() || folded.chars().count() > MAX_BARE_HEADER_CHARS {
        return false;
    }
    let mut letters = line.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(|c| !c.is_lowercase())
}

/// `- text`, `• text`, `* text` → `text`.
///
/// `-` and `•` may also touch the text (`-Shipped X`), except `-` before a
/// digit or another dash (`-5%`, `--`). `*` needs a space so `**bold**` stays text.
pub(crate) fn strip_bullet(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let marker = chars.next()?;
    if !BULLET_MARKERS.contains(&marker) {
        return None;
    }
    let rest = chars.as_str();
    let next = rest.chars().next()?;
    let accepted = next.is_whitespace()
        || match marker {
            '•' => true,
            '-' => !next.is_ascii_digit() && next != '-',
            _ => false,
        };
    let text = rest.trim();
    (accepted && !text.is_empty()).then_some(text)
}
