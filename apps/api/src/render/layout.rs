//! Layout renderer: draws the CV directly with `printpdf` built-in fonts.
//! Needs no external binary, so it is the usual fallback behind `latex`.
//!
//! Line breaking uses an average glyph width rather than real font metrics.
//! Good enough for a one-column CV; long unbroken tokens may overrun the margin.

use async_trait::async_trait;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};

use crate::cv::escape::strip_bold;
use crate::cv::plain::FIELD_SEPARATOR;
use crate::cv::sections::{EducationEntry, ExperienceEntry, SectionKind};
use crate::cv::{CvSections, Language};
use crate::render::{RenderError, Renderer};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const BULLET_INDENT_MM: f32 = 5.0;

const NAME_SIZE: f32 = 22.0;
const TITLE_SIZE: f32 = 13.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;

/// Average Helvetica glyph width in em.
const AVG_GLYPH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.35;

pub struct LayoutRenderer {
    language: Language,
}

impl LayoutRenderer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

#[async_trait]
impl Renderer for LayoutRenderer {
    fn name(&self) -> &'static str {
        "layout"
    }

    async fn render(&self, sections: &CvSections) -> Result<Vec<u8>, RenderError> {
        let sections = sections.clone();
        let language = self.language;
        tokio::task::spawn_blocking(move || draw_document(&sections, language))
            .await
            .map_err(|e| RenderError::Failed(format!("layout task failed: {e}")))?
    }
}

fn pdf_error(e: printpdf::Error) -> RenderError {
    RenderError::Failed(e.to_string())
}

/// Top-down text cursor that adds pages as it runs out of room.
struct Cursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Cursor {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    fn line_height(size: f32) -> f32 {
        size * PT_TO_MM * LINE_SPACING
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height >= MARGIN_MM {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    fn write(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        let width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent;
        for line in wrap(text, max_chars(width, size)) {
            let height = Self::line_height(size);
            self.ensure_room(height);
            self.y -= height;
            let font = if bold { &self.bold } else { &self.regular };
            self.layer
                .use_text(line, size, Mm(MARGIN_MM + indent), Mm(self.y), font);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn heading(&mut self, text: &str) {
        self.gap(4.0);
        // Keep a heading on the same page as at least one body line.
        self.ensure_room(Self::line_height(HEADING_SIZE) + Self::line_height(BODY_SIZE));
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.16, 0.31, 0.62, None)));
        self.write(text, HEADING_SIZE, true, 0.0);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.gap(1.0);
    }

    fn bullets(&mut self, bullets: &[String]) {
        for bullet in bullets {
            self.write(&format!("- {}", strip_bold(bullet)), BODY_SIZE, false, BULLET_INDENT_MM);
        }
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

fn max_chars(width_mm: f32, size: f32) -> usize {
    let glyph_mm = size * PT_TO_MM * AVG_GLYPH_EM;
    ((width_mm / glyph_mm).floor() as usize).max(10)
}

/// Greedy word wrap on character count.
fn wrap(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn joined(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| strip_bold(f.trim()))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

fn draw_experience(cursor: &mut Cursor, entry: &ExperienceEntry) {
    cursor.write(
        &joined(&[&entry.title, &entry.company, &entry.location]),
        BODY_SIZE,
        true,
        0.0,
    );
    if !entry.dates.trim().is_empty() {
        cursor.write(&strip_bold(&entry.dates), BODY_SIZE, false, 0.0);
    }
    for line in entry.description.lines().filter(|l| !l.trim().is_empty()) {
        cursor.write(&strip_bold(line), BODY_SIZE, false, 0.0);
    }
    cursor.bullets(&entry.bullets);
    cursor.gap(2.0);
}

fn draw_education(cursor: &mut Cursor, entry: &EducationEntry) {
    cursor.write(&joined(&[&entry.degree, &entry.school]), BODY_SIZE, true, 0.0);
    let sub = joined(&[&entry.dates, &entry.details]);
    if !sub.is_empty() {
        cursor.write(&sub, BODY_SIZE, false, 0.0);
    }
    cursor.bullets(&entry.bullets);
    cursor.gap(2.0);
}

fn draw_document(sections: &CvSections, language: Language) -> Result<Vec<u8>, RenderError> {
    let name = strip_bold(sections.name.trim());
    let mut cursor = Cursor::new(if name.is_empty() { "CV" } else { name.as_str() })?;

    if !name.is_empty() {
        cursor.write(&name, NAME_SIZE, true, 0.0);
    }
    if !sections.title.trim().is_empty() {
        cursor.write(&strip_bold(&sections.title), TITLE_SIZE, false, 0.0);
    }
    if !sections.contact.is_empty() {
        let contact: Vec<&str> = sections.contact.iter().map(String::as_str).collect();
        cursor.write(&joined(&contact), BODY_SIZE, false, 0.0);
    }

    if !sections.profile.is_empty() {
        cursor.heading(SectionKind::Profile.heading(language));
        for line in &sections.profile {
            cursor.write(&strip_bold(line), BODY_SIZE, false, 0.0);
        }
    }

    if !sections.skills.is_empty() {
        cursor.heading(SectionKind::Skills.heading(language));
        for skill in &sections.skills {
            let line = if skill.category.trim().is_empty() {
                strip_bold(&skill.items)
            } else {
                format!("{}: {}", strip_bold(&skill.category), strip_bold(&skill.items))
            };
            cursor.write(&line, BODY_SIZE, false, 0.0);
        }
    }

    if !sections.experience.is_empty() {
        cursor.heading(SectionKind::Experience.heading(language));
        for entry in &sections.experience {
            draw_experience(&mut cursor, entry);
        }
    }

    if !sections.education.is_empty() {
        cursor.heading(SectionKind::Education.heading(language));
        for entry in &sections.education {
            draw_education(&mut cursor, entry);
        }
    }

    if !sections.interests.is_empty() {
        cursor.heading(SectionKind::Interests.heading(language));
        for line in &sections.interests {
            cursor.write(&strip_bold(line), BODY_SIZE, false, 0.0);
        }
    }

    tracing::debug!("Layout renderer drew {} page(s)", cursor.pages);
    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::sections::SkillLine;

    fn sample() -> CvSections {
        CvSections {
            name: "Jeanne Martin".to_string(),
            title: "Ingénieure **Rust**".to_string(),
            contact: vec!["j@m.fr".to_string(), "+33 6 00 00 00 00".to_string()],
            profile: vec!["Dix ans de backend.".to_string()],
            skills: vec![SkillLine {
                category: "Langages".to_string(),
                items: "Rust, Go".to_string(),
            }],
            experience: vec![ExperienceEntry {
                dates: "2020 -- 2024".to_string(),
                title: "Dev".to_string(),
                company: "Acme".to_string(),
                bullets: vec!["Migration vers Rust".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("un deux trois quatre cinq six", 10);
        assert_eq!(lines, vec!["un deux", "trois", "quatre", "cinq six"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_wrap_keeps_long_word_whole() {
        assert_eq!(wrap("a supercalifragilistic b", 5), vec!["a", "supercalifragilistic", "b"]);
    }

    #[tokio::test]
    async fn test_renders_a_pdf() {
        let bytes = LayoutRenderer::new(Language::Fr)
            .render(&sample())
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_long_cv_paginates() {
        let mut sections = sample();
        sections.profile = (0..200).map(|i| format!("Ligne de profil {i}")).collect();
        let mut cursor = Cursor::new("t").unwrap();
        for line in &sections.profile {
            cursor.write(line, BODY_SIZE, false, 0.0);
        }
        assert!(cursor.pages > 1);
    }
}
