//! Page layout for exported summaries.
//!
//! Coordinates are in millimetres from the top-left corner of an A4 page;
//! `y` is the text baseline. Widths are estimated from per-glyph Helvetica
//! approximations, which is close enough for wrapping prose.

use super::{sanitize, ExportPaper};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 14.0;
pub const TOP_MM: f32 = 18.0;

/// Maximum key findings rendered.
pub const MAX_KEY_FINDINGS: usize = 10;

/// Characters of abstract rendered by the fallback section.
pub const ABSTRACT_FALLBACK_CHARS: usize = 1200;

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const CHROME_SIZE: f32 = 9.0;
const TITLE_LINE_MM: f32 = 7.0;
const BODY_LINE_MM: f32 = 6.0;
const HEADER_Y_MM: f32 = 10.0;
const FOOTER_OFFSET_MM: f32 = 10.0;
const PT_TO_MM: f32 = 25.4 / 72.0;

const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - MARGIN_MM * 2.0;
const BOTTOM_LIMIT_MM: f32 = PAGE_HEIGHT_MM - MARGIN_MM;

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub bold: bool,
    /// Header and footer text, drawn in grey.
    pub muted: bool,
    pub text: String,
}

/// Lines placed on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<TextLine>,
}

impl PageLayout {
    /// Text of all lines, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// A laid-out document, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub title: String,
    pub pages: Vec<PageLayout>,
}

impl ExportDocument {
    /// Lays out `paper`, stamping `generated_at` into every page header.
    pub fn layout(paper: &ExportPaper, generated_at: &str) -> Self {
        let mut title = sanitize(&paper.title);
        if title.is_empty() {
            title = "Untitled".to_string();
        }

        let mut writer = PageWriter::new();

        writer.block(&title, TITLE_SIZE, true, TITLE_LINE_MM);
        writer.advance(1.0);

        let meta = metadata_line(paper);
        if !meta.is_empty() {
            writer.block(&meta, BODY_SIZE, false, BODY_LINE_MM);
            writer.advance(1.0);
        }

        let authors = sanitize(paper.authors.as_deref().unwrap_or(""));
        if !authors.is_empty() {
            writer.block(&authors, BODY_SIZE, false, BODY_LINE_MM);
            writer.advance(2.0);
        }

        let findings: Vec<String> = paper
            .key_findings
            .iter()
            .map(|f| sanitize(f))
            .filter(|f| !f.is_empty())
            .take(MAX_KEY_FINDINGS)
            .collect();

        if !findings.is_empty() {
            writer.heading("Key Findings");
            for finding in &findings {
                writer.block(&format!("• {}", finding), BODY_SIZE, false, BODY_LINE_MM);
            }
            writer.advance(2.0);
        }

        let methodology = sanitize(paper.methodology.as_deref().unwrap_or(""));
        if !methodology.is_empty() {
            writer.section("Methodology", &methodology);
        }

        let conclusion = sanitize(paper.conclusion.as_deref().unwrap_or(""));
        if !conclusion.is_empty() {
            writer.section("Conclusion", &conclusion);
        }

        if findings.is_empty() && methodology.is_empty() && conclusion.is_empty() {
            let raw: String = paper
                .abstract_text
                .as_deref()
                .unwrap_or("")
                .chars()
                .take(ABSTRACT_FALLBACK_CHARS)
                .collect();
            let abstract_text = sanitize(&raw);
            if !abstract_text.is_empty() {
                writer.section("Abstract", &abstract_text);
            }
        }

        let mut pages = writer.finish();
        add_header_footer(&mut pages, generated_at);

        Self { title, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Non-empty journal, date and `PMID: id`, joined with ` • `.
fn metadata_line(paper: &ExportPaper) -> String {
    let mut parts = Vec::new();
    for part in [&paper.journal, &paper.date] {
        let clean = sanitize(part.as_deref().unwrap_or(""));
        if !clean.is_empty() {
            parts.push(clean);
        }
    }
    let pmid = sanitize(paper.pmid.as_deref().unwrap_or(""));
    if !pmid.is_empty() {
        parts.push(format!("PMID: {}", pmid));
    }
    parts.join(" • ")
}

fn add_header_footer(pages: &mut [PageLayout], generated_at: &str) {
    let total = pages.len();
    let header = format!("MedLit AI – Research Summary  |  {}", generated_at);

    for (i, page) in pages.iter_mut().enumerate() {
        page.lines.push(TextLine {
            x: MARGIN_MM,
            y: HEADER_Y_MM,
            size: CHROME_SIZE,
            bold: false,
            muted: true,
            text: header.clone(),
        });

        let label = format!("Page {} of {}", i + 1, total);
        page.lines.push(TextLine {
            x: PAGE_WIDTH_MM - MARGIN_MM - text_width_mm(&label, CHROME_SIZE),
            y: PAGE_HEIGHT_MM - FOOTER_OFFSET_MM,
            size: CHROME_SIZE,
            bold: false,
            muted: true,
            text: label,
        });
    }
}

/// Flows text down pages, breaking when a block would pass the bottom margin.
struct PageWriter {
    pages: Vec<PageLayout>,
    current: PageLayout,
    cursor: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: PageLayout::default(),
            cursor: TOP_MM,
        }
    }

    fn new_page(&mut self) {
        let full = std::mem::take(&mut self.current);
        self.pages.push(full);
        self.cursor = TOP_MM;
    }

    fn advance(&mut self, mm: f32) {
        self.cursor += mm;
    }

    fn heading(&mut self, label: &str) {
        // Keep a heading together with at least one line of its body
        if self.cursor + BODY_LINE_MM * 2.0 > BOTTOM_LIMIT_MM {
            self.new_page();
        }
        self.push_line(label, BODY_SIZE, true);
        self.cursor += BODY_LINE_MM;
    }

    fn section(&mut self, label: &str, body: &str) {
        self.heading(label);
        self.block(body, BODY_SIZE, false, BODY_LINE_MM);
        self.advance(2.0);
    }

    /// Places wrapped `text`. A block that fits on a fresh page is moved
    /// there whole; taller blocks flow line by line.
    fn block(&mut self, text: &str, size: f32, bold: bool, line_height: f32) {
        let lines = wrap_text(text, size, CONTENT_WIDTH_MM);
        let height = lines.len() as f32 * line_height;
        let usable = BOTTOM_LIMIT_MM - TOP_MM;

        if self.cursor + height > BOTTOM_LIMIT_MM && height <= usable && self.cursor > TOP_MM {
            self.new_page();
        }

        for line in lines {
            if self.cursor + line_height > BOTTOM_LIMIT_MM && self.cursor > TOP_MM {
                self.new_page();
            }
            self.push_line(&line, size, bold);
            self.cursor += line_height;
        }
    }

    fn push_line(&mut self, text: &str, size: f32, bold: bool) {
        self.current.lines.push(TextLine {
            x: MARGIN_MM,
            y: self.cursor,
            size,
            bold,
            muted: false,
            text: text.to_string(),
        });
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Approximate Helvetica advance width of `c`, in em.
fn glyph_em(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.24,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '/' => 0.32,
        'm' | 'w' | 'M' | 'W' | '%' | '@' => 0.86,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.56,
        _ => 0.52,
    }
}

/// Estimated width of `text` at `size` points, in millimetres.
pub fn text_width_mm(text: &str, size: f32) -> f32 {
    text.chars().map(glyph_em).sum::<f32>() * size * PT_TO_MM
}

/// Greedy word wrap to `max_width` millimetres. Words wider than a line are
/// split by character.
pub fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if text_width_mm(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width_mm(word, size) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                current.push(c);
                if text_width_mm(&current, size) > max_width {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
