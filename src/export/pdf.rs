//! PDF encoding of laid-out documents.
//!
//! Uses the standard Type 1 Helvetica fonts, which every PDF reader ships, so
//! no font files are embedded. Text is encoded as WinAnsi.

use super::layout::{ExportDocument, PageLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::ExportError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const MM_TO_PT: f32 = 72.0 / 25.4;
const MUTED_GRAY: f32 = 120.0 / 255.0;
const TEXT_GRAY: f32 = 20.0 / 255.0;

/// Renders `document` to PDF bytes.
pub fn render(document: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let page_id = add_page(&mut doc, pages_id, page)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(PAGE_WIDTH_MM * MM_TO_PT),
            Object::Real(PAGE_HEIGHT_MM * MM_TO_PT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi(&document.title)),
        "Producer" => Object::string_literal("medlit"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Render(e.to_string()))?;
    Ok(bytes)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, page: &PageLayout) -> Result<ObjectId, ExportError> {
    let mut operations = Vec::with_capacity(page.lines.len() * 6);

    for line in &page.lines {
        let font = if line.bold { "F2" } else { "F1" };
        let gray = if line.muted { MUTED_GRAY } else { TEXT_GRAY };
        let x = line.x * MM_TO_PT;
        let y = (PAGE_HEIGHT_MM - line.y) * MM_TO_PT;

        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("g", vec![Object::Real(gray)]));
        operations.push(Operation::new("Tf", vec![font.into(), Object::Real(line.size)]));
        operations.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ExportError::Render(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

/// Encodes `text` as WinAnsi (CP-1252). Unmappable characters become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}
