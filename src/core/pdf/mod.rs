//! PDF serialization of laid-out pages.

pub mod fonts;

use crate::core::layout::{DrawOp, Page};
use crate::core::styles::Rgb;
use crate::domain::model::PageSetup;
use crate::utils::error::{AppError, Result};
use chrono::Utc;
use fonts::{encode_win_ansi, Font};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

pub const PRODUCER: &str = "markdown-pdf";

fn real(value: f32) -> Object {
    Object::Real((value * 100.0).round() / 100.0)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// PDF text string: literal when ASCII, UTF-16BE with a byte order mark
/// otherwise.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xfe, 0xff];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn fill_color(color: Rgb) -> Operation {
    let [r, g, b] = color.components();
    Operation::new("rg", vec![real(r), real(g), real(b)])
}

fn stroke_color(color: Rgb) -> Operation {
    let [r, g, b] = color.components();
    Operation::new("RG", vec![real(r), real(g), real(b)])
}

/// Translates top-down drawing ops into content stream operators.
fn page_operations(page: &Page, page_height: f32) -> Vec<Operation> {
    let flip = |y: f32| page_height - y;
    let mut ops = Vec::with_capacity(page.ops.len() * 4);

    for op in &page.ops {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                ops.push(fill_color(*color));
                ops.push(Operation::new(
                    "re",
                    vec![real(*x), real(flip(y + height)), real(*width), real(*height)],
                ));
                ops.push(Operation::new("f", vec![]));
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
                color,
            } => {
                ops.push(stroke_color(*color));
                ops.push(Operation::new("w", vec![real(*line_width)]));
                ops.push(Operation::new(
                    "re",
                    vec![real(*x), real(flip(y + height)), real(*width), real(*height)],
                ));
                ops.push(Operation::new("S", vec![]));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                line_width,
                color,
            } => {
                ops.push(stroke_color(*color));
                ops.push(Operation::new("w", vec![real(*line_width)]));
                ops.push(Operation::new("m", vec![real(*x1), real(flip(*y1))]));
                ops.push(Operation::new("l", vec![real(*x2), real(flip(*y2))]));
                ops.push(Operation::new("S", vec![]));
            }
            DrawOp::Text {
                x,
                baseline,
                font,
                size,
                color,
                text,
            } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![name(font.resource_name()), real(*size)],
                ));
                ops.push(fill_color(*color));
                ops.push(Operation::new("Td", vec![real(*x), real(flip(*baseline))]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }

    ops
}

fn font_resources(doc: &mut Document) -> Dictionary {
    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let mut dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
        };
        if font.uses_win_ansi() {
            dict.set("Encoding", "WinAnsiEncoding");
        }
        let id = doc.add_object(dict);
        fonts.set(font.resource_name(), id);
    }
    fonts
}

/// Serializes `pages` into a PDF document. An empty page list still yields
/// a single blank page.
pub fn write_pdf(pages: &[Page], setup: &PageSetup, title: &str) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let fonts = font_resources(&mut doc);
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });
    let media_box = vec![real(0.0), real(0.0), real(setup.width), real(setup.height)];

    let blank = [Page::default()];
    let pages = if pages.is_empty() { &blank[..] } else { pages };

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, setup.height),
        };
        let encoded = content
            .encode()
            .map_err(|e| AppError::render(format!("failed to encode page content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(title),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::render(format!("failed to write PDF: {}", e)))?;

    debug!("Wrote PDF: {} pages, {} bytes", count, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::styles::Theme;

    fn sample_page(text: &str) -> Page {
        Page {
            ops: vec![
                DrawOp::FillRect {
                    x: 10.0,
                    y: 20.0,
                    width: 100.0,
                    height: 30.0,
                    color: Theme::default().code_background,
                },
                DrawOp::Text {
                    x: 72.0,
                    baseline: 100.0,
                    font: Font::Regular,
                    size: 12.0,
                    color: Rgb(0, 0, 0),
                    text: text.to_string(),
                },
            ],
        }
    }

    fn tj_strings(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
        let raw = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&raw).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_write_and_reload() {
        let pages = vec![sample_page("Hello (world)"), sample_page("Second")];
        let bytes = write_pdf(&pages, &PageSetup::default(), "Report").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let page_ids = doc.get_pages();
        assert_eq!(page_ids.len(), 2);

        let first = page_ids[&1];
        assert_eq!(tj_strings(&doc, first), vec![b"Hello (world)".to_vec()]);
    }

    #[test]
    fn test_info_dictionary() {
        let bytes = write_pdf(&[sample_page("x")], &PageSetup::default(), "Notes").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Notes");
        assert_eq!(info.get(b"Producer").unwrap().as_str().unwrap(), b"markdown-pdf");
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let bytes = write_pdf(&[], &PageSetup::default(), "empty").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let ops = page_operations(&sample_page("t"), 800.0);
        let rect = ops.iter().find(|op| op.operator == "re").unwrap();
        // top-down y=20 height=30 → bottom-up y=750
        assert_eq!(rect.operands[1].as_float().unwrap(), 750.0);
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        assert_eq!(td.operands[1].as_float().unwrap(), 700.0);
    }

    #[test]
    fn test_text_string_encoding() {
        match text_string("plain") {
            Object::String(bytes, StringFormat::Literal) => assert_eq!(bytes, b"plain".to_vec()),
            other => panic!("unexpected {:?}", other),
        }
        match text_string("é") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xfe, 0xff, 0x00, 0xe9]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
