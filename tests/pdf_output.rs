use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use markdown_pdf::core::DocumentRenderer;
use markdown_pdf::domain::model::{PageSetup, PageSize};
use markdown_pdf::MarkdownRenderer;

fn shown_text(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let raw = doc.get_page_content(page_id).unwrap();
    Content::decode(&raw)
        .unwrap()
        .operations
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

fn media_box(doc: &Document) -> Vec<f32> {
    let pages_id = doc
        .catalog()
        .unwrap()
        .get(b"Pages")
        .unwrap()
        .as_reference()
        .unwrap();
    doc.get_dictionary(pages_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect()
}

#[test]
fn test_short_document_is_one_page_with_footer() {
    let pdf = MarkdownRenderer::default()
        .render_pdf("# Hello\n\nA short paragraph.\n", "hello")
        .unwrap();
    assert_eq!(pdf.pages, 1);

    let doc = Document::load_mem(&pdf.bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);

    let text = shown_text(&doc, pages[&1]);
    assert!(text.iter().any(|t| t == "Hello"));
    assert_eq!(text.last().map(String::as_str), Some("1 / 1"));
}

#[test]
fn test_long_document_paginates() {
    let mut markdown = String::from("# Long\n\n");
    for i in 0..120 {
        markdown.push_str(&format!(
            "Paragraph {} with enough words to fill a line or two of the page body.\n\n",
            i
        ));
    }

    let pdf = MarkdownRenderer::default().render_pdf(&markdown, "long").unwrap();
    assert!(pdf.pages > 1);

    let doc = Document::load_mem(&pdf.bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), pdf.pages);
    for (number, id) in &pages {
        let text = shown_text(&doc, *id);
        let footer = format!("{} / {}", number, pdf.pages);
        assert_eq!(text.last(), Some(&footer));
    }
}

#[test]
fn test_letter_page_size() {
    let renderer = MarkdownRenderer::new(PageSetup::new(PageSize::Letter));
    let pdf = renderer.render_pdf("text", "letter").unwrap();
    let doc = Document::load_mem(&pdf.bytes).unwrap();
    assert_eq!(media_box(&doc), vec![0.0, 0.0, 612.0, 792.0]);
}

#[test]
fn test_rich_document_renders() {
    let markdown = r#"# Features

Some **bold**, *italic*, ~~struck~~ and `code` text with https://example.com.

> A quote
> over two lines.

1. first
2. second
   - nested

- [x] done
- [ ] open

| Name | Qty |
|------|----:|
| pen  |   2 |
| ink  |  10 |

```python
def greet(name):
    return f"hi {name}"
```

Term
: Definition

---
"#;
    let pdf = MarkdownRenderer::default().render_pdf(markdown, "features").unwrap();
    let doc = Document::load_mem(&pdf.bytes).unwrap();
    let all: Vec<String> = doc
        .get_pages()
        .values()
        .flat_map(|id| shown_text(&doc, *id))
        .collect();
    let joined = all.join(" ");

    assert!(joined.contains("Features"));
    assert!(joined.contains("greet"));
    assert!(joined.contains("pen"));
    assert!(joined.contains("Definition"));
}

fn on_blocking_sized_stack<T: Send + 'static>(job: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(job)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn test_deeply_nested_quotes_render() {
    let (pdf, html) = on_blocking_sized_stack(|| {
        let renderer = MarkdownRenderer::default();
        let markdown = format!("{}x", ">".repeat(50_000));
        (
            renderer.render_pdf(&markdown, "quotes"),
            renderer.render_html(&markdown),
        )
    });

    let pdf = pdf.unwrap();
    assert_eq!(pdf.pages, 1);
    assert!(pdf.bytes.starts_with(b"%PDF-"));
    assert!(html.unwrap().contains("<blockquote>"));
}

#[test]
fn test_deeply_nested_lists_render() {
    let pdf = on_blocking_sized_stack(|| {
        MarkdownRenderer::default().render_pdf(&format!("{}x", "- ".repeat(10_000)), "lists")
    })
    .unwrap();

    let doc = Document::load_mem(&pdf.bytes).unwrap();
    let all: Vec<String> = doc
        .get_pages()
        .values()
        .flat_map(|id| shown_text(&doc, *id))
        .collect();
    assert!(all.iter().any(|text| text == "x"));
}
