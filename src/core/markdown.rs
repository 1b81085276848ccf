//! Markdown front end: GFM-flavoured parsing into the block tree used by the
//! PDF engine, and into HTML for the browser preview.

use crate::core::highlight::Highlighter;
use crate::core::styles::preview_css;
use crate::domain::model::{
    Block, CellAlignment, DefinitionEntry, ListItem, Span, SpanStyle, MAX_NESTING,
};
use crate::utils::error::Result;
use pulldown_cmark::{
    html, Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag,
    TagEnd, TextMergeStream,
};
use regex::Regex;
use std::iter::Peekable;
use std::sync::LazyLock;

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("bare url pattern"));

static TASK_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<li>(\s*(?:<p>)?)<span class="task-checkbox"#).expect("task item pattern")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("html tag pattern"));

const URL_TRAILING: &[char] = &['.', ',', ':', ';', '!', '?', '"', '\'', ')', ']'];

pub fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_DEFINITION_LIST
}

fn events(source: &str) -> TextMergeStream<'_, Parser<'_>> {
    TextMergeStream::new(Parser::new_ext(source, options()))
}

/// Splits `text` into `(segment, is_url)` pairs on bare http(s) URLs.
pub fn split_bare_urls(text: &str) -> Vec<(&str, bool)> {
    let mut parts = Vec::new();
    let mut last = 0;

    for found in BARE_URL.find_iter(text) {
        let url = found.as_str().trim_end_matches(URL_TRAILING);
        if url.ends_with("://") {
            continue;
        }
        let start = found.start();
        if start > last {
            parts.push((&text[last..start], false));
        }
        parts.push((url, true));
        last = start + url.len();
    }

    if last < text.len() {
        parts.push((&text[last..], false));
    }
    parts
}

pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, " ").trim().to_string()
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn cell_alignment(alignment: Alignment) -> CellAlignment {
    match alignment {
        Alignment::Center => CellAlignment::Center,
        Alignment::Right => CellAlignment::Right,
        Alignment::Left | Alignment::None => CellAlignment::Left,
    }
}

fn fence_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => Highlighter::language_token(info),
        CodeBlockKind::Indented => None,
    }
}

fn is_inline(event: &Event<'_>) -> bool {
    match event {
        Event::Text(_)
        | Event::Code(_)
        | Event::SoftBreak
        | Event::HardBreak
        | Event::InlineHtml(_)
        | Event::FootnoteReference(_)
        | Event::TaskListMarker(_) => true,
        Event::Start(tag) => matches!(
            tag,
            Tag::Emphasis
                | Tag::Strong
                | Tag::Strikethrough
                | Tag::Link { .. }
                | Tag::Image { .. }
        ),
        _ => false,
    }
}

// ── block tree ────────────────────────────────────────────────────────────

/// Parses `source` into the block tree. Inline content that is not wrapped
/// in a paragraph (tight list items) becomes an implicit paragraph.
///
/// Containers nested deeper than [`MAX_NESTING`] are flattened into their
/// parent at that depth.
pub fn parse_blocks(source: &str) -> Vec<Block> {
    let mut parser = BlockParser {
        events: events(source).peekable(),
        task_marker: None,
        depth: 0,
    };
    parser.blocks()
}

struct BlockParser<'a, I: Iterator<Item = Event<'a>>> {
    events: Peekable<I>,
    task_marker: Option<bool>,
    depth: usize,
}

/// Block-level starts whose content is read by a nested `blocks()` call.
fn opens_container(event: &Event) -> bool {
    match event {
        Event::Start(tag) => !matches!(
            tag,
            Tag::Paragraph
                | Tag::Heading { .. }
                | Tag::CodeBlock(_)
                | Tag::HtmlBlock
                | Tag::Table(_)
        ),
        _ => false,
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> BlockParser<'a, I> {
    /// Reads blocks up to and including the enclosing `End`, or to the end
    /// of input at the top level.
    fn blocks(&mut self) -> Vec<Block> {
        self.depth += 1;
        let at_limit = self.depth >= MAX_NESTING;
        // 超過深度上限的容器不再展開，只記錄尚未關閉的層數
        let mut flattened = 0usize;
        let mut blocks = Vec::new();
        loop {
            match self.events.peek() {
                None => break,
                Some(Event::End(_)) => {
                    self.events.next();
                    if flattened == 0 {
                        break;
                    }
                    flattened -= 1;
                }
                Some(event) if is_inline(event) => {
                    let spans = self.inlines();
                    if !spans.is_empty() {
                        blocks.push(Block::Paragraph(spans));
                    }
                }
                Some(event) if at_limit && opens_container(event) => {
                    self.events.next();
                    flattened += 1;
                }
                Some(_) => {
                    if let Some(event) = self.events.next() {
                        self.block(event, &mut blocks);
                    }
                }
            }
        }
        self.depth -= 1;
        blocks
    }

    fn block(&mut self, event: Event<'a>, out: &mut Vec<Block>) {
        match event {
            Event::Start(Tag::Paragraph) => {
                let spans = self.inlines();
                self.skip_end();
                out.push(Block::Paragraph(spans));
            }
            Event::Start(Tag::Heading { level, .. }) => {
                let spans = self.inlines();
                self.skip_end();
                out.push(Block::Heading {
                    level: heading_level(level),
                    spans,
                });
            }
            Event::Start(Tag::BlockQuote(_)) => out.push(Block::Quote(self.blocks())),
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = fence_language(&kind);
                let code = self.raw_text();
                out.push(Block::CodeBlock { lang, code });
            }
            Event::Start(Tag::HtmlBlock) => {
                let text = strip_tags(&self.raw_text());
                if !text.is_empty() {
                    out.push(Block::Html(text));
                }
            }
            Event::Start(Tag::List(start)) => out.push(Block::List {
                start,
                items: self.list_items(),
            }),
            Event::Start(Tag::Table(alignments)) => out.push(self.table(alignments)),
            Event::Start(Tag::DefinitionList) => {
                out.push(Block::DefinitionList(self.definitions()))
            }
            // 其他容器（例如註腳定義）直接攤平成子區塊
            Event::Start(_) => {
                let children = self.blocks();
                out.extend(children);
            }
            Event::Rule => out.push(Block::Rule),
            Event::Html(html) => {
                let text = strip_tags(&html);
                if !text.is_empty() {
                    out.push(Block::Html(text));
                }
            }
            _ => {}
        }
    }

    fn skip_end(&mut self) {
        if matches!(self.events.peek(), Some(Event::End(_))) {
            self.events.next();
        }
    }

    fn raw_text(&mut self) -> String {
        let mut text = String::new();
        for event in self.events.by_ref() {
            match event {
                Event::Text(t) | Event::Html(t) => text.push_str(&t),
                Event::End(_) => break,
                _ => {}
            }
        }
        text
    }

    /// Collects inline content. Stops before the first event that closes the
    /// enclosing block or opens a new one.
    fn inlines(&mut self) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut styles = vec![SpanStyle::default()];

        loop {
            match self.events.peek() {
                None => break,
                Some(event) if styles.len() == 1 && !is_inline(event) => break,
                Some(_) => {}
            }
            let Some(event) = self.events.next() else {
                break;
            };
            let current = styles.last().cloned().unwrap_or_default();

            match event {
                Event::Start(tag) => {
                    let mut style = current;
                    match tag {
                        Tag::Emphasis => style.italic = true,
                        Tag::Strong => style.bold = true,
                        Tag::Strikethrough => style.strike = true,
                        Tag::Link { dest_url, .. } => style.link = Some(dest_url.to_string()),
                        Tag::Image { .. } => {
                            style.image = true;
                            spans.push(Span {
                                text: "[image: ".to_string(),
                                style: style.clone(),
                            });
                        }
                        _ => {}
                    }
                    styles.push(style);
                }
                Event::End(tag) => {
                    if tag == TagEnd::Image {
                        spans.push(Span {
                            text: "]".to_string(),
                            style: current,
                        });
                    }
                    styles.pop();
                }
                Event::Text(text) => push_text(&mut spans, &text, &current),
                Event::Code(code) => spans.push(Span {
                    text: code.to_string(),
                    style: SpanStyle {
                        code: true,
                        ..current
                    },
                }),
                Event::SoftBreak => spans.push(Span {
                    text: " ".to_string(),
                    style: current,
                }),
                Event::HardBreak => spans.push(Span::line_break()),
                Event::InlineHtml(html) => {
                    let tag = html.trim().to_ascii_lowercase();
                    if tag.starts_with("<br") {
                        spans.push(Span::line_break());
                    }
                }
                Event::FootnoteReference(label) => spans.push(Span {
                    text: format!("[{}]", label),
                    style: current,
                }),
                Event::TaskListMarker(checked) => self.task_marker = Some(checked),
                _ => {}
            }
        }

        spans
    }

    fn list_items(&mut self) -> Vec<ListItem> {
        let mut items = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::Item) => {
                    let outer = self.task_marker.take();
                    let blocks = self.blocks();
                    let task = self.task_marker.take();
                    self.task_marker = outer;
                    items.push(ListItem { task, blocks });
                }
                Event::End(_) => break,
                _ => {}
            }
        }
        items
    }

    fn table(&mut self, alignments: Vec<Alignment>) -> Block {
        let mut head = Vec::new();
        let mut rows = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::TableHead) => head = self.cells(),
                Event::Start(Tag::TableRow) => rows.push(self.cells()),
                Event::End(TagEnd::Table) => break,
                _ => {}
            }
        }
        Block::Table {
            alignments: alignments.into_iter().map(cell_alignment).collect(),
            head,
            rows,
        }
    }

    fn cells(&mut self) -> Vec<Vec<Span>> {
        let mut cells = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::TableCell) => {
                    cells.push(self.inlines());
                    self.skip_end();
                }
                Event::End(_) => break,
                _ => {}
            }
        }
        cells
    }

    fn definitions(&mut self) -> Vec<DefinitionEntry> {
        let mut entries: Vec<DefinitionEntry> = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::DefinitionListTitle) => {
                    let term = self.inlines();
                    self.skip_end();
                    entries.push(DefinitionEntry {
                        term,
                        definitions: Vec::new(),
                    });
                }
                Event::Start(Tag::DefinitionListDefinition) => {
                    let blocks = self.blocks();
                    match entries.last_mut() {
                        Some(entry) => entry.definitions.push(blocks),
                        None => entries.push(DefinitionEntry {
                            term: Vec::new(),
                            definitions: vec![blocks],
                        }),
                    }
                }
                Event::End(_) => break,
                _ => {}
            }
        }
        entries
    }
}

fn push_text(spans: &mut Vec<Span>, text: &str, style: &SpanStyle) {
    if style.link.is_some() || style.image {
        spans.push(Span {
            text: text.to_string(),
            style: style.clone(),
        });
        return;
    }

    for (part, is_url) in split_bare_urls(text) {
        let mut part_style = style.clone();
        if is_url {
            part_style.link = Some(part.to_string());
        }
        spans.push(Span {
            text: part.to_string(),
            style: part_style,
        });
    }
}

// ── HTML ──────────────────────────────────────────────────────────────────

fn checkbox_html(checked: bool) -> &'static str {
    if checked {
        r#"<span class="task-checkbox task-checked">&#x2611;</span>"#
    } else {
        r#"<span class="task-checkbox">&#x2610;</span>"#
    }
}

fn push_autolinked<'a>(out: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    let parts = split_bare_urls(&text);
    if !parts.iter().any(|(_, is_url)| *is_url) {
        out.push(Event::Text(text));
        return;
    }

    for (part, is_url) in parts {
        if is_url {
            out.push(Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url: CowStr::from(part.to_string()),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            }));
            out.push(Event::Text(CowStr::from(part.to_string())));
            out.push(Event::End(TagEnd::Link));
        } else {
            out.push(Event::Text(CowStr::from(part.to_string())));
        }
    }
}

fn html_events<'a>(source: &'a str, highlighter: &Highlighter) -> Result<Vec<Event<'a>>> {
    let mut out = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;
    let mut link_depth = 0usize;

    for event in events(source) {
        if code.is_some() {
            match event {
                Event::Text(text) => {
                    if let Some((_, buffer)) = code.as_mut() {
                        buffer.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buffer)) = code.take() {
                        let highlighted = highlighter.html(&buffer, lang.as_deref())?;
                        out.push(Event::Html(CowStr::from(format!(
                            "<div class=\"highlight\">{}</div>\n",
                            highlighted
                        ))));
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code = Some((fence_language(&kind), String::new()));
            }
            Event::TaskListMarker(checked) => {
                out.push(Event::InlineHtml(CowStr::Borrowed(checkbox_html(checked))))
            }
            Event::Start(Tag::Link { .. }) => {
                link_depth += 1;
                out.push(event);
            }
            Event::End(TagEnd::Link) => {
                link_depth = link_depth.saturating_sub(1);
                out.push(event);
            }
            Event::Text(text) if link_depth == 0 => push_autolinked(&mut out, text),
            other => out.push(other),
        }
    }

    Ok(out)
}

/// HTML body fragment for `source`. Raw HTML in the input passes through.
pub fn markdown_to_html_fragment(source: &str, highlighter: &Highlighter) -> Result<String> {
    let events = html_events(source, highlighter)?;
    let mut body = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut body, events.into_iter());
    Ok(TASK_ITEM
        .replace_all(&body, r#"<li class="task-list-item">${1}<span class="task-checkbox"#)
        .into_owned())
}

/// Complete page for the live preview iframe.
pub fn markdown_to_html(source: &str, highlighter: &Highlighter) -> Result<String> {
    let body = markdown_to_html_fragment(source, highlighter)?;
    Ok(format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head>",
            "<meta charset=\"utf-8\"/>",
            "<style>{}</style>",
            "</head>",
            "<body style=\"padding:2rem 2.5rem;max-width:860px;margin:0 auto\">",
            "{}",
            "</body></html>"
        ),
        preview_css(),
        body
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Standalone HTML document with a `<title>`, for exporting HTML files.
pub fn standalone_html(source: &str, title: &str, highlighter: &Highlighter) -> Result<String> {
    let body = markdown_to_html_fragment(source, highlighter)?;
    Ok(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\" />\n  <title>{}</title>\n  <style>{}</style>\n</head>\n<body class=\"markdown-body\">\n{}\n</body>\n</html>\n",
        escape_html(title),
        preview_css(),
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let blocks = parse_blocks("# Title\n\nSome *emphasis* and **bold**.\n");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Heading { level, spans } => {
                assert_eq!(*level, 1);
                assert_eq!(text_of(spans), "Title");
            }
            other => panic!("expected heading, got {:?}", other),
        }
        match &blocks[1] {
            Block::Paragraph(spans) => {
                assert_eq!(text_of(spans), "Some emphasis and bold.");
                assert!(spans.iter().any(|s| s.style.italic && s.text == "emphasis"));
                assert!(spans.iter().any(|s| s.style.bold && s.text == "bold"));
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_tight_task_list() {
        let blocks = parse_blocks("- [x] done\n- [ ] todo\n- plain\n");
        let Block::List { start, items } = &blocks[0] else {
            panic!("expected list, got {:?}", blocks);
        };
        assert_eq!(*start, None);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].task, Some(true));
        assert_eq!(items[1].task, Some(false));
        assert_eq!(items[2].task, None);
        assert_eq!(
            items[0].blocks,
            vec![Block::Paragraph(vec![Span::plain("done")])]
        );
    }

    #[test]
    fn test_nested_list_keeps_outer_marker() {
        let blocks = parse_blocks("1. [x] outer\n   - inner\n2. second\n");
        let Block::List { start, items } = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(*start, Some(1));
        assert_eq!(items[0].task, Some(true));
        assert!(matches!(items[0].blocks[1], Block::List { .. }));
        assert_eq!(items[1].task, None);
    }

    #[test]
    fn test_table() {
        let source = "| Name | Qty |\n|:-----|----:|\n| apple | 3 |\n| pear | 10 |\n";
        let blocks = parse_blocks(source);
        let Block::Table {
            alignments,
            head,
            rows,
        } = &blocks[0]
        else {
            panic!("expected table");
        };
        assert_eq!(alignments, &vec![CellAlignment::Left, CellAlignment::Right]);
        assert_eq!(head.len(), 2);
        assert_eq!(text_of(&head[1]), "Qty");
        assert_eq!(rows.len(), 2);
        assert_eq!(text_of(&rows[1][0]), "pear");
    }

    #[test]
    fn test_code_block_language() {
        let blocks = parse_blocks("```Rust ignore\nfn main() {}\n```\n\n    indented\n");
        assert_eq!(
            blocks[0],
            Block::CodeBlock {
                lang: Some("rust".to_string()),
                code: "fn main() {}\n".to_string()
            }
        );
        assert!(matches!(&blocks[1], Block::CodeBlock { lang: None, .. }));
    }

    #[test]
    fn test_bare_urls_become_links() {
        let blocks = parse_blocks("See https://example.com/docs_v2, or [site](https://x.org).\n");
        let Block::Paragraph(spans) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let links: Vec<_> = spans.iter().filter_map(|s| s.style.link.clone()).collect();
        assert_eq!(links, vec!["https://example.com/docs_v2", "https://x.org"]);
        assert_eq!(text_of(spans), "See https://example.com/docs_v2, or site.");
    }

    #[test]
    fn test_split_bare_urls() {
        assert_eq!(
            split_bare_urls("(https://a.io/x).").as_slice(),
            &[("(", false), ("https://a.io/x", true), (").", false)]
        );
        assert_eq!(split_bare_urls("http:// nothing"), vec![("http:// nothing", false)]);
    }

    #[test]
    fn test_definition_list() {
        let blocks = parse_blocks("Term\n: First definition\n");
        let Block::DefinitionList(entries) = &blocks[0] else {
            panic!("expected definition list, got {:?}", blocks);
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(text_of(&entries[0].term), "Term");
        assert_eq!(entries[0].definitions.len(), 1);
    }

    #[test]
    fn test_quote_image_and_rule() {
        let blocks = parse_blocks("> quoted ![logo](logo.png)\n\n---\n");
        let Block::Quote(children) = &blocks[0] else {
            panic!("expected quote");
        };
        let Block::Paragraph(spans) = &children[0] else {
            panic!("expected paragraph in quote");
        };
        assert_eq!(text_of(spans), "quoted [image: logo]");
        assert_eq!(blocks[1], Block::Rule);
    }

    #[test]
    fn test_html_checkboxes_and_task_items() {
        let highlighter = Highlighter::new();
        let html = markdown_to_html_fragment("- [x] done\n- [ ] todo\n", &highlighter).unwrap();
        assert!(html.contains(
            r#"<li class="task-list-item"><span class="task-checkbox task-checked">&#x2611;</span>"#
        ));
        assert!(html.contains(r#"<span class="task-checkbox">&#x2610;</span>"#));
        assert!(!html.contains("<input"));
    }

    #[test]
    fn test_html_highlights_code_and_autolinks() {
        let highlighter = Highlighter::new();
        let source = "Visit https://example.com.\n\n```python\nprint('hi')\n```\n\n<kbd>raw</kbd>\n";
        let html = markdown_to_html_fragment(source, &highlighter).unwrap();
        assert!(html.contains(r#"<a href="https://example.com">https://example.com</a>."#));
        assert!(html.contains(r#"<div class="highlight"><pre"#));
        assert!(html.contains("<kbd>raw</kbd>"));
    }

    #[test]
    fn test_preview_page_has_no_page_rule() {
        let highlighter = Highlighter::new();
        let page = markdown_to_html("# Hi\n", &highlighter).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<meta charset="utf-8"/>"#));
        assert!(page.contains("max-width:860px"));
        assert!(!page.contains("@page"));
        assert!(page.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_standalone_html_escapes_title() {
        let highlighter = Highlighter::new();
        let doc = standalone_html("text", "a <b> & c", &highlighter).unwrap();
        assert!(doc.contains("<title>a &lt;b&gt; &amp; c</title>"));
        assert!(doc.contains(r#"<body class="markdown-body">"#));
    }

    fn nesting(blocks: &[Block]) -> usize {
        blocks
            .iter()
            .map(|block| match block {
                Block::Quote(children) => 1 + nesting(children),
                Block::List { items, .. } => {
                    1 + items.iter().map(|item| nesting(&item.blocks)).max().unwrap_or(0)
                }
                Block::DefinitionList(entries) => {
                    1 + entries
                        .iter()
                        .flat_map(|entry| entry.definitions.iter())
                        .map(|definition| nesting(definition))
                        .max()
                        .unwrap_or(0)
                }
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_shallow_nesting_is_kept() {
        let blocks = parse_blocks("> > > a

- one
  - two
");
        assert_eq!(nesting(&blocks[..1]), 3);
        assert_eq!(nesting(&blocks[1..]), 2);
    }

    #[test]
    fn test_deep_quotes_are_flattened() {
        let source = format!("{}x", ">".repeat(50_000));
        let blocks = parse_blocks(&source);
        assert_eq!(nesting(&blocks), MAX_NESTING - 1);

        let mut current = &blocks;
        while let Some(Block::Quote(children)) = current.last() {
            current = children;
        }
        assert_eq!(current.last(), Some(&Block::Paragraph(vec![Span::plain("x")])));
    }

    #[test]
    fn test_deep_lists_are_flattened() {
        let source = format!("{}x", "- ".repeat(10_000));
        let blocks = parse_blocks(&source);
        assert!(nesting(&blocks) < MAX_NESTING);
        assert!(nesting(&blocks) > 1);
    }
}
