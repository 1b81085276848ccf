use crate::core::highlight::Highlighter;
use crate::core::layout::layout_document;
use crate::core::markdown::{markdown_to_html, parse_blocks, standalone_html};
use crate::core::pdf::write_pdf;
use crate::core::styles::Theme;
use crate::domain::model::{PageSetup, RenderedPdf};
use crate::domain::ports::DocumentRenderer;
use crate::utils::error::Result;
use std::sync::Arc;

/// Markdown renderer backed by pulldown-cmark, syntect and the native PDF
/// layout engine.
pub struct MarkdownRenderer {
    highlighter: Arc<Highlighter>,
    theme: Theme,
    setup: PageSetup,
}

impl MarkdownRenderer {
    pub fn new(setup: PageSetup) -> Self {
        Self::with_highlighter(Arc::new(Highlighter::new()), setup)
    }

    pub fn with_highlighter(highlighter: Arc<Highlighter>, setup: PageSetup) -> Self {
        Self {
            highlighter,
            theme: Theme::default(),
            setup,
        }
    }

    pub fn page_setup(&self) -> &PageSetup {
        &self.setup
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(PageSetup::default())
    }
}

impl DocumentRenderer for MarkdownRenderer {
    fn render_html(&self, markdown: &str) -> Result<String> {
        markdown_to_html(markdown, &self.highlighter)
    }

    fn render_standalone_html(&self, markdown: &str, title: &str) -> Result<String> {
        standalone_html(markdown, title, &self.highlighter)
    }

    fn render_pdf(&self, markdown: &str, title: &str) -> Result<RenderedPdf> {
        let blocks = parse_blocks(markdown);
        let pages = layout_document(&blocks, &self.setup, &self.theme, &self.highlighter)?;
        let bytes = write_pdf(&pages, &self.setup, title)?;
        Ok(RenderedPdf {
            pages: pages.len(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PageSize;

    #[test]
    fn test_render_pdf() {
        let renderer = MarkdownRenderer::default();
        let pdf = renderer
            .render_pdf("# Hello\n\n- [x] done\n\n```nosuchlang\nx\n```\n", "Hello")
            .unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF-"));
        assert_eq!(pdf.pages, 1);
    }

    #[test]
    fn test_letter_page_size() {
        let renderer = MarkdownRenderer::new(PageSetup::new(PageSize::Letter));
        assert_eq!(renderer.page_setup().width, 612.0);
        let pdf = renderer.render_pdf("text", "t").unwrap();
        let doc = lopdf::Document::load_mem(&pdf.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_html() {
        let renderer = MarkdownRenderer::default();
        let html = renderer.render_html("**bold**").unwrap();
        assert!(html.contains("<strong>bold</strong>"));
        let doc = renderer.render_standalone_html("x", "Title").unwrap();
        assert!(doc.contains("<title>Title</title>"));
    }
}
