use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TITLE: &str = "document";

fn default_filename() -> String {
    DEFAULT_TITLE.to_string()
}

/// JSON body accepted by `/preview` and `/convert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub markdown: String,
    #[serde(default = "default_filename")]
    pub filename: String,
}

impl ConvertRequest {
    pub fn download_stem(&self) -> String {
        file_stem(&self.filename)
    }

    pub fn download_stem_or(&self, fallback: &str) -> String {
        file_stem_or(&self.filename, fallback)
    }
}

/// File name without directories and without its last extension.
/// Falls back to [`DEFAULT_TITLE`] when nothing is left.
pub fn file_stem(name: &str) -> String {
    file_stem_or(name, DEFAULT_TITLE)
}

pub fn file_stem_or(name: &str, fallback: &str) -> String {
    Path::new(name.trim())
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl std::str::FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(format!("Unsupported page size: {} (expected a4 or letter)", other)),
        }
    }
}

const POINTS_PER_CM: f32 = 72.0 / 2.54;

/// Page geometry in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl PageSetup {
    pub fn new(size: PageSize) -> Self {
        let (width, height) = match size {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
        };
        // 2cm 2.5cm
        Self {
            width,
            height,
            margin_top: 2.0 * POINTS_PER_CM,
            margin_bottom: 2.0 * POINTS_PER_CM,
            margin_left: 2.5 * POINTS_PER_CM,
            margin_right: 2.5 * POINTS_PER_CM,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn content_top(&self) -> f32 {
        self.margin_top
    }

    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin_bottom
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::new(PageSize::A4)
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

// ── document tree ─────────────────────────────────────────────────────────

/// Deepest container nesting (quotes, lists, definitions) the block tree
/// carries. Parsing flattens anything deeper.
pub const MAX_NESTING: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub strike: bool,
    pub image: bool,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::default(),
        }
    }

    pub fn line_break() -> Self {
        Self::plain("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// `Some(checked)` for GFM task list items.
    pub task: Option<bool>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionEntry {
    pub term: Vec<Span>,
    pub definitions: Vec<Vec<Block>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    CodeBlock { lang: Option<String>, code: String },
    Quote(Vec<Block>),
    List { start: Option<u64>, items: Vec<ListItem> },
    Table {
        alignments: Vec<CellAlignment>,
        head: Vec<Vec<Span>>,
        rows: Vec<Vec<Vec<Span>>>,
    },
    DefinitionList(Vec<DefinitionEntry>),
    Rule,
    Html(String),
}
