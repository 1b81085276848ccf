use crate::core::styles::Rgb;
use crate::utils::error::{AppError, Result};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const THEME_NAME: &str = "InspiredGitHub";
const TAB: &str = "    ";

/// One coloured run of a highlighted source line.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedRun {
    pub text: String,
    pub color: Rgb,
    pub bold: bool,
}

/// Syntax highlighting for fenced code blocks. Loading the syntax and theme
/// sets is expensive, so build one and share it.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new() -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults();
        let theme = themes.themes.remove(THEME_NAME).unwrap_or_default();
        Self { syntaxes, theme }
    }

    /// First word of a fence info string, lowercased.
    pub fn language_token(info: &str) -> Option<String> {
        info.split_whitespace()
            .next()
            .map(|token| token.trim_matches(|c| c == '{' || c == '}' || c == '.'))
            .filter(|token| !token.is_empty())
            .map(str::to_ascii_lowercase)
    }

    fn syntax(&self, lang: Option<&str>) -> &SyntaxReference {
        lang.and_then(|token| self.syntaxes.find_syntax_by_token(token))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    pub fn is_known_language(&self, lang: &str) -> bool {
        self.syntaxes.find_syntax_by_token(lang).is_some()
    }

    /// Highlighted `<pre>` element with inline colour styles.
    pub fn html(&self, code: &str, lang: Option<&str>) -> Result<String> {
        highlighted_html_for_string(code, &self.syntaxes, self.syntax(lang), &self.theme)
            .map_err(|e| AppError::render(format!("syntax highlighting failed: {}", e)))
    }

    /// Per-line coloured runs. Line endings are stripped and tabs expanded.
    pub fn lines(&self, code: &str, lang: Option<&str>) -> Result<Vec<Vec<HighlightedRun>>> {
        let mut highlighter = HighlightLines::new(self.syntax(lang), &self.theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, &self.syntaxes)
                .map_err(|e| AppError::render(format!("syntax highlighting failed: {}", e)))?;

            let runs = ranges
                .into_iter()
                .map(|(style, text)| HighlightedRun {
                    text: text.trim_end_matches(['\n', '\r']).replace('\t', TAB),
                    color: Rgb(style.foreground.r, style.foreground.g, style.foreground.b),
                    bold: style.font_style.contains(FontStyle::BOLD),
                })
                .filter(|run| !run.text.is_empty())
                .collect();
            lines.push(runs);
        }

        Ok(lines)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}
