//! Greedy line breaking over styled runs.

use crate::core::pdf::fonts::Font;
use crate::core::styles::Rgb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Rgb,
    pub strike: bool,
    pub background: Option<Rgb>,
}

impl TextStyle {
    pub fn new(font: Font, size: f32, color: Rgb) -> Self {
        Self {
            font,
            size,
            color,
            strike: false,
            background: None,
        }
    }
}

/// Input to the line breaker. A `'\n'` inside `text` forces a break.
#[derive(Debug, Clone)]
pub struct Run {
    pub text: String,
    pub style: TextStyle,
}

/// A run placed on a line, `x` relative to the line start.
#[derive(Debug, Clone)]
pub struct PlacedRun {
    pub x: f32,
    pub width: f32,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Default)]
pub struct Line {
    pub runs: Vec<PlacedRun>,
    pub width: f32,
}

impl Line {
    pub fn max_size(&self) -> f32 {
        self.runs.iter().map(|r| r.style.size).fold(0.0, f32::max)
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub(crate) fn push(&mut self, text: &str, style: TextStyle) {
        let width = style.font.text_width(text, style.size);
        match self.runs.last_mut() {
            Some(last) if last.style == style => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.runs.push(PlacedRun {
                x: self.width,
                width,
                text: text.to_string(),
                style,
            }),
        }
        self.width += width;
    }

    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

enum Token<'a> {
    Word(Vec<(&'a str, TextStyle)>),
    Space(TextStyle),
    Break,
}

// 相鄰且中間沒有空白的 run 片段視為同一個單字，例如 "**bold**,"
fn tokenize(runs: &[Run]) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word: Vec<(&str, TextStyle)> = Vec::new();

    for run in runs {
        let mut start = None;
        for (i, c) in run.text.char_indices() {
            if c == '\n' || c.is_whitespace() {
                if let Some(s) = start.take() {
                    word.push((&run.text[s..i], run.style));
                }
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
                tokens.push(if c == '\n' {
                    Token::Break
                } else {
                    Token::Space(run.style)
                });
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            word.push((&run.text[s..], run.style));
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }

    tokens
}

fn word_width(parts: &[(&str, TextStyle)]) -> f32 {
    parts
        .iter()
        .map(|(text, style)| style.font.text_width(text, style.size))
        .sum()
}

/// Breaks `runs` into lines no wider than `max_width`. Words wider than a
/// whole line are split between characters. Whitespace collapses to a
/// single space and never starts a line.
pub fn break_lines(runs: &[Run], max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::default();
    let mut pending_space: Option<TextStyle> = None;

    for token in tokenize(runs) {
        match token {
            Token::Break => {
                lines.push(std::mem::take(&mut line));
                pending_space = None;
            }
            Token::Space(style) => {
                if !line.is_empty() && pending_space.is_none() {
                    pending_space = Some(style);
                }
            }
            Token::Word(parts) => {
                let width = word_width(&parts);
                let space_width = pending_space
                    .map(|s| s.font.text_width(" ", s.size))
                    .unwrap_or(0.0);

                if !line.is_empty() && line.width + space_width + width > max_width {
                    lines.push(std::mem::take(&mut line));
                    pending_space = None;
                }

                if let Some(style) = pending_space.take() {
                    line.push(" ", style);
                }

                if width <= max_width - line.width {
                    for (text, style) in parts {
                        line.push(text, style);
                    }
                } else {
                    split_word(&parts, max_width, &mut line, &mut lines);
                }
            }
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn split_word(
    parts: &[(&str, TextStyle)],
    max_width: f32,
    line: &mut Line,
    lines: &mut Vec<Line>,
) {
    let mut buf = [0u8; 4];
    for (text, style) in parts {
        for c in text.chars() {
            let width = style.font.char_width(c) as f32 * style.size / 1000.0;
            if !line.is_empty() && line.width + width > max_width {
                lines.push(std::mem::take(line));
            }
            line.push(c.encode_utf8(&mut buf), *style);
        }
    }
}
