//! Paginating layout engine.
//!
//! Walks the block tree top-down and emits drawing operations per page.
//! Coordinates are in points with the origin at the top-left corner of the
//! page; the PDF writer flips the y axis. Vertical spacing follows CSS
//! margin collapsing: a block's top margin merges with the previous block's
//! bottom margin, and the first child of a container gets none.

pub mod text;

use crate::core::highlight::{HighlightedRun, Highlighter};
use crate::core::pdf::fonts::{Font, CHECK_MARK};
use crate::core::styles::{Rgb, Theme};
use crate::domain::model::{
    Block, CellAlignment, DefinitionEntry, ListItem, PageSetup, Span, MAX_NESTING,
};
use crate::utils::error::{AppError, Result};
use text::{break_lines, Line, Run, TextStyle};
use tracing::debug;

/// Baseline offset as a fraction of the font size, measured from the top of
/// the glyph box.
const ASCENT: f32 = 0.78;
const BULLETS: [&str; 3] = ["•", "–", "·"];
const MARKER_GAP: f32 = 6.0;
const BORDER_WIDTH: f32 = 0.75;
const EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        baseline: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        line_width: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text content in drawing order, one op per word group.
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn fonts(&self) -> Vec<Font> {
        let mut fonts: Vec<Font> = self
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        fonts.sort();
        fonts.dedup();
        fonts
    }
}

/// Horizontal box the current block flows into.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f32,
    width: f32,
    color: Rgb,
    /// Inside a list item: paragraphs keep tight spacing.
    compact: bool,
}

impl Frame {
    fn indent(self, by: f32, min_width: f32) -> Frame {
        Frame {
            x: self.x + by,
            width: (self.width - by).max(min_width),
            ..self
        }
    }
}

struct LaidRow {
    cells: Vec<Vec<Line>>,
    height: f32,
}

/// Lays out `blocks` onto pages and stamps a `n / total` footer on each.
pub fn layout_document(
    blocks: &[Block],
    setup: &PageSetup,
    theme: &Theme,
    highlighter: &Highlighter,
) -> Result<Vec<Page>> {
    let mut engine = LayoutEngine::new(setup, theme, highlighter);
    let frame = Frame {
        x: setup.margin_left,
        width: setup.content_width(),
        color: theme.text,
        compact: false,
    };
    engine.blocks(blocks, frame)?;
    let pages = engine.finish();
    debug!("Laid out {} blocks on {} pages", blocks.len(), pages.len());
    Ok(pages)
}

struct LayoutEngine<'a> {
    setup: &'a PageSetup,
    theme: &'a Theme,
    highlighter: &'a Highlighter,
    pages: Vec<Page>,
    y: f32,
    pending_gap: f32,
    container_start: bool,
    list_depth: usize,
    nesting: usize,
}

impl<'a> LayoutEngine<'a> {
    fn new(setup: &'a PageSetup, theme: &'a Theme, highlighter: &'a Highlighter) -> Self {
        Self {
            setup,
            theme,
            highlighter,
            pages: vec![Page::default()],
            y: setup.content_top(),
            pending_gap: 0.0,
            container_start: true,
            list_depth: 0,
            nesting: 0,
        }
    }

    // ── page bookkeeping ──────────────────────────────────────────────────

    fn top(&self) -> f32 {
        self.setup.content_top()
    }

    fn bottom(&self) -> f32 {
        self.setup.content_bottom()
    }

    fn page_height(&self) -> f32 {
        self.bottom() - self.top()
    }

    fn remaining(&self) -> f32 {
        self.bottom() - self.y
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.top() + EPSILON
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.top();
    }

    /// Starts a new page unless `height` fits below the cursor. Never breaks
    /// at the top of a page, so oversized content simply overflows.
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() + EPSILON && !self.at_page_top() {
            self.new_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn position(&self) -> (usize, f32) {
        (self.pages.len() - 1, self.y)
    }

    fn begin_block(&mut self, margin_top: f32) {
        let gap = if self.container_start {
            0.0
        } else {
            self.pending_gap.max(margin_top)
        };
        self.container_start = false;
        self.pending_gap = 0.0;

        // 換頁後的頁首不留邊距
        if gap > 0.0 && !self.at_page_top() {
            self.y += gap;
            if self.y > self.bottom() {
                self.new_page();
            }
        }
    }

    fn end_block(&mut self, margin_bottom: f32) {
        self.pending_gap = margin_bottom;
    }

    fn block_gap(&self, frame: Frame) -> f32 {
        if frame.compact {
            self.theme.item_gap
        } else {
            self.theme.block_gap
        }
    }

    /// Lays out `blocks` as the children of a container: the first child
    /// gets no top margin and the last child's bottom margin is dropped.
    fn children(&mut self, blocks: &[Block], frame: Frame) -> Result<()> {
        if self.nesting >= MAX_NESTING {
            return Err(AppError::render(format!(
                "document nests containers deeper than {} levels",
                MAX_NESTING
            )));
        }
        self.nesting += 1;
        self.container_start = true;
        self.blocks(blocks, frame)?;
        self.container_start = false;
        self.pending_gap = 0.0;
        self.nesting -= 1;
        Ok(())
    }

    /// Draws `op(top, bottom)` once per page between `start` and the cursor,
    /// for decorations that must follow content across page breaks.
    fn decorate(&mut self, start: (usize, f32), op: impl Fn(f32, f32) -> DrawOp) {
        let (start_page, start_y) = start;
        let end_page = self.pages.len() - 1;
        let (top, bottom, cursor) = (self.top(), self.bottom(), self.y);

        for index in start_page..=end_page {
            let from = if index == start_page { start_y } else { top };
            let to = if index == end_page { cursor } else { bottom };
            if to - from > EPSILON {
                self.pages[index].ops.push(op(from, to));
            }
        }
    }

    fn finish(self) -> Vec<Page> {
        let mut pages = self.pages;
        while pages.len() > 1 && pages.last().is_some_and(|page| page.ops.is_empty()) {
            pages.pop();
        }

        let total = pages.len();
        let size = self.theme.footer_size;
        let baseline = self.setup.height - self.setup.margin_bottom / 2.0;
        for (index, page) in pages.iter_mut().enumerate() {
            let label = format!("{} / {}", index + 1, total);
            let width = Font::Regular.text_width(&label, size);
            page.ops.push(DrawOp::Text {
                x: (self.setup.width - width) / 2.0,
                baseline,
                font: Font::Regular,
                size,
                color: self.theme.muted,
                text: label,
            });
        }
        pages
    }

    // ── inline text ───────────────────────────────────────────────────────

    fn runs(&self, spans: &[Span], size: f32, bold: bool, italic: bool, color: Rgb) -> Vec<Run> {
        let theme = self.theme;
        spans
            .iter()
            .map(|span| {
                let style = &span.style;
                let italic = italic || style.italic || style.image;
                let font = Font::for_style(bold || style.bold, italic, style.code);
                let color = if style.link.is_some() {
                    theme.link
                } else if style.image {
                    theme.muted
                } else {
                    color
                };
                Run {
                    text: span.text.clone(),
                    style: TextStyle {
                        font,
                        size: if style.code { size * 0.85 } else { size },
                        color,
                        strike: style.strike,
                        background: style.code.then_some(theme.inline_code_background),
                    },
                }
            })
            .collect()
    }

    fn draw_line(&mut self, line: &Line, x: f32, top: f32, size: f32, line_height: f32) {
        let baseline = top + (line_height - size) / 2.0 + size * ASCENT;

        for run in &line.runs {
            let style = run.style;
            let rx = x + run.x;
            if let Some(color) = style.background {
                self.push(DrawOp::FillRect {
                    x: rx - 1.0,
                    y: baseline - style.size * 0.85,
                    width: run.width + 2.0,
                    height: style.size * 1.15,
                    color,
                });
            }
            if !run.text.trim().is_empty() {
                self.push(DrawOp::Text {
                    x: rx,
                    baseline,
                    font: style.font,
                    size: style.size,
                    color: style.color,
                    text: run.text.clone(),
                });
            }
            if style.strike {
                let y = baseline - style.size * 0.3;
                self.push(DrawOp::Line {
                    x1: rx,
                    y1: y,
                    x2: rx + run.width,
                    y2: y,
                    line_width: style.size * 0.06,
                    color: style.color,
                });
            }
        }
    }

    fn flow(&mut self, lines: &[Line], x: f32, size: f32, line_height: f32) {
        for line in lines {
            self.ensure(line_height);
            let top = self.y;
            self.draw_line(line, x, top, size, line_height);
            self.y += line_height;
        }
    }

    // ── blocks ────────────────────────────────────────────────────────────

    fn blocks(&mut self, blocks: &[Block], frame: Frame) -> Result<()> {
        for block in blocks {
            self.block(block, frame)?;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block, frame: Frame) -> Result<()> {
        match block {
            Block::Heading { level, spans } => self.heading(*level, spans, frame),
            Block::Paragraph(spans) => self.paragraph(spans, frame),
            Block::CodeBlock { lang, code } => self.code_block(lang.as_deref(), code, frame)?,
            Block::Quote(children) => self.quote(children, frame)?,
            Block::List { start, items } => self.list(*start, items, frame)?,
            Block::Table {
                alignments,
                head,
                rows,
            } => self.table(alignments, head, rows, frame),
            Block::DefinitionList(entries) => self.definition_list(entries, frame)?,
            Block::Rule => self.rule(frame),
            Block::Html(text) => self.paragraph(&[Span::plain(text.as_str())], frame),
        }
        Ok(())
    }

    fn paragraph(&mut self, spans: &[Span], frame: Frame) {
        let theme = self.theme;
        self.begin_block(0.0);
        let runs = self.runs(spans, theme.body_size, false, false, frame.color);
        let lines = break_lines(&runs, frame.width);
        self.flow(&lines, frame.x, theme.body_size, theme.body_line());
        self.end_block(self.block_gap(frame));
    }

    fn heading(&mut self, level: u8, spans: &[Span], frame: Frame) {
        let theme = self.theme;
        let size = theme.heading_size(level);
        let line_height = size * theme.heading_line_height;
        let ruled = level <= 2;

        self.begin_block(theme.heading_gap_top);

        let color = if level >= 6 { theme.muted } else { frame.color };
        let runs = self.runs(spans, size, true, false, color);
        let lines = break_lines(&runs, frame.width);

        let rule_space = if ruled {
            size * theme.heading_rule_padding + theme.rule_thickness
        } else {
            0.0
        };
        // 標題不可孤立在頁尾：至少要和後面兩行內文放在同一頁
        let keep_with_next = lines.len() as f32 * line_height
            + rule_space
            + theme.heading_gap_bottom
            + 2.0 * theme.body_line();
        if keep_with_next <= self.page_height() {
            self.ensure(keep_with_next);
        }

        self.flow(&lines, frame.x, size, line_height);

        if ruled {
            self.y += size * theme.heading_rule_padding;
            self.push(DrawOp::FillRect {
                x: frame.x,
                y: self.y,
                width: frame.width,
                height: theme.rule_thickness,
                color: theme.border,
            });
            self.y += theme.rule_thickness;
        }

        self.end_block(theme.heading_gap_bottom);
    }

    fn code_block(&mut self, lang: Option<&str>, code: &str, frame: Frame) -> Result<()> {
        let theme = self.theme;
        let size = theme.code_size;
        let line_height = size * theme.code_line_height;
        let padding = theme.code_padding;
        let background = theme.code_background;

        self.begin_block(0.0);

        let source = code.strip_suffix('\n').unwrap_or(code);
        let highlighted = self.highlighter.lines(source, lang)?;
        let inner_width = (frame.width - 2.0 * padding).max(size);
        let mut lines: Vec<Line> = highlighted
            .iter()
            .flat_map(|runs| wrap_code_line(runs, inner_width, size))
            .collect();
        if lines.is_empty() {
            lines.push(Line::default());
        }

        // 整塊放得進一頁就不拆開
        let total = lines.len() as f32 * line_height + 2.0 * padding;
        if total <= self.page_height() {
            self.ensure(total);
        } else {
            self.ensure(padding + line_height);
        }

        self.band(frame, padding, background);
        for line in &lines {
            if line_height > self.remaining() + EPSILON {
                self.new_page();
            }
            let top = self.y;
            self.push(DrawOp::FillRect {
                x: frame.x,
                y: top,
                width: frame.width,
                height: line_height,
                color: background,
            });
            self.draw_line(line, frame.x + padding, top, size, line_height);
            self.y += line_height;
        }
        let bottom_padding = padding.min(self.remaining().max(0.0));
        self.band(frame, bottom_padding, background);

        self.end_block(self.block_gap(frame));
        Ok(())
    }

    fn band(&mut self, frame: Frame, height: f32, color: Rgb) {
        if height <= 0.0 {
            return;
        }
        self.push(DrawOp::FillRect {
            x: frame.x,
            y: self.y,
            width: frame.width,
            height,
            color,
        });
        self.y += height;
    }

    fn quote(&mut self, children: &[Block], frame: Frame) -> Result<()> {
        let theme = self.theme;
        self.begin_block(0.0);

        let start = self.position();
        let inner = Frame {
            color: theme.muted,
            ..frame.indent(theme.quote_bar + theme.quote_padding, theme.body_size)
        };
        self.children(children, inner)?;

        let (x, width, color) = (frame.x, theme.quote_bar, theme.border);
        self.decorate(start, |top, bottom| DrawOp::FillRect {
            x,
            y: top,
            width,
            height: bottom - top,
            color,
        });

        self.end_block(self.block_gap(frame));
        Ok(())
    }

    fn list(&mut self, start: Option<u64>, items: &[ListItem], frame: Frame) -> Result<()> {
        let theme = self.theme;
        self.begin_block(0.0);

        let depth = self.list_depth;
        self.list_depth += 1;
        let inner = Frame {
            compact: true,
            ..frame.indent(theme.list_indent, theme.body_size)
        };

        for (index, item) in items.iter().enumerate() {
            if index > 0 && !self.at_page_top() {
                self.y += theme.item_gap;
            }
            self.ensure(theme.body_line());

            let top = self.y;
            let ordinal = start.map(|n| n + index as u64);
            self.list_marker(item.task, ordinal, depth, frame, top);

            self.children(&item.blocks, inner)?;
            if item.blocks.is_empty() {
                self.y += theme.body_line();
            }
        }

        self.list_depth = depth;
        let gap = if depth == 0 { self.block_gap(frame) } else { 0.0 };
        self.end_block(gap);
        Ok(())
    }

    fn list_marker(
        &mut self,
        task: Option<bool>,
        ordinal: Option<u64>,
        depth: usize,
        frame: Frame,
        top: f32,
    ) {
        let theme = self.theme;
        let size = theme.body_size;
        let baseline = top + (theme.body_line() - size) / 2.0 + size * ASCENT;
        let right = frame.x + theme.list_indent - MARKER_GAP;

        if let Some(checked) = task {
            let box_size = size * 0.75;
            let x = right - box_size;
            let color = if checked { theme.checked } else { theme.muted };
            self.push(DrawOp::StrokeRect {
                x,
                y: baseline - box_size,
                width: box_size,
                height: box_size,
                line_width: BORDER_WIDTH,
                color,
            });
            if checked {
                self.push(DrawOp::Text {
                    x: x + box_size * 0.12,
                    baseline: baseline - box_size * 0.15,
                    font: Font::Dingbats,
                    size: box_size * 0.9,
                    color,
                    text: CHECK_MARK.to_string(),
                });
            }
            return;
        }

        let label = match ordinal {
            Some(n) => format!("{}.", n),
            None => BULLETS[depth % BULLETS.len()].to_string(),
        };
        let width = Font::Regular.text_width(&label, size);
        self.push(DrawOp::Text {
            x: right - width,
            baseline,
            font: Font::Regular,
            size,
            color: frame.color,
            text: label,
        });
    }

    fn table(
        &mut self,
        alignments: &[CellAlignment],
        head: &[Vec<Span>],
        rows: &[Vec<Vec<Span>>],
        frame: Frame,
    ) {
        let columns = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(head.len()))
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return;
        }

        self.begin_block(0.0);

        let widths = self.column_widths(columns, head, rows, frame.width);
        let header = (!head.is_empty()).then(|| self.layout_row(head, &widths, true, frame.color));
        let laid: Vec<LaidRow> = rows
            .iter()
            .map(|row| self.layout_row(row, &widths, false, frame.color))
            .collect();

        if let Some(header) = &header {
            let first = laid.first().map_or(0.0, |row| row.height);
            let needed = header.height + first;
            if needed <= self.page_height() {
                self.ensure(needed);
            }
            self.draw_row(header, &widths, alignments, frame, None);
        }

        for (index, row) in laid.iter().enumerate() {
            if row.height > self.remaining() + EPSILON && !self.at_page_top() {
                self.new_page();
                // 跨頁時重複表頭
                if let Some(header) = &header {
                    self.draw_row(header, &widths, alignments, frame, None);
                }
            }
            let fill = (index % 2 == 1).then_some(self.theme.zebra);
            self.draw_row(row, &widths, alignments, frame, fill);
        }

        self.end_block(self.block_gap(frame));
    }

    /// Column widths filling `available`. Columns get at least their longest
    /// word when possible; leftover space follows each column's natural
    /// (unwrapped) width.
    fn column_widths(
        &self,
        columns: usize,
        head: &[Vec<Span>],
        rows: &[Vec<Vec<Span>>],
        available: f32,
    ) -> Vec<f32> {
        let theme = self.theme;
        let padding = 2.0 * theme.cell_padding_x;
        let mut natural = vec![0.0f32; columns];
        let mut minimum = vec![0.0f32; columns];

        let body = rows.iter().map(|row| (row.as_slice(), false));
        for (cells, bold) in std::iter::once((head, true)).chain(body) {
            for (index, cell) in cells.iter().enumerate().take(columns) {
                let (full, word) = measure_cell(cell, theme.body_size, bold);
                natural[index] = natural[index].max(full);
                minimum[index] = minimum[index].max(word);
            }
        }

        let floor = padding + theme.body_size;
        let natural: Vec<f32> = natural.iter().map(|w| (w + padding).max(floor)).collect();
        let minimum: Vec<f32> = minimum.iter().map(|w| (w + padding).max(floor)).collect();

        let natural_total: f32 = natural.iter().sum();
        if natural_total <= available {
            return natural.iter().map(|w| w * available / natural_total).collect();
        }

        let minimum_total: f32 = minimum.iter().sum();
        if minimum_total >= available {
            return minimum.iter().map(|w| w * available / minimum_total).collect();
        }

        let slack = available - minimum_total;
        let stretch: f32 = natural.iter().zip(&minimum).map(|(n, m)| n - m).sum();
        natural
            .iter()
            .zip(&minimum)
            .map(|(n, m)| m + (n - m) * slack / stretch)
            .collect()
    }

    fn layout_row(&self, cells: &[Vec<Span>], widths: &[f32], header: bool, color: Rgb) -> LaidRow {
        let theme = self.theme;
        let cells: Vec<Vec<Line>> = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let spans = cells.get(index).map(Vec::as_slice).unwrap_or(&[]);
                let runs = self.runs(spans, theme.body_size, header, false, color);
                break_lines(&runs, (width - 2.0 * theme.cell_padding_x).max(theme.body_size))
            })
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        LaidRow {
            height: lines as f32 * theme.body_line() + 2.0 * theme.cell_padding_y,
            cells,
        }
    }

    fn draw_row(
        &mut self,
        row: &LaidRow,
        widths: &[f32],
        alignments: &[CellAlignment],
        frame: Frame,
        fill: Option<Rgb>,
    ) {
        let theme = self.theme;
        let top = self.y;
        let mut x = frame.x;

        for (index, (lines, width)) in row.cells.iter().zip(widths).enumerate() {
            if let Some(color) = fill {
                self.push(DrawOp::FillRect {
                    x,
                    y: top,
                    width: *width,
                    height: row.height,
                    color,
                });
            }

            let inner = width - 2.0 * theme.cell_padding_x;
            let alignment = alignments.get(index).copied().unwrap_or(CellAlignment::Left);
            for (n, line) in lines.iter().enumerate() {
                let offset = match alignment {
                    CellAlignment::Left => 0.0,
                    CellAlignment::Center => ((inner - line.width) / 2.0).max(0.0),
                    CellAlignment::Right => (inner - line.width).max(0.0),
                };
                let line_top = top + theme.cell_padding_y + n as f32 * theme.body_line();
                self.draw_line(
                    line,
                    x + theme.cell_padding_x + offset,
                    line_top,
                    theme.body_size,
                    theme.body_line(),
                );
            }

            self.push(DrawOp::StrokeRect {
                x,
                y: top,
                width: *width,
                height: row.height,
                line_width: BORDER_WIDTH,
                color: theme.border,
            });
            x += width;
        }

        self.y = top + row.height;
    }

    fn definition_list(&mut self, entries: &[DefinitionEntry], frame: Frame) -> Result<()> {
        let theme = self.theme;
        let inner = frame.indent(theme.definition_indent, theme.body_size);

        for entry in entries {
            self.begin_block(theme.definition_gap);
            let runs = self.runs(&entry.term, theme.body_size, true, true, frame.color);
            let lines = break_lines(&runs, frame.width);
            // 術語和第一行定義放在同一頁
            self.ensure((lines.len() + 1) as f32 * theme.body_line());
            self.flow(&lines, frame.x, theme.body_size, theme.body_line());
            self.end_block(0.0);

            for definition in &entry.definitions {
                self.children(definition, inner)?;
                self.end_block(theme.definition_gap);
            }
        }
        Ok(())
    }

    fn rule(&mut self, frame: Frame) {
        let theme = self.theme;
        self.begin_block(theme.rule_gap);
        self.ensure(theme.rule_thickness);
        self.push(DrawOp::FillRect {
            x: frame.x,
            y: self.y,
            width: frame.width,
            height: theme.rule_thickness,
            color: theme.border,
        });
        self.y += theme.rule_thickness;
        self.end_block(theme.rule_gap);
    }
}

/// Full width and widest single word of a table cell.
fn measure_cell(spans: &[Span], size: f32, bold: bool) -> (f32, f32) {
    let mut full = 0.0;
    let mut word = 0.0f32;
    for span in spans {
        let style = &span.style;
        let font = Font::for_style(bold || style.bold, style.italic, style.code);
        let size = if style.code { size * 0.85 } else { size };
        full += font.text_width(&span.text, size);
        for part in span.text.split_whitespace() {
            word = word.max(font.text_width(part, size));
        }
    }
    (full, word)
}

/// Wraps one highlighted source line at character boundaries, keeping
/// indentation intact.
fn wrap_code_line(runs: &[HighlightedRun], max_width: f32, size: f32) -> Vec<Line> {
    let advance = Font::Mono.text_width(" ", size);
    let per_line = ((max_width / advance).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut line = Line::default();
    let mut count = 0;
    let mut buf = [0u8; 4];

    for run in runs {
        let font = if run.bold { Font::MonoBold } else { Font::Mono };
        let style = TextStyle::new(font, size, run.color);
        for c in run.text.chars() {
            if count == per_line {
                lines.push(std::mem::take(&mut line));
                count = 0;
            }
            line.push(c.encode_utf8(&mut buf), style);
            count += 1;
        }
    }

    lines.push(line);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markdown::parse_blocks;

    fn layout(source: &str) -> Vec<Page> {
        let highlighter = Highlighter::new();
        layout_document(
            &parse_blocks(source),
            &PageSetup::default(),
            &Theme::default(),
            &highlighter,
        )
        .unwrap()
    }

    fn texts(page: &Page) -> Vec<(f32, f32, String)> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    x, baseline, text, ..
                } => Some((*x, *baseline, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_document_has_one_page_with_footer() {
        let pages = layout("");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text(), "1 / 1");
    }

    #[test]
    fn test_first_block_starts_at_top_margin() {
        let pages = layout("# Title\n\nBody text.\n");
        let setup = PageSetup::default();
        let ops = texts(&pages[0]);
        let (_, baseline, text) = &ops[0];
        assert_eq!(text, "Title");
        assert!(*baseline > setup.margin_top);
        assert!(*baseline < setup.margin_top + 24.0 * 1.25);
        assert!(pages[0].fonts().contains(&Font::Bold));
    }

    #[test]
    fn test_long_document_paginates_with_footers() {
        let source: String = (0..120)
            .map(|i| format!("Paragraph number {} with a little text.\n\n", i))
            .collect();
        let pages = layout(&source);
        assert!(pages.len() > 2);

        let total = pages.len();
        for (index, page) in pages.iter().enumerate() {
            let footer = format!("{} / {}", index + 1, total);
            assert!(page.text().ends_with(&footer), "page {} footer", index + 1);
        }

        let bottom = PageSetup::default().content_bottom();
        for page in &pages {
            for (_, baseline, text) in texts(page) {
                if !text.contains(" / ") {
                    assert!(baseline <= bottom, "{} overflows", text);
                }
            }
        }
    }

    #[test]
    fn test_heading_is_kept_with_next_block() {
        // 填滿第一頁後讓標題落在頁尾
        let filler: String = (0..21).map(|i| format!("Line {}\n\n", i)).collect();
        let source = format!("{}## Section\n\nFollowing text.\n", filler);
        let pages = layout(&source);
        let heading_page = pages
            .iter()
            .position(|page| page.text().contains("Section"))
            .unwrap();
        let body_page = pages
            .iter()
            .position(|page| page.text().contains("Following"))
            .unwrap();
        assert_eq!(heading_page, body_page);
    }

    #[test]
    fn test_task_list_draws_boxes_and_check_mark() {
        let pages = layout("- [x] done\n- [ ] todo\n");
        let boxes = pages[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::StrokeRect { .. }))
            .count();
        assert_eq!(boxes, 2);
        assert!(pages[0].ops.iter().any(|op| matches!(
            op,
            DrawOp::Text { font: Font::Dingbats, text, .. } if text == CHECK_MARK
        )));
        let text = pages[0].text();
        assert!(text.contains("done") && text.contains("todo"));
        assert!(!text.contains('•'));
    }

    #[test]
    fn test_nested_bullets_change_by_depth() {
        let pages = layout("- one\n  - two\n    - three\n");
        let text = pages[0].text();
        assert!(text.contains('•'));
        assert!(text.contains('–'));
        assert!(text.contains('·'));
    }

    #[test]
    fn test_ordered_list_honours_start() {
        let pages = layout("3. third\n4. fourth\n");
        let text = pages[0].text();
        assert!(text.contains("3.") && text.contains("4."));
    }

    #[test]
    fn test_code_block_keeps_indentation_and_background() {
        let pages = layout("```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n");
        let theme = Theme::default();
        assert!(pages[0].ops.iter().any(|op| matches!(
            op,
            DrawOp::FillRect { color, .. } if *color == theme.code_background
        )));
        let code_lines: Vec<_> = texts(&pages[0])
            .into_iter()
            .filter(|(_, _, text)| text.contains("println") || text.starts_with("fn"))
            .collect();
        assert!(!code_lines.is_empty());
        assert!(pages[0].fonts().contains(&Font::Mono));
    }

    #[test]
    fn test_table_repeats_header_across_pages() {
        let mut source = String::from("| Key | Value |\n|-----|-------|\n");
        for i in 0..80 {
            source.push_str(&format!("| row{} | value {} |\n", i, i));
        }
        let pages = layout(&source);
        assert!(pages.len() > 1);
        for page in &pages {
            let text = page.text();
            assert!(text.contains("Key"), "header missing on a page");
        }
    }

    #[test]
    fn test_column_widths_fill_frame() {
        let highlighter = Highlighter::new();
        let setup = PageSetup::default();
        let theme = Theme::default();
        let engine = LayoutEngine::new(&setup, &theme, &highlighter);
        let head = vec![vec![Span::plain("A")], vec![Span::plain("Description")]];
        let rows = vec![vec![
            vec![Span::plain("x")],
            vec![Span::plain("a fairly long description ".repeat(20))],
        ]];
        let widths = engine.column_widths(2, &head, &rows, 400.0);
        let total: f32 = widths.iter().sum();
        assert!((total - 400.0).abs() < 0.01);
        assert!(widths[0] >= 2.0 * theme.cell_padding_x + theme.body_size - 0.01);
        assert!(widths[1] > widths[0]);
    }

    #[test]
    fn test_wrap_code_line_preserves_spaces() {
        let runs = vec![HighlightedRun {
            text: "    indented".to_string(),
            color: Rgb(0, 0, 0),
            bold: false,
        }];
        let lines = wrap_code_line(&runs, 48.0, 10.0);
        // 6pt per char, 8 chars per line
        let texts: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(texts, vec!["    inde", "nted"]);
    }

    #[test]
    fn test_strikethrough_and_inline_code() {
        let pages = layout("~~gone~~ and `code`\n");
        let theme = Theme::default();
        assert!(pages[0].ops.iter().any(|op| matches!(op, DrawOp::Line { .. })));
        assert!(pages[0].ops.iter().any(|op| matches!(
            op,
            DrawOp::FillRect { color, .. } if *color == theme.inline_code_background
        )));
    }

    fn on_small_stack<T: Send + 'static>(job: impl FnOnce() -> T + Send + 'static) -> T {
        // 與 tokio blocking 執行緒相同的堆疊大小
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(job)
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_deeply_nested_quotes_fit_the_stack() {
        let pages = on_small_stack(|| layout(&format!("{}x", ">".repeat(50_000))));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].text().contains('x'));
    }

    #[test]
    fn test_deeply_nested_lists_fit_the_stack() {
        let pages = on_small_stack(|| layout(&format!("{}x", "- ".repeat(10_000))));
        assert!(pages.iter().any(|page| page.text().contains('x')));
    }

    #[test]
    fn test_overly_deep_tree_is_a_render_error() {
        let mut block = Block::Paragraph(vec![Span::plain("deep")]);
        for _ in 0..=MAX_NESTING {
            block = Block::Quote(vec![block]);
        }
        let highlighter = Highlighter::new();
        let err = layout_document(
            &[block],
            &PageSetup::default(),
            &Theme::default(),
            &highlighter,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::RenderError { .. }));
    }
}
