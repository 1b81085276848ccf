//! GitHub-flavoured stylesheet for HTML output and the matching point-based
//! theme used by the PDF layout engine (1 CSS px = 0.75 pt).

pub const GITHUB_CSS: &str = r#"
@page {
  size: A4;
  margin: 2cm 2.5cm;
  @bottom-center {
    content: counter(page) " / " counter(pages);
    font-size: 10px;
    color: #57606a;
    font-family: -apple-system, "Liberation Sans", Helvetica, Arial, sans-serif;
  }
}

* { box-sizing: border-box; }

body {
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", "Liberation Sans",
    Helvetica, Arial, sans-serif;
  font-size: 16px;
  line-height: 1.5;
  color: #24292f;
  background: #ffffff;
  word-wrap: break-word;
}

a { color: #0969da; text-decoration: none; }
a:hover { text-decoration: underline; }

h1, h2, h3, h4, h5, h6 {
  margin-top: 32px;
  margin-bottom: 20px;
  font-weight: 600;
  line-height: 1.25;
  page-break-after: avoid;
}
h1 { font-size: 2em; padding-bottom: 0.3em; border-bottom: 1px solid #d0d7de; }
h2 { font-size: 1.5em; padding-bottom: 0.3em; border-bottom: 1px solid #d0d7de; }
h3 { font-size: 1.25em; }
h4 { font-size: 1em; }
h5 { font-size: 0.875em; }
h6 { font-size: 0.85em; color: #57606a; }

p { margin-top: 0; margin-bottom: 20px; }

blockquote {
  margin: 0 0 20px;
  padding: 0 1em;
  color: #57606a;
  border-left: 0.25em solid #d0d7de;
}
blockquote > :first-child { margin-top: 0; }
blockquote > :last-child { margin-bottom: 0; }

code {
  font-family: ui-monospace, SFMono-Regular, "SF Mono", Menlo, Consolas,
    "Liberation Mono", monospace;
  font-size: 85%;
  padding: 0.2em 0.4em;
  background: rgba(175, 184, 193, 0.2);
  border-radius: 6px;
}

pre {
  margin-top: 0;
  margin-bottom: 20px;
  padding: 16px;
  overflow: auto;
  font-size: 85%;
  line-height: 1.45;
  background: #f6f8fa;
  border-radius: 6px;
  page-break-inside: avoid;
}
pre code, .highlight code {
  display: inline;
  padding: 0;
  margin: 0;
  background: transparent;
  border: 0;
  font-size: 100%;
  word-wrap: normal;
}

table {
  border-spacing: 0;
  border-collapse: collapse;
  width: 100%;
  margin-bottom: 20px;
  overflow: auto;
  display: table;
  page-break-inside: avoid;
}
table th { font-weight: 600; }
table th, table td { padding: 6px 13px; border: 1px solid #d0d7de; }
table tr { background-color: #ffffff; border-top: 1px solid hsla(210, 18%, 87%, 1); }
table tr:nth-child(2n) { background-color: #f6f8fa; }

hr {
  height: 1px;
  padding: 0;
  margin: 32px 0;
  background-color: #d0d7de;
  border: 0;
}

ul, ol { margin-top: 0; margin-bottom: 20px; padding-left: 2em; }
ul ul, ul ol, ol ol, ol ul { margin-top: 0; margin-bottom: 0; }
li { word-wrap: break-word; }
li > p { margin-top: 16px; }
li + li { margin-top: 0.25em; }

img { max-width: 100%; box-sizing: content-box; }

ul:has(.task-list-item) { padding-left: 0.5em; list-style: none; }
.task-list-item { list-style-type: none; }
.task-checkbox {
  display: inline-block;
  width: 1.3em;
  font-size: 1.05em;
  line-height: 1.5;
  color: #57606a;
}
.task-checked { color: #1a7f37; }

dl { padding: 0; }
dl dt { padding: 0; margin-top: 16px; font-size: 1em; font-style: italic; font-weight: 600; }
dl dd { padding: 0 16px; margin-bottom: 16px; }
"#;

/// Rules for the container syntect writes highlighted code into. Token
/// colours are inline styles on the spans themselves.
const HIGHLIGHT_CSS: &str = r#"
.highlight {
  margin-bottom: 20px;
  border-radius: 6px;
  overflow: auto;
}
.highlight pre {
  margin: 0;
  padding: 16px;
  font-size: 85%;
  line-height: 1.45;
  border-radius: 6px;
  font-family: ui-monospace, SFMono-Regular, "SF Mono", Menlo, Consolas,
    "Liberation Mono", monospace;
}
"#;

pub fn full_css() -> String {
    format!("{}\n{}", GITHUB_CSS, HIGHLIGHT_CSS)
}

/// Stylesheet for the browser preview: `@page` blocks only make sense for
/// paged media.
pub fn preview_css() -> String {
    strip_at_rule(&full_css(), "page")
}

/// Removes every `@name ... { ... }` block, including nested blocks such as
/// margin boxes. An unterminated block drops the rest of the input.
pub fn strip_at_rule(css: &str, name: &str) -> String {
    let needle = format!("@{}", name);
    let mut out = String::with_capacity(css.len());
    let mut rest = css;

    while let Some(pos) = rest.find(&needle) {
        let after = &rest[pos + needle.len()..];
        // @page-foo 之類的名稱不算
        if !after.starts_with(|c: char| c.is_whitespace() || c == '{' || c == ':') {
            out.push_str(&rest[..pos + needle.len()]);
            rest = after;
            continue;
        }

        out.push_str(&rest[..pos]);
        let Some(open) = after.find('{') else {
            return out;
        };

        let mut depth = 0usize;
        let mut end = None;
        for (i, c) in after[open..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(open + i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        match end {
            Some(end) => rest = &after[end..],
            None => return out,
        }
    }

    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    pub fn components(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub text: Rgb,
    pub muted: Rgb,
    pub link: Rgb,
    pub border: Rgb,
    pub code_background: Rgb,
    pub inline_code_background: Rgb,
    pub zebra: Rgb,
    pub checked: Rgb,

    pub body_size: f32,
    pub line_height: f32,
    pub block_gap: f32,

    pub heading_sizes: [f32; 6],
    pub heading_line_height: f32,
    pub heading_gap_top: f32,
    pub heading_gap_bottom: f32,
    pub heading_rule_padding: f32,

    pub code_size: f32,
    pub code_line_height: f32,
    pub code_padding: f32,

    pub quote_bar: f32,
    pub quote_padding: f32,

    pub list_indent: f32,
    pub item_gap: f32,

    pub cell_padding_x: f32,
    pub cell_padding_y: f32,

    pub rule_gap: f32,
    pub rule_thickness: f32,
    pub definition_indent: f32,
    pub definition_gap: f32,

    pub footer_size: f32,
}

impl Default for Theme {
    fn default() -> Self {
        let body = 12.0;
        Self {
            text: Rgb::hex(0x24292f),
            muted: Rgb::hex(0x57606a),
            link: Rgb::hex(0x0969da),
            border: Rgb::hex(0xd0d7de),
            code_background: Rgb::hex(0xf6f8fa),
            // rgba(175, 184, 193, 0.2) over white
            inline_code_background: Rgb::hex(0xeff1f3),
            zebra: Rgb::hex(0xf6f8fa),
            checked: Rgb::hex(0x1a7f37),

            body_size: body,
            line_height: 1.5,
            block_gap: 15.0,

            heading_sizes: [
                body * 2.0,
                body * 1.5,
                body * 1.25,
                body,
                body * 0.875,
                body * 0.85,
            ],
            heading_line_height: 1.25,
            heading_gap_top: 24.0,
            heading_gap_bottom: 15.0,
            heading_rule_padding: 0.3,

            code_size: body * 0.85,
            code_line_height: 1.45,
            code_padding: 12.0,

            quote_bar: 3.0,
            quote_padding: 12.0,

            list_indent: 24.0,
            item_gap: 3.0,

            cell_padding_x: 9.75,
            cell_padding_y: 4.5,

            rule_gap: 24.0,
            rule_thickness: 0.75,
            definition_indent: 12.0,
            definition_gap: 12.0,

            footer_size: 7.5,
        }
    }
}

impl Theme {
    pub fn heading_size(&self, level: u8) -> f32 {
        let index = (level.clamp(1, 6) - 1) as usize;
        self.heading_sizes[index]
    }

    pub fn body_line(&self) -> f32 {
        self.body_size * self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_css_drops_page_rule_with_margin_boxes() {
        let css = preview_css();
        assert!(!css.contains("@page"));
        assert!(!css.contains("@bottom-center"));
        assert!(!css.contains("counter(pages)"));
        assert!(css.contains(".task-checkbox"));
        assert!(css.contains("body {"));
    }

    #[test]
    fn test_full_css_keeps_page_rule() {
        let css = full_css();
        assert!(css.contains("@page"));
        assert!(css.contains(".highlight pre"));
    }

    #[test]
    fn test_strip_at_rule_variants() {
        let css = "a{}@page :first { margin: 0 }b{}@page-like{c:d}";
        assert_eq!(strip_at_rule(css, "page"), "a{}b{}@page-like{c:d}");
        assert_eq!(strip_at_rule("x{} @page { @top { y } ", "page"), "x{} ");
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::hex(0x0969da), Rgb(0x09, 0x69, 0xda));
        assert_eq!(Rgb::hex(0xffffff).components(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_heading_sizes() {
        let theme = Theme::default();
        assert_eq!(theme.heading_size(1), 24.0);
        assert_eq!(theme.heading_size(9), theme.heading_size(6));
    }
}
