use crate::core::{RenderService, Storage};
use crate::domain::model::file_stem;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::validate_markdown_filename;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pdf,
    Html,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Html => "html",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub input: String,
    pub output: Option<String>,
    pub title: Option<String>,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOutcome {
    pub output: String,
    pub bytes: usize,
    /// `None` for HTML output.
    pub pages: Option<usize>,
}

/// `notes.md` → `notes.pdf`, next to the input.
pub fn default_output(input: &str, format: OutputFormat) -> String {
    Path::new(input)
        .with_extension(format.extension())
        .to_string_lossy()
        .into_owned()
}

/// Offline conversion: read a Markdown file through `Storage`, render it
/// and write the result back through the same storage.
pub struct ConvertJob<S: Storage> {
    storage: S,
    service: RenderService,
}

impl<S: Storage> ConvertJob<S> {
    pub fn new(storage: S, service: RenderService) -> Self {
        Self { storage, service }
    }

    pub async fn run(&self, options: ConvertOptions) -> Result<ConvertOutcome> {
        let file_name = Path::new(&options.input)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        validate_markdown_filename(file_name.as_deref())?;

        let raw = self.storage.read_file(&options.input).await?;
        let markdown = String::from_utf8(raw).map_err(|_| AppError::InvalidEncoding)?;
        debug!("Read {} ({} bytes)", options.input, markdown.len());

        let stem = file_stem(&options.input);
        let title = options.title.clone().unwrap_or_else(|| stem.clone());
        let output = options
            .output
            .clone()
            .unwrap_or_else(|| default_output(&options.input, options.format));

        let (bytes, pages) = match options.format {
            OutputFormat::Pdf => {
                let pdf = self.service.pdf(markdown, title).await?;
                (pdf.bytes, Some(pdf.pages))
            }
            OutputFormat::Html => {
                let html = self.service.standalone_html(markdown, title).await?;
                (html.into_bytes(), None)
            }
        };

        self.storage.write_file(&output, &bytes).await?;
        info!("Wrote {} ({} bytes)", output, bytes.len());

        Ok(ConvertOutcome {
            output,
            bytes: bytes.len(),
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use crate::core::MarkdownRenderer;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn job(dir: &TempDir) -> ConvertJob<LocalStorage> {
        let service = RenderService::new(
            Arc::new(MarkdownRenderer::default()),
            1,
            Duration::from_secs(30),
        );
        ConvertJob::new(LocalStorage::new(dir.path()), service)
    }

    #[test]
    fn test_default_output() {
        assert_eq!(default_output("docs/notes.md", OutputFormat::Pdf), "docs/notes.pdf");
        assert_eq!(default_output("todo.txt", OutputFormat::Html), "todo.html");
    }

    #[tokio::test]
    async fn test_converts_to_pdf_next_to_input() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.md"), "# Notes\n\nSome text.\n").unwrap();

        let outcome = job(&dir)
            .run(ConvertOptions {
                input: "notes.md".to_string(),
                ..ConvertOptions::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.output, "notes.pdf");
        assert_eq!(outcome.pages, Some(1));
        let written = std::fs::read(dir.path().join("notes.pdf")).unwrap();
        assert!(written.starts_with(b"%PDF-"));
        assert_eq!(written.len(), outcome.bytes);
    }

    #[tokio::test]
    async fn test_converts_to_html() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.markdown"), "*hi*").unwrap();

        let outcome = job(&dir)
            .run(ConvertOptions {
                input: "a.markdown".to_string(),
                output: Some("out/page.html".to_string()),
                title: Some("Custom".to_string()),
                format: OutputFormat::Html,
            })
            .await
            .unwrap();

        assert_eq!(outcome.pages, None);
        let html = std::fs::read_to_string(dir.path().join("out/page.html")).unwrap();
        assert!(html.contains("<title>Custom</title>"));
        assert!(html.contains("<em>hi</em>"));
    }

    #[tokio::test]
    async fn test_rejects_bad_extension_and_encoding() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("report.pdf"), "x").unwrap();
        std::fs::write(dir.path().join("latin1.md"), [0x66, 0xe9, 0x65]).unwrap();
        let job = job(&dir);

        let err = job
            .run(ConvertOptions {
                input: "report.pdf".to_string(),
                ..ConvertOptions::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFile { .. }));

        let err = job
            .run(ConvertOptions {
                input: "latin1.md".to_string(),
                ..ConvertOptions::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidEncoding));
    }
}
