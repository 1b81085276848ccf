use crate::domain::model::{PageSetup, RenderedPdf};
use crate::utils::error::Result;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_address(&self) -> String;
    fn workers(&self) -> usize;
    fn render_workers(&self) -> usize;
    fn render_timeout(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn max_body_bytes(&self) -> usize;
    fn page_setup(&self) -> PageSetup;
    fn default_title(&self) -> &str;
}

/// Markdown in, preview HTML or PDF out. Implementations are CPU-bound and
/// synchronous; callers move them off the async executor.
pub trait DocumentRenderer: Send + Sync {
    fn render_html(&self, markdown: &str) -> Result<String>;
    fn render_standalone_html(&self, markdown: &str, title: &str) -> Result<String>;
    fn render_pdf(&self, markdown: &str, title: &str) -> Result<RenderedPdf>;
}
