use crate::core::highlight::Highlighter;
use crate::core::renderer::MarkdownRenderer;
use crate::domain::model::RenderedPdf;
use crate::domain::ports::{ConfigProvider, DocumentRenderer};
use crate::utils::error::{AppError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Runs renders on the blocking pool. At most `workers` renders run at once
/// and each one, including the wait for a slot, is bounded by `timeout`.
#[derive(Clone)]
pub struct RenderService {
    renderer: Arc<dyn DocumentRenderer>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl RenderService {
    pub fn new(renderer: Arc<dyn DocumentRenderer>, workers: usize, timeout: Duration) -> Self {
        Self {
            renderer,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            timeout,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        let highlighter = Arc::new(Highlighter::new());
        let renderer = MarkdownRenderer::with_highlighter(highlighter, config.page_setup());
        Self::new(
            Arc::new(renderer),
            config.render_workers(),
            config.render_timeout(),
        )
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn preview(&self, markdown: String) -> Result<String> {
        let html = self
            .run("preview", move |renderer| renderer.render_html(&markdown))
            .await?;
        debug!(bytes = html.len(), "Preview rendered");
        Ok(html)
    }

    pub async fn pdf(&self, markdown: String, title: String) -> Result<RenderedPdf> {
        let pdf = self
            .run("pdf", move |renderer| renderer.render_pdf(&markdown, &title))
            .await?;
        debug!(bytes = pdf.bytes.len(), pages = pdf.pages, "PDF rendered");
        Ok(pdf)
    }

    pub async fn standalone_html(&self, markdown: String, title: String) -> Result<String> {
        self.run("html", move |renderer| {
            renderer.render_standalone_html(&markdown, &title)
        })
        .await
    }

    async fn run<T, F>(&self, kind: &'static str, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn DocumentRenderer) -> Result<T> + Send + 'static,
    {
        let started = Instant::now();
        let permits = Arc::clone(&self.permits);
        let renderer = Arc::clone(&self.renderer);

        let work = async move {
            let permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return Err(AppError::ServerError {
                        message: "render pool is closed".to_string(),
                    })
                }
            };
            // permit 跟著 blocking task 走，逾時後仍佔住名額直到真正結束
            let task = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                job(renderer.as_ref())
            });
            match task.await {
                Ok(result) => result,
                Err(e) => Err(AppError::render(format!("render task failed: {}", e))),
            }
        };

        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => {
                debug!(
                    kind,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Render finished"
                );
                result
            }
            Err(_) => {
                warn!(kind, timeout_ms = self.timeout.as_millis() as u64, "Render timed out");
                Err(AppError::RenderTimeout {
                    timeout: self.timeout,
                })
            }
        }
    }
}
