pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

pub use adapters::LocalStorage;
pub use app::{ConvertJob, ConvertOptions, ConvertOutcome, OutputFormat};
pub use config::AppConfig;
pub use core::{MarkdownRenderer, RenderService};
pub use domain::model::{ConvertRequest, PageSize, RenderedPdf};
pub use http::{build_router, serve, AppState};
pub use utils::error::{AppError, Result};
