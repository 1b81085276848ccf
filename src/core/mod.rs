pub mod highlight;
pub mod layout;
pub mod markdown;
pub mod pdf;
pub mod renderer;
pub mod service;
pub mod styles;

pub use crate::domain::ports::{ConfigProvider, DocumentRenderer, Storage};
pub use crate::utils::error::Result;
pub use renderer::MarkdownRenderer;
pub use service::RenderService;
