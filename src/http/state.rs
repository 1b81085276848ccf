use crate::core::{ConfigProvider, RenderService};
use std::sync::Arc;

/// Shared handler state. Cloned per request, holds nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub service: RenderService,
    pub default_title: Arc<str>,
}

impl AppState {
    pub fn new(service: RenderService, default_title: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            default_title: default_title.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(RenderService::from_config(config), config.default_title())
    }
}
