//! HTTP surface: routes, error mapping and the server loop.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{serve, serve_on, shutdown_signal};
pub use state::AppState;
