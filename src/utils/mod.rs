pub mod error;
pub mod health;
pub mod logger;
pub mod process;
pub mod validation;
