pub mod convert;

pub use convert::{ConvertJob, ConvertOptions, ConvertOutcome, OutputFormat};
