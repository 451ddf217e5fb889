//! Configuration loading and settings types.

mod settings;

pub use settings::{ApiConfig, DatabaseConfig, PaginationConfig, ServerConfig, Settings};
