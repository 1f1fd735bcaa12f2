pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use crate::core::{
    category::normalize_category, geometry::classify_arrangement, sizing::TraySizer,
};
pub use adapters::{HttpCatalog, InMemoryCatalog, InMemorySectorStore};
pub use config::{toml_config::TomlConfig, SizingFactors};
pub use utils::error::{Result, SizingError};
