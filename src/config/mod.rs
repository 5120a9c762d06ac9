//! Configuration module for Crawlboard
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use crawlboard::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawlboard.toml")).unwrap();
//! println!("Backend: {}", config.api.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, CrawlerConfig, CrawlerConfigUpdate, PollConfig, DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validators used outside of file loading
pub use validation::{validate, validate_base_url, validate_crawler_config};
